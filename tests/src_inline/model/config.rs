use super::*;

#[test]
fn test_default_rewards() {
    let r = RewardProfile::default_v1();
    assert_eq!((r.honest, r.premature, r.silent), (10, -5, 0));
    assert!(r.is_valid_reward(10, true));
    assert!(r.is_valid_reward(-5, true));
    assert!(!r.is_valid_reward(0, true));
    assert!(r.is_valid_reward(0, false));
    assert!(!r.is_valid_reward(10, false));
}

#[test]
fn test_checkpoints_validation() {
    assert!(Checkpoints::new(vec![0.0, 0.5, 1.0]).is_ok());
    assert_eq!(Checkpoints::new(vec![]), Err(ConfigError::EmptyCheckpoints));
    assert_eq!(
        Checkpoints::new(vec![0.0, 1.5]),
        Err(ConfigError::CheckpointOutOfRange(1.5))
    );
    assert!(matches!(
        Checkpoints::new(vec![f64::NAN]),
        Err(ConfigError::CheckpointOutOfRange(_))
    ));
    assert_eq!(
        Checkpoints::new(vec![0.5, 0.5]),
        Err(ConfigError::CheckpointOrder {
            prev: 0.5,
            next: 0.5
        })
    );
}

#[test]
fn test_default_checkpoints() {
    let c = Checkpoints::default_v1();
    assert_eq!(c.values(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(c.len(), 5);
}

#[test]
fn test_prefix_end_floors() {
    assert_eq!(Checkpoints::prefix_end(0.0, 7), 0);
    assert_eq!(Checkpoints::prefix_end(0.25, 7), 1);
    assert_eq!(Checkpoints::prefix_end(0.5, 7), 3);
    assert_eq!(Checkpoints::prefix_end(1.0, 7), 7);
    assert_eq!(Checkpoints::prefix_end(1.0, 0), 0);
}

#[test]
fn test_eval_config_defaults() {
    let config = EvalConfig::default_v1();
    assert_eq!(config.mismatch, MismatchPolicy::Skip);
    assert_eq!(config.threads, 0);
    assert_eq!(config.rewards, RewardProfile::default_v1());
}
