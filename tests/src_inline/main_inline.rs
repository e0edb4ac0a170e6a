use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("buzzstat_main_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn parse(args: &[&str]) -> RunArgs {
    let argv = std::iter::once("buzzstat").chain(args.iter().copied());
    let Command::Run(run) = Cli::try_parse_from(argv).unwrap().command;
    run
}

#[test]
fn test_parse_args_defaults() {
    let args = parse(&["run", "--input", "data", "--out", "out"]);
    assert_eq!(args.input, PathBuf::from("data"));
    assert_eq!(args.folds, vec!["dev", "test"]);
    assert_eq!(args.threads, 0);
    assert_eq!(args.on_mismatch, MismatchPolicy::Skip);
    assert!(args.guessers.is_none());
    assert!(!args.no_charts);

    let config = build_config(&args).unwrap();
    assert_eq!(config.checkpoints, Checkpoints::default_v1());
    assert_eq!(config.mismatch, MismatchPolicy::Skip);
}

#[test]
fn test_parse_args_overrides() {
    let args = parse(&[
        "run",
        "--input",
        "data",
        "--out",
        "out",
        "--fold",
        "dev",
        "--guessers",
        "dan,ir",
        "--threads",
        "3",
        "--checkpoints",
        "0.5,1",
        "--on-mismatch",
        "abort",
        "--no-charts",
        "-q",
    ]);
    assert_eq!(args.folds, vec!["dev"]);
    assert_eq!(args.guessers, Some(vec!["dan".to_string(), "ir".to_string()]));
    assert!(args.quiet);
    assert!(args.no_charts);

    let config = build_config(&args).unwrap();
    assert_eq!(config.checkpoints.values(), &[0.5, 1.0]);
    assert_eq!(config.mismatch, MismatchPolicy::Abort);
    assert_eq!(config.threads, 3);
}

#[test]
fn test_bad_checkpoints_are_config_errors() {
    let args = parse(&[
        "run",
        "--input",
        "d",
        "--out",
        "o",
        "--checkpoints",
        "1,0.5",
    ]);
    assert!(matches!(
        build_config(&args),
        Err(ConfigError::CheckpointOrder { .. })
    ));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    let argv = ["buzzstat", "run", "--input", "d", "--out", "o", "-q", "-v"];
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn test_run_end_to_end() {
    let input = make_temp_dir();
    let out = input.join("out");
    fs::write(input.join("guessers.txt"), "a\nb\n").unwrap();
    fs::write(input.join("answers.tsv"), "qnum\tanswer\n1\tParis\n").unwrap();
    fs::write(
        input.join("guesses_dev.tsv"),
        "qnum\tsentence\ttoken\tguesser\tguess\tscore\n1\t0\t0\ta\tLondon\t0.9\n1\t0\t1\ta\tParis\t0.9\n",
    )
    .unwrap();
    fs::write(
        input.join("buzzes_dev.json"),
        r#"{"1": [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]}"#,
    )
    .unwrap();

    let input_arg = input.to_string_lossy().to_string();
    let out_arg = out.to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "buzzstat",
        "run",
        "--input",
        input_arg.as_str(),
        "--out",
        out_arg.as_str(),
        "--fold",
        "dev",
        "--no-charts",
        "-q",
    ])
    .unwrap();
    run(cli).unwrap();

    let tsv = fs::read_to_string(out.join("eop_dev.tsv")).unwrap();
    let row: Vec<&str> = tsv.lines().nth(1).unwrap().split('\t').collect();
    assert_eq!(row[0], "1");
    assert_eq!(row[3], "10");
    assert!(out.join("summary.json").exists());
    assert!(out.join("report.txt").exists());
}

#[test]
fn test_run_missing_fold_fails() {
    let input = make_temp_dir();
    fs::write(input.join("guessers.txt"), "a\n").unwrap();
    fs::write(input.join("answers.tsv"), "qnum\tanswer\n").unwrap();
    let input_arg = input.to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "buzzstat",
        "run",
        "--input",
        input_arg.as_str(),
        "--out",
        "unused",
        "--fold",
        "nope",
        "-q",
    ])
    .unwrap();
    let err = run(cli).unwrap_err();
    assert!(matches!(
        err,
        RunError::Input(InputError::MissingArtifact { .. })
    ));
}
