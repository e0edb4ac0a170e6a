use super::*;
use crate::model::config::RewardProfile;
use crate::model::guessers::GuesserId;
use crate::model::question::BuzzSequence;
use crate::pipeline::stage2_eop::score_eop;

const WAIT: [f64; 3] = [0.0, 0.0, 1.0];
const BUZZ_A: [f64; 3] = [1.0, 0.0, 0.0];
const BUZZ_B: [f64; 3] = [0.0, 1.0, 0.0];

fn guessers() -> GuesserSet {
    GuesserSet::new(vec!["a".to_string(), "b".to_string()]).unwrap()
}

fn table(seqs: &[&[Option<&str>]]) -> GuesserTable {
    GuesserTable::new(
        seqs.iter()
            .map(|s| s.iter().map(|g| g.map(str::to_string)).collect())
            .collect(),
    )
}

fn buzzes(steps: &[[f64; 3]]) -> BuzzSequence {
    BuzzSequence::new(steps.iter().map(|s| s.to_vec()).collect())
}

fn late_a_table() -> GuesserTable {
    table(&[
        &[Some("x"), Some("x"), Some("ans")],
        &[Some("y"), Some("y"), Some("y")],
    ])
}

fn histogram(table: &GuesserTable, seq: &BuzzSequence) -> HistogramRecord {
    let question = QuestionInput {
        qnum: QuestionId(1),
        table,
        buzzes: seq,
        answer: "ans",
    };
    score_histogram(&question, &guessers(), &Checkpoints::default_v1()).unwrap()
}

#[test]
fn test_prefix_outcomes_for_premature_buzz() {
    let record = histogram(&late_a_table(), &buzzes(&[WAIT, BUZZ_A, WAIT]));
    let outcomes: Vec<Outcome> = record.checkpoints.iter().map(|c| c.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::WrongHopeless,
            Outcome::WrongHopeless,
            Outcome::WrongHopeless,
            Outcome::WrongHopeless,
            Outcome::WrongHopeful,
        ]
    );
    let buzz: Vec<bool> = record.checkpoints.iter().map(|c| c.buzz).collect();
    assert_eq!(buzz, vec![false, false, false, true, true]);
    let last = &record.checkpoints[4];
    assert!(last.acc);
    assert_eq!(last.acc_by_guesser, vec![true, false]);
    assert_eq!(last.buzz_by_guesser, vec![true, false]);
}

#[test]
fn test_correct_buzz_shows_at_full_question() {
    let record = histogram(&late_a_table(), &buzzes(&[WAIT, WAIT, BUZZ_A]));
    assert_eq!(record.checkpoints[4].outcome, Outcome::Correct);
    assert_eq!(record.checkpoints[3].outcome, Outcome::WrongHopeless);
}

#[test]
fn test_every_buzz_in_prefix_is_considered() {
    let t = table(&[&[Some("ans"), Some("ans")], &[Some("y"), Some("y")]]);
    let record = histogram(&t, &buzzes(&[BUZZ_B, BUZZ_A]));
    let last = &record.checkpoints[4];
    assert_eq!(last.buzz_by_guesser, vec![true, true]);
    assert_eq!(last.outcome, Outcome::Correct);
    // prefix of length 1 only sees the wrong buzz on b
    assert_eq!(record.checkpoints[2].outcome, Outcome::WrongHopeful);
}

#[test]
fn test_full_checkpoint_agrees_with_eop() {
    let cases = [
        (late_a_table(), buzzes(&[WAIT, BUZZ_A, WAIT])),
        (late_a_table(), buzzes(&[WAIT, WAIT, WAIT])),
        (late_a_table(), buzzes(&[BUZZ_B, WAIT, WAIT])),
        (
            table(&[&[Some("x"), None, None], &[None, None, Some("z")]]),
            buzzes(&[WAIT, WAIT, BUZZ_A]),
        ),
    ];
    for (t, seq) in &cases {
        let record = histogram(t, seq);
        let question = QuestionInput {
            qnum: QuestionId(1),
            table: t,
            buzzes: seq,
            answer: "ans",
        };
        let eop = score_eop(&question, &guessers(), &RewardProfile::default_v1()).unwrap();
        let last = &record.checkpoints[4];
        assert_eq!(last.acc, eop.hopeful);
        assert_eq!(last.buzz, eop.buzz);
        if let Some(GuesserId(g)) = eop.choose_guesser {
            assert!(last.buzz_by_guesser[g]);
        }
    }
}

#[test]
fn test_mismatch_is_error() {
    let question = QuestionInput {
        qnum: QuestionId(5),
        table: &late_a_table(),
        buzzes: &buzzes(&[WAIT]),
        answer: "ans",
    };
    let err = score_histogram(&question, &guessers(), &Checkpoints::default_v1()).unwrap_err();
    assert!(matches!(err, ScoreError::LengthMismatch { qnum, .. } if qnum == QuestionId(5)));
}

#[test]
fn test_run_stage3_outcome_shares_sum_to_one() {
    let mut tables = BTreeMap::new();
    let mut seqs = BTreeMap::new();
    let mut answers = BTreeMap::new();
    let steps = [
        [WAIT, BUZZ_A, WAIT],
        [WAIT, WAIT, BUZZ_A],
        [BUZZ_B, WAIT, WAIT],
        [WAIT, WAIT, WAIT],
    ];
    for (i, s) in steps.iter().enumerate() {
        let q = QuestionId(i as u64 + 1);
        tables.insert(q, late_a_table());
        seqs.insert(q, buzzes(s));
        answers.insert(q, "ans".to_string());
    }
    let set = guessers();
    let ctx = ScoringContext {
        guessers: &set,
        buzzes: &seqs,
        answers: &answers,
    };
    let driver = Driver::new(2, false).unwrap();
    let out = run_stage3(&driver, &ctx, &tables, &EvalConfig::default_v1()).unwrap();
    let summary = &out.summary;
    assert_eq!(summary.n_questions, 4);
    let correct = summary.series("correct").unwrap();
    let hopeful = summary.series("wrong_hopeful").unwrap();
    let hopeless = summary.series("wrong_hopeless").unwrap();
    for i in 0..summary.checkpoints.len() {
        let total = correct[i] + hopeful[i] + hopeless[i];
        assert!((total - 1.0).abs() < 1e-12);
    }
    assert_eq!(summary.series("acc").unwrap()[4], 1.0);
    assert_eq!(summary.series("buzz").unwrap()[4], 0.75);
    assert_eq!(summary.series("buzz_b").unwrap()[4], 0.25);
    assert_eq!(correct[4], 0.25);
}
