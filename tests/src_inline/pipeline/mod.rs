use super::*;
use crate::model::config::MismatchPolicy;
use crate::model::question::{GuessRow, Position, SweepEntry};

fn guessers() -> GuesserSet {
    GuesserSet::new(vec!["a".to_string(), "b".to_string()]).unwrap()
}

fn row(token: u32, guesser: &str, guess: &str, score: f64) -> GuessRow {
    GuessRow {
        position: Position { sentence: 0, token },
        guesser: guesser.to_string(),
        guess: guess.to_string(),
        score,
    }
}

/// Synthetic fold: guesser `a` turns correct part-way through, `b` only on
/// every third question, and the buzzer commits at a question-dependent
/// position. Question 13 has a truncated buzz sequence.
fn synthetic_fold() -> (FoldInputs, BTreeMap<QuestionId, String>) {
    let mut guess_rows = BTreeMap::new();
    let mut buzzes = BTreeMap::new();
    let mut answers = BTreeMap::new();
    for q in 0..60u64 {
        let qnum = QuestionId(q);
        let length = 3 + (q % 4) as u32;
        let a_from = (q % length as u64) as u32;
        let mut rows = Vec::new();
        for t in 0..length {
            let a_guess = if t >= a_from { "ans" } else { "wrong" };
            rows.push(row(t, "a", a_guess, 0.9));
            rows.push(row(t, "a", "other", 0.1));
            let b_guess = if q % 3 == 0 && t + 1 == length { "ans" } else { "nope" };
            rows.push(row(t, "b", b_guess, 0.5));
            rows.push(row(t, "stray", "ans", 1.0));
        }
        guess_rows.insert(qnum, rows);

        let buzz_at = (q % (length as u64 + 1)) as usize;
        let mut steps: Vec<Vec<f64>> = (0..length as usize)
            .map(|t| {
                if t == buzz_at {
                    if q % 5 == 0 { vec![0.1, 0.8, 0.1] } else { vec![0.8, 0.1, 0.1] }
                } else {
                    vec![0.1, 0.1, 0.8]
                }
            })
            .collect();
        if q == 13 {
            steps.pop();
        }
        buzzes.insert(qnum, BuzzSequence::new(steps));
        answers.insert(qnum, "ans".to_string());
    }
    let mut sweep_buzzes = BTreeMap::new();
    sweep_buzzes.insert(QuestionId(1), BuzzSequence::new(vec![vec![0.9, 0.0, 0.1]; 4]));
    let inputs = FoldInputs {
        fold: "dev".to_string(),
        guess_rows,
        buzzes,
        sweep: vec![SweepEntry {
            config: serde_json::json!({"name": "eager"}),
            buzzes: sweep_buzzes,
        }],
    };
    (inputs, answers)
}

#[test]
fn test_evaluate_fold_is_deterministic_across_thread_counts() {
    let (inputs, answers) = synthetic_fold();
    let set = guessers();
    let config = EvalConfig::default_v1();
    let mut baseline: Option<(String, FoldEvaluation)> = None;
    for threads in [1, 2, 4] {
        let driver = Driver::new(threads, false).unwrap();
        let evaluation = evaluate_fold(&driver, &set, &answers, &inputs, &config).unwrap();
        let json = serde_json::to_string(&evaluation).unwrap();
        match &baseline {
            None => baseline = Some((json, evaluation)),
            Some((expected_json, expected)) => {
                assert_eq!(&json, expected_json);
                assert_eq!(evaluation.eop_records, expected.eop_records);
                assert_eq!(evaluation.eop, expected.eop);
                assert_eq!(evaluation.histogram, expected.histogram);
            }
        }
    }
}

#[test]
fn test_evaluate_fold_counts_and_skips() {
    let (inputs, answers) = synthetic_fold();
    let set = guessers();
    let driver = Driver::new(2, false).unwrap();
    let evaluation =
        evaluate_fold(&driver, &set, &answers, &inputs, &EvalConfig::default_v1()).unwrap();
    assert_eq!(evaluation.fold, "dev");
    assert_eq!(evaluation.n_questions, 60);
    assert_eq!(evaluation.eop.n_questions, 59);
    assert_eq!(evaluation.histogram.n_questions, 59);
    assert_eq!(evaluation.skipped.len(), 1);
    assert_eq!(evaluation.skipped[0].qnum, QuestionId(13));
    assert!(!evaluation.eop_records.contains_key(&QuestionId(13)));
    assert!(evaluation.unknown_guesser_rows > 0);
    assert_eq!(evaluation.sweep.len(), 1);
    assert_eq!(evaluation.sweep[0].skipped, 0);
    assert_eq!(evaluation.sweep[0].n_questions, 1);
    assert_eq!(evaluation.sweep[0].rush, 1.0);
    // every question is hopeful because `a` is eventually correct
    assert_eq!(evaluation.eop.mean("hopeful"), 1.0);
    let acc = evaluation.histogram.series("acc").unwrap();
    assert_eq!(acc[acc.len() - 1], 1.0);
    let buzz = evaluation.histogram.series("buzz").unwrap();
    assert_eq!(buzz[buzz.len() - 1], evaluation.eop.mean("buzz"));
}

#[test]
fn test_evaluate_fold_abort_names_question() {
    let (inputs, answers) = synthetic_fold();
    let set = guessers();
    let mut config = EvalConfig::default_v1();
    config.mismatch = MismatchPolicy::Abort;
    let driver = Driver::new(4, false).unwrap();
    let err = evaluate_fold(&driver, &set, &answers, &inputs, &config).unwrap_err();
    match err {
        PipelineError::Score(ScoreError::LengthMismatch {
            qnum,
            buzzes,
            guesses,
        }) => {
            assert_eq!(qnum, QuestionId(13));
            assert_eq!(guesses, buzzes + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_aligned_length_checks() {
    let set = guessers();
    let table = GuesserTable::new(vec![vec![None, None], vec![]]);
    let ok = BuzzSequence::new(vec![vec![0.0; 3]; 2]);
    let question = QuestionInput {
        qnum: QuestionId(2),
        table: &table,
        buzzes: &ok,
        answer: "ans",
    };
    assert_eq!(question.aligned_length(&set), Ok(2));

    let short = BuzzSequence::new(vec![vec![0.0; 3]]);
    let question = QuestionInput {
        buzzes: &short,
        ..question
    };
    assert!(matches!(
        question.aligned_length(&set),
        Err(ScoreError::LengthMismatch { buzzes: 1, guesses: 2, .. })
    ));
}

#[test]
fn test_scoring_context_reports_missing_inputs() {
    let set = guessers();
    let buzzes = BTreeMap::new();
    let mut answers = BTreeMap::new();
    answers.insert(QuestionId(1), "ans".to_string());
    let ctx = ScoringContext {
        guessers: &set,
        buzzes: &buzzes,
        answers: &answers,
    };
    let table = GuesserTable::new(vec![vec![], vec![]]);
    assert_eq!(
        ctx.question(QuestionId(1), &table).unwrap_err(),
        ScoreError::MissingBuzzes(QuestionId(1))
    );
}
