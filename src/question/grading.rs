//! Grading engine: one entry point over all question types.
//!
//! Preview checks, test-mode submissions and the raw `/grade` endpoint all land here, so
//! the correctness rule of a type exists exactly once (in its `QuestionSchema` impl).

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::arrange::MatchTally;
use super::{each_schema, Answer, QuestionContent, QuestionSchema, QuestionType};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GradeError {
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),
    #[error("answer of type {got} cannot grade a {expected} question")]
    AnswerMismatch { expected: QuestionType, got: QuestionType },
    #[error("invalid {kind} content: {reason}")]
    InvalidContent { kind: QuestionType, reason: String },
    #[error("invalid {kind} answer: {reason}")]
    InvalidAnswer { kind: QuestionType, reason: String },
}

/// Result of grading one answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    /// Per-pair breakdown, matching questions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<MatchTally>,
}

fn grade_schema<S: QuestionSchema>(content: &S, answer: &Answer) -> Result<bool, GradeError> {
    S::unwrap(answer)
        .map(|a| content.grade(a))
        .ok_or(GradeError::AnswerMismatch { expected: S::TYPE, got: answer.kind() })
}

fn key_of<S: QuestionSchema>(content: &S) -> Option<Answer> {
    content.answer_key().map(S::wrap)
}

/// Grade `answer` against `content`. Deterministic; neither argument is touched.
pub fn grade(content: &QuestionContent, answer: &Answer) -> Result<bool, GradeError> {
    each_schema!(content, c => grade_schema(c, answer))
}

/// Like [`grade`], plus the per-pair tally for matching questions.
pub fn evaluate(content: &QuestionContent, answer: &Answer) -> Result<Verdict, GradeError> {
    let correct = grade(content, answer)?;
    let tally = match (content, answer) {
        (QuestionContent::Matching(m), Answer::Matching(map)) => Some(m.tally(map)),
        _ => None,
    };
    debug!(target: "grading", kind = %content.kind(), correct, "graded answer");
    Ok(Verdict { correct, tally })
}

/// Expected answer for `content` (what feedback reveals after a submission).
pub fn answer_key(content: &QuestionContent) -> Option<Answer> {
    each_schema!(content, c => key_of(c))
}

/// Grade untyped input: a type tag plus JSON content and answer.
/// An unrecognized tag is an error, never a silent `false`.
pub fn grade_raw(
    tag: &str,
    content: serde_json::Value,
    answer: serde_json::Value,
) -> Result<Verdict, GradeError> {
    let kind: QuestionType = tag.parse()?;
    let content = QuestionContent::from_parts(kind, content)?;
    let answer = Answer::from_parts(kind, answer).map_err(|e| GradeError::InvalidAnswer {
        kind,
        reason: e.to_string(),
    })?;
    evaluate(&content, &answer)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::question::arrange::{MatchPair, OrderItem, SwipeCard, SwipeLabels};
    use crate::question::choice::ChoiceOption;
    use crate::question::*;

    /// One filled-in content value per type.
    fn samples() -> Vec<QuestionContent> {
        vec![
            QuestionContent::MultipleChoice(MultipleChoice {
                question: "2 + 2 = ?".into(),
                options: vec![
                    ChoiceOption { id: "A".into(), text: "3".into(), is_correct: false },
                    ChoiceOption { id: "B".into(), text: "4".into(), is_correct: true },
                ],
                explanation: String::new(),
            }),
            QuestionContent::FindError(FindError {
                sentence: "he go home".into(),
                error_index: 1,
                correct_word: "goes".into(),
            }),
            QuestionContent::StrikeOut(StrikeOut {
                sentence: "I really very like it".into(),
                correct_ids_to_remove: vec![2],
            }),
            QuestionContent::Ordering(Ordering {
                question: String::new(),
                items: vec![
                    OrderItem { id: "A".into(), content: "first".into() },
                    OrderItem { id: "B".into(), content: "second".into() },
                    OrderItem { id: "C".into(), content: "third".into() },
                ],
                correct_order: vec!["A".into(), "B".into(), "C".into()],
            }),
            QuestionContent::Highlight(Highlight { passage: "the dog ran".into(), correct_phrase: "dog".into() }),
            QuestionContent::SwipeDecision(SwipeDecision {
                cards: vec![
                    SwipeCard { content: "sky is green".into(), correct_swipe: Swipe::Left },
                    SwipeCard { content: "water is wet".into(), correct_swipe: Swipe::Right },
                ],
                labels: SwipeLabels { left: "Myth".into(), right: "Fact".into() },
            }),
            QuestionContent::FillGap(FillGap { question: "Capital of Peru".into(), correct_answer: "Lima".into() }),
            QuestionContent::Matching(Matching {
                pairs: (1..=3).map(|id| MatchPair { id, left: format!("l{id}"), right: format!("r{id}") }).collect(),
            }),
            QuestionContent::GraphPoint(GraphPoint { question: String::new(), target_x: 2.0, target_y: 3.0, radius: 0.5 }),
            QuestionContent::TrendArrow(TrendArrow { question: String::new(), correct_trend: Trend::Decrease }),
            QuestionContent::SliderValue(SliderValue { correct_value: 50.0, tolerance: 5.0, ..SliderValue::blank() }),
        ]
    }

    fn wrong_answer(content: &QuestionContent) -> Answer {
        match content {
            QuestionContent::MultipleChoice(_) => Answer::MultipleChoice("A".into()),
            QuestionContent::FindError(_) => Answer::FindError(0),
            QuestionContent::StrikeOut(_) => Answer::StrikeOut(vec![0, 1]),
            QuestionContent::Ordering(_) => Answer::Ordering(vec!["C".into(), "B".into(), "A".into()]),
            QuestionContent::Highlight(_) => Answer::Highlight("cat".into()),
            QuestionContent::SwipeDecision(_) => Answer::SwipeDecision(vec![Swipe::Right, Swipe::Left]),
            QuestionContent::FillGap(_) => Answer::FillGap("Quito".into()),
            QuestionContent::Matching(_) => Answer::Matching([(1, 2), (2, 1), (3, 3)].into_iter().collect()),
            QuestionContent::GraphPoint(_) => Answer::GraphPoint(Point { x: 9.0, y: 9.0 }),
            QuestionContent::TrendArrow(_) => Answer::TrendArrow(Trend::Increase),
            QuestionContent::SliderValue(_) => Answer::SliderValue(10.0),
        }
    }

    #[test]
    fn every_type_accepts_its_key_and_rejects_a_wrong_answer() {
        let all = samples();
        assert_eq!(all.len(), QuestionType::ALL.len());
        for content in &all {
            let key = answer_key(content).expect("sample defines a key");
            assert_eq!(grade(content, &key), Ok(true), "{}", content.kind());
            assert_eq!(grade(content, &wrong_answer(content)), Ok(false), "{}", content.kind());
        }
    }

    #[test]
    fn grading_is_deterministic_and_non_mutating() {
        for content in samples() {
            let before = content.clone();
            let answer = wrong_answer(&content);
            let first = grade(&content, &answer);
            assert_eq!(first, grade(&content, &answer));
            assert_eq!(content, before);
        }
    }

    #[test]
    fn any_single_transposition_of_the_order_fails() {
        let content = &samples()[3];
        let key = vec!["A".to_string(), "B".into(), "C".into()];
        for i in 0..key.len() {
            for j in (i + 1)..key.len() {
                let mut swapped = key.clone();
                swapped.swap(i, j);
                assert_eq!(grade(content, &Answer::Ordering(swapped)), Ok(false));
            }
        }
    }

    #[test]
    fn mismatched_answer_variant_is_an_error() {
        let content = QuestionContent::blank(QuestionType::SliderValue);
        let err = grade(&content, &Answer::FillGap("50".into())).unwrap_err();
        assert_eq!(
            err,
            GradeError::AnswerMismatch { expected: QuestionType::SliderValue, got: QuestionType::FillGap }
        );
    }

    #[test]
    fn matching_verdict_reports_per_pair_count() {
        let content = &samples()[7];
        let answer: BTreeMap<u32, u32> = [(1, 1), (2, 2), (3, 2)].into_iter().collect();
        let verdict = evaluate(content, &Answer::Matching(answer)).unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.tally, Some(MatchTally { correct: 2, total: 3 }));
    }

    #[test]
    fn raw_grading_flags_unknown_types() {
        let err = grade_raw("essay", json!({}), json!("text")).unwrap_err();
        assert_eq!(err, GradeError::UnknownQuestionType("essay".into()));
    }

    #[test]
    fn raw_grading_matches_typed_grading() {
        let v = grade_raw("highlight", json!({ "correct_phrase": "dog" }), json!("the dog ran")).unwrap();
        assert!(v.correct);
        let v = grade_raw("highlight", json!({ "correct_phrase": "dog" }), json!("cat")).unwrap();
        assert!(!v.correct);
        let v = grade_raw("slider_value", json!({ "correct_value": 50, "tolerance": 5 }), json!(45)).unwrap();
        assert!(v.correct);
        let v = grade_raw("slider_value", json!({ "correct_value": 50, "tolerance": 5 }), json!(44)).unwrap();
        assert!(!v.correct);
        let v = grade_raw("strike_out", json!({ "sentence": "a b c d", "correct_ids_to_remove": [1, 3] }), json!([3, 1]))
            .unwrap();
        assert!(v.correct);
    }

    #[test]
    fn raw_grading_rejects_cross_type_fields() {
        let err = grade_raw("fill_gap", json!({ "correct_answer": "x", "options": [] }), json!("x")).unwrap_err();
        assert!(matches!(err, GradeError::InvalidContent { kind: QuestionType::FillGap, .. }));
    }
}
