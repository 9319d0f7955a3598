//! Test mode: replays a node's questions the way a learner would take them.
//!
//! States: `Loading -> InProgress { index, answer, feedback } -> Complete`, or
//! `Loading -> Empty` when the node has no questions. Transitions are synchronous and
//! user-driven; advancing is only possible once feedback for the current question is shown,
//! so two submissions for one question cannot overlap.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::Question;
use crate::question::grading::{self, GradeError, Verdict};
use crate::question::Answer;

pub const DEFAULT_PASS_SCORE: u8 = 70;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunnerError {
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    #[error("no answer selected")]
    NoAnswer,
    #[error(transparent)]
    Grade(#[from] GradeError),
}

/// Feedback shown after a submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Feedback {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub expected: Option<Answer>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: u64,
    pub is_correct: bool,
    pub user_answer: Answer,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Loading,
    InProgress {
        index: usize,
        answer: Option<Answer>,
        feedback: Option<Feedback>,
    },
    Complete,
    Empty,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::InProgress { feedback: None, .. } => "answering",
            Phase::InProgress { feedback: Some(_), .. } => "showing feedback",
            Phase::Complete => "complete",
            Phase::Empty => "empty",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub correct_count: usize,
    pub total_questions: usize,
    pub final_score: u8,
    pub pass_score: u8,
    pub passed: bool,
}

/// `round(100 * correct / total)`, half rounding up.
pub fn final_score(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((100.0 * correct as f64 / total as f64).round()) as u8
}

#[derive(Clone, Debug)]
pub struct TestRun {
    pub id: Uuid,
    pub node_id: u64,
    pass_score: u8,
    questions: Vec<Question>,
    results: Vec<QuestionResult>,
    phase: Phase,
}

impl TestRun {
    pub fn new(node_id: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            pass_score: DEFAULT_PASS_SCORE,
            questions: Vec::new(),
            results: Vec::new(),
            phase: Phase::Loading,
        }
    }

    /// Finish loading. `pass_score` falls back to the default when node metadata is missing.
    pub fn load(&mut self, questions: Vec<Question>, pass_score: Option<u8>) -> Result<(), RunnerError> {
        if self.phase != Phase::Loading {
            return Err(self.invalid("load"));
        }
        self.pass_score = pass_score.unwrap_or(DEFAULT_PASS_SCORE);
        self.questions = questions;
        self.phase = if self.questions.is_empty() {
            Phase::Empty
        } else {
            Phase::InProgress { index: 0, answer: None, feedback: None }
        };
        info!(target: "test_mode", run = %self.id, node = self.node_id, questions = self.questions.len(), pass_score = self.pass_score, "test run loaded");
        Ok(())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            Phase::InProgress { index, .. } => self.questions.get(*index),
            _ => None,
        }
    }

    /// Pick (or change) the answer for the current question, before submitting.
    pub fn select(&mut self, chosen: Answer) -> Result<(), RunnerError> {
        match &mut self.phase {
            Phase::InProgress { answer, feedback: None, .. } => {
                *answer = Some(chosen);
                Ok(())
            }
            _ => Err(self.invalid("select an answer")),
        }
    }

    /// Grade the selected answer and show feedback. The index does not move.
    pub fn submit(&mut self) -> Result<Feedback, RunnerError> {
        let Phase::InProgress { index, answer, feedback: None } = &self.phase else {
            return Err(self.invalid("submit"));
        };
        let chosen = answer.as_ref().ok_or(RunnerError::NoAnswer)?;
        let question = &self.questions[*index];
        let verdict = grading::evaluate(&question.content, chosen)?;
        let shown = Feedback { verdict, expected: grading::answer_key(&question.content) };
        debug!(target: "test_mode", run = %self.id, question = question.id, correct = shown.verdict.correct, "answer submitted");

        if let Phase::InProgress { feedback, .. } = &mut self.phase {
            *feedback = Some(shown.clone());
        }
        Ok(shown)
    }

    /// `select` + `submit` in one step.
    pub fn answer(&mut self, chosen: Answer) -> Result<Feedback, RunnerError> {
        self.select(chosen)?;
        self.submit()
    }

    /// Record the current result and move on; completes after the last question.
    pub fn advance(&mut self) -> Result<&Phase, RunnerError> {
        let Phase::InProgress { index, answer: Some(answer), feedback: Some(feedback) } = &self.phase else {
            return Err(self.invalid("advance"));
        };
        let index = *index;
        self.results.push(QuestionResult {
            question_id: self.questions[index].id,
            is_correct: feedback.verdict.correct,
            user_answer: answer.clone(),
        });

        self.phase = if index + 1 >= self.questions.len() {
            if let Some(summary) = self.summary_of_results() {
                info!(target: "test_mode", run = %self.id, score = summary.final_score, passed = summary.passed, "test run complete");
            }
            Phase::Complete
        } else {
            Phase::InProgress { index: index + 1, answer: None, feedback: None }
        };
        Ok(&self.phase)
    }

    /// From `Complete`: drop all results and start over at the first question.
    pub fn restart(&mut self) -> Result<(), RunnerError> {
        if self.phase != Phase::Complete {
            return Err(self.invalid("restart"));
        }
        self.results.clear();
        self.phase = Phase::InProgress { index: 0, answer: None, feedback: None };
        Ok(())
    }

    /// Score and pass/fail; only available once complete.
    pub fn summary(&self) -> Option<Summary> {
        match self.phase {
            Phase::Complete => self.summary_of_results(),
            _ => None,
        }
    }

    fn summary_of_results(&self) -> Option<Summary> {
        let total = self.questions.len();
        if total == 0 {
            return None;
        }
        let correct_count = self.results.iter().filter(|r| r.is_correct).count();
        let score = final_score(correct_count, total);
        Some(Summary {
            correct_count,
            total_questions: total,
            final_score: score,
            pass_score: self.pass_score,
            passed: score >= self.pass_score,
        })
    }

    fn invalid(&self, action: &'static str) -> RunnerError {
        RunnerError::InvalidTransition { action, state: self.phase.name() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{ContentEdit, QuestionContent, QuestionType};

    fn mc_question(id: u64, correct: &str) -> Question {
        let mut content = QuestionContent::blank(QuestionType::MultipleChoice);
        content.apply_edit(&ContentEdit::MarkCorrect { id: correct.into() });
        Question { id, node_id: 1, position: id as u32, content }
    }

    fn three_questions() -> Vec<Question> {
        vec![mc_question(1, "A"), mc_question(2, "B"), mc_question(3, "C")]
    }

    fn pick(id: &str) -> Answer {
        Answer::MultipleChoice(id.into())
    }

    fn run_two_of_three(pass_score: u8) -> TestRun {
        let mut run = TestRun::new(1);
        run.load(three_questions(), Some(pass_score)).unwrap();
        for chosen in ["A", "B", "D"] {
            run.answer(pick(chosen)).unwrap();
            run.advance().unwrap();
        }
        run
    }

    #[test]
    fn two_of_three_scores_67_and_fails_at_70() {
        let run = run_two_of_three(70);
        let summary = run.summary().unwrap();
        assert_eq!(summary.final_score, 67);
        assert_eq!(summary.correct_count, 2);
        assert!(!summary.passed);
    }

    #[test]
    fn two_of_three_passes_at_60() {
        let summary = run_two_of_three(60).summary().unwrap();
        assert_eq!(summary.final_score, 67);
        assert!(summary.passed);
    }

    #[test]
    fn pass_score_defaults_to_70() {
        let mut run = TestRun::new(1);
        run.load(vec![mc_question(1, "A")], None).unwrap();
        run.answer(pick("A")).unwrap();
        run.advance().unwrap();
        assert_eq!(run.summary().unwrap().pass_score, 70);
    }

    #[test]
    fn no_questions_ends_in_empty() {
        let mut run = TestRun::new(9);
        run.load(Vec::new(), Some(50)).unwrap();
        assert_eq!(run.phase(), &Phase::Empty);
        assert!(run.summary().is_none());
        assert!(matches!(run.select(pick("A")), Err(RunnerError::InvalidTransition { .. })));
    }

    #[test]
    fn submit_requires_an_answer() {
        let mut run = TestRun::new(1);
        run.load(three_questions(), None).unwrap();
        assert_eq!(run.submit(), Err(RunnerError::NoAnswer));
    }

    #[test]
    fn advance_requires_feedback_first() {
        let mut run = TestRun::new(1);
        run.load(three_questions(), None).unwrap();
        run.select(pick("A")).unwrap();
        assert!(matches!(run.advance(), Err(RunnerError::InvalidTransition { action: "advance", .. })));

        let feedback = run.submit().unwrap();
        assert!(feedback.verdict.correct);
        assert_eq!(feedback.expected, Some(pick("A")));
        // Feedback is shown: the index stays put and the answer is locked.
        assert!(matches!(run.phase(), Phase::InProgress { index: 0, feedback: Some(_), .. }));
        assert!(run.select(pick("B")).is_err());
        assert!(run.submit().is_err());

        run.advance().unwrap();
        assert!(matches!(run.phase(), Phase::InProgress { index: 1, answer: None, feedback: None }));
    }

    #[test]
    fn results_are_recorded_in_order() {
        let run = run_two_of_three(70);
        let got: Vec<(u64, bool)> = run.results().iter().map(|r| (r.question_id, r.is_correct)).collect();
        assert_eq!(got, [(1, true), (2, true), (3, false)]);
        assert_eq!(run.results()[2].user_answer, pick("D"));
    }

    #[test]
    fn restart_clears_results_and_returns_to_first_question() {
        let mut run = run_two_of_three(70);
        run.restart().unwrap();
        assert!(run.results().is_empty());
        assert_eq!(run.current_question().map(|q| q.id), Some(1));
        assert!(run.summary().is_none());
    }

    #[test]
    fn restart_only_from_complete() {
        let mut run = TestRun::new(1);
        run.load(three_questions(), None).unwrap();
        assert!(matches!(run.restart(), Err(RunnerError::InvalidTransition { action: "restart", state: "answering" })));
    }

    #[test]
    fn answer_of_the_wrong_type_is_reported_and_not_recorded() {
        let mut run = TestRun::new(1);
        run.load(three_questions(), None).unwrap();
        let err = run.answer(Answer::SliderValue(1.0)).unwrap_err();
        assert!(matches!(err, RunnerError::Grade(GradeError::AnswerMismatch { .. })));
        assert!(matches!(run.phase(), Phase::InProgress { feedback: None, .. }));
    }

    #[test]
    fn score_rounding() {
        assert_eq!(final_score(2, 3), 67);
        assert_eq!(final_score(1, 3), 33);
        assert_eq!(final_score(1, 2), 50);
        assert_eq!(final_score(1, 8), 13);
        assert_eq!(final_score(0, 0), 0);
    }
}
