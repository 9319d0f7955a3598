//! Preview instances: a replayable, single-question interaction.
//!
//! An instance owns its arrangement (shuffled ordering items, shuffled matching right
//! column) for its whole lifetime, and a draft answer built from `PreviewAction`s.
//! Checking goes through the grading engine, never a local copy of the rule.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::grading::{self, Verdict};
use super::{each_schema, Answer, Layout, Outcome, PreviewAction, QuestionContent, QuestionSchema, QuestionType};
use crate::util::words;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreviewError {
    #[error("nothing to check yet: interact with the question first")]
    NoAnswer,
    #[error(transparent)]
    Grade(#[from] grading::GradeError),
}

#[derive(Clone, Debug)]
pub struct Preview {
    pub id: Uuid,
    question_id: Option<u64>,
    content: QuestionContent,
    layout: Layout,
    draft: Option<Answer>,
    verdict: Option<Verdict>,
}

/// Serializable snapshot of a preview instance.
#[derive(Clone, Debug, Serialize)]
pub struct PreviewView {
    pub id: Uuid,
    #[serde(rename = "questionId", skip_serializing_if = "Option::is_none")]
    pub question_id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub content: serde_json::Value,
    pub layout: Layout,
    /// Tokenized sentence for word-picking types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<String>,
    pub draft: Option<Answer>,
    pub verdict: Option<Verdict>,
}

fn start_schema<S: QuestionSchema, R: Rng + ?Sized>(content: &S, rng: &mut R) -> (Layout, Option<Answer>) {
    let layout = content.layout(rng);
    let draft = content.initial_draft(&layout).map(S::wrap);
    (layout, draft)
}

fn restart_schema<S: QuestionSchema>(content: &S, layout: &Layout) -> Option<Answer> {
    content.initial_draft(layout).map(S::wrap)
}

fn interact_schema<S: QuestionSchema>(content: &S, draft: &mut Option<Answer>, action: &PreviewAction) -> Outcome {
    let mut typed = draft.as_ref().and_then(S::unwrap).cloned();
    let outcome = content.interact(&mut typed, action);
    if outcome.is_applied() {
        *draft = typed.map(S::wrap);
    }
    outcome
}

impl Preview {
    pub fn new<R: Rng + ?Sized>(question_id: Option<u64>, content: QuestionContent, rng: &mut R) -> Self {
        let (layout, draft) = each_schema!(&content, c => start_schema(c, rng));
        Self { id: Uuid::new_v4(), question_id, content, layout, draft, verdict: None }
    }

    pub fn question_id(&self) -> Option<u64> {
        self.question_id
    }

    #[cfg(test)]
    pub fn draft(&self) -> Option<&Answer> {
        self.draft.as_ref()
    }

    #[cfg(test)]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Apply one simulated interaction. Any interaction clears a previous verdict.
    pub fn act(&mut self, action: &PreviewAction) -> Outcome {
        let outcome = each_schema!(&self.content, c => interact_schema(c, &mut self.draft, action));
        if outcome.is_applied() {
            self.verdict = None;
        }
        outcome
    }

    pub fn check(&mut self) -> Result<Verdict, PreviewError> {
        let draft = self.draft.as_ref().ok_or(PreviewError::NoAnswer)?;
        let verdict = grading::evaluate(&self.content, draft)?;
        self.verdict = Some(verdict.clone());
        Ok(verdict)
    }

    /// Back to the starting state; the arrangement is kept.
    pub fn restart(&mut self) {
        self.draft = each_schema!(&self.content, c => restart_schema(c, &self.layout));
        self.verdict = None;
    }

    /// Point the instance at (possibly) new content. Any change of identity or value
    /// discards all interaction state and draws a fresh arrangement.
    /// Returns whether a reset happened.
    pub fn sync<R: Rng + ?Sized>(&mut self, question_id: Option<u64>, content: QuestionContent, rng: &mut R) -> bool {
        if self.question_id == question_id && self.content == content {
            return false;
        }
        let id = self.id;
        *self = Preview::new(question_id, content, rng);
        self.id = id;
        true
    }

    pub fn view(&self) -> PreviewView {
        let sentence = match &self.content {
            QuestionContent::FindError(c) => Some(c.sentence.as_str()),
            QuestionContent::StrikeOut(c) => Some(c.sentence.as_str()),
            _ => None,
        };
        PreviewView {
            id: self.id,
            question_id: self.question_id,
            kind: self.content.kind(),
            content: self.content.payload(),
            layout: self.layout.clone(),
            words: sentence.map(|s| words(s).into_iter().map(str::to_string).collect()).unwrap_or_default(),
            draft: self.draft.clone(),
            verdict: self.verdict.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::question::{ContentEdit, Ordering, Rejection};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn ordering_of(n: usize) -> QuestionContent {
        let mut o = Ordering::blank();
        while o.items.len() < n {
            o.apply_edit(&ContentEdit::AddItem);
        }
        QuestionContent::Ordering(o)
    }

    #[test]
    fn check_without_interaction_is_an_error() {
        let mut p = Preview::new(None, QuestionContent::blank(QuestionType::FillGap), &mut rng());
        assert_eq!(p.check(), Err(PreviewError::NoAnswer));
    }

    #[test]
    fn check_uses_the_shared_grading_rule() {
        let mut content = QuestionContent::blank(QuestionType::MultipleChoice);
        content.apply_edit(&ContentEdit::MarkCorrect { id: "B".into() });
        let mut p = Preview::new(Some(1), content, &mut rng());

        p.act(&PreviewAction::Choose { option_id: "A".into() });
        assert!(!p.check().unwrap().correct);
        p.act(&PreviewAction::Choose { option_id: "B".into() });
        assert!(p.view().verdict.is_none());
        assert!(p.check().unwrap().correct);
    }

    #[test]
    fn rejected_actions_leave_the_draft_alone() {
        let mut p = Preview::new(None, QuestionContent::blank(QuestionType::MultipleChoice), &mut rng());
        p.act(&PreviewAction::Choose { option_id: "A".into() });
        let outcome = p.act(&PreviewAction::Slide { value: 3.0 });
        assert!(matches!(outcome, Outcome::Rejected(Rejection::NotApplicable { .. })));
        assert_eq!(p.draft(), Some(&Answer::MultipleChoice("A".into())));
    }

    #[test]
    fn ordering_starts_from_the_shuffled_layout_and_keeps_it_on_restart() {
        let mut p = Preview::new(None, ordering_of(6), &mut rng());
        let Layout::Shuffled { order } = p.layout().clone() else {
            panic!("ordering previews are shuffled");
        };
        assert_eq!(p.draft(), Some(&Answer::Ordering(order.clone())));

        p.act(&PreviewAction::MoveItem { from: 0, to: 5 });
        assert_ne!(p.draft(), Some(&Answer::Ordering(order.clone())));

        p.restart();
        assert_eq!(p.layout(), &Layout::Shuffled { order: order.clone() });
        assert_eq!(p.draft(), Some(&Answer::Ordering(order)));
    }

    #[test]
    fn sync_with_identical_content_keeps_state() {
        let content = QuestionContent::blank(QuestionType::TrendArrow);
        let mut p = Preview::new(Some(3), content.clone(), &mut rng());
        p.act(&PreviewAction::PickTrend { trend: crate::question::Trend::Decrease });
        assert!(!p.sync(Some(3), content, &mut rng()));
        assert!(p.draft().is_some());
    }

    #[test]
    fn sync_with_changed_content_resets_everything() {
        let mut p = Preview::new(Some(3), QuestionContent::blank(QuestionType::TrendArrow), &mut rng());
        let id = p.id;
        p.act(&PreviewAction::PickTrend { trend: crate::question::Trend::Decrease });
        p.check().unwrap();

        assert!(p.sync(Some(4), QuestionContent::blank(QuestionType::TrendArrow), &mut rng()));
        assert_eq!(p.id, id);
        assert!(p.draft().is_none());
        assert!(p.view().verdict.is_none());
        assert_eq!(p.view().question_id, Some(4));
    }

    #[test]
    fn view_exposes_words_for_sentence_types() {
        let mut content = QuestionContent::blank(QuestionType::StrikeOut);
        content.apply_edit(&ContentEdit::SetSentence { sentence: "cut  the extra word".into() });
        let p = Preview::new(None, content, &mut rng());
        assert_eq!(p.view().words, ["cut", "the", "extra", "word"]);
    }

    #[test]
    fn matching_layout_is_stable_for_the_instance() {
        let p = Preview::new(None, QuestionContent::blank(QuestionType::Matching), &mut rng());
        let first = p.layout().clone();
        let mut clone = p.clone();
        clone.restart();
        assert_eq!(clone.layout(), &first);
        assert!(matches!(first, Layout::RightColumn { ref order } if order.len() == 3));
    }
}
