//! Question content model.
//!
//! Every question type is one struct implementing [`QuestionSchema`]. The trait bundles
//! the four per-type concerns the dashboard needs:
//!   - `blank()`: default content installed when an author picks (or switches to) the type
//!   - `grade()`: the correctness predicate, shared by preview and test mode
//!   - `apply_edit()`: structural authoring edits (options, items, pairs, word picks)
//!   - `layout()` / `initial_draft()` / `interact()`: the preview interaction contract
//!
//! [`QuestionContent`] is the tagged union persisted with a question; it only dispatches.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod answer;
pub mod arrange;
pub mod choice;
pub mod edit;
pub mod grading;
pub mod numeric;
pub mod preview;
pub mod text;

pub use answer::{Answer, Point, Swipe, Trend};
pub use arrange::{Matching, Ordering, SwipeDecision};
pub use choice::{MultipleChoice, TrendArrow};
pub use edit::{ContentEdit, Layout, Outcome, PreviewAction, Rejection};
pub use grading::GradeError;
pub use numeric::{GraphPoint, SliderValue};
pub use text::{FillGap, FindError, Highlight, StrikeOut};

/// The eleven question type tags, as stored and sent over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FindError,
    StrikeOut,
    Ordering,
    Highlight,
    SwipeDecision,
    FillGap,
    Matching,
    GraphPoint,
    TrendArrow,
    SliderValue,
}

impl QuestionType {
    pub const ALL: [QuestionType; 11] = [
        QuestionType::MultipleChoice,
        QuestionType::FindError,
        QuestionType::StrikeOut,
        QuestionType::Ordering,
        QuestionType::Highlight,
        QuestionType::SwipeDecision,
        QuestionType::FillGap,
        QuestionType::Matching,
        QuestionType::GraphPoint,
        QuestionType::TrendArrow,
        QuestionType::SliderValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::FindError => "find_error",
            QuestionType::StrikeOut => "strike_out",
            QuestionType::Ordering => "ordering",
            QuestionType::Highlight => "highlight",
            QuestionType::SwipeDecision => "swipe_decision",
            QuestionType::FillGap => "fill_gap",
            QuestionType::Matching => "matching",
            QuestionType::GraphPoint => "graph_point",
            QuestionType::TrendArrow => "trend_arrow",
            QuestionType::SliderValue => "slider_value",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GradeError::UnknownQuestionType(s.to_string()))
    }
}

/// One question type: content shape, default, grading rule, structural editors and
/// preview interactions.
pub trait QuestionSchema: Clone + PartialEq + Sized {
    const TYPE: QuestionType;
    type Answer: Clone;

    /// Fresh, valid content for a newly created (or re-typed) question.
    fn blank() -> Self;

    /// Correctness predicate. Pure; never mutates content or answer.
    fn grade(&self, answer: &Self::Answer) -> bool;

    /// An answer that satisfies `grade`, when the content defines one.
    fn answer_key(&self) -> Option<Self::Answer>;

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        Outcome::Rejected(Rejection::not_applicable(edit.name(), Self::TYPE))
    }

    /// Arrangement fixed for the lifetime of one preview instance.
    fn layout<R: Rng + ?Sized>(&self, _rng: &mut R) -> Layout {
        Layout::Natural
    }

    fn initial_draft(&self, _layout: &Layout) -> Option<Self::Answer> {
        None
    }

    fn interact(&self, draft: &mut Option<Self::Answer>, action: &PreviewAction) -> Outcome;

    fn wrap(answer: Self::Answer) -> Answer;

    fn unwrap(answer: &Answer) -> Option<&Self::Answer>;
}

/// Type-tagged content payload. The field set is fully determined by the tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum QuestionContent {
    MultipleChoice(MultipleChoice),
    FindError(FindError),
    StrikeOut(StrikeOut),
    Ordering(Ordering),
    Highlight(Highlight),
    SwipeDecision(SwipeDecision),
    FillGap(FillGap),
    Matching(Matching),
    GraphPoint(GraphPoint),
    TrendArrow(TrendArrow),
    SliderValue(SliderValue),
}

macro_rules! each_schema {
    ($content:expr, $c:ident => $body:expr) => {
        match $content {
            QuestionContent::MultipleChoice($c) => $body,
            QuestionContent::FindError($c) => $body,
            QuestionContent::StrikeOut($c) => $body,
            QuestionContent::Ordering($c) => $body,
            QuestionContent::Highlight($c) => $body,
            QuestionContent::SwipeDecision($c) => $body,
            QuestionContent::FillGap($c) => $body,
            QuestionContent::Matching($c) => $body,
            QuestionContent::GraphPoint($c) => $body,
            QuestionContent::TrendArrow($c) => $body,
            QuestionContent::SliderValue($c) => $body,
        }
    };
}
pub(crate) use each_schema;

fn type_of<S: QuestionSchema>(_: &S) -> QuestionType {
    S::TYPE
}

impl QuestionContent {
    /// Registry lookup: the default content for `kind`.
    pub fn blank(kind: QuestionType) -> Self {
        match kind {
            QuestionType::MultipleChoice => QuestionContent::MultipleChoice(MultipleChoice::blank()),
            QuestionType::FindError => QuestionContent::FindError(FindError::blank()),
            QuestionType::StrikeOut => QuestionContent::StrikeOut(StrikeOut::blank()),
            QuestionType::Ordering => QuestionContent::Ordering(Ordering::blank()),
            QuestionType::Highlight => QuestionContent::Highlight(Highlight::blank()),
            QuestionType::SwipeDecision => QuestionContent::SwipeDecision(SwipeDecision::blank()),
            QuestionType::FillGap => QuestionContent::FillGap(FillGap::blank()),
            QuestionType::Matching => QuestionContent::Matching(Matching::blank()),
            QuestionType::GraphPoint => QuestionContent::GraphPoint(GraphPoint::blank()),
            QuestionType::TrendArrow => QuestionContent::TrendArrow(TrendArrow::blank()),
            QuestionType::SliderValue => QuestionContent::SliderValue(SliderValue::blank()),
        }
    }

    pub fn kind(&self) -> QuestionType {
        each_schema!(self, c => type_of(c))
    }

    /// Build content from a type tag and an untyped JSON payload.
    pub fn from_parts(kind: QuestionType, content: serde_json::Value) -> Result<Self, GradeError> {
        let tagged = serde_json::json!({ "type": kind.as_str(), "content": content });
        serde_json::from_value(tagged).map_err(|e| GradeError::InvalidContent {
            kind,
            reason: e.to_string(),
        })
    }

    /// The bare payload (without the type tag), as authors see it in the form.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("content").map(serde_json::Value::take))
            .unwrap_or(serde_json::Value::Null)
    }

    /// AuthoringFormDispatcher entry point.
    pub fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        each_schema!(self, c => c.apply_edit(edit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_round_trip_through_from_str() {
        for t in QuestionType::ALL {
            assert_eq!(t.as_str().parse::<QuestionType>().unwrap(), t);
        }
        assert!(matches!(
            "essay".parse::<QuestionType>(),
            Err(GradeError::UnknownQuestionType(tag)) if tag == "essay"
        ));
    }

    #[test]
    fn every_blank_reports_its_own_type() {
        for t in QuestionType::ALL {
            assert_eq!(QuestionContent::blank(t).kind(), t);
        }
    }

    #[test]
    fn multiple_choice_blank_has_four_unmarked_lettered_options() {
        let QuestionContent::MultipleChoice(mc) = QuestionContent::blank(QuestionType::MultipleChoice) else {
            panic!("wrong variant");
        };
        let ids: Vec<&str> = mc.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C", "D"]);
        assert!(mc.options.iter().all(|o| !o.is_correct));
    }

    #[test]
    fn ordering_and_matching_blanks() {
        let QuestionContent::Ordering(o) = QuestionContent::blank(QuestionType::Ordering) else {
            panic!("wrong variant");
        };
        let ids: Vec<&str> = o.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(o.correct_order, ["A", "B", "C"]);

        let QuestionContent::Matching(m) = QuestionContent::blank(QuestionType::Matching) else {
            panic!("wrong variant");
        };
        let ids: Vec<u32> = m.pairs.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn wire_format_is_adjacently_tagged() {
        let content = QuestionContent::blank(QuestionType::TrendArrow);
        let v = serde_json::to_value(&content).unwrap();
        assert_eq!(v["type"], "trend_arrow");
        assert_eq!(v["content"]["correct_trend"], "increase");

        let back = QuestionContent::from_parts(QuestionType::TrendArrow, content.payload()).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn from_parts_rejects_foreign_fields_shape() {
        let err = QuestionContent::from_parts(
            QuestionType::SliderValue,
            serde_json::json!({ "correct_value": "fifty" }),
        )
        .unwrap_err();
        assert!(matches!(err, GradeError::InvalidContent { kind: QuestionType::SliderValue, .. }));
    }
}
