//! User answers, one variant per question type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::QuestionType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Swipe {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increase,
    Decrease,
    NoChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A candidate answer. Wire form: `{"type": "<question type>", "value": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Selected option id.
    MultipleChoice(String),
    /// Index of the word believed to be wrong.
    FindError(usize),
    /// Indices of the words struck out (order irrelevant).
    StrikeOut(Vec<usize>),
    /// Item ids in the submitted order.
    Ordering(Vec<String>),
    /// Highlighted text.
    Highlight(String),
    /// One swipe per card, positionally.
    SwipeDecision(Vec<Swipe>),
    FillGap(String),
    /// Left pair id -> right pair id.
    Matching(BTreeMap<u32, u32>),
    GraphPoint(Point),
    TrendArrow(Trend),
    SliderValue(f64),
}

impl Answer {
    pub fn kind(&self) -> QuestionType {
        match self {
            Answer::MultipleChoice(_) => QuestionType::MultipleChoice,
            Answer::FindError(_) => QuestionType::FindError,
            Answer::StrikeOut(_) => QuestionType::StrikeOut,
            Answer::Ordering(_) => QuestionType::Ordering,
            Answer::Highlight(_) => QuestionType::Highlight,
            Answer::SwipeDecision(_) => QuestionType::SwipeDecision,
            Answer::FillGap(_) => QuestionType::FillGap,
            Answer::Matching(_) => QuestionType::Matching,
            Answer::GraphPoint(_) => QuestionType::GraphPoint,
            Answer::TrendArrow(_) => QuestionType::TrendArrow,
            Answer::SliderValue(_) => QuestionType::SliderValue,
        }
    }

    /// Parse an untyped answer value for a known question type.
    pub fn from_parts(kind: QuestionType, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::json!({ "type": kind.as_str(), "value": value }))
    }
}
