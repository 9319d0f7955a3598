//! Authoring edits, preview actions and their outcomes.
//!
//! Both kinds of operations are applied to in-memory values only. A violation (removing
//! below a minimum, an unknown id, an index past the sentence) never raises: the edit is
//! answered with `Outcome::Rejected` and the value is left untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{answer::Swipe, answer::Trend, QuestionType};

/// Structural authoring edits. Each type accepts the subset that makes sense for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ContentEdit {
    // multiple_choice
    AddOption,
    RemoveOption { id: String },
    MarkCorrect { id: String },
    SetOptionText { id: String, text: String },
    // ordering
    AddItem,
    RemoveItem { id: String },
    MoveItem { id: String, to: usize },
    // matching
    AddPair,
    RemovePair { id: u32 },
    // find_error / strike_out
    SetSentence { sentence: String },
    SelectErrorWord { index: usize },
    ToggleStrikeWord { index: usize },
    // swipe_decision
    AddCard,
    RemoveCard { index: usize },
}

impl ContentEdit {
    pub fn name(&self) -> &'static str {
        match self {
            ContentEdit::AddOption => "add_option",
            ContentEdit::RemoveOption { .. } => "remove_option",
            ContentEdit::MarkCorrect { .. } => "mark_correct",
            ContentEdit::SetOptionText { .. } => "set_option_text",
            ContentEdit::AddItem => "add_item",
            ContentEdit::RemoveItem { .. } => "remove_item",
            ContentEdit::MoveItem { .. } => "move_item",
            ContentEdit::AddPair => "add_pair",
            ContentEdit::RemovePair { .. } => "remove_pair",
            ContentEdit::SetSentence { .. } => "set_sentence",
            ContentEdit::SelectErrorWord { .. } => "select_error_word",
            ContentEdit::ToggleStrikeWord { .. } => "toggle_strike_word",
            ContentEdit::AddCard => "add_card",
            ContentEdit::RemoveCard { .. } => "remove_card",
        }
    }
}

/// Simulated user interactions inside a preview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PreviewAction {
    Choose { option_id: String },
    /// find_error selects the word; strike_out toggles it.
    PickWord { index: usize },
    /// Move the item at position `from` to position `to` (0-based).
    MoveItem { from: usize, to: usize },
    Highlight { text: String },
    Swipe { direction: Swipe },
    Type { text: String },
    Match { left: u32, right: u32 },
    Unmatch { left: u32 },
    Plot { x: f64, y: f64 },
    PickTrend { trend: Trend },
    Slide { value: f64 },
}

impl PreviewAction {
    pub fn name(&self) -> &'static str {
        match self {
            PreviewAction::Choose { .. } => "choose",
            PreviewAction::PickWord { .. } => "pick_word",
            PreviewAction::MoveItem { .. } => "move_item",
            PreviewAction::Highlight { .. } => "highlight",
            PreviewAction::Swipe { .. } => "swipe",
            PreviewAction::Type { .. } => "type",
            PreviewAction::Match { .. } => "match",
            PreviewAction::Unmatch { .. } => "unmatch",
            PreviewAction::Plot { .. } => "plot",
            PreviewAction::PickTrend { .. } => "pick_trend",
            PreviewAction::Slide { .. } => "slide",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rejection {
    #[error("'{op}' does not apply to {kind} questions")]
    NotApplicable { op: &'static str, kind: QuestionType },
    #[error("at least {min} {what} required")]
    BelowMinimum { what: &'static str, min: usize },
    #[error("no entry with id '{id}'")]
    UnknownId { id: String },
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl Rejection {
    pub fn not_applicable(op: &'static str, kind: QuestionType) -> Self {
        Rejection::NotApplicable { op, kind }
    }
}

/// Arrangement of a preview instance, decided once when the instance is created.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    Natural,
    /// ordering: item ids in their shuffled starting order.
    Shuffled { order: Vec<String> },
    /// matching: pair ids in the order the right column is displayed.
    RightColumn { order: Vec<u32> },
}

/// Spreadsheet-style lettering: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn letter_id(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Smallest lettered id not already taken.
pub fn next_letter_id<'a>(taken: impl Iterator<Item = &'a str> + Clone) -> String {
    (0..)
        .map(letter_id)
        .find(|candidate| !taken.clone().any(|t| t == candidate.as_str()))
        .unwrap_or_default()
}

/// Next sequential numeric id (max + 1, starting at 1).
pub fn next_numeric_id(taken: impl Iterator<Item = u32>) -> u32 {
    taken.max().map_or(1, |m| m + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_ids_roll_over_like_spreadsheet_columns() {
        assert_eq!(letter_id(0), "A");
        assert_eq!(letter_id(3), "D");
        assert_eq!(letter_id(25), "Z");
        assert_eq!(letter_id(26), "AA");
        assert_eq!(letter_id(27), "AB");
    }

    #[test]
    fn next_letter_id_fills_gaps() {
        let taken = ["A", "C"];
        assert_eq!(next_letter_id(taken.iter().copied()), "B");
    }

    #[test]
    fn next_numeric_id_is_max_plus_one() {
        assert_eq!(next_numeric_id([1u32, 2, 5].into_iter()), 6);
        assert_eq!(next_numeric_id(std::iter::empty()), 1);
    }

    #[test]
    fn edits_parse_from_op_tagged_json() {
        let e: ContentEdit = serde_json::from_str(r#"{"op":"move_item","id":"B","to":0}"#).unwrap();
        assert_eq!(e, ContentEdit::MoveItem { id: "B".into(), to: 0 });
        assert_eq!(e.name(), "move_item");
    }
}
