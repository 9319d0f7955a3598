//! Single-pick question types: multiple choice and trend arrow.

use serde::{Deserialize, Serialize};

use super::edit::{next_letter_id, ContentEdit, Outcome, PreviewAction, Rejection};
use super::{Answer, QuestionSchema, QuestionType, Trend};

const MIN_OPTIONS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultipleChoice {
    pub question: String,
    pub options: Vec<ChoiceOption>,
    pub explanation: String,
}

impl Default for MultipleChoice {
    fn default() -> Self {
        Self::blank()
    }
}

impl MultipleChoice {
    /// The correct option, if exactly one is marked.
    pub fn correct_option(&self) -> Option<&ChoiceOption> {
        let mut marked = self.options.iter().filter(|o| o.is_correct);
        match (marked.next(), marked.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn has_option(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id == id)
    }
}

impl QuestionSchema for MultipleChoice {
    const TYPE: QuestionType = QuestionType::MultipleChoice;
    type Answer = String;

    fn blank() -> Self {
        let options = ["A", "B", "C", "D"]
            .into_iter()
            .map(|id| ChoiceOption { id: id.into(), text: String::new(), is_correct: false })
            .collect();
        Self { question: String::new(), options, explanation: String::new() }
    }

    fn grade(&self, answer: &String) -> bool {
        self.correct_option().is_some_and(|o| &o.id == answer)
    }

    fn answer_key(&self) -> Option<String> {
        self.correct_option().map(|o| o.id.clone())
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::AddOption => {
                let id = next_letter_id(self.options.iter().map(|o| o.id.as_str()));
                self.options.push(ChoiceOption { id, text: String::new(), is_correct: false });
                Outcome::Applied
            }
            ContentEdit::RemoveOption { id } => {
                if !self.has_option(id) {
                    return Outcome::Rejected(Rejection::UnknownId { id: id.clone() });
                }
                if self.options.len() <= MIN_OPTIONS {
                    return Outcome::Rejected(Rejection::BelowMinimum { what: "options", min: MIN_OPTIONS });
                }
                self.options.retain(|o| &o.id != id);
                Outcome::Applied
            }
            ContentEdit::MarkCorrect { id } => {
                if !self.has_option(id) {
                    return Outcome::Rejected(Rejection::UnknownId { id: id.clone() });
                }
                // Single-select: marking one clears the rest.
                for o in &mut self.options {
                    o.is_correct = &o.id == id;
                }
                Outcome::Applied
            }
            ContentEdit::SetOptionText { id, text } => match self.options.iter_mut().find(|o| &o.id == id) {
                Some(o) => {
                    o.text = text.clone();
                    Outcome::Applied
                }
                None => Outcome::Rejected(Rejection::UnknownId { id: id.clone() }),
            },
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn interact(&self, draft: &mut Option<String>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Choose { option_id } if self.has_option(option_id) => {
                *draft = Some(option_id.clone());
                Outcome::Applied
            }
            PreviewAction::Choose { option_id } => Outcome::Rejected(Rejection::UnknownId { id: option_id.clone() }),
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: String) -> Answer {
        Answer::MultipleChoice(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&String> {
        match answer {
            Answer::MultipleChoice(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendArrow {
    pub question: String,
    pub correct_trend: Trend,
}

impl Default for TrendArrow {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for TrendArrow {
    const TYPE: QuestionType = QuestionType::TrendArrow;
    type Answer = Trend;

    fn blank() -> Self {
        Self { question: String::new(), correct_trend: Trend::Increase }
    }

    fn grade(&self, answer: &Trend) -> bool {
        *answer == self.correct_trend
    }

    fn answer_key(&self) -> Option<Trend> {
        Some(self.correct_trend)
    }

    fn interact(&self, draft: &mut Option<Trend>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::PickTrend { trend } => {
                *draft = Some(*trend);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: Trend) -> Answer {
        Answer::TrendArrow(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&Trend> {
        match answer {
            Answer::TrendArrow(a) => Some(a),
            _ => None,
        }
    }
}
