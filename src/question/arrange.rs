//! Arrangement question types: ordering, matching and swipe decisions.

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use super::edit::{next_letter_id, next_numeric_id, ContentEdit, Layout, Outcome, PreviewAction, Rejection};
use super::{Answer, QuestionSchema, QuestionType, Swipe};

const MIN_ITEMS: usize = 2;
const MIN_PAIRS: usize = 2;
const MIN_CARDS: usize = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ordering {
    pub question: String,
    pub items: Vec<OrderItem>,
    pub correct_order: Vec<String>,
}

impl Default for Ordering {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for Ordering {
    const TYPE: QuestionType = QuestionType::Ordering;
    type Answer = Vec<String>;

    fn blank() -> Self {
        let ids = ["A", "B", "C"];
        Self {
            question: String::new(),
            items: ids.iter().map(|id| OrderItem { id: (*id).into(), content: String::new() }).collect(),
            correct_order: ids.iter().map(|id| (*id).to_string()).collect(),
        }
    }

    /// Element-wise sequence equality; any transposition fails.
    fn grade(&self, answer: &Vec<String>) -> bool {
        *answer == self.correct_order
    }

    fn answer_key(&self) -> Option<Vec<String>> {
        Some(self.correct_order.clone())
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::AddItem => {
                let id = next_letter_id(self.items.iter().map(|i| i.id.as_str()));
                self.correct_order.push(id.clone());
                self.items.push(OrderItem { id, content: String::new() });
                Outcome::Applied
            }
            ContentEdit::RemoveItem { id } => {
                if !self.items.iter().any(|i| &i.id == id) {
                    return Outcome::Rejected(Rejection::UnknownId { id: id.clone() });
                }
                if self.items.len() <= MIN_ITEMS {
                    return Outcome::Rejected(Rejection::BelowMinimum { what: "items", min: MIN_ITEMS });
                }
                self.items.retain(|i| &i.id != id);
                // No dangling references in the answer key.
                self.correct_order.retain(|c| c != id);
                Outcome::Applied
            }
            ContentEdit::MoveItem { id, to } => {
                let Some(from) = self.correct_order.iter().position(|c| c == id) else {
                    return Outcome::Rejected(Rejection::UnknownId { id: id.clone() });
                };
                let len = self.correct_order.len();
                if *to >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *to, len });
                }
                let moved = self.correct_order.remove(from);
                self.correct_order.insert(*to, moved);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn layout<R: Rng + ?Sized>(&self, rng: &mut R) -> Layout {
        let mut order: Vec<String> = self.items.iter().map(|i| i.id.clone()).collect();
        order.shuffle(rng);
        Layout::Shuffled { order }
    }

    /// The shuffled arrangement is the starting answer.
    fn initial_draft(&self, layout: &Layout) -> Option<Vec<String>> {
        match layout {
            Layout::Shuffled { order } => Some(order.clone()),
            _ => Some(self.items.iter().map(|i| i.id.clone()).collect()),
        }
    }

    fn interact(&self, draft: &mut Option<Vec<String>>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::MoveItem { from, to } => {
                let order = draft.get_or_insert_with(|| self.items.iter().map(|i| i.id.clone()).collect());
                let len = order.len();
                if *from >= len || *to >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: (*from).max(*to), len });
                }
                let moved = order.remove(*from);
                order.insert(*to, moved);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: Vec<String>) -> Answer {
        Answer::Ordering(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&Vec<String>> {
        match answer {
            Answer::Ordering(a) => Some(a),
            _ => None,
        }
    }
}

/// One left/right pair. The pair id is the match key for both sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    pub id: u32,
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub right: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Matching {
    pub pairs: Vec<MatchPair>,
}

impl Default for Matching {
    fn default() -> Self {
        Self::blank()
    }
}

/// Per-pair result of a matching answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchTally {
    pub correct: usize,
    pub total: usize,
}

impl MatchTally {
    pub fn all_correct(&self) -> bool {
        self.correct == self.total
    }
}

impl Matching {
    /// Count of recorded mappings that point a left entry at its own pair.
    pub fn tally(&self, answer: &BTreeMap<u32, u32>) -> MatchTally {
        let correct = self
            .pairs
            .iter()
            .filter(|p| answer.get(&p.id) == Some(&p.id))
            .count();
        MatchTally { correct, total: self.pairs.len() }
    }

    fn has_pair(&self, id: u32) -> bool {
        self.pairs.iter().any(|p| p.id == id)
    }
}

impl QuestionSchema for Matching {
    const TYPE: QuestionType = QuestionType::Matching;
    type Answer = BTreeMap<u32, u32>;

    fn blank() -> Self {
        let pairs = (1..=3)
            .map(|id| MatchPair { id, left: String::new(), right: String::new() })
            .collect();
        Self { pairs }
    }

    /// Every pair must be mapped, and every mapping must point left id -> same right id.
    fn grade(&self, answer: &BTreeMap<u32, u32>) -> bool {
        answer.len() == self.pairs.len() && self.tally(answer).all_correct()
    }

    fn answer_key(&self) -> Option<BTreeMap<u32, u32>> {
        Some(self.pairs.iter().map(|p| (p.id, p.id)).collect())
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::AddPair => {
                let id = next_numeric_id(self.pairs.iter().map(|p| p.id));
                self.pairs.push(MatchPair { id, left: String::new(), right: String::new() });
                Outcome::Applied
            }
            ContentEdit::RemovePair { id } => {
                if !self.has_pair(*id) {
                    return Outcome::Rejected(Rejection::UnknownId { id: id.to_string() });
                }
                if self.pairs.len() <= MIN_PAIRS {
                    return Outcome::Rejected(Rejection::BelowMinimum { what: "pairs", min: MIN_PAIRS });
                }
                self.pairs.retain(|p| p.id != *id);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn layout<R: Rng + ?Sized>(&self, rng: &mut R) -> Layout {
        let mut order: Vec<u32> = self.pairs.iter().map(|p| p.id).collect();
        order.shuffle(rng);
        Layout::RightColumn { order }
    }

    fn interact(&self, draft: &mut Option<BTreeMap<u32, u32>>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Match { left, right } => {
                for id in [left, right] {
                    if !self.has_pair(*id) {
                        return Outcome::Rejected(Rejection::UnknownId { id: id.to_string() });
                    }
                }
                let map = draft.get_or_insert_with(BTreeMap::new);
                // A right entry can only be used once.
                map.retain(|_, r| r != right);
                map.insert(*left, *right);
                Outcome::Applied
            }
            PreviewAction::Unmatch { left } => {
                let removed = draft.as_mut().and_then(|m| m.remove(left));
                if draft.as_ref().is_some_and(BTreeMap::is_empty) {
                    *draft = None;
                }
                match removed {
                    Some(_) => Outcome::Applied,
                    None => Outcome::Rejected(Rejection::UnknownId { id: left.to_string() }),
                }
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: BTreeMap<u32, u32>) -> Answer {
        Answer::Matching(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&BTreeMap<u32, u32>> {
        match answer {
            Answer::Matching(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwipeCard {
    #[serde(default)]
    pub content: String,
    pub correct_swipe: Swipe,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwipeLabels {
    pub left: String,
    pub right: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwipeDecision {
    pub cards: Vec<SwipeCard>,
    pub labels: SwipeLabels,
}

impl Default for SwipeDecision {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for SwipeDecision {
    const TYPE: QuestionType = QuestionType::SwipeDecision;
    type Answer = Vec<Swipe>;

    fn blank() -> Self {
        Self {
            cards: vec![
                SwipeCard { content: String::new(), correct_swipe: Swipe::Left },
                SwipeCard { content: String::new(), correct_swipe: Swipe::Right },
            ],
            labels: SwipeLabels { left: "False".into(), right: "True".into() },
        }
    }

    /// Positional: one swipe per card, each equal to the card's expected direction.
    fn grade(&self, answer: &Vec<Swipe>) -> bool {
        answer.len() == self.cards.len()
            && self.cards.iter().zip(answer).all(|(card, swipe)| card.correct_swipe == *swipe)
    }

    fn answer_key(&self) -> Option<Vec<Swipe>> {
        Some(self.cards.iter().map(|c| c.correct_swipe).collect())
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::AddCard => {
                self.cards.push(SwipeCard { content: String::new(), correct_swipe: Swipe::Right });
                Outcome::Applied
            }
            ContentEdit::RemoveCard { index } => {
                let len = self.cards.len();
                if *index >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *index, len });
                }
                if len <= MIN_CARDS {
                    return Outcome::Rejected(Rejection::BelowMinimum { what: "cards", min: MIN_CARDS });
                }
                self.cards.remove(*index);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn interact(&self, draft: &mut Option<Vec<Swipe>>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Swipe { direction } => {
                let swipes = draft.get_or_insert_with(Vec::new);
                if swipes.len() >= self.cards.len() {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: swipes.len(), len: self.cards.len() });
                }
                swipes.push(*direction);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: Vec<Swipe>) -> Answer {
        Answer::SwipeDecision(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&Vec<Swipe>> {
        match answer {
            Answer::SwipeDecision(a) => Some(a),
            _ => None,
        }
    }
}
