//! Sentence and free-text question types: find-error, strike-out, highlight, fill-gap.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::edit::{ContentEdit, Outcome, PreviewAction, Rejection};
use super::{Answer, QuestionSchema, QuestionType};
use crate::util::{fold, word_count};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FindError {
    pub sentence: String,
    pub error_index: usize,
    pub correct_word: String,
}

impl Default for FindError {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for FindError {
    const TYPE: QuestionType = QuestionType::FindError;
    type Answer = usize;

    fn blank() -> Self {
        Self { sentence: String::new(), error_index: 0, correct_word: String::new() }
    }

    fn grade(&self, answer: &usize) -> bool {
        *answer == self.error_index
    }

    fn answer_key(&self) -> Option<usize> {
        Some(self.error_index)
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::SetSentence { sentence } => {
                // A new sentence invalidates the previously picked word.
                if *sentence != self.sentence {
                    self.sentence = sentence.clone();
                    self.error_index = 0;
                    self.correct_word.clear();
                }
                Outcome::Applied
            }
            ContentEdit::SelectErrorWord { index } => {
                let len = word_count(&self.sentence);
                if *index >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *index, len });
                }
                self.error_index = *index;
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn interact(&self, draft: &mut Option<usize>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::PickWord { index } => {
                let len = word_count(&self.sentence);
                if *index >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *index, len });
                }
                *draft = Some(*index);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: usize) -> Answer {
        Answer::FindError(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&usize> {
        match answer {
            Answer::FindError(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrikeOut {
    pub sentence: String,
    pub correct_ids_to_remove: Vec<usize>,
}

impl Default for StrikeOut {
    fn default() -> Self {
        Self::blank()
    }
}

fn toggle(list: &mut Vec<usize>, index: usize) {
    match list.iter().position(|&i| i == index) {
        Some(pos) => {
            list.remove(pos);
        }
        None => list.push(index),
    }
}

impl QuestionSchema for StrikeOut {
    const TYPE: QuestionType = QuestionType::StrikeOut;
    type Answer = Vec<usize>;

    fn blank() -> Self {
        Self { sentence: String::new(), correct_ids_to_remove: Vec::new() }
    }

    /// Set equality: order of the picked indices does not matter.
    fn grade(&self, answer: &Vec<usize>) -> bool {
        let picked: BTreeSet<usize> = answer.iter().copied().collect();
        let expected: BTreeSet<usize> = self.correct_ids_to_remove.iter().copied().collect();
        picked == expected
    }

    fn answer_key(&self) -> Option<Vec<usize>> {
        Some(self.correct_ids_to_remove.clone())
    }

    fn apply_edit(&mut self, edit: &ContentEdit) -> Outcome {
        match edit {
            ContentEdit::SetSentence { sentence } => {
                if *sentence != self.sentence {
                    self.sentence = sentence.clone();
                    self.correct_ids_to_remove.clear();
                }
                Outcome::Applied
            }
            ContentEdit::ToggleStrikeWord { index } => {
                let len = word_count(&self.sentence);
                if *index >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *index, len });
                }
                toggle(&mut self.correct_ids_to_remove, *index);
                self.correct_ids_to_remove.sort_unstable();
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn interact(&self, draft: &mut Option<Vec<usize>>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::PickWord { index } => {
                let len = word_count(&self.sentence);
                if *index >= len {
                    return Outcome::Rejected(Rejection::IndexOutOfRange { index: *index, len });
                }
                toggle(draft.get_or_insert_with(Vec::new), *index);
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: Vec<usize>) -> Answer {
        Answer::StrikeOut(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&Vec<usize>> {
        match answer {
            Answer::StrikeOut(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Highlight {
    pub passage: String,
    pub correct_phrase: String,
}

impl Default for Highlight {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for Highlight {
    const TYPE: QuestionType = QuestionType::Highlight;
    type Answer = String;

    fn blank() -> Self {
        Self { passage: String::new(), correct_phrase: String::new() }
    }

    /// Loose check: either string contains the other, ignoring case only.
    /// A blank selection never counts, and a blank target phrase is ungradable.
    fn grade(&self, answer: &String) -> bool {
        if answer.trim().is_empty() || self.correct_phrase.trim().is_empty() {
            return false;
        }
        let picked = answer.to_lowercase();
        let target = self.correct_phrase.to_lowercase();
        picked.contains(&target) || target.contains(&picked)
    }

    fn answer_key(&self) -> Option<String> {
        Some(self.correct_phrase.clone()).filter(|p| !p.trim().is_empty())
    }

    fn interact(&self, draft: &mut Option<String>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Highlight { text } => {
                *draft = if text.trim().is_empty() { None } else { Some(text.clone()) };
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: String) -> Answer {
        Answer::Highlight(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&String> {
        match answer {
            Answer::Highlight(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillGap {
    pub question: String,
    pub correct_answer: String,
}

impl Default for FillGap {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for FillGap {
    const TYPE: QuestionType = QuestionType::FillGap;
    type Answer = String;

    fn blank() -> Self {
        Self { question: String::new(), correct_answer: String::new() }
    }

    fn grade(&self, answer: &String) -> bool {
        fold(answer) == fold(&self.correct_answer)
    }

    fn answer_key(&self) -> Option<String> {
        Some(self.correct_answer.clone())
    }

    fn interact(&self, draft: &mut Option<String>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Type { text } => {
                *draft = Some(text.clone());
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: String) -> Answer {
        Answer::FillGap(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&String> {
        match answer {
            Answer::FillGap(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike(sentence: &str, ids: &[usize]) -> StrikeOut {
        StrikeOut { sentence: sentence.into(), correct_ids_to_remove: ids.to_vec() }
    }

    #[test]
    fn find_error_compares_word_index() {
        let fe = FindError { sentence: "she go to school".into(), error_index: 1, correct_word: "goes".into() };
        assert!(fe.grade(&1));
        assert!(!fe.grade(&0));
    }

    #[test]
    fn changing_the_sentence_resets_the_picked_word() {
        let mut fe = FindError::blank();
        fe.apply_edit(&ContentEdit::SetSentence { sentence: "a b c".into() });
        assert!(fe.apply_edit(&ContentEdit::SelectErrorWord { index: 2 }).is_applied());
        fe.correct_word = "x".into();

        fe.apply_edit(&ContentEdit::SetSentence { sentence: "d e f g".into() });
        assert_eq!(fe.error_index, 0);
        assert!(fe.correct_word.is_empty());
    }

    #[test]
    fn word_picks_are_bounded_by_the_tokenized_sentence() {
        let mut fe = FindError::blank();
        fe.apply_edit(&ContentEdit::SetSentence { sentence: "one  two".into() });
        let outcome = fe.apply_edit(&ContentEdit::SelectErrorWord { index: 2 });
        assert_eq!(outcome, Outcome::Rejected(Rejection::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn strike_out_ignores_selection_order() {
        let so = strike("a b c d", &[1, 3]);
        assert!(so.grade(&vec![1, 3]));
        assert!(so.grade(&vec![3, 1]));
        assert!(!so.grade(&vec![1]));
        assert!(!so.grade(&vec![1, 2, 3]));
    }

    #[test]
    fn strike_out_toggle_and_sentence_reset() {
        let mut so = strike("a b c d", &[]);
        so.apply_edit(&ContentEdit::ToggleStrikeWord { index: 3 });
        so.apply_edit(&ContentEdit::ToggleStrikeWord { index: 0 });
        so.apply_edit(&ContentEdit::ToggleStrikeWord { index: 3 });
        assert_eq!(so.correct_ids_to_remove, vec![0]);

        so.apply_edit(&ContentEdit::SetSentence { sentence: "x y".into() });
        assert!(so.correct_ids_to_remove.is_empty());
    }

    #[test]
    fn highlight_accepts_containment_either_way() {
        let h = Highlight { passage: "the dog ran home".into(), correct_phrase: "dog".into() };
        assert!(h.grade(&"the dog ran".to_string()));
        assert!(h.grade(&"DOG".to_string()));
        assert!(!h.grade(&"cat".to_string()));

        let long = Highlight { passage: String::new(), correct_phrase: "the quick fox".into() };
        assert!(long.grade(&"quick".to_string()));
        assert!(!long.grade(&"   ".to_string()));
    }

    #[test]
    fn highlight_folds_case_but_keeps_whitespace() {
        let h = Highlight { passage: "the dog ran".into(), correct_phrase: "the dog".into() };
        assert!(h.grade(&"THE DOG".to_string()));
        assert!(!h.grade(&"DOG ".to_string()));
    }

    #[test]
    fn blank_highlight_grades_nothing() {
        let blank = Highlight::blank();
        assert!(!blank.grade(&"anything".to_string()));
        assert_eq!(blank.answer_key(), None);
    }

    #[test]
    fn fill_gap_trims_and_folds_case() {
        let fg = FillGap { question: "Capital of France: ___".into(), correct_answer: "Paris".into() };
        assert!(fg.grade(&"  paris ".to_string()));
        assert!(!fg.grade(&"Lyon".to_string()));
    }
}
