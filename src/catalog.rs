//! In-memory content catalog: buildings, passages, nodes, bosses and questions.
//!
//! Invariants kept here:
//!   - sibling `position`s are a dense 1-based sequence per parent (create appends,
//!     reorder moves, delete closes the gap)
//!   - at most one boss node per passage (setting a boss clears the previous one)
//!   - at most one first building per (kind, subject), and a first building costs 0
//!   - deletes cascade down the tree
//!
//! Callers hold the catalog behind a lock; every method is a synchronous mutation.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Defaults;
use crate::domain::{Building, BuildingKind, Node, Passage, Positioned, Question};
use crate::error::CatalogError;
use crate::question::{ContentEdit, Outcome, QuestionContent, QuestionType};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewBuilding {
    #[serde(default)]
    pub kind: BuildingKind,
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub svg_image: String,
    #[serde(default)]
    pub treasure_capacity: u32,
    #[serde(default)]
    pub production_speed: u32,
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub is_first: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BuildingPatch {
    pub subject: Option<String>,
    pub title: Option<String>,
    pub svg_image: Option<String>,
    pub treasure_capacity: Option<u32>,
    pub production_speed: Option<u32>,
    pub cost: Option<u32>,
    pub is_first: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPassage {
    pub title: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PassagePatch {
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewNode {
    #[serde(default)]
    pub title: String,
    pub reward_coins: Option<u32>,
    pub reward_xp: Option<u32>,
    pub pass_score: Option<u8>,
    #[serde(default)]
    pub is_boss: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodePatch {
    pub title: Option<String>,
    pub reward_coins: Option<u32>,
    pub reward_xp: Option<u32>,
    pub pass_score: Option<u8>,
    pub is_boss: Option<bool>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    defaults: Defaults,
    last_id: u64,
    buildings: BTreeMap<u64, Building>,
    passages: BTreeMap<u64, Passage>,
    nodes: BTreeMap<u64, Node>,
    questions: BTreeMap<u64, Question>,
}

// ---------- ordering helpers ----------

fn siblings<T: Positioned + Clone>(map: &BTreeMap<u64, T>, parent: u64) -> Vec<T> {
    let mut out: Vec<T> = map.values().filter(|v| v.parent_id() == parent).cloned().collect();
    out.sort_by_key(|v| (v.position(), v.id()));
    out
}

fn next_position<T: Positioned>(map: &BTreeMap<u64, T>, parent: u64) -> u32 {
    map.values().filter(|v| v.parent_id() == parent).count() as u32 + 1
}

/// Assign positions 1..=N following `ids`.
fn apply_order<T: Positioned>(map: &mut BTreeMap<u64, T>, ids: &[u64]) {
    for (i, id) in ids.iter().enumerate() {
        if let Some(v) = map.get_mut(id) {
            v.set_position(i as u32 + 1);
        }
    }
}

/// Close gaps after a removal.
fn renumber<T: Positioned + Clone>(map: &mut BTreeMap<u64, T>, parent: u64) {
    let ids: Vec<u64> = siblings(map, parent).iter().map(Positioned::id).collect();
    apply_order(map, &ids);
}

/// Move `id` to 1-based `position` (clamped) among its siblings, renumbering the rest.
fn move_to<T: Positioned + Clone>(map: &mut BTreeMap<u64, T>, id: u64, position: u32) -> Option<Vec<T>> {
    let parent = map.get(&id)?.parent_id();
    let mut ids: Vec<u64> = siblings(map, parent).iter().map(Positioned::id).filter(|&s| s != id).collect();
    let at = (position.max(1) as usize - 1).min(ids.len());
    ids.insert(at, id);
    apply_order(map, &ids);
    Some(siblings(map, parent))
}

fn require_title(title: &str) -> Result<String, CatalogError> {
    let t = title.trim();
    if t.is_empty() {
        return Err(CatalogError::Invalid { field: "title", reason: "must not be empty".into() });
    }
    Ok(t.to_string())
}

fn check_pass_score(score: u8) -> Result<u8, CatalogError> {
    if score > 100 {
        return Err(CatalogError::Invalid { field: "pass_score", reason: format!("{score} is above 100") });
    }
    Ok(score)
}

impl Catalog {
    pub fn new(defaults: Defaults) -> Self {
        Self { defaults, ..Default::default() }
    }

    fn alloc_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    // ---------- buildings ----------

    pub fn buildings(&self, kind: Option<BuildingKind>) -> Vec<Building> {
        self.buildings
            .values()
            .filter(|b| kind.map_or(true, |k| b.kind == k))
            .cloned()
            .collect()
    }

    pub fn building(&self, id: u64) -> Result<&Building, CatalogError> {
        self.buildings.get(&id).ok_or(CatalogError::not_found("building", id))
    }

    pub fn create_building(&mut self, new: NewBuilding) -> Result<Building, CatalogError> {
        let title = require_title(&new.title)?;
        let id = self.alloc_id();
        let b = Building {
            id,
            kind: new.kind,
            subject: new.subject.trim().to_string(),
            title,
            svg_image: new.svg_image,
            treasure_capacity: new.treasure_capacity,
            production_speed: new.production_speed,
            cost: new.cost,
            is_first: new.is_first,
        };
        self.buildings.insert(id, b);
        self.enforce_first(id);
        info!(target: "catalog", id, "building created");
        Ok(self.buildings[&id].clone())
    }

    pub fn update_building(&mut self, id: u64, patch: BuildingPatch) -> Result<Building, CatalogError> {
        let title = patch.title.as_deref().map(require_title).transpose()?;
        let b = self.buildings.get_mut(&id).ok_or(CatalogError::not_found("building", id))?;
        if let Some(t) = title {
            b.title = t;
        }
        if let Some(s) = patch.subject {
            b.subject = s.trim().to_string();
        }
        if let Some(svg) = patch.svg_image {
            b.svg_image = svg;
        }
        if let Some(c) = patch.treasure_capacity {
            b.treasure_capacity = c;
        }
        if let Some(s) = patch.production_speed {
            b.production_speed = s;
        }
        if let Some(c) = patch.cost {
            b.cost = c;
        }
        if let Some(f) = patch.is_first {
            b.is_first = f;
        }
        self.enforce_first(id);
        Ok(self.buildings[&id].clone())
    }

    /// A first building is unique within its (kind, subject) catalog and always free.
    fn enforce_first(&mut self, id: u64) {
        let Some(b) = self.buildings.get_mut(&id) else { return };
        if !b.is_first {
            return;
        }
        b.cost = 0;
        let (kind, subject) = (b.kind, b.subject.clone());
        for other in self.buildings.values_mut() {
            if other.id != id && other.is_first && other.kind == kind && other.subject == subject {
                other.is_first = false;
                info!(target: "catalog", id = other.id, "first-building flag moved away");
            }
        }
    }

    pub fn delete_building(&mut self, id: u64) -> Result<Building, CatalogError> {
        let b = self.buildings.remove(&id).ok_or(CatalogError::not_found("building", id))?;
        let passage_ids: Vec<u64> = siblings(&self.passages, id).iter().map(|p| p.id).collect();
        for pid in passage_ids {
            self.drop_passage_tree(pid);
        }
        info!(target: "catalog", id, "building deleted");
        Ok(b)
    }

    // ---------- passages ----------

    pub fn passages(&self, building_id: u64) -> Result<Vec<Passage>, CatalogError> {
        self.building(building_id)?;
        Ok(siblings(&self.passages, building_id))
    }

    pub fn passage(&self, id: u64) -> Result<&Passage, CatalogError> {
        self.passages.get(&id).ok_or(CatalogError::not_found("passage", id))
    }

    pub fn create_passage(&mut self, building_id: u64, new: NewPassage) -> Result<Passage, CatalogError> {
        self.building(building_id)?;
        let title = require_title(&new.title)?;
        let id = self.alloc_id();
        let p = Passage { id, building_id, title, position: next_position(&self.passages, building_id) };
        self.passages.insert(id, p.clone());
        info!(target: "catalog", id, building_id, "passage created");
        Ok(p)
    }

    pub fn update_passage(&mut self, id: u64, patch: PassagePatch) -> Result<Passage, CatalogError> {
        let title = patch.title.as_deref().map(require_title).transpose()?;
        let p = self.passages.get_mut(&id).ok_or(CatalogError::not_found("passage", id))?;
        if let Some(t) = title {
            p.title = t;
        }
        Ok(p.clone())
    }

    pub fn delete_passage(&mut self, id: u64) -> Result<Passage, CatalogError> {
        let p = self.passage(id)?.clone();
        self.drop_passage_tree(id);
        renumber(&mut self.passages, p.building_id);
        info!(target: "catalog", id, "passage deleted");
        Ok(p)
    }

    fn drop_passage_tree(&mut self, id: u64) {
        self.passages.remove(&id);
        let node_ids: Vec<u64> = siblings(&self.nodes, id).iter().map(|n| n.id).collect();
        for nid in node_ids {
            self.nodes.remove(&nid);
            self.questions.retain(|_, q| q.node_id != nid);
        }
    }

    pub fn reorder_passage(&mut self, id: u64, position: u32) -> Result<Vec<Passage>, CatalogError> {
        move_to(&mut self.passages, id, position).ok_or(CatalogError::not_found("passage", id))
    }

    // ---------- nodes ----------

    pub fn nodes(&self, passage_id: u64) -> Result<Vec<Node>, CatalogError> {
        self.passage(passage_id)?;
        Ok(siblings(&self.nodes, passage_id))
    }

    pub fn node(&self, id: u64) -> Result<&Node, CatalogError> {
        self.nodes.get(&id).ok_or(CatalogError::not_found("node", id))
    }

    pub fn create_node(&mut self, passage_id: u64, new: NewNode) -> Result<Node, CatalogError> {
        self.passage(passage_id)?;
        let pass_score = check_pass_score(new.pass_score.unwrap_or(self.defaults.pass_score))?;
        let id = self.alloc_id();
        let n = Node {
            id,
            passage_id,
            title: new.title.trim().to_string(),
            position: next_position(&self.nodes, passage_id),
            reward_coins: new.reward_coins.unwrap_or(self.defaults.reward_coins),
            reward_xp: new.reward_xp.unwrap_or(self.defaults.reward_xp),
            pass_score,
            is_boss: false,
        };
        self.nodes.insert(id, n);
        info!(target: "catalog", id, passage_id, "node created");
        if new.is_boss {
            return self.set_boss(passage_id, id);
        }
        Ok(self.nodes[&id].clone())
    }

    pub fn update_node(&mut self, id: u64, patch: NodePatch) -> Result<Node, CatalogError> {
        let pass_score = patch.pass_score.map(check_pass_score).transpose()?;
        let n = self.nodes.get_mut(&id).ok_or(CatalogError::not_found("node", id))?;
        if let Some(t) = patch.title {
            n.title = t.trim().to_string();
        }
        if let Some(c) = patch.reward_coins {
            n.reward_coins = c;
        }
        if let Some(x) = patch.reward_xp {
            n.reward_xp = x;
        }
        if let Some(s) = pass_score {
            n.pass_score = s;
        }
        let passage_id = n.passage_id;
        match patch.is_boss {
            Some(true) => self.set_boss(passage_id, id),
            Some(false) => {
                if let Some(n) = self.nodes.get_mut(&id) {
                    n.is_boss = false;
                }
                Ok(self.nodes[&id].clone())
            }
            None => Ok(self.nodes[&id].clone()),
        }
    }

    pub fn delete_node(&mut self, id: u64) -> Result<Node, CatalogError> {
        let n = self.nodes.remove(&id).ok_or(CatalogError::not_found("node", id))?;
        self.questions.retain(|_, q| q.node_id != id);
        renumber(&mut self.nodes, n.passage_id);
        info!(target: "catalog", id, boss = n.is_boss, "node deleted");
        Ok(n)
    }

    pub fn reorder_node(&mut self, id: u64, position: u32) -> Result<Vec<Node>, CatalogError> {
        move_to(&mut self.nodes, id, position).ok_or(CatalogError::not_found("node", id))
    }

    // ---------- bosses ----------

    /// The passage's boss; `None` is a legal state.
    pub fn boss_of(&self, passage_id: u64) -> Result<Option<Node>, CatalogError> {
        self.passage(passage_id)?;
        Ok(self.nodes.values().find(|n| n.passage_id == passage_id && n.is_boss).cloned())
    }

    /// Make `node_id` the passage's boss: clear the previous boss, then flag the new one.
    /// Both steps happen under the caller's single write lock.
    pub fn set_boss(&mut self, passage_id: u64, node_id: u64) -> Result<Node, CatalogError> {
        self.passage(passage_id)?;
        let target = self.node(node_id)?;
        if target.passage_id != passage_id {
            return Err(CatalogError::WrongParent { node: node_id, passage: passage_id });
        }
        for n in self.nodes.values_mut() {
            if n.passage_id == passage_id && n.is_boss && n.id != node_id {
                n.is_boss = false;
                info!(target: "catalog", passage_id, previous = n.id, "boss flag cleared");
            }
        }
        let n = self.nodes.get_mut(&node_id).ok_or(CatalogError::not_found("node", node_id))?;
        n.is_boss = true;
        info!(target: "catalog", passage_id, node_id, "boss set");
        Ok(n.clone())
    }

    pub fn clear_boss(&mut self, passage_id: u64) -> Result<Option<Node>, CatalogError> {
        self.passage(passage_id)?;
        let cleared = self
            .nodes
            .values_mut()
            .find(|n| n.passage_id == passage_id && n.is_boss)
            .map(|n| {
                n.is_boss = false;
                n.clone()
            });
        if cleared.is_none() {
            warn!(target: "catalog", passage_id, "clear_boss on a passage without boss");
        }
        Ok(cleared)
    }

    // ---------- questions ----------

    pub fn questions(&self, node_id: u64) -> Result<Vec<Question>, CatalogError> {
        self.node(node_id)?;
        Ok(siblings(&self.questions, node_id))
    }

    /// Questions for a test run. An unknown node simply has none.
    pub fn questions_for_test(&self, node_id: u64) -> (Vec<Question>, Option<u8>) {
        let pass_score = self.nodes.get(&node_id).map(|n| n.pass_score);
        (siblings(&self.questions, node_id), pass_score)
    }

    pub fn question(&self, id: u64) -> Result<&Question, CatalogError> {
        self.questions.get(&id).ok_or(CatalogError::not_found("question", id))
    }

    pub fn create_question(&mut self, node_id: u64, content: QuestionContent) -> Result<Question, CatalogError> {
        self.node(node_id)?;
        let id = self.alloc_id();
        let q = Question { id, node_id, position: next_position(&self.questions, node_id), content };
        self.questions.insert(id, q.clone());
        info!(target: "catalog", id, node_id, kind = %q.kind(), "question created");
        Ok(q)
    }

    /// Replace the content wholesale (the type may change with it).
    pub fn update_question(&mut self, id: u64, content: QuestionContent) -> Result<Question, CatalogError> {
        let q = self.questions.get_mut(&id).ok_or(CatalogError::not_found("question", id))?;
        q.content = content;
        Ok(q.clone())
    }

    /// Switching type is a destructive reset to the new type's blank content.
    pub fn set_question_type(&mut self, id: u64, kind: QuestionType) -> Result<Question, CatalogError> {
        let q = self.questions.get_mut(&id).ok_or(CatalogError::not_found("question", id))?;
        let from = q.kind();
        q.content = QuestionContent::blank(kind);
        info!(target: "catalog", id, %from, to = %kind, "question type switched");
        Ok(q.clone())
    }

    /// Apply a structural edit; the stored content only changes when the edit applies.
    pub fn edit_question(&mut self, id: u64, edit: &ContentEdit) -> Result<(Outcome, Question), CatalogError> {
        let q = self.questions.get_mut(&id).ok_or(CatalogError::not_found("question", id))?;
        let mut content = q.content.clone();
        let outcome = content.apply_edit(edit);
        if outcome.is_applied() {
            q.content = content;
        }
        Ok((outcome, q.clone()))
    }

    pub fn delete_question(&mut self, id: u64) -> Result<Question, CatalogError> {
        let q = self.questions.remove(&id).ok_or(CatalogError::not_found("question", id))?;
        renumber(&mut self.questions, q.node_id);
        Ok(q)
    }

    pub fn reorder_question(&mut self, id: u64, position: u32) -> Result<Vec<Question>, CatalogError> {
        move_to(&mut self.questions, id, position).ok_or(CatalogError::not_found("question", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(Defaults::default())
    }

    fn village(c: &mut Catalog, subject: &str, cost: u32, is_first: bool) -> Building {
        c.create_building(NewBuilding {
            kind: BuildingKind::Village,
            subject: subject.into(),
            title: format!("{subject} village"),
            cost,
            is_first,
            ..Default::default()
        })
        .unwrap()
    }

    /// building -> passage -> `n` nodes
    fn tree(c: &mut Catalog, n: usize) -> (Passage, Vec<Node>) {
        let b = village(c, "math", 10, false);
        let p = c.create_passage(b.id, NewPassage { title: "Fractions".into() }).unwrap();
        let nodes = (0..n).map(|_| c.create_node(p.id, NewNode::default()).unwrap()).collect();
        (p, nodes)
    }

    fn positions(nodes: &[Node]) -> Vec<(u64, u32)> {
        nodes.iter().map(|n| (n.id, n.position)).collect()
    }

    #[test]
    fn first_building_is_free_and_unique_per_catalog() {
        let mut c = catalog();
        let a = village(&mut c, "math", 50, true);
        assert_eq!(a.cost, 0);

        let other_subject = village(&mut c, "history", 40, true);
        let b = village(&mut c, "math", 30, true);
        assert!(b.is_first);
        assert_eq!(b.cost, 0);
        assert!(!c.building(a.id).unwrap().is_first);
        assert!(c.building(other_subject.id).unwrap().is_first);

        let b = c.update_building(b.id, BuildingPatch { cost: Some(99), ..Default::default() }).unwrap();
        assert_eq!(b.cost, 0);
    }

    #[test]
    fn castles_and_villages_are_separate_catalogs() {
        let mut c = catalog();
        let v = village(&mut c, "math", 0, true);
        let castle = c
            .create_building(NewBuilding {
                kind: BuildingKind::Castle,
                subject: "math".into(),
                title: "Math keep".into(),
                cost: 500,
                is_first: true,
                ..Default::default()
            })
            .unwrap();
        assert!(c.building(v.id).unwrap().is_first);
        assert!(castle.is_first);
        assert_eq!(c.buildings(Some(BuildingKind::Castle)).len(), 1);
    }

    #[test]
    fn empty_titles_are_rejected() {
        let mut c = catalog();
        let err = c.create_building(NewBuilding { title: "  ".into(), ..Default::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { field: "title", .. }));
    }

    #[test]
    fn nodes_use_configured_defaults() {
        let mut c = catalog();
        let (_, nodes) = tree(&mut c, 1);
        let d = Defaults::default();
        assert_eq!(nodes[0].pass_score, d.pass_score);
        assert_eq!(nodes[0].reward_coins, d.reward_coins);
    }

    #[test]
    fn pass_score_above_100_is_invalid() {
        let mut c = catalog();
        let (p, _) = tree(&mut c, 0);
        let err = c.create_node(p.id, NewNode { pass_score: Some(101), ..Default::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { field: "pass_score", .. }));
    }

    #[test]
    fn reorder_renumbers_densely() {
        let mut c = catalog();
        let (p, nodes) = tree(&mut c, 4);
        let ids: Vec<u64> = nodes.iter().map(|n| n.id).collect();

        let after = c.reorder_node(ids[3], 1).unwrap();
        assert_eq!(positions(&after), [(ids[3], 1), (ids[0], 2), (ids[1], 3), (ids[2], 4)]);

        // Clamped past the end.
        let after = c.reorder_node(ids[3], 99).unwrap();
        assert_eq!(positions(&after), [(ids[0], 1), (ids[1], 2), (ids[2], 3), (ids[3], 4)]);

        c.delete_node(ids[1]).unwrap();
        let left = c.nodes(p.id).unwrap();
        assert_eq!(positions(&left), [(ids[0], 1), (ids[2], 2), (ids[3], 3)]);
    }

    #[test]
    fn setting_a_boss_clears_the_previous_one() {
        let mut c = catalog();
        let (p, nodes) = tree(&mut c, 3);
        c.set_boss(p.id, nodes[0].id).unwrap();
        c.set_boss(p.id, nodes[2].id).unwrap();

        let bosses: Vec<u64> = c.nodes(p.id).unwrap().iter().filter(|n| n.is_boss).map(|n| n.id).collect();
        assert_eq!(bosses, [nodes[2].id]);
        assert_eq!(c.boss_of(p.id).unwrap().map(|n| n.id), Some(nodes[2].id));
    }

    #[test]
    fn boss_via_node_update_and_create() {
        let mut c = catalog();
        let (p, nodes) = tree(&mut c, 2);
        c.update_node(nodes[0].id, NodePatch { is_boss: Some(true), ..Default::default() }).unwrap();
        let boss = c.create_node(p.id, NewNode { is_boss: true, ..Default::default() }).unwrap();
        assert!(boss.is_boss);
        assert_eq!(c.nodes(p.id).unwrap().iter().filter(|n| n.is_boss).count(), 1);
    }

    #[test]
    fn a_passage_may_have_no_boss() {
        let mut c = catalog();
        let (p, nodes) = tree(&mut c, 1);
        assert_eq!(c.boss_of(p.id).unwrap(), None);
        c.set_boss(p.id, nodes[0].id).unwrap();
        assert!(c.clear_boss(p.id).unwrap().is_some());
        assert_eq!(c.boss_of(p.id).unwrap(), None);
    }

    #[test]
    fn boss_must_belong_to_the_passage() {
        let mut c = catalog();
        let (p1, _) = tree(&mut c, 1);
        let (_, other) = tree(&mut c, 1);
        let err = c.set_boss(p1.id, other[0].id).unwrap_err();
        assert_eq!(err, CatalogError::WrongParent { node: other[0].id, passage: p1.id });
    }

    #[test]
    fn switching_type_installs_the_new_blank() {
        let mut c = catalog();
        let (_, nodes) = tree(&mut c, 1);
        let q = c.create_question(nodes[0].id, QuestionContent::blank(QuestionType::MultipleChoice)).unwrap();
        c.edit_question(q.id, &ContentEdit::MarkCorrect { id: "A".into() }).unwrap();

        let q = c.set_question_type(q.id, QuestionType::Ordering).unwrap();
        assert_eq!(q.content, QuestionContent::blank(QuestionType::Ordering));
        let payload = q.content.payload();
        assert!(payload.get("options").is_none());
    }

    #[test]
    fn rejected_edits_do_not_touch_stored_content() {
        let mut c = catalog();
        let (_, nodes) = tree(&mut c, 1);
        let q = c.create_question(nodes[0].id, QuestionContent::blank(QuestionType::Matching)).unwrap();
        c.edit_question(q.id, &ContentEdit::RemovePair { id: 1 }).unwrap();
        let (outcome, stored) = c.edit_question(q.id, &ContentEdit::RemovePair { id: 2 }).unwrap();
        assert!(!outcome.is_applied());
        let QuestionContent::Matching(m) = stored.content else { panic!("wrong variant") };
        assert_eq!(m.pairs.len(), 2);
    }

    #[test]
    fn deleting_a_building_cascades() {
        let mut c = catalog();
        let (p, nodes) = tree(&mut c, 2);
        let q = c.create_question(nodes[0].id, QuestionContent::blank(QuestionType::FillGap)).unwrap();
        let building_id = p.building_id;

        c.delete_building(building_id).unwrap();
        assert!(c.passage(p.id).is_err());
        assert!(c.node(nodes[1].id).is_err());
        assert!(c.question(q.id).is_err());
    }

    #[test]
    fn question_reorder_and_test_lookup() {
        let mut c = catalog();
        let (_, nodes) = tree(&mut c, 1);
        let node = nodes[0].id;
        let a = c.create_question(node, QuestionContent::blank(QuestionType::FillGap)).unwrap();
        let b = c.create_question(node, QuestionContent::blank(QuestionType::Highlight)).unwrap();
        c.reorder_question(b.id, 1).unwrap();

        let (qs, pass) = c.questions_for_test(node);
        assert_eq!(qs.iter().map(|q| q.id).collect::<Vec<_>>(), [b.id, a.id]);
        assert_eq!(pass, Some(Defaults::default().pass_score));

        let (none, pass) = c.questions_for_test(9999);
        assert!(none.is_empty());
        assert_eq!(pass, None);
    }
}
