//! Domain records managed by the dashboard: buildings (villages/castles), passages,
//! nodes (lessons and bosses) and questions.

use serde::{Deserialize, Serialize};

use crate::question::{QuestionContent, QuestionType};

/// Which catalog a building lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
  /// Subject-specific learning zone.
  Village,
  /// Boss-level zone.
  Castle,
}

impl Default for BuildingKind {
  fn default() -> Self { BuildingKind::Village }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
  pub id: u64,
  pub kind: BuildingKind,
  pub subject: String,
  pub title: String,
  /// URL or inline SVG markup, stored as given.
  pub svg_image: String,
  pub treasure_capacity: u32,
  pub production_speed: u32,
  pub cost: u32,
  /// Entry building of its (kind, subject) catalog; always free.
  pub is_first: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
  pub id: u64,
  pub building_id: u64,
  pub title: String,
  /// Dense, 1-based among the building's passages.
  pub position: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: u64,
  pub passage_id: u64,
  pub title: String,
  /// Dense, 1-based among the passage's nodes.
  pub position: u32,
  pub reward_coins: u32,
  pub reward_xp: u32,
  /// 0..=100
  pub pass_score: u8,
  pub is_boss: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: u64,
  pub node_id: u64,
  /// Dense, 1-based among the node's questions.
  pub position: u32,
  pub content: QuestionContent,
}

impl Question {
  pub fn kind(&self) -> QuestionType { self.content.kind() }
}

/// Anything kept in a dense, 1-based sibling order.
pub trait Positioned {
  fn id(&self) -> u64;
  fn parent_id(&self) -> u64;
  fn position(&self) -> u32;
  fn set_position(&mut self, position: u32);
}

macro_rules! positioned {
  ($ty:ty, $parent:ident) => {
    impl Positioned for $ty {
      fn id(&self) -> u64 { self.id }
      fn parent_id(&self) -> u64 { self.$parent }
      fn position(&self) -> u32 { self.position }
      fn set_position(&mut self, position: u32) { self.position = position; }
    }
  };
}

positioned!(Passage, building_id);
positioned!(Node, passage_id);
positioned!(Question, node_id);
