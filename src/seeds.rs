//! Demo content so the dashboard is useful on first start.
//!
//! One free village with a passage holding a lesson node and a boss node, plus a
//! sample question of several types.

use serde_json::json;
use tracing::{error, info};

use crate::catalog::{Catalog, NewBuilding, NewNode, NewPassage};
use crate::domain::BuildingKind;
use crate::error::ApiError;
use crate::question::{QuestionContent, QuestionType};

/// Insert the demo village. Failures are logged; the catalog stays usable.
pub fn seed_demo(catalog: &mut Catalog) {
  match try_seed(catalog) {
    Ok(questions) => info!(target: "catalog", questions, "Seeded demo village"),
    Err(e) => error!(target: "catalog", error = %e, "Demo seeding failed"),
  }
}

fn try_seed(catalog: &mut Catalog) -> Result<usize, ApiError> {
  let village = catalog.create_building(NewBuilding {
    kind: BuildingKind::Village,
    subject: "english".into(),
    title: "Grammar Village".into(),
    svg_image: "/img/village-grammar.svg".into(),
    treasure_capacity: 100,
    production_speed: 5,
    cost: 0,
    is_first: true,
  })?;
  let passage = catalog.create_passage(village.id, NewPassage { title: "Past tense".into() })?;
  let lesson = catalog.create_node(passage.id, NewNode { title: "Regular and irregular verbs".into(), ..Default::default() })?;
  let boss = catalog.create_node(
    passage.id,
    NewNode { title: "Past tense boss".into(), pass_score: Some(80), reward_coins: Some(50), is_boss: true, ..Default::default() },
  )?;

  let lesson_questions = [
    (
      QuestionType::MultipleChoice,
      json!({
        "question": "Which verb is in the past tense?",
        "options": [
          { "id": "A", "text": "go", "is_correct": false },
          { "id": "B", "text": "went", "is_correct": true },
          { "id": "C", "text": "going", "is_correct": false }
        ],
        "explanation": "\"went\" is the irregular past of \"go\"."
      }),
    ),
    (QuestionType::FillGap, json!({ "question": "Yesterday I ___ (walk) to school.", "correct_answer": "walked" })),
    (
      QuestionType::FindError,
      json!({ "sentence": "She goed to the market yesterday", "error_index": 1, "correct_word": "went" }),
    ),
    (
      QuestionType::Ordering,
      json!({
        "question": "Put the sentence in order.",
        "items": [
          { "id": "A", "content": "We" },
          { "id": "B", "content": "played" },
          { "id": "C", "content": "football" }
        ],
        "correct_order": ["A", "B", "C"]
      }),
    ),
  ];
  let boss_questions = [
    (
      QuestionType::Matching,
      json!({
        "pairs": [
          { "id": 1, "left": "eat", "right": "ate" },
          { "id": 2, "left": "see", "right": "saw" },
          { "id": 3, "left": "buy", "right": "bought" }
        ]
      }),
    ),
    (
      QuestionType::SwipeDecision,
      json!({
        "cards": [
          { "content": "I have went home.", "correct_swipe": "left" },
          { "content": "They sang all night.", "correct_swipe": "right" }
        ],
        "labels": { "left": "Wrong", "right": "Correct" }
      }),
    ),
  ];

  let mut count = 0;
  for (node_id, questions) in [(lesson.id, &lesson_questions[..]), (boss.id, &boss_questions[..])] {
    for (kind, payload) in questions {
      let content = QuestionContent::from_parts(*kind, payload.clone())?;
      catalog.create_question(node_id, content)?;
      count += 1;
    }
  }
  Ok(count)
}
