//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Authoring: catalog CRUD, question type switches, structural edits
//!   - Raw grading of untyped (type, content, answer) triples
//!   - Preview sessions (start, act, check, restart, sync, discard)
//!   - Test runs (start, select, submit, advance, restart, view, discard)
//!
//! This is the only layer that emits notifications. Engine and state machines return
//! results; the outcome of each user-visible mutation is turned into a toast here.

use std::str::FromStr;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::{BuildingPatch, NewBuilding, NewNode, NewPassage, NodePatch, PassagePatch};
use crate::domain::{Building, BuildingKind, Node, Passage};
use crate::error::ApiError;
use crate::notify::{Notification, Severity};
use crate::protocol::{
  test_view, to_out, BlankOut, EditOut, PreviewActOut, PreviewIn, PreviewSyncOut, QuestionIn, QuestionOut, TestView,
};
use crate::question::grading::{self, Verdict};
use crate::question::preview::{Preview, PreviewView};
use crate::question::{Answer, ContentEdit, Outcome, PreviewAction, QuestionContent, QuestionType};
use crate::runner::{Phase, RunnerError, TestRun};
use crate::state::AppState;

/// Toast the result of a user-visible mutation and pass it through unchanged.
fn report<T>(state: &AppState, title: &str, res: Result<T, ApiError>, ok: impl FnOnce(&T) -> String) -> Result<T, ApiError> {
  match &res {
    Ok(v) => state.notifier.notify(Notification::success(title, ok(v))),
    Err(e) => state.notifier.notify(Notification::error(title, e.to_string())),
  }
  res
}

/// Toast failures only (interactive flows where success is visible on screen).
fn report_err<T>(state: &AppState, title: &str, res: Result<T, ApiError>) -> Result<T, ApiError> {
  if let Err(e) = &res {
    state.notifier.notify(Notification::error(title, e.to_string()));
  }
  res
}

fn parse_kind(tag: &str) -> Result<QuestionType, ApiError> {
  Ok(QuestionType::from_str(tag)?)
}

fn content_from(input: QuestionIn) -> Result<QuestionContent, ApiError> {
  let kind = parse_kind(&input.kind)?;
  match input.content {
    Some(v) => Ok(QuestionContent::from_parts(kind, v)?),
    None => Ok(QuestionContent::blank(kind)),
  }
}

// ---------- buildings ----------

pub async fn list_buildings(state: &AppState, kind: Option<BuildingKind>) -> Vec<Building> {
  state.catalog.read().await.buildings(kind)
}

pub async fn get_building(state: &AppState, id: u64) -> Result<Building, ApiError> {
  Ok(state.catalog.read().await.building(id)?.clone())
}

#[instrument(level = "info", skip(state, new), fields(title = %new.title))]
pub async fn create_building(state: &AppState, new: NewBuilding) -> Result<Building, ApiError> {
  let res = state.catalog.write().await.create_building(new).map_err(ApiError::from);
  report(state, "Building saved", res, |b| format!("Created \"{}\"", b.title))
}

#[instrument(level = "info", skip(state, patch))]
pub async fn update_building(state: &AppState, id: u64, patch: BuildingPatch) -> Result<Building, ApiError> {
  let res = state.catalog.write().await.update_building(id, patch).map_err(ApiError::from);
  report(state, "Building saved", res, |b| format!("Updated \"{}\"", b.title))
}

#[instrument(level = "info", skip(state))]
pub async fn delete_building(state: &AppState, id: u64) -> Result<Building, ApiError> {
  let res = state.catalog.write().await.delete_building(id).map_err(ApiError::from);
  report(state, "Building deleted", res, |b| format!("Deleted \"{}\" and its passages", b.title))
}

// ---------- passages ----------

pub async fn list_passages(state: &AppState, building_id: u64) -> Result<Vec<Passage>, ApiError> {
  Ok(state.catalog.read().await.passages(building_id)?)
}

#[instrument(level = "info", skip(state, new))]
pub async fn create_passage(state: &AppState, building_id: u64, new: NewPassage) -> Result<Passage, ApiError> {
  let res = state.catalog.write().await.create_passage(building_id, new).map_err(ApiError::from);
  report(state, "Passage saved", res, |p| format!("Created \"{}\" at position {}", p.title, p.position))
}

#[instrument(level = "info", skip(state, patch))]
pub async fn update_passage(state: &AppState, id: u64, patch: PassagePatch) -> Result<Passage, ApiError> {
  let res = state.catalog.write().await.update_passage(id, patch).map_err(ApiError::from);
  report(state, "Passage saved", res, |p| format!("Updated \"{}\"", p.title))
}

#[instrument(level = "info", skip(state))]
pub async fn delete_passage(state: &AppState, id: u64) -> Result<Passage, ApiError> {
  let res = state.catalog.write().await.delete_passage(id).map_err(ApiError::from);
  report(state, "Passage deleted", res, |p| format!("Deleted \"{}\"", p.title))
}

#[instrument(level = "info", skip(state))]
pub async fn reorder_passage(state: &AppState, id: u64, position: u32) -> Result<Vec<Passage>, ApiError> {
  let res = state.catalog.write().await.reorder_passage(id, position).map_err(ApiError::from);
  report(state, "Passages reordered", res, |_| format!("Passage {id} moved to position {position}"))
}

// ---------- nodes and bosses ----------

pub async fn list_nodes(state: &AppState, passage_id: u64) -> Result<Vec<Node>, ApiError> {
  Ok(state.catalog.read().await.nodes(passage_id)?)
}

pub async fn get_node(state: &AppState, id: u64) -> Result<Node, ApiError> {
  Ok(state.catalog.read().await.node(id)?.clone())
}

#[instrument(level = "info", skip(state, new), fields(is_boss = new.is_boss))]
pub async fn create_node(state: &AppState, passage_id: u64, new: NewNode) -> Result<Node, ApiError> {
  let res = state.catalog.write().await.create_node(passage_id, new).map_err(ApiError::from);
  report(state, "Node saved", res, |n| {
    if n.is_boss { format!("Boss node created at position {}", n.position) } else { format!("Node created at position {}", n.position) }
  })
}

#[instrument(level = "info", skip(state, patch))]
pub async fn update_node(state: &AppState, id: u64, patch: NodePatch) -> Result<Node, ApiError> {
  let res = state.catalog.write().await.update_node(id, patch).map_err(ApiError::from);
  report(state, "Node saved", res, |n| format!("Updated node {}", n.id))
}

#[instrument(level = "info", skip(state))]
pub async fn delete_node(state: &AppState, id: u64) -> Result<Node, ApiError> {
  let res = state.catalog.write().await.delete_node(id).map_err(ApiError::from);
  report(state, "Node deleted", res, |n| format!("Deleted node {} and its questions", n.id))
}

#[instrument(level = "info", skip(state))]
pub async fn reorder_node(state: &AppState, id: u64, position: u32) -> Result<Vec<Node>, ApiError> {
  let res = state.catalog.write().await.reorder_node(id, position).map_err(ApiError::from);
  report(state, "Nodes reordered", res, |_| format!("Node {id} moved to position {position}"))
}

pub async fn boss_of(state: &AppState, passage_id: u64) -> Result<Option<Node>, ApiError> {
  Ok(state.catalog.read().await.boss_of(passage_id)?)
}

#[instrument(level = "info", skip(state))]
pub async fn set_boss(state: &AppState, passage_id: u64, node_id: u64) -> Result<Node, ApiError> {
  let res = state.catalog.write().await.set_boss(passage_id, node_id).map_err(ApiError::from);
  report(state, "Boss updated", res, |n| format!("Node {} is now the boss of passage {passage_id}", n.id))
}

#[instrument(level = "info", skip(state))]
pub async fn clear_boss(state: &AppState, passage_id: u64) -> Result<Option<Node>, ApiError> {
  let res = state.catalog.write().await.clear_boss(passage_id).map_err(ApiError::from);
  report(state, "Boss updated", res, |n| match n {
    Some(n) => format!("Node {} is no longer a boss", n.id),
    None => format!("Passage {passage_id} had no boss"),
  })
}

// ---------- questions ----------

pub async fn list_questions(state: &AppState, node_id: u64) -> Result<Vec<QuestionOut>, ApiError> {
  Ok(state.catalog.read().await.questions(node_id)?.iter().map(to_out).collect())
}

pub async fn get_question(state: &AppState, id: u64) -> Result<QuestionOut, ApiError> {
  Ok(to_out(state.catalog.read().await.question(id)?))
}

#[instrument(level = "info", skip(state, input), fields(kind = %input.kind))]
pub async fn create_question(state: &AppState, node_id: u64, input: QuestionIn) -> Result<QuestionOut, ApiError> {
  let res = match content_from(input) {
    Ok(content) => state.catalog.write().await.create_question(node_id, content).map_err(ApiError::from),
    Err(e) => Err(e),
  };
  report(state, "Question saved", res.map(|q| to_out(&q)), |q| format!("Created {} question {}", q.kind, q.id))
}

#[instrument(level = "info", skip(state, input), fields(kind = %input.kind))]
pub async fn update_question(state: &AppState, id: u64, input: QuestionIn) -> Result<QuestionOut, ApiError> {
  let res = match content_from(input) {
    Ok(content) => state.catalog.write().await.update_question(id, content).map_err(ApiError::from),
    Err(e) => Err(e),
  };
  report(state, "Question saved", res.map(|q| to_out(&q)), |q| format!("Saved question {}", q.id))
}

/// Switching type discards the old content for the new type's blank.
#[instrument(level = "info", skip(state))]
pub async fn set_question_type(state: &AppState, id: u64, tag: &str) -> Result<QuestionOut, ApiError> {
  let res = match parse_kind(tag) {
    Ok(kind) => state.catalog.write().await.set_question_type(id, kind).map_err(ApiError::from),
    Err(e) => Err(e),
  };
  report(state, "Question type changed", res.map(|q| to_out(&q)), |q| format!("Question {} is now {}", q.id, q.kind))
}

/// A rejected edit is not an error: the stored content is untouched and a warning is shown.
#[instrument(level = "info", skip(state, edit), fields(op = edit.name()))]
pub async fn edit_question(state: &AppState, id: u64, edit: ContentEdit) -> Result<EditOut, ApiError> {
  let res = state.catalog.write().await.edit_question(id, &edit).map_err(ApiError::from);
  let (outcome, question) = report_err(state, "Edit failed", res)?;
  if let Outcome::Rejected(reason) = &outcome {
    state.notifier.notify(Notification::new(Severity::Warning, "Edit not applied", reason.to_string()));
  }
  Ok(EditOut { outcome, question: to_out(&question) })
}

#[instrument(level = "info", skip(state))]
pub async fn delete_question(state: &AppState, id: u64) -> Result<QuestionOut, ApiError> {
  let res = state.catalog.write().await.delete_question(id).map_err(ApiError::from);
  report(state, "Question deleted", res.map(|q| to_out(&q)), |q| format!("Deleted question {}", q.id))
}

#[instrument(level = "info", skip(state))]
pub async fn reorder_question(state: &AppState, id: u64, position: u32) -> Result<Vec<QuestionOut>, ApiError> {
  let res = state.catalog.write().await.reorder_question(id, position).map_err(ApiError::from);
  report(state, "Questions reordered", res.map(|qs| qs.iter().map(to_out).collect()), |_| {
    format!("Question {id} moved to position {position}")
  })
}

// ---------- registry and grading ----------

pub fn blanks() -> Vec<BlankOut> {
  QuestionType::ALL.iter().map(|&k| QuestionContent::blank(k).into()).collect()
}

pub fn blank_for(tag: &str) -> Result<BlankOut, ApiError> {
  Ok(QuestionContent::blank(parse_kind(tag)?).into())
}

#[instrument(level = "info", skip(content, answer), fields(%tag))]
pub fn grade_raw(tag: &str, content: serde_json::Value, answer: serde_json::Value) -> Result<Verdict, ApiError> {
  Ok(grading::grade_raw(tag, content, answer)?)
}

// ---------- previews ----------

/// What a preview should show: a stored question, or ad-hoc content (blank if omitted).
async fn resolve_preview(state: &AppState, input: PreviewIn) -> Result<(Option<u64>, QuestionContent), ApiError> {
  if let Some(qid) = input.question_id {
    let content = state.catalog.read().await.question(qid)?.content.clone();
    return Ok((Some(qid), content));
  }
  let tag = input
    .question_type
    .ok_or_else(|| ApiError::BadRequest("either questionId or questionType is required".into()))?;
  let content = content_from(QuestionIn { kind: tag, content: input.content })?;
  Ok((None, content))
}

#[instrument(level = "info", skip(state, input), fields(question_id = ?input.question_id))]
pub async fn preview_start(state: &AppState, input: PreviewIn) -> Result<PreviewView, ApiError> {
  let res = async {
    let (qid, content) = resolve_preview(state, input).await?;
    let p = Preview::new(qid, content, &mut StdRng::from_entropy());
    let view = p.view();
    state.previews.write().await.insert(p.id, p);
    info!(target: "preview", id = %view.id, kind = %view.kind, "preview started");
    Ok::<_, ApiError>(view)
  }
  .await;
  report_err(state, "Preview failed", res)
}

/// A preview of a stored question follows that question: any change in the catalog resets
/// it before the next use. Ad-hoc previews, and previews whose question is gone, keep
/// their own copy.
async fn refresh_preview(state: &AppState, id: Uuid) -> Result<(), ApiError> {
  let Some(qid) = state.with_preview(id, |p| p.question_id()).await? else {
    return Ok(());
  };
  let content = match state.catalog.read().await.question(qid) {
    Ok(q) => q.content.clone(),
    Err(_) => {
      debug!(target: "preview", %id, question_id = qid, "stored question gone; keeping snapshot");
      return Ok(());
    }
  };
  let reset = state.with_preview(id, |p| p.sync(Some(qid), content, &mut StdRng::from_entropy())).await?;
  if reset {
    info!(target: "preview", %id, question_id = qid, "question changed; preview reset");
  }
  Ok(())
}

pub async fn preview_view(state: &AppState, id: Uuid) -> Result<PreviewView, ApiError> {
  refresh_preview(state, id).await?;
  state.with_preview(id, |p| p.view()).await
}

#[instrument(level = "debug", skip(state, action), fields(%id, action = action.name()))]
pub async fn preview_act(state: &AppState, id: Uuid, action: PreviewAction) -> Result<PreviewActOut, ApiError> {
  refresh_preview(state, id).await?;
  state
    .with_preview(id, |p| {
      let outcome = p.act(&action);
      PreviewActOut { outcome, preview: p.view() }
    })
    .await
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn preview_check(state: &AppState, id: Uuid) -> Result<PreviewView, ApiError> {
  let res = match refresh_preview(state, id).await {
    Ok(()) => state
      .with_preview(id, |p| p.check().map(|_| p.view()))
      .await
      .and_then(|r| r.map_err(ApiError::from)),
    Err(e) => Err(e),
  };
  report_err(state, "Check failed", res)
}

pub async fn preview_restart(state: &AppState, id: Uuid) -> Result<PreviewView, ApiError> {
  refresh_preview(state, id).await?;
  state
    .with_preview(id, |p| {
      p.restart();
      p.view()
    })
    .await
}

/// Re-point a preview at the latest content. An empty body re-reads the preview's own
/// stored question.
#[instrument(level = "info", skip(state, input), fields(%id))]
pub async fn preview_sync(state: &AppState, id: Uuid, mut input: PreviewIn) -> Result<PreviewSyncOut, ApiError> {
  if input.question_id.is_none() && input.question_type.is_none() {
    input.question_id = state.with_preview(id, |p| p.question_id()).await?;
  }
  let (qid, content) = resolve_preview(state, input).await?;
  state
    .with_preview(id, |p| {
      let reset = p.sync(qid, content, &mut StdRng::from_entropy());
      PreviewSyncOut { reset, preview: p.view() }
    })
    .await
}

pub async fn preview_discard(state: &AppState, id: Uuid) -> Result<(), ApiError> {
  state
    .previews
    .write()
    .await
    .remove(&id)
    .map(|_| ())
    .ok_or_else(|| ApiError::SessionNotFound { kind: "preview", id: id.to_string() })
}

// ---------- test runs ----------

/// Load the node's questions into a new run. An unknown node yields an empty run.
#[instrument(level = "info", skip(state))]
pub async fn test_start(state: &AppState, node_id: u64) -> Result<TestView, ApiError> {
  let (questions, pass_score) = state.catalog.read().await.questions_for_test(node_id);
  if pass_score.is_none() {
    warn!(target: "test_mode", node_id, "node metadata unavailable; using default pass score");
  }
  let mut run = TestRun::new(node_id);
  run.load(questions, pass_score.or(Some(state.config.defaults.pass_score)))?;
  let view = test_view(&run);
  if matches!(run.phase(), Phase::Empty) {
    state.notifier.notify(Notification::new(Severity::Info, "Nothing to test", format!("Node {node_id} has no questions yet")));
  }
  state.tests.write().await.insert(run.id, run);
  Ok(view)
}

pub async fn test_view_of(state: &AppState, id: Uuid) -> Result<TestView, ApiError> {
  state.with_test(id, |t| test_view(t)).await
}

#[instrument(level = "debug", skip(state, answer), fields(%id, kind = %answer.kind()))]
pub async fn test_select(state: &AppState, id: Uuid, answer: Answer) -> Result<TestView, ApiError> {
  let res = state
    .with_test(id, |t| t.select(answer).map(|_| test_view(t)))
    .await
    .and_then(|r| r.map_err(ApiError::from));
  report_err(state, "Answer not accepted", res)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn test_submit(state: &AppState, id: Uuid) -> Result<TestView, ApiError> {
  let res = state
    .with_test(id, |t| t.submit().map(|_| test_view(t)))
    .await
    .and_then(|r| r.map_err(ApiError::from));
  report_err(state, "Submit failed", res)
}

/// Select and submit in one step.
#[instrument(level = "info", skip(state, answer), fields(%id, kind = %answer.kind()))]
pub async fn test_answer(state: &AppState, id: Uuid, answer: Answer) -> Result<TestView, ApiError> {
  let res = state
    .with_test(id, |t| t.answer(answer).map(|_| test_view(t)))
    .await
    .and_then(|r| r.map_err(ApiError::from));
  report_err(state, "Submit failed", res)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn test_advance(state: &AppState, id: Uuid) -> Result<TestView, ApiError> {
  let res = state
    .with_test(id, |t| -> Result<TestView, RunnerError> {
      t.advance()?;
      Ok(test_view(t))
    })
    .await
    .and_then(|r| r.map_err(ApiError::from));
  let view = report_err(state, "Cannot continue", res)?;
  if let Some(s) = &view.summary {
    let severity = if s.passed { Severity::Success } else { Severity::Warning };
    let verdict = if s.passed { "passed" } else { "not passed" };
    state.notifier.notify(Notification::new(
      severity,
      "Test complete",
      format!("{}/{} correct, score {}% (pass {}%): {verdict}", s.correct_count, s.total_questions, s.final_score, s.pass_score),
    ));
  }
  Ok(view)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn test_restart(state: &AppState, id: Uuid) -> Result<TestView, ApiError> {
  let res = state
    .with_test(id, |t| t.restart().map(|_| test_view(t)))
    .await
    .and_then(|r| r.map_err(ApiError::from));
  report_err(state, "Restart failed", res)
}

pub async fn test_discard(state: &AppState, id: Uuid) -> Result<(), ApiError> {
  state
    .tests
    .write()
    .await
    .remove(&id)
    .map(|_| ())
    .ok_or_else(|| ApiError::SessionNotFound { kind: "test", id: id.to_string() })
}
