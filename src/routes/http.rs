//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures become `{error, message}` JSON via `ApiError`.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::{BuildingPatch, NewBuilding, NewNode, NewPassage, NodePatch, PassagePatch};
use crate::domain::{Building, Node, Passage};
use crate::error::ApiError;
use crate::logic;
use crate::protocol::*;
use crate::question::grading::Verdict;
use crate::question::preview::PreviewView;
use crate::question::{ContentEdit, PreviewAction};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

// ---------- buildings ----------

#[instrument(level = "info", skip(state))]
pub async fn list_buildings(State(state): State<Arc<AppState>>, Query(q): Query<BuildingQuery>) -> Json<Vec<Building>> {
  Json(logic::list_buildings(&state, q.kind).await)
}

#[instrument(level = "info", skip(state))]
pub async fn get_building(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Building> {
  logic::get_building(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, kind = ?body.kind))]
pub async fn create_building(State(state): State<Arc<AppState>>, Json(body): Json<NewBuilding>) -> ApiResult<Building> {
  let b = logic::create_building(&state, body).await?;
  info!(target: "catalog", id = b.id, "HTTP building created");
  Ok(Json(b))
}

#[instrument(level = "info", skip(state, body))]
pub async fn update_building(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<BuildingPatch>,
) -> ApiResult<Building> {
  logic::update_building(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn delete_building(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Building> {
  logic::delete_building(&state, id).await.map(Json)
}

// ---------- passages ----------

#[instrument(level = "info", skip(state))]
pub async fn list_passages(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Vec<Passage>> {
  logic::list_passages(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title))]
pub async fn create_passage(
  State(state): State<Arc<AppState>>,
  Path(building_id): Path<u64>,
  Json(body): Json<NewPassage>,
) -> ApiResult<Passage> {
  logic::create_passage(&state, building_id, body).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn update_passage(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<PassagePatch>,
) -> ApiResult<Passage> {
  logic::update_passage(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn delete_passage(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Passage> {
  logic::delete_passage(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state), fields(position = body.position))]
pub async fn reorder_passage(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<ReorderIn>,
) -> ApiResult<Vec<Passage>> {
  logic::reorder_passage(&state, id, body.position).await.map(Json)
}

// ---------- nodes and bosses ----------

#[instrument(level = "info", skip(state))]
pub async fn list_nodes(State(state): State<Arc<AppState>>, Path(passage_id): Path<u64>) -> ApiResult<Vec<Node>> {
  logic::list_nodes(&state, passage_id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn get_node(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Node> {
  logic::get_node(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn create_node(
  State(state): State<Arc<AppState>>,
  Path(passage_id): Path<u64>,
  Json(body): Json<NewNode>,
) -> ApiResult<Node> {
  logic::create_node(&state, passage_id, body).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn update_node(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<NodePatch>,
) -> ApiResult<Node> {
  logic::update_node(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn delete_node(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<Node> {
  logic::delete_node(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state), fields(position = body.position))]
pub async fn reorder_node(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<ReorderIn>,
) -> ApiResult<Vec<Node>> {
  logic::reorder_node(&state, id, body.position).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn get_boss(State(state): State<Arc<AppState>>, Path(passage_id): Path<u64>) -> ApiResult<Option<Node>> {
  logic::boss_of(&state, passage_id).await.map(Json)
}

/// Promote an existing node of the passage to boss.
#[instrument(level = "info", skip(state), fields(node_id = body.node_id))]
pub async fn set_boss(
  State(state): State<Arc<AppState>>,
  Path(passage_id): Path<u64>,
  Json(body): Json<SetBossIn>,
) -> ApiResult<Node> {
  logic::set_boss(&state, passage_id, body.node_id).await.map(Json)
}

/// Create a new node that becomes the passage's boss.
#[instrument(level = "info", skip(state, body))]
pub async fn create_boss(
  State(state): State<Arc<AppState>>,
  Path(passage_id): Path<u64>,
  Json(mut body): Json<NewNode>,
) -> ApiResult<Node> {
  body.is_boss = true;
  logic::create_node(&state, passage_id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn clear_boss(State(state): State<Arc<AppState>>, Path(passage_id): Path<u64>) -> ApiResult<Option<Node>> {
  logic::clear_boss(&state, passage_id).await.map(Json)
}

// ---------- questions ----------

#[instrument(level = "info", skip(state))]
pub async fn list_questions(State(state): State<Arc<AppState>>, Path(node_id): Path<u64>) -> ApiResult<Vec<QuestionOut>> {
  logic::list_questions(&state, node_id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn get_question(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<QuestionOut> {
  logic::get_question(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(kind = %body.kind))]
pub async fn create_question(
  State(state): State<Arc<AppState>>,
  Path(node_id): Path<u64>,
  Json(body): Json<QuestionIn>,
) -> ApiResult<QuestionOut> {
  logic::create_question(&state, node_id, body).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(kind = %body.kind))]
pub async fn update_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<QuestionIn>,
) -> ApiResult<QuestionOut> {
  logic::update_question(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state), fields(kind = %body.kind))]
pub async fn set_question_type(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<QuestionTypeIn>,
) -> ApiResult<QuestionOut> {
  logic::set_question_type(&state, id, &body.kind).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(op = body.name()))]
pub async fn edit_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<ContentEdit>,
) -> ApiResult<EditOut> {
  logic::edit_question(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn delete_question(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<QuestionOut> {
  logic::delete_question(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state), fields(position = body.position))]
pub async fn reorder_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<ReorderIn>,
) -> ApiResult<Vec<QuestionOut>> {
  logic::reorder_question(&state, id, body.position).await.map(Json)
}

// ---------- registry and grading ----------

#[instrument(level = "info")]
pub async fn list_blanks() -> Json<Vec<BlankOut>> { Json(logic::blanks()) }

#[instrument(level = "info")]
pub async fn get_blank(Path(tag): Path<String>) -> ApiResult<BlankOut> {
  logic::blank_for(&tag).map(Json)
}

#[instrument(level = "info", skip(body), fields(kind = %body.kind))]
pub async fn grade(Json(body): Json<GradeIn>) -> ApiResult<Verdict> {
  let verdict = logic::grade_raw(&body.kind, body.content, body.answer)?;
  info!(target: "grading", kind = %body.kind, correct = verdict.correct, "HTTP raw grade evaluated");
  Ok(Json(verdict))
}

// ---------- previews ----------

#[instrument(level = "info", skip(state, body), fields(question_id = ?body.question_id))]
pub async fn preview_start(State(state): State<Arc<AppState>>, Json(body): Json<PreviewIn>) -> ApiResult<PreviewView> {
  logic::preview_start(&state, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn preview_view(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<PreviewView> {
  logic::preview_view(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(action = body.name()))]
pub async fn preview_act(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PreviewAction>,
) -> ApiResult<PreviewActOut> {
  logic::preview_act(&state, id, body).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn preview_check(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<PreviewView> {
  logic::preview_check(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn preview_restart(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<PreviewView> {
  logic::preview_restart(&state, id).await.map(Json)
}

/// An empty body re-reads the preview's own stored question.
#[instrument(level = "info", skip(state, body))]
pub async fn preview_sync(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  body: Option<Json<PreviewIn>>,
) -> ApiResult<PreviewSyncOut> {
  let input = body.map(|Json(b)| b).unwrap_or_default();
  logic::preview_sync(&state, id, input).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn preview_discard(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
  logic::preview_discard(&state, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ---------- test runs ----------

#[instrument(level = "info", skip(state), fields(node_id = body.node_id))]
pub async fn test_start(State(state): State<Arc<AppState>>, Json(body): Json<TestStartIn>) -> ApiResult<TestView> {
  let view = logic::test_start(&state, body.node_id).await?;
  info!(target: "test_mode", id = %view.id, node_id = body.node_id, total = view.total, "HTTP test run started");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn test_view(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<TestView> {
  logic::test_view_of(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn test_select(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SelectIn>,
) -> ApiResult<TestView> {
  logic::test_select(&state, id, body.answer).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn test_submit(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<TestView> {
  logic::test_submit(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn test_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SelectIn>,
) -> ApiResult<TestView> {
  logic::test_answer(&state, id, body.answer).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn test_advance(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<TestView> {
  logic::test_advance(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn test_restart(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<TestView> {
  logic::test_restart(&state, id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn test_discard(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
  logic::test_discard(&state, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
