//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};
use uuid::Uuid;

use crate::error::ApiError;
use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "quest_admin", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "quest_admin", "WebSocket connected");
  let mut owned = Owned::default();
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = dispatch(&txt, &state, &mut owned).await;

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "error": "internal", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "quest_admin", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  owned.release(&state).await;
  info!(target: "quest_admin", "WebSocket disconnected");
}

/// Sessions opened over one connection. They go away with it.
#[derive(Default)]
struct Owned {
  previews: Vec<Uuid>,
  tests: Vec<Uuid>,
}

impl Owned {
  fn track(&mut self, reply: &ServerWsMessage) {
    match reply {
      ServerWsMessage::Preview { preview } => self.previews.push(preview.id),
      ServerWsMessage::Test { test } => self.tests.push(test.id),
      _ => {}
    }
  }

  /// Drop whatever is still live; sessions the client already discarded are skipped.
  async fn release(self, state: &AppState) {
    let (previews, tests) = (self.previews.len(), self.tests.len());
    for id in self.previews {
      let _ = logic::preview_discard(state, id).await;
    }
    for id in self.tests {
      let _ = logic::test_discard(state, id).await;
    }
    if previews + tests > 0 {
      debug!(target: "quest_admin", previews, tests, "WS sessions released");
    }
  }
}

/// Parse one text frame, run it, and remember any session it opened.
async fn dispatch(txt: &str, state: &AppState, owned: &mut Owned) -> ServerWsMessage {
  match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "quest_admin", "WS received: {:?}", &incoming);
      let opens = incoming.opens_session();
      let reply = handle_client_ws(incoming, state).await.unwrap_or_else(to_error);
      if opens {
        owned.track(&reply);
      }
      reply
    }
    Err(e) => {
      debug!(target: "quest_admin", payload = %trunc_for_log(txt, 120), error = %e, "WS message rejected");
      ServerWsMessage::Error { error: "bad_request", message: format!("Invalid JSON: {}", e) }
    }
  }
}

fn to_error(e: ApiError) -> ServerWsMessage {
  ServerWsMessage::Error { error: e.code(), message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> Result<ServerWsMessage, ApiError> {
  let reply = match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::TestStart { node_id } => {
      let test = logic::test_start(state, node_id).await?;
      info!(target: "test_mode", id = %test.id, node_id, total = test.total, "WS test run started");
      ServerWsMessage::Test { test }
    }
    ClientWsMessage::TestSelect { test_id, answer } => ServerWsMessage::Test { test: logic::test_select(state, test_id, answer).await? },
    ClientWsMessage::TestSubmit { test_id } => ServerWsMessage::Test { test: logic::test_submit(state, test_id).await? },
    ClientWsMessage::TestAnswer { test_id, answer } => ServerWsMessage::Test { test: logic::test_answer(state, test_id, answer).await? },
    ClientWsMessage::TestAdvance { test_id } => ServerWsMessage::Test { test: logic::test_advance(state, test_id).await? },
    ClientWsMessage::TestRestart { test_id } => ServerWsMessage::Test { test: logic::test_restart(state, test_id).await? },
    ClientWsMessage::TestView { test_id } => ServerWsMessage::Test { test: logic::test_view_of(state, test_id).await? },
    ClientWsMessage::TestDiscard { test_id } => {
      logic::test_discard(state, test_id).await?;
      ServerWsMessage::Discarded { id: test_id }
    }

    ClientWsMessage::PreviewStart(input) => ServerWsMessage::Preview { preview: logic::preview_start(state, input).await? },
    ClientWsMessage::PreviewAct { preview_id, action } => {
      let out = logic::preview_act(state, preview_id, action).await?;
      ServerWsMessage::PreviewActed { outcome: out.outcome, preview: out.preview }
    }
    ClientWsMessage::PreviewCheck { preview_id } => ServerWsMessage::Preview { preview: logic::preview_check(state, preview_id).await? },
    ClientWsMessage::PreviewRestart { preview_id } => {
      ServerWsMessage::Preview { preview: logic::preview_restart(state, preview_id).await? }
    }
    ClientWsMessage::PreviewDiscard { preview_id } => {
      logic::preview_discard(state, preview_id).await?;
      ServerWsMessage::Discarded { id: preview_id }
    }
  };
  Ok(reply)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::config::AppConfig;
  use crate::notify::TracingSink;
  use crate::protocol::PreviewIn;

  fn state() -> AppState {
    AppState::with(AppConfig::default(), Arc::new(TracingSink))
  }

  async fn send(state: &AppState, v: serde_json::Value) -> serde_json::Value {
    let msg: ClientWsMessage = serde_json::from_value(v).unwrap();
    let reply = handle_client_ws(msg, state).await.unwrap_or_else(to_error);
    serde_json::to_value(reply).unwrap()
  }

  #[tokio::test]
  async fn ping_pong() {
    let st = state();
    assert_eq!(send(&st, json!({ "type": "ping" })).await, json!({ "type": "pong" }));
  }

  #[tokio::test]
  async fn errors_carry_a_code() {
    let st = state();
    let r = send(&st, json!({ "type": "test_submit", "testId": uuid::Uuid::new_v4() })).await;
    assert_eq!(r["type"], "error");
    assert_eq!(r["error"], "session_not_found");
  }

  #[tokio::test]
  async fn preview_round_trip_over_ws() {
    let st = state();
    let started = send(&st, json!({ "type": "preview_start", "questionType": "trend_arrow" })).await;
    assert_eq!(started["type"], "preview");
    let id = started["preview"]["id"].clone();

    let acted = send(&st, json!({ "type": "preview_act", "previewId": id, "action": { "action": "pick_trend", "trend": "increase" } })).await;
    assert_eq!(acted["outcome"]["status"], "applied");

    let checked = send(&st, json!({ "type": "preview_check", "previewId": id })).await;
    assert_eq!(checked["preview"]["verdict"]["correct"], true);
  }

  #[tokio::test]
  async fn seeded_lesson_runs_over_ws() {
    let st = state();
    let node_id = {
      let cat = st.catalog.read().await;
      let b = cat.buildings(None)[0].id;
      let p = cat.passages(b).unwrap()[0].id;
      cat.nodes(p).unwrap()[0].id
    };
    let r = send(&st, json!({ "type": "test_start", "nodeId": node_id })).await;
    assert_eq!(r["type"], "test");
    assert_eq!(r["test"]["phase"]["state"], "in_progress");
    assert!(r["test"]["question"]["type"].is_string());
  }

  #[tokio::test]
  async fn closing_a_connection_drops_its_sessions() {
    let st = state();
    let elsewhere =
      logic::preview_start(&st, PreviewIn { question_type: Some("fill_gap".into()), ..Default::default() }).await.unwrap();

    let mut owned = Owned::default();
    for _ in 0..3 {
      dispatch(r#"{ "type": "preview_start", "questionType": "ordering" }"#, &st, &mut owned).await;
      dispatch(r#"{ "type": "test_start", "nodeId": 4242 }"#, &st, &mut owned).await;
    }
    dispatch(r#"{ "type": "ping" }"#, &st, &mut owned).await;
    assert_eq!((owned.previews.len(), owned.tests.len()), (3, 3));

    let first = owned.previews[0];
    let r = dispatch(&json!({ "type": "preview_discard", "previewId": first }).to_string(), &st, &mut owned).await;
    assert_eq!(serde_json::to_value(r).unwrap(), json!({ "type": "discarded", "id": first }));
    assert_eq!(st.previews.read().await.len(), 3);
    assert_eq!(st.tests.read().await.len(), 3);

    owned.release(&st).await;
    assert!(st.tests.read().await.is_empty());
    let previews = st.previews.read().await;
    assert_eq!(previews.len(), 1);
    assert!(previews.contains_key(&elsewhere.id));
  }
}
