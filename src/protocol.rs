//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BuildingKind, Question};
use crate::question::preview::PreviewView;
use crate::question::{Answer, Outcome, PreviewAction, QuestionContent, QuestionType};
use crate::runner::{Phase, QuestionResult, Summary, TestRun};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    TestStart {
        #[serde(rename = "nodeId")]
        node_id: u64,
    },
    TestSelect {
        #[serde(rename = "testId")]
        test_id: Uuid,
        answer: Answer,
    },
    TestSubmit {
        #[serde(rename = "testId")]
        test_id: Uuid,
    },
    TestAnswer {
        #[serde(rename = "testId")]
        test_id: Uuid,
        answer: Answer,
    },
    TestAdvance {
        #[serde(rename = "testId")]
        test_id: Uuid,
    },
    TestRestart {
        #[serde(rename = "testId")]
        test_id: Uuid,
    },
    TestView {
        #[serde(rename = "testId")]
        test_id: Uuid,
    },
    TestDiscard {
        #[serde(rename = "testId")]
        test_id: Uuid,
    },
    PreviewStart(PreviewIn),
    PreviewAct {
        #[serde(rename = "previewId")]
        preview_id: Uuid,
        action: PreviewAction,
    },
    PreviewCheck {
        #[serde(rename = "previewId")]
        preview_id: Uuid,
    },
    PreviewRestart {
        #[serde(rename = "previewId")]
        preview_id: Uuid,
    },
    PreviewDiscard {
        #[serde(rename = "previewId")]
        preview_id: Uuid,
    },
}

impl ClientWsMessage {
    /// Whether the reply carries a session created by this message.
    pub fn opens_session(&self) -> bool {
        matches!(self, ClientWsMessage::TestStart { .. } | ClientWsMessage::PreviewStart(_))
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Test {
        test: TestView,
    },
    Preview {
        preview: PreviewView,
    },
    PreviewActed {
        outcome: Outcome,
        preview: PreviewView,
    },
    Discarded {
        id: Uuid,
    },
    Error {
        error: &'static str,
        message: String,
    },
}

/// DTO used by both WS and HTTP for question delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub id: u64,
    pub node_id: u64,
    pub position: u32,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub content: serde_json::Value,
}

pub fn to_out(q: &Question) -> QuestionOut {
    QuestionOut { id: q.id, node_id: q.node_id, position: q.position, kind: q.kind(), content: q.content.payload() }
}

/// Snapshot of a test run, as rendered by the test-mode screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestView {
    pub id: Uuid,
    pub node_id: u64,
    pub phase: Phase,
    pub question: Option<QuestionOut>,
    pub total: usize,
    pub results: Vec<QuestionResult>,
    pub summary: Option<Summary>,
}

pub fn test_view(run: &TestRun) -> TestView {
    TestView {
        id: run.id,
        node_id: run.node_id,
        phase: run.phase().clone(),
        question: run.current_question().map(to_out),
        total: run.total(),
        results: run.results().to_vec(),
        summary: run.summary(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct BuildingQuery {
    pub kind: Option<BuildingKind>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderIn {
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetBossIn {
    #[serde(rename = "nodeId")]
    pub node_id: u64,
}

/// Question create/replace body; missing content means the type's blank.
#[derive(Debug, Deserialize)]
pub struct QuestionIn {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionTypeIn {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct EditOut {
    pub outcome: Outcome,
    pub question: QuestionOut,
}

#[derive(Debug, Serialize)]
pub struct BlankOut {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub content: serde_json::Value,
}

impl From<QuestionContent> for BlankOut {
    fn from(c: QuestionContent) -> Self {
        BlankOut { kind: c.kind(), content: c.payload() }
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeIn {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: serde_json::Value,
    pub answer: serde_json::Value,
}

/// Start (or resync) a preview from a stored question or from ad-hoc content.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewIn {
    pub question_id: Option<u64>,
    pub question_type: Option<String>,
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct PreviewActOut {
    pub outcome: Outcome,
    pub preview: PreviewView,
}

#[derive(Debug, Serialize)]
pub struct PreviewSyncOut {
    pub reset: bool,
    pub preview: PreviewView,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStartIn {
    pub node_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct SelectIn {
    pub answer: Answer,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
