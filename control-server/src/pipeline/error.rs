//! Pipeline stages and failure mapping
//!
//! Every pipeline failure is exactly one `(stage, kind)` pair; the orchestrator
//! never swallows a failure to continue to the next stage, and the HTTP
//! response always names the stage at which the run stopped.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::validator::ValidationError;
use crate::clients::ClientError;
use crate::db::repository::RepoError;

/// A named step of the orchestration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validating,
    Uploading,
    Recording,
    Downloading,
    Evaluating,
    Finalizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Uploading => "uploading",
            Stage::Recording => "recording",
            Stage::Downloading => "downloading",
            Stage::Evaluating => "evaluating",
            Stage::Finalizing => "finalizing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage failed
#[derive(Debug, thiserror::Error)]
pub enum FailureKind {
    /// Batch malformed — client-caused, never retried
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Remote service unreachable or timed out — transient, the caller may
    /// retry the whole request
    #[error("transport: {0}")]
    Transport(String),

    /// Remote service returned a structured error — terminal here
    #[error("remote rejection ({status}): {body}")]
    Remote { status: u16, body: String },

    /// Remote response structurally violates the expected shape — terminal,
    /// indicates collaborator-protocol drift
    #[error("contract violation: {0}")]
    Contract(String),

    /// Local metadata store failure
    #[error("database: {0}")]
    Database(String),
}

impl From<ClientError> for FailureKind {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport(msg) => FailureKind::Transport(msg),
            ClientError::Rejected { status, body } => FailureKind::Remote { status, body },
            ClientError::Malformed(msg) => FailureKind::Contract(msg),
        }
    }
}

impl From<RepoError> for FailureKind {
    fn from(e: RepoError) -> Self {
        FailureKind::Database(e.to_string())
    }
}

/// Terminal outcome of a failed pipeline run
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {kind}")]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: FailureKind,
}

impl PipelineError {
    pub fn at(stage: Stage, kind: impl Into<FailureKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }
}

#[derive(Serialize)]
struct FailureBody {
    status: &'static str,
    stage: Stage,
    reason: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self.kind {
            FailureKind::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::Transport(_) | FailureKind::Remote { .. } => StatusCode::BAD_GATEWAY,
            FailureKind::Contract(msg) => {
                // Collaborator-protocol drift gets its own target
                tracing::error!(
                    target: "contract",
                    stage = %self.stage,
                    reason = %msg,
                    "Remote response violated the expected contract"
                );
                StatusCode::BAD_GATEWAY
            }
            FailureKind::Database(msg) => {
                tracing::error!(
                    target: "database",
                    stage = %self.stage,
                    error = %msg,
                    "Database error during pipeline run"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = FailureBody {
            status: "error",
            stage: self.stage,
            reason: self.kind.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
