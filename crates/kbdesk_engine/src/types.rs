use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type FileId = u64;
/// Opaque tag echoed back by [`EngineEvent::TimerFired`].
pub type TimerTag = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollTarget {
    KbStatus,
    EmbedProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("undecodable response")]
    Decode,
    #[error("local file error")]
    Io,
    #[error("network error")]
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub id: FileId,
    pub filename: String,
    pub filetype: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct FileListResponse {
    #[serde(default)]
    pub(crate) files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KbStatusReply {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedProgressReply {
    #[serde(default = "idle_status")]
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

fn idle_status() -> String {
    "idle".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewChunk {
    pub chunk_number: u32,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub preview_chunks: Option<Vec<PreviewChunk>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A document plus the chunking parameters, sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub file: PathBuf,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub message: String,
    pub user_id: String,
    #[serde(rename = "conversationHasStarted")]
    pub conversation_has_started: bool,
    #[serde(rename = "isInitialGreetingSent")]
    pub is_initial_greeting_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    FilesListed(Result<Vec<FileEntry>, ApiError>),
    KbStatus(Result<KbStatusReply, ApiError>),
    EmbedProgress(Result<EmbedProgressReply, ApiError>),
    FileDeleted {
        file_id: FileId,
        result: Result<(), ApiError>,
    },
    EmbeddingRequested(Result<(), ApiError>),
    PreviewReady {
        revision: u64,
        result: Result<PreviewResponse, ApiError>,
    },
    Uploaded(Result<(), ApiError>),
    ChatReplied {
        exchange_id: u64,
        result: Result<ChatReply, ApiError>,
    },
    TimerFired {
        tag: TimerTag,
    },
}
