use std::path::PathBuf;
use std::time::Duration;

use crate::{ChunkParams, FileId, ToastId, ToastTimer};

/// Side effects requested by `update`; executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a repeating poll loop. The first poll happens immediately.
    StartPolling { poll: PollKind, every: Duration },
    /// Cancel every running poll loop.
    StopPolling,
    /// Run a single out-of-band poll after a delay.
    PollOnce { poll: PollKind, after: Duration },
    RefreshFiles,
    DeleteFile { file_id: FileId },
    StartEmbedding { scope: EmbedScope },
    PreviewChunking {
        revision: u64,
        file: PathBuf,
        params: ChunkParams,
    },
    UploadDocument { file: PathBuf, params: ChunkParams },
    SendChat {
        exchange_id: u64,
        request: ChatRequest,
    },
    ScheduleToastTimer {
        toast_id: ToastId,
        timer: ToastTimer,
        after: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    KbStatus,
    EmbedProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedScope {
    /// Only files changed since the last embedding run.
    Changed,
    /// Re-embed every file.
    All,
}

/// Body of a chat exchange, in the shape the chat endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub conversation_has_started: bool,
    pub is_initial_greeting_sent: bool,
}
