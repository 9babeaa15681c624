//! kbdesk core: pure state machine and view-model helpers for the knowledge-base
//! dashboard and the chat widget.
mod chat;
mod dashboard;
mod effect;
mod modal;
mod msg;
mod notify;
mod state;
mod update;
mod upload;
mod view_model;

pub use chat::{
    ChatTurn, ExchangeKind, Sender, EXCHANGE_FAILED_REPLY, GREETING_FAILED_REPLY,
    GREETING_MESSAGE,
};
pub use dashboard::{
    clamp_percent, BannerLevel, EmbedIndicator, EmbedProgressReport, EmbedStatus, FileId,
    FileRecord, KbStatus, PollSettings, StatusBanner, EMBED_PROGRESS_FALLBACK_TEXT,
    EMBED_PROGRESS_INTERVAL, KB_STATUS_INTERVAL, OUT_OF_BAND_POLL_DELAY,
};
pub use effect::{ChatRequest, EmbedScope, Effect, PollKind};
pub use modal::{CloseTrigger, ModalId};
pub use msg::Msg;
pub use notify::{
    Toast, ToastId, ToastKind, ToastPhase, ToastTimer, TOAST_EXIT_TRANSITION,
    TOAST_REVEAL_DELAY, TOAST_VISIBLE_FOR,
};
pub use state::AppState;
pub use update::{
    update, DELETE_FAILED, DELETE_SUCCEEDED, EMBED_FAILED, EMBED_STARTED, NO_FILE_SELECTED,
    PREVIEW_REQUIRED, UPLOAD_FAILED, UPLOAD_SUCCEEDED,
};
pub use upload::{
    ChunkParams, ChunkPreview, PreviewPanel, PreviewReply, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE, PREVIEW_EMPTY_TEXT, PREVIEW_FAILED_TEXT, PREVIEW_UNREACHABLE_TEXT,
};
pub use view_model::{
    AppViewModel, ChatView, DashboardView, DeleteModalView, FileRowView, UploadView,
};
