//! kbdesk engine: HTTP client, poll loops and effect execution.
mod client;
mod engine;
mod markdown;
mod poll;
mod store;
mod types;

pub use client::{BackendApi, ChatApi, ClientSettings, DashboardApi, ReqwestApi};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use markdown::{render_bot_html, render_bot_terminal, render_user_html};
pub use poll::{poll_target, run_poll_loop, PollLoops};
pub use store::{generate_session_id, PersistError, PersistedSession, StateDir};
pub use types::{
    ApiError, ChatMessage, ChatReply, DocumentRequest, EmbedProgressReply, EngineError,
    EngineEvent, FailureKind, FileEntry, FileId, KbStatusReply, PollTarget, PreviewChunk,
    PreviewResponse, TimerTag,
};
