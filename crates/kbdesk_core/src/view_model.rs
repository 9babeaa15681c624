use std::path::PathBuf;

use crate::{
    ChatTurn, ChunkParams, EmbedIndicator, FileId, KbStatus, PreviewPanel, StatusBanner, Toast,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub dashboard: DashboardView,
    pub chat: ChatView,
    pub toasts: Vec<Toast>,
    /// Background scrolling is suppressed while a modal is open.
    pub scroll_locked: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub mounted: bool,
    pub files: Vec<FileRowView>,
    pub kb_status: Option<KbStatus>,
    pub kb_banner: Option<StatusBanner>,
    pub embed_enabled: bool,
    pub embed_progress: EmbedIndicator,
    pub delete_modal: Option<DeleteModalView>,
    pub upload: UploadView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub file_id: FileId,
    pub filename: String,
    pub filetype: String,
    pub uploaded_at: String,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteModalView {
    pub file_id: FileId,
    pub filename: String,
    pub confirm_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub selected_file: Option<PathBuf>,
    pub params: ChunkParams,
    pub preview_enabled: bool,
    pub preview_busy: bool,
    pub panel: PreviewPanel,
    pub previewed: bool,
    pub process_enabled: bool,
    pub process_busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatView {
    pub session_id: String,
    pub turns: Vec<ChatTurn>,
    /// The single loading placeholder shown while an exchange is in flight.
    pub loading: bool,
    pub input_enabled: bool,
    pub conversation_has_started: bool,
    pub initial_greeting_sent: bool,
}
