use crate::chat::ChatState;
use crate::modal::ModalController;
use crate::notify::Notifications;
use crate::upload::UploadState;
use crate::view_model::{
    AppViewModel, ChatView, DashboardView, DeleteModalView, FileRowView, UploadView,
};
use crate::{EmbedIndicator, FileId, FileRecord, KbStatus, ModalId, PollSettings};

/// File the delete dialog was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteTarget {
    pub(crate) file_id: FileId,
    pub(crate) filename: String,
}

/// All client state of one dashboard + chat instance. Nothing lives in globals,
/// so independent instances never interfere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) poll_settings: PollSettings,
    pub(crate) mounted: bool,
    pub(crate) files: Vec<FileRecord>,
    pub(crate) kb_status: Option<KbStatus>,
    pub(crate) embed_indicator: EmbedIndicator,
    pub(crate) embed_request_in_flight: bool,
    pub(crate) delete_target: Option<DeleteTarget>,
    pub(crate) delete_in_flight: Option<FileId>,
    pub(crate) modals: ModalController,
    pub(crate) upload: UploadState,
    pub(crate) chat: ChatState,
    pub(crate) notifications: Notifications,
    dirty: bool,
}

impl AppState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            chat: ChatState::new(session_id.into()),
            ..Self::default()
        }
    }

    pub fn with_poll_settings(mut self, poll_settings: PollSettings) -> Self {
        self.poll_settings = poll_settings;
        self
    }

    /// The embed trigger needs both loops to agree: the knowledge base must
    /// ask for embedding and no run may be in progress.
    pub fn embed_enabled(&self) -> bool {
        self.kb_status.is_some_and(KbStatus::allows_embedding)
            && !self.embed_indicator.visible
            && !self.embed_request_in_flight
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            dashboard: self.dashboard_view(),
            chat: self.chat_view(),
            toasts: self.notifications.toasts().to_vec(),
            scroll_locked: self.modals.scroll_locked(),
            dirty: self.dirty,
        }
    }

    fn dashboard_view(&self) -> DashboardView {
        let delete_modal = match &self.delete_target {
            Some(target) if self.modals.is_open(ModalId::DeleteConfirm) => Some(DeleteModalView {
                file_id: target.file_id,
                filename: target.filename.clone(),
                confirm_enabled: self.delete_in_flight.is_none(),
            }),
            _ => None,
        };

        DashboardView {
            mounted: self.mounted,
            files: self
                .files
                .iter()
                .map(|file| FileRowView {
                    file_id: file.id,
                    filename: file.filename.clone(),
                    filetype: file.filetype.clone(),
                    uploaded_at: file.uploaded_at.clone(),
                    changed: file.changed,
                })
                .collect(),
            kb_status: self.kb_status,
            kb_banner: self.kb_status.map(KbStatus::banner),
            embed_enabled: self.embed_enabled(),
            embed_progress: self.embed_indicator.clone(),
            delete_modal,
            upload: UploadView {
                selected_file: self.upload.selected().cloned(),
                params: self.upload.params(),
                preview_enabled: self.upload.preview_enabled(),
                preview_busy: self.upload.preview_busy(),
                panel: self.upload.panel().clone(),
                previewed: self.upload.is_previewed(),
                process_enabled: self.upload.process_enabled(),
                process_busy: self.upload.process_busy(),
            },
        }
    }

    fn chat_view(&self) -> ChatView {
        ChatView {
            session_id: self.chat.session_id().to_string(),
            turns: self.chat.transcript().to_vec(),
            loading: self.chat.is_sending(),
            input_enabled: !self.chat.is_sending(),
            conversation_has_started: self.chat.conversation_has_started(),
            initial_greeting_sent: self.chat.initial_greeting_sent(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
