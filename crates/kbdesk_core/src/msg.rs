use std::path::PathBuf;

use crate::{
    ChunkParams, CloseTrigger, EmbedProgressReport, EmbedScope, FileId, FileRecord, ModalId,
    PreviewReply, ToastId, ToastTimer,
};

/// Everything that can happen to the client: user input, server replies and timers.
///
/// Results from the runtime carry `Err(String)` with a human-readable failure
/// description; the core only logs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard became visible; starts polling.
    Mounted,
    /// Dashboard went away; stops polling.
    Unmounted,
    /// Reply from the file listing endpoint.
    FilesLoaded(Result<Vec<FileRecord>, String>),
    /// Raw status string from the knowledge-base status endpoint.
    KbStatusPolled(Result<String, String>),
    /// Reply from the embedding progress endpoint.
    EmbedProgressPolled(Result<EmbedProgressReport, String>),
    /// User clicked the delete action on a row, identified by file id.
    DeleteRequested { file_id: FileId },
    /// User confirmed the delete dialog.
    DeleteConfirmed,
    /// Delete request settled.
    DeleteFinished {
        file_id: FileId,
        result: Result<(), String>,
    },
    /// User asked to close a modal (button or backdrop).
    ModalCloseRequested {
        modal: ModalId,
        trigger: CloseTrigger,
    },
    /// User clicked "Embed Data".
    EmbedClicked { scope: EmbedScope },
    /// Embedding request settled.
    EmbedFinished { result: Result<(), String> },
    /// User picked (or cleared) the file to upload.
    FileSelected(Option<PathBuf>),
    /// User edited chunk size or overlap.
    ChunkParamsChanged(ChunkParams),
    /// User clicked "Preview Chunking".
    PreviewClicked,
    /// Preview request settled. `revision` is the selection revision it was sent for.
    PreviewFinished {
        revision: u64,
        result: Result<PreviewReply, String>,
    },
    /// User clicked "Process and Save".
    ProcessClicked,
    /// Upload request settled.
    ProcessFinished { result: Result<(), String> },
    /// Chat widget opened; sends the greeting once.
    ChatOpened,
    /// User submitted a chat message.
    ChatSubmitted(String),
    /// Chat exchange settled with the bot's reply text.
    ChatReplied {
        exchange_id: u64,
        result: Result<String, String>,
    },
    /// A notification timer fired.
    ToastTimerElapsed { toast_id: ToastId, timer: ToastTimer },
    /// User closed a notification.
    ToastClosed(ToastId),
    /// UI/render tick to coalesce rendering.
    Tick,
}
