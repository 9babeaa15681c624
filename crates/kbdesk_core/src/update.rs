use kbdesk_logging::{kbdesk_debug, kbdesk_info, kbdesk_warn};

use crate::chat::SendRejected;
use crate::state::DeleteTarget;
use crate::upload::{PreviewOutcome, PreviewRejected, ProcessRejected};
use crate::{
    AppState, EmbedScope, Effect, KbStatus, ModalId, Msg, PollKind, ToastKind,
    OUT_OF_BAND_POLL_DELAY,
};

pub const DELETE_SUCCEEDED: &str = "File deleted successfully!";
pub const DELETE_FAILED: &str = "Delete failed. Please try again.";
pub const NO_FILE_SELECTED: &str = "Please select a file first.";
pub const PREVIEW_REQUIRED: &str = "Please preview chunking before processing.";
pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Upload failed. Please try again.";
pub const EMBED_STARTED: &str = "Embedding started. Progress will update below.";
pub const EMBED_FAILED: &str = "Embedding request failed. Please try again.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.mounted {
                return (state, Vec::new());
            }
            state.mounted = true;
            state.mark_dirty();
            vec![
                Effect::StartPolling {
                    poll: PollKind::KbStatus,
                    every: state.poll_settings.kb_status_every,
                },
                Effect::StartPolling {
                    poll: PollKind::EmbedProgress,
                    every: state.poll_settings.embed_progress_every,
                },
                Effect::RefreshFiles,
            ]
        }
        Msg::Unmounted => {
            if !state.mounted {
                return (state, Vec::new());
            }
            state.mounted = false;
            state.mark_dirty();
            vec![Effect::StopPolling]
        }
        Msg::FilesLoaded(Ok(files)) => {
            if state.files != files {
                state.files = files;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FilesLoaded(Err(err)) => {
            kbdesk_warn!("Refreshing the knowledge base table failed: {}", err);
            Vec::new()
        }
        Msg::KbStatusPolled(Ok(raw)) => {
            match KbStatus::parse(&raw) {
                Some(status) if state.kb_status != Some(status) => {
                    kbdesk_debug!("Knowledge base status is now {:?}", status);
                    state.kb_status = Some(status);
                    state.mark_dirty();
                }
                Some(_) => {}
                None => kbdesk_warn!("Unknown knowledge base status: {}", raw),
            }
            Vec::new()
        }
        Msg::KbStatusPolled(Err(err)) => {
            kbdesk_warn!("Polling knowledge base status failed: {}", err);
            Vec::new()
        }
        Msg::EmbedProgressPolled(Ok(report)) => {
            if state.embed_indicator.apply(&report) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EmbedProgressPolled(Err(err)) => {
            kbdesk_warn!("Polling embedding progress failed: {}", err);
            Vec::new()
        }
        Msg::DeleteRequested { file_id } => {
            let Some(file) = state.files.iter().find(|file| file.id == file_id) else {
                kbdesk_warn!("Delete requested for unknown file id {}", file_id);
                return (state, Vec::new());
            };
            state.delete_target = Some(DeleteTarget {
                file_id,
                filename: file.filename.clone(),
            });
            state.modals.open(ModalId::DeleteConfirm);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteConfirmed => confirm_delete(&mut state),
        Msg::DeleteFinished { file_id, result } => finish_delete(&mut state, file_id, result),
        Msg::ModalCloseRequested { modal, trigger } => {
            if state.modals.close(modal) {
                kbdesk_debug!("Closed {:?} via {:?}", modal, trigger);
                if modal == ModalId::DeleteConfirm {
                    state.delete_target = None;
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EmbedClicked { scope } => start_embedding(&mut state, scope),
        Msg::EmbedFinished { result } => {
            state.embed_request_in_flight = false;
            state.mark_dirty();
            match result {
                Ok(()) => notify(&mut state, EMBED_STARTED, ToastKind::Success),
                Err(err) => {
                    kbdesk_warn!("Embedding request failed: {}", err);
                    notify(&mut state, EMBED_FAILED, ToastKind::Error)
                }
            }
        }
        Msg::FileSelected(file) => {
            if state.upload.select_file(file) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ChunkParamsChanged(params) => {
            if state.upload.set_params(params) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PreviewClicked => match state.upload.begin_preview() {
            Ok((revision, file, params)) => {
                state.mark_dirty();
                vec![Effect::PreviewChunking {
                    revision,
                    file,
                    params,
                }]
            }
            Err(PreviewRejected::NoFile) => notify(&mut state, NO_FILE_SELECTED, ToastKind::Error),
            Err(PreviewRejected::Busy) => Vec::new(),
        },
        Msg::PreviewFinished { revision, result } => {
            if let Err(err) = &result {
                kbdesk_warn!("Preview request failed: {}", err);
            }
            match state.upload.finish_preview(revision, result) {
                PreviewOutcome::Stale => {
                    kbdesk_debug!("Discarded preview for outdated selection {}", revision)
                }
                PreviewOutcome::Ready(count) => kbdesk_info!("Preview produced {} chunks", count),
                PreviewOutcome::Empty => kbdesk_info!("Preview produced no chunks"),
                PreviewOutcome::Failed(message) => kbdesk_info!("Preview failed: {}", message),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ProcessClicked => match state.upload.begin_process() {
            Ok((file, params)) => {
                state.mark_dirty();
                vec![Effect::UploadDocument { file, params }]
            }
            Err(ProcessRejected::NotPreviewed) => {
                notify(&mut state, PREVIEW_REQUIRED, ToastKind::Error)
            }
            Err(ProcessRejected::Busy) => Vec::new(),
        },
        Msg::ProcessFinished { result } => {
            if !state.upload.finish_process(result.is_ok()) {
                kbdesk_warn!("Upload result arrived with no upload in flight");
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(()) => {
                    let mut effects = notify(&mut state, UPLOAD_SUCCEEDED, ToastKind::Success);
                    effects.push(Effect::RefreshFiles);
                    effects
                }
                Err(err) => {
                    kbdesk_warn!("Upload failed: {}", err);
                    notify(&mut state, UPLOAD_FAILED, ToastKind::Error)
                }
            }
        }
        Msg::ChatOpened => match state.chat.begin_greeting() {
            Ok((exchange_id, request)) => {
                state.mark_dirty();
                vec![Effect::SendChat {
                    exchange_id,
                    request,
                }]
            }
            Err(rejected) => {
                kbdesk_debug!("Greeting not sent: {:?}", rejected);
                Vec::new()
            }
        },
        Msg::ChatSubmitted(text) => match state.chat.begin_message(&text) {
            Ok((exchange_id, request)) => {
                state.mark_dirty();
                vec![Effect::SendChat {
                    exchange_id,
                    request,
                }]
            }
            Err(SendRejected::Busy) => {
                kbdesk_warn!("Chat message rejected while a reply is pending");
                Vec::new()
            }
            Err(_) => Vec::new(),
        },
        Msg::ChatReplied {
            exchange_id,
            result,
        } => {
            if let Err(err) = &result {
                kbdesk_warn!("Chat exchange {} failed: {}", exchange_id, err);
            }
            if state.chat.finish(exchange_id, result).is_some() {
                state.mark_dirty();
            } else {
                kbdesk_warn!("Ignoring reply for exchange {} that is not pending", exchange_id);
            }
            Vec::new()
        }
        Msg::ToastTimerElapsed { toast_id, timer } => {
            match state.notifications.on_timer(toast_id, timer) {
                Some(effects) => {
                    state.mark_dirty();
                    effects
                }
                None => Vec::new(),
            }
        }
        Msg::ToastClosed(toast_id) => {
            if state.notifications.close(toast_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn notify(state: &mut AppState, message: &str, kind: ToastKind) -> Vec<Effect> {
    state.mark_dirty();
    state.notifications.push(message, kind)
}

fn confirm_delete(state: &mut AppState) -> Vec<Effect> {
    if state.delete_in_flight.is_some() || !state.modals.is_open(ModalId::DeleteConfirm) {
        return Vec::new();
    }
    let Some(target) = &state.delete_target else {
        return Vec::new();
    };
    let file_id = target.file_id;
    state.delete_in_flight = Some(file_id);
    state.mark_dirty();
    vec![Effect::DeleteFile { file_id }]
}

fn finish_delete(state: &mut AppState, file_id: u64, result: Result<(), String>) -> Vec<Effect> {
    if state.delete_in_flight != Some(file_id) {
        kbdesk_warn!("Delete result for file {} arrived with no delete in flight", file_id);
        return Vec::new();
    }
    state.delete_in_flight = None;
    state.mark_dirty();

    match result {
        Ok(()) => {
            kbdesk_info!("Deleted file {}", file_id);
            if state.modals.close(ModalId::DeleteConfirm) {
                state.delete_target = None;
            }
            let mut effects = notify(state, DELETE_SUCCEEDED, ToastKind::Success);
            effects.push(Effect::RefreshFiles);
            effects.push(Effect::PollOnce {
                poll: PollKind::KbStatus,
                after: OUT_OF_BAND_POLL_DELAY,
            });
            effects
        }
        Err(err) => {
            kbdesk_warn!("Deleting file {} failed: {}", file_id, err);
            notify(state, DELETE_FAILED, ToastKind::Error)
        }
    }
}

fn start_embedding(state: &mut AppState, scope: EmbedScope) -> Vec<Effect> {
    let allowed = match scope {
        EmbedScope::Changed => state.embed_enabled(),
        EmbedScope::All => {
            !state.embed_indicator.visible
                && !state.embed_request_in_flight
                && state
                    .kb_status
                    .is_some_and(|status| status != KbStatus::NoFiles)
        }
    };
    if !allowed {
        kbdesk_debug!("Embed ({:?}) ignored: trigger is disabled", scope);
        return Vec::new();
    }
    state.embed_request_in_flight = true;
    state.mark_dirty();
    vec![
        Effect::StartEmbedding { scope },
        Effect::PollOnce {
            poll: PollKind::EmbedProgress,
            after: OUT_OF_BAND_POLL_DELAY,
        },
    ]
}
