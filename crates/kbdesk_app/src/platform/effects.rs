use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use kbdesk_core::{
    ChatRequest, ChunkParams, ChunkPreview, Effect, EmbedProgressReport, EmbedScope, FileRecord,
    Msg, PollKind, PreviewReply, ToastId, ToastTimer,
};
use kbdesk_engine::{
    ChannelEventSink, ChatMessage, ClientSettings, DocumentRequest, EmbedProgressReply,
    EngineError, EngineEvent, EngineHandle, FileEntry, PollTarget, PreviewResponse, TimerTag,
};
use kbdesk_logging::{kbdesk_debug, kbdesk_warn};

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new<M>(settings: ClientSettings, msg_tx: mpsc::Sender<M>) -> Result<Self, EngineError>
    where
        M: From<Msg> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::new(settings, Arc::new(ChannelEventSink::new(event_tx)))?;
        spawn_event_forwarder(event_rx, msg_tx);
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            kbdesk_debug!("Running effect {:?}", effect);
            match effect {
                Effect::StartPolling { poll, every } => {
                    self.engine.start_polling(poll_target(poll), every)
                }
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::PollOnce { poll, after } => self.engine.poll_once(poll_target(poll), after),
                Effect::RefreshFiles => self.engine.refresh_files(),
                Effect::DeleteFile { file_id } => self.engine.delete_file(file_id),
                Effect::StartEmbedding { scope } => {
                    self.engine.start_embedding(matches!(scope, EmbedScope::All))
                }
                Effect::PreviewChunking {
                    revision,
                    file,
                    params,
                } => self.engine.preview(revision, document_request(file, params)),
                Effect::UploadDocument { file, params } => {
                    self.engine.upload(document_request(file, params))
                }
                Effect::SendChat {
                    exchange_id,
                    request,
                } => self.engine.send_chat(exchange_id, chat_message(request)),
                Effect::ScheduleToastTimer {
                    toast_id,
                    timer,
                    after,
                } => self.engine.schedule_timer(timer_tag(toast_id, timer), after),
            }
        }
    }
}

fn spawn_event_forwarder<M>(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<M>)
where
    M: From<Msg> + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(M::from(map_event(event))).is_err() {
                break;
            }
        }
    });
}

fn poll_target(poll: PollKind) -> PollTarget {
    match poll {
        PollKind::KbStatus => PollTarget::KbStatus,
        PollKind::EmbedProgress => PollTarget::EmbedProgress,
    }
}

fn document_request(file: PathBuf, params: ChunkParams) -> DocumentRequest {
    DocumentRequest {
        file,
        chunk_size: params.chunk_size,
        chunk_overlap: params.chunk_overlap,
    }
}

fn chat_message(request: ChatRequest) -> ChatMessage {
    ChatMessage {
        message: request.message,
        user_id: request.user_id,
        conversation_has_started: request.conversation_has_started,
        is_initial_greeting_sent: request.is_initial_greeting_sent,
    }
}

const TIMER_KINDS: u64 = 3;

/// Packs a toast id and its timer into the engine's opaque timer tag.
fn timer_tag(toast_id: ToastId, timer: ToastTimer) -> TimerTag {
    let kind = match timer {
        ToastTimer::Reveal => 0,
        ToastTimer::Expire => 1,
        ToastTimer::Remove => 2,
    };
    toast_id * TIMER_KINDS + kind
}

fn decode_timer_tag(tag: TimerTag) -> (ToastId, ToastTimer) {
    let timer = match tag % TIMER_KINDS {
        0 => ToastTimer::Reveal,
        1 => ToastTimer::Expire,
        _ => ToastTimer::Remove,
    };
    (tag / TIMER_KINDS, timer)
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FilesListed(result) => Msg::FilesLoaded(
            result
                .map(|entries| entries.into_iter().map(file_record).collect())
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::KbStatus(result) => Msg::KbStatusPolled(
            result
                .map(|reply| reply.status)
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::EmbedProgress(result) => Msg::EmbedProgressPolled(
            result.map(progress_report).map_err(|err| err.to_string()),
        ),
        EngineEvent::FileDeleted { file_id, result } => Msg::DeleteFinished {
            file_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::EmbeddingRequested(result) => Msg::EmbedFinished {
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::PreviewReady { revision, result } => Msg::PreviewFinished {
            revision,
            result: result.map(preview_reply).map_err(|err| err.to_string()),
        },
        EngineEvent::Uploaded(result) => Msg::ProcessFinished {
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::ChatReplied {
            exchange_id,
            result,
        } => Msg::ChatReplied {
            exchange_id,
            result: result
                .map(|reply| reply.response)
                .map_err(|err| err.to_string()),
        },
        EngineEvent::TimerFired { tag } => {
            let (toast_id, timer) = decode_timer_tag(tag);
            Msg::ToastTimerElapsed { toast_id, timer }
        }
    }
}

fn file_record(entry: FileEntry) -> FileRecord {
    FileRecord {
        id: entry.id,
        filename: entry.filename,
        filetype: entry.filetype,
        uploaded_at: entry.uploaded_at,
        changed: entry.changed,
    }
}

fn progress_report(reply: EmbedProgressReply) -> EmbedProgressReport {
    let progress = reply.progress.and_then(|value| {
        if value.is_finite() {
            Some(value.round() as i64)
        } else {
            kbdesk_warn!("Ignoring non-numeric embedding progress {}", value);
            None
        }
    });
    EmbedProgressReport {
        status: reply.status,
        progress,
        message: reply.message,
    }
}

fn preview_reply(response: PreviewResponse) -> PreviewReply {
    PreviewReply {
        success: response.success,
        chunks: response
            .preview_chunks
            .unwrap_or_default()
            .into_iter()
            .map(|chunk| ChunkPreview {
                chunk_number: chunk.chunk_number,
                content: chunk.content,
            })
            .collect(),
        error: response.error,
    }
}
