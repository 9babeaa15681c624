use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use kbdesk_logging::{kbdesk_debug, kbdesk_info, kbdesk_warn};
use tokio::runtime::Runtime;

use crate::client::{BackendApi, ClientSettings, ReqwestApi};
use crate::poll::{poll_target, PollLoops};
use crate::{ChatMessage, DocumentRequest, EngineError, EngineEvent, FileId, PollTarget, TimerTag};

/// Receives everything the engine produces. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    StartPolling { target: PollTarget, every: Duration },
    StopPolling,
    PollOnce { target: PollTarget, after: Duration },
    RefreshFiles,
    DeleteFile { file_id: FileId },
    StartEmbedding { all: bool },
    Preview { revision: u64, request: DocumentRequest },
    Upload { request: DocumentRequest },
    SendChat { exchange_id: u64, message: ChatMessage },
    Timer { tag: TimerTag, after: Duration },
}

/// Owns a background tokio runtime that runs HTTP calls, poll loops and timers.
///
/// Dropping the handle stops the poll loops and shuts the runtime down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api = ReqwestApi::new(settings)?;
        Self::with_api(Arc::new(api), sink)
    }

    pub fn with_api(api: Arc<dyn BackendApi>, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("kbdesk-engine-worker")
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("kbdesk-engine".to_string())
            .spawn(move || run_engine(runtime, api, sink, cmd_rx))?;

        Ok(Self { cmd_tx })
    }

    pub fn start_polling(&self, target: PollTarget, every: Duration) {
        self.send(EngineCommand::StartPolling { target, every });
    }

    pub fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling);
    }

    pub fn poll_once(&self, target: PollTarget, after: Duration) {
        self.send(EngineCommand::PollOnce { target, after });
    }

    pub fn refresh_files(&self) {
        self.send(EngineCommand::RefreshFiles);
    }

    pub fn delete_file(&self, file_id: FileId) {
        self.send(EngineCommand::DeleteFile { file_id });
    }

    pub fn start_embedding(&self, all: bool) {
        self.send(EngineCommand::StartEmbedding { all });
    }

    pub fn preview(&self, revision: u64, request: DocumentRequest) {
        self.send(EngineCommand::Preview { revision, request });
    }

    pub fn upload(&self, request: DocumentRequest) {
        self.send(EngineCommand::Upload { request });
    }

    pub fn send_chat(&self, exchange_id: u64, message: ChatMessage) {
        self.send(EngineCommand::SendChat {
            exchange_id,
            message,
        });
    }

    pub fn schedule_timer(&self, tag: TimerTag, after: Duration) {
        self.send(EngineCommand::Timer { tag, after });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            kbdesk_warn!("Engine thread is gone; command dropped");
        }
    }
}

fn run_engine(
    runtime: Runtime,
    api: Arc<dyn BackendApi>,
    sink: Arc<dyn EventSink>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
) {
    let mut loops = PollLoops::default();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::StartPolling { target, every } => {
                loops.start(runtime.handle(), api.clone(), sink.clone(), target, every);
            }
            EngineCommand::StopPolling => {
                kbdesk_debug!("Stopping poll loops");
                loops.stop_all();
            }
            command => {
                let api = api.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, sink.as_ref()).await;
                });
            }
        }
    }

    loops.stop_all();
    runtime.shutdown_timeout(Duration::from_secs(1));
    kbdesk_info!("Engine stopped");
}

async fn handle_command(api: &dyn BackendApi, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::PollOnce { target, after } => {
            tokio::time::sleep(after).await;
            sink.emit(poll_target(api, target).await);
        }
        EngineCommand::RefreshFiles => {
            sink.emit(EngineEvent::FilesListed(api.list_files().await));
        }
        EngineCommand::DeleteFile { file_id } => {
            let result = api.delete_file(file_id).await;
            sink.emit(EngineEvent::FileDeleted { file_id, result });
        }
        EngineCommand::StartEmbedding { all } => {
            sink.emit(EngineEvent::EmbeddingRequested(
                api.start_embedding(all).await,
            ));
        }
        EngineCommand::Preview { revision, request } => {
            let result = api.preview_chunking(&request).await;
            sink.emit(EngineEvent::PreviewReady { revision, result });
        }
        EngineCommand::Upload { request } => {
            sink.emit(EngineEvent::Uploaded(api.upload_document(&request).await));
        }
        EngineCommand::SendChat {
            exchange_id,
            message,
        } => {
            let result = api.send_chat(&message).await;
            sink.emit(EngineEvent::ChatReplied {
                exchange_id,
                result,
            });
        }
        EngineCommand::Timer { tag, after } => {
            tokio::time::sleep(after).await;
            sink.emit(EngineEvent::TimerFired { tag });
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling => {}
    }
}
