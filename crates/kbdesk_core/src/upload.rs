//! Two-phase upload: a document must be previewed (chunked) before it can be processed.

use std::path::PathBuf;

pub const DEFAULT_CHUNK_SIZE: u32 = 2000;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 400;

pub const PREVIEW_EMPTY_TEXT: &str = "No preview chunks could be generated. The file may not contain extractable text or may be scanned images.";
pub const PREVIEW_FAILED_TEXT: &str = "Preview failed.";
pub const PREVIEW_UNREACHABLE_TEXT: &str = "Preview failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPreview {
    pub chunk_number: u32,
    pub content: String,
}

/// Decoded preview reply. `success == false` carries the server's reason in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewReply {
    pub success: bool,
    pub chunks: Vec<ChunkPreview>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewPanel {
    #[default]
    Hidden,
    Chunks(Vec<ChunkPreview>),
    /// Warning: the preview succeeded but produced no chunks.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PreviewGate {
    #[default]
    NotPreviewed,
    /// Holds the selection revision the successful preview was made for.
    Previewed { revision: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreviewRejected {
    NoFile,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessRejected {
    NotPreviewed,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PreviewOutcome {
    /// Reply was for an older selection; only the busy state was cleared.
    Stale,
    Ready(usize),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadState {
    selected: Option<PathBuf>,
    params: ChunkParams,
    /// Bumped whenever the file or the chunk parameters change.
    revision: u64,
    gate: PreviewGate,
    preview_in_flight: Option<u64>,
    process_in_flight: bool,
    panel: PreviewPanel,
}

impl UploadState {
    pub(crate) fn select_file(&mut self, file: Option<PathBuf>) -> bool {
        if self.selected == file {
            return false;
        }
        self.selected = file;
        self.invalidate();
        true
    }

    pub(crate) fn set_params(&mut self, params: ChunkParams) -> bool {
        if self.params == params {
            return false;
        }
        self.params = params;
        self.invalidate();
        true
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        self.gate = PreviewGate::NotPreviewed;
        self.panel = PreviewPanel::Hidden;
    }

    pub(crate) fn begin_preview(
        &mut self,
    ) -> Result<(u64, PathBuf, ChunkParams), PreviewRejected> {
        if self.preview_in_flight.is_some() || self.process_in_flight {
            return Err(PreviewRejected::Busy);
        }
        let file = self.selected.clone().ok_or(PreviewRejected::NoFile)?;
        self.preview_in_flight = Some(self.revision);
        Ok((self.revision, file, self.params))
    }

    pub(crate) fn finish_preview(
        &mut self,
        revision: u64,
        result: Result<PreviewReply, String>,
    ) -> PreviewOutcome {
        if self.preview_in_flight == Some(revision) {
            self.preview_in_flight = None;
        }
        if revision != self.revision {
            return PreviewOutcome::Stale;
        }

        let outcome = match result {
            Ok(reply) if reply.success && !reply.chunks.is_empty() => {
                let count = reply.chunks.len();
                self.panel = PreviewPanel::Chunks(reply.chunks);
                PreviewOutcome::Ready(count)
            }
            Ok(reply) if reply.success => {
                self.panel = PreviewPanel::Empty;
                PreviewOutcome::Empty
            }
            Ok(reply) => {
                let message = reply
                    .error
                    .filter(|error| !error.trim().is_empty())
                    .unwrap_or_else(|| PREVIEW_FAILED_TEXT.to_string());
                self.panel = PreviewPanel::Failed(message.clone());
                PreviewOutcome::Failed(message)
            }
            Err(_) => {
                self.panel = PreviewPanel::Failed(PREVIEW_UNREACHABLE_TEXT.to_string());
                PreviewOutcome::Failed(PREVIEW_UNREACHABLE_TEXT.to_string())
            }
        };

        self.gate = match outcome {
            PreviewOutcome::Ready(_) => PreviewGate::Previewed { revision },
            _ => PreviewGate::NotPreviewed,
        };
        outcome
    }

    pub(crate) fn is_previewed(&self) -> bool {
        self.gate
            == PreviewGate::Previewed {
                revision: self.revision,
            }
    }

    pub(crate) fn begin_process(&mut self) -> Result<(PathBuf, ChunkParams), ProcessRejected> {
        if !self.is_previewed() {
            return Err(ProcessRejected::NotPreviewed);
        }
        if self.process_in_flight {
            return Err(ProcessRejected::Busy);
        }
        let file = self
            .selected
            .clone()
            .ok_or(ProcessRejected::NotPreviewed)?;
        self.process_in_flight = true;
        Ok((file, self.params))
    }

    /// Returns false when no upload was in flight.
    pub(crate) fn finish_process(&mut self, uploaded: bool) -> bool {
        if !self.process_in_flight {
            return false;
        }
        self.process_in_flight = false;
        if uploaded {
            self.selected = None;
            self.invalidate();
        }
        true
    }

    pub(crate) fn selected(&self) -> Option<&PathBuf> {
        self.selected.as_ref()
    }

    pub(crate) fn params(&self) -> ChunkParams {
        self.params
    }

    pub(crate) fn panel(&self) -> &PreviewPanel {
        &self.panel
    }

    pub(crate) fn preview_busy(&self) -> bool {
        self.preview_in_flight.is_some()
    }

    pub(crate) fn process_busy(&self) -> bool {
        self.process_in_flight
    }

    pub(crate) fn preview_enabled(&self) -> bool {
        self.selected.is_some() && !self.preview_busy() && !self.process_in_flight
    }

    pub(crate) fn process_enabled(&self) -> bool {
        self.is_previewed() && !self.process_in_flight
    }
}
