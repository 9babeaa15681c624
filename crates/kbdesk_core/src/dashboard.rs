//! Knowledge-base table, status and embedding progress as reported by the server.

use std::time::Duration;

use kbdesk_logging::kbdesk_warn;

pub type FileId = u64;

/// Default interval of the knowledge-base status loop.
pub const KB_STATUS_INTERVAL: Duration = Duration::from_millis(3000);
/// Default interval of the embedding progress loop.
pub const EMBED_PROGRESS_INTERVAL: Duration = Duration::from_millis(1500);
/// Delay of the single extra poll issued after a local mutation.
pub const OUT_OF_BAND_POLL_DELAY: Duration = Duration::from_millis(500);

pub const EMBED_PROGRESS_FALLBACK_TEXT: &str = "Embedding in progress...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub kb_status_every: Duration,
    pub embed_progress_every: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            kb_status_every: KB_STATUS_INTERVAL,
            embed_progress_every: EMBED_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    pub filename: String,
    pub filetype: String,
    pub uploaded_at: String,
    /// Modified since the last embedding run.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbStatus {
    NoFiles,
    RequiresEmbedding,
    Active,
}

impl KbStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "no_files" => Some(KbStatus::NoFiles),
            "requires_embedding" => Some(KbStatus::RequiresEmbedding),
            "active" => Some(KbStatus::Active),
            _ => None,
        }
    }

    pub fn allows_embedding(self) -> bool {
        matches!(self, KbStatus::RequiresEmbedding)
    }

    pub fn banner(self) -> StatusBanner {
        match self {
            KbStatus::NoFiles => StatusBanner {
                level: BannerLevel::Info,
                text: "No files uploaded yet. Upload files first.".to_string(),
            },
            KbStatus::RequiresEmbedding => StatusBanner {
                level: BannerLevel::Warning,
                text: "New or unembedded files detected. Click \"Embed Data\" to update."
                    .to_string(),
            },
            KbStatus::Active => StatusBanner {
                level: BannerLevel::Success,
                text: "All files are embedded and up to date.".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub level: BannerLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedStatus {
    Idle,
    Starting,
    Running,
    /// Final status of a finished run; stays until the next run starts.
    Done,
}

impl EmbedStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "idle" => Some(EmbedStatus::Idle),
            "starting" => Some(EmbedStatus::Starting),
            "running" => Some(EmbedStatus::Running),
            "done" => Some(EmbedStatus::Done),
            _ => None,
        }
    }
}

/// One embedding progress reply, status kept raw so unknown values can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedProgressReport {
    pub status: String,
    pub progress: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbedIndicator {
    pub visible: bool,
    /// Percent, always within 0..=100.
    pub width: u8,
    pub text: String,
}

impl EmbedIndicator {
    /// Reconciles the indicator with a progress report; returns whether it changed.
    pub(crate) fn apply(&mut self, report: &EmbedProgressReport) -> bool {
        let status = EmbedStatus::parse(&report.status);
        if status.is_none() {
            kbdesk_warn!("Unknown embed progress status: {}", report.status);
        }
        let next = match status {
            Some(EmbedStatus::Starting | EmbedStatus::Running) => EmbedIndicator {
                visible: true,
                width: clamp_percent(report.progress.unwrap_or(0)),
                text: report
                    .message
                    .clone()
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| EMBED_PROGRESS_FALLBACK_TEXT.to_string()),
            },
            Some(EmbedStatus::Idle | EmbedStatus::Done) | None => EmbedIndicator::default(),
        };
        let changed = *self != next;
        *self = next;
        changed
    }
}

pub fn clamp_percent(progress: i64) -> u8 {
    progress.clamp(0, 100) as u8
}
