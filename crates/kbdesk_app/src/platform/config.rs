use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use kbdesk_core::PollSettings;
use kbdesk_engine::ClientSettings;
use serde::Deserialize;

const CONFIG_FILENAME: &str = "kbdesk.ron";
const CONFIG_PATH_ENV: &str = "KBDESK_CONFIG";
const BASE_URL_ENV: &str = "KBDESK_BASE_URL";
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub kb_status_interval_ms: u64,
    pub embed_progress_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub state_dir: PathBuf,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let polls = PollSettings::default();
        Self {
            base_url: client.base_url,
            kb_status_interval_ms: polls.kb_status_every.as_millis() as u64,
            embed_progress_interval_ms: polls.embed_progress_every.as_millis() as u64,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            state_dir: PathBuf::from(".kbdesk"),
            log_to_file: true,
        }
    }
}

impl AppConfig {
    /// Reads `$KBDESK_CONFIG`, or `kbdesk.ron` in the working directory.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            kb_status_every: poll_interval(self.kb_status_interval_ms),
            embed_progress_every: poll_interval(self.embed_progress_interval_ms),
        }
    }
}

fn poll_interval(millis: u64) -> Duration {
    Duration::from_millis(millis.max(MIN_POLL_INTERVAL_MS))
}
