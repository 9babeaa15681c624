//! Client-side state directory: the chat session id and exported transcripts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use kbdesk_logging::{kbdesk_info, kbdesk_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const SESSION_FILENAME: &str = "session.ron";
const SESSION_PREFIX: &str = "web-user-";
const SESSION_SUFFIX_LEN: usize = 9;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("could not encode or decode {file}: {message}")]
    Format { file: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Generates an opaque per-session identifier: `web-user-<unix millis>-<9 chars>`.
pub fn generate_session_id() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SESSION_SUFFIX_LEN)
        .collect();
    format!("{SESSION_PREFIX}{}-{suffix}", Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub session_id: String,
    pub created_utc: String,
}

impl PersistedSession {
    fn fresh() -> Self {
        Self {
            session_id: generate_session_id(),
            created_utc: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
}

impl StateDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed and checks that it accepts files.
    pub fn ensure(&self) -> Result<(), PersistError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(PersistError::StateDir(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        NamedTempFile::new_in(&self.dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        Ok(())
    }

    /// Writes `content` to `{dir}/{filename}` via a temp file and rename, so a
    /// reader never sees a half-written file.
    pub fn write_atomic(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.ensure()?;
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    pub fn load_session(&self) -> Result<Option<PersistedSession>, PersistError> {
        let path = self.dir.join(SESSION_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        ron::from_str(&content)
            .map(Some)
            .map_err(|err| PersistError::Format {
                file: SESSION_FILENAME.to_string(),
                message: err.to_string(),
            })
    }

    pub fn save_session(&self, session: &PersistedSession) -> Result<(), PersistError> {
        let content = ron::ser::to_string_pretty(session, ron::ser::PrettyConfig::new())
            .map_err(|err| PersistError::Format {
                file: SESSION_FILENAME.to_string(),
                message: err.to_string(),
            })?;
        self.write_atomic(SESSION_FILENAME, &content)?;
        Ok(())
    }

    /// Reuses the stored session or starts a new one. An unreadable session
    /// file is replaced.
    pub fn load_or_create_session(&self) -> Result<PersistedSession, PersistError> {
        match self.load_session() {
            Ok(Some(session)) if session.session_id.starts_with(SESSION_PREFIX) => {
                kbdesk_info!("Resuming chat session {}", session.session_id);
                return Ok(session);
            }
            Ok(Some(session)) => {
                kbdesk_warn!("Ignoring malformed session id {:?}", session.session_id)
            }
            Ok(None) => {}
            Err(err) => kbdesk_warn!("Discarding unreadable session state: {}", err),
        }
        let session = PersistedSession::fresh();
        self.save_session(&session)?;
        kbdesk_info!("Started chat session {}", session.session_id);
        Ok(session)
    }

    /// Forgets the stored session so the next start generates a new id.
    pub fn clear_session(&self) -> Result<(), PersistError> {
        match fs::remove_file(self.dir.join(SESSION_FILENAME)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_session_id, SESSION_SUFFIX_LEN};

    #[test]
    fn session_id_has_expected_shape() {
        let id = generate_session_id();
        let rest = id.strip_prefix("web-user-").unwrap();
        let (millis, suffix) = rest.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), SESSION_SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
