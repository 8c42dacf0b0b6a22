//! Data directory layout and runtime settings.
//!
//! # Responsibility
//! - Resolve where the document, attachments and logs live.
//!
//! # Invariants
//! - All paths derive from one data directory.
//! - Resolution order: explicit directory, `PRM_DATA_DIR`, `$HOME/.prm`.

use crate::attachment::AttachmentStore;
use crate::logging::default_log_level;
use crate::store::DocumentStore;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PRM_DATA_DIR";

const DEFAULT_DIR_NAME: &str = ".prm";
const DOCUMENT_FILE_NAME: &str = "user.json";
const ATTACHMENTS_DIR_NAME: &str = "files";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl StoreConfig {
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level().to_string(),
        }
    }

    /// Resolves the data directory from the environment.
    ///
    /// Returns `None` when neither `PRM_DATA_DIR` nor `HOME` is set.
    pub fn from_env() -> Option<Self> {
        let explicit = env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty());
        let data_dir = match explicit {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(env::var_os("HOME")?).join(DEFAULT_DIR_NAME),
        };
        Some(Self::from_data_dir(data_dir))
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE_NAME)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir.join(ATTACHMENTS_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn document_store(&self) -> DocumentStore {
        DocumentStore::new(self.document_path())
    }

    pub fn attachment_store(&self) -> AttachmentStore {
        AttachmentStore::new(self.attachments_dir())
    }
}
