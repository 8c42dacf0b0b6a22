//! Document store: loads and saves one user graph as a JSON document.
//!
//! # Responsibility
//! - Parse document bytes into the record tree and drive the resolver.
//! - Drive the flattener and write the record tree back out.
//!
//! # Invariants
//! - A load either returns one complete, linked graph or an error; no
//!   partially linked graph escapes.
//! - A save writes a sibling temporary file and renames it into place, so
//!   the previous document survives any failed save.
//!
//! # See also
//! - `record` for the wire format.

pub mod flatten;
pub mod record;
pub mod resolver;

use crate::model::user::User;
use flatten::{flatten_user, FlattenError};
use log::{error, info, warn};
use record::UserRecord;
use resolver::{resolve_user, ResolveError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Document bytes do not parse into the record tree.
    Malformed(serde_json::Error),
    Resolve(ResolveError),
    Flatten(FlattenError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Malformed(err) => write!(f, "malformed document: {err}"),
            Self::Resolve(err) => write!(f, "unresolvable document: {err}"),
            Self::Flatten(err) => write!(f, "cannot flatten graph: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed(err) => Some(err),
            Self::Resolve(err) => Some(err),
            Self::Flatten(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

impl From<ResolveError> for StoreError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

impl From<FlattenError> for StoreError {
    fn from(value: FlattenError) -> Self {
        Self::Flatten(value)
    }
}

/// Parses and resolves a document held in memory.
pub fn user_from_json(document: &str) -> StoreResult<User> {
    let record: UserRecord = serde_json::from_str(document)?;
    Ok(resolve_user(record)?)
}

/// Flattens and serializes a user graph, pretty printed.
pub fn user_to_json(user: &User) -> StoreResult<String> {
    let record = flatten_user(user)?;
    Ok(serde_json::to_string_pretty(&record)?)
}

/// File-backed store for one user document.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and resolves the document.
    ///
    /// # Side effects
    /// - Emits `document_load` events with duration and status.
    pub fn load(&self) -> StoreResult<User> {
        let started_at = Instant::now();
        info!("event=document_load module=store status=start");

        let result = fs::read_to_string(&self.path)
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
            .and_then(|document| user_from_json(&document));

        match &result {
            Ok(user) => info!(
                "event=document_load module=store status=ok duration_ms={} contacts={} events={} tags={}",
                started_at.elapsed().as_millis(),
                user.contacts().len(),
                user.events().len(),
                user.tag_handler().len()
            ),
            Err(err) => error!(
                "event=document_load module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Loads the document, or starts a fresh graph when none exists yet.
    pub fn load_or_create(&self, user_name: &str) -> StoreResult<User> {
        if self.exists() {
            self.load()
        } else {
            info!("event=document_create module=store status=ok");
            Ok(User::new(user_name))
        }
    }

    /// Flattens and writes the graph, replacing the document atomically.
    ///
    /// # Side effects
    /// - Creates the parent directory when missing.
    /// - Emits `document_save` events with duration and status.
    pub fn save(&self, user: &User) -> StoreResult<()> {
        let started_at = Instant::now();
        info!("event=document_save module=store status=start");

        let result = user_to_json(user).and_then(|document| self.write_atomically(&document));
        match &result {
            Ok(()) => info!(
                "event=document_save module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=document_save module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn write_atomically(&self, document: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let staging = self.staging_path();
        if let Err(source) = fs::write(&staging, document) {
            discard_staging(&staging);
            return Err(StoreError::Io {
                path: staging,
                source,
            });
        }
        if let Err(source) = fs::rename(&staging, &self.path) {
            discard_staging(&staging);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Best-effort removal of a leftover staging file.
fn discard_staging(staging: &Path) {
    if let Err(err) = fs::remove_file(staging) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(
                "event=document_save_cleanup module=store status=error path={} error={}",
                staging.display(),
                err
            );
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}
