//! Contact import from external flat-text formats.
//!
//! # Responsibility
//! - Turn external contact files into contact snapshots with fresh stable
//!   ids and hand them to the user graph.
//!
//! # Invariants
//! - A file that fails validation leaves the graph unchanged.

pub mod vcf;

use crate::model::user::UserError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug)]
pub enum ImportError {
    Io { path: PathBuf, source: io::Error },
    /// The file does not carry the expected extension.
    UnsupportedFile(PathBuf),
    /// The parsed contact is rejected by the domain.
    Invalid { path: PathBuf, source: UserError },
    /// A directory import found nothing importable.
    NothingImported(PathBuf),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::UnsupportedFile(path) => {
                write!(f, "`{}` is not a vCard file", path.display())
            }
            Self::Invalid { path, source } => write!(f, "{}: {source}", path.display()),
            Self::NothingImported(path) => {
                write!(f, "no contacts could be imported from `{}`", path.display())
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ImportError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, source: impl Into<UserError>) -> Self {
        Self::Invalid {
            path: path.into(),
            source: source.into(),
        }
    }
}
