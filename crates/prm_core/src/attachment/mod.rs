//! File attachments keyed by an entity's stable id.
//!
//! # Responsibility
//! - Copy files into and out of per-entity directories.
//! - Keep one optional main image per entity.
//!
//! # Invariants
//! - Layout: `<root>/<id>/attachments[/<category>]/<file>` and
//!   `<root>/<id>/mainImage/<file>`.
//! - Categories are lower-cased, non-empty and letters only.
//! - A main image must have one of the extensions in `IMAGE_EXTENSIONS`.
//! - Recursive deletes are best effort: one file failing to delete is
//!   logged and skipped.

use crate::model::validation::{normalize_category, ValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const ATTACHMENTS_DIR: &str = "attachments";
const MAIN_IMAGE_DIR: &str = "mainImage";

/// File extensions accepted for a main image, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png"];

pub type AttachmentResult<T> = Result<T, AttachmentError>;

#[derive(Debug)]
pub enum AttachmentError {
    Io(io::Error),
    Validation(ValidationError),
    /// The source path has no file name component.
    NotAFile(PathBuf),
    /// The file is not one of the accepted image types.
    NotAnImage(PathBuf),
    /// The path does not live under the entity's directory.
    ForeignAttachment { id: Uuid, path: PathBuf },
    /// No main image is stored for the entity.
    NoMainImage(Uuid),
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotAFile(path) => write!(f, "`{}` does not name a file", path.display()),
            Self::NotAnImage(path) => write!(f, "`{}` is not an image", path.display()),
            Self::ForeignAttachment { id, path } => {
                write!(f, "`{}` does not belong to {id}", path.display())
            }
            Self::NoMainImage(id) => write!(f, "there is no main image for {id}"),
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AttachmentError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ValidationError> for AttachmentError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Directory-per-id attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `source` into the id's attachment directory, replacing any
    /// file of the same name. Returns the stored path.
    pub fn add_attachment(&self, id: Uuid, source: &Path) -> AttachmentResult<PathBuf> {
        self.copy_into(&self.attachments_dir(id), source)
    }

    /// Copies `source` into a category under the id's attachment directory.
    pub fn add_attachment_to_category(
        &self,
        id: Uuid,
        source: &Path,
        category: &str,
    ) -> AttachmentResult<PathBuf> {
        let category = normalize_category(category)?;
        self.copy_into(&self.attachments_dir(id).join(category), source)
    }

    /// All attachment files of the id, categorized or not.
    pub fn attachments(&self, id: Uuid) -> AttachmentResult<Vec<PathBuf>> {
        list_files(&self.attachments_dir(id))
    }

    pub fn attachments_in_category(
        &self,
        id: Uuid,
        category: &str,
    ) -> AttachmentResult<Vec<PathBuf>> {
        let category = normalize_category(category)?;
        list_files(&self.attachments_dir(id).join(category))
    }

    /// Category names in use for the id, sorted.
    pub fn categories(&self, id: Uuid) -> AttachmentResult<Vec<String>> {
        let dir = self.attachments_dir(id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut categories = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                categories.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        categories.sort();
        Ok(categories)
    }

    /// Deletes one stored attachment.
    ///
    /// # Errors
    /// - `ForeignAttachment` when `attachment` is outside the id's directory.
    pub fn remove_attachment(&self, id: Uuid, attachment: &Path) -> AttachmentResult<()> {
        let owned = attachment.starts_with(self.entity_dir(id))
            && !attachment
                .components()
                .any(|component| component == Component::ParentDir);
        if !owned {
            return Err(AttachmentError::ForeignAttachment {
                id,
                path: attachment.to_path_buf(),
            });
        }
        fs::remove_file(attachment)?;
        info!("event=attachment_remove module=attachment status=ok id={id}");
        Ok(())
    }

    pub fn remove_category(&self, id: Uuid, category: &str) -> AttachmentResult<()> {
        let category = normalize_category(category)?;
        remove_tree(&self.attachments_dir(id).join(category));
        Ok(())
    }

    pub fn remove_all_attachments(&self, id: Uuid) {
        remove_tree(&self.attachments_dir(id));
    }

    /// Deletes everything stored for the id, main image included.
    pub fn remove_all_files(&self, id: Uuid) {
        remove_tree(&self.entity_dir(id));
    }

    /// Replaces the id's main image with a copy of `picture`.
    pub fn save_main_image(&self, id: Uuid, picture: &Path) -> AttachmentResult<PathBuf> {
        if !is_image(picture) {
            return Err(AttachmentError::NotAnImage(picture.to_path_buf()));
        }
        self.remove_main_image(id);
        self.copy_into(&self.main_image_dir(id), picture)
    }

    pub fn remove_main_image(&self, id: Uuid) {
        remove_tree(&self.main_image_dir(id));
    }

    pub fn main_image(&self, id: Uuid) -> AttachmentResult<PathBuf> {
        let dir = self.main_image_dir(id);
        if !dir.is_dir() {
            return Err(AttachmentError::NoMainImage(id));
        }
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                return Ok(entry.path());
            }
        }
        Err(AttachmentError::NoMainImage(id))
    }

    fn entity_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn attachments_dir(&self, id: Uuid) -> PathBuf {
        self.entity_dir(id).join(ATTACHMENTS_DIR)
    }

    fn main_image_dir(&self, id: Uuid) -> PathBuf {
        self.entity_dir(id).join(MAIN_IMAGE_DIR)
    }

    fn copy_into(&self, dir: &Path, source: &Path) -> AttachmentResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| AttachmentError::NotAFile(source.to_path_buf()))?;
        fs::create_dir_all(dir)?;
        let target = dir.join(file_name);
        fs::copy(source, &target)?;
        info!(
            "event=attachment_add module=attachment status=ok target={}",
            target.display()
        );
        Ok(target)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Regular files under `dir`, recursively, sorted. Missing dir is empty.
fn list_files(dir: &Path) -> AttachmentResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_files(dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// Deletes a directory tree, children first, skipping entries that fail.
fn remove_tree(path: &Path) {
    // symlink_metadata: never follow links out of the store.
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    if metadata.is_dir() {
        match fs::read_dir(path) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    remove_tree(&entry.path());
                }
            }
            Err(err) => warn!(
                "event=attachment_cleanup module=attachment status=error path={} error={}",
                path.display(),
                err
            ),
        }
        if let Err(err) = fs::remove_dir(path) {
            warn!(
                "event=attachment_cleanup module=attachment status=error path={} error={}",
                path.display(),
                err
            );
        }
    } else if let Err(err) = fs::remove_file(path) {
        warn!(
            "event=attachment_cleanup module=attachment status=error path={} error={}",
            path.display(),
            err
        );
    }
}
