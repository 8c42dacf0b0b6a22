//! vCard (`.vcf`) contact import.
//!
//! # Responsibility
//! - Extract name, address, phone, categories and notes from vCard text.
//! - Create missing tags for categories and add the contact to the user.
//!
//! # Invariants
//! - `FN` wins over `N` for the display name.
//! - Only the first `TEL` becomes the phone number.
//! - Each imported contact gets a freshly generated stable id.

use super::{ImportError, ImportResult};
use crate::cache::{ContactCache, NoteCache};
use crate::model::contact::ContactRef;
use crate::model::user::User;
use crate::model::validation::validate_contact_name;
use chrono::Local;
use log::{info, warn};
use std::fs;
use std::path::Path;

const VCF_EXTENSION: &str = "vcf";

/// Raw properties of interest from one vCard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcardFields {
    pub formatted_name: Option<String>,
    /// Structured `N` value: `family;given;additional;prefix;suffix`.
    pub structured_name: Option<String>,
    /// Structured `ADR` value, `;` separated.
    pub address: Option<String>,
    pub telephones: Vec<String>,
    pub categories: Vec<String>,
    pub notes: Vec<String>,
}

/// Parses the properties this importer understands; others are ignored.
pub fn parse_vcard(text: &str) -> VcardFields {
    let mut fields = VcardFields::default();
    for line in text.lines() {
        let Some((head, value)) = line.split_once(':') else {
            continue;
        };
        let property = head.split(';').next().unwrap_or(head).trim().to_ascii_uppercase();
        match property.as_str() {
            "FN" => {
                fields.formatted_name.get_or_insert_with(|| value.trim().to_string());
            }
            "N" => {
                fields.structured_name.get_or_insert_with(|| value.to_string());
            }
            "ADR" => {
                fields.address.get_or_insert_with(|| value.to_string());
            }
            "TEL" => {
                let number = value.rsplit(':').next().unwrap_or(value).trim();
                fields.telephones.push(number.to_string());
            }
            "CATEGORIES" => fields.categories.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|category| !category.is_empty())
                    .map(str::to_string),
            ),
            "NOTE" => fields.notes.push(value.to_string()),
            _ => {}
        }
    }
    fields
}

/// Builds a contact snapshot with a fresh stable id from parsed fields.
pub fn contact_cache(fields: &VcardFields) -> ContactCache {
    let name = fields
        .formatted_name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| fields.structured_name.as_deref().map(display_name))
        .unwrap_or_default();

    let mut cache = ContactCache::with_fresh_id(name);
    cache.address = fields.address.as_deref().map(join_address).unwrap_or_default();
    cache.phone_number = fields.telephones.first().cloned().unwrap_or_default();

    let now = Local::now().naive_local();
    cache.notes = fields
        .notes
        .iter()
        .map(|text| NoteCache {
            created_at: now,
            text: text.clone(),
        })
        .collect();

    for category in &fields.categories {
        if !cache.tags.contains(category) {
            cache.tags.push(category.clone());
        }
    }
    cache
}

/// Imports one `.vcf` file into `user`.
///
/// # Errors
/// - `UnsupportedFile` when the extension is not `.vcf`.
/// - `Invalid` when the contact has no name; nothing is mutated then.
pub fn import_file(user: &mut User, path: &Path) -> ImportResult<ContactRef> {
    if !is_vcf(path) {
        return Err(ImportError::UnsupportedFile(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cache = contact_cache(&parse_vcard(&text));
    validate_contact_name(&cache.name).map_err(|err| ImportError::invalid(path, err))?;
    for category in &cache.tags {
        user.get_or_create_tag(category)
            .map_err(|err| ImportError::invalid(path, err))?;
    }
    let contact = user
        .add_contact_from_cache(cache)
        .map_err(|err| ImportError::invalid(path, err))?;

    info!(
        "event=vcf_import module=import status=ok contact_id={}",
        contact.borrow().id()
    );
    Ok(contact)
}

/// Imports every `.vcf` file directly inside `dir`, skipping failures.
///
/// Returns the number of imported contacts.
pub fn import_directory(user: &mut User, dir: &Path) -> ImportResult<usize> {
    let io_error = |source| ImportError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_vcf(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut imported = 0;
    for path in &paths {
        match import_file(user, path) {
            Ok(_) => imported += 1,
            Err(err) => warn!("event=vcf_import module=import status=skipped error={err}"),
        }
    }

    if imported == 0 {
        return Err(ImportError::NothingImported(dir.to_path_buf()));
    }
    Ok(imported)
}

fn is_vcf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VCF_EXTENSION))
}

/// `family;given;additional;prefix;suffix` -> `prefix given additional family suffix`.
fn display_name(structured: &str) -> String {
    let parts: Vec<&str> = structured.split(';').map(str::trim).collect();
    let part = |index: usize| parts.get(index).copied().unwrap_or("");
    [part(3), part(1), part(2), part(0), part(4)]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_address(structured: &str) -> String {
    structured
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
