//! In-memory fuzzy search over materialized entities.
//!
//! # Responsibility
//! - Define the single-key contract searchable entities implement.
//! - Rank candidates by edit distance to the query.
//!
//! # See also
//! - `fuzzy` for the ranking rules.

pub mod fuzzy;

/// An entity that exposes one string to search on.
pub trait Searchable {
    fn search_key(&self) -> String;
}
