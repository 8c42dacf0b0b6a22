//! Levenshtein-ranked search engine.
//!
//! # Invariants
//! - Matching is case-insensitive.
//! - Results are within the tolerance and sorted by ascending distance;
//!   candidates at equal distance keep their base order.

use super::Searchable;

/// Searches a fixed list of candidates.
#[derive(Debug, Clone)]
pub struct SearchEngine<T: Searchable> {
    search_base: Vec<T>,
}

impl<T: Searchable + Clone> SearchEngine<T> {
    pub fn new(search_base: Vec<T>) -> Self {
        Self { search_base }
    }

    /// Returns candidates whose key is within `tolerance` edits of `query`.
    pub fn search(&self, query: &str, tolerance: usize) -> Vec<T> {
        let query = query.to_lowercase();
        let mut ranked: Vec<(usize, &T)> = self
            .search_base
            .iter()
            .map(|candidate| {
                let key = candidate.search_key().to_lowercase();
                (levenshtein(&query, &key), candidate)
            })
            .filter(|(distance, _)| *distance <= tolerance)
            .collect();
        ranked.sort_by_key(|(distance, _)| *distance);
        ranked
            .into_iter()
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }

    pub fn search_base(&self) -> &[T] {
        &self.search_base
    }
}

/// Edit distance counting single-character insertions, deletions and
/// substitutions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
