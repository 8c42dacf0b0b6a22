//! Aggregate figures derived from a user graph.

use crate::model::user::User;
use std::collections::BTreeMap;

/// Number of events per registered tag, keyed by tag name.
///
/// Every registered tag is present, with `0` when no event uses it.
/// Untagged events are not counted.
pub fn event_count_by_tag(user: &User) -> BTreeMap<String, usize> {
    let handler = user.tag_handler();
    let mut counts: BTreeMap<String, usize> = handler
        .tags()
        .iter()
        .map(|tag| (tag.borrow().name().to_string(), 0))
        .collect();

    for event in user.events().iter() {
        let Some(tag) = event.tag() else {
            continue;
        };
        if handler.is_registered(tag) {
            if let Some(count) = counts.get_mut(tag.borrow().name()) {
                *count += 1;
            }
        }
    }
    counts
}
