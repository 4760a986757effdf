//! Title-based deduplication within a single category list.

use crate::models::Item;
use std::collections::HashSet;

/// Keep the first item for each normalized key (trimmed, lowercased).
///
/// Items whose normalized key is empty never collide and are always kept.
/// Input order is preserved.
pub fn dedup_by<F>(items: Vec<Item>, key: F) -> Vec<Item>
where
    F: Fn(&Item) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let normalized = key(item).trim().to_lowercase();
            normalized.is_empty() || seen.insert(normalized)
        })
        .collect()
}

pub fn dedup_items(items: Vec<Item>) -> Vec<Item> {
    dedup_by(items, |item| item.title.as_str())
}
