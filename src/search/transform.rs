//! Turns a raw volume list into ranked, analyzed search results.

use serde::{Deserialize, Serialize};

use crate::books::models::VolumeList;
use crate::search::analyzer::analyze;
use crate::search::error::SearchError;

/// A catalog entry with its description metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedItem {
    pub title: String,
    pub description: String,
    pub uppercase_word_count: usize,
    pub unique_word_count: usize,
}

impl AnalyzedItem {
    pub fn new(title: String, description: String) -> Self {
        let metrics = analyze(&description);
        Self {
            title,
            description,
            uppercase_word_count: metrics.uppercase_words,
            unique_word_count: metrics.unique_words,
        }
    }
}

/// The final, cacheable response for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total_count: usize,
    pub items: Vec<AnalyzedItem>,
}

/// Analyze and rank every usable volume in the payload.
///
/// Volumes with neither a title nor a description are dropped. A payload with
/// no `items` list yields [`SearchError::NoItemsFound`]; an empty list is a
/// successful result with zero items.
pub fn transform(list: VolumeList) -> Result<SearchResult, SearchError> {
    let volumes = list.items.ok_or(SearchError::NoItemsFound)?;

    let mut items: Vec<AnalyzedItem> = volumes
        .into_iter()
        .filter_map(|volume| {
            let (title, description) = volume.into_text();
            if title.trim().is_empty() && description.trim().is_empty() {
                return None;
            }
            Some(AnalyzedItem::new(title, description))
        })
        .collect();

    rank(&mut items);

    Ok(SearchResult {
        total_count: items.len(),
        items,
    })
}

/// Order by uppercase word count, then unique word count, both descending.
/// `sort_by` is stable, so remaining ties keep their catalog order.
pub(crate) fn rank(items: &mut [AnalyzedItem]) {
    items.sort_by(|a, b| {
        b.uppercase_word_count
            .cmp(&a.uppercase_word_count)
            .then_with(|| b.unique_word_count.cmp(&a.unique_word_count))
    });
}
