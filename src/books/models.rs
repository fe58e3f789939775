//! Wire models for the Books API `volumes` search response.
//!
//! Only the fields the ranking pipeline reads are modelled; everything else in
//! the payload is ignored.

use serde::Deserialize;

/// Top-level search response.
///
/// `items` is `None` when the payload carries no catalog list at all (the API
/// omits the field when nothing matched), which is distinct from an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeList {
    pub total_items: Option<u64>,
    pub items: Option<Vec<Volume>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Volume {
    /// Title and description, with absent fields as empty strings.
    pub fn into_text(self) -> (String, String) {
        let info = self.volume_info.unwrap_or_default();
        (
            info.title.unwrap_or_default(),
            info.description.unwrap_or_default(),
        )
    }
}
