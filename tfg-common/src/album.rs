//! Album data model
//!
//! An [`AlbumRecord`] is the writable payload (what CSV import and the admin
//! forms produce). An [`Album`] is a record plus the id the store assigned.

use serde::{Deserialize, Serialize};

/// Name given to imported rows with an empty name column
pub const DEFAULT_NAME: &str = "未命名相簿";

/// Category given to imported rows with an empty category column
pub const DEFAULT_CATEGORY: &str = "未分類";

/// Album fields without identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub name: String,
    /// Comma-separated tag list, possibly wrapped in stray quotes
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub participants: String,
    /// Expected `YYYY/MM/DD`, never validated on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_link1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_link2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_link3: Option<String>,
}

/// Stored album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    #[serde(flatten)]
    pub record: AlbumRecord,
}

impl Album {
    pub fn new(id: impl Into<String>, record: AlbumRecord) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }

    /// Individual tags of this album, in stored order
    pub fn tags(&self) -> Vec<String> {
        split_tags(&self.record.category)
    }

    pub fn tone(&self) -> PlaceholderTone {
        PlaceholderTone::for_category(&self.record.category)
    }
}

impl AlbumRecord {
    /// Keep a thumbnail only if it lexically starts with `http`
    pub fn accept_thumbnail(raw: Option<String>) -> Option<String> {
        raw.filter(|t| t.starts_with("http"))
    }

    /// Normalise a record submitted through the admin form
    ///
    /// Blank optional fields become absent and a thumbnail that is not a URL
    /// is dropped, matching what a CSV import would store.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        self.name = self.name.trim().to_string();
        self.start_date = blank_to_none(self.start_date);
        self.end_date = blank_to_none(self.end_date);
        self.link = blank_to_none(self.link);
        self.thumbnail = Self::accept_thumbnail(blank_to_none(self.thumbnail));
        self.video_link1 = blank_to_none(self.video_link1);
        self.video_link2 = blank_to_none(self.video_link2);
        self.video_link3 = blank_to_none(self.video_link3);
        self
    }

    pub fn has_videos(&self) -> bool {
        self.video_link1.is_some() || self.video_link2.is_some() || self.video_link3.is_some()
    }
}

/// Strip one leading and one trailing double quote, independently
pub fn strip_wrapping_quotes(category: &str) -> &str {
    let s = category.strip_prefix('"').unwrap_or(category);
    s.strip_suffix('"').unwrap_or(s)
}

/// Split a category field into trimmed, non-empty tags
pub fn split_tags(category: &str) -> Vec<String> {
    strip_wrapping_quotes(category)
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tint used for an album card that has no thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderTone {
    Amber,
    Blue,
    Purple,
    Emerald,
    Teal,
}

impl PlaceholderTone {
    /// First matching rule wins: gatherings, cycling, overseas, mountains
    pub fn for_category(category: &str) -> Self {
        if category.contains("聚會") || category.contains("聚餐") {
            PlaceholderTone::Amber
        } else if category.contains("單車") {
            PlaceholderTone::Blue
        } else if category.contains("國外") {
            PlaceholderTone::Purple
        } else if category.contains("山") {
            // also covers 爬山 and 登山
            PlaceholderTone::Emerald
        } else {
            PlaceholderTone::Teal
        }
    }
}
