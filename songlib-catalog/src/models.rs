//! Catalog entities
//!
//! `Song` is the persisted record. `SongPatch` is the partial-update input:
//! every attribute is an explicit optional so "leave unchanged" and "set to
//! empty" are different values.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::enrichment::EnrichedSong;

/// A song in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub group: String,
    #[serde(rename = "song")]
    pub title: String,
    /// `None` when the provider did not know the release date
    pub release_date: Option<NaiveDate>,
    /// Lyrics: verses separated by a blank line, lines by a single newline
    pub text: String,
    pub link: String,
}

impl Song {
    /// Build a new catalog record from caller identifiers and enriched metadata
    ///
    /// The id is freshly generated here and never changes afterwards.
    pub fn from_enrichment(group: String, title: String, details: EnrichedSong) -> Self {
        Self {
            id: Uuid::new_v4(),
            group,
            title,
            release_date: Some(details.release_date),
            text: details.text,
            link: details.link,
        }
    }
}

/// Partial update for a song
///
/// `None` leaves the stored value alone. For `release_date`, `Some(None)`
/// (JSON `null`) clears the date. There is no `id` field: updates target an
/// existing record, they never move it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SongPatch {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, rename = "song")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Distinguishes a JSON `null` (`Some(None)`) from a missing key (`None`, via
/// `#[serde(default)]`).
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

impl SongPatch {
    /// True when no attribute is marked as set
    pub fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.title.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }

    /// Name of the first required attribute this patch would blank out
    ///
    /// `group`, `title` and `link` may be changed but never emptied.
    pub fn blank_required_field(&self) -> Option<&'static str> {
        [
            ("group", &self.group),
            ("song", &self.title),
            ("link", &self.link),
        ]
        .into_iter()
        .find(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
    }

    /// Merge this patch over a stored record
    pub fn apply(self, mut song: Song) -> Song {
        if let Some(group) = self.group {
            song.group = group;
        }
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(release_date) = self.release_date {
            song.release_date = release_date;
        }
        if let Some(text) = self.text {
            song.text = text;
        }
        if let Some(link) = self.link {
            song.link = link;
        }
        song
    }
}
