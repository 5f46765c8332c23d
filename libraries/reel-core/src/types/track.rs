//! Bounded track metadata
//!
//! Titles and storage keys are stored in fixed-capacity strings so a track
//! never reallocates after the playlist is built.

use heapless::String;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length in bytes
pub const TRACK_TITLE_LEN: usize = 63;

/// Maximum storage key length in bytes (8.3 filename)
pub const STORAGE_KEY_LEN: usize = 12;

/// Display title of a track, truncated to [`TRACK_TITLE_LEN`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TrackTitle(String<TRACK_TITLE_LEN>);

impl TrackTitle {
    /// Create a title, truncating at a character boundary if it is too long
    pub fn new(title: &str) -> Self {
        Self(truncated(title))
    }

    /// Title text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the title is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrackTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TrackTitle {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

/// Filename of a track's backing file on removable storage
///
/// Unlike titles, keys are never truncated: a key that does not fit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(String<STORAGE_KEY_LEN>);

impl StorageKey {
    /// Create a storage key; returns `None` if empty or longer than [`STORAGE_KEY_LEN`]
    pub fn new(key: &str) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        let mut inner = String::new();
        inner.push_str(key).ok()?;
        Some(Self(inner))
    }

    /// Key text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
