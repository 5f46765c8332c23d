//! Track index file
//!
//! The index is a plain text file at the storage root, one track per line:
//!
//! ```text
//! track001.mp3, Artist - Title
//! track002.mp3, Another Title
//! ```
//!
//! The key field is at most [`STORAGE_KEY_LEN`] bytes and may be padded with
//! spaces. Everything after the first comma (minus one leading space) is the
//! display title. Reading stops at the first empty line or at end of file.

use reel_core::{ReelError, Result, StorageKey, TrackTitle, STORAGE_KEY_LEN};
use std::io::{BufRead, Write};
use tracing::warn;

/// Separator written between key and title
pub const FIELD_SEPARATOR: &str = ", ";

/// One line of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: StorageKey,
    pub title: TrackTitle,
}

impl IndexEntry {
    pub fn new(key: StorageKey, title: impl Into<TrackTitle>) -> Self {
        Self {
            key,
            title: title.into(),
        }
    }
}

/// Parse one index line (without its terminator)
///
/// `line_number` is 1-based and only used for error reporting. A missing
/// title falls back to the key.
///
/// # Errors
/// [`ReelError::MalformedIndex`] if the line has no separator or the key is
/// empty or longer than [`STORAGE_KEY_LEN`]
pub fn parse_line(line_number: usize, line: &str) -> Result<IndexEntry> {
    let Some((key_field, rest)) = line.split_once(',') else {
        return Err(ReelError::malformed_index(line_number, "missing ',' separator"));
    };

    let key_text = key_field.trim_end();
    if key_text.len() > STORAGE_KEY_LEN {
        return Err(ReelError::malformed_index(
            line_number,
            format!("key '{}' exceeds {} bytes", key_text, STORAGE_KEY_LEN),
        ));
    }
    let key = StorageKey::new(key_text)
        .ok_or_else(|| ReelError::malformed_index(line_number, "empty key"))?;

    let title = rest.strip_prefix(' ').unwrap_or(rest);
    let title = if title.is_empty() {
        TrackTitle::new(key.as_str())
    } else {
        TrackTitle::new(title)
    };

    Ok(IndexEntry { key, title })
}

/// Read every entry up to the first empty line
///
/// Malformed lines are logged and skipped. Invalid UTF-8 is replaced rather
/// than rejected.
///
/// # Errors
/// Propagates I/O errors from the underlying reader
pub fn read_index<R: BufRead>(mut reader: R) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();
    let mut raw = Vec::new();
    let mut line_number = 0;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        line_number += 1;

        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            break;
        }

        match parse_line(line_number, line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping index entry: {}", e),
        }
    }

    Ok(entries)
}

/// Write entries in index format
///
/// # Errors
/// Propagates I/O errors from the writer
pub fn write_index<W: Write>(mut writer: W, entries: &[IndexEntry]) -> Result<()> {
    for entry in entries {
        writeln!(writer, "{}{}{}", entry.key, FIELD_SEPARATOR, entry.title)?;
    }
    writer.flush()?;
    Ok(())
}

/// Conventional key for the n-th track, e.g. `track007.mp3`
///
/// Returns `None` if the result would not fit in a storage key.
pub fn numbered_key(number: usize, extension: &str) -> Option<StorageKey> {
    StorageKey::new(&format!("track{:03}.{}", number, extension))
}
