//! Filesystem-backed card storage

use crate::error::Result;
use reel_core::{ReelError, Storage, StorageKey};
use reel_playback::{numbered_key, write_index, IndexEntry};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File extensions copied onto a card
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "m4a", "wav"];

/// A directory laid out like the player's SD card
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    index_file: String,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    fn track_path(&self, key: &StorageKey) -> reel_core::Result<PathBuf> {
        let name = key.as_str();
        // Keys name files in the card root only
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ReelError::storage(format!("invalid storage key '{}'", name)));
        }
        Ok(self.root.join(name))
    }
}

impl Storage for FsStorage {
    type Index = BufReader<File>;
    type File = File;

    fn open_index(&self) -> reel_core::Result<Self::Index> {
        let path = self.index_path();
        File::open(&path)
            .map(BufReader::new)
            .map_err(|e| ReelError::storage(format!("{}: {}", path.display(), e)))
    }

    fn open(&self, key: &StorageKey) -> reel_core::Result<Self::File> {
        let path = self.track_path(key)?;
        File::open(&path).map_err(|e| ReelError::storage(format!("{}: {}", path.display(), e)))
    }
}

fn audio_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    AUDIO_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Copy the audio files of `source` onto a card directory and index them
///
/// Files are taken in name order and copied as `trackNNN.<ext>`; a target
/// that already exists is left alone. The original file stem becomes the
/// title. Returns the entries written to the index.
pub fn prepare_card(source: &Path, card: &Path, index_file: &str) -> Result<Vec<IndexEntry>> {
    fs::create_dir_all(card)?;

    let mut files: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && audio_extension(path).is_some())
        .collect();
    files.sort();

    let mut entries = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let Some(extension) = audio_extension(path) else {
            continue;
        };
        let Some(key) = numbered_key(i + 1, &extension) else {
            warn!("No storage key left for {}", path.display());
            continue;
        };

        let target = card.join(key.as_str());
        if target.exists() {
            debug!("Keeping existing {}", target.display());
        } else {
            fs::copy(path, &target)?;
        }

        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.to_string());
        entries.push(IndexEntry::new(key, title.as_str()));
    }

    let index = File::create(card.join(index_file))?;
    write_index(BufWriter::new(index), &entries)?;
    info!(
        "Indexed {} tracks from {} into {}",
        entries.len(),
        source.display(),
        card.display()
    );
    Ok(entries)
}
