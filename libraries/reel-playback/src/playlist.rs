//! Circular playlist
//!
//! Tracks form a closed doubly-linked ring stored in an arena: nodes refer
//! to each other by [`TrackId`] rather than by pointer. After construction
//! the ring is never empty and only the current position moves.

use crate::index::{read_index, IndexEntry};
use reel_core::{ReelError, Result, Storage, StorageKey, TrackTitle};
use tracing::{debug, info, warn};

/// Handle to a node in the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(usize);

/// A playable track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: TrackTitle,
    pub storage_key: StorageKey,
}

impl From<IndexEntry> for Track {
    fn from(entry: IndexEntry) -> Self {
        Self {
            title: entry.title,
            storage_key: entry.key,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    track: Track,
    prev: TrackId,
    next: TrackId,
    linked: bool,
}

/// Non-empty circular playlist with a current position
#[derive(Debug, Clone)]
pub struct Playlist {
    nodes: Vec<Node>,
    /// Slots unlinked during pruning
    released: Vec<TrackId>,
    head: TrackId,
    current: TrackId,
    len: usize,
}

impl Playlist {
    /// Build the playlist from the storage index
    ///
    /// Entries whose file cannot be opened are pruned. The current position
    /// starts at the first surviving entry.
    ///
    /// # Errors
    /// - [`ReelError::IndexUnavailable`] if the index cannot be opened or read
    /// - [`ReelError::EmptyPlaylist`] if no entry survives
    pub fn build<S: Storage>(storage: &S) -> Result<Self> {
        let index = storage
            .open_index()
            .map_err(|e| ReelError::IndexUnavailable(e.to_string()))?;
        let entries =
            read_index(index).map_err(|e| ReelError::IndexUnavailable(e.to_string()))?;
        info!("Read {} index entries", entries.len());

        let playlist = Self::from_tracks_validated(entries.into_iter().map(Track::from), |track| {
            match storage.open(&track.storage_key) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Pruning '{}': {}", track.title, e);
                    false
                }
            }
        })?;
        info!(
            "Playlist ready: {} tracks, {} pruned",
            playlist.len(),
            playlist.released_count()
        );
        Ok(playlist)
    }

    /// Build a ring from tracks without checking storage
    ///
    /// # Errors
    /// [`ReelError::EmptyPlaylist`] if `tracks` is empty
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Result<Self> {
        Self::from_tracks_validated(tracks, |_| true)
    }

    /// Build a ring, then walk it once and unlink every track that fails
    /// `is_playable`
    ///
    /// # Errors
    /// [`ReelError::EmptyPlaylist`] if nothing is left
    pub fn from_tracks_validated<F>(
        tracks: impl IntoIterator<Item = Track>,
        mut is_playable: F,
    ) -> Result<Self>
    where
        F: FnMut(&Track) -> bool,
    {
        let mut nodes: Vec<Node> = tracks
            .into_iter()
            .enumerate()
            .map(|(i, track)| Node {
                track,
                prev: TrackId(i),
                next: TrackId(i),
                linked: true,
            })
            .collect();

        let checked = nodes.len();
        if checked == 0 {
            return Err(ReelError::EmptyPlaylist { checked });
        }

        // Close the ring
        for (i, node) in nodes.iter_mut().enumerate() {
            node.prev = TrackId((i + checked - 1) % checked);
            node.next = TrackId((i + 1) % checked);
        }

        let mut playlist = Self {
            nodes,
            released: Vec::new(),
            head: TrackId(0),
            current: TrackId(0),
            len: checked,
        };

        // One pass over the original entries. An unlinked node's successor
        // is still the next original entry, so the walk visits each once.
        let mut cursor = playlist.head;
        for _ in 0..checked {
            let next = playlist.node(cursor).next;
            if !is_playable(&playlist.node(cursor).track) {
                playlist.unlink(cursor);
            }
            cursor = next;
        }

        if playlist.len == 0 {
            return Err(ReelError::EmptyPlaylist { checked });
        }
        playlist.current = playlist.head;
        Ok(playlist)
    }

    fn node(&self, id: TrackId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: TrackId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn unlink(&mut self, id: TrackId) {
        let node = self.node(id);
        let (prev, next) = (node.prev, node.next);
        debug!("Unlinking '{}'", node.track.title);

        self.node_mut(id).linked = false;
        self.released.push(id);
        self.len -= 1;
        if self.len == 0 {
            return;
        }

        self.node_mut(prev).next = next;
        self.node_mut(next).prev = prev;
        if self.head == id {
            self.head = next;
        }
        if self.current == id {
            self.current = next;
        }
    }

    /// Number of tracks in the ring
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false once built; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries pruned during construction
    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    pub fn head_id(&self) -> TrackId {
        self.head
    }

    pub fn current_id(&self) -> TrackId {
        self.current
    }

    /// First surviving track
    pub fn head(&self) -> &Track {
        &self.node(self.head).track
    }

    /// Track at the current position
    pub fn current(&self) -> &Track {
        &self.node(self.current).track
    }

    /// Look up a linked track
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.nodes
            .get(id.0)
            .filter(|node| node.linked)
            .map(|node| &node.track)
    }

    /// Successor of a linked track
    pub fn next_id(&self, id: TrackId) -> Option<TrackId> {
        self.nodes.get(id.0).filter(|n| n.linked).map(|n| n.next)
    }

    /// Predecessor of a linked track
    pub fn prev_id(&self, id: TrackId) -> Option<TrackId> {
        self.nodes.get(id.0).filter(|n| n.linked).map(|n| n.prev)
    }

    /// Move to the next track, wrapping after the last
    pub fn advance(&mut self) -> &Track {
        self.current = self.node(self.current).next;
        self.current()
    }

    /// Move to the previous track, wrapping before the first
    pub fn retreat(&mut self) -> &Track {
        self.current = self.node(self.current).prev;
        self.current()
    }

    /// Move back to the first track
    pub fn rewind_to_head(&mut self) -> &Track {
        self.current = self.head;
        self.current()
    }

    /// Tracks in ring order starting at the head
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            playlist: self,
            next: self.head,
            remaining: self.len,
        }
    }
}

/// Iterator over one lap of the ring
pub struct Iter<'a> {
    playlist: &'a Playlist,
    next: TrackId,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Track;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.playlist.node(self.next);
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> Track {
        Track {
            title: TrackTitle::new(name),
            storage_key: StorageKey::new(&format!("{}.mp3", name.to_lowercase())).unwrap(),
        }
    }

    fn titles(playlist: &Playlist) -> Vec<&str> {
        playlist.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn ring_wraps_both_ways() {
        let mut playlist = Playlist::from_tracks(["A", "B", "C"].map(track)).unwrap();
        assert_eq!(playlist.current().title.as_str(), "A");
        assert_eq!(playlist.retreat().title.as_str(), "C");
        assert_eq!(playlist.advance().title.as_str(), "A");
        assert_eq!(playlist.advance().title.as_str(), "B");
        assert_eq!(playlist.advance().title.as_str(), "C");
        assert_eq!(playlist.advance().title.as_str(), "A");
    }

    #[test]
    fn single_track_is_its_own_neighbour() {
        let mut playlist = Playlist::from_tracks([track("Solo")]).unwrap();
        let id = playlist.head_id();
        assert_eq!(playlist.next_id(id), Some(id));
        assert_eq!(playlist.prev_id(id), Some(id));
        assert_eq!(playlist.advance().title.as_str(), "Solo");
        assert_eq!(playlist.retreat().title.as_str(), "Solo");
    }

    #[test]
    fn prunes_unplayable_entries() {
        let playlist = Playlist::from_tracks_validated(["A", "B", "C", "D"].map(track), |t| {
            t.title.as_str() != "B"
        })
        .unwrap();
        assert_eq!(titles(&playlist), vec!["A", "C", "D"]);
        assert_eq!(playlist.released_count(), 1);
    }

    #[test]
    fn pruning_the_head_moves_it() {
        let playlist = Playlist::from_tracks_validated(["A", "B", "C"].map(track), |t| {
            t.title.as_str() != "A"
        })
        .unwrap();
        assert_eq!(playlist.head().title.as_str(), "B");
        assert_eq!(playlist.current().title.as_str(), "B");
        assert_eq!(titles(&playlist), vec!["B", "C"]);
    }

    #[test]
    fn released_ids_are_not_visible() {
        let playlist = Playlist::from_tracks_validated(["A", "B"].map(track), |t| {
            t.title.as_str() == "A"
        })
        .unwrap();
        assert_eq!(playlist.get(TrackId(1)), None);
        assert_eq!(playlist.next_id(TrackId(1)), None);
        assert_eq!(playlist.next_id(playlist.head_id()), Some(playlist.head_id()));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            Playlist::from_tracks(Vec::new()),
            Err(ReelError::EmptyPlaylist { checked: 0 })
        ));
    }

    #[test]
    fn everything_pruned_is_an_error() {
        let err = Playlist::from_tracks_validated(["A", "B"].map(track), |_| false).unwrap_err();
        assert!(matches!(err, ReelError::EmptyPlaylist { checked: 2 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn rewind_to_head() {
        let mut playlist = Playlist::from_tracks(["A", "B", "C"].map(track)).unwrap();
        playlist.advance();
        playlist.advance();
        assert_eq!(playlist.rewind_to_head().title.as_str(), "A");
    }
}
