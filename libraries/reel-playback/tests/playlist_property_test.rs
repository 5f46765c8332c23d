//! Property-based tests for the playlist ring
//!
//! Uses proptest to check circularity and pruning over random playlists.

mod common;

use common::{pattern_file, MemoryStorage};
use proptest::prelude::*;
use reel_core::{StorageKey, TrackTitle};
use reel_playback::{numbered_key, write_index, IndexEntry, Playlist, Track};

// ===== Helpers =====

fn tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| Track {
            title: TrackTitle::new(&format!("Track {}", i)),
            storage_key: StorageKey::new(&format!("t{}.mp3", i)).unwrap(),
        })
        .collect()
}

fn playable_mask() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..60)
        .prop_filter("at least one playable track", |mask| mask.iter().any(|&p| p))
}

// ===== Property Tests =====

proptest! {
    /// Property: N steps in either direction return to the starting track
    #[test]
    fn ring_is_circular(count in 1usize..80, start in 0usize..80) {
        let mut playlist = Playlist::from_tracks(tracks(count)).unwrap();
        for _ in 0..(start % count) {
            playlist.advance();
        }
        let origin = playlist.current_id();

        for _ in 0..count {
            playlist.advance();
        }
        prop_assert_eq!(playlist.current_id(), origin);

        for _ in 0..count {
            playlist.retreat();
        }
        prop_assert_eq!(playlist.current_id(), origin);
    }

    /// Property: advance and retreat undo each other
    #[test]
    fn advance_retreat_is_identity(
        count in 1usize..80,
        moves in prop::collection::vec(any::<bool>(), 0..100)
    ) {
        let mut playlist = Playlist::from_tracks(tracks(count)).unwrap();
        for forward in moves {
            let before = playlist.current_id();
            if forward {
                playlist.advance();
                playlist.retreat();
            } else {
                playlist.retreat();
                playlist.advance();
            }
            prop_assert_eq!(playlist.current_id(), before);
        }
    }

    /// Property: pruning keeps exactly the playable tracks, in order, in a
    /// closed ring with a live current position
    #[test]
    fn pruning_keeps_a_closed_ring(mask in playable_mask()) {
        let all = tracks(mask.len());
        let playlist = Playlist::from_tracks_validated(all.clone(), |track| {
            let i = all.iter().position(|t| t == track).unwrap();
            mask[i]
        })
        .unwrap();

        let expected: Vec<&Track> = all
            .iter()
            .zip(&mask)
            .filter(|(_, playable)| **playable)
            .map(|(t, _)| t)
            .collect();
        let actual: Vec<&Track> = playlist.iter().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(playlist.len() + playlist.released_count(), mask.len());

        // Walking next pointers closes the ring after len steps
        let head = playlist.head_id();
        let mut id = head;
        for _ in 0..playlist.len() {
            prop_assert!(playlist.get(id).is_some());
            let next = playlist.next_id(id).unwrap();
            prop_assert_eq!(playlist.prev_id(next), Some(id));
            id = next;
        }
        prop_assert_eq!(id, head);
        prop_assert_eq!(playlist.current_id(), head);
    }

    /// Property: a playlist built from storage holds exactly the entries
    /// whose files exist
    #[test]
    fn storage_build_prunes_missing_files(mask in playable_mask()) {
        let entries: Vec<IndexEntry> = (1..=mask.len())
            .map(|n| {
                let title = format!("Song {}", n);
                IndexEntry::new(numbered_key(n, "mp3").unwrap(), title.as_str())
            })
            .collect();
        let mut index = Vec::new();
        write_index(&mut index, &entries).unwrap();

        let mut storage = MemoryStorage::new().with_index(std::str::from_utf8(&index).unwrap());
        for (entry, &present) in entries.iter().zip(&mask) {
            if present {
                storage = storage.with_file(entry.key.as_str(), pattern_file(1));
            }
        }

        let playlist = Playlist::build(&storage).unwrap();
        let kept = mask.iter().filter(|&&p| p).count();
        prop_assert_eq!(playlist.len(), kept);
        let only_present = playlist.iter().all(|t| {
            let n: usize = t.storage_key.as_str()[5..8].parse().unwrap();
            mask[n - 1]
        });
        prop_assert!(only_present, "playlist holds a track whose file is missing");
    }
}
