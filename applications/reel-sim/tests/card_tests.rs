/// Card preparation and filesystem storage tests
/// Covers index generation, copy rules, and building a playlist from disk
use reel_core::{ReelError, Storage, StorageKey};
use reel_playback::{read_index, Playlist};
use reel_sim::{prepare_card, FsStorage};
use std::fs;
use std::io::Read;
use tempfile::TempDir;

fn source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.mp3"), b"bbbb").unwrap();
    fs::write(dir.path().join("a.wav"), b"aaaa").unwrap();
    fs::write(dir.path().join("C.M4A"), b"cccc").unwrap();
    fs::write(dir.path().join("notes.txt"), b"not audio").unwrap();
    fs::create_dir(dir.path().join("nested.mp3")).unwrap();
    dir
}

/// Test audio files are copied in name order under numbered keys
#[test]
fn test_prepare_card_numbers_tracks_in_name_order() {
    let source = source_dir();
    let card = TempDir::new().unwrap();

    let entries = prepare_card(source.path(), card.path(), "songs.txt").unwrap();

    let listed: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.key.as_str(), e.title.as_str()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("track001.m4a", "C"),
            ("track002.wav", "a"),
            ("track003.mp3", "b"),
        ]
    );

    assert_eq!(fs::read(card.path().join("track003.mp3")).unwrap(), b"bbbb");
    assert!(!card.path().join("track004.txt").exists());
}

/// Test the written index reads back as the returned entries
#[test]
fn test_prepare_card_writes_readable_index() {
    let source = source_dir();
    let card = TempDir::new().unwrap();

    let entries = prepare_card(source.path(), card.path(), "songs.txt").unwrap();

    let text = fs::read_to_string(card.path().join("songs.txt")).unwrap();
    assert_eq!(
        text,
        "track001.m4a, C\ntrack002.wav, a\ntrack003.mp3, b\n"
    );
    let parsed = read_index(text.as_bytes()).unwrap();
    assert_eq!(parsed, entries);
}

/// Test existing card files are left untouched
#[test]
fn test_prepare_card_keeps_existing_targets() {
    let source = source_dir();
    let card = TempDir::new().unwrap();
    fs::write(card.path().join("track001.m4a"), b"already here").unwrap();

    prepare_card(source.path(), card.path(), "songs.txt").unwrap();

    assert_eq!(
        fs::read(card.path().join("track001.m4a")).unwrap(),
        b"already here"
    );
}

/// Test a missing source directory is reported
#[test]
fn test_prepare_card_missing_source() {
    let card = TempDir::new().unwrap();
    let result = prepare_card(&card.path().join("nope"), card.path(), "songs.txt");
    assert!(result.is_err(), "Missing source should fail");
}

/// Test storage opens tracks by key
#[test]
fn test_fs_storage_opens_tracks() {
    let source = source_dir();
    let card = TempDir::new().unwrap();
    prepare_card(source.path(), card.path(), "songs.txt").unwrap();

    let storage = FsStorage::new(card.path(), "songs.txt");
    let mut contents = String::new();
    storage
        .open(&StorageKey::new("track002.wav").unwrap())
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "aaaa");

    let missing = storage.open(&StorageKey::new("track009.mp3").unwrap());
    assert!(matches!(missing, Err(ReelError::Storage(_))));
}

/// Test a playlist built from disk skips files removed from the card
#[test]
fn test_playlist_from_card_prunes_missing_files() {
    let source = source_dir();
    let card = TempDir::new().unwrap();
    prepare_card(source.path(), card.path(), "songs.txt").unwrap();
    fs::remove_file(card.path().join("track002.wav")).unwrap();

    let storage = FsStorage::new(card.path(), "songs.txt");
    let playlist = Playlist::build(&storage).unwrap();

    let titles: Vec<&str> = playlist.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "b"]);
    assert_eq!(playlist.released_count(), 1);
}

/// Test a card without an index cannot be played
#[test]
fn test_playlist_without_index_is_unavailable() {
    let card = TempDir::new().unwrap();
    let storage = FsStorage::new(card.path(), "songs.txt");

    let result = Playlist::build(&storage);
    assert!(matches!(result, Err(ReelError::IndexUnavailable(_))));
}

/// Test a card whose files are all gone yields an empty playlist
#[test]
fn test_playlist_with_no_files_is_empty() {
    let card = TempDir::new().unwrap();
    fs::write(card.path().join("songs.txt"), "track001.mp3, Gone\n").unwrap();
    let storage = FsStorage::new(card.path(), "songs.txt");

    let error = Playlist::build(&storage).unwrap_err();
    assert!(matches!(error, ReelError::EmptyPlaylist { checked: 1 }));
    assert!(error.is_fatal());
}
