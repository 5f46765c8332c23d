//! Shared test doubles for the playback integration tests

#![allow(dead_code)]

use reel_core::{
    Clock, Command, Decoder, Postbox, ReelError, Result, Storage, StorageKey, Volume,
};
use reel_playback::{
    display_channels, DisplayPort, DisplaySnapshot, EngineConfig, StreamingEngine,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHUNK: usize = 32;

// ===== Storage =====

/// Storage backed by in-memory buffers
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    index: Option<String>,
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: &str) -> Self {
        self.index = Some(index.to_string());
        self
    }

    pub fn with_file(mut self, key: &str, data: Vec<u8>) -> Self {
        self.files.insert(key.to_string(), data);
        self
    }

    /// Index plus one patterned file per title, keyed `<lowercase>.mp3`
    pub fn with_tracks(titles: &[&str], chunks: usize) -> Self {
        let mut storage = Self::new();
        let mut index = String::new();
        for title in titles {
            let key = format!("{}.mp3", title.to_lowercase());
            index.push_str(&format!("{}, {}\n", key, title));
            storage.files.insert(key, pattern_file(chunks));
        }
        storage.index = Some(index);
        storage
    }
}

impl Storage for MemoryStorage {
    type Index = Cursor<Vec<u8>>;
    type File = Cursor<Vec<u8>>;

    fn open_index(&self) -> Result<Self::Index> {
        self.index
            .as_ref()
            .map(|text| Cursor::new(text.clone().into_bytes()))
            .ok_or_else(|| ReelError::storage("no index on card"))
    }

    fn open(&self, key: &StorageKey) -> Result<Self::File> {
        self.files
            .get(key.as_str())
            .map(|data| Cursor::new(data.clone()))
            .ok_or_else(|| ReelError::storage(format!("{} not found", key)))
    }
}

/// File whose n-th chunk is filled with the byte `n`
pub fn pattern_file(chunks: usize) -> Vec<u8> {
    (0..chunks)
        .flat_map(|i| std::iter::repeat(i as u8).take(CHUNK))
        .collect()
}

// ===== Clock =====

struct Alarm {
    after_sleeps: usize,
    postbox: Postbox<Command>,
    command: Command,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    sleeps: usize,
    alarms: Vec<Alarm>,
}

/// Manual clock; sleeping advances time instantly
#[derive(Clone, Default)]
pub struct TestClock {
    state: Arc<Mutex<ClockState>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().now += by;
    }

    pub fn sleeps(&self) -> usize {
        self.state.lock().unwrap().sleeps
    }

    /// Post `command` once the clock has been slept on `after_sleeps` times
    pub fn post_after_sleeps(
        &self,
        after_sleeps: usize,
        postbox: Postbox<Command>,
        command: Command,
    ) {
        self.state.lock().unwrap().alarms.push(Alarm {
            after_sleeps,
            postbox,
            command,
        });
    }
}

impl Clock for TestClock {
    fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.now += duration;
        state.sleeps += 1;
        let sleeps = state.sleeps;
        for alarm in state.alarms.iter().filter(|a| a.after_sleeps == sleeps) {
            alarm.postbox.post(alarm.command).unwrap();
        }
    }
}

// ===== Decoder =====

/// Decoder that records everything and can inject commands mid-transfer
#[derive(Default)]
pub struct RecordingDecoder {
    pub chunks: Vec<Vec<u8>>,
    pub resets: usize,
    pub volumes: Vec<Volume>,
    pub progress_seen: Vec<f32>,
    clock: Option<(TestClock, Duration)>,
    script: Vec<(usize, Command)>,
    postbox: Option<Postbox<Command>>,
    fail_after: Option<usize>,
    display: Option<(DisplayPort, DisplaySnapshot)>,
}

impl RecordingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by `per_chunk` on every write
    pub fn paced(mut self, clock: &TestClock, per_chunk: Duration) -> Self {
        self.clock = Some((clock.clone(), per_chunk));
        self
    }

    /// Post each command right after the given number of writes
    pub fn scripted(mut self, postbox: Postbox<Command>, script: Vec<(usize, Command)>) -> Self {
        self.postbox = Some(postbox);
        self.script = script;
        self
    }

    /// Reject every write after the first `writes`
    pub fn failing_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }

    /// Watch the display while writing
    pub fn observing(mut self, port: DisplayPort) -> Self {
        self.display = Some((port, DisplaySnapshot::default()));
        self
    }

    /// First byte of every chunk written, i.e. the source chunk numbers
    pub fn chunk_numbers(&self) -> Vec<u8> {
        self.chunks.iter().map(|c| c[0]).collect()
    }
}

impl Decoder for RecordingDecoder {
    fn reset(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume) -> Result<()> {
        self.volumes.push(volume);
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.chunks.len() >= limit) {
            return Err(ReelError::decoder("FIFO timeout"));
        }

        if let Some((port, snapshot)) = self.display.as_mut() {
            if port.poll(snapshot).unwrap_or(false) {
                self.progress_seen.push(snapshot.progress);
            }
        }

        self.chunks.push(chunk.to_vec());
        if let Some((clock, per_chunk)) = &self.clock {
            clock.advance(*per_chunk);
        }

        let written = self.chunks.len();
        if let Some(postbox) = &self.postbox {
            for (_, command) in self.script.iter().filter(|(at, _)| *at == written) {
                postbox.post(*command).unwrap();
            }
        }
        Ok(())
    }
}

// ===== Engine =====

pub type TestEngine = StreamingEngine<MemoryStorage, RecordingDecoder, TestClock>;

pub struct Harness {
    pub engine: TestEngine,
    pub commands: Postbox<Command>,
    pub display: DisplayPort,
    pub clock: TestClock,
}

impl Harness {
    /// Latest title published to the display, if any
    pub fn latest_title(&self) -> Option<String> {
        let mut snapshot = DisplaySnapshot::default();
        self.display.poll(&mut snapshot).ok()?;
        if snapshot.title.is_empty() {
            None
        } else {
            Some(snapshot.title.as_str().to_string())
        }
    }

    pub fn current(&self) -> &str {
        self.engine.playlist().current().title.as_str()
    }

    pub fn send(&self, command: Command) {
        self.commands.post(command).unwrap();
    }
}

/// Build an engine whose decoder may post to its own command mailbox
pub fn harness_with(
    config: EngineConfig,
    storage: MemoryStorage,
    clock: TestClock,
    decoder: impl FnOnce(Postbox<Command>, &TestClock) -> RecordingDecoder,
) -> Harness {
    let (commands, mailbox) = reel_core::mailbox(reel_core::PostPolicy::Overwrite);
    let (link, display) = display_channels();
    let decoder = decoder(commands.clone(), &clock);
    let engine = StreamingEngine::start(config, storage, decoder, clock.clone(), mailbox, link)
        .expect("engine starts");
    Harness {
        engine,
        commands,
        display,
        clock,
    }
}

pub fn harness(storage: MemoryStorage) -> Harness {
    harness_with(EngineConfig::default(), storage, TestClock::new(), |_, _| {
        RecordingDecoder::new()
    })
}
