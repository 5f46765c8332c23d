//! Collaborator traits for Reel
//!
//! The streaming engine talks to hardware only through these traits. Board
//! support code implements them on top of the SPI decoder and SD card
//! drivers; tests and the host simulator provide in-memory or filesystem
//! versions.
use crate::error::Result;
use crate::types::{StorageKey, Volume};
use std::io::{BufRead, Read, Seek};
use std::time::{Duration, Instant};

/// Opaque compressed-audio decoder
///
/// The decoder is stateless across track boundaries except for volume, which
/// persists until the next `set_volume`.
pub trait Decoder: Send {
    /// Return the decoder to a known idle state
    ///
    /// # Errors
    /// Returns an error if the device does not acknowledge the reset
    fn reset(&mut self) -> Result<()>;

    /// Apply an output volume
    fn set_volume(&mut self, volume: Volume) -> Result<()>;

    /// Hand one chunk of compressed audio to the decoder
    ///
    /// Blocks until the decoder has accepted the whole chunk.
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()>;
}

/// Removable storage holding the track index and the track files
///
/// Seeking is done on the storage side; the decoder never seeks.
pub trait Storage: Send {
    /// Line reader over the index file
    type Index: BufRead;

    /// Readable, seekable track file
    type File: Read + Seek;

    /// Open the index that maps storage keys to titles
    ///
    /// # Errors
    /// Returns an error if the index is missing or unreadable
    fn open_index(&self) -> Result<Self::Index>;

    /// Open the backing file of a track
    fn open(&self, key: &StorageKey) -> Result<Self::File>;
}

/// Monotonic time source and scheduler tick
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;

    /// Give up the processor for (at least) the given duration
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
