//! Decoder stand-in
//!
//! Accepts chunks at a fixed byte rate, the way the real decoder's FIFO
//! throttles the SPI writer, and counts what it receives.

use reel_core::{Decoder, Result, Volume};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Lateness tolerated before the pacing window restarts
const DRAIN_SLACK: Duration = Duration::from_millis(20);

/// Counters shared with the caller after the decoder moves into the engine
#[derive(Debug, Default)]
pub struct DecoderStats {
    bytes: AtomicU64,
    resets: AtomicU64,
    volume_step: AtomicU8,
}

impl DecoderStats {
    /// Bytes accepted since start
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }

    /// Last volume applied
    pub fn volume(&self) -> Volume {
        Volume::new(self.volume_step.load(Ordering::Relaxed))
    }
}

/// Byte-rate limited sink
#[derive(Debug)]
pub struct PacedDecoder {
    byte_rate: u64,
    stats: Arc<DecoderStats>,
    /// Start of the current pacing window
    window_start: Instant,
    window_bytes: u64,
}

impl PacedDecoder {
    /// Create a decoder that accepts `byte_rate` bytes per second
    pub fn new(byte_rate: u64) -> Self {
        Self {
            byte_rate: byte_rate.max(1),
            stats: Arc::new(DecoderStats::default()),
            window_start: Instant::now(),
            window_bytes: 0,
        }
    }

    pub fn stats(&self) -> Arc<DecoderStats> {
        Arc::clone(&self.stats)
    }

    /// Time the decoder needs to play `bytes` at its rate
    fn play_time(&self, bytes: u64) -> Duration {
        Duration::from_micros(bytes.saturating_mul(1_000_000) / self.byte_rate)
    }
}

impl Decoder for PacedDecoder {
    fn reset(&mut self) -> Result<()> {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        self.window_start = Instant::now();
        self.window_bytes = 0;
        debug!("Decoder reset");
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume) -> Result<()> {
        self.stats.volume_step.store(volume.step(), Ordering::Relaxed);
        debug!(
            "Decoder volume {}% (attenuation 0x{:02X})",
            volume.percent(),
            volume.attenuation()
        );
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let bytes = chunk.len() as u64;
        self.stats.bytes.fetch_add(bytes, Ordering::Relaxed);

        // An idle FIFO has drained: start a new window instead of banking
        // the idle time as credit
        if self.window_start.elapsed() > self.play_time(self.window_bytes) + DRAIN_SLACK {
            self.window_start = Instant::now();
            self.window_bytes = 0;
        }
        self.window_bytes += bytes;

        // Block until the FIFO would have drained this far
        let due = self.play_time(self.window_bytes);
        let elapsed = self.window_start.elapsed();
        if due > elapsed {
            std::thread::sleep(due - elapsed);
        }
        trace!(bytes = chunk.len(), "chunk accepted");
        Ok(())
    }
}
