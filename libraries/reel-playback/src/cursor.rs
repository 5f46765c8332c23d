//! Position within the track being streamed

use std::time::Duration;

/// Byte position, file length and start time of the current transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    offset: u64,
    length: u64,
    started_at: Duration,
}

impl PlaybackCursor {
    pub fn new(length: u64, started_at: Duration) -> Self {
        Self {
            offset: 0,
            length,
            started_at,
        }
    }

    /// Bytes already handed to the decoder (or seeked past)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Bytes left before end of file
    pub fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.offset)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Record `bytes` transferred
    pub fn consume(&mut self, bytes: u64) {
        self.offset = self.offset.saturating_add(bytes).min(self.length);
    }

    /// Jump to an absolute offset
    pub fn seek_to(&mut self, offset: u64) {
        self.offset = offset.min(self.length);
    }

    /// Percentage of the file transferred, 0.0 to 100.0
    pub fn progress(&self) -> f32 {
        if self.length == 0 {
            return 0.0;
        }
        (self.offset as f64 * 100.0 / self.length as f64) as f32
    }

    /// Time since the transfer started
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Offset a fast-forward jump lands on
    pub fn fast_forward_target(&self, stride: u64, chunk: u64) -> u64 {
        fast_forward_target(self.offset, self.length, stride, chunk)
    }

    /// Offset a rewind jump lands on
    pub fn rewind_target(&self, stride: u64, chunk: u64) -> u64 {
        rewind_target(self.offset, self.length, stride, chunk)
    }
}

/// Last offset that still leaves a full chunk to read
fn last_chunk_start(length: u64, chunk: u64) -> u64 {
    length.saturating_sub(chunk)
}

/// Jump forward by `stride`, never past the start of the final chunk
pub fn fast_forward_target(offset: u64, length: u64, stride: u64, chunk: u64) -> u64 {
    offset
        .saturating_add(stride)
        .min(last_chunk_start(length, chunk))
}

/// Jump back by `stride`, never before the start of the file
pub fn rewind_target(offset: u64, length: u64, stride: u64, chunk: u64) -> u64 {
    offset
        .saturating_sub(stride)
        .min(last_chunk_start(length, chunk))
}
