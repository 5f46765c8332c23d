//! Streaming engine configuration

use reel_core::{ReelError, Result, Volume};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the streaming engine
///
/// Defaults match the VS1053 board: 32-byte decoder FIFO writes, 20-chunk
/// scrub jumps, a progress report every 40 transfers and a 2 second
/// restart window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes per decoder write (default: 32)
    pub chunk_size: usize,

    /// Chunks skipped per fast-forward transfer (default: 20)
    pub fast_forward_multiplier: u32,

    /// Chunks rewound per rewind transfer (default: 20)
    pub rewind_multiplier: u32,

    /// Transfers between progress reports (default: 40)
    pub progress_interval: u32,

    /// Restart within this window goes to the previous track (default: 2s)
    #[serde(with = "millis")]
    pub restart_window: Duration,

    /// Scheduling tick used while paused or idle (default: 1ms)
    #[serde(with = "millis")]
    pub tick: Duration,

    /// Volume step applied at startup (default: 6, i.e. 60%)
    pub initial_volume: u8,
}

impl EngineConfig {
    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ReelError::config("chunk_size must be at least 1 byte"));
        }
        if self.fast_forward_multiplier == 0 || self.rewind_multiplier == 0 {
            return Err(ReelError::config("scrub multipliers must be at least 1"));
        }
        if self.progress_interval == 0 {
            return Err(ReelError::config("progress_interval must be at least 1"));
        }
        if self.tick.is_zero() {
            return Err(ReelError::config("tick must be non-zero"));
        }
        if self.initial_volume > Volume::MAX_STEP {
            return Err(ReelError::config(format!(
                "initial_volume must be at most {}",
                Volume::MAX_STEP
            )));
        }
        Ok(())
    }

    /// Bytes jumped forward per fast-forward transfer
    pub fn fast_forward_stride(&self) -> u64 {
        self.fast_forward_multiplier as u64 * self.chunk_size as u64
    }

    /// Bytes jumped back per rewind transfer
    pub fn rewind_stride(&self) -> u64 {
        self.rewind_multiplier as u64 * self.chunk_size as u64
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            fast_forward_multiplier: 20,
            rewind_multiplier: 20,
            progress_interval: 40,
            restart_window: Duration::from_secs(2),
            tick: Duration::from_millis(1),
            initial_volume: Volume::POWER_ON_STEP,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.fast_forward_multiplier, 20);
        assert_eq!(config.progress_interval, 40);
        assert_eq!(config.restart_window, Duration::from_secs(2));
        assert_eq!(config.initial_volume, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn strides() {
        let config = EngineConfig::default();
        assert_eq!(config.fast_forward_stride(), 640);
        assert_eq!(config.rewind_stride(), 640);
    }

    #[test]
    fn rejects_zero_chunk() {
        let config = EngineConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ReelError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let config = EngineConfig {
            initial_volume: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
