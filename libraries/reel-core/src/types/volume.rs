//! Stepped decoder volume
//!
//! The decoder takes an 8-bit attenuation in 0.5 dB units (`0x00` loudest,
//! `0xFE` silent). The player exposes ten steps of 10 % each and maps every
//! step onto an attenuation byte.

use serde::{Deserialize, Serialize};

/// Saturating volume level in steps of 10 %
///
/// Step 0 is silence, step 10 is full scale. Increments and decrements
/// saturate at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Volume {
    /// Volume step (0-10)
    step: u8,
}

impl Volume {
    /// Highest step (100 %)
    pub const MAX_STEP: u8 = 10;

    /// Attenuation sent for step 0
    pub const SILENT_ATTENUATION: u8 = 0xFE;

    /// Attenuation added per step below full scale (6 dB)
    pub const ATTENUATION_PER_STEP: u8 = 0x0C;

    /// Power-on volume step (60 %)
    pub const POWER_ON_STEP: u8 = 6;

    /// Create a volume at the given step
    ///
    /// Steps above [`Volume::MAX_STEP`] are clamped.
    pub fn new(step: u8) -> Self {
        Self {
            step: step.min(Self::MAX_STEP),
        }
    }

    /// Create a volume from a percentage, rounded down to the nearest step
    pub fn from_percent(percent: u8) -> Self {
        Self::new(percent.min(100) / 10)
    }

    /// Current step (0-10)
    pub fn step(&self) -> u8 {
        self.step
    }

    /// Current level as a percentage (0-100)
    pub fn percent(&self) -> u8 {
        self.step * 10
    }

    /// Raise one step; returns `false` when already at full scale
    pub fn increase(&mut self) -> bool {
        if self.step >= Self::MAX_STEP {
            return false;
        }
        self.step += 1;
        true
    }

    /// Lower one step; returns `false` when already silent
    pub fn decrease(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Decoder attenuation byte for this step
    ///
    /// - step 10 → `0x00` (0 dB)
    /// - step 6  → `0x30` (-24 dB)
    /// - step 1  → `0x6C` (-54 dB)
    /// - step 0  → `0xFE` (silence)
    pub fn attenuation(&self) -> u8 {
        if self.step == 0 {
            return Self::SILENT_ATTENUATION;
        }
        (Self::MAX_STEP - self.step) * Self::ATTENUATION_PER_STEP
    }

    /// Whether the decoder output is silent
    pub fn is_silent(&self) -> bool {
        self.step == 0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(Self::POWER_ON_STEP)
    }
}
