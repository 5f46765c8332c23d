//! Touch gesture recognition
//!
//! Turns press and release events on the on-screen buttons into player
//! inputs. A short tap maps directly to an input; holding a button changes
//! its meaning:
//!
//! | Button  | Tap          | Hold                                  |
//! |---------|--------------|---------------------------------------|
//! | Play    | `Play`       | stop countdown, `Stop` when it expires |
//! | Restart | `Restart`    | `Rewind` until released               |
//! | Skip    | `Skip`       | `FastForward` until released          |
//! | Volume  | `VolumeUp/Down` | same as tap                        |
//!
//! The recognizer is driven by explicit timestamps so it can be tested
//! without a real clock.

use reel_core::{InputCommand, StopProgress};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// On-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Play,
    Restart,
    Skip,
    VolumeDown,
    VolumeUp,
}

impl Button {
    /// Input produced by a short tap
    pub fn tap_input(self) -> InputCommand {
        match self {
            Button::Play => InputCommand::Play,
            Button::Restart => InputCommand::Restart,
            Button::Skip => InputCommand::Skip,
            Button::VolumeDown => InputCommand::VolumeDown,
            Button::VolumeUp => InputCommand::VolumeUp,
        }
    }
}

/// Raw event from the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchEvent {
    Press(Button),
    Release,
}

/// Outcome of gesture recognition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A player input for the translator
    Input(InputCommand),

    /// A scrub hold was released
    ScrubEnd,

    /// Stop-hold countdown progress for the display
    StopProgress(StopProgress),
}

/// Hold timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Press longer than this is a hold (default: 1s)
    pub hold_threshold: Duration,

    /// Extra hold time on Play before `Stop` fires (default: 2s)
    pub stop_hold: Duration,

    /// Granularity of the stop countdown (default: 100ms)
    pub countdown_step: Duration,

    /// How often the worker re-checks a held button (default: 20ms)
    pub poll_interval: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_threshold: Duration::from_secs(1),
            stop_hold: Duration::from_secs(2),
            countdown_step: Duration::from_millis(100),
            poll_interval: Duration::from_millis(20),
        }
    }
}

impl GestureConfig {
    /// Number of countdown steps in a full stop hold
    pub fn countdown_steps(&self) -> u32 {
        if self.countdown_step.is_zero() {
            return 1;
        }
        let steps = self.stop_hold.as_millis() / self.countdown_step.as_millis().max(1);
        u32::try_from(steps).unwrap_or(u32::MAX).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pressed, not yet a hold
    Pending,
    /// Skip or Restart held past the threshold
    Scrubbing,
    /// Play held, counting towards stop
    Countdown { count: u32 },
    /// Stop already fired; waiting for release
    Fired,
}

#[derive(Debug, Clone, Copy)]
struct Held {
    button: Button,
    since: Duration,
    phase: Phase,
}

/// Tracks one pressed button at a time
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    held: Option<Held>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, held: None }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Button currently held down, if any
    pub fn held(&self) -> Option<Button> {
        self.held.map(|h| h.button)
    }

    /// A button went down
    ///
    /// A second press while another button is held is ignored.
    pub fn press(&mut self, button: Button, now: Duration) -> Option<Gesture> {
        if self.held.is_none() {
            self.held = Some(Held {
                button,
                since: now,
                phase: Phase::Pending,
            });
        }
        None
    }

    /// Re-check the held button
    pub fn poll(&mut self, now: Duration) -> Option<Gesture> {
        let config = self.config;
        let max_count = config.countdown_steps();
        let held = self.held.as_mut()?;
        let elapsed = now.saturating_sub(held.since);
        if elapsed < config.hold_threshold {
            return None;
        }

        match (held.phase, held.button) {
            (Phase::Pending, Button::Skip) => {
                held.phase = Phase::Scrubbing;
                Some(Gesture::Input(InputCommand::FastForward))
            }
            (Phase::Pending, Button::Restart) => {
                held.phase = Phase::Scrubbing;
                Some(Gesture::Input(InputCommand::Rewind))
            }
            (Phase::Pending | Phase::Countdown { .. }, Button::Play) => {
                let counted = elapsed.saturating_sub(config.hold_threshold);
                if counted >= config.stop_hold {
                    held.phase = Phase::Fired;
                    return Some(Gesture::Input(InputCommand::Stop));
                }
                let count = countdown_count(counted, config.countdown_step, max_count);
                match held.phase {
                    Phase::Countdown { count: previous } if previous == count => None,
                    _ => {
                        held.phase = Phase::Countdown { count };
                        Some(Gesture::StopProgress(StopProgress::new(max_count, count)))
                    }
                }
            }
            _ => None,
        }
    }

    /// The held button was lifted
    pub fn release(&mut self, now: Duration) -> Option<Gesture> {
        let held = self.held.take()?;
        let elapsed = now.saturating_sub(held.since);
        let max_count = self.config.countdown_steps();

        match held.phase {
            // A scrub hold that no poll noticed never started scrubbing, so
            // it counts as a tap
            Phase::Pending => match held.button {
                Button::Play if elapsed >= self.config.hold_threshold => {
                    Some(Gesture::StopProgress(StopProgress::new(max_count, 0)))
                }
                button => Some(Gesture::Input(button.tap_input())),
            },
            Phase::Scrubbing => Some(Gesture::ScrubEnd),
            Phase::Countdown { .. } | Phase::Fired => {
                Some(Gesture::StopProgress(StopProgress::new(max_count, 0)))
            }
        }
    }
}

fn countdown_count(counted: Duration, step: Duration, max_count: u32) -> u32 {
    let step_ms = step.as_millis().max(1);
    let count = u32::try_from(counted.as_millis() / step_ms).unwrap_or(u32::MAX);
    count.min(max_count)
}
