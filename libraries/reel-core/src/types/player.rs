//! Player state, one-shot controls and the command pair sent between workers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steady-state player mode
///
/// Exactly one state is active at a time. The translator owns the canonical
/// copy; the streaming engine keeps the last one it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// Nothing is streaming
    #[default]
    Stopped,

    /// Streaming the current track
    Playing,

    /// Transfer suspended mid-track
    Paused,

    /// Scrubbing forward through the current track
    FastForwarding,

    /// Scrubbing backward through the current track
    Rewinding,
}

impl PlayerState {
    /// All states, in declaration order
    pub const ALL: [PlayerState; 5] = [
        PlayerState::Stopped,
        PlayerState::Playing,
        PlayerState::Paused,
        PlayerState::FastForwarding,
        PlayerState::Rewinding,
    ];

    /// Whether the state scrubs through the track
    pub fn is_scrubbing(self) -> bool {
        matches!(self, PlayerState::FastForwarding | PlayerState::Rewinding)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Stopped => "stopped",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::FastForwarding => "fast-forwarding",
            PlayerState::Rewinding => "rewinding",
        };
        f.write_str(name)
    }
}

/// One-shot control carried alongside a state
///
/// Valid for exactly one consuming cycle; the receiver clears it after use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlEvent {
    /// No pending control
    #[default]
    None,

    /// Move to the next track
    Skip,

    /// Replay the current track, or go back one if it just started
    Restart,

    /// Raise the volume one step
    VolumeUp,

    /// Lower the volume one step
    VolumeDown,
}

impl ControlEvent {
    /// Whether a control is pending
    pub fn is_some(self) -> bool {
        self != ControlEvent::None
    }

    /// Whether the control only touches the volume
    pub fn is_volume(self) -> bool {
        matches!(self, ControlEvent::VolumeUp | ControlEvent::VolumeDown)
    }

    /// Take the control, leaving `None` behind
    pub fn take(&mut self) -> ControlEvent {
        std::mem::take(self)
    }
}

/// The message published by the translator: a desired state plus a one-shot control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Command {
    /// Desired player state
    pub state: PlayerState,

    /// One-shot control to perform
    pub control: ControlEvent,
}

impl Command {
    /// Create a command
    pub const fn new(state: PlayerState, control: ControlEvent) -> Self {
        Self { state, control }
    }

    /// A command that only changes state
    pub const fn state(state: PlayerState) -> Self {
        Self::new(state, ControlEvent::None)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.control {
            ControlEvent::None => write!(f, "{}", self.state),
            control => write!(f, "{} + {:?}", self.state, control),
        }
    }
}

/// Raw user intent, as identified by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputCommand {
    Play,
    Stop,
    Skip,
    Restart,
    FastForward,
    Rewind,
    VolumeUp,
    VolumeDown,
}

impl InputCommand {
    /// All inputs, in declaration order
    pub const ALL: [InputCommand; 8] = [
        InputCommand::Play,
        InputCommand::Stop,
        InputCommand::Skip,
        InputCommand::Restart,
        InputCommand::FastForward,
        InputCommand::Rewind,
        InputCommand::VolumeUp,
        InputCommand::VolumeDown,
    ];
}

/// Hold-to-stop countdown shown while the play button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StopProgress {
    /// Count at which the stop fires
    pub max_count: u32,

    /// Counts elapsed so far (0 clears the indicator)
    pub current_count: u32,
}

impl StopProgress {
    /// Create a countdown indicator
    pub fn new(max_count: u32, current_count: u32) -> Self {
        Self {
            max_count,
            current_count: current_count.min(max_count),
        }
    }

    /// Fraction of the hold completed, in `[0.0, 1.0]`
    pub fn fraction(&self) -> f32 {
        if self.max_count == 0 {
            0.0
        } else {
            self.current_count as f32 / self.max_count as f32
        }
    }

    /// Whether the indicator should be hidden
    pub fn is_cleared(&self) -> bool {
        self.current_count == 0
    }
}
