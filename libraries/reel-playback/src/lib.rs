//! Reel Playback - control core of the Reel player
//!
//! Three workers cooperate through single-slot mailboxes:
//!
//! - [`InputTranslator`] turns touch gestures into `(state, control)`
//!   commands
//! - [`StreamingEngine`] owns the [`Playlist`] and streams the current track
//!   to the decoder chunk by chunk, honouring commands mid-transfer
//! - the display consumes commands, titles and progress through a
//!   [`DisplayPort`]
//!
//! # Example
//!
//! ```
//! use reel_playback::{transition, Translator};
//! use reel_core::{Command, ControlEvent, InputCommand, PlayerState};
//!
//! let mut translator = Translator::new();
//! translator.translate(InputCommand::Play);
//! assert_eq!(
//!     translator.translate(InputCommand::Skip),
//!     Command::new(PlayerState::Playing, ControlEvent::Skip)
//! );
//! assert_eq!(transition(PlayerState::Stopped, InputCommand::FastForward), None);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod display;
pub mod engine;
pub mod gesture;
pub mod index;
pub mod playlist;
pub mod translator;

pub use config::EngineConfig;
pub use cursor::{fast_forward_target, rewind_target, PlaybackCursor};
pub use display::{display_channels, DisplayLink, DisplayPort, DisplaySnapshot};
pub use engine::{Flow, StreamingEngine, TransferOutcome};
pub use gesture::{Button, Gesture, GestureConfig, GestureRecognizer, TouchEvent};
pub use index::{numbered_key, parse_line, read_index, write_index, IndexEntry};
pub use playlist::{Playlist, Track, TrackId};
pub use translator::{transition, InputTranslator, Translator};
