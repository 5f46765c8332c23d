//! Reel Core
//!
//! Platform-agnostic types, collaborator traits and error handling for the
//! Reel embedded player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlayerState`, `ControlEvent`, `Command`, `Volume`,
//!   bounded `TrackTitle` / `StorageKey` strings
//! - **Collaborator Traits**: `Decoder`, `Storage`, `Clock`
//! - **Mailboxes**: single-slot channels with overwrite or reject semantics
//! - **Error Handling**: unified `ReelError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use reel_core::{mailbox, Command, ControlEvent, PlayerState, PostPolicy};
//!
//! let (postbox, mailbox) = mailbox::<Command>(PostPolicy::Overwrite);
//!
//! postbox.post(Command::new(PlayerState::Playing, ControlEvent::None)).unwrap();
//! postbox.post(Command::new(PlayerState::Paused, ControlEvent::None)).unwrap();
//!
//! // Most recent command wins
//! let received = mailbox.accept().unwrap();
//! assert_eq!(received.map(|c| c.state), Some(PlayerState::Paused));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod mailbox;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ReelError, Result};
pub use mailbox::{mailbox, Mailbox, PostPolicy, Postbox};
pub use traits::{Clock, Decoder, Storage, SystemClock};
pub use types::{
    Command, ControlEvent, InputCommand, PlayerState, StopProgress, StorageKey, TrackTitle,
    Volume, STORAGE_KEY_LEN, TRACK_TITLE_LEN,
};
