//! Reel Simulator Library
//!
//! Runs the Reel control core on a desktop host: a directory stands in for
//! the SD card, a paced sink stands in for the decoder, and stdin stands in
//! for the touch screen.
//!
//! This library exposes the components for testing purposes.

pub mod config;
pub mod console;
pub mod decoder;
pub mod display;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::SimulatorConfig;
pub use console::{Console, ConsoleCommand};
pub use decoder::{DecoderStats, PacedDecoder};
pub use display::spawn_display;
pub use error::{Result, SimError};
pub use storage::{prepare_card, FsStorage, AUDIO_EXTENSIONS};
