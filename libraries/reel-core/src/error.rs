/// Core error types for Reel
use thiserror::Error;

/// Result type alias using `ReelError`
pub type Result<T> = std::result::Result<T, ReelError>;

/// Core error type for Reel
#[derive(Error, Debug)]
pub enum ReelError {
    /// The storage index could not be opened
    #[error("Storage index unavailable: {0}")]
    IndexUnavailable(String),

    /// Every index entry was pruned (or the index had none)
    #[error("Playlist is empty after validating {checked} index entries")]
    EmptyPlaylist { checked: usize },

    /// A track's backing file could not be opened or read
    #[error("Storage error: {0}")]
    Storage(String),

    /// The decoder rejected a command or data chunk
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Malformed index line
    #[error("Malformed index line {line}: {reason}")]
    MalformedIndex { line: usize, reason: String },

    /// A reject-policy mailbox already held a message
    #[error("Mailbox full")]
    MailboxFull,

    /// Every sender of a mailbox has been dropped
    #[error("Mailbox disconnected")]
    MailboxDisconnected,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReelError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a decoder error
    pub fn decoder(msg: impl Into<String>) -> Self {
        Self::Decoder(msg.into())
    }

    /// Create a malformed index error
    pub fn malformed_index(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedIndex {
            line,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error leaves the player with nothing to play
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::IndexUnavailable(_) | Self::EmptyPlaylist { .. })
    }
}
