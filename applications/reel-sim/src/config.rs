//! Simulator configuration
use crate::error::{Result, SimError};
use reel_playback::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "reel.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_card")]
    pub card: CardSettings,

    #[serde(default = "default_decoder")]
    pub decoder: DecoderSettings,

    #[serde(default = "default_display")]
    pub display: DisplaySettings,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardSettings {
    /// Directory standing in for the SD card root
    #[serde(default = "default_music_root")]
    pub music_root: PathBuf,

    /// Index file name inside the card root
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecoderSettings {
    /// Bytes per second the decoder stand-in accepts (128 kbit/s by default)
    #[serde(default = "default_byte_rate")]
    pub byte_rate: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplaySettings {
    /// Log snapshots as JSON lines
    #[serde(default)]
    pub json: bool,

    /// Minimum milliseconds between rendered snapshots
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
}

impl SimulatorConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `reel.toml` is used when
    /// present. Environment variables prefixed with `REEL_` override file
    /// values, with `__` between section and key
    /// (e.g. `REEL_CARD__MUSIC_ROOT`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SimError::Config(format!(
                        "config file {:?} not found",
                        path
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("REEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| SimError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| SimError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.card.music_root.is_dir() {
            return Err(SimError::Config(format!(
                "music root {:?} is not a directory",
                self.card.music_root
            )));
        }

        if self.card.index_file.is_empty() {
            return Err(SimError::Config("index_file must not be empty".to_string()));
        }

        if self.decoder.byte_rate == 0 {
            return Err(SimError::Config(
                "decoder byte_rate must be at least 1".to_string(),
            ));
        }

        self.engine.validate()?;
        Ok(())
    }
}

// Default values
fn default_card() -> CardSettings {
    CardSettings {
        music_root: default_music_root(),
        index_file: default_index_file(),
    }
}

fn default_music_root() -> PathBuf {
    PathBuf::from("./card")
}

fn default_index_file() -> String {
    "songs.txt".to_string()
}

fn default_decoder() -> DecoderSettings {
    DecoderSettings {
        byte_rate: default_byte_rate(),
    }
}

fn default_byte_rate() -> u64 {
    16_000
}

fn default_display() -> DisplaySettings {
    DisplaySettings {
        json: false,
        refresh_ms: default_refresh_ms(),
    }
}

fn default_refresh_ms() -> u64 {
    50
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            card: default_card(),
            decoder: default_decoder(),
            display: default_display(),
            engine: EngineConfig::default(),
        }
    }
}
