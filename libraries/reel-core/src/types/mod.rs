//! Domain types shared by every Reel worker

mod player;
mod track;
mod volume;

pub use player::{Command, ControlEvent, InputCommand, PlayerState, StopProgress};
pub use track::{StorageKey, TrackTitle, STORAGE_KEY_LEN, TRACK_TITLE_LEN};
pub use volume::Volume;
