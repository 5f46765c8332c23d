//! Display channels
//!
//! The display is a passive consumer. It owns five overwrite mailboxes
//! (command, title, progress, stop progress and volume) and rebuilds a
//! [`DisplaySnapshot`] from whatever is pending. Volume comes from the
//! streaming engine, which owns the level applied to the decoder.

use reel_core::{
    mailbox, Command, Mailbox, PlayerState, PostPolicy, Postbox, ReelError, Result, StopProgress,
    TrackTitle, Volume,
};
use serde::Serialize;
use std::time::Duration;

/// Sending side held by the translator and the streaming engine
#[derive(Debug, Clone)]
pub struct DisplayLink {
    command: Postbox<Command>,
    title: Postbox<TrackTitle>,
    progress: Postbox<f32>,
    stop_progress: Postbox<StopProgress>,
    volume: Postbox<Volume>,
}

/// Receiving side owned by the display
#[derive(Debug)]
pub struct DisplayPort {
    command: Mailbox<Command>,
    title: Mailbox<TrackTitle>,
    progress: Mailbox<f32>,
    stop_progress: Mailbox<StopProgress>,
    volume: Mailbox<Volume>,
}

/// Number of mailboxes behind a display link
const MAILBOXES: usize = 5;

/// Create the display mailboxes
pub fn display_channels() -> (DisplayLink, DisplayPort) {
    let (command_tx, command_rx) = mailbox(PostPolicy::Overwrite);
    let (title_tx, title_rx) = mailbox(PostPolicy::Overwrite);
    let (progress_tx, progress_rx) = mailbox(PostPolicy::Overwrite);
    let (stop_tx, stop_rx) = mailbox(PostPolicy::Overwrite);
    let (volume_tx, volume_rx) = mailbox(PostPolicy::Overwrite);

    let link = DisplayLink {
        command: command_tx,
        title: title_tx,
        progress: progress_tx,
        stop_progress: stop_tx,
        volume: volume_tx,
    };
    let port = DisplayPort {
        command: command_rx,
        title: title_rx,
        progress: progress_rx,
        stop_progress: stop_rx,
        volume: volume_rx,
    };
    (link, port)
}

impl DisplayLink {
    pub fn publish_command(&self, command: Command) -> Result<()> {
        self.command.post(command)
    }

    pub fn publish_title(&self, title: &TrackTitle) -> Result<()> {
        self.title.post(title.clone())
    }

    /// Publish playback progress in percent
    pub fn publish_progress(&self, percent: f32) -> Result<()> {
        self.progress.post(percent.clamp(0.0, 100.0))
    }

    pub fn publish_stop_progress(&self, progress: StopProgress) -> Result<()> {
        self.stop_progress.post(progress)
    }

    /// Publish the volume level the decoder is playing at
    pub fn publish_volume(&self, volume: Volume) -> Result<()> {
        self.volume.post(volume)
    }
}

/// Everything the screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub state: PlayerState,
    pub title: TrackTitle,
    /// Percent of the current track transferred
    pub progress: f32,
    pub stop_progress: StopProgress,
    pub volume: Volume,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            state: PlayerState::Stopped,
            title: TrackTitle::default(),
            progress: 0.0,
            stop_progress: StopProgress::default(),
            volume: Volume::default(),
        }
    }
}

impl DisplayPort {
    /// Apply every pending message to `snapshot`
    ///
    /// Returns whether anything changed.
    ///
    /// # Errors
    /// [`ReelError::MailboxDisconnected`] once every mailbox is empty
    /// and every sender is gone
    pub fn poll(&self, snapshot: &mut DisplaySnapshot) -> Result<bool> {
        let mut changed = false;
        let mut disconnected = 0;

        match self.command.accept() {
            Ok(Some(command)) => {
                snapshot.state = command.state;
                changed = true;
            }
            Ok(None) => {}
            Err(_) => disconnected += 1,
        }
        match self.title.accept() {
            Ok(Some(title)) => {
                snapshot.title = title;
                changed = true;
            }
            Ok(None) => {}
            Err(_) => disconnected += 1,
        }
        match self.progress.accept() {
            Ok(Some(progress)) => {
                snapshot.progress = progress;
                changed = true;
            }
            Ok(None) => {}
            Err(_) => disconnected += 1,
        }
        match self.stop_progress.accept() {
            Ok(Some(progress)) => {
                snapshot.stop_progress = progress;
                changed = true;
            }
            Ok(None) => {}
            Err(_) => disconnected += 1,
        }
        match self.volume.accept() {
            Ok(Some(volume)) => {
                snapshot.volume = volume;
                changed = true;
            }
            Ok(None) => {}
            Err(_) => disconnected += 1,
        }

        if disconnected == MAILBOXES {
            return Err(ReelError::MailboxDisconnected);
        }
        Ok(changed)
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for the first
    /// change
    pub fn wait(
        &self,
        snapshot: &mut DisplaySnapshot,
        timeout: Duration,
        step: Duration,
    ) -> Result<bool> {
        let mut waited = Duration::ZERO;
        loop {
            if self.poll(snapshot)? {
                return Ok(true);
            }
            if waited >= timeout {
                return Ok(false);
            }
            std::thread::sleep(step);
            waited += step;
        }
    }
}
