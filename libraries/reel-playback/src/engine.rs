//! Streaming engine
//!
//! Owns the playlist and the decoder. Between tracks it applies commands
//! directly; while a track is playing it moves the file to the decoder one
//! chunk at a time and polls its command mailbox before every chunk, so a
//! new command takes effect within one chunk transfer.

use crate::config::EngineConfig;
use crate::cursor::PlaybackCursor;
use crate::display::DisplayLink;
use crate::playlist::{Playlist, Track};
use reel_core::{
    Clock, Command, ControlEvent, Decoder, Mailbox, PlayerState, Result, Storage, Volume,
};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Whether the engine keeps running after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Every command sender is gone
    PowerOff,
}

/// Why a track transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The whole file was sent, or the rest could not be read
    EndOfTrack,
    /// Stop was requested; the playlist is back at its head
    Stopped,
    /// Skip moved to the next track
    Skipped,
    /// Restart moved to the previous track or replays the current one
    Restarted,
    /// The track file could not be opened
    Unavailable,
    /// The decoder rejected a write
    DecoderFault,
    /// Every command sender is gone
    PowerOff,
}

impl TransferOutcome {
    /// Whether the playlist moves on to the next track afterwards
    pub fn advances(self) -> bool {
        matches!(self, TransferOutcome::EndOfTrack | TransferOutcome::Unavailable)
    }
}

/// The streaming engine worker
pub struct StreamingEngine<S: Storage, D: Decoder, C: Clock> {
    config: EngineConfig,
    storage: S,
    decoder: D,
    clock: C,
    playlist: Playlist,
    commands: Mailbox<Command>,
    display: DisplayLink,
    state: PlayerState,
    control: ControlEvent,
    volume: Volume,
    buffer: Vec<u8>,
}

impl<S: Storage, D: Decoder, C: Clock> StreamingEngine<S, D, C> {
    /// Initialise the decoder and build the playlist
    ///
    /// Publishes the title of the first track and the initial volume on
    /// success.
    ///
    /// # Errors
    /// - [`ReelError::Config`](reel_core::ReelError::Config) for an invalid
    ///   configuration
    /// - decoder errors from the initial reset or volume
    /// - [`ReelError::IndexUnavailable`](reel_core::ReelError::IndexUnavailable)
    ///   or [`ReelError::EmptyPlaylist`](reel_core::ReelError::EmptyPlaylist)
    ///   if there is nothing to play
    pub fn start(
        config: EngineConfig,
        storage: S,
        mut decoder: D,
        clock: C,
        commands: Mailbox<Command>,
        display: DisplayLink,
    ) -> Result<Self> {
        config.validate()?;

        let volume = Volume::new(config.initial_volume);
        decoder.reset()?;
        decoder.set_volume(volume)?;

        let playlist = Playlist::build(&storage)?;
        let buffer = vec![0; config.chunk_size];

        let engine = Self {
            config,
            storage,
            decoder,
            clock,
            playlist,
            commands,
            display,
            state: PlayerState::Stopped,
            control: ControlEvent::None,
            volume,
            buffer,
        };
        engine.publish_title();
        engine.publish_volume();
        info!(
            "Streaming engine ready: {} tracks, volume {}%",
            engine.playlist.len(),
            engine.volume.percent()
        );
        Ok(engine)
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run until power-off
    pub fn run(mut self) {
        info!("Streaming engine started");
        while self.step() == Flow::Continue {}
        if let Err(e) = self.decoder.reset() {
            warn!("Failed to reset decoder on shutdown: {}", e);
        }
        info!("Streaming engine stopped");
    }

    /// One pass of the outer loop
    ///
    /// Takes the latest command, then either streams the current track to
    /// completion (`Playing`) or applies the pending control and idles for
    /// one tick.
    pub fn step(&mut self) -> Flow {
        if !self.receive_command() {
            return Flow::PowerOff;
        }

        match self.state {
            PlayerState::Playing => {
                let outcome = self.stream_current();
                self.control = ControlEvent::None;
                if outcome == TransferOutcome::PowerOff {
                    return Flow::PowerOff;
                }
            }
            PlayerState::Stopped => {
                match self.control.take() {
                    ControlEvent::Skip => {
                        self.playlist.advance();
                        self.publish_title();
                    }
                    ControlEvent::Restart => {
                        self.playlist.retreat();
                        self.publish_title();
                    }
                    control => self.adjust_volume(control),
                }
                self.clock.sleep(self.config.tick);
            }
            PlayerState::Paused | PlayerState::FastForwarding | PlayerState::Rewinding => {
                // Nothing in flight to pause or scrub
                let control = self.control.take();
                self.adjust_volume(control);
                self.clock.sleep(self.config.tick);
            }
        }
        Flow::Continue
    }

    /// Latest command, if any; `false` once every sender is gone
    fn receive_command(&mut self) -> bool {
        match self.commands.accept() {
            Ok(Some(command)) => {
                debug!(%command, "command received");
                self.state = command.state;
                self.control = command.control;
                true
            }
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Stream the current track and move the playlist as the outcome requires
    pub fn stream_current(&mut self) -> TransferOutcome {
        let track = self.playlist.current().clone();
        info!("Playing '{}'", track.title);
        self.publish_progress(0.0);

        let outcome = match self.open_track(&track) {
            Ok((mut file, length)) => self.transfer(&mut file, length),
            Err(e) => {
                warn!("Cannot open '{}': {}", track.storage_key, e);
                self.clock.sleep(self.config.tick);
                TransferOutcome::Unavailable
            }
        };
        debug!(?outcome, "transfer finished");
        if outcome == TransferOutcome::DecoderFault {
            // The track is retried on the next pass; give the decoder a tick
            self.clock.sleep(self.config.tick);
        }

        if outcome.advances() {
            self.playlist.advance();
            self.publish_title();
        }
        self.publish_progress(0.0);
        if let Err(e) = self.decoder.reset() {
            warn!("Failed to reset decoder: {}", e);
        }
        outcome
    }

    fn open_track(&self, track: &Track) -> Result<(S::File, u64)> {
        let mut file = self.storage.open(&track.storage_key)?;
        let length = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        Ok((file, length))
    }

    fn prepare_decoder(&mut self) -> Result<()> {
        self.decoder.reset()?;
        self.decoder.set_volume(self.volume)
    }

    fn transfer(&mut self, file: &mut S::File, length: u64) -> TransferOutcome {
        if let Err(e) = self.prepare_decoder() {
            error!("Decoder not ready: {}", e);
            return TransferOutcome::DecoderFault;
        }

        let chunk = self.config.chunk_size as u64;
        let mut cursor = PlaybackCursor::new(length, self.clock.now());
        let mut transfers: u32 = 0;

        loop {
            if cursor.is_exhausted() {
                return TransferOutcome::EndOfTrack;
            }
            if !self.receive_command() {
                return TransferOutcome::PowerOff;
            }

            let mut exit = None;
            match self.state {
                PlayerState::Stopped => {
                    self.playlist.rewind_to_head();
                    self.publish_title();
                    exit = Some(TransferOutcome::Stopped);
                }
                PlayerState::Paused => {}
                PlayerState::Playing | PlayerState::FastForwarding | PlayerState::Rewinding => {
                    let target = match self.state {
                        PlayerState::FastForwarding => Some(
                            cursor.fast_forward_target(self.config.fast_forward_stride(), chunk),
                        ),
                        PlayerState::Rewinding => {
                            Some(cursor.rewind_target(self.config.rewind_stride(), chunk))
                        }
                        _ => None,
                    };
                    if let Some(target) = target {
                        match file.seek(SeekFrom::Start(target)) {
                            Ok(_) => cursor.seek_to(target),
                            Err(e) => {
                                warn!("Seek to byte {} failed: {}", target, e);
                                return TransferOutcome::EndOfTrack;
                            }
                        }
                    }

                    exit = self.transfer_chunk(file, &mut cursor);

                    if transfers % self.config.progress_interval == 0 {
                        self.publish_progress(cursor.progress());
                    }
                    transfers = transfers.wrapping_add(1);
                }
            }

            match self.control.take() {
                ControlEvent::None => {}
                ControlEvent::Skip => {
                    self.playlist.advance();
                    self.publish_title();
                    if exit != Some(TransferOutcome::Stopped) {
                        exit = Some(TransferOutcome::Skipped);
                    }
                }
                ControlEvent::Restart => {
                    let elapsed = cursor.elapsed(self.clock.now());
                    if elapsed <= self.config.restart_window {
                        self.playlist.retreat();
                        self.publish_title();
                    } else {
                        debug!(?elapsed, "restarting current track");
                    }
                    if exit != Some(TransferOutcome::Stopped) {
                        exit = Some(TransferOutcome::Restarted);
                    }
                }
                control => self.adjust_volume(control),
            }

            if let Some(outcome) = exit {
                return outcome;
            }
            if self.state == PlayerState::Paused {
                self.clock.sleep(self.config.tick);
            }
        }
    }

    /// Move one chunk from `file` to the decoder
    ///
    /// Returns the outcome that ends the transfer, if any.
    fn transfer_chunk(
        &mut self,
        file: &mut S::File,
        cursor: &mut PlaybackCursor,
    ) -> Option<TransferOutcome> {
        loop {
            match file.read(&mut self.buffer) {
                Ok(0) => return Some(TransferOutcome::EndOfTrack),
                Ok(read) => {
                    return match self.decoder.write_chunk(&self.buffer[..read]) {
                        Ok(()) => {
                            cursor.consume(read as u64);
                            None
                        }
                        Err(e) => {
                            error!("Decoder rejected chunk at byte {}: {}", cursor.offset(), e);
                            Some(TransferOutcome::DecoderFault)
                        }
                    };
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Read failed at byte {}: {}", cursor.offset(), e);
                    return Some(TransferOutcome::EndOfTrack);
                }
            }
        }
    }

    fn adjust_volume(&mut self, control: ControlEvent) {
        let changed = match control {
            ControlEvent::VolumeUp => self.volume.increase(),
            ControlEvent::VolumeDown => self.volume.decrease(),
            _ => return,
        };
        if !changed {
            debug!("Volume already at {}%", self.volume.percent());
            return;
        }
        info!("Volume {}%", self.volume.percent());
        if let Err(e) = self.decoder.set_volume(self.volume) {
            warn!("Failed to set volume: {}", e);
        }
        self.publish_volume();
    }

    fn publish_title(&self) {
        if let Err(e) = self.display.publish_title(&self.playlist.current().title) {
            warn!("Failed to publish title: {}", e);
        }
    }

    fn publish_volume(&self) {
        if let Err(e) = self.display.publish_volume(self.volume) {
            warn!("Failed to publish volume: {}", e);
        }
    }

    fn publish_progress(&self, percent: f32) {
        if let Err(e) = self.display.publish_progress(percent) {
            warn!("Failed to publish progress: {}", e);
        }
    }
}

impl<S, D, C> StreamingEngine<S, D, C>
where
    S: Storage + 'static,
    D: Decoder + 'static,
    C: Clock + 'static,
{
    /// Start the engine on its own thread
    ///
    /// Startup errors are logged and returned through the join handle.
    pub fn spawn(
        config: EngineConfig,
        storage: S,
        decoder: D,
        clock: C,
        commands: Mailbox<Command>,
        display: DisplayLink,
    ) -> Result<JoinHandle<Result<()>>> {
        let handle = thread::Builder::new()
            .name("streaming-engine".to_string())
            .spawn(move || {
                let engine = match Self::start(config, storage, decoder, clock, commands, display) {
                    Ok(engine) => engine,
                    Err(e) => {
                        error!("Streaming engine failed to start: {}", e);
                        return Err(e);
                    }
                };
                engine.run();
                Ok(())
            })?;
        Ok(handle)
    }
}
