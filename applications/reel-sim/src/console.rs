//! Console input standing in for the touch screen
//!
//! Each stdin line is one gesture. Taps and holds are turned into the raw
//! press/release events the touch controller would produce.

use crate::error::{Result, SimError};
use reel_core::{Postbox, ReelError};
use reel_playback::{Button, GestureConfig, TouchEvent};
use std::io::BufRead;
use std::str::FromStr;
use std::thread;
use tracing::{info, warn};

/// Delivery attempts for one raw event before it is dropped
const POST_ATTEMPTS: u32 = 50;

/// One console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Press and release
    Tap(Button),
    /// Press and keep holding until `release`
    Hold(Button),
    Release,
    /// Hold play long enough to stop
    HoldPlay,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = SimError;

    fn from_str(line: &str) -> Result<Self> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "play" | "pause" | "p" => ConsoleCommand::Tap(Button::Play),
            "skip" | "next" | "n" => ConsoleCommand::Tap(Button::Skip),
            "restart" | "prev" | "b" => ConsoleCommand::Tap(Button::Restart),
            "vol+" | "+" => ConsoleCommand::Tap(Button::VolumeUp),
            "vol-" | "-" => ConsoleCommand::Tap(Button::VolumeDown),
            "ff" => ConsoleCommand::Hold(Button::Skip),
            "rw" => ConsoleCommand::Hold(Button::Restart),
            "release" | "r" => ConsoleCommand::Release,
            "stop" | "hold-play" => ConsoleCommand::HoldPlay,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(SimError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Posts raw touch events for console commands
pub struct Console {
    touches: Postbox<TouchEvent>,
    gestures: GestureConfig,
}

impl Console {
    pub fn new(touches: Postbox<TouchEvent>, gestures: GestureConfig) -> Self {
        Self { touches, gestures }
    }

    /// Post one raw event, waiting briefly for the translator to take the
    /// previous one
    fn post(&self, event: TouchEvent) -> Result<()> {
        for _ in 0..POST_ATTEMPTS {
            match self.touches.post(event) {
                Ok(()) => return Ok(()),
                Err(ReelError::MailboxFull) => thread::sleep(self.gestures.poll_interval / 2),
                Err(e) => return Err(e.into()),
            }
        }
        warn!("Touch input dropped: {:?}", event);
        Err(ReelError::MailboxFull.into())
    }

    /// Perform one command; returns `false` on quit
    pub fn execute(&self, command: ConsoleCommand) -> Result<bool> {
        match command {
            ConsoleCommand::Tap(button) => {
                self.post(TouchEvent::Press(button))?;
                self.post(TouchEvent::Release)?;
            }
            ConsoleCommand::Hold(button) => self.post(TouchEvent::Press(button))?,
            ConsoleCommand::Release => self.post(TouchEvent::Release)?,
            ConsoleCommand::HoldPlay => {
                self.post(TouchEvent::Press(Button::Play))?;
                let hold = self.gestures.hold_threshold
                    + self.gestures.stop_hold
                    + self.gestures.poll_interval * 2;
                thread::sleep(hold);
                self.post(TouchEvent::Release)?;
            }
            ConsoleCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Read commands until `quit`, end of input, or `keep_running` says stop
    pub fn run<R: BufRead>(&self, input: R, keep_running: impl Fn() -> bool) -> Result<()> {
        info!("Commands: play skip restart ff rw release vol+ vol- stop quit");
        for line in input.lines() {
            if !keep_running() {
                break;
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ConsoleCommand>() {
                Ok(command) => {
                    if !self.execute(command)? {
                        break;
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
        Ok(())
    }
}
