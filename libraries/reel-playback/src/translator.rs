//! Input translator
//!
//! Turns raw user intent into `(state, control)` commands. The state machine
//! itself ([`transition`]) is a pure function; [`Translator`] keeps the
//! current state between inputs and [`InputTranslator`] is the worker that
//! wires it to the touch layer, the streaming engine and the display.

use crate::display::DisplayLink;
use crate::gesture::{Gesture, GestureConfig, GestureRecognizer, TouchEvent};
use reel_core::{
    Clock, Command, ControlEvent, InputCommand, Mailbox, PlayerState, Postbox, ReelError, Result,
};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Next command for `input` received in `state`
///
/// Returns `None` for pairs the player ignores (e.g. fast-forward while
/// stopped); the caller keeps its state unchanged in that case.
pub fn transition(state: PlayerState, input: InputCommand) -> Option<Command> {
    use ControlEvent as C;
    use InputCommand as I;
    use PlayerState as S;

    let command = match (state, input) {
        (_, I::Stop) => Command::state(S::Stopped),

        (S::Stopped | S::Paused | S::FastForwarding | S::Rewinding, I::Play) => {
            Command::state(S::Playing)
        }
        (S::Playing, I::Play) => Command::state(S::Paused),

        (S::Stopped, I::Skip) => Command::new(S::Stopped, C::Skip),
        (S::Playing | S::Paused, I::Skip) => Command::new(S::Playing, C::Skip),

        (S::Stopped, I::Restart) => Command::new(S::Stopped, C::Restart),
        (S::Playing | S::Paused, I::Restart) => Command::new(S::Playing, C::Restart),

        (S::Playing | S::Paused, I::FastForward) => Command::state(S::FastForwarding),
        (S::Playing | S::Paused, I::Rewind) => Command::state(S::Rewinding),

        (S::Stopped | S::Playing | S::Paused, I::VolumeUp) => Command::new(state, C::VolumeUp),
        (S::Stopped | S::Playing | S::Paused, I::VolumeDown) => Command::new(state, C::VolumeDown),

        _ => return None,
    };
    Some(command)
}

/// Stateful wrapper around [`transition`]
///
/// The control half of every command is one-shot: it is emitted once and
/// never carried into the next command.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    state: PlayerState,
}

impl Translator {
    /// Create a translator in the `Stopped` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current desired state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Apply one input and return the command to publish
    ///
    /// Ignored inputs yield the unchanged state with no control.
    pub fn translate(&mut self, input: InputCommand) -> Command {
        match transition(self.state, input) {
            Some(command) => {
                self.state = command.state;
                command
            }
            None => Command::state(self.state),
        }
    }

    /// Release of a scrub hold: resume playback if still scrubbing
    pub fn end_scrub(&mut self) -> Option<Command> {
        if self.state.is_scrubbing() {
            Some(self.translate(InputCommand::Play))
        } else {
            None
        }
    }
}

/// Input translator worker
///
/// Receives touch events, recognizes gestures, and publishes every resulting
/// command to the streaming engine and to the display. Stop-hold countdowns
/// go straight to the display.
pub struct InputTranslator<C: Clock> {
    translator: Translator,
    gestures: GestureRecognizer,
    engine: Postbox<Command>,
    display: DisplayLink,
    clock: C,
}

impl<C: Clock> InputTranslator<C> {
    /// Create a translator worker
    pub fn new(
        gesture_config: GestureConfig,
        engine: Postbox<Command>,
        display: DisplayLink,
        clock: C,
    ) -> Self {
        Self {
            translator: Translator::new(),
            gestures: GestureRecognizer::new(gesture_config),
            engine,
            display,
            clock,
        }
    }

    /// Current desired state
    pub fn state(&self) -> PlayerState {
        self.translator.state()
    }

    /// Feed one touch event
    pub fn handle_touch(&mut self, event: TouchEvent) {
        let now = self.clock.now();
        let gesture = match event {
            TouchEvent::Press(button) => self.gestures.press(button, now),
            TouchEvent::Release => self.gestures.release(now),
        };
        if let Some(gesture) = gesture {
            self.handle_gesture(gesture);
        }
    }

    /// Advance hold timers without a new touch event
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(gesture) = self.gestures.poll(now) {
            self.handle_gesture(gesture);
        }
    }

    /// Act on a recognized gesture
    pub fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Input(input) => {
                let command = self.translator.translate(input);
                debug!(?input, %command, "translated input");
                self.publish(command);
            }
            Gesture::ScrubEnd => {
                if let Some(command) = self.translator.end_scrub() {
                    debug!(%command, "scrub released");
                    self.publish(command);
                }
            }
            Gesture::StopProgress(progress) => {
                if let Err(e) = self.display.publish_stop_progress(progress) {
                    warn!("Failed to publish stop progress: {}", e);
                }
            }
        }
    }

    fn publish(&self, command: Command) {
        if let Err(e) = self.engine.post(command) {
            warn!("Failed to post command to streaming engine: {}", e);
        }
        if let Err(e) = self.display.publish_command(command) {
            warn!("Failed to post command to display: {}", e);
        }
    }

    /// Run until every touch sender is dropped
    pub fn run(mut self, touches: &Mailbox<TouchEvent>) {
        info!("Input translator started");
        let poll_interval = self.gestures.config().poll_interval;
        loop {
            match touches.pend(poll_interval) {
                Ok(Some(event)) => self.handle_touch(event),
                Ok(None) => self.tick(),
                Err(ReelError::MailboxDisconnected) => break,
                Err(e) => warn!("Touch mailbox error: {}", e),
            }
        }
        info!("Input translator stopped");
    }
}

impl<C: Clock + 'static> InputTranslator<C> {
    /// Run the worker on its own thread
    pub fn spawn(self, touches: Mailbox<TouchEvent>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("input-translator".to_string())
            .spawn(move || self.run(&touches))?;
        Ok(handle)
    }
}
