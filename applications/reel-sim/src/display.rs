//! Display stand-in
//!
//! Folds the player's display messages into a [`DisplaySnapshot`] and
//! renders it as a log line, or as one JSON object per line on stdout.

use crate::config::DisplaySettings;
use crate::error::Result;
use reel_core::PlayerState;
use reel_playback::{DisplayPort, DisplaySnapshot};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// How long one wait for display messages lasts before looping
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// One-line human rendering of a snapshot
pub fn render_line(snapshot: &DisplaySnapshot) -> String {
    let symbol = match snapshot.state {
        PlayerState::Stopped => "[]",
        PlayerState::Playing => "|>",
        PlayerState::Paused => "||",
        PlayerState::FastForwarding => ">>",
        PlayerState::Rewinding => "<<",
    };
    let mut line = format!(
        "{} {} {:5.1}% vol {}",
        symbol,
        snapshot.title,
        snapshot.progress,
        snapshot.volume.step()
    );
    if !snapshot.stop_progress.is_cleared() {
        line.push_str(&format!(
            " stopping {}/{}",
            snapshot.stop_progress.current_count, snapshot.stop_progress.max_count
        ));
    }
    line
}

/// Serialize a snapshot as one JSON line
pub fn render_json(snapshot: &DisplaySnapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

fn render(snapshot: &DisplaySnapshot, settings: &DisplaySettings) -> Result<()> {
    if settings.json {
        println!("{}", render_json(snapshot)?);
    } else {
        info!(target: "reel_sim::display", "{}", render_line(snapshot));
    }
    Ok(())
}

/// Render display updates on a thread until every publisher is gone
pub fn spawn_display(port: DisplayPort, settings: DisplaySettings) -> Result<JoinHandle<()>> {
    let refresh = Duration::from_millis(settings.refresh_ms.max(1));
    let handle = thread::Builder::new()
        .name("display".to_string())
        .spawn(move || {
            let mut snapshot = DisplaySnapshot::default();
            let mut shown: Option<DisplaySnapshot> = None;
            loop {
                match port.wait(&mut snapshot, IDLE_WAIT, refresh) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                if shown.as_ref() == Some(&snapshot) {
                    continue;
                }
                if let Err(e) = render(&snapshot, &settings) {
                    debug!("Display render failed: {}", e);
                }
                shown = Some(snapshot.clone());
                thread::sleep(refresh);
            }
            debug!("Display closed");
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::{Command, StopProgress, TrackTitle, Volume};
    use reel_playback::display_channels;

    fn snapshot() -> DisplaySnapshot {
        DisplaySnapshot {
            state: PlayerState::Playing,
            title: TrackTitle::new("Blue Train"),
            progress: 42.0,
            stop_progress: StopProgress::default(),
            volume: Volume::new(6),
        }
    }

    #[test]
    fn renders_state_title_and_progress() {
        assert_eq!(render_line(&snapshot()), "|> Blue Train  42.0% vol 6");
    }

    #[test]
    fn renders_stop_countdown() {
        let mut snapshot = snapshot();
        snapshot.stop_progress = StopProgress::new(20, 7);
        assert!(render_line(&snapshot).ends_with("stopping 7/20"));
    }

    #[test]
    fn json_line_carries_every_field() {
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&snapshot()).unwrap()).unwrap();
        assert_eq!(value["title"], "Blue Train");
        assert_eq!(value["progress"], 42.0);
        assert!(value.get("state").is_some());
        assert!(value.get("volume").is_some());
        assert!(value.get("stop_progress").is_some());
    }

    #[test]
    fn thread_exits_when_publishers_drop() {
        let (link, port) = display_channels();
        let handle = spawn_display(
            port,
            DisplaySettings {
                json: false,
                refresh_ms: 1,
            },
        )
        .unwrap();

        link.publish_command(Command::state(PlayerState::Paused))
            .unwrap();
        drop(link);
        handle.join().unwrap();
    }
}
