//! Input contracts for the avatar.
//!
//! Hosts forward their audio playback lifecycle as [`AudioEvent`]s (or set
//! the speaking flag directly) and drive [`crate::Avatar::update`] once per
//! rendered frame.

use serde::{Deserialize, Serialize};

/// Audio playback lifecycle events from the voice pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioEvent {
    Play,
    Ended,
    Pause,
}

impl AudioEvent {
    /// Speaking flag implied by this event: only `Play` speaks.
    #[inline]
    pub fn speaking(self) -> bool {
        matches!(self, AudioEvent::Play)
    }
}

impl std::str::FromStr for AudioEvent {
    type Err = String;

    /// Accepts the DOM media event names (`play`, `ended`, `pause`) and
    /// `start`/`end` as synonyms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "play" | "start" | "playing" => Ok(AudioEvent::Play),
            "ended" | "end" => Ok(AudioEvent::Ended),
            "pause" => Ok(AudioEvent::Pause),
            other => Err(format!("unknown audio event '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_play_speaks() {
        assert!(AudioEvent::Play.speaking());
        assert!(!AudioEvent::Ended.speaking());
        assert!(!AudioEvent::Pause.speaking());
    }

    #[test]
    fn parses_dom_event_names() {
        assert_eq!("play".parse::<AudioEvent>(), Ok(AudioEvent::Play));
        assert_eq!("Ended".parse::<AudioEvent>(), Ok(AudioEvent::Ended));
        assert_eq!("pause".parse::<AudioEvent>(), Ok(AudioEvent::Pause));
        assert!("seeked".parse::<AudioEvent>().is_err());
    }
}
