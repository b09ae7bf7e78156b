//! Playback port
//!
//! The sync controller never touches the media element. It reads time and
//! play state through `PlaybackPort` and issues seek/play/pause/rate
//! commands through it. `MirroredPlayback` is the implementation used from
//! the browser: it mirrors the media element's events and queues commands
//! for the host to apply.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("no audio loaded")]
    NoMedia,

    #[error("playback failed: {0}")]
    PlayFailed(String),
}

/// Supported playback speeds. On the wire a rate is its multiplier.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(into = "f64", try_from = "f64")]
pub enum PlaybackRate {
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 6] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Map a raw multiplier back to a supported rate
    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.multiplier() - multiplier).abs() < 1e-6)
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.multiplier()
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = String;

    fn try_from(multiplier: f64) -> Result<Self, Self::Error> {
        PlaybackRate::from_multiplier(multiplier)
            .ok_or_else(|| format!("unsupported playback rate {}", multiplier))
    }
}

/// Events emitted by the media element
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlaybackEvent {
    TimeUpdate(f64),
    DurationKnown(f64),
    Play,
    Pause,
    Ended,
    /// Decode or play failure reported by the host
    Error(String),
}

/// Commands queued for the host by `MirroredPlayback`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlaybackCommand {
    Play,
    Pause,
    Seek(f64),
    SetRate(f64),
}

/// Snapshot of the media element's state
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub playback_rate: PlaybackRate,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            playback_rate: PlaybackRate::Normal,
        }
    }
}

/// Abstraction over the media element
pub trait PlaybackPort {
    fn has_media(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;

    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_playback_rate(&mut self, rate: PlaybackRate);

    /// Feed an event from the media element; ports that read live state
    /// can ignore it.
    fn observe(&mut self, _event: &PlaybackEvent) {}
}

/// Port that mirrors media events and queues outgoing commands
#[derive(Debug, Clone, Default)]
pub struct MirroredPlayback {
    state: PlaybackState,
    media_loaded: bool,
    pending: Vec<PlaybackCommand>,
}

impl MirroredPlayback {
    pub fn new(media_loaded: bool) -> Self {
        Self {
            media_loaded,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn set_media_loaded(&mut self, loaded: bool) {
        if !loaded {
            self.state = PlaybackState::default();
        }
        self.media_loaded = loaded;
    }

    /// Commands issued since the last drain, oldest first
    pub fn drain_commands(&mut self) -> Vec<PlaybackCommand> {
        std::mem::take(&mut self.pending)
    }
}

impl PlaybackPort for MirroredPlayback {
    fn has_media(&self) -> bool {
        self.media_loaded
    }

    fn current_time(&self) -> f64 {
        self.state.current_time
    }

    fn duration(&self) -> f64 {
        self.state.duration
    }

    fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.media_loaded {
            return Err(PlaybackError::NoMedia);
        }
        self.pending.push(PlaybackCommand::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.state.is_playing = false;
        self.pending.push(PlaybackCommand::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        // Reflect the seek right away so the next read sees the new time
        self.state.current_time = seconds;
        self.pending.push(PlaybackCommand::Seek(seconds));
    }

    fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.state.playback_rate = rate;
        self.pending.push(PlaybackCommand::SetRate(rate.multiplier()));
    }

    fn observe(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::TimeUpdate(time) => {
                if time.is_finite() {
                    self.state.current_time = *time;
                }
            }
            PlaybackEvent::DurationKnown(duration) => {
                if duration.is_finite() {
                    self.state.duration = *duration;
                }
            }
            PlaybackEvent::Play => self.state.is_playing = true,
            PlaybackEvent::Pause | PlaybackEvent::Ended | PlaybackEvent::Error(_) => {
                self.state.is_playing = false
            }
        }
    }
}
