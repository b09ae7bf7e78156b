//! Sync engine tunables
//!
//! Passed from the host as a plain JS object; any missing field falls back
//! to the default below.

use serde::{Deserialize, Serialize};

/// Lowest and highest allowed scroll debounce (ms)
pub const SCROLL_DEBOUNCE_RANGE: (f64, f64) = (50.0, 150.0);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Minimum length of a line without an explicit end time (seconds)
    pub fallback_min_secs: f64,

    /// Per-word length used for the fallback end time (seconds)
    pub secs_per_word: f64,

    /// Step for seek backward/forward commands (seconds)
    pub seek_step_secs: f64,

    /// Delay before scrolling to a newly active line (ms)
    pub scroll_debounce_ms: f64,

    /// Lines shown on each side of the current line in the karaoke view
    pub window_radius: usize,

    /// Height of one karaoke row (px)
    pub line_height: f64,

    /// Vertical offset of row 0 when it is current (px)
    pub viewport_anchor: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fallback_min_secs: 3.0,
            secs_per_word: 0.8,
            seek_step_secs: 5.0,
            scroll_debounce_ms: 150.0,
            window_radius: 2,
            line_height: 100.0,
            viewport_anchor: 100.0,
        }
    }
}

impl SyncConfig {
    /// Debounce delay clamped into the allowed range
    pub fn scroll_delay_ms(&self) -> f64 {
        let (lo, hi) = SCROLL_DEBOUNCE_RANGE;
        if self.scroll_debounce_ms.is_nan() {
            return hi;
        }
        self.scroll_debounce_ms.clamp(lo, hi)
    }

    /// Estimated line length when the user never set an end time
    pub fn fallback_duration(&self, word_count: usize) -> f64 {
        self.fallback_min_secs.max(word_count as f64 * self.secs_per_word)
    }
}
