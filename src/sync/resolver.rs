//! Active-position resolver
//!
//! Maps a playback time onto the lyric track: which line is active, how many
//! of its words are revealed, and whether playback sits in the gap before
//! the next line. Pure and deterministic; the karaoke renderer and the sync
//! controller both build on it.
//!
//! The active line is found with a backward linear scan. Timestamps are not
//! required to be sorted, so a binary search would be wrong on user-edited
//! tracks; O(N) per time update is fine for lyric-sized N.

use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::models::{word_count, LyricLine};

/// Where the active line is in its own lifecycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No line has started yet
    None,
    BeforeStart,
    /// Words are being revealed
    Active,
    /// Line finished, waiting for the next line's start
    Transitioning,
    /// Line finished and nothing is scheduled after it
    Ended,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivePosition {
    /// Active line, `None` before any line has started
    #[serde(rename = "lineIndex")]
    pub line: Option<usize>,
    /// Revealed word count; equals the line's word count once fully revealed
    pub word_index: usize,
    pub phase: Phase,
    /// Progress through the gap, only while transitioning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_progress: Option<f64>,
    #[serde(rename = "nextLineIndex", skip_serializing_if = "Option::is_none")]
    pub next_line: Option<usize>,
}

impl ActivePosition {
    pub fn none() -> Self {
        Self {
            line: None,
            word_index: 0,
            phase: Phase::None,
            transition_progress: None,
            next_line: None,
        }
    }

    /// Integer form of the active line (-1 when none)
    pub fn line_index(&self) -> isize {
        self.line.map_or(-1, |i| i as isize)
    }

    fn at(line: usize, word_index: usize, phase: Phase) -> Self {
        Self {
            line: Some(line),
            word_index,
            phase,
            transition_progress: None,
            next_line: None,
        }
    }
}

impl Default for ActivePosition {
    fn default() -> Self {
        Self::none()
    }
}

/// Highest index whose timestamp is set and not after `current_time`
pub fn active_line_index(current_time: f64, lines: &[LyricLine]) -> Option<usize> {
    if current_time.is_nan() {
        return None;
    }
    lines
        .iter()
        .rposition(|line| line.timestamp.is_some_and(|start| current_time >= start))
}

/// End of a line: its explicit end time, or the word-count estimate
pub fn line_end(line: &LyricLine, start: f64, config: &SyncConfig) -> f64 {
    line.end_time
        .unwrap_or_else(|| start + config.fallback_duration(line.word_count()))
}

/// Resolve the active line, word and phase for `current_time`
pub fn resolve(current_time: f64, lines: &[LyricLine], config: &SyncConfig) -> ActivePosition {
    let Some(index) = active_line_index(current_time, lines) else {
        return ActivePosition::none();
    };

    let line = &lines[index];
    let Some(start) = line.timestamp else {
        return ActivePosition::none();
    };
    let end = line_end(line, start, config);
    let words = word_count(&line.text);

    if current_time < start {
        return ActivePosition::at(index, 0, Phase::BeforeStart);
    }

    if current_time >= end {
        let next_start = lines
            .get(index + 1)
            .and_then(|next| next.timestamp)
            .filter(|&next_start| next_start > current_time);

        return match next_start {
            Some(next_start) => {
                // next_start > current_time >= end, so the gap is never empty
                let progress = (current_time - end) / (next_start - end);
                ActivePosition {
                    transition_progress: Some(progress.clamp(0.0, 1.0)),
                    next_line: Some(index + 1),
                    ..ActivePosition::at(index, words, Phase::Transitioning)
                }
            }
            None => ActivePosition::at(index, words, Phase::Ended),
        };
    }

    // start <= current_time < end, hence end > start
    if words == 0 {
        return ActivePosition::at(index, 0, Phase::Active);
    }
    let progress = ((current_time - start) / (end - start)).clamp(0.0, 1.0);
    let word_index = ((progress * words as f64).floor() as usize).min(words);

    ActivePosition::at(index, word_index, Phase::Active)
}
