//! Karaoke display plan
//!
//! Projects an `ActivePosition` onto the lyric list: a window of rows
//! around the active line, each with a role and visual weight, and for the
//! active row a per-word highlight state. No DOM, no timers; the same
//! position and lines always give the same plan.

use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::models::{split_words, LyricLine};
use crate::sync::resolver::{ActivePosition, Phase};

/// Row role relative to the active line
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LineRole {
    FarPast,
    Past,
    Previous,
    Current,
    Next,
    Upcoming,
    FarFuture,
}

impl LineRole {
    pub fn for_offset(offset: isize) -> Self {
        match offset {
            o if o < -2 => LineRole::FarPast,
            -2 => LineRole::Past,
            -1 => LineRole::Previous,
            0 => LineRole::Current,
            1 => LineRole::Next,
            2 => LineRole::Upcoming,
            _ => LineRole::FarFuture,
        }
    }

    pub fn style(self) -> LineStyle {
        let (scale, opacity) = match self {
            LineRole::Current => (1.0, 1.0),
            LineRole::Previous => (0.9, 0.6),
            LineRole::Next => (0.9, 0.7),
            LineRole::Past | LineRole::Upcoming => (0.8, 0.4),
            LineRole::FarPast | LineRole::FarFuture => (0.75, 0.0),
        };
        LineStyle { scale, opacity }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub scale: f64,
    pub opacity: f64,
}

/// Highlight state of one word on the active row
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum WordState {
    Revealed,
    Emphasized,
    Pending,
}

impl WordState {
    pub fn opacity(self) -> f64 {
        match self {
            WordState::Revealed | WordState::Emphasized => 1.0,
            WordState::Pending => 0.5,
        }
    }

    pub fn glows(self) -> bool {
        self == WordState::Emphasized
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordView {
    pub index: usize,
    pub text: String,
    pub state: WordState,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub index: usize,
    /// Position relative to the active line
    pub offset: isize,
    pub role: LineRole,
    pub style: LineStyle,
    pub text: String,
    /// Per-word breakdown, only for the active row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordView>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPlan {
    pub current: Option<usize>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_progress: Option<f64>,
    /// Vertical translation of the row strip (px)
    pub scroll_offset: f64,
    pub lines: Vec<LineView>,
    /// True before the first line starts ("waiting for the song")
    pub waiting: bool,
}

impl DisplayPlan {
    pub fn line(&self, index: usize) -> Option<&LineView> {
        self.lines.iter().find(|l| l.index == index)
    }

    pub fn current_line(&self) -> Option<&LineView> {
        self.current.and_then(|i| self.line(i))
    }
}

/// Highlight state for word `index` of the active line
pub fn word_state(index: usize, position: &ActivePosition) -> WordState {
    match position.phase {
        Phase::Transitioning | Phase::Ended => WordState::Revealed,
        Phase::Active if index < position.word_index => WordState::Revealed,
        Phase::Active if index == position.word_index => WordState::Emphasized,
        _ => WordState::Pending,
    }
}

/// Build the display plan for `position` over `lines`
pub fn plan(position: &ActivePosition, lines: &[LyricLine], config: &SyncConfig) -> DisplayPlan {
    let center = position.line_index();
    let radius = config.window_radius as isize;

    let rows = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let offset = index as isize - center;
            if offset.abs() > radius {
                return None;
            }
            let role = LineRole::for_offset(offset);
            let words = (role == LineRole::Current).then(|| word_views(line, position));
            Some(LineView {
                index,
                offset,
                role,
                style: role.style(),
                text: line.text.clone(),
                words,
            })
        })
        .collect();

    DisplayPlan {
        current: position.line,
        phase: position.phase,
        transition_progress: position.transition_progress,
        scroll_offset: config.viewport_anchor - center.max(0) as f64 * config.line_height,
        lines: rows,
        waiting: position.line.is_none(),
    }
}

fn word_views(line: &LyricLine, position: &ActivePosition) -> Vec<WordView> {
    split_words(&line.text)
        .into_iter()
        .enumerate()
        .map(|(index, text)| WordView {
            index,
            text: text.to_string(),
            state: word_state(index, position),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(line: Option<usize>, word_index: usize, phase: Phase) -> ActivePosition {
        ActivePosition {
            line,
            word_index,
            phase,
            transition_progress: None,
            next_line: None,
        }
    }

    #[test]
    fn test_roles_by_offset() {
        assert_eq!(LineRole::for_offset(-5), LineRole::FarPast);
        assert_eq!(LineRole::for_offset(-1), LineRole::Previous);
        assert_eq!(LineRole::for_offset(0), LineRole::Current);
        assert_eq!(LineRole::for_offset(2), LineRole::Upcoming);
        assert_eq!(LineRole::for_offset(3), LineRole::FarFuture);
        assert_eq!(LineRole::FarFuture.style().opacity, 0.0);
    }

    #[test]
    fn test_word_states_while_active() {
        let pos = position(Some(0), 2, Phase::Active);
        assert_eq!(word_state(0, &pos), WordState::Revealed);
        assert_eq!(word_state(1, &pos), WordState::Revealed);
        assert_eq!(word_state(2, &pos), WordState::Emphasized);
        assert_eq!(word_state(3, &pos), WordState::Pending);
    }

    #[test]
    fn test_everything_revealed_after_line_end() {
        for phase in [Phase::Transitioning, Phase::Ended] {
            let pos = position(Some(0), 4, phase);
            assert!((0..4).all(|i| word_state(i, &pos) == WordState::Revealed));
        }
    }

    #[test]
    fn test_nothing_emphasized_before_start() {
        let pos = position(Some(0), 0, Phase::BeforeStart);
        assert_eq!(word_state(0, &pos), WordState::Pending);
    }

    #[test]
    fn test_scroll_offset() {
        let config = SyncConfig::default();
        let lines: Vec<LyricLine> = (0..5).map(|i| LyricLine::new(format!("l{}", i))).collect();

        assert_eq!(plan(&ActivePosition::none(), &lines, &config).scroll_offset, 100.0);
        let p = plan(&position(Some(3), 0, Phase::Active), &lines, &config);
        assert_eq!(p.scroll_offset, -200.0);
    }
}
