//! LyricTrack - the ordered, never-empty list of lyric lines
//!
//! Every mutation takes `&self` and returns a new track; the old value is
//! left as it was so callers can compare revisions to detect changes.

use thiserror::Error;

use super::line::{fresh_line_id, AdditionalLine, EnrichmentField, LyricLine};

/// Rejected track mutations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// The only remaining line cannot be deleted
    #[error("cannot delete the last remaining line")]
    LastLine,

    /// Line 0 anchors the resolver and keeps its start time
    #[error("the first line's timestamp cannot be cleared")]
    AnchorLine,

    #[error("line {index} out of range (track has {len} lines)")]
    OutOfRange { index: usize, len: usize },

    #[error("time must be a non-negative number of seconds, got {0}")]
    NegativeTime(f64),
}

/// Result of a structural edit: the new track plus the adjusted cursor
#[derive(Debug, Clone)]
pub struct TrackEdit {
    pub track: LyricTrack,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LyricTrack {
    lines: Vec<LyricLine>,
    revision: u64,
}

impl LyricTrack {
    /// Build a new project's track from pasted text: one line per non-empty
    /// input line, first line anchored at 0s.
    pub fn from_raw_text(text: &str) -> Self {
        let mut lines: Vec<LyricLine> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(LyricLine::new)
            .collect();

        if lines.is_empty() {
            lines.push(LyricLine::new(""));
        }
        lines[0].timestamp = Some(0.0);

        log::debug!("Created track with {} lines from raw text", lines.len());
        Self { lines, revision: 0 }
    }

    /// Rebuild a track from stored lines, keeping their timing.
    ///
    /// Ids are only generated for lines that lack one (or repeat an earlier
    /// one), so a save/load round trip keeps ids stable.
    pub fn from_saved(lines: Vec<LyricLine>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut lines: Vec<LyricLine> = lines
            .into_iter()
            .map(|mut line| {
                if line.id.is_empty() || !seen.insert(line.id.clone()) {
                    line.id = fresh_line_id();
                    seen.insert(line.id.clone());
                }
                line
            })
            .collect();

        if lines.is_empty() {
            lines.push(LyricLine::timed("", 0.0));
        }

        Self { lines, revision: 0 }
    }

    /// Four-line stand-in used when a project cannot be opened
    pub fn placeholder() -> Self {
        let lines = ["first", "second", "third", "fourth"]
            .iter()
            .map(|n| LyricLine::new(format!("This is the {} line", n)))
            .collect();
        Self { lines, revision: 0 }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn to_lines(&self) -> Vec<LyricLine> {
        self.lines.clone()
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false once constructed; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Bumped by every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of lines with a start timestamp
    pub fn synced_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_synced()).count()
    }

    /// Insert an empty line at `index`; a cursor at or after it moves down.
    pub fn insert_line_above(&self, index: usize, cursor: usize) -> Result<TrackEdit, TrackError> {
        self.check_index(index)?;
        let cursor = if index <= cursor { cursor + 1 } else { cursor };
        Ok(TrackEdit {
            track: self.inserted_at(index),
            cursor,
        })
    }

    /// Insert an empty line after `index`; only a cursor strictly after
    /// `index` moves down.
    pub fn insert_line_below(&self, index: usize, cursor: usize) -> Result<TrackEdit, TrackError> {
        self.check_index(index)?;
        let cursor = if index < cursor { cursor + 1 } else { cursor };
        Ok(TrackEdit {
            track: self.inserted_at(index + 1),
            cursor,
        })
    }

    pub fn delete_line(&self, index: usize, cursor: usize) -> Result<TrackEdit, TrackError> {
        self.check_index(index)?;
        if self.lines.len() <= 1 {
            return Err(TrackError::LastLine);
        }

        let mut next = self.successor();
        next.lines.remove(index);

        let new_len = next.lines.len();
        let cursor = if index < cursor {
            cursor - 1
        } else if index == cursor && cursor >= new_len {
            new_len - 1
        } else {
            cursor
        };

        Ok(TrackEdit { track: next, cursor })
    }

    pub fn update_text(&self, index: usize, text: impl Into<String>) -> Result<LyricTrack, TrackError> {
        let text = text.into();
        self.modify(index, |line| line.text = text)
    }

    /// Replace one scalar enrichment field; an empty value clears it.
    pub fn update_enrichment(
        &self,
        index: usize,
        field: EnrichmentField,
        value: impl Into<String>,
    ) -> Result<LyricTrack, TrackError> {
        let value = value.into();
        self.modify(index, |line| {
            *line.enrichment_mut(field) = if value.is_empty() { None } else { Some(value) };
        })
    }

    pub fn update_additional_lines(
        &self,
        index: usize,
        additional: Vec<AdditionalLine>,
    ) -> Result<LyricTrack, TrackError> {
        self.modify(index, |line| line.additional_lines = additional)
    }

    pub fn set_timestamp(&self, index: usize, time: f64) -> Result<LyricTrack, TrackError> {
        check_time(time)?;
        self.modify(index, |line| line.timestamp = Some(time))
    }

    pub fn set_end_time(&self, index: usize, time: f64) -> Result<LyricTrack, TrackError> {
        check_time(time)?;
        self.modify(index, |line| line.end_time = Some(time))
    }

    /// Unset both start and end of a line. Line 0 is rejected.
    pub fn clear_timestamp(&self, index: usize) -> Result<LyricTrack, TrackError> {
        self.check_index(index)?;
        if index == 0 {
            return Err(TrackError::AnchorLine);
        }
        self.modify(index, |line| {
            line.timestamp = None;
            line.end_time = None;
        })
    }

    fn check_index(&self, index: usize) -> Result<(), TrackError> {
        if index >= self.lines.len() {
            return Err(TrackError::OutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }

    fn successor(&self) -> LyricTrack {
        LyricTrack {
            lines: self.lines.clone(),
            revision: self.revision + 1,
        }
    }

    fn inserted_at(&self, position: usize) -> LyricTrack {
        let mut next = self.successor();
        next.lines.insert(position, LyricLine::new(""));
        next
    }

    fn modify<F>(&self, index: usize, edit: F) -> Result<LyricTrack, TrackError>
    where
        F: FnOnce(&mut LyricLine),
    {
        self.check_index(index)?;
        let mut next = self.successor();
        edit(&mut next.lines[index]);
        Ok(next)
    }
}

fn check_time(time: f64) -> Result<(), TrackError> {
    if !time.is_finite() || time < 0.0 {
        return Err(TrackError::NegativeTime(time));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_of(texts: &[&str]) -> LyricTrack {
        LyricTrack::from_raw_text(&texts.join("\n"))
    }

    #[test]
    fn test_raw_text_skips_blank_lines_and_anchors_first() {
        let track = LyricTrack::from_raw_text("  first \n\n second\n   \nthird");
        let texts: Vec<&str> = track.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(track.lines()[0].timestamp, Some(0.0));
        assert!(track.lines()[1..].iter().all(|l| l.timestamp.is_none()));
    }

    #[test]
    fn test_empty_text_still_has_one_line() {
        let track = LyricTrack::from_raw_text("\n  \n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.lines()[0].timestamp, Some(0.0));
    }

    #[test]
    fn test_insert_above_moves_cursor_at_or_after() {
        let track = track_of(&["a", "b", "c"]);

        let edit = track.insert_line_above(1, 1).unwrap();
        assert_eq!(edit.cursor, 2);
        assert_eq!(edit.track.len(), 4);
        assert_eq!(edit.track.lines()[1].text, "");

        let edit = track.insert_line_above(2, 1).unwrap();
        assert_eq!(edit.cursor, 1);
    }

    #[test]
    fn test_insert_below_moves_cursor_only_when_strictly_before() {
        let track = track_of(&["a", "b", "c"]);

        let edit = track.insert_line_below(1, 1).unwrap();
        assert_eq!(edit.cursor, 1);
        assert_eq!(edit.track.lines()[2].text, "");

        let edit = track.insert_line_below(0, 1).unwrap();
        assert_eq!(edit.cursor, 2);
    }

    #[test]
    fn test_inserted_line_is_unsynced_with_new_id() {
        let track = track_of(&["a"]);
        let edit = track.insert_line_below(0, 0).unwrap();
        let added = &edit.track.lines()[1];
        assert_eq!(added.timestamp, None);
        assert_eq!(added.end_time, None);
        assert_ne!(added.id, track.lines()[0].id);
    }

    #[test]
    fn test_delete_adjusts_cursor() {
        let track = track_of(&["a", "b", "c"]);

        // Before cursor: cursor follows its line
        assert_eq!(track.delete_line(0, 2).unwrap().cursor, 1);
        // At cursor in the middle: stays
        assert_eq!(track.delete_line(1, 1).unwrap().cursor, 1);
        // At cursor on the last line: clamps
        assert_eq!(track.delete_line(2, 2).unwrap().cursor, 1);
        // After cursor: untouched
        assert_eq!(track.delete_line(2, 0).unwrap().cursor, 0);
    }

    #[test]
    fn test_delete_last_remaining_line_rejected() {
        let track = track_of(&["only"]);
        assert_eq!(track.delete_line(0, 0).unwrap_err(), TrackError::LastLine);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_mutations_leave_original_untouched() {
        let track = track_of(&["a", "b"]);
        let next = track.set_timestamp(1, 4.0).unwrap();

        assert_eq!(track.lines()[1].timestamp, None);
        assert_eq!(next.lines()[1].timestamp, Some(4.0));
        assert_eq!(next.revision(), track.revision() + 1);
    }

    #[test]
    fn test_update_text_keeps_timing() {
        let track = track_of(&["a", "b"]).set_end_time(0, 2.0).unwrap();
        let next = track.update_text(0, "changed").unwrap();
        assert_eq!(next.lines()[0].text, "changed");
        assert_eq!(next.lines()[0].timestamp, Some(0.0));
        assert_eq!(next.lines()[0].end_time, Some(2.0));
    }

    #[test]
    fn test_enrichment_update_and_clear() {
        let track = track_of(&["a"]);
        let next = track.update_enrichment(0, EnrichmentField::Translation, "một").unwrap();
        assert_eq!(next.lines()[0].enrichment(EnrichmentField::Translation), Some("một"));
        assert_eq!(next.lines()[0].timestamp, Some(0.0));

        let cleared = next.update_enrichment(0, EnrichmentField::Translation, "").unwrap();
        assert_eq!(cleared.lines()[0].translation, None);
    }

    #[test]
    fn test_clear_timestamp_rejects_line_zero() {
        let track = track_of(&["a", "b"]);
        assert_eq!(track.clear_timestamp(0).unwrap_err(), TrackError::AnchorLine);
    }

    #[test]
    fn test_clear_timestamp_only_touches_target() {
        let track = track_of(&["a", "b", "c"])
            .set_timestamp(1, 3.0)
            .and_then(|t| t.set_end_time(1, 5.0))
            .and_then(|t| t.set_timestamp(2, 6.0))
            .unwrap();

        let cleared = track.clear_timestamp(1).unwrap();
        assert_eq!(cleared.lines()[1].timestamp, None);
        assert_eq!(cleared.lines()[1].end_time, None);
        assert_eq!(cleared.lines()[0], track.lines()[0]);
        assert_eq!(cleared.lines()[2], track.lines()[2]);
    }

    #[test]
    fn test_negative_and_nan_times_rejected() {
        let track = track_of(&["a"]);
        assert!(matches!(track.set_timestamp(0, -1.0), Err(TrackError::NegativeTime(_))));
        assert!(matches!(track.set_end_time(0, f64::NAN), Err(TrackError::NegativeTime(_))));
    }

    #[test]
    fn test_out_of_range() {
        let track = track_of(&["a"]);
        assert_eq!(
            track.update_text(3, "x").unwrap_err(),
            TrackError::OutOfRange { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_from_saved_keeps_ids_and_fills_missing() {
        let mut first = LyricLine::timed("a", 0.0);
        first.id = "keep-me".to_string();
        let mut second = LyricLine::new("b");
        second.id.clear();
        let mut dup = LyricLine::new("c");
        dup.id = "keep-me".to_string();

        let track = LyricTrack::from_saved(vec![first, second, dup]);
        assert_eq!(track.lines()[0].id, "keep-me");
        assert!(!track.lines()[1].id.is_empty());
        assert_ne!(track.lines()[2].id, "keep-me");
    }

    #[test]
    fn test_synced_count() {
        let track = track_of(&["a", "b", "c"]).set_timestamp(2, 9.0).unwrap();
        assert_eq!(track.synced_count(), 2);
    }
}
