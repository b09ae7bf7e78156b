//! A single lyric line and its display-only enrichment
//!
//! Timing lives in `timestamp` (start) and `end_time`; everything else is
//! metadata the sync engine carries through untouched.

use serde::{Deserialize, Serialize};

/// Kind of a freeform extra line shown under the main text
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdditionalLineKind {
    Phonetic,
    Translation,
    Note,
    Custom,
}

/// Freeform extra line (e.g. a second translation)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AdditionalLine {
    #[serde(rename = "type")]
    pub kind: AdditionalLineKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Scalar enrichment field selector for `update_enrichment`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EnrichmentField {
    Phonetic,
    Translation,
    Notes,
}

/// One lyric entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Stable identifier, unique within a track. Empty means "not assigned yet"
    /// and is filled in when the line enters a track.
    #[serde(default)]
    pub id: String,

    /// Displayed text; words are separated by single spaces
    pub text: String,

    /// Start time in seconds (`None` = unsynced)
    #[serde(default)]
    pub timestamp: Option<f64>,

    /// Time in seconds at which the line is fully sung (`None` = use fallback)
    #[serde(default)]
    pub end_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub additional_lines: Vec<AdditionalLine>,
}

impl LyricLine {
    /// Create an unsynced line with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: fresh_line_id(),
            text: text.into(),
            timestamp: None,
            end_time: None,
            phonetic: None,
            translation: None,
            notes: None,
            additional_lines: Vec::new(),
        }
    }

    /// Create a line that starts at `timestamp`
    pub fn timed(text: impl Into<String>, timestamp: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::new(text)
        }
    }

    /// Builder-style end time
    pub fn ending_at(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Words of the line, split on single spaces
    pub fn words(&self) -> Vec<&str> {
        split_words(&self.text)
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    pub fn is_synced(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Read one scalar enrichment field
    pub fn enrichment(&self, field: EnrichmentField) -> Option<&str> {
        match field {
            EnrichmentField::Phonetic => self.phonetic.as_deref(),
            EnrichmentField::Translation => self.translation.as_deref(),
            EnrichmentField::Notes => self.notes.as_deref(),
        }
    }

    pub(crate) fn enrichment_mut(&mut self, field: EnrichmentField) -> &mut Option<String> {
        match field {
            EnrichmentField::Phonetic => &mut self.phonetic,
            EnrichmentField::Translation => &mut self.translation,
            EnrichmentField::Notes => &mut self.notes,
        }
    }
}

/// Split text into words on single spaces. Empty text has no words.
pub fn split_words(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(' ').collect()
    }
}

pub fn word_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.split(' ').count()
    }
}

/// Generate a line id that is never reused
pub fn fresh_line_id() -> String {
    format!("lyric-{}", uuid::Uuid::new_v4())
}
