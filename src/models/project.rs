//! Project records as persisted and exchanged

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::line::LyricLine;

/// Reference to the project's audio (the bytes live with the host)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioReference {
    #[serde(default)]
    pub audio_file_name: String,
    #[serde(default)]
    pub audio_data_url: Option<String>,
    #[serde(default)]
    pub audio_file_type: String,
}

impl AudioReference {
    pub fn is_loaded(&self) -> bool {
        self.audio_data_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// A stored project, the unit of save/load and of `.lyrx` exchange
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    pub lyrics: Vec<LyricLine>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audio: AudioReference,
}

/// What the sync session hands to the repository when saving
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    /// Set when editing an existing project; `None` creates a new one
    pub project_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub lyrics: Vec<LyricLine>,
    #[serde(flatten)]
    pub audio: AudioReference,
}

/// Row shown in the saved-projects list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub line_count: usize,
    pub synced_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub audio_file_name: String,
}

impl From<&SavedProject> for ProjectSummary {
    fn from(project: &SavedProject) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            artist: project.artist.clone(),
            line_count: project.lyrics.len(),
            synced_count: project.lyrics.iter().filter(|l| l.timestamp.is_some()).count(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            audio_file_name: project.audio.audio_file_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_project_wire_shape() {
        let json = r#"{
            "id": "p1",
            "title": "Song",
            "artist": "Someone",
            "lyrics": [{"id": "l1", "text": "hello world", "timestamp": 0, "endTime": null}],
            "createdAt": "2024-05-01T10:00:00.000Z",
            "audioFileName": "song.mp3",
            "audioDataUrl": null,
            "audioFileType": "audio/mpeg"
        }"#;

        let project: SavedProject = serde_json::from_str(json).unwrap();
        assert_eq!(project.lyrics[0].timestamp, Some(0.0));
        assert_eq!(project.audio.audio_file_name, "song.mp3");
        assert!(!project.audio.is_loaded());

        let back = serde_json::to_value(&project).unwrap();
        assert_eq!(back["audioFileType"], "audio/mpeg");
        assert!(back.get("updatedAt").is_none());
    }

    #[test]
    fn test_summary_counts_synced_lines() {
        let project = SavedProject {
            id: "p".into(),
            title: "t".into(),
            artist: String::new(),
            lyrics: vec![LyricLine::timed("a", 0.0), LyricLine::new("b")],
            created_at: Utc::now(),
            updated_at: None,
            audio: AudioReference::default(),
        };
        let summary = ProjectSummary::from(&project);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.synced_count, 1);
    }
}
