//! `.lyrx` project exchange files
//!
//! A `.lyrx` file is pretty-printed JSON:
//! `{ projects, exportDate, version, appName, fileType: "lyrx" }`.
//! Imports are validated on the raw JSON before anything is deserialized
//! or written, and a file is rejected as a whole on the first problem.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{LyricTrack, SavedProject};

pub const LYRX_FILE_TYPE: &str = "lyrx";
pub const LYRX_MIME_TYPE: &str = "application/x-lyrx";
pub const FORMAT_VERSION: &str = "1.0";
pub const APP_NAME: &str = "Lyrics Synchronizer";

lazy_static! {
    static ref UNSAFE_FILE_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file content is not a JSON object")]
    NotAnObject,

    #[error("file has no 'projects' array")]
    MissingProjects,

    #[error("unsupported file type '{0}' (expected 'lyrx')")]
    WrongFileType(String),

    #[error("project {index} is invalid: {reason}")]
    InvalidProject { index: usize, reason: String },

    #[error("project {project}, line {line}: 'text' must be a string")]
    InvalidLine { project: usize, line: usize },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub projects: Vec<SavedProject>,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub app_name: String,
    pub file_type: String,
}

impl ExportDocument {
    pub fn new(projects: Vec<SavedProject>, export_date: DateTime<Utc>) -> Self {
        Self {
            projects,
            export_date,
            version: FORMAT_VERSION.to_string(),
            app_name: APP_NAME.to_string(),
            file_type: LYRX_FILE_TYPE.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Projects read from a validated file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportBundle {
    pub projects: Vec<SavedProject>,
    pub export_date: Option<DateTime<Utc>>,
}

/// Imported projects split by whether their id already exists
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ImportPlan {
    pub fresh: Vec<SavedProject>,
    pub duplicates: Vec<SavedProject>,
}

impl ImportPlan {
    pub fn new(bundle: ImportBundle, existing_ids: &[String]) -> Self {
        let (duplicates, fresh): (Vec<_>, Vec<_>) = bundle
            .projects
            .into_iter()
            .partition(|p| existing_ids.iter().any(|id| *id == p.id));
        Self { fresh, duplicates }
    }

    /// Projects to write: fresh ones, plus duplicates when overwriting
    pub fn into_projects(self, overwrite: bool) -> Vec<SavedProject> {
        let mut projects = self.fresh;
        if overwrite {
            projects.extend(self.duplicates);
        }
        projects
    }
}

/// Serialize projects into a `.lyrx` document
pub fn export_projects(
    projects: Vec<SavedProject>,
    export_date: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    ExportDocument::new(projects, export_date).to_json()
}

/// Validate and read a `.lyrx` (or plain JSON) file
pub fn parse_import(text: &str) -> Result<ImportBundle, ImportError> {
    let root: Value = serde_json::from_str(text)?;
    let object = root.as_object().ok_or(ImportError::NotAnObject)?;

    if let Some(file_type) = object.get("fileType").filter(|v| !v.is_null()) {
        if file_type.as_str() != Some(LYRX_FILE_TYPE) {
            return Err(ImportError::WrongFileType(file_type.to_string()));
        }
    }

    let raw_projects = object
        .get("projects")
        .and_then(Value::as_array)
        .ok_or(ImportError::MissingProjects)?;

    for (index, raw) in raw_projects.iter().enumerate() {
        validate_project(index, raw)?;
    }

    let projects = raw_projects
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut project: SavedProject =
                serde_json::from_value(raw.clone()).map_err(|e| ImportError::InvalidProject {
                    index,
                    reason: e.to_string(),
                })?;
            project.lyrics = LyricTrack::from_saved(project.lyrics).to_lines();
            Ok(project)
        })
        .collect::<Result<Vec<_>, ImportError>>()?;

    let export_date = object
        .get("exportDate")
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    Ok(ImportBundle {
        projects,
        export_date,
    })
}

fn validate_project(index: usize, raw: &Value) -> Result<(), ImportError> {
    let invalid = |reason: &str| ImportError::InvalidProject {
        index,
        reason: reason.to_string(),
    };

    let project = raw.as_object().ok_or_else(|| invalid("not an object"))?;

    let has_text = |key: &str| {
        project
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    if !has_text("id") {
        return Err(invalid("missing 'id'"));
    }
    if !has_text("title") {
        return Err(invalid("missing 'title'"));
    }

    let lyrics = project
        .get("lyrics")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing 'lyrics' array"))?;

    for (line, lyric) in lyrics.iter().enumerate() {
        if !lyric.get("text").is_some_and(Value::is_string) {
            return Err(ImportError::InvalidLine {
                project: index,
                line,
            });
        }
    }
    Ok(())
}

/// Download name for a single project, e.g.
/// `lyrics-project-my_song-2024-05-01.lyrx`
pub fn export_file_name(title: &str, date: NaiveDate) -> String {
    let safe = UNSAFE_FILE_CHARS.replace_all(title, "_").to_lowercase();
    format!("lyrics-project-{}-{}.{}", safe, date.format("%Y-%m-%d"), LYRX_FILE_TYPE)
}

/// Download name for a full backup
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("lyrics-projects-{}.{}", date.format("%Y-%m-%d"), LYRX_FILE_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            export_file_name("My Song!", date),
            "lyrics-project-my_song_-2024-05-01.lyrx"
        );
        assert_eq!(backup_file_name(date), "lyrics-projects-2024-05-01.lyrx");
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(parse_import("[1,2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(parse_import("not json"), Err(ImportError::Json(_))));
    }

    #[test]
    fn test_rejects_missing_projects() {
        assert!(matches!(
            parse_import(r#"{"fileType":"lyrx"}"#),
            Err(ImportError::MissingProjects)
        ));
        assert!(matches!(
            parse_import(r#"{"projects":{}}"#),
            Err(ImportError::MissingProjects)
        ));
    }

    #[test]
    fn test_rejects_foreign_file_type() {
        assert!(matches!(
            parse_import(r#"{"projects":[],"fileType":"srt"}"#),
            Err(ImportError::WrongFileType(_))
        ));
    }

    #[test]
    fn test_rejects_line_without_text() {
        let text = r#"{"projects":[{"id":"a","title":"t","createdAt":"2024-01-01T00:00:00Z",
            "lyrics":[{"text":"ok"},{"text":5}]}]}"#;
        assert!(matches!(
            parse_import(text),
            Err(ImportError::InvalidLine { project: 0, line: 1 })
        ));
    }

    #[test]
    fn test_plain_json_without_file_type_is_accepted() {
        let text = r#"{"projects":[{"id":"a","title":"t","createdAt":"2024-01-01T00:00:00Z",
            "lyrics":[{"text":"ok","timestamp":0}]}]}"#;
        let bundle = parse_import(text).unwrap();
        assert_eq!(bundle.projects.len(), 1);
        assert!(!bundle.projects[0].lyrics[0].id.is_empty());
        assert_eq!(bundle.export_date, None);
    }

    #[test]
    fn test_plan_splits_duplicates() {
        let text = r#"{"projects":[
            {"id":"a","title":"A","createdAt":"2024-01-01T00:00:00Z","lyrics":[{"text":"x"}]},
            {"id":"b","title":"B","createdAt":"2024-01-01T00:00:00Z","lyrics":[{"text":"y"}]}
        ]}"#;
        let plan = ImportPlan::new(parse_import(text).unwrap(), &["b".to_string()]);
        assert_eq!(plan.fresh.len(), 1);
        assert_eq!(plan.duplicates[0].id, "b");

        assert_eq!(plan.clone().into_projects(false).len(), 1);
        assert_eq!(plan.into_projects(true).len(), 2);
    }
}
