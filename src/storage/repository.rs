//! Project repository on top of a blob store
//!
//! Key layout:
//! - `projects_list`: JSON array of project ids, in insertion order
//! - `project_<id>`: one `SavedProject` record
//! - `audio_<id>`: the project's audio blob (owned by the host, removed here
//!   on delete)

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{BlobStore, StoreError};
use crate::models::{LyricTrack, ProjectDraft, ProjectSummary, SavedProject};

pub const PROJECTS_LIST_KEY: &str = "projects_list";

pub fn project_key(id: &str) -> String {
    format!("project_{}", id)
}

pub fn audio_key(id: &str) -> String {
    format!("audio_{}", id)
}

pub fn new_project_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Turn a draft into the record to persist.
///
/// Editing keeps the id and the original creation date; a new project gets
/// a fresh id. `updatedAt` is always `now`.
pub fn build_saved_project(
    draft: &ProjectDraft,
    existing: Option<&SavedProject>,
    now: DateTime<Utc>,
) -> SavedProject {
    let id = draft.project_id.clone().unwrap_or_else(new_project_id);
    SavedProject {
        id,
        title: draft.title.clone(),
        artist: draft.artist.clone(),
        lyrics: LyricTrack::from_saved(draft.lyrics.clone()).to_lines(),
        created_at: existing.map_or(now, |p| p.created_at),
        updated_at: Some(now),
        audio: draft.audio.clone(),
    }
}

/// Newest first
pub fn sort_summaries(summaries: &mut [ProjectSummary]) {
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub struct ProjectRepository<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> ProjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn load(&self, id: &str) -> Result<Option<SavedProject>, StoreError> {
        self.read(&project_key(id))
    }

    /// Upsert a draft. The stored record is returned so the caller can pick
    /// up the assigned id.
    pub fn save(&mut self, draft: &ProjectDraft) -> Result<SavedProject, StoreError> {
        let existing = match &draft.project_id {
            Some(id) => self.load(id)?,
            None => None,
        };
        let project = build_saved_project(draft, existing.as_ref(), Utc::now());

        self.write(&project_key(&project.id), &project)?;
        self.ensure_listed(&project.id)?;

        log::info!(
            "Saved project {} ({} lines, {})",
            project.id,
            project.lyrics.len(),
            if existing.is_some() { "updated" } else { "created" }
        );
        Ok(project)
    }

    /// Summaries of every listed project, newest first. Ids whose record is
    /// gone are skipped.
    pub fn list(&self) -> Result<Vec<ProjectSummary>, StoreError> {
        let mut summaries: Vec<ProjectSummary> =
            self.all_projects()?.iter().map(ProjectSummary::from).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    /// Full records of every listed project, in list order
    pub fn all_projects(&self) -> Result<Vec<SavedProject>, StoreError> {
        let mut projects = Vec::new();
        for id in self.ids()? {
            match self.load(&id)? {
                Some(project) => projects.push(project),
                None => log::warn!("Project {} is listed but has no record", id),
            }
        }
        Ok(projects)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let ids: Vec<String> = self.ids()?.into_iter().filter(|i| i != id).collect();
        self.write(PROJECTS_LIST_KEY, &ids)?;
        self.store.remove(&project_key(id))?;
        self.store.remove(&audio_key(id))?;
        log::info!("Deleted project {}", id);
        Ok(())
    }

    /// Write already-validated projects, overwriting records with the same id.
    ///
    /// All or nothing: the id list is written last, and if any write fails
    /// the records touched so far are put back the way they were.
    pub fn import(&mut self, projects: &[SavedProject]) -> Result<usize, StoreError> {
        let mut ids = self.ids()?;
        let mut previous: Vec<(String, Option<String>)> = Vec::with_capacity(projects.len());

        let result = projects.iter().try_for_each(|project| -> Result<(), StoreError> {
            let key = project_key(&project.id);
            previous.push((key.clone(), self.store.get(&key)?));
            self.write(&key, project)?;
            if !ids.contains(&project.id) {
                ids.push(project.id.clone());
            }
            Ok(())
        });
        let result = result.and_then(|()| self.write(PROJECTS_LIST_KEY, &ids));

        if let Err(e) = result {
            log::warn!("Import failed, restoring {} record(s): {}", previous.len(), e);
            for (key, raw) in previous.into_iter().rev() {
                let restored = match raw {
                    Some(raw) => self.store.set(&key, raw),
                    None => self.store.remove(&key),
                };
                if let Err(restore_error) = restored {
                    log::warn!("Could not restore {}: {}", key, restore_error);
                }
            }
            return Err(e);
        }

        log::info!("Imported {} projects", projects.len());
        Ok(projects.len())
    }

    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read(PROJECTS_LIST_KEY)?.unwrap_or_default())
    }

    fn ensure_listed(&mut self, id: &str) -> Result<(), StoreError> {
        let mut ids = self.ids()?;
        if !ids.iter().any(|i| i == id) {
            ids.push(id.to_string());
            self.write(PROJECTS_LIST_KEY, &ids)?;
        }
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, raw)
    }
}
