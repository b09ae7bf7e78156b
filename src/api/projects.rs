//! WASM API for saved projects
//!
//! Storage IO is async on the host, so these are pure builders: the host
//! reads records, passes them in, and writes back what comes out.

use chrono::Utc;
use wasm_bindgen::prelude::*;

use super::helpers::{deserialize, deserialize_optional, serialize, validation_error};
use crate::models::{ProjectDraft, ProjectSummary, SavedProject};
use crate::storage::interchange::LYRX_MIME_TYPE;
use crate::storage::{
    audio_key, backup_file_name, build_saved_project, export_file_name, export_projects,
    parse_import, project_key, sort_summaries, ImportPlan, PROJECTS_LIST_KEY,
};
use crate::{wasm_info, wasm_warn};

/// Record to persist for a draft; `existing` is the stored record when
/// editing (keeps its creation date)
#[wasm_bindgen(js_name = buildSavedProject)]
pub fn build_saved_project_js(draft: JsValue, existing: JsValue) -> Result<JsValue, JsValue> {
    let draft: ProjectDraft = deserialize(draft, "Invalid project draft")?;
    let existing: Option<SavedProject> = deserialize_optional(existing, "Invalid stored project")?;

    let project = build_saved_project(&draft, existing.as_ref(), Utc::now());
    wasm_info!("Built project {} ({} lines)", project.id, project.lyrics.len());
    serialize(&project, "Failed to serialize project")
}

/// List rows for stored projects, newest first
#[wasm_bindgen(js_name = summarizeProjects)]
pub fn summarize_projects(projects: JsValue) -> Result<JsValue, JsValue> {
    let projects: Vec<SavedProject> = deserialize(projects, "Invalid project list")?;
    let mut summaries: Vec<ProjectSummary> = projects.iter().map(ProjectSummary::from).collect();
    sort_summaries(&mut summaries);
    serialize(&summaries, "Failed to serialize summaries")
}

/// Pretty-printed `.lyrx` document for the given projects
#[wasm_bindgen(js_name = exportProjects)]
pub fn export_projects_js(projects: JsValue) -> Result<String, JsValue> {
    let projects: Vec<SavedProject> = deserialize(projects, "Invalid project list")?;
    let count = projects.len();
    let json = export_projects(projects, Utc::now())
        .map_err(|e| validation_error(format!("Export failed: {}", e)))?;
    wasm_info!("Exported {} project(s)", count);
    Ok(json)
}

/// Validate an import file and split it against the ids already stored.
/// Returns `{ fresh, duplicates }`.
#[wasm_bindgen(js_name = planImport)]
pub fn plan_import(text: &str, existing_ids: JsValue) -> Result<JsValue, JsValue> {
    let existing_ids: Vec<String> = deserialize(existing_ids, "Invalid id list")?;
    let bundle = parse_import(text).map_err(|e| {
        wasm_warn!("Import rejected: {}", e);
        JsValue::from_str(&e.to_string())
    })?;

    let plan = ImportPlan::new(bundle, &existing_ids);
    wasm_info!(
        "Import plan: {} new, {} duplicate(s)",
        plan.fresh.len(),
        plan.duplicates.len()
    );
    serialize(&plan, "Failed to serialize import plan")
}

/// Projects to write once the user has answered the overwrite prompt
#[wasm_bindgen(js_name = resolveImport)]
pub fn resolve_import(plan: JsValue, overwrite: bool) -> Result<JsValue, JsValue> {
    let plan: ImportPlan = deserialize(plan, "Invalid import plan")?;
    serialize(&plan.into_projects(overwrite), "Failed to serialize projects")
}

/// MIME type for `.lyrx` downloads
#[wasm_bindgen(js_name = lyrxMimeType)]
pub fn lyrx_mime_type() -> String {
    LYRX_MIME_TYPE.to_string()
}

#[wasm_bindgen(js_name = exportFileName)]
pub fn export_file_name_js(title: &str) -> String {
    export_file_name(title, Utc::now().date_naive())
}

#[wasm_bindgen(js_name = backupFileName)]
pub fn backup_file_name_js() -> String {
    backup_file_name(Utc::now().date_naive())
}

#[wasm_bindgen(js_name = projectKey)]
pub fn project_key_js(id: &str) -> String {
    project_key(id)
}

#[wasm_bindgen(js_name = audioKey)]
pub fn audio_key_js(id: &str) -> String {
    audio_key(id)
}

#[wasm_bindgen(js_name = projectsListKey)]
pub fn projects_list_key() -> String {
    PROJECTS_LIST_KEY.to_string()
}
