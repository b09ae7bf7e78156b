// Project persistence and .lyrx exchange

use chrono::{TimeZone, Utc};
use lyrics_sync_wasm::models::{AudioReference, LyricLine, ProjectDraft, SavedProject};
use lyrics_sync_wasm::storage::interchange::{ExportDocument, LYRX_FILE_TYPE};
use lyrics_sync_wasm::storage::{
    audio_key, export_projects, parse_import, project_key, BlobStore, ImportError, ImportPlan,
    MemoryStore, ProjectRepository, StoreError, PROJECTS_LIST_KEY,
};

fn draft(title: &str) -> ProjectDraft {
    ProjectDraft {
        project_id: None,
        title: title.to_string(),
        artist: "Artist".to_string(),
        lyrics: vec![
            LyricLine::timed("first", 0.0).ending_at(2.5),
            LyricLine::new("second"),
        ],
        audio: AudioReference {
            audio_file_name: "track.mp3".to_string(),
            audio_data_url: None,
            audio_file_type: "audio/mpeg".to_string(),
        },
    }
}

fn project(id: &str, title: &str) -> SavedProject {
    SavedProject {
        id: id.to_string(),
        title: title.to_string(),
        artist: String::new(),
        lyrics: vec![LyricLine::timed("la la", 0.0)],
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        updated_at: None,
        audio: AudioReference::default(),
    }
}

#[test]
fn test_save_load_list_delete() {
    let mut repo = ProjectRepository::new(MemoryStore::new());
    let saved = repo.save(&draft("One")).unwrap();

    let loaded = repo.load(&saved.id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.lyrics[0].end_time, Some(2.5));

    let summaries = repo.list().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].line_count, 2);
    assert_eq!(summaries[0].synced_count, 1);

    repo.store_mut()
        .set(&audio_key(&saved.id), "blob".to_string())
        .unwrap();
    repo.delete(&saved.id).unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert!(!repo.store().contains(&project_key(&saved.id)));
    assert!(!repo.store().contains(&audio_key(&saved.id)));
}

#[test]
fn test_list_is_newest_first_and_skips_dangling_ids() {
    let mut repo = ProjectRepository::new(MemoryStore::new());
    let mut older = project("old", "Older");
    older.created_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    repo.import(&[older, project("new", "Newer")]).unwrap();

    let ids = serde_json::to_string(&["old", "ghost", "new"]).unwrap();
    repo.store_mut().set(PROJECTS_LIST_KEY, ids).unwrap();

    let titles: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}

#[test]
fn test_corrupt_record_is_reported() {
    let mut repo = ProjectRepository::new(MemoryStore::new());
    repo.store_mut()
        .set(&project_key("bad"), "{not json".to_string())
        .unwrap();
    assert!(matches!(repo.load("bad"), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_export_then_import_restores_projects() {
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
    let projects = vec![project("a", "Alpha"), project("b", "Beta")];

    let json = export_projects(projects.clone(), date).unwrap();
    let document: ExportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(document.file_type, LYRX_FILE_TYPE);
    assert_eq!(document.version, "1.0");

    let bundle = parse_import(&json).unwrap();
    assert_eq!(bundle.export_date, Some(date));
    assert_eq!(bundle.projects, projects);
}

#[test]
fn test_import_with_duplicates() {
    let mut repo = ProjectRepository::new(MemoryStore::new());
    repo.import(&[project("a", "Local A")]).unwrap();

    let json = export_projects(
        vec![project("a", "Imported A"), project("c", "Imported C")],
        Utc::now(),
    )
    .unwrap();
    let plan = ImportPlan::new(parse_import(&json).unwrap(), &repo.ids().unwrap());
    assert_eq!(plan.duplicates.len(), 1);

    // declining the overwrite keeps the local copy
    let written = repo.import(&plan.clone().into_projects(false)).unwrap();
    assert_eq!(written, 1);
    assert_eq!(repo.load("a").unwrap().unwrap().title, "Local A");

    repo.import(&plan.into_projects(true)).unwrap();
    assert_eq!(repo.load("a").unwrap().unwrap().title, "Imported A");
    assert_eq!(repo.ids().unwrap(), vec!["a", "c"]);
}

#[test]
fn test_invalid_import_writes_nothing() {
    let text = r#"{"fileType":"lyrx","projects":[
        {"id":"ok","title":"Fine","createdAt":"2024-01-01T00:00:00Z","lyrics":[{"text":"x"}]},
        {"id":"","title":"No id","createdAt":"2024-01-01T00:00:00Z","lyrics":[]}
    ]}"#;
    assert!(matches!(
        parse_import(text),
        Err(ImportError::InvalidProject { index: 1, .. })
    ));
}
