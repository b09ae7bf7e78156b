//! Project persistence
//!
//! - `store`: the named-blob contract the host provides
//! - `repository`: project records, id list and summaries over a blob store
//! - `interchange`: `.lyrx` export/import

pub mod interchange;
pub mod repository;
pub mod store;

pub use interchange::{
    backup_file_name, export_file_name, export_projects, parse_import, ExportDocument, ImportBundle,
    ImportError, ImportPlan,
};
pub use repository::{
    audio_key, build_saved_project, project_key, sort_summaries, ProjectRepository, PROJECTS_LIST_KEY,
};
pub use store::{BlobStore, MemoryStore, StoreError};
