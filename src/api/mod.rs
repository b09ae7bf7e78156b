//! Lyrics Synchronizer WASM API
//!
//! JavaScript-facing functions, grouped by concern.
//!
//! # Module Structure
//!
//! - `helpers`: serialization, validation and `[WASM]` console logging
//! - `session`: the open sync session (events, sync commands, editing, views)
//! - `projects`: save payloads, project lists and `.lyrx` export/import

pub mod helpers;
pub mod projects;
pub mod session;

pub use projects::*;
pub use session::*;
