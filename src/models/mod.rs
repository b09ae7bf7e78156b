//! Models module for the Lyrics Synchronizer
//!
//! Data structures for lyric lines, the lyric track and saved projects.

pub mod line;
pub mod project;
pub mod track;

// Re-export commonly used types
pub use line::*;
pub use project::*;
pub use track::{LyricTrack, TrackEdit, TrackError};
