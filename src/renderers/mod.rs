//! Renderers module for the Lyrics Synchronizer
//!
//! Turns resolver output into display plans for the web front end.

pub mod karaoke;

// Re-export commonly used types
pub use karaoke::{plan, DisplayPlan, LineRole, LineStyle, LineView, WordState, WordView};
