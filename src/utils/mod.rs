//! Utility modules for the Lyrics Synchronizer
//!
//! Small helpers shared across the sync engine and the API layer.

pub mod debounce;
pub mod time_format;

// Re-export commonly used types
pub use debounce::DebounceTimer;
pub use time_format::*;
