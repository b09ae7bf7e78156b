//! Lyrics Synchronizer WASM Module
//!
//! Timestamp sync engine for lyrics against an audio track, plus the
//! karaoke display plan. The sync core (models, resolver, controller,
//! storage) is plain Rust and runs natively; `api` exposes it to the
//! browser through wasm-bindgen.

pub mod api;
pub mod config;
pub mod models;
pub mod playback;
pub mod renderers;
pub mod storage;
pub mod sync;
pub mod utils;

// Re-export commonly used types
pub use config::SyncConfig;
pub use models::{LyricLine, LyricTrack, SavedProject};
pub use playback::{MirroredPlayback, PlaybackCommand, PlaybackEvent, PlaybackPort, PlaybackRate};
pub use sync::{resolve, ActivePosition, Phase, SyncController};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            wasm_warn!("Logger already initialized");
        }
    }

    log::info!("Lyrics Synchronizer WASM module initialized");
}
