//! Sync engine
//!
//! - `resolver`: playback time to active line/word/phase (pure)
//! - `controller`: the editing session, manual sync commands, auto-follow
//! - `shortcuts`: key event to command mapping
//! - `notification`: messages for the host to show

pub mod controller;
pub mod notification;
pub mod resolver;
pub mod shortcuts;

pub use controller::{CursorMode, OpenRequest, SessionInfo, SyncController};
pub use notification::{Notification, NotificationLevel};
pub use resolver::{active_line_index, resolve, ActivePosition, Phase};
pub use shortcuts::{map_key, KeyInput, ShortcutAction};
