//! Keyboard shortcuts for the sync screen
//!
//! Maps a key event (DOM `KeyboardEvent.code` plus modifiers) to an action.
//! Events aimed at a text field never map to anything, so typing in a lyric
//! never triggers transport or sync commands.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyInput {
    pub code: String,
    pub ctrl: bool,
    pub shift: bool,
    /// Event target is an input, textarea or contenteditable element
    pub target_is_text_input: bool,
}

impl KeyInput {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.target_is_text_input = true;
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    TogglePlay,
    PreviousLine,
    NextLine,
    SeekBackward,
    SeekForward,
    SetEndTime,
    SetTimestamp,
    InsertAbove,
    InsertBelow,
    DeleteLine,
    ShowHelp,
}

/// Map a key event to an action. Returns `None` for unbound keys and for
/// anything typed into a text field.
pub fn map_key(input: &KeyInput) -> Option<ShortcutAction> {
    if input.target_is_text_input {
        return None;
    }

    let action = match input.code.as_str() {
        "Space" => ShortcutAction::TogglePlay,
        "ArrowUp" => ShortcutAction::PreviousLine,
        "ArrowDown" => ShortcutAction::NextLine,
        "ArrowLeft" => ShortcutAction::SeekBackward,
        "ArrowRight" => ShortcutAction::SeekForward,
        "KeyE" => ShortcutAction::SetEndTime,
        "KeyS" if !input.ctrl => ShortcutAction::SetTimestamp,
        "Enter" if input.shift => ShortcutAction::InsertAbove,
        "Enter" if input.ctrl => ShortcutAction::InsertBelow,
        "Delete" if input.ctrl => ShortcutAction::DeleteLine,
        "F1" => ShortcutAction::ShowHelp,
        _ => return None,
    };
    Some(action)
}
