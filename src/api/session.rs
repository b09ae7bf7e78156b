//! WASM API for the sync session
//!
//! The session (track, cursor, playback mirror) lives in WASM and is the
//! single source of truth; JavaScript forwards media events and user input,
//! then applies the queued playback commands and notifications.

use lazy_static::lazy_static;
use serde::Serialize;
use std::sync::Mutex;
use wasm_bindgen::prelude::*;

use super::helpers::{
    deserialize, deserialize_or_default, now_ms, serialize, validate_index, validate_percent,
    validation_error,
};
use crate::config::SyncConfig;
use crate::models::{AdditionalLine, EnrichmentField, SavedProject};
use crate::playback::{PlaybackEvent, PlaybackRate, PlaybackState};
use crate::storage::{project_key, StoreError};
use crate::sync::{CursorMode, KeyInput, OpenRequest, SessionInfo, SyncController};
use crate::utils::{format_clock, format_timestamp};
use crate::{wasm_info, wasm_log, wasm_warn};

// WASM-owned session (canonical source of truth)
lazy_static! {
    static ref SESSION: Mutex<Option<SyncController>> = Mutex::new(None);
}

fn install(controller: SyncController) -> Result<(), JsValue> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| validation_error("Session lock poisoned"))?;
    *guard = Some(controller);
    Ok(())
}

fn with_session<R>(f: impl FnOnce(&mut SyncController) -> Result<R, JsValue>) -> Result<R, JsValue> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| validation_error("Session lock poisoned"))?;
    let session = guard
        .as_mut()
        .ok_or_else(|| JsValue::from_str("No session open"))?;
    f(session)
}

fn check_line(session: &SyncController, index: usize) -> Result<(), JsValue> {
    validate_index(index, session.track().len(), "Line").map_err(validation_error)
}

/// Everything the editor view needs after a command
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    session: &'a SessionInfo,
    cursor: usize,
    mode: CursorMode,
    line_count: usize,
    synced_count: usize,
    revision: u64,
    progress_percent: f64,
    playback: &'a PlaybackState,
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// Open a session from `{ kind: "new", title, artist, lyricsText, audio... }`
/// or `{ kind: "existing", project }`
#[wasm_bindgen(js_name = openProject)]
pub fn open_project(request: JsValue, config: JsValue) -> Result<(), JsValue> {
    let request: OpenRequest = deserialize(request, "Invalid open request")?;
    let config: SyncConfig = deserialize_or_default(config, "Invalid sync config")?;

    let controller = SyncController::open(request, config);
    wasm_info!(
        "Session opened: '{}' ({} lines)",
        controller.session().title,
        controller.track().len()
    );
    install(controller)
}

/// Open a project by id from the raw record the host read out of storage.
/// A missing or unreadable record opens the test session instead.
#[wasm_bindgen(js_name = openStoredProject)]
pub fn open_stored_project(id: &str, record: Option<String>, config: JsValue) -> Result<(), JsValue> {
    let config: SyncConfig = deserialize_or_default(config, "Invalid sync config")?;

    let loaded = match record {
        None => Ok(None),
        Some(json) => serde_json::from_str::<SavedProject>(&json)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: project_key(id),
                source,
            }),
    };
    if let Err(e) = &loaded {
        wasm_warn!("{}", e);
    }

    install(SyncController::open_loaded(loaded, config))
}

/// Open the placeholder session (no audio, four sample lines)
#[wasm_bindgen(js_name = openTestSession)]
pub fn open_test_session(config: JsValue) -> Result<(), JsValue> {
    let config: SyncConfig = deserialize_or_default(config, "Invalid sync config")?;
    install(SyncController::placeholder(config))
}

#[wasm_bindgen(js_name = closeSession)]
pub fn close_session() -> Result<(), JsValue> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| validation_error("Session lock poisoned"))?;
    *guard = None;
    wasm_log!("Session closed");
    Ok(())
}

#[wasm_bindgen(js_name = hasSession)]
pub fn has_session() -> bool {
    SESSION.lock().map(|guard| guard.is_some()).unwrap_or(false)
}

// ============================================================================
// Playback events and polling
// ============================================================================

/// Forward a media event (`{ type: "timeUpdate", value: 12.3 }` etc.).
/// Returns the resolved active position.
#[wasm_bindgen(js_name = handlePlaybackEvent)]
pub fn handle_playback_event(event: JsValue) -> Result<JsValue, JsValue> {
    let event: PlaybackEvent = deserialize(event, "Invalid playback event")?;
    let now = now_ms();
    with_session(|session| {
        session.handle_event(event, now);
        serialize(session.active(), "Failed to serialize active position")
    })
}

/// Tell the session whether the host has an audio source attached
#[wasm_bindgen(js_name = setMediaLoaded)]
pub fn set_media_loaded(loaded: bool) -> Result<(), JsValue> {
    with_session(|session| {
        session.port_mut().set_media_loaded(loaded);
        Ok(())
    })
}

/// Line to scroll into view once the debounce delay has passed
#[wasm_bindgen(js_name = pollScroll)]
pub fn poll_scroll() -> Result<Option<u32>, JsValue> {
    let now = now_ms();
    with_session(|session| Ok(session.poll_scroll(now).map(|line| line as u32)))
}

/// Host clock time (ms) at which `pollScroll` will return a line, if any
#[wasm_bindgen(js_name = scrollDeadline)]
pub fn scroll_deadline() -> Result<Option<f64>, JsValue> {
    with_session(|session| Ok(session.scroll_deadline()))
}

/// Playback commands queued for the media element, oldest first
#[wasm_bindgen(js_name = drainPlaybackCommands)]
pub fn drain_playback_commands() -> Result<JsValue, JsValue> {
    with_session(|session| {
        let commands = session.port_mut().drain_commands();
        serialize(&commands, "Failed to serialize playback commands")
    })
}

#[wasm_bindgen(js_name = takeNotifications)]
pub fn take_notifications() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(&session.take_notifications(), "Failed to serialize notifications"))
}

// ============================================================================
// Manual sync
// ============================================================================

#[wasm_bindgen(js_name = setTimestamp)]
pub fn set_timestamp(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.set_timestamp(index))
    })
}

#[wasm_bindgen(js_name = setEndTime)]
pub fn set_end_time(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.set_end_time(index))
    })
}

#[wasm_bindgen(js_name = clearTimestamp)]
pub fn clear_timestamp(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.clear_timestamp(index))
    })
}

#[wasm_bindgen(js_name = goToNextLine)]
pub fn go_to_next_line() -> Result<bool, JsValue> {
    with_session(|session| Ok(session.go_to_next_line()))
}

#[wasm_bindgen(js_name = goToPreviousLine)]
pub fn go_to_previous_line() -> Result<bool, JsValue> {
    with_session(|session| Ok(session.go_to_previous_line()))
}

#[wasm_bindgen(js_name = selectLine)]
pub fn select_line(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.select_line(index))
    })
}

// ============================================================================
// Line editing
// ============================================================================

#[wasm_bindgen(js_name = insertLineAbove)]
pub fn insert_line_above(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.insert_line_above(index))
    })
}

#[wasm_bindgen(js_name = insertLineBelow)]
pub fn insert_line_below(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.insert_line_below(index))
    })
}

#[wasm_bindgen(js_name = deleteLine)]
pub fn delete_line(index: usize) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.delete_line(index))
    })
}

#[wasm_bindgen(js_name = updateLineText)]
pub fn update_line_text(index: usize, text: &str) -> Result<bool, JsValue> {
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.update_text(index, text))
    })
}

/// `field` is one of "phonetic", "translation", "notes"
#[wasm_bindgen(js_name = updateEnrichment)]
pub fn update_enrichment(index: usize, field: JsValue, value: &str) -> Result<bool, JsValue> {
    let field: EnrichmentField = deserialize(field, "Invalid enrichment field")?;
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.update_enrichment(index, field, value))
    })
}

#[wasm_bindgen(js_name = updateAdditionalLines)]
pub fn update_additional_lines(index: usize, additional: JsValue) -> Result<bool, JsValue> {
    let additional: Vec<AdditionalLine> = deserialize(additional, "Invalid additional lines")?;
    with_session(|session| {
        check_line(session, index)?;
        Ok(session.update_additional_lines(index, additional))
    })
}

#[wasm_bindgen(js_name = beginTextEdit)]
pub fn begin_text_edit(index: usize) -> Result<bool, JsValue> {
    with_session(|session| Ok(session.begin_text_edit(index)))
}

#[wasm_bindgen(js_name = endTextEdit)]
pub fn end_text_edit() -> Result<(), JsValue> {
    with_session(|session| {
        session.end_text_edit();
        Ok(())
    })
}

// ============================================================================
// Keyboard and transport
// ============================================================================

/// Dispatch a key event. Returns the action name, or `null` when the key
/// is not a shortcut (the host should then let the event through).
#[wasm_bindgen(js_name = handleKey)]
pub fn handle_key(input: JsValue) -> Result<JsValue, JsValue> {
    let input: KeyInput = deserialize(input, "Invalid key event")?;
    with_session(|session| serialize(&session.handle_key(&input), "Failed to serialize shortcut"))
}

#[wasm_bindgen(js_name = togglePlayPause)]
pub fn toggle_play_pause() -> Result<bool, JsValue> {
    with_session(|session| Ok(session.toggle_play_pause()))
}

#[wasm_bindgen(js_name = seekRelative)]
pub fn seek_relative(delta: f64) -> Result<bool, JsValue> {
    if !delta.is_finite() {
        return Err(validation_error(format!("Invalid seek delta: {}", delta)));
    }
    with_session(|session| Ok(session.seek_relative(delta)))
}

#[wasm_bindgen(js_name = seekBackward)]
pub fn seek_backward() -> Result<bool, JsValue> {
    with_session(|session| Ok(session.seek_backward()))
}

#[wasm_bindgen(js_name = seekForward)]
pub fn seek_forward() -> Result<bool, JsValue> {
    with_session(|session| Ok(session.seek_forward()))
}

#[wasm_bindgen(js_name = seekToPercent)]
pub fn seek_to_percent(percent: f64) -> Result<bool, JsValue> {
    validate_percent(percent).map_err(validation_error)?;
    with_session(|session| Ok(session.seek_to_percent(percent)))
}

/// Accepts one of 0.5, 0.75, 1, 1.25, 1.5, 2
#[wasm_bindgen(js_name = setPlaybackRate)]
pub fn set_playback_rate(multiplier: f64) -> Result<(), JsValue> {
    let rate = PlaybackRate::from_multiplier(multiplier)
        .ok_or_else(|| validation_error(format!("Unsupported playback rate: {}", multiplier)))?;
    with_session(|session| {
        session.set_playback_rate(rate);
        Ok(())
    })
}

// ============================================================================
// Queries
// ============================================================================

#[wasm_bindgen(js_name = getLines)]
pub fn get_lines() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(session.track().lines(), "Failed to serialize lines"))
}

#[wasm_bindgen(js_name = getSessionState)]
pub fn get_session_state() -> Result<JsValue, JsValue> {
    with_session(|session| {
        let view = SessionView {
            session: session.session(),
            cursor: session.cursor(),
            mode: session.mode(),
            line_count: session.track().len(),
            synced_count: session.synced_count(),
            revision: session.track().revision(),
            progress_percent: session.progress_percent(),
            playback: session.port().state(),
        };
        serialize(&view, "Failed to serialize session state")
    })
}

#[wasm_bindgen(js_name = getActivePosition)]
pub fn get_active_position() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(session.active(), "Failed to serialize active position"))
}

/// Karaoke view for the current playback position
#[wasm_bindgen(js_name = getDisplayPlan)]
pub fn get_display_plan() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(&session.display_plan(), "Failed to serialize display plan"))
}

// ============================================================================
// Persistence
// ============================================================================

/// Save payload; pass it to `buildSavedProject` and write the result
#[wasm_bindgen(js_name = snapshotProject)]
pub fn snapshot_project() -> Result<JsValue, JsValue> {
    with_session(|session| serialize(&session.snapshot(), "Failed to serialize project"))
}

/// Report a completed write so later saves update the same project
#[wasm_bindgen(js_name = markSaved)]
pub fn mark_saved(project_id: &str) -> Result<(), JsValue> {
    if project_id.is_empty() {
        return Err(validation_error("Project id must not be empty"));
    }
    with_session(|session| {
        session.mark_saved(project_id);
        Ok(())
    })
}

// ============================================================================
// Formatting
// ============================================================================

#[wasm_bindgen(js_name = formatTimestamp)]
pub fn format_timestamp_js(time: Option<f64>) -> String {
    format_timestamp(time)
}

#[wasm_bindgen(js_name = formatClock)]
pub fn format_clock_js(time: f64) -> String {
    format_clock(time)
}
