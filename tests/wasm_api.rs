//! WASM API test
//!
//! Drives the JavaScript-facing session API in a browser.

#![cfg(target_arch = "wasm32")]

use lyrics_sync_wasm::api::*;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js(value: serde_json::Value) -> JsValue {
    serde_wasm_bindgen::to_value(&value).unwrap()
}

fn open_song() {
    let request = json!({
        "kind": "new",
        "title": "Song",
        "artist": "Artist",
        "lyricsText": "first line\nsecond line\nthird line",
        "audioFileName": "song.mp3",
        "audioDataUrl": "data:audio/mpeg;base64,AAAA",
        "audioFileType": "audio/mpeg"
    });
    open_project(js(request), JsValue::UNDEFINED).unwrap();
}

#[wasm_bindgen_test]
fn test_open_and_read_lines() {
    open_song();
    assert!(has_session());

    let lines: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(get_lines().unwrap()).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["timestamp"], json!(0.0));
    assert!(lines[1]["timestamp"].is_null());
}

#[wasm_bindgen_test]
fn test_tagging_through_events() {
    open_song();
    handle_playback_event(js(json!({"type": "timeUpdate", "value": 12.0}))).unwrap();
    assert!(go_to_next_line().unwrap());

    let lines: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(get_lines().unwrap()).unwrap();
    assert_eq!(lines[0]["endTime"], json!(12.0));
    assert_eq!(lines[1]["timestamp"], json!(12.0));
}

#[wasm_bindgen_test]
fn test_out_of_range_index_is_an_error() {
    open_song();
    assert!(set_timestamp(99).is_err());
    assert!(set_playback_rate(3.0).is_err());
}

#[wasm_bindgen_test]
fn test_key_outside_bindings_returns_null() {
    open_song();
    let action = handle_key(js(json!({"code": "KeyQ"}))).unwrap();
    assert!(action.is_null() || action.is_undefined());
}

#[wasm_bindgen_test]
fn test_missing_record_opens_test_session() {
    open_stored_project("gone", None, JsValue::UNDEFINED).unwrap();
    let lines: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(get_lines().unwrap()).unwrap();
    assert_eq!(lines.len(), 4);
    close_session().unwrap();
    assert!(!has_session());
}

#[wasm_bindgen_test]
fn test_file_names() {
    assert!(export_file_name_js("My Song").starts_with("lyrics-project-my_song-"));
    assert_eq!(project_key_js("x"), "project_x");
    assert_eq!(lyrx_mime_type(), "application/x-lyrx");
}
