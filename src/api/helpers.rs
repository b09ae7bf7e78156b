//! Shared helpers for WASM API operations
//!
//! Console logging macros, serialization to and from `JsValue`, and input
//! validation shared by the session and project APIs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    log(&format!("[WASM] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("[WASM] ⚠️ {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| validation_error(format!("{}: {}", error_context, e)))
}

/// Like `deserialize`, but `undefined`/`null` yield `T::default()`
pub fn deserialize_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    deserialize(value, error_context)
}

/// Like `deserialize`, but `undefined`/`null` yield `None`
pub fn deserialize_optional<T: DeserializeOwned>(
    value: JsValue,
    error_context: &str,
) -> Result<Option<T>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    deserialize(value, error_context).map(Some)
}

/// Serialize a value to JavaScript with automatic error handling.
/// Maps serialize as plain objects so the host can read fields directly.
pub fn serialize<T: Serialize + ?Sized>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| validation_error(format!("{}: {}", error_context, e)))
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that an index is within bounds
pub fn validate_index(index: usize, max_length: usize, context: &str) -> Result<(), String> {
    if index >= max_length {
        return Err(format!(
            "{} index {} out of bounds (max: {})",
            context,
            index,
            max_length.saturating_sub(1)
        ));
    }

    Ok(())
}

/// Validate a progress-bar percentage
pub fn validate_percent(percent: f64) -> Result<(), String> {
    if !percent.is_finite() {
        return Err(format!("Invalid seek percentage: {}", percent));
    }
    Ok(())
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    crate::wasm_error!("{}", msg);
    JsValue::from_str(&msg)
}

/// Host clock in milliseconds, used for debounce deadlines
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}
