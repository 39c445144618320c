use serde_json::{Map, Value};

/// The full set of editable field values keyed by field id.
pub type ContentMap = Map<String, Value>;

/// Parse persisted JSON text into a content map.
///
/// Missing text, malformed JSON and non-object payloads all read as "no data".
pub fn parse_content(raw: Option<&str>) -> ContentMap {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return ContentMap::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => into_content(value),
        Err(e) => {
            tracing::debug!("Ignoring malformed content JSON: {}", e);
            ContentMap::new()
        }
    }
}

/// Keep `value` if it is a JSON object, otherwise fall back to the empty map.
pub fn into_content(value: Value) -> ContentMap {
    match value {
        Value::Object(map) => map,
        _ => ContentMap::new(),
    }
}
