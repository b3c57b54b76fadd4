//! HTMX request detection and response headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// Browser event fired after a grid swap when the requested page changed.
pub const PAGE_CHANGED_EVENT: &str = "marquee:page-changed";

/// Extension trait for HeaderMap to detect HTMX requests.
pub trait ContentNegotiation {
    fn is_htmx(&self) -> bool;
}

impl ContentNegotiation for HeaderMap {
    fn is_htmx(&self) -> bool {
        self.contains_key("hx-request")
    }
}

/// `HX-Trigger` header firing `event` with `detail` as the event payload.
///
/// Serialization failures produce no header rather than a broken one.
pub fn hx_trigger<T: Serialize>(event: &str, detail: &T) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let detail = match serde_json::to_value(detail) {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(event, error = %e, "Could not serialize HX-Trigger detail");
            return headers;
        }
    };
    let mut payload = serde_json::Map::new();
    payload.insert(event.to_string(), detail);

    match HeaderValue::from_str(&serde_json::Value::Object(payload).to_string()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static("hx-trigger"), value);
        }
        Err(e) => tracing::warn!(event, error = %e, "Could not encode HX-Trigger header"),
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_htmx_request_detected() {
        let mut headers = HeaderMap::new();
        assert!(!headers.is_htmx());
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(headers.is_htmx());
    }

    #[test]
    fn test_hx_trigger_payload() {
        let headers = hx_trigger(PAGE_CHANGED_EVENT, &serde_json::json!({ "page": 3 }));
        let value = headers.get("hx-trigger").unwrap().to_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(value).unwrap();
        assert_eq!(parsed[PAGE_CHANGED_EVENT]["page"], 3);
    }
}
