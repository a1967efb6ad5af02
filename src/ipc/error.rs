use serde_json::json;

/// Error object carried in every failed response.
fn error_body(code: &str, message: String, details: Option<serde_json::Value>) -> serde_json::Value {
    let mut error = json!({ "code": code, "message": message });
    if let Some(d) = details {
        error["details"] = d;
    }
    error
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    json!({ "id": id, "ok": false, "error": error_body(code, message.into(), details) })
}

/// Reply for a line that did not parse as a request. There is no id to echo.
pub fn bad_json(message: impl Into<String>) -> serde_json::Value {
    json!({ "ok": false, "error": error_body("bad_json", message.into(), None) })
}
