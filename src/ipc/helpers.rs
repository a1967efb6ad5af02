use crate::ipc::error::err;
use crate::store::StudentRecord;
use serde_json::json;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

pub fn get_optional_usize(params: &serde_json::Value, key: &str) -> Result<Option<usize>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a non-negative integer", key))),
    }
}

pub fn student_json(r: &StudentRecord) -> serde_json::Value {
    json!({
        "cedula": r.cedula,
        "firstName": r.first_name,
        "lastName": r.last_name,
        "displayName": r.display_name(),
        "score1": r.score1,
        "score2": r.score2,
        "attendance": r.attendance,
        "average": r.average,
        "status": r.status,
        "statusLabel": r.status.label(),
        "registeredAt": r.registered_at.to_rfc3339(),
    })
}
