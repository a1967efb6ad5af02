use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "studentCount": state.registrar.len(),
            "startedAt": state.started_at.to_rfc3339(),
        }),
    )
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match serde_json::to_value(&state.config) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        _ => None,
    }
}
