use crate::form::{self, StudentForm};
use crate::ipc::error::ok;
use crate::ipc::helpers::HandlerErr;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub fn parse_form(params: &serde_json::Value) -> Result<StudentForm, HandlerErr> {
    if !params.is_object() {
        return Err(HandlerErr::bad_params("params must be an object"));
    }
    serde_json::from_value(params.clone()).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

fn handle_form_validate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let input = match parse_form(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    match form::validate(&input) {
        Ok(_) => ok(&req.id, json!({ "valid": true, "errors": [] })),
        Err(errors) => ok(&req.id, json!({ "valid": false, "errors": errors })),
    }
}

fn handle_form_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "form": state.registrar.retained_form(),
            "phase": state.registrar.phase(),
        }),
    )
}

fn handle_form_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.registrar.cancel();
    ok(&req.id, json!({ "cleared": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "form.validate" => Some(handle_form_validate(state, req)),
        "form.get" => Some(handle_form_get(state, req)),
        "form.cancel" => Some(handle_form_cancel(state, req)),
        _ => None,
    }
}
