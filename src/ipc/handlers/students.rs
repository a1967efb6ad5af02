use crate::ipc::error::{err, ok};
use crate::ipc::handlers::form::parse_form;
use crate::ipc::helpers::{
    get_optional_str, get_optional_usize, get_required_str, student_json, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::registrar::RegisterError;
use crate::table::{self, ListQuery, Sort, SortColumn, SortDirection};
use serde_json::json;

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let input = match parse_form(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    match state.registrar.submit(input) {
        Ok(done) => ok(
            &req.id,
            json!({
                "student": student_json(&done.student),
                "studentCount": state.registrar.len(),
                "globalAverage": done.global_average,
                "notification": done.notification,
            }),
        ),
        Err(RegisterError::Invalid(fields)) => err(
            &req.id,
            "bad_params",
            "student form has invalid fields",
            Some(json!({ "fields": fields })),
        ),
        Err(RegisterError::Duplicate {
            source,
            notification,
        }) => err(
            &req.id,
            "duplicate_cedula",
            notification.message.clone(),
            Some(json!({
                "reason": source.to_string(),
                "notification": notification,
            })),
        ),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let cedula = match get_required_str(&req.params, "cedula") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let done = state.registrar.delete(&cedula);
    ok(
        &req.id,
        json!({
            "removed": done.removed.is_some(),
            "studentCount": state.registrar.len(),
            "globalAverage": done.global_average,
        }),
    )
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let cedula = match get_required_str(&req.params, "cedula") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    match state.registrar.find(&cedula) {
        Some(r) => ok(&req.id, json!({ "student": student_json(r) })),
        None => err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "cedula": cedula })),
        ),
    }
}

fn parse_sort(params: &serde_json::Value) -> Result<Option<Sort>, HandlerErr> {
    let Some(sort) = params.get("sort").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let active = get_optional_str(sort, "active")?.unwrap_or_default();
    let direction = get_optional_str(sort, "direction")?.unwrap_or_default();

    let Some(direction) = SortDirection::parse(&direction) else {
        return Err(HandlerErr::bad_params(format!(
            "unknown sort direction: {}",
            direction
        )));
    };
    let Some(direction) = direction else {
        return Ok(None);
    };
    if active.is_empty() {
        return Ok(None);
    }
    let Some(column) = SortColumn::parse(&active) else {
        return Err(HandlerErr::bad_params(format!(
            "unknown sort column: {}",
            active
        )));
    };
    Ok(Some(Sort { column, direction }))
}

fn parse_list_query(state: &AppState, params: &serde_json::Value) -> Result<ListQuery, HandlerErr> {
    let filter = get_optional_str(params, "filter")?.unwrap_or_default();
    let sort = parse_sort(params)?;
    let page_index = get_optional_usize(params, "pageIndex")?.unwrap_or(0);
    let page_size = get_optional_usize(params, "pageSize")?.unwrap_or(state.config.page_size);
    if page_size == 0 {
        return Err(HandlerErr::bad_params("pageSize must be greater than 0"));
    }
    Ok(ListQuery {
        filter,
        sort,
        page_index,
        page_size,
    })
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let q = match parse_list_query(state, &req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let page = table::query(state.registrar.records(), &q);
    let rows: Vec<serde_json::Value> = page.rows.iter().map(|r| student_json(r)).collect();
    ok(
        &req.id,
        json!({
            "rows": rows,
            "total": page.total,
            "filteredTotal": page.filtered_total,
            "pageIndex": page.page_index,
            "pageSize": page.page_size,
            "pageSizeOptions": state.config.page_size_options,
            "globalAverage": state.registrar.global_average(),
        }),
    )
}

fn handle_students_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "count": state.registrar.len(),
            "globalAverage": state.registrar.global_average(),
            "byStatus": state.registrar.status_counts(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.create" => Some(handle_students_create(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        "students.summary" => Some(handle_students_summary(state, req)),
        _ => None,
    }
}
