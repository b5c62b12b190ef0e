use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request, Roster};
use crate::roster::{StudentFields, StudentRecord, StudentRow, SubmitOutcome};
use serde_json::json;
use tracing::error;

fn student_id_param(req: &Request) -> Result<&str, serde_json::Value> {
    match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => Ok(v),
        None => Err(err(&req.id, "bad_params", "missing studentId", None)),
    }
}

fn fields_param(req: &Request) -> Result<StudentFields, serde_json::Value> {
    let Some(raw) = req.params.get("fields") else {
        return Err(err(&req.id, "bad_params", "missing fields", None));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid fields: {e}"), None))
}

fn records_json(records: &[&StudentRecord]) -> serde_json::Value {
    let rows: Vec<StudentRow> = records.iter().map(|r| StudentRow::from(*r)).collect();
    json!({
        "students": records,
        "rows": rows
    })
}

/// The filtered list the UI re-renders after an intent.
fn view_json(roster: &Roster) -> serde_json::Value {
    let mut v = records_json(&roster.current_view());
    v["term"] = json!(roster.search_term());
    v["editingId"] = json!(roster.editing_id());
    v
}

fn write_failed(req: &Request, e: &anyhow::Error) -> serde_json::Value {
    error!(method = %req.method, error = %format!("{e:#}"), "roster write failed");
    err(&req.id, "db_write_failed", format!("{e:#}"), None)
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let all: Vec<&StudentRecord> = roster.store().all().iter().collect();
    ok(&req.id, records_json(&all))
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match roster.store().find_by_id(student_id) {
        Some(student) => ok(&req.id, json!({ "student": student })),
        None => err(&req.id, "not_found", "student not found", None),
    }
}

fn handle_students_validate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let fields = match fields_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match roster.validate(&fields) {
        Ok(candidate) => ok(&req.id, json!({ "valid": true, "fields": candidate.fields() })),
        Err(errors) => ok(&req.id, json!({ "valid": false, "errors": errors })),
    }
}

fn handle_students_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let fields = match fields_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match roster.submit(&fields) {
        Ok(SubmitOutcome::Committed { record, created }) => {
            let mut result = view_json(roster);
            result["student"] = json!(record);
            result["created"] = json!(created);
            ok(&req.id, result)
        }
        Ok(SubmitOutcome::Invalid(errors)) => err(
            &req.id,
            "validation_failed",
            format!("{} field(s) failed validation", errors.len()),
            Some(json!({ "errors": errors })),
        ),
        Err(e) => write_failed(req, &e),
    }
}

fn handle_students_edit_request(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match roster.request_edit(student_id) {
        Some(student) => ok(
            &req.id,
            json!({
                "student": student,
                "fields": student.fields(),
                "editingId": roster.editing_id()
            }),
        ),
        None => err(&req.id, "not_found", "student not found", None),
    }
}

fn handle_students_delete_request(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match roster.request_delete(student_id) {
        Ok(outcome) => {
            let mut result = view_json(roster);
            result["removed"] = json!(outcome.removed);
            result["editingCleared"] = json!(outcome.editing_cleared);
            ok(&req.id, result)
        }
        Err(e) => write_failed(req, &e),
    }
}

fn handle_students_cancel_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    roster.cancel_edit();
    ok(&req.id, json!({ "editingId": roster.editing_id() }))
}

fn handle_students_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let term = match req.params.get("term") {
        None | Some(serde_json::Value::Null) => "",
        Some(v) => match v.as_str() {
            Some(s) => s,
            None => return err(&req.id, "bad_params", "term must be a string", None),
        },
    };
    roster.search_changed(term);
    ok(&req.id, view_json(roster))
}

fn handle_students_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(roster) = state.roster.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, view_json(roster))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.validate" => Some(handle_students_validate(state, req)),
        "students.submit" => Some(handle_students_submit(state, req)),
        "students.editRequest" => Some(handle_students_edit_request(state, req)),
        "students.deleteRequest" => Some(handle_students_delete_request(state, req)),
        "students.cancelEdit" => Some(handle_students_cancel_edit(state, req)),
        "students.search" => Some(handle_students_search(state, req)),
        "students.view" => Some(handle_students_view(state, req)),
        _ => None,
    }
}
