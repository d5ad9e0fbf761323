use crate::attendance::{Edit, SubjectRecord, SubjectStore, TARGET_PERCENT};
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_int, get_required_int, get_required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn subject_json(s: &SubjectRecord) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "totalClasses": s.total_classes,
        "attendedClasses": s.attended_classes,
        "attendance": s.attendance.to_string(),
        "onTrack": s.on_track()
    })
}

fn attendance_list(
    store: &mut SubjectStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subjects: Vec<serde_json::Value> = store.subjects().iter().map(subject_json).collect();
    Ok(json!({
        "subjects": subjects,
        "targetPercent": TARGET_PERCENT.to_string()
    }))
}

fn attendance_add(
    store: &mut SubjectStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let total = get_required_int(params, "totalClasses")?;
    let attended = get_required_int(params, "attendedClasses")?;
    let subject = store
        .add(&name, total, attended)
        .map_err(|e| HandlerErr::bad_params(e.to_string()))?;
    Ok(json!({ "subject": subject_json(subject) }))
}

fn attendance_remove(
    store: &mut SubjectStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_int(params, "id")?;
    Ok(json!({ "removed": store.remove(id) }))
}

fn attendance_clear(
    store: &mut SubjectStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    store.clear();
    Ok(json!({ "cleared": true }))
}

/// Applies one edit. An edit whose value is not an integer is rejected the
/// same way as an out-of-range one: the subject comes back unchanged.
fn attendance_edit(
    store: &mut SubjectStore,
    params: &serde_json::Value,
    edit: Option<Edit>,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_int(params, "id")?;
    let result = match edit {
        Some(edit) => store.mutate(id, edit),
        None => store
            .subjects()
            .iter()
            .find(|s| s.id == id)
            .map(|s| (s, false)),
    };
    Ok(match result {
        Some((subject, changed)) => json!({
            "subject": subject_json(subject),
            "changed": changed
        }),
        None => json!({ "subject": null, "changed": false }),
    })
}

fn with_store(
    state: &mut AppState,
    req: &Request,
    f: impl FnOnce(&mut SubjectStore, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(stores) = state.stores.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(&mut stores.attendance, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

/// `None` when `method` is not an edit method.
fn parse_edit(method: &str, params: &serde_json::Value) -> Option<Option<Edit>> {
    let edit = match method {
        "attendance.setAttended" => get_int(params, "value").map(Edit::SetAttended),
        "attendance.setTotal" => get_int(params, "value").map(Edit::SetTotal),
        "attendance.incrementAttended" => Some(Edit::IncrementAttended),
        "attendance.decrementAttended" => Some(Edit::DecrementAttended),
        "attendance.incrementTotal" => Some(Edit::IncrementTotal),
        "attendance.decrementTotal" => Some(Edit::DecrementTotal),
        _ => return None,
    };
    Some(edit)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if let Some(edit) = parse_edit(&req.method, &req.params) {
        return Some(with_store(state, req, |store, params| {
            attendance_edit(store, params, edit)
        }));
    }
    match req.method.as_str() {
        "attendance.list" => Some(with_store(state, req, attendance_list)),
        "attendance.add" => Some(with_store(state, req, attendance_add)),
        "attendance.remove" => Some(with_store(state, req, attendance_remove)),
        "attendance.clear" => Some(with_store(state, req, attendance_clear)),
        _ => None,
    }
}
