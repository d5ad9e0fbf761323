use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_required_int, get_text};
use crate::ipc::types::{AppState, Request};
use crate::laundry::{LaundryItem, LaundryStore};
use serde_json::json;

fn item_json(item: &LaundryItem) -> serde_json::Value {
    json!({
        "id": item.id,
        "type": item.kind,
        "count": item.count
    })
}

fn laundry_list(store: &LaundryStore) -> serde_json::Value {
    let items: Vec<serde_json::Value> = store.items().iter().map(item_json).collect();
    json!({
        "items": items,
        "totalItems": store.total_items()
    })
}

fn laundry_add(
    store: &mut LaundryStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let kind = get_text(params, "type").unwrap_or_default();
    let count = get_text(params, "count").unwrap_or_default();
    let item = store
        .add(&kind, &count)
        .map_err(|e| HandlerErr::bad_params(e.to_string()))?;
    let item = item_json(item);
    Ok(json!({ "item": item, "totalItems": store.total_items() }))
}

fn laundry_remove(
    store: &mut LaundryStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_int(params, "id")?;
    let removed = store.remove(id);
    Ok(json!({ "removed": removed, "totalItems": store.total_items() }))
}

fn with_store(
    state: &mut AppState,
    req: &Request,
    f: impl FnOnce(&mut LaundryStore, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(stores) = state.stores.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(&mut stores.laundry, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "laundry.list" => Some(with_store(state, req, |store, _| Ok(laundry_list(store)))),
        "laundry.add" => Some(with_store(state, req, laundry_add)),
        "laundry.remove" => Some(with_store(state, req, laundry_remove)),
        "laundry.clear" => Some(with_store(state, req, |store, _| {
            store.clear();
            Ok(json!({ "cleared": true }))
        })),
        _ => None,
    }
}
