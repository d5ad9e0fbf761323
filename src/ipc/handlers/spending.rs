use crate::ipc::error::{err, ok};
use crate::ipc::helpers::get_amount;
use crate::ipc::types::{AppState, Request};
use crate::spending::{SpendingLedger, SpendingStore};
use serde_json::json;

fn ledger_json(l: &SpendingLedger) -> serde_json::Value {
    json!({
        "balance": l.balance,
        "totalSpending": l.total_spending,
        "regularExpenses": l.regular_expenses,
        "dailyLimit": l.daily_limit,
        "remaining": l.remaining(),
        "remainingDisplay": format!("{:.2}", l.remaining())
    })
}

type AmountOp = fn(&mut SpendingStore, f64) -> bool;

fn amount_op(method: &str) -> Option<AmountOp> {
    let op: AmountOp = match method {
        "spending.addExpense" => SpendingStore::add_expense,
        "spending.addIncome" => SpendingStore::add_income,
        "spending.addOtherExpense" => SpendingStore::add_other_expense,
        "spending.setDailyLimit" => SpendingStore::set_daily_limit,
        "spending.setBalance" => SpendingStore::set_balance,
        _ => return None,
    };
    Some(op)
}

fn handle_amount_op(state: &mut AppState, req: &Request, op: AmountOp) -> serde_json::Value {
    let Some(stores) = state.stores.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let store = &mut stores.spending;
    // Missing or non-numeric amounts are declined like non-positive ones.
    let applied = match get_amount(&req.params, "amount") {
        Some(amount) => op(store, amount),
        None => false,
    };
    ok(
        &req.id,
        json!({
            "applied": applied,
            "ledger": ledger_json(store.ledger())
        }),
    )
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(stores) = state.stores.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "ledger": ledger_json(stores.spending.ledger()) }))
}

fn handle_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(stores) = state.stores.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    stores.spending.reset();
    ok(&req.id, json!({ "ledger": ledger_json(stores.spending.ledger()) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if let Some(op) = amount_op(&req.method) {
        return Some(handle_amount_op(state, req, op));
    }
    match req.method.as_str() {
        "spending.get" => Some(handle_get(state, req)),
        "spending.reset" => Some(handle_reset(state, req)),
        _ => None,
    }
}
