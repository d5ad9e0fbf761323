use crate::entry::{leading_float, leading_int};
use crate::ipc::error::HandlerErr;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Text as typed into a form field. Numbers are accepted and rendered as text.
pub fn get_text(params: &serde_json::Value, key: &str) -> Option<String> {
    match params.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An integer given either as a JSON number or as text starting with one.
/// Fractions are truncated.
pub fn get_int(params: &serde_json::Value, key: &str) -> Option<i64> {
    let v = params.get(key)?;
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        return f.is_finite().then_some(f.trunc() as i64);
    }
    leading_int(v.as_str()?)
}

pub fn get_required_int(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    get_int(params, key).ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer", key)))
}

/// An amount given either as a JSON number or as text starting with one.
pub fn get_amount(params: &serde_json::Value, key: &str) -> Option<f64> {
    let v = params.get(key)?;
    match v.as_f64() {
        Some(f) => Some(f),
        None => leading_float(v.as_str()?),
    }
}
