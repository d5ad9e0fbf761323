use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_dailyhelperd");
    let mut child = Command::new(exe)
        .env_remove("DAILYHELPERD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn dailyhelperd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn subject_id(result: &serde_json::Value) -> i64 {
    result
        .pointer("/subject/id")
        .and_then(|v| v.as_i64())
        .expect("subject id")
}

#[test]
fn attendance_edits_keep_counts_consistent() {
    let workspace = temp_dir("dailyhelper-attendance");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.add",
        json!({ "name": "  Math ", "totalClasses": 10, "attendedClasses": "8" }),
    );
    assert_eq!(added.pointer("/subject/name").and_then(|v| v.as_str()), Some("Math"));
    assert_eq!(
        added.pointer("/subject/attendance").and_then(|v| v.as_str()),
        Some("80.00")
    );
    assert_eq!(added.pointer("/subject/onTrack").and_then(|v| v.as_bool()), Some(true));
    let id = subject_id(&added);

    let dec = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.decrementTotal",
        json!({ "id": id }),
    );
    assert_eq!(dec.pointer("/subject/totalClasses").and_then(|v| v.as_i64()), Some(9));
    assert_eq!(dec.pointer("/subject/attendedClasses").and_then(|v| v.as_i64()), Some(8));
    assert_eq!(
        dec.pointer("/subject/attendance").and_then(|v| v.as_str()),
        Some("88.89")
    );

    for i in 0..12 {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("4-{}", i),
            "attendance.decrementTotal",
            json!({ "id": id }),
        );
    }
    let list = request_ok(&mut stdin, &mut reader, "5", "attendance.list", json!({}));
    assert_eq!(list.pointer("/subjects/0/totalClasses").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(list.pointer("/subjects/0/attendedClasses").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(
        list.pointer("/subjects/0/attendance").and_then(|v| v.as_str()),
        Some("100.00")
    );
    assert_eq!(list.get("targetPercent").and_then(|v| v.as_str()), Some("75.00"));

    // Rejected edits come back ok, unchanged.
    for (n, (method, value)) in [
        ("attendance.setTotal", json!(0)),
        ("attendance.setTotal", json!("abc")),
        ("attendance.setAttended", json!(2)),
        ("attendance.setAttended", json!(-1)),
    ]
    .into_iter()
    .enumerate()
    {
        let res = request_ok(
            &mut stdin,
            &mut reader,
            &format!("6-{}", n),
            method,
            json!({ "id": id, "value": value }),
        );
        assert_eq!(res.get("changed").and_then(|v| v.as_bool()), Some(false), "{method}");
        assert_eq!(res.pointer("/subject/totalClasses").and_then(|v| v.as_i64()), Some(1));
    }

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "attendance.setTotal",
        json!({ "id": id, "value": 4 }),
    );
    let inc = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "attendance.incrementAttended",
        json!({ "id": id }),
    );
    assert_eq!(inc.pointer("/subject/attendedClasses").and_then(|v| v.as_i64()), Some(2));
    assert_eq!(
        inc.pointer("/subject/attendance").and_then(|v| v.as_str()),
        Some("50.00")
    );
    assert_eq!(inc.pointer("/subject/onTrack").and_then(|v| v.as_bool()), Some(false));

    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "attendance.incrementTotal",
        json!({ "id": 42 }),
    );
    assert!(missing.get("subject").map(|v| v.is_null()).unwrap_or(false));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn attendance_add_validation_is_reported() {
    let workspace = temp_dir("dailyhelper-attendance-add");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let early = request(&mut stdin, &mut reader, "0", "attendance.list", json!({}));
    assert_eq!(
        early.pointer("/error/code").and_then(|v| v.as_str()),
        Some("no_workspace")
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    for (n, params) in [
        json!({ "name": " ", "totalClasses": 5, "attendedClasses": 1 }),
        json!({ "name": "Art", "totalClasses": 0, "attendedClasses": 0 }),
        json!({ "name": "Art", "totalClasses": 5, "attendedClasses": 6 }),
        json!({ "name": "Art", "totalClasses": "five", "attendedClasses": 1 }),
        json!({ "totalClasses": 5, "attendedClasses": 1 }),
    ]
    .into_iter()
    .enumerate()
    {
        let res = request(&mut stdin, &mut reader, &format!("2-{}", n), "attendance.add", params);
        assert_eq!(res.get("ok").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            res.pointer("/error/code").and_then(|v| v.as_str()),
            Some("bad_params")
        );
    }
    let list = request_ok(&mut stdin, &mut reader, "3", "attendance.list", json!({}));
    assert_eq!(
        list.get("subjects").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn attendance_survives_restart_and_clear_empties_it() {
    let workspace = temp_dir("dailyhelper-attendance-persist");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let math = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.add",
        json!({ "name": "Math", "totalClasses": 10, "attendedClasses": 8 }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.add",
        json!({ "name": "Biology", "totalClasses": 3, "attendedClasses": 1 }),
    );
    let art = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.add",
        json!({ "name": "Art", "totalClasses": 6, "attendedClasses": 6 }),
    );
    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.remove",
        json!({ "id": subject_id(&math) }),
    );
    assert_eq!(removed.get("removed").and_then(|v| v.as_bool()), Some(true));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.setAttended",
        json!({ "id": subject_id(&art), "value": "3" }),
    );
    let before = request_ok(&mut stdin, &mut reader, "7", "attendance.list", json!({}));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let after = request_ok(&mut stdin, &mut reader, "2", "attendance.list", json!({}));
    assert_eq!(after, before);
    assert_eq!(
        after.pointer("/subjects/0/name").and_then(|v| v.as_str()),
        Some("Biology")
    );
    assert_eq!(
        after.pointer("/subjects/1/attendance").and_then(|v| v.as_str()),
        Some("50.00")
    );

    let _ = request_ok(&mut stdin, &mut reader, "3", "attendance.clear", json!({}));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let cleared = request_ok(&mut stdin, &mut reader, "2", "attendance.list", json!({}));
    assert_eq!(
        cleared.get("subjects").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
