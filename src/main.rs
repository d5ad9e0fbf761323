mod attendance;
mod db;
mod entry;
mod ids;
mod ipc;
mod kv;
mod laundry;
mod spending;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

const WORKSPACE_ENV: &str = "DAILYHELPERD_WORKSPACE";

fn init_logging() {
    // stdout carries responses, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_logging();
    let mut state = ipc::AppState::default();

    if let Some(path) = std::env::var_os(WORKSPACE_ENV).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        if let Err(e) = state.open_workspace(path.clone()) {
            tracing::warn!(
                workspace = %path.to_string_lossy(),
                error = %format!("{e:#}"),
                "could not open workspace from {}",
                WORKSPACE_ENV
            );
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed; shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::debug!("stdin closed");
}
