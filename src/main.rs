mod calc;
mod config;
mod export;
mod form;
mod ipc;
mod view;

use std::io::{self, BufRead, Write};
use tracing::{metadata::LevelFilter, Level};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

fn main() {
    // stdout carries IPC responses; logs go to stderr.
    let fmt = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false);
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(Level::INFO))
        .init();

    let mut state = ipc::AppState::new();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dashboardd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("stdin closed: {e}");
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
                tracing::warn!("bad request line: {e}");
                let resp = ipc::bad_json(e.to_string());
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
}
