//! File watcher: reads a script on startup, then re-reads it whenever it changes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};
use tracing::trace;

use crate::commands::{self, LogSuccess};
use crate::diagnostics;
use crate::error::Error;
use crate::output::Format;

/// Debounce delay between filesystem events and re-read.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals changes to `target` on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    target: PathBuf,
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        let Ok(event) = res else {
            return;
        };
        let relevant = matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
        );
        if relevant && event.paths.iter().any(|p| return p.file_name() == target.file_name()) {
            trace!(kind = ?event.kind, "script changed");
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed { reason: e.to_string() };
    });
}

/// Entry point for the watch command.
///
/// Reads the script once, then watches its directory and re-reads on changes.
/// The success line is never appended here, since the write would retrigger the watcher.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be set up.
pub fn run(file: &Path, format: Format) -> Result<ExitCode, Error> {
    eprintln!("watch: initial read");
    let mut last_code = run_read(file, format);

    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) | None => PathBuf::from("."),
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(file.to_path_buf(), tx)?;
    watcher.watch(&dir, RecursiveMode::NonRecursive).map_err(|e| {
        return Error::WatchFailed { reason: format!("{}: {e}", dir.display()) };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", file.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-reading...");
        last_code = run_read(file, format);
    }

    return Ok(last_code);
}

/// Read once and print the result. Returns the exit code the read maps to.
fn run_read(file: &Path, format: Format) -> ExitCode {
    return match commands::read(file, format, LogSuccess::Never) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            crate::exit_code(&e)
        },
    };
}
