//! Core CLI commands for mscript: read, check, locate.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Error;
use crate::output::{self, Format};
use crate::script::Script;
use crate::types::Boundary;

/// When `read` appends the success line to the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSuccess {
    /// Always append, regardless of config.
    Always,
    /// Append when `log_success` is set in `.mscript.toml`.
    FromConfig,
    /// Never append. Used by `watch`, whose own writes would retrigger it.
    Never,
}

/// Outcome of checking one script file.
struct CheckOutcome {
    /// Script path as found by the walk.
    path: PathBuf,
    /// Entry count on success, the rejection otherwise.
    result: Result<usize, Error>,
}

/// JSON form of a check outcome.
#[derive(Serialize)]
struct CheckJson {
    /// Entries extracted, absent on failure.
    entries: Option<usize>,
    /// Why the script was rejected, absent on success.
    error: Option<CheckErrorJson>,
    /// Script path.
    path: String,
}

/// JSON form of a rejection.
#[derive(Serialize)]
struct CheckErrorJson {
    /// Line the violation was found on, when known.
    line: Option<u32>,
    /// Human-readable description.
    message: String,
    /// Advisory severity, 1 through 5.
    severity: u8,
}

/// Scan every script under `path` and report which ones fail.
///
/// A file path checks just that file. A directory is walked recursively;
/// files with an accepted extension that pass the include/exclude filters
/// are checked in file-name order.
///
/// # Errors
///
/// Returns `Error::TomlDe` or `Error::Io` if the config cannot be loaded,
/// or `Error::Json` if JSON output fails to serialize.
pub fn check(path: &Path, format: Format) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let scripts = collect_scripts(path, &config);

    if scripts.is_empty() {
        eprintln!("No scripts found under {}.", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let outcomes: Vec<CheckOutcome> = scripts
        .into_iter()
        .map(|script| {
            let result = check_one(&script, &config);
            return CheckOutcome { path: script, result };
        })
        .collect();

    let failed = outcomes.iter().filter(|o| return o.result.is_err()).count();

    match format {
        Format::Json => print_check_json(&outcomes)?,
        Format::Text => print_check_text(&outcomes, failed),
    }

    if failed > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Open and scan one script, returning the entry count.
fn check_one(path: &Path, config: &Config) -> Result<usize, Error> {
    let report = Script::open(path, config)?.read()?;
    return Ok(report.entries.len());
}

/// Script files to check: `root` itself when it is a file, otherwise every
/// accepted file beneath it.
fn collect_scripts(root: &Path, config: &Config) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut scripts = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
    {
        let path = entry.path();
        if !config.accepts_extension(path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !config.should_scan(&relative.to_string_lossy()) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }
        scripts.push(path.to_path_buf());
    }
    return scripts;
}

/// Print where extraction begins in a script.
///
/// # Errors
///
/// Returns errors from config loading, file validation, or the boundary scan.
pub fn locate(file: &Path) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let script = Script::open(file, &config)?;

    match script.locate()? {
        Boundary::Start { line } => {
            println!("{}:{line}  @start", file.display());
        },
        Boundary::StopBeforeStart { line } => {
            println!("{}:{line}  @stop (before any @start)", file.display());
        },
    }
    return Ok(());
}

/// Print each outcome as a JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
fn print_check_json(outcomes: &[CheckOutcome]) -> Result<(), Error> {
    let items: Vec<CheckJson> = outcomes
        .iter()
        .map(|outcome| {
            let path = outcome.path.display().to_string();
            return match &outcome.result {
                Ok(count) => CheckJson { entries: Some(*count), error: None, path },
                Err(e) => CheckJson {
                    entries: None,
                    error: Some(CheckErrorJson {
                        line: script_line(e),
                        message: failure_message(e),
                        severity: e.severity().level(),
                    }),
                    path,
                },
            };
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&items)?);
    return Ok(());
}

/// Print one `OK`/`FAIL` line per outcome followed by a summary.
fn print_check_text(outcomes: &[CheckOutcome], failed: usize) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(count) => {
                let noun = if *count == 1 { "entry" } else { "entries" };
                println!("OK      {} ({count} {noun})", outcome.path.display());
            },
            Err(e) => {
                let location = match script_line(e) {
                    Some(line) => format!("{}:{line}", outcome.path.display()),
                    None => outcome.path.display().to_string(),
                };
                println!("FAIL    {location} ({})", failure_message(e));
            },
        }
    }

    println!();
    let total = outcomes.len();
    if failed > 0 {
        println!("{failed} of {total} scripts failed");
    } else {
        println!("All {total} scripts read cleanly");
    }
}

/// Message for a failed check, without the path prefix `Error::Script` carries.
fn failure_message(e: &Error) -> String {
    return match e {
        Error::Script { diagnostic, .. } => diagnostic.to_string(),
        Error::FileNotFound { .. }
        | Error::Io(_)
        | Error::Json(_)
        | Error::MissingHeader { .. }
        | Error::NotWritable { .. }
        | Error::TomlDe(_)
        | Error::UnsupportedExtension { .. }
        | Error::WatchFailed { .. } => e.to_string(),
    };
}

/// Scan a script and print its entries, optionally logging success to the file.
///
/// # Errors
///
/// Returns errors from config loading, file validation, the scan itself,
/// rendering, or appending the success line. A read-only script is rejected
/// with `Error::NotWritable` before anything is printed when a success line is wanted.
pub fn read(file: &Path, format: Format, log: LogSuccess) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let script = Script::open(file, &config)?;

    let append = match log {
        LogSuccess::Always => true,
        LogSuccess::FromConfig => config.log_success,
        LogSuccess::Never => false,
    };
    if append {
        script.ensure_writable()?;
    }

    let report = script.read()?;
    let rendered = output::render_report(&report, format)?;
    match format {
        Format::Json => println!("{rendered}"),
        Format::Text => print!("{rendered}"),
    }

    if append {
        script.log_success()?;
        info!(path = %script.path().display(), "logged successful read");
    }
    return Ok(());
}

/// Line a script rejection points at, if any.
fn script_line(e: &Error) -> Option<u32> {
    return match e {
        Error::Script { diagnostic, .. } => diagnostic.line(),
        Error::FileNotFound { .. }
        | Error::Io(_)
        | Error::Json(_)
        | Error::MissingHeader { .. }
        | Error::NotWritable { .. }
        | Error::TomlDe(_)
        | Error::UnsupportedExtension { .. }
        | Error::WatchFailed { .. } => None,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::diagnostic::Diagnostic;

    #[test]
    fn collects_accepted_scripts_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "x").unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::write(dir.path().join("nested/c.txt"), "x").unwrap();

        let scripts = collect_scripts(dir.path(), &Config::default());
        let names: Vec<String> = scripts
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "nested/c.txt"]);
    }

    #[test]
    fn exclude_prefixes_are_relative_to_the_walk_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("old")).unwrap();
        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();
        std::fs::write(dir.path().join("old/skip.txt"), "x").unwrap();

        let config = Config::parse("exclude = [\"old\"]").unwrap();
        let scripts = collect_scripts(dir.path(), &config);
        assert_eq!(scripts, vec![dir.path().join("keep.txt")]);
    }

    #[test]
    fn a_file_root_is_checked_even_with_another_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "x").unwrap();
        assert_eq!(collect_scripts(&path, &Config::default()), vec![path.clone()]);
        assert!(matches!(
            check_one(&path, &Config::default()),
            Err(Error::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn failure_messages_drop_the_path_prefix() {
        let e = Error::Script {
            diagnostic: Diagnostic::DuplicateStart { line: 7 },
            path: PathBuf::from("a.txt"),
        };
        assert_eq!(script_line(&e), Some(7));
        assert!(!failure_message(&e).starts_with("a.txt"));
        assert_eq!(script_line(&Error::FileNotFound { path: PathBuf::from("a.txt") }), None);
    }

    #[test]
    fn check_one_counts_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.txt");
        std::fs::write(&path, "```mscript\n@start\none two *[@]\n@stop\n").unwrap();
        assert_eq!(check_one(&path, &Config::default()).unwrap(), 3);
    }
}
