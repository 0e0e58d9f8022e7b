//! Script files on disk: validation before a scan and the optional success log after it.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::scanner::{self, ScanOptions};
use crate::types::{Boundary, ScanReport};

/// A validated script file, held in memory for scanning.
#[derive(Debug)]
pub struct Script {
    /// Options the scan runs with.
    options: ScanOptions,
    /// Location on disk.
    path: PathBuf,
    /// Full file content.
    source: String,
}

impl Script {
    /// Fail early if the success line could not be appended.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotWritable` for a read-only file, or `Error::Io` if its
    /// metadata cannot be read.
    pub fn ensure_writable(&self) -> Result<(), Error> {
        if std::fs::metadata(&self.path)?.permissions().readonly() {
            return Err(Error::NotWritable { path: self.path.clone() });
        }
        return Ok(());
    }

    /// Append the success line to the script file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened for appending or written.
    pub fn log_success(&self) -> Result<(), Error> {
        let line = success_line(&Local::now());
        let mut file = std::fs::OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        debug!(path = %self.path.display(), "appended success line");
        return Ok(());
    }

    /// Validate and load a script file.
    ///
    /// Checks, in order: the extension is accepted, the file exists, its content
    /// is readable text, it is not empty, and it opens with the configured header.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedExtension`, `Error::FileNotFound`,
    /// `Error::MissingHeader`, or `Error::Script` carrying `Diagnostic::Internal`
    /// for unreadable content or `Diagnostic::EmptySource` for an empty file.
    pub fn open(path: &Path, config: &Config) -> Result<Self, Error> {
        if !config.accepts_extension(path) {
            let found = path
                .extension()
                .map(|e| return e.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(Error::UnsupportedExtension {
                expected: config.extensions.clone(),
                found,
                path: path.to_path_buf(),
            });
        }

        let source = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => {
                return Err(Error::Script {
                    diagnostic: Diagnostic::Internal { reason: e.to_string() },
                    path: path.to_path_buf(),
                });
            },
            Ok(s) => s,
        };

        if source.trim().is_empty() {
            return Err(Error::Script {
                diagnostic: Diagnostic::EmptySource,
                path: path.to_path_buf(),
            });
        }

        if !config.header.is_empty() {
            let first = source.lines().next().unwrap_or("");
            if first != config.header {
                return Err(Error::MissingHeader {
                    expected: config.header.clone(),
                    path: path.to_path_buf(),
                });
            }
        }

        return Ok(Self { options: config.scan_options(), path: path.to_path_buf(), source });
    }

    /// Find where extraction begins without collecting entries.
    ///
    /// # Errors
    ///
    /// Returns `Error::Script` with the first violation before the boundary.
    pub fn locate(&self) -> Result<Boundary, Error> {
        return scanner::locate_start(&self.source, &self.options).map_err(|diagnostic| {
            return Error::Script { diagnostic, path: self.path.clone() };
        });
    }

    /// Location of the script on disk.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Scan the script.
    ///
    /// # Errors
    ///
    /// Returns `Error::Script` with the first rule violation in scan order.
    pub fn read(&self) -> Result<ScanReport, Error> {
        return scanner::scan_report(&self.source, &self.options).map_err(|diagnostic| {
            return Error::Script { diagnostic, path: self.path.clone() };
        });
    }
}

/// The comment line appended after a successful read, leading blank line included.
pub fn success_line(now: &DateTime<Local>) -> String {
    let date = now.format("%m/%d/%Y");
    let time = now.format("%H:%M:%S");
    return format!("\n\n# This file was read at {date} on {time} - SUCCESS");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use chrono::TimeZone as _;

    use super::*;
    use crate::types::Termination;

    fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_a_well_formed_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "a.txt", "```mscript\n# data\n@start\nx y\n@stop\n");
        let report = Script::open(&path, &Config::default()).unwrap().read().unwrap();
        assert_eq!(report.entries, vec!["x", "y"]);
        assert_eq!(report.start_line, Some(3));
        assert_eq!(report.termination, Termination::StopDirective { line: 5 });
    }

    #[test]
    fn rejects_wrong_extension_before_touching_disk() {
        let err = Script::open(Path::new("missing.md"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension { ref found, .. } if found == "md"));
        assert_eq!(err.severity().level(), 5);
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Script::open(&dir.path().join("nope.txt"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "empty.txt", "");
        let err = Script::open(&path, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Script { diagnostic: Diagnostic::EmptySource, .. }));
        assert_eq!(err.severity().level(), 2);
    }

    #[test]
    fn rejects_missing_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "plain.txt", "@start\nx\n");
        let err = Script::open(&path, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingHeader { .. }));
        assert_eq!(err.severity().level(), 4);

        let config = Config::parse("header = \"\"").unwrap();
        let report = Script::open(&path, &config).unwrap().read().unwrap();
        assert_eq!(report.entries, vec!["x"]);
    }

    #[test]
    fn scan_failures_carry_the_path_and_physical_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "bad.txt", "```mscript\n@start\n@stop\nleft over\n");
        let err = Script::open(&path, &Config::default()).unwrap().read().unwrap_err();
        let Error::Script { diagnostic, path: reported } = err else {
            panic!("expected a script error, got {err:?}");
        };
        assert_eq!(reported, path);
        assert_eq!(diagnostic, Diagnostic::DanglingCode { found: "left".to_string(), line: 4 });
    }

    #[test]
    fn locate_counts_the_header_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "loc.txt", "```mscript\n\n# intro\n@start\nx");
        let boundary = Script::open(&path, &Config::default()).unwrap().locate().unwrap();
        assert_eq!(boundary, Boundary::Start { line: 4 });
    }

    #[test]
    fn read_only_scripts_refuse_the_success_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "ro.txt", "```mscript\n@start\na");
        let script = Script::open(&path, &Config::default()).unwrap();
        script.ensure_writable().unwrap();

        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();

        let err = script.ensure_writable().unwrap_err();
        assert!(matches!(err, Error::NotWritable { .. }));
        assert_eq!(err.severity().level(), 4);
        assert!(err.suggested_fix().unwrap().contains("log_success"));
        assert_eq!(script.read().unwrap().entries, vec!["a"]);
    }

    #[test]
    fn success_line_uses_month_day_year() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(success_line(&now), "\n\n# This file was read at 03/09/2024 on 07:05:01 - SUCCESS");
    }

    #[test]
    fn logged_file_still_scans_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "log.txt", "```mscript\n@start\na\n@stop");
        let script = Script::open(&path, &Config::default()).unwrap();
        let before = script.read().unwrap();
        script.log_success().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("- SUCCESS").count(), 1);
        let after = Script::open(&path, &Config::default()).unwrap().read().unwrap();
        assert_eq!(after.entries, before.entries);
    }
}
