//! Crate-level error types for mscript file handling and the CLI.

use std::path::PathBuf;

use crate::diagnostic::{Diagnostic, Severity};

/// Everything that can stop a script from being read. Scan rule violations
/// arrive as `Script` with the file they came from; the other variants reject
/// the file itself or the environment around it.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A script file does not exist on disk.
    #[error("could not find the file {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The first line of a script is not the required header.
    #[error("{} is not declared as a script (expected first line `{expected}`)", path.display())]
    MissingHeader {
        /// Header line the config requires.
        expected: String,
        /// Script missing the header.
        path: PathBuf,
    },

    /// A success line was requested but the script is read-only.
    #[error("{} cannot be edited, so the success line cannot be appended", path.display())]
    NotWritable {
        /// Read-only script.
        path: PathBuf,
    },

    /// The scanner rejected a script's content.
    #[error("{}: {diagnostic}", path.display())]
    Script {
        /// The rule violation.
        diagnostic: Diagnostic,
        /// Script the violation was found in.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A file was passed whose extension is not an accepted script extension.
    #[error("wrong file type for {}: required one of [{}], found '{found}'", path.display(), expected.join(", "))]
    UnsupportedExtension {
        /// Accepted extensions.
        expected: Vec<String>,
        /// Extension of the rejected file, empty when it has none.
        found: String,
        /// Rejected file.
        path: PathBuf,
    },

    /// The filesystem watcher could not be set up.
    #[error("watcher setup failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}

impl Error {
    /// Advisory severity, delegating to the diagnostic for scan failures.
    pub const fn severity(&self) -> Severity {
        return match self {
            Self::MissingHeader { .. } | Self::NotWritable { .. } => Severity::USER,
            Self::Script { diagnostic, .. } => diagnostic.severity(),
            Self::FileNotFound { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::TomlDe(_)
            | Self::UnsupportedExtension { .. }
            | Self::WatchFailed { .. } => Severity::FATAL,
        };
    }

    /// A short hint at how to fix the failure, when one exists.
    pub const fn suggested_fix(&self) -> Option<&'static str> {
        return match self {
            Self::FileNotFound { .. } => Some("Check the file path"),
            Self::MissingHeader { .. } => {
                Some("Declare the file as a script by making the header its first line")
            },
            Self::NotWritable { .. } => {
                Some("Modify the file accessibility, or drop `--log` and disable `log_success`")
            },
            Self::Script { diagnostic, .. } => diagnostic.suggested_fix(),
            Self::TomlDe(_) => Some("Fix the syntax or remove unknown keys in `.mscript.toml`"),
            Self::UnsupportedExtension { .. } => {
                Some("Rename the file, or add its extension to `extensions` in `.mscript.toml`")
            },
            Self::Io(_) | Self::Json(_) | Self::WatchFailed { .. } => None,
        };
    }
}
