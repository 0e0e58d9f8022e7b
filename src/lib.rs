//! Extract ordered data entries from `@start`/`@stop` delimited script files.
//!
//! [`scanner::scan`] is the pure core: source text in, entries or the first
//! [`diagnostic::Diagnostic`] out. [`script::Script`] adds the file checks
//! around it, and the remaining modules back the `mscript` binary.

pub mod annotation;
pub mod commands;
pub mod config;
pub mod diagnostic;
pub mod diagnostics;
pub mod error;
pub mod info;
pub mod lexer;
pub mod output;
pub mod scanner;
pub mod script;
pub mod syntax;
pub mod types;
pub mod watch;

use std::process::ExitCode;

use crate::error::Error;

/// Process exit code for a failed command.
///
/// `1` when a scan diagnostic rejected the script, `2` when the file itself
/// was rejected (or cannot take the success line), `3` for everything else.
pub fn exit_code(e: &Error) -> ExitCode {
    return match e {
        Error::Script { .. } => ExitCode::from(1),
        Error::FileNotFound { .. }
        | Error::MissingHeader { .. }
        | Error::NotWritable { .. }
        | Error::UnsupportedExtension { .. } => ExitCode::from(2),
        Error::Io(_) | Error::Json(_) | Error::TomlDe(_) | Error::WatchFailed { .. } => {
            ExitCode::from(3)
        },
    };
}
