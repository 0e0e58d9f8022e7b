use std::fmt::Write as _;

use crate::error::Error;

/// ANSI bold, applied to markdown headings on stderr.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened,
/// where, how to fix it, and how severe it is.
pub fn render_error(e: &Error) -> String {
    let mut out = format!("# Error: {}\n\n", title(e));

    match e {
        Error::Script { diagnostic, path } => {
            let _ = writeln!(out, "{diagnostic}");
            let _ = writeln!(out);
            match diagnostic.line() {
                Some(line) => {
                    let _ = writeln!(out, "In `{}:{line}`", path.display());
                },
                None => {
                    let _ = writeln!(out, "In `{}`", path.display());
                },
            }
        },
        Error::FileNotFound { .. }
        | Error::Io(_)
        | Error::Json(_)
        | Error::MissingHeader { .. }
        | Error::NotWritable { .. }
        | Error::TomlDe(_)
        | Error::UnsupportedExtension { .. }
        | Error::WatchFailed { .. } => {
            let _ = writeln!(out, "{e}");
        },
    }

    if let Some(fix) = e.suggested_fix() {
        let _ = write!(out, "\n## Fix\n\n{fix}\n");
    }

    let _ = write!(out, "\nSeverity: {}\n", e.severity());
    return out;
}

/// Heading for an error block.
const fn title(e: &Error) -> &'static str {
    return match e {
        Error::FileNotFound { .. } => "File Not Found",
        Error::Io(_) => "Internal Error",
        Error::Json(_) => "JSON Serialization",
        Error::MissingHeader { .. } => "Missing Header",
        Error::NotWritable { .. } => "Read-Only Script",
        Error::Script { diagnostic, .. } => diagnostic.title(),
        Error::TomlDe(_) => "Invalid TOML",
        Error::UnsupportedExtension { .. } => "Wrong File Type",
        Error::WatchFailed { .. } => "Watch Failed",
    };
}
