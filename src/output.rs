//! Rendering of scan results for the terminal.

use std::fmt::Write as _;

use crate::error::Error;
use crate::types::{ScanReport, Termination};

/// Report format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON of the full report.
    Json,
    /// Numbered data stack framed by where the region started and ended.
    Text,
}

/// Render a report in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if JSON serialization fails.
pub fn render_report(report: &ScanReport, format: Format) -> Result<String, Error> {
    return match format {
        Format::Json => Ok(serde_json::to_string_pretty(report)?),
        Format::Text => Ok(render_text(report)),
    };
}

/// Render the numbered data stack:
///
/// ```text
/// ┌ Found `@start` parameter on line 3, gathering entries:
/// ├ #0:   entry1
/// └ End of file
/// ```
pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    if let Termination::StopBeforeStart { line } = report.termination {
        let _ = writeln!(
            out,
            "┌ Found a `@stop` parameter on line {line} before any entries could be gathered."
        );
        out.push_str(&render_data_stack(&report.entries));
        out.push_str("└ Closing\n");
        return out;
    }

    if let Some(line) = report.start_line {
        let _ = writeln!(out, "┌ Found `@start` parameter on line {line}, gathering entries:");
    }
    out.push_str(&render_data_stack(&report.entries));

    match report.termination {
        Termination::EndOfInput => out.push_str("└ End of file\n"),
        Termination::StopBeforeStart { .. } => {},
        Termination::StopDirective { line } => {
            let _ = writeln!(
                out,
                "└ Found `@stop` parameter on line {line}, terminating and returning any data that has been stored."
            );
        },
    }

    return out;
}

/// One `├ #i:<pad>entry` line per entry, padded so entries line up up to index 999.
fn render_data_stack(entries: &[String]) -> String {
    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let pad = match index {
            0..=9 => "   ",
            10..=99 => "  ",
            _ => " ",
        };
        let _ = writeln!(out, "├ #{index}:{pad}{entry}");
    }
    return out;
}
