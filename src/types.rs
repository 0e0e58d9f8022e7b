//! Core domain types for script tokens and scan results.

use serde::Serialize;

/// A whitespace-delimited token and the physical line it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// One-based physical line of the token.
    pub line: u32,
    /// Raw token text, never empty.
    pub text: &'src str,
}

/// Where the boundary search resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// `@start` found on the given line; extraction continues after it.
    Start {
        /// One-based line of the `@start` token.
        line: u32,
    },
    /// `@stop` found before any `@start`; there is nothing to collect.
    StopBeforeStart {
        /// One-based line of the `@stop` token.
        line: u32,
    },
}

/// How a successful scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Termination {
    /// Input ran out after `@start` without a `@stop`.
    EndOfInput,
    /// `@stop` appeared before `@start`.
    StopBeforeStart {
        /// One-based line of the `@stop` token.
        line: u32,
    },
    /// `@stop` closed the extraction region.
    StopDirective {
        /// One-based line of the `@stop` token.
        line: u32,
    },
}

/// Result of a successful scan: the collected entries plus where the region began and ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Entries in discovery order.
    pub entries: Vec<String>,
    /// One-based line of `@start`, absent when `@stop` came first.
    pub start_line: Option<u32>,
    /// How the scan ended.
    pub termination: Termination,
}
