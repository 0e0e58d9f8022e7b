//! Rule violations raised while scanning script text.

use std::fmt;

use serde::Serialize;

/// Advisory weight of a diagnostic, from 1 (trivial to fix) to 5 (the file cannot be read at all).
/// Every severity aborts the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Severity(
    /// Level in `1..=5`.
    u8,
);

impl Severity {
    /// Minor error, easily fixed.
    pub const MINOR: Self = Self(1);
    /// Slight syntax error.
    pub const SYNTAX: Self = Self(2);
    /// The scanner hit a user error while reading the text.
    pub const USER: Self = Self(4);
    /// The file cannot be read or scanned at all.
    pub const FATAL: Self = Self(5);

    /// The numeric level.
    pub const fn level(self) -> u8 {
        return self.0;
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}/5", self.0);
    }
}

/// The first rule violation found in scan order. Terminal: the scan returns no entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// A `!##` closer with no open bulk comment.
    #[error("Dangling bulk comment on line {line}")]
    DanglingBulkComment {
        /// One-based line of the closer.
        line: u32,
    },

    /// Non-comment text where only comments and directives are allowed.
    #[error("Dangling code on line {line} (found: '{found}')")]
    DanglingCode {
        /// The offending token.
        found: String,
        /// One-based line of the token.
        line: u32,
    },

    /// A `*[}}]` with no open group.
    #[error("Dangling data group on line {line}")]
    DanglingDataGroup {
        /// One-based line of the closer.
        line: u32,
    },

    /// A second `@start` inside the extraction region.
    #[error("Found duplicate `@start` parameter on line {line}")]
    DuplicateStart {
        /// One-based line of the duplicate.
        line: u32,
    },

    /// The source has no content at all.
    #[error("Empty file")]
    EmptySource,

    /// Unexpected failure underneath the scanner (I/O, encoding).
    #[error("Native error ({reason})")]
    Internal {
        /// Description of the underlying failure.
        reason: String,
    },

    /// No `@start` within the token bound.
    #[error("Could not find parameter `@start` while parsing the file ({examined} tokens examined)")]
    MissingStartDirective {
        /// Number of tokens examined before giving up.
        examined: usize,
    },

    /// An `*[id]` token whose id is not a known annotation.
    #[error("Unknown annotation on line {line}: {found}")]
    UnknownAnnotation {
        /// The offending token.
        found: String,
        /// One-based line of the token.
        line: u32,
    },

    /// An `@` token other than `@start` or `@stop`.
    #[error("Non-existent root command '{found}' on line {line}")]
    UnknownDirective {
        /// The offending token.
        found: String,
        /// One-based line of the token.
        line: u32,
    },

    /// A `##!` bulk comment still open at end of input.
    #[error("Bulk comment opened on line {line} is never closed")]
    UnterminatedBulkComment {
        /// One-based line of the opener.
        line: u32,
    },
}

impl Diagnostic {
    /// Advisory severity of this violation.
    pub const fn severity(&self) -> Severity {
        return match self {
            Self::DanglingBulkComment { .. }
            | Self::DanglingDataGroup { .. }
            | Self::DuplicateStart { .. }
            | Self::UnterminatedBulkComment { .. } => Severity::MINOR,
            Self::DanglingCode { .. } | Self::EmptySource => Severity::SYNTAX,
            Self::MissingStartDirective { .. }
            | Self::UnknownAnnotation { .. }
            | Self::UnknownDirective { .. } => Severity::USER,
            Self::Internal { .. } => Severity::FATAL,
        };
    }

    /// A short hint at how to fix the source, when one exists.
    pub const fn suggested_fix(&self) -> Option<&'static str> {
        return match self {
            Self::DanglingBulkComment { .. } => Some("Look over written bulk comment declarations"),
            Self::DanglingCode { .. } => Some("Remove dangling code, or comment it out with `#`"),
            Self::DanglingDataGroup { .. } => Some("Look over written data group annotations"),
            Self::DuplicateStart { .. } => Some("Remove the duplicate `@start` parameter"),
            Self::EmptySource | Self::Internal { .. } => None,
            Self::MissingStartDirective { .. } => {
                Some("Add `@start` to declare where the scanner should start collecting entries")
            },
            Self::UnknownAnnotation { .. } => {
                Some("Use one of *[@] *[#] *[*] *[_] *[^+] *[{{] *[}}]")
            },
            Self::UnknownDirective { .. } => Some("The only root commands are `@start` and `@stop`"),
            Self::UnterminatedBulkComment { .. } => Some("Close the bulk comment with `!##`"),
        };
    }

    /// Heading used when rendering the diagnostic.
    pub const fn title(&self) -> &'static str {
        return match self {
            Self::DanglingBulkComment { .. } => "Dangling Bulk Comment",
            Self::DanglingCode { .. } => "Dangling Code",
            Self::DanglingDataGroup { .. } => "Dangling Data Group",
            Self::DuplicateStart { .. } => "Duplicate Start",
            Self::EmptySource => "Empty Source",
            Self::Internal { .. } => "Internal Error",
            Self::MissingStartDirective { .. } => "Missing Start Directive",
            Self::UnknownAnnotation { .. } => "Unknown Annotation",
            Self::UnknownDirective { .. } => "Unknown Directive",
            Self::UnterminatedBulkComment { .. } => "Unterminated Bulk Comment",
        };
    }

    /// Line the violation was found on, for diagnostics tied to a token.
    pub const fn line(&self) -> Option<u32> {
        return match self {
            Self::DanglingBulkComment { line }
            | Self::DanglingCode { line, .. }
            | Self::DanglingDataGroup { line }
            | Self::DuplicateStart { line }
            | Self::UnknownAnnotation { line, .. }
            | Self::UnknownDirective { line, .. }
            | Self::UnterminatedBulkComment { line } => Some(*line),
            Self::EmptySource | Self::Internal { .. } | Self::MissingStartDirective { .. } => None,
        };
    }
}
