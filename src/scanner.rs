//! Boundary search and entry extraction over script text.
//!
//! A scan runs in two phases over one [`Lexer`]. The boundary search consumes
//! comments until it meets `@start` (or an early `@stop`) and rejects any other
//! text. The extraction loop then classifies every token until `@stop` or end of
//! input, after which nothing but comments may follow.

use tracing::{debug, trace};

use crate::annotation;
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::syntax::{BULK_COMMENT_CLOSE, BULK_COMMENT_OPEN, Directive, TokenClass, classify};
use crate::types::{Boundary, ScanReport, Termination, Token};

/// Tokens the boundary search examines before giving up on finding `@start`.
pub const DEFAULT_MAX_BOUNDARY_TOKENS: usize = 5000;

/// Knobs for a single scan. `Default` matches the documented format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// End the scan quietly when a bulk comment runs to end of input instead of failing.
    pub allow_unterminated_bulk_comment: bool,
    /// Upper bound on tokens examined while looking for `@start`.
    pub max_boundary_tokens: usize,
    /// Treat the first physical line as a header and never scan it.
    pub skip_header: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        return Self {
            allow_unterminated_bulk_comment: false,
            max_boundary_tokens: DEFAULT_MAX_BOUNDARY_TOKENS,
            skip_header: false,
        };
    }
}

/// Mutable state of one in-flight scan. Created per scan and dropped with it.
#[derive(Debug)]
pub struct ScanState<'src> {
    /// Cursor over the source.
    pub lexer: Lexer<'src>,
    /// Line of the `@start` directive once found.
    pub start_line: Option<u32>,
    /// Set while a `*[{{]` group is being aggregated.
    pub within_group: bool,
}

/// Outcome of consuming a `##!` bulk comment.
enum BulkComment {
    /// Closed by a token containing `!##`; text after the last closer is salvaged.
    Closed {
        /// Non-empty text following the closer on the same token.
        salvaged: Option<String>,
    },
    /// Input ended before any closer.
    Unterminated {
        /// Line of the opening marker.
        line: u32,
    },
}

/// Scan `source` with default options and return its entries in discovery order.
///
/// # Errors
///
/// Returns the first [`Diagnostic`] found in scan order.
pub fn scan(source: &str) -> Result<Vec<String>, Diagnostic> {
    return scan_with(source, &ScanOptions::default());
}

/// Scan `source` and return its entries in discovery order.
///
/// # Errors
///
/// Returns the first [`Diagnostic`] found in scan order.
pub fn scan_with(source: &str, options: &ScanOptions) -> Result<Vec<String>, Diagnostic> {
    return scan_report(source, options).map(|report| return report.entries);
}

/// Scan `source` and report the entries together with where the region began and ended.
///
/// # Errors
///
/// Returns `Diagnostic::EmptySource` for blank input, `Diagnostic::MissingStartDirective`
/// when no `@start` is found in bounds, or the first rule violation in scan order.
pub fn scan_report(source: &str, options: &ScanOptions) -> Result<ScanReport, Diagnostic> {
    ensure_not_empty(source)?;
    let mut lexer = open_lexer(source, options);
    let (boundary, salvaged) = find_boundary(&mut lexer, options)?;

    let line = match boundary {
        Boundary::StopBeforeStart { line } => {
            debug!(line, "found `@stop` before `@start`, nothing to collect");
            return Ok(ScanReport {
                entries: salvaged,
                start_line: None,
                termination: Termination::StopBeforeStart { line },
            });
        },
        Boundary::Start { line } => line,
    };

    debug!(line, "found `@start`, gathering entries");
    let mut state = ScanState { lexer, start_line: Some(line), within_group: false };
    let (entries, termination) = extract_entries(&mut state, salvaged, options)?;

    return Ok(ScanReport { entries, start_line: state.start_line, termination });
}

/// Find where extraction begins without collecting any entries.
///
/// # Errors
///
/// Returns the same diagnostics as the boundary phase of [`scan_report`].
pub fn locate_start(source: &str, options: &ScanOptions) -> Result<Boundary, Diagnostic> {
    ensure_not_empty(source)?;
    let mut lexer = open_lexer(source, options);
    let (boundary, _salvaged) = find_boundary(&mut lexer, options)?;
    return Ok(boundary);
}

/// Consume tokens up to a closing `!##`. The opening token may close itself (`##!!##`).
fn consume_bulk_comment(open: Token<'_>, lexer: &mut Lexer<'_>) -> BulkComment {
    let after_open = open.text.strip_prefix(BULK_COMMENT_OPEN).unwrap_or(open.text);
    if after_open.contains(BULK_COMMENT_CLOSE) {
        return BulkComment::Closed { salvaged: salvage_after_close(after_open) };
    }

    while let Some(token) = lexer.next_token() {
        if token.text.contains(BULK_COMMENT_CLOSE) {
            return BulkComment::Closed { salvaged: salvage_after_close(token.text) };
        }
    }

    return BulkComment::Unterminated { line: open.line };
}

/// Reject empty or whitespace-only sources.
///
/// # Errors
///
/// Returns `Diagnostic::EmptySource` when there is nothing to scan.
fn ensure_not_empty(source: &str) -> Result<(), Diagnostic> {
    if !Lexer::new(source).has_next() {
        return Err(Diagnostic::EmptySource);
    }
    return Ok(());
}

/// Main extraction loop. Takes ownership of the entries salvaged so far and hands them back extended.
///
/// # Errors
///
/// Returns `DuplicateStart`, `UnknownDirective`, `DanglingBulkComment`, annotation
/// diagnostics, or anything raised by the post-`@stop` validation.
fn extract_entries(
    state: &mut ScanState<'_>,
    mut entries: Vec<String>,
    options: &ScanOptions,
) -> Result<(Vec<String>, Termination), Diagnostic> {
    while let Some(token) = state.lexer.next_token() {
        match classify(token.text) {
            TokenClass::Annotation => {
                let entry = annotation::process(token, state)?;
                trace!(line = token.line, entry = %entry, "annotation entry");
                entries.push(entry);
            },
            TokenClass::Blank => {},
            TokenClass::BulkCommentClose => {
                return Err(Diagnostic::DanglingBulkComment { line: token.line });
            },
            TokenClass::BulkCommentOpen => {
                let outcome = consume_bulk_comment(token, &mut state.lexer);
                entries.extend(settle_bulk_comment(outcome, options)?);
            },
            TokenClass::Comment => {
                state.lexer.next_line();
            },
            TokenClass::Directive => match Directive::from_token(token.text) {
                Some(Directive::Start) => {
                    return Err(Diagnostic::DuplicateStart { line: token.line });
                },
                Some(Directive::Stop) => {
                    let trailing = validate_after_stop(&mut state.lexer, options)?;
                    entries.extend(trailing);
                    debug!(line = token.line, count = entries.len(), "found `@stop`");
                    return Ok((entries, Termination::StopDirective { line: token.line }));
                },
                None => return Err(unknown_directive(token)),
            },
            TokenClass::Raw => {
                trace!(line = token.line, entry = token.text, "raw entry");
                entries.push(token.text.to_string());
            },
        }
    }

    debug!(line = state.lexer.line(), count = entries.len(), "reached end of input");
    return Ok((entries, Termination::EndOfInput));
}

/// Boundary search: skip comments until `@start` or an early `@stop`.
/// Returns the boundary plus any text salvaged from bulk-comment closers on the way.
///
/// # Errors
///
/// Returns `DanglingCode` for any raw or annotation token, `DanglingBulkComment`,
/// `UnknownDirective`, `UnterminatedBulkComment`, or `MissingStartDirective` once
/// input or the token bound runs out.
fn find_boundary(
    lexer: &mut Lexer<'_>,
    options: &ScanOptions,
) -> Result<(Boundary, Vec<String>), Diagnostic> {
    let mut salvaged = Vec::new();
    let mut examined = 0_usize;

    while examined < options.max_boundary_tokens {
        let Some(token) = lexer.next_token() else {
            break;
        };
        examined = examined.saturating_add(1);

        match classify(token.text) {
            TokenClass::Annotation | TokenClass::Raw => return Err(dangling_code(token)),
            TokenClass::Blank => {},
            TokenClass::BulkCommentClose => {
                return Err(Diagnostic::DanglingBulkComment { line: token.line });
            },
            TokenClass::BulkCommentOpen => {
                let outcome = consume_bulk_comment(token, lexer);
                salvaged.extend(settle_bulk_comment(outcome, options)?);
            },
            TokenClass::Comment => {
                lexer.next_line();
            },
            TokenClass::Directive => match Directive::from_token(token.text) {
                Some(Directive::Start) => {
                    return Ok((Boundary::Start { line: token.line }, salvaged));
                },
                Some(Directive::Stop) => {
                    return Ok((Boundary::StopBeforeStart { line: token.line }, salvaged));
                },
                None => return Err(unknown_directive(token)),
            },
        }
    }

    return Err(Diagnostic::MissingStartDirective { examined });
}

/// Build a `DanglingCode` diagnostic for a token.
fn dangling_code(token: Token<'_>) -> Diagnostic {
    return Diagnostic::DanglingCode { found: token.text.to_string(), line: token.line };
}

/// Create the lexer for a scan, stepping over the header line when asked.
fn open_lexer<'src>(source: &'src str, options: &ScanOptions) -> Lexer<'src> {
    let mut lexer = Lexer::new(source);
    if options.skip_header {
        lexer.next_line();
    }
    return lexer;
}

/// Text after the last `!##` in `text`, if any.
fn salvage_after_close(text: &str) -> Option<String> {
    return text
        .rsplit_once(BULK_COMMENT_CLOSE)
        .map(|(_, tail)| return tail)
        .filter(|tail| return !tail.is_empty())
        .map(str::to_string);
}

/// Turn a bulk-comment outcome into the entry it salvaged, applying the unterminated policy.
/// An allowed unterminated comment has already exhausted the lexer, so callers end naturally.
///
/// # Errors
///
/// Returns `UnterminatedBulkComment` unless the options allow it.
fn settle_bulk_comment(
    outcome: BulkComment,
    options: &ScanOptions,
) -> Result<Option<String>, Diagnostic> {
    return match outcome {
        BulkComment::Closed { salvaged } => Ok(salvaged),
        BulkComment::Unterminated { line } if options.allow_unterminated_bulk_comment => {
            debug!(line, "bulk comment runs to end of input");
            Ok(None)
        },
        BulkComment::Unterminated { line } => Err(Diagnostic::UnterminatedBulkComment { line }),
    };
}

/// Build an `UnknownDirective` diagnostic for a token.
fn unknown_directive(token: Token<'_>) -> Diagnostic {
    return Diagnostic::UnknownDirective { found: token.text.to_string(), line: token.line };
}

/// After `@stop`, only comments and whitespace may remain.
/// Returns text salvaged from bulk-comment closers.
///
/// # Errors
///
/// Returns `DanglingCode` for any raw, directive, or annotation token,
/// `DanglingBulkComment`, or `UnterminatedBulkComment`.
fn validate_after_stop(
    lexer: &mut Lexer<'_>,
    options: &ScanOptions,
) -> Result<Vec<String>, Diagnostic> {
    let mut salvaged = Vec::new();

    while let Some(token) = lexer.next_token() {
        match classify(token.text) {
            TokenClass::Annotation | TokenClass::Directive | TokenClass::Raw => {
                return Err(dangling_code(token));
            },
            TokenClass::Blank => {},
            TokenClass::BulkCommentClose => {
                return Err(Diagnostic::DanglingBulkComment { line: token.line });
            },
            TokenClass::BulkCommentOpen => {
                let outcome = consume_bulk_comment(token, lexer);
                salvaged.extend(settle_bulk_comment(outcome, options)?);
            },
            TokenClass::Comment => {
                lexer.next_line();
            },
        }
    }

    return Ok(salvaged);
}
