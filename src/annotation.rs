//! `*[id]` annotation handling: literal substitution, whole-line capture, and grouping.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::scanner::ScanState;
use crate::syntax::AnnotationKind;
use crate::types::Token;

/// `*[id]trailing`, with the id running to the first `]`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static ANNOTATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^\*\[([^\]]*)\](.*)$").expect("valid regex"));

/// Split an annotation token into its kind and the text trailing the bracket.
///
/// # Errors
///
/// Returns `Diagnostic::UnknownAnnotation` if the token is not in `*[id]` form
/// or the id is not one of the known annotations.
pub fn parse(token: Token<'_>) -> Result<(AnnotationKind, &str), Diagnostic> {
    let unknown = || {
        return Diagnostic::UnknownAnnotation { found: token.text.to_string(), line: token.line };
    };

    let captures = ANNOTATION_PATTERN.captures(token.text).ok_or_else(unknown)?;
    let id = captures.get(1).map_or("", |m| return m.as_str());
    let trailing = captures.get(2).map_or("", |m| return m.as_str());
    let kind = AnnotationKind::from_id(id).ok_or_else(unknown)?;

    return Ok((kind, trailing));
}

/// Apply an annotation token and return the single entry it produces.
/// `*[^+]` and `*[{{]` consume further input from the scan's lexer.
///
/// # Errors
///
/// Returns `Diagnostic::UnknownAnnotation` for an unrecognized id, or
/// `Diagnostic::DanglingDataGroup` for a `*[}}]` with no open group.
pub fn process<'src>(token: Token<'src>, state: &mut ScanState<'src>) -> Result<String, Diagnostic> {
    let (kind, trailing) = parse(token)?;

    return match kind {
        AnnotationKind::AnnotationSymbol
        | AnnotationKind::Blank
        | AnnotationKind::CommentSymbol
        | AnnotationKind::RootSymbol => {
            let literal = kind.literal().unwrap_or_default();
            Ok(format!("{literal}{trailing}"))
        },
        AnnotationKind::GroupClose => Err(Diagnostic::DanglingDataGroup { line: token.line }),
        AnnotationKind::GroupOpen => Ok(aggregate_group(token, trailing, state)),
        AnnotationKind::StoreLine => Ok(store_line(trailing, &mut state.lexer)),
    };
}

/// Collect tokens up to the group closer and render them as `{a, b, c}`.
///
/// Only a token exactly equal to `*[}}]` closes the group; a token that merely
/// ends in it is kept as an item. The opening token closes on the spot when its
/// trailing text is the closer, as in `*[{{]*[}}]`. End of input also closes the group.
fn aggregate_group<'src>(
    open: Token<'src>,
    trailing: &'src str,
    state: &mut ScanState<'src>,
) -> String {
    let close = AnnotationKind::GroupClose.marker();
    let mut items: Vec<&str> = Vec::new();

    if trailing == close {
        return "{}".to_string();
    }
    if !trailing.is_empty() {
        items.push(trailing);
    }

    state.within_group = true;
    while state.within_group {
        let Some(token) = state.lexer.next_token() else {
            warn!(line = open.line, "data group is never closed, ending it at end of input");
            break;
        };
        if token.text == close {
            state.within_group = false;
        } else {
            items.push(token.text);
        }
    }

    state.within_group = false;
    return format!("{{{}}}", items.join(", "));
}

/// Build a `*[^+]` entry: the annotation's trailing text, a space, then the rest of the physical line.
fn store_line(trailing: &str, lexer: &mut Lexer<'_>) -> String {
    let rest = lexer.next_line().unwrap_or("");
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    if trailing.is_empty() {
        return rest.to_string();
    }
    return format!("{trailing} {rest}");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn region(body: &str) -> Vec<String> {
        scan(&format!("@start\n{body}\n@stop")).unwrap()
    }

    #[test]
    fn symbol_annotations_substitute_their_literal() {
        assert_eq!(region("*[@]x *[#]x *[*]x *[@]"), vec!["@x", "#x", "*x", "@"]);
        assert_eq!(region("*[_] *[_]tail"), vec![" ", " tail"]);
    }

    #[test]
    fn trailing_text_keeps_closing_brackets() {
        assert_eq!(region("*[#]a]b"), vec!["#a]b"]);
    }

    #[test]
    fn store_line_takes_rest_of_physical_line() {
        assert_eq!(
            region("*[^+] Wow!  this is   one entry\nnext"),
            vec!["Wow!  this is   one entry", "next"]
        );
    }

    #[test]
    fn store_line_joins_trailing_text_with_a_space() {
        assert_eq!(region("*[^+]hello big world"), vec!["hello big world"]);
        assert_eq!(region("*[^+]alone"), vec!["alone "]);
    }

    #[test]
    fn store_line_swallows_markers_on_its_line() {
        assert_eq!(region("*[^+] # not a comment @stop\nx"), vec!["# not a comment @stop", "x"]);
    }

    #[test]
    fn store_line_at_end_of_input_is_empty() {
        assert_eq!(scan("@start\n*[^+]").unwrap(), vec![""]);
    }

    #[test]
    fn group_spans_tokens_and_lines() {
        assert_eq!(region("*[{{] a b *[}}]"), vec!["{a, b}"]);
        assert_eq!(
            region("*[{{] This is all\nbeing stored\n:) *[}}] after"),
            vec!["{This, is, all, being, stored, :)}", "after"]
        );
    }

    #[test]
    fn group_seeds_with_trailing_text() {
        assert_eq!(region("*[{{]first second *[}}]"), vec!["{first, second}"]);
    }

    #[test]
    fn empty_groups_render_as_braces() {
        assert_eq!(region("*[{{]*[}}]"), vec!["{}"]);
        assert_eq!(region("*[{{] *[}}]"), vec!["{}"]);
    }

    #[test]
    fn only_an_exact_closer_ends_a_group() {
        assert_eq!(region("*[{{]a*[}}] *[}}]"), vec!["{a*[}}]}"]);
        assert_eq!(region("*[{{] a*[}}] *[}}]"), vec!["{a*[}}]}"]);
        assert_eq!(region("*[{{] x b*[}}] y *[}}]"), vec!["{x, b*[}}], y}"]);
    }

    #[test]
    fn group_items_are_not_interpreted() {
        assert_eq!(region("*[{{] # *[@] @start last *[}}]"), vec!["{#, *[@], @start, last}"]);
    }

    #[test]
    fn unclosed_group_ends_at_end_of_input() {
        assert_eq!(scan("@start\n*[{{] a\nb").unwrap(), vec!["{a, b}"]);
    }

    #[test]
    fn lone_group_close_is_dangling() {
        let err = scan("@start\na\n  *[}}]\n@stop").unwrap_err();
        assert_eq!(err, Diagnostic::DanglingDataGroup { line: 3 });
    }

    #[test]
    fn unknown_ids_are_rejected() {
        for bad in ["*[?]", "*", "*@", "*[]", "*[@", "*[{]"] {
            let err = scan(&format!("@start\n{bad}\n@stop")).unwrap_err();
            assert_eq!(
                err,
                Diagnostic::UnknownAnnotation { found: bad.to_string(), line: 2 },
                "{bad}"
            );
        }
    }

    #[test]
    fn parse_splits_kind_and_trailing() {
        let token = Token { line: 4, text: "*[^+]abc" };
        assert_eq!(parse(token).unwrap(), (AnnotationKind::StoreLine, "abc"));
    }
}
