use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{CONFIG_FILE, Config};
use crate::syntax::{self, AnnotationKind, Directive};

/// Output the comprehensive mscript reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// What the working directory looks like to mscript.
struct CurrentState {
    /// Whether `.mscript.toml` exists.
    config_found: bool,
    /// Whether it parsed; `None` when it is missing.
    config_valid: Option<bool>,
    /// Effective config, defaults when missing or malformed.
    config: Config,
}

/// Inspect the config file under `root`.
fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let loaded = Config::load(root);
    let config_valid = config_found.then(|| return loaded.is_ok());
    let config = loaded.unwrap_or_default();

    return CurrentState { config_found, config_valid, config };
}

// ── Markdown output ───────────────────────────────────────────────────

/// Print the full reference as markdown.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_annotations();
    print_markdown_config();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

/// Version line, directive syntax, and the command overview.
fn print_markdown_header(version: &str) {
    print!(
        "\
# mscript {version}

Extract ordered data entries from script files. Everything between `{start}`
and `{stop}` is split into whitespace-separated entries; annotations stand in
for characters the syntax would otherwise swallow.

## Script Syntax

    ```mscript                        required first line (configurable)
    {comment} comment                         rest of the line is ignored
    {bulk_open} ... {bulk_close}                   bulk comment, may span lines
    {start}                            begin extraction
    {stop}                             end extraction; only comments may follow

## Commands

    mscript read <file>               Print the entries of one script
    mscript read <file> --log         ...and append a success line to it
    mscript check [path]              Read every script under a directory (exit 0/1)
    mscript locate <file>             Print the line extraction starts on
    mscript watch <file>              Re-read a script whenever it changes
    mscript info [--json]             This document

",
        start = Directive::Start.spelling(),
        stop = Directive::Stop.spelling(),
        comment = syntax::COMMENT,
        bulk_open = syntax::BULK_COMMENT_OPEN,
        bulk_close = syntax::BULK_COMMENT_CLOSE,
    );
}

/// Table of annotation markers and what each produces.
fn print_markdown_annotations() {
    println!("## Annotations\n");
    println!("| Marker  | Produces |");
    println!("|---------|----------|");
    for kind in AnnotationKind::ALL {
        let marker = format!("`{}`", kind.marker());
        println!("| {marker:<7} | {} |", annotation_meaning(kind));
    }
    println!();
}

/// Configuration file keys with their defaults.
fn print_markdown_config() {
    print!(
        "\
## Configuration ({CONFIG_FILE})

    extensions = [\"txt\"]                  # accepted script extensions
    header = \"```mscript\"                 # required first line, \"\" disables
    include = [\"scripts/\"]                # check: only these path prefixes
    exclude = [\"scripts/old/\"]            # check: skip these path prefixes
    log_success = false                   # read: append a success line
    max_boundary_tokens = 5000            # tokens examined looking for @start
    allow_unterminated_bulk_comment = false

"
    );
}

/// The effective configuration in the working directory.
fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");
    match state.config_valid {
        None => println!("Config:     {CONFIG_FILE} (not found, using defaults)"),
        Some(true) => println!("Config:     {CONFIG_FILE} (found)"),
        Some(false) => println!("Config:     {CONFIG_FILE} (found, malformed; using defaults)"),
    }
    println!("Extensions: {}", state.config.extensions.join(", "));
    if state.config.header.is_empty() {
        println!("Header:     (not required)");
    } else {
        println!("Header:     {}", state.config.header);
    }
    println!("Boundary:   {} tokens", state.config.max_boundary_tokens);
}

/// Exit code table.
fn print_markdown_exit_codes() {
    println!("## Exit Codes\n");
    println!("| Code | Meaning |");
    println!("|------|---------|");
    for (code, meaning) in EXIT_CODES {
        println!("| {code:<4} | {meaning} |");
    }
}

/// Exit codes and their meaning, shared by both output formats.
const EXIT_CODES: [(u8, &str); 4] = [
    (0, "Success / all scripts read cleanly"),
    (1, "A script was rejected by a scan diagnostic"),
    (2, "A file was rejected: missing, wrong extension, no header, or read-only under --log"),
    (3, "Runtime error"),
];

/// One-line description of what an annotation contributes.
const fn annotation_meaning(kind: AnnotationKind) -> &'static str {
    return match kind {
        AnnotationKind::AnnotationSymbol => "a literal `*`, plus any trailing text",
        AnnotationKind::Blank => "an empty entry, plus any trailing text",
        AnnotationKind::CommentSymbol => "a literal `#`, plus any trailing text",
        AnnotationKind::GroupClose => "closes a data group (an error on its own)",
        AnnotationKind::GroupOpen => "one `{a, b}` entry from tokens up to `*[}}]`",
        AnnotationKind::RootSymbol => "a literal `@`, plus any trailing text",
        AnnotationKind::StoreLine => "the rest of the line as a single entry",
    };
}

// ── JSON output ───────────────────────────────────────────────────────

/// Top-level JSON document.
#[derive(Serialize)]
struct InfoJson {
    /// Annotation markers.
    annotations: Vec<AnnotationInfo>,
    /// Current working directory state.
    current_state: StateJson,
    /// Directive spellings.
    directives: Vec<&'static str>,
    /// Exit code table.
    exit_codes: Vec<ExitCodeInfo>,
    /// Crate version.
    version: String,
}

/// One annotation marker.
#[derive(Serialize)]
struct AnnotationInfo {
    /// Marker as written, e.g. `*[^+]`.
    marker: String,
    /// What it contributes.
    meaning: &'static str,
}

/// One exit code.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit code.
    code: u8,
    /// What it signals.
    meaning: &'static str,
}

/// Effective config as JSON.
#[derive(Serialize)]
struct StateJson {
    /// Whether `.mscript.toml` exists.
    config_found: bool,
    /// Whether it parsed, null when missing.
    config_valid: Option<bool>,
    /// Accepted extensions.
    extensions: Vec<String>,
    /// Required header, empty when disabled.
    header: String,
    /// Boundary scan limit.
    max_boundary_tokens: usize,
}

/// Print the reference as JSON.
fn print_json(state: &CurrentState) {
    let info = InfoJson {
        annotations: AnnotationKind::ALL
            .into_iter()
            .map(|kind| {
                return AnnotationInfo { marker: kind.marker(), meaning: annotation_meaning(kind) };
            })
            .collect(),
        current_state: StateJson {
            config_found: state.config_found,
            config_valid: state.config_valid,
            extensions: state.config.extensions.clone(),
            header: state.config.header.clone(),
            max_boundary_tokens: state.config.max_boundary_tokens,
        },
        directives: Directive::ALL.into_iter().map(Directive::spelling).collect(),
        exit_codes: EXIT_CODES
            .into_iter()
            .map(|(code, meaning)| return ExitCodeInfo { code, meaning })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
