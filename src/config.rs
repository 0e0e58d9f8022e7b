use std::path::Path;

use crate::error::Error;
use crate::scanner::{DEFAULT_MAX_BOUNDARY_TOKENS, ScanOptions};

/// Name of the project configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = ".mscript.toml";

/// Header line a script file must open with unless configured otherwise.
pub const DEFAULT_HEADER: &str = "```mscript";

/// Project configuration loaded from `.mscript.toml`.
/// Include/exclude patterns are path prefixes applied to script files found by `check`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Accept bulk comments that run to end of input.
    pub allow_unterminated_bulk_comment: bool,
    /// Skip paths starting with any of these prefixes.
    exclude: Vec<String>,
    /// File extensions accepted as scripts, without the leading dot.
    pub extensions: Vec<String>,
    /// Required first line of every script; empty disables the check.
    pub header: String,
    /// Only scan paths starting with one of these prefixes (all paths when empty).
    include: Vec<String>,
    /// Append a success line to each script after a clean read.
    pub log_success: bool,
    /// Tokens examined while looking for `@start`.
    pub max_boundary_tokens: usize,
}

/// Raw TOML structure for `.mscript.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct MscriptTomlConfig {
    #[serde(default)]
    allow_unterminated_bulk_comment: bool,
    #[serde(default)]
    exclude: Vec<String>,
    extensions: Option<Vec<String>>,
    header: Option<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    log_success: bool,
    max_boundary_tokens: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            allow_unterminated_bulk_comment: false,
            exclude: Vec::new(),
            extensions: vec!["txt".to_string()],
            header: DEFAULT_HEADER.to_string(),
            include: Vec::new(),
            log_success: false,
            max_boundary_tokens: DEFAULT_MAX_BOUNDARY_TOKENS,
        };
    }
}

impl Config {
    /// Whether `path` carries one of the accepted script extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| return e.to_str()) else {
            return false;
        };
        return self.extensions.iter().any(|allowed| return allowed == ext);
    }

    /// Load config from `.mscript.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the user
    /// wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: MscriptTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        return Ok(Self {
            allow_unterminated_bulk_comment: raw.allow_unterminated_bulk_comment,
            exclude: raw.exclude,
            extensions: raw.extensions.unwrap_or(defaults.extensions),
            header: raw.header.unwrap_or(defaults.header),
            include: raw.include,
            log_success: raw.log_success,
            max_boundary_tokens: raw.max_boundary_tokens.unwrap_or(defaults.max_boundary_tokens),
        });
    }

    /// Scan options derived from this config. The header is skipped when one is required.
    pub fn scan_options(&self) -> ScanOptions {
        return ScanOptions {
            allow_unterminated_bulk_comment: self.allow_unterminated_bulk_comment,
            max_boundary_tokens: self.max_boundary_tokens,
            skip_header: !self.header.is_empty(),
        };
    }

    /// Check whether a script path should be scanned by `check`.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}
