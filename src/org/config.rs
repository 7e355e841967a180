//! Parser configuration
//!
//! The parser and exporters only ever see explicit values. Environment
//! lookup lives in [`resolve_from_env`] and is called at the process
//! boundary (the CLI); library callers decide for themselves.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::org::emitters::markdown::emphasis_overrides_from_yaml;

/// Enables `#+INCLUDE:` expansion when set to `true`.
pub const ENV_ENABLE_INCLUDE_FILES: &str = "ORGISH_ENABLE_INCLUDE_FILES";
/// Enables include expansion and restricts it to the given directory.
pub const ENV_INCLUDE_ROOT: &str = "ORGISH_INCLUDE_ROOT";

#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Whether `#+INCLUDE:` directives splice files in. Off unless
    /// explicitly enabled; `None` means "not decided", which
    /// [`resolve_from_env`] may fill in.
    pub allow_include_files: Option<bool>,
    /// When set, include files must live under this directory.
    pub include_root: Option<PathBuf>,
    /// Shift applied to every headline level (used when embedding a
    /// document under an existing outline).
    pub offset: i32,
    /// Don't syntax-highlight source blocks. Recorded for callers that
    /// hook a highlighter into the HTML output; the built-in emitter tags
    /// code blocks with the language class either way.
    pub skip_syntax_highlight: bool,
    /// Drop the text before the first headline, independent of the
    /// document's own `skip` option.
    pub skip_header_lines: bool,
    /// Skip the whole-document typography pass on HTML output.
    pub skip_typography_pass: bool,
    /// YAML file overriding the emphasis marker maps.
    pub markup_file: Option<PathBuf>,
}

impl ParserConfig {
    pub(crate) fn includes_enabled(&self) -> bool {
        self.allow_include_files.unwrap_or(false)
    }
}

/// Fill undecided fields from the environment: include expansion turns on
/// when `ORGISH_ENABLE_INCLUDE_FILES=true` or `ORGISH_INCLUDE_ROOT` is
/// present. Explicit values always win.
pub fn resolve_from_env(mut config: ParserConfig) -> ParserConfig {
    let root = env::var_os(ENV_INCLUDE_ROOT).map(PathBuf::from);
    if config.allow_include_files.is_none() {
        let enabled = env::var(ENV_ENABLE_INCLUDE_FILES)
            .map(|v| v == "true")
            .unwrap_or(false);
        if enabled || root.is_some() {
            config.allow_include_files = Some(true);
        }
    }
    if config.include_root.is_none() {
        config.include_root = root;
    }
    config
}

/// Load emphasis overrides for one format from a YAML markup file.
/// Any failure (missing file, bad YAML, wrong shape) falls back to the
/// built-in markup.
pub fn load_markup_overrides(path: &Path, format: &str) -> Option<HashMap<char, String>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("markup file {} unreadable: {}", path.display(), e);
            return None;
        }
    };
    let doc: serde_yaml::Value = match serde_yaml::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            log::debug!("markup file {} is not valid YAML: {}", path.display(), e);
            return None;
        }
    };
    let overrides = emphasis_overrides_from_yaml(&doc, format);
    if overrides.is_none() {
        log::debug!(
            "markup file {} has no usable {} section",
            path.display(),
            format
        );
    }
    overrides
}
