//! Document parsing
//!
//! Turns raw input lines into a `Document`: an ordered list of headlines
//! (each owning the body lines of its own section), the lines before the
//! first headline, and the in-buffer settings that steer export.
//!
//! Parsing is a single forward pass with a mode state machine. The mode
//! decides how much interpretation a line receives:
//!
//! - `Normal`, `Quote`, `Center`: full structural interpretation
//!   (headlines, tables, settings).
//! - `Example`, `Html`, `Src`: every line is forced to `Code`; structural
//!   markup inside the block is never interpreted.
//! - `Comment`: lines are dropped entirely.
//! - `PropertyDrawer`: lines feed the current headline's drawer.
//! - `Other`: an unrecognized block kind; lines pass through untouched.
//!
//! Most per-line decisions depend on at most one line of lookback
//! (`#+name:` adjacency, `#+RESULTS:` muting, table-header promotion).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::org::config::ParserConfig;
use crate::org::headline::Headline;
use crate::org::line::{BlockKind, IncludeOptions, Line, ParagraphType};
use crate::org::OrgError;

/// Nested `#+INCLUDE:` directives beyond this depth are skipped like a
/// failed existence check.
const INCLUDE_DEPTH_CAP: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Quote,
    Center,
    Comment,
    Example,
    Html,
    Src,
    PropertyDrawer,
    /// A block kind the grammar does not know; contents pass through.
    Other(String),
}

impl Mode {
    fn for_block(kind: &BlockKind) -> Mode {
        match kind {
            BlockKind::Src => Mode::Src,
            BlockKind::Example => Mode::Example,
            BlockKind::Quote => Mode::Quote,
            BlockKind::Center => Mode::Center,
            BlockKind::Html => Mode::Html,
            BlockKind::Comment => Mode::Comment,
            BlockKind::Other(name) => Mode::Other(name.clone()),
        }
    }
}

/// Where the previously parsed line was stored, so one-line-lookback rules
/// can still mutate it after the fact.
#[derive(Debug, Clone, Copy)]
enum PrevSlot {
    Header(usize),
    Body(usize, usize),
    Dropped,
}

/// A fully parsed document.
#[derive(Debug, Serialize)]
pub struct Document {
    /// Raw input lines, as given.
    pub lines: Vec<String>,
    pub headlines: Vec<Headline>,
    /// Lines before the first headline.
    pub header_lines: Vec<Line>,
    /// In-buffer settings (`#+KEY: value`), keys upper-cased. OPTIONS and
    /// todo-keyword settings are broken out below instead.
    pub settings: HashMap<String, String>,
    /// Tokens from `#+OPTIONS:` lines.
    pub options: HashMap<String, String>,
    /// Workflow keywords from `#+TODO:` / `#+SEQ_TODO:` / `#+TYP_TODO:`.
    pub custom_keywords: Vec<String>,
    /// `#+LINK: name template` abbreviations.
    pub link_abbrevs: HashMap<String, String>,
    #[serde(skip)]
    pub config: ParserConfig,
}

impl Document {
    /// Parse a document from a single string, split on newlines.
    pub fn from_str(text: &str, config: ParserConfig) -> Document {
        let lines: Vec<String> = text.split('\n').map(|l| l.to_string()).collect();
        Document::from_lines(lines, config)
    }

    /// Parse a document from pre-split lines.
    pub fn from_lines(lines: Vec<String>, config: ParserConfig) -> Document {
        let mut doc = Document {
            lines: lines.clone(),
            headlines: Vec::new(),
            header_lines: Vec::new(),
            settings: HashMap::new(),
            options: HashMap::new(),
            custom_keywords: Vec::new(),
            link_abbrevs: HashMap::new(),
            config,
        };
        let mut state = ParseState {
            current: None,
            results_block_should_be_exported: false,
        };
        doc.parse_lines(&lines, &mut state, 0);
        doc
    }

    /// Parse a document from a file. I/O failure is the one fatal path.
    pub fn load<P: AsRef<Path>>(path: P, config: ParserConfig) -> Result<Document, OrgError> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| OrgError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Document::from_str(&text, config))
    }

    pub fn export_select_tags(&self) -> Vec<String> {
        self.split_setting("EXPORT_SELECT_TAGS")
    }

    pub fn export_exclude_tags(&self) -> Vec<String> {
        self.split_setting("EXPORT_EXCLUDE_TAGS")
    }

    fn split_setting(&self, key: &str) -> Vec<String> {
        self.settings
            .get(key)
            .map(|v| v.split_whitespace().map(|t| t.to_string()).collect())
            .unwrap_or_default()
    }

    /// Export todo keywords on headings? (`todo:t`)
    pub fn export_todo(&self) -> bool {
        self.options.get("todo").map(|v| v == "t").unwrap_or(false)
    }

    /// Export footnotes? (`f:t`)
    pub fn export_footnotes(&self) -> bool {
        self.options.get("f").map(|v| v == "t").unwrap_or(false)
    }

    /// Export heading numbers? (`num:t`)
    pub fn export_heading_number(&self) -> bool {
        self.options.get("num").map(|v| v == "t").unwrap_or(false)
    }

    /// Skip text before the first heading? (`skip:t`)
    pub fn skip_header_lines(&self) -> bool {
        self.options.get("skip").map(|v| v == "t").unwrap_or(false)
            || self.config.skip_header_lines
    }

    /// Export tables? On unless explicitly `|:nil`.
    pub fn export_tables(&self) -> bool {
        self.options.get("|").map(|v| v != "nil").unwrap_or(true)
    }

    /// Rewrite `_{}`/`^{}` sub/superscripts? On unless explicitly `^:nil`.
    pub fn use_sub_superscripts(&self) -> bool {
        self.options.get("^").map(|v| v != "nil").unwrap_or(true)
    }

    fn parse_lines(&mut self, lines: &[String], state: &mut ParseState, depth: usize) {
        let mut mode = Mode::Normal;
        let mut previous: Option<Line> = None;
        let mut prev_slot = PrevSlot::Dropped;
        let mut table_header_set = false;

        for text in lines {
            let mut line = Line::new(text);

            if self.config.includes_enabled() {
                if let Some(spec) = line.include_spec() {
                    if !self.check_include_file(&spec.path) {
                        continue;
                    }
                    if depth >= INCLUDE_DEPTH_CAP {
                        log::debug!("include depth cap reached, skipping {}", spec.path);
                        continue;
                    }
                    match read_include_data(&spec.path, &spec.options) {
                        Some(included) => self.parse_lines(&included, state, depth + 1),
                        None => continue,
                    }
                }
            }

            if let Some((name, template)) = line.link_abbrev() {
                self.link_abbrevs.insert(name, template);
            }

            if let Some(kind) = line.end_block() {
                if mode == Mode::for_block(&kind) || mode == Mode::Comment {
                    mode = Mode::Normal;
                }
            }
            if line.is_property_drawer_end() && mode == Mode::PropertyDrawer {
                mode = Mode::Normal;
            }

            match mode {
                Mode::Normal | Mode::Quote | Mode::Center => {
                    if line.paragraph_type() == ParagraphType::TableSeparator {
                        if let Some(prev) = previous.as_ref() {
                            if prev.effective_type() == ParagraphType::TableRow && !table_header_set
                            {
                                self.assign_previous(prev_slot, ParagraphType::TableHeader);
                                table_header_set = true;
                            }
                        }
                    }
                    if !line.is_table() {
                        table_header_set = false;
                    }
                }
                Mode::Example | Mode::Html | Mode::Src => {
                    if let Some(prev) = previous.as_ref() {
                        set_name_for_code_block(prev, &mut line);
                        set_mode_for_results_block_contents(prev, &mut line, state);
                    }
                    // Inside literal blocks, structural markup is never
                    // interpreted.
                    line.assigned_type = Some(ParagraphType::Code);
                }
                _ => {}
            }

            let mut registered_headline = false;
            if mode == Mode::Normal {
                if line.paragraph_type() == ParagraphType::Headline {
                    let headline =
                        Headline::parse(line.text(), self.config.offset, &self.custom_keywords);
                    self.headlines.push(headline);
                    state.current = Some(self.headlines.len() - 1);
                    registered_headline = true;
                }

                if let Some((key, value)) = line.in_buffer_setting() {
                    self.store_in_buffer_setting(&key.to_ascii_uppercase(), &value);
                }

                if let Some(kind) = line.begin_block() {
                    mode = Mode::for_block(&kind);
                    state.results_block_should_be_exported =
                        line.results_block_should_be_exported();
                }

                if let Some(prev) = previous.as_ref() {
                    set_name_for_code_block(prev, &mut line);
                    set_mode_for_results_block_contents(prev, &mut line, state);
                    if prev.is_property_drawer_begin() {
                        mode = Mode::PropertyDrawer;
                    }
                }
            }

            if mode == Mode::PropertyDrawer {
                if let (Some(idx), Some((key, value))) = (state.current, line.property_drawer_item())
                {
                    let drawer = &mut self.headlines[idx].property_drawer;
                    match drawer.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = value,
                        None => drawer.push((key, value)),
                    }
                }
            }

            previous = Some(line.clone());
            prev_slot = if registered_headline {
                // The headline's own line is already body_lines[0].
                PrevSlot::Body(state.current.unwrap_or(0), 0)
            } else if mode == Mode::Comment {
                PrevSlot::Dropped
            } else {
                match state.current {
                    Some(idx) => {
                        self.headlines[idx].body_lines.push(line);
                        PrevSlot::Body(idx, self.headlines[idx].body_lines.len() - 1)
                    }
                    None => {
                        self.header_lines.push(line);
                        PrevSlot::Header(self.header_lines.len() - 1)
                    }
                }
            };
        }
    }

    fn assign_previous(&mut self, slot: PrevSlot, kind: ParagraphType) {
        match slot {
            PrevSlot::Header(i) => self.header_lines[i].assigned_type = Some(kind),
            PrevSlot::Body(h, i) => self.headlines[h].body_lines[i].assigned_type = Some(kind),
            PrevSlot::Dropped => {}
        }
    }

    fn check_include_file(&self, path: &str) -> bool {
        let file = Path::new(path);
        if !file.exists() {
            log::debug!("include file does not exist, skipping: {}", path);
            return false;
        }
        if let Some(root) = self.config.include_root.as_ref() {
            let root = match fs::canonicalize(root) {
                Ok(r) => r,
                Err(_) => return false,
            };
            let file = match fs::canonicalize(file) {
                Ok(f) => f,
                Err(_) => return false,
            };
            if !file.starts_with(&root) {
                log::debug!("include file outside root, skipping: {}", path);
                return false;
            }
        }
        true
    }

    fn store_in_buffer_setting(&mut self, key: &str, value: &str) {
        if key == "OPTIONS" {
            for (token, tok_value) in scan_options(value) {
                self.options.insert(token, tok_value);
            }
        } else if key == "TODO" || key == "SEQ_TODO" || key == "TYP_TODO" {
            for keyword in value.split_whitespace() {
                let keyword = strip_parenthetical(keyword);
                // `|` separates active from terminal keywords; not a keyword.
                if keyword.is_empty() || keyword == "|" {
                    continue;
                }
                self.custom_keywords.push(keyword);
            }
        } else {
            self.settings.insert(key.to_string(), value.to_string());
        }
    }
}

struct ParseState {
    /// Index of the headline currently collecting body lines.
    current: Option<usize>,
    /// Whether the most recent `#+BEGIN_` line asked for its results
    /// output to be exported (`:exports results` / `:exports both`).
    results_block_should_be_exported: bool,
}

/// A `#+name:` line names the block or literal that follows it.
fn set_name_for_code_block(previous: &Line, line: &mut Line) {
    if let Some((key, value)) = previous.in_buffer_setting() {
        if key.eq_ignore_ascii_case("name") {
            line.properties.insert("block_name".to_string(), value);
        }
    }
}

/// Lines following `#+RESULTS:` are muted (forced to comment) unless the
/// producing block asked for its results to be exported. Muting chains from
/// one muted line to the next and stops at a blank line.
fn set_mode_for_results_block_contents(previous: &Line, line: &mut Line, state: &ParseState) {
    if previous.is_results_start() || previous.assigned_type == Some(ParagraphType::Comment) {
        if !state.results_block_should_be_exported
            && line.paragraph_type() != ParagraphType::Blank
        {
            line.assigned_type = Some(ParagraphType::Comment);
        }
    }
}

/// Parse the value of an `#+OPTIONS:` line into `token:value` pairs.
/// Values are single tokens except parenthesized groups, which may contain
/// spaces (e.g. `d:(not LOGBOOK)`).
fn scan_options(value: &str) -> Vec<(String, String)> {
    use once_cell::sync::Lazy;
    use regex::Regex;
    static OPTION: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\S+?):(\(.*?\)|\S*)").unwrap());
    OPTION
        .captures_iter(value)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

fn strip_parenthetical(keyword: &str) -> String {
    match keyword.find('(') {
        Some(open) => {
            let mut stripped = keyword[..open].to_string();
            if let Some(close) = keyword.rfind(')') {
                if close + 1 < keyword.len() {
                    stripped.push_str(&keyword[close + 1..]);
                }
            }
            stripped
        }
        None => keyword.to_string(),
    }
}

fn read_include_data(path: &str, options: &IncludeOptions) -> Option<Vec<String>> {
    match options {
        IncludeOptions::Whole => {
            let text = read_logged(path)?;
            Some(text.split('\n').map(|l| l.to_string()).collect())
        }
        IncludeOptions::Lines(start, end) => {
            let text = read_logged(path)?;
            let mut out = Vec::new();
            for (index, line) in text.split('\n').enumerate() {
                let number = index + 1;
                if number >= *start && end.map(|e| number < e).unwrap_or(true) {
                    out.push(line.to_string());
                }
            }
            Some(out)
        }
        IncludeOptions::Block { kind, lang } => {
            let text = read_logged(path)?;
            let mut begin = format!("#+BEGIN_{}", kind.to_ascii_uppercase());
            if kind == "src" {
                if let Some(lang) = lang {
                    begin.push(' ');
                    begin.push_str(lang);
                }
            }
            let mut out = vec![begin];
            out.extend(text.split('\n').map(|l| l.to_string()));
            out.push(format!("#+END_{}", kind.to_ascii_uppercase()));
            Some(out)
        }
    }
}

fn read_logged(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::debug!("cannot read include file {}: {}", path, e);
            None
        }
    }
}
