//! Line classification
//!
//! Core classification logic for turning one raw text line into a paragraph
//! type plus extracted substructure. Classification is stateless: it never
//! looks at surrounding lines. Context-dependent reinterpretation (e.g. a
//! table row inside a source block) happens in the parser by assigning an
//! override type.
//!
//! Classification follows this specific order (important for correctness):
//! 1. Blank lines
//! 2. Comments (`#` as first non-whitespace char, not followed by `+`)
//! 3. In-buffer settings (`#+KEY: value`, column 0)
//! 4. Block delimiters (`#+BEGIN_<kind>` / `#+END_<kind>`, case-insensitive)
//! 5. Property drawer delimiters (`:PROPERTIES:` / `:END:`) and entries
//! 6. Table separators, then table rows
//! 7. Horizontal rules (five or more dashes, nothing else)
//! 8. Ordered / unordered list items (marker must be followed by a space)
//! 9. Inline examples (`:` followed by whitespace)
//! 10. Headlines (`*`+ at column 0 followed by a space)
//! 11. Default: paragraph

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Semantic kind of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphType {
    Blank,
    Comment,
    Headline,
    OrderedList,
    UnorderedList,
    TableRow,
    TableSeparator,
    TableHeader,
    HorizontalRule,
    Paragraph,
    Code,
    InlineExample,
    BeginBlock,
    EndBlock,
    PropertyDrawerBegin,
    PropertyDrawerEnd,
    PropertyDrawerItem,
    InBufferSetting,
    /// Synthetic type for a document title injected by the HTML exporter.
    Title,
}

/// Kind of a `#+BEGIN_<kind>` / `#+END_<kind>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Src,
    Example,
    Quote,
    Center,
    Html,
    Comment,
    Other(String),
}

impl BlockKind {
    fn from_name(name: &str) -> BlockKind {
        match name.to_ascii_uppercase().as_str() {
            "SRC" => BlockKind::Src,
            "EXAMPLE" => BlockKind::Example,
            "QUOTE" => BlockKind::Quote,
            "CENTER" => BlockKind::Center,
            "HTML" => BlockKind::Html,
            "COMMENT" => BlockKind::Comment,
            other => BlockKind::Other(other.to_string()),
        }
    }
}

/// Options carried by an `#+INCLUDE:` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeOptions {
    /// Include the whole file verbatim.
    Whole,
    /// 1-based, end-exclusive line range; `None` end means end of file.
    Lines(usize, Option<usize>),
    /// Wrap the file in synthetic `#+BEGIN_<kind>` / `#+END_<kind>` markers.
    Block { kind: String, lang: Option<String> },
}

/// A parsed `#+INCLUDE:` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    pub path: String,
    pub options: IncludeOptions,
}

static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#(?:[^+]|$)").unwrap());
static SETTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\+([A-Za-z0-9_-]+):\s*(.*?)\s*$").unwrap());
static BLOCK_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#\+(BEGIN|END)_([A-Za-z0-9_-]+)(\s+.*)?\s*$").unwrap());
static DRAWER_BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*:PROPERTIES:\s*$").unwrap());
static DRAWER_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*:END:\s*$").unwrap());
static DRAWER_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*:([^\s:]+):(?:\s+(.*?))?\s*$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|[-+|]*\s*$").unwrap());
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|").unwrap());
static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{5,}\s*$").unwrap());
static ORDERED_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+[.)])\s(.*)$").unwrap());
static UNORDERED_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([-+])\s(.*)$").unwrap());
static INLINE_EXAMPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*:(\s(.*))?$").unwrap());
static HEADLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*+\s").unwrap());
static BLOCK_HEADER_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:[A-Za-z_][\w-]*$").unwrap());
static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^#\+INCLUDE:\s+"([^"]+)"\s*(.*?)\s*$"#).unwrap());
static INCLUDE_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^:lines\s+"(\d*)-(\d*)"$"#).unwrap());
static LINK_ABBREV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#\+LINK:\s+(\S+)\s+(\S+)\s*$").unwrap());
static RESULTS_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*#\+RESULTS:").unwrap());

/// One line of input, immutable once classified.
#[derive(Debug, Clone, Serialize)]
pub struct Line {
    text: String,
    indent: usize,
    paragraph_type: ParagraphType,
    /// Override set by the parser when surrounding context forces
    /// reclassification (code blocks, muted results output, table headers).
    pub assigned_type: Option<ParagraphType>,
    /// Arbitrary line-local properties (e.g. `block_name`).
    pub properties: HashMap<String, String>,
}

impl Line {
    pub fn new(text: &str) -> Line {
        let text = text.trim_end_matches('\n').to_string();
        let indent = compute_indent(&text);
        let paragraph_type = classify(&text);
        Line {
            text,
            indent,
            paragraph_type,
            assigned_type: None,
            properties: HashMap::new(),
        }
    }

    /// Synthetic title line used by the HTML exporter.
    pub fn title(text: &str) -> Line {
        let mut line = Line::new(text);
        line.assigned_type = Some(ParagraphType::Title);
        line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Count of leading whitespace columns; a tab counts as one column.
    /// Blank lines have indent 0.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn paragraph_type(&self) -> ParagraphType {
        self.paragraph_type
    }

    /// The type the rest of the pipeline should treat this line as:
    /// the parser-assigned override when present, otherwise the natural
    /// classification.
    pub fn effective_type(&self) -> ParagraphType {
        self.assigned_type.unwrap_or(self.paragraph_type)
    }

    pub fn is_blank(&self) -> bool {
        self.paragraph_type == ParagraphType::Blank
    }

    pub fn is_comment(&self) -> bool {
        self.paragraph_type == ParagraphType::Comment
    }

    pub fn is_table(&self) -> bool {
        matches!(
            self.paragraph_type,
            ParagraphType::TableRow | ParagraphType::TableSeparator | ParagraphType::TableHeader
        )
    }

    /// Kind of block this line opens, if it is a `#+BEGIN_<kind>` line.
    pub fn begin_block(&self) -> Option<BlockKind> {
        let caps = BLOCK_DELIMITER.captures(&self.text)?;
        if caps[1].eq_ignore_ascii_case("BEGIN") {
            Some(BlockKind::from_name(&caps[2]))
        } else {
            None
        }
    }

    /// Kind of block this line closes, if it is an `#+END_<kind>` line.
    pub fn end_block(&self) -> Option<BlockKind> {
        let caps = BLOCK_DELIMITER.captures(&self.text)?;
        if caps[1].eq_ignore_ascii_case("END") {
            Some(BlockKind::from_name(&caps[2]))
        } else {
            None
        }
    }

    /// Raw name of the block kind (`SRC`, `EXAMPLE`, ...), upper-cased.
    pub fn block_type(&self) -> Option<String> {
        let caps = BLOCK_DELIMITER.captures(&self.text)?;
        Some(caps[2].to_ascii_uppercase())
    }

    /// Language tag of a `#+BEGIN_SRC <lang> ...` line: the first header
    /// token that is not a colon-prefixed key.
    pub fn block_lang(&self) -> Option<String> {
        let caps = BLOCK_DELIMITER.captures(&self.text)?;
        let rest = caps.get(3)?.as_str();
        rest.split_whitespace()
            .next()
            .filter(|tok| !tok.starts_with(':') && !tok.starts_with('-'))
            .map(|tok| tok.to_string())
    }

    /// Colon-prefixed header arguments of a block delimiter line, parsed as
    /// a key→value map. The value of a key is every whole token up to the
    /// next recognized key token; a key immediately followed by another key
    /// contributes no entry; when a key repeats, the last non-empty value
    /// wins.
    pub fn block_header_arguments(&self) -> HashMap<String, String> {
        let mut args = HashMap::new();
        let rest = match BLOCK_DELIMITER.captures(&self.text) {
            Some(caps) => match caps.get(3) {
                Some(m) => m.as_str().to_string(),
                None => return args,
            },
            None => return args,
        };
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            if BLOCK_HEADER_KEY.is_match(tokens[i]) {
                let key = tokens[i];
                let mut value = Vec::new();
                let mut j = i + 1;
                while j < tokens.len() && !BLOCK_HEADER_KEY.is_match(tokens[j]) {
                    value.push(tokens[j]);
                    j += 1;
                }
                if !value.is_empty() {
                    args.insert(key.to_string(), value.join(" "));
                }
                i = j;
            } else {
                i += 1;
            }
        }
        args
    }

    /// True when this line begins a results block whose contents should be
    /// exported (the owning `#+BEGIN_` line carries `:exports results` or
    /// `:exports both`).
    pub fn results_block_should_be_exported(&self) -> bool {
        match self.block_header_arguments().get(":exports") {
            Some(value) => value == "results" || value == "both",
            None => false,
        }
    }

    pub fn is_property_drawer_begin(&self) -> bool {
        DRAWER_BEGIN.is_match(&self.text)
    }

    pub fn is_property_drawer_end(&self) -> bool {
        DRAWER_END.is_match(&self.text)
    }

    /// Key/value of a `:KEY: value` drawer entry.
    pub fn property_drawer_item(&self) -> Option<(String, String)> {
        if self.is_property_drawer_begin() || self.is_property_drawer_end() {
            return None;
        }
        let caps = DRAWER_ITEM.captures(&self.text)?;
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        Some((caps[1].to_string(), value.to_string()))
    }

    /// Key/value of a `#+KEY: value` in-buffer setting. The key is returned
    /// as written; the parser normalizes case.
    pub fn in_buffer_setting(&self) -> Option<(String, String)> {
        let caps = SETTING.captures(&self.text)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    /// Parsed `#+INCLUDE:` directive, if this line is one.
    pub fn include_spec(&self) -> Option<IncludeSpec> {
        let caps = INCLUDE.captures(&self.text)?;
        let path = caps[1].to_string();
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
        let options = if rest.is_empty() {
            IncludeOptions::Whole
        } else if let Some(range) = INCLUDE_LINES.captures(rest) {
            let start = range[1].parse::<usize>().unwrap_or(1).max(1);
            let end = range[2].parse::<usize>().ok();
            IncludeOptions::Lines(start, end)
        } else {
            let mut tokens = rest.split_whitespace();
            let kind = tokens.next()?.to_string();
            match kind.as_str() {
                "src" | "example" | "quote" => IncludeOptions::Block {
                    kind,
                    lang: tokens.next().map(|t| t.to_string()),
                },
                // Unrecognized option set: nothing to include.
                _ => return None,
            }
        };
        Some(IncludeSpec { path, options })
    }

    /// Name/template of a `#+LINK: name template` abbreviation.
    pub fn link_abbrev(&self) -> Option<(String, String)> {
        let caps = LINK_ABBREV.captures(&self.text)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    /// True for `#+RESULTS:` lines (any suffix, case-insensitive).
    pub fn is_results_start(&self) -> bool {
        RESULTS_START.is_match(&self.text)
    }

    /// Text as the output buffer should accumulate it: list items and
    /// inline examples are stripped of their markers, everything else
    /// passes through.
    pub fn output_text(&self) -> String {
        match self.effective_type() {
            ParagraphType::OrderedList => ORDERED_LIST
                .captures(&self.text)
                .map(|c| c[2].to_string())
                .unwrap_or_else(|| self.text.clone()),
            ParagraphType::UnorderedList => UNORDERED_LIST
                .captures(&self.text)
                .map(|c| c[2].to_string())
                .unwrap_or_else(|| self.text.clone()),
            ParagraphType::InlineExample => INLINE_EXAMPLE
                .captures(&self.text)
                .and_then(|c| c.get(2).map(|m| m.as_str().to_string()))
                .unwrap_or_default(),
            _ => self.text.clone(),
        }
    }
}

/// Determine the paragraph type of a raw line. First match wins.
pub fn classify(text: &str) -> ParagraphType {
    if BLANK.is_match(text) {
        return ParagraphType::Blank;
    }
    if COMMENT.is_match(text) {
        return ParagraphType::Comment;
    }
    if SETTING.is_match(text) {
        return ParagraphType::InBufferSetting;
    }
    if let Some(caps) = BLOCK_DELIMITER.captures(text) {
        return if caps[1].eq_ignore_ascii_case("BEGIN") {
            ParagraphType::BeginBlock
        } else {
            ParagraphType::EndBlock
        };
    }
    if DRAWER_BEGIN.is_match(text) {
        return ParagraphType::PropertyDrawerBegin;
    }
    if DRAWER_END.is_match(text) {
        return ParagraphType::PropertyDrawerEnd;
    }
    if DRAWER_ITEM.is_match(text) {
        return ParagraphType::PropertyDrawerItem;
    }
    if TABLE_SEPARATOR.is_match(text) {
        return ParagraphType::TableSeparator;
    }
    if TABLE_ROW.is_match(text) {
        return ParagraphType::TableRow;
    }
    if HORIZONTAL_RULE.is_match(text) {
        return ParagraphType::HorizontalRule;
    }
    if ORDERED_LIST.is_match(text) {
        return ParagraphType::OrderedList;
    }
    if UNORDERED_LIST.is_match(text) {
        return ParagraphType::UnorderedList;
    }
    if INLINE_EXAMPLE.is_match(text) {
        return ParagraphType::InlineExample;
    }
    if HEADLINE.is_match(text) {
        return ParagraphType::Headline;
    }
    ParagraphType::Paragraph
}

fn compute_indent(text: &str) -> usize {
    let mut indent = 0;
    for ch in text.chars() {
        match ch {
            ' ' | '\t' => indent += 1,
            _ => return indent,
        }
    }
    // Whitespace-only lines carry no meaningful indent.
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# hello")]
    #[case(" # hello")]
    fn test_comments(#[case] text: &str) {
        assert_eq!(classify(text), ParagraphType::Comment);
    }

    #[rstest]
    #[case("")]
    #[case("hello")]
    #[case("  foo ### bar")]
    fn test_not_comments(#[case] text: &str) {
        assert_ne!(classify(text), ParagraphType::Comment);
    }

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("\t")]
    #[case("  \t\t")]
    fn test_blank_lines(#[case] text: &str) {
        assert_eq!(classify(text), ParagraphType::Blank);
    }

    #[rstest]
    #[case(": inline")]
    #[case(" : inline")]
    #[case("\t\t:\tinline")]
    fn test_inline_examples(#[case] text: &str) {
        assert_eq!(classify(text), ParagraphType::InlineExample);
    }

    #[rstest]
    #[case("- ", ParagraphType::UnorderedList)]
    #[case("+ ", ParagraphType::UnorderedList)]
    #[case("  - ", ParagraphType::UnorderedList)]
    #[case("  + ", ParagraphType::UnorderedList)]
    #[case(" 1. ", ParagraphType::OrderedList)]
    #[case(" 2) ", ParagraphType::OrderedList)]
    fn test_list_formats(#[case] text: &str, #[case] expected: ParagraphType) {
        assert_eq!(classify(text), expected);
    }

    #[rstest]
    #[case("-foo")]
    #[case("+foo")]
    #[case("1.foo")]
    #[case("2.foo")]
    fn test_list_marker_requires_space(#[case] text: &str) {
        assert_eq!(classify(text), ParagraphType::Paragraph);
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(classify("-----"), ParagraphType::HorizontalRule);
        assert_eq!(classify("----------"), ParagraphType::HorizontalRule);
        assert_eq!(classify("   \t ----- \t\t\t"), ParagraphType::HorizontalRule);
        assert_ne!(classify("----"), ParagraphType::HorizontalRule);
    }

    #[test]
    fn test_table_lines() {
        assert_eq!(classify("| One   | Two   | Three |"), ParagraphType::TableRow);
        assert_eq!(
            classify("  |-------+-------+-------|"),
            ParagraphType::TableSeparator
        );
    }

    #[test]
    fn test_indent() {
        assert_eq!(Line::new("").indent(), 0);
        assert_eq!(Line::new(" a").indent(), 1);
        assert_eq!(Line::new("   ").indent(), 0);
        assert_eq!(Line::new("   \n").indent(), 0);
        assert_eq!(Line::new("   a").indent(), 3);
    }

    #[test]
    fn test_headline_classification() {
        assert_eq!(classify("* one"), ParagraphType::Headline);
        assert_eq!(classify("*** three"), ParagraphType::Headline);
        // A headline lexeme without a following space is an ordinary paragraph.
        assert_eq!(classify("*one"), ParagraphType::Paragraph);
        assert_eq!(classify("  tricked you!!!***"), ParagraphType::Paragraph);
    }

    #[rstest]
    #[case("#+BEGIN_SRC emacs-lisp -n -r", "SRC")]
    #[case("#+BEGIN_EXAMPLE", "EXAMPLE")]
    #[case("\t#+BEGIN_QUOTE  ", "QUOTE")]
    fn test_begin_blocks(#[case] text: &str, #[case] kind: &str) {
        let line = Line::new(text);
        assert!(line.begin_block().is_some());
        assert_eq!(line.block_type().unwrap(), kind);
    }

    #[rstest]
    #[case("#+END_SRC", "SRC")]
    #[case("#+END_EXAMPLE", "EXAMPLE")]
    #[case("\t#+END_QUOTE  ", "QUOTE")]
    fn test_end_blocks(#[case] text: &str, #[case] kind: &str) {
        let line = Line::new(text);
        assert!(line.end_block().is_some());
        assert_eq!(line.block_type().unwrap(), kind);
    }

    #[test]
    fn test_block_header_arguments() {
        let line = Line::new("#+begin_src :hello world");
        assert_eq!(line.block_header_arguments()[":hello"], "world");

        let line = Line::new("#+begin_src ruby -n -r -l \"asdf\" asdf asdf :asdf asdf");
        let args = line.block_header_arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(args[":asdf"], "asdf");

        let line = Line::new(
            "#+begin_src ruby :results \"he:llo\" :results :hello :tangle somewhere.rb :exports code :shebang #!/bin/bash",
        );
        let args = line.block_header_arguments();
        assert_eq!(args[":results"], "\"he:llo\"");
        assert_eq!(args[":tangle"], "somewhere.rb");
        assert_eq!(args[":exports"], "code");
        assert_eq!(args[":shebang"], "#!/bin/bash");

        let line = Line::new("#+begin_src clojure :results :hello :tangle somewhere.rb :exports code");
        let args = line.block_header_arguments();
        assert!(!args.contains_key(":results"));
        assert!(!args.contains_key(":hello"));
        assert_eq!(args[":tangle"], "somewhere.rb");
        assert_eq!(args[":exports"], "code");

        let line =
            Line::new("#+begin_src js :results output :hello :tangle somewhere.rb :exports code");
        let args = line.block_header_arguments();
        assert_eq!(args[":results"], "output");
        assert_eq!(args[":tangle"], "somewhere.rb");
        assert_eq!(args[":exports"], "code");
    }

    #[rstest]
    #[case("#+ARCHIVE: %s_done", "ARCHIVE", "%s_done")]
    #[case("#+CATEGORY: foo", "CATEGORY", "foo")]
    #[case("#+BEGIN_EXAMPLE:", "BEGIN_EXAMPLE", "")]
    #[case("#+A:", "A", "")] // boundary: smallest keyword is one letter
    fn test_in_buffer_settings(#[case] text: &str, #[case] key: &str, #[case] value: &str) {
        let line = Line::new(text);
        let (k, v) = line.in_buffer_setting().unwrap();
        assert_eq!(k, key);
        assert_eq!(v, value);
    }

    #[rstest]
    #[case("##+ARCHIVE: blah")]
    #[case("#CATEGORY: foo")]
    #[case("")]
    #[case("   #+BEGIN_EXAMPLE:")]
    fn test_ill_formed_settings(#[case] text: &str) {
        assert!(Line::new(text).in_buffer_setting().is_none());
    }

    #[rstest]
    #[case("#+RESULTS: hello-world")]
    #[case("#+RESULTS: ")]
    #[case("#+RESULTS:")]
    #[case("#+results: HELLO-WORLD")]
    #[case("#+results:")]
    fn test_results_start(#[case] text: &str) {
        assert!(Line::new(text).is_results_start());
    }

    #[test]
    fn test_include_specs() {
        let spec = Line::new("#+INCLUDE: \"~/somefile.org\"").include_spec().unwrap();
        assert_eq!(spec.path, "~/somefile.org");
        assert_eq!(spec.options, IncludeOptions::Whole);

        let spec = Line::new("#+INCLUDE: \"~/somefile.org\" :lines \"4-18\"")
            .include_spec()
            .unwrap();
        assert_eq!(spec.options, IncludeOptions::Lines(4, Some(18)));

        let spec = Line::new("#+INCLUDE: \"~/somefile.org\" :lines \"-18\"")
            .include_spec()
            .unwrap();
        assert_eq!(spec.options, IncludeOptions::Lines(1, Some(18)));

        let spec = Line::new("#+INCLUDE: \"~/somefile.org\" src ruby")
            .include_spec()
            .unwrap();
        assert_eq!(
            spec.options,
            IncludeOptions::Block {
                kind: "src".to_string(),
                lang: Some("ruby".to_string())
            }
        );
    }

    #[test]
    fn test_link_abbrev() {
        let (name, template) = Line::new("#+LINK: bugzilla http://10.1.2.9/bugzilla/show_bug.cgi?id=")
            .link_abbrev()
            .unwrap();
        assert_eq!(name, "bugzilla");
        assert_eq!(template, "http://10.1.2.9/bugzilla/show_bug.cgi?id=");
    }

    #[test]
    fn test_property_drawer_lines() {
        assert_eq!(classify(":PROPERTIES:"), ParagraphType::PropertyDrawerBegin);
        assert_eq!(classify("  :END:"), ParagraphType::PropertyDrawerEnd);
        assert_eq!(classify("  :DATE: 2009-11-26"), ParagraphType::PropertyDrawerItem);
        let (key, value) = Line::new("  :DATE: 2009-11-26").property_drawer_item().unwrap();
        assert_eq!(key, "DATE");
        assert_eq!(value, "2009-11-26");
    }

    #[test]
    fn test_output_text_strips_markers() {
        assert_eq!(Line::new("1. foo").output_text(), "foo");
        assert_eq!(Line::new("  - bar").output_text(), "bar");
        assert_eq!(Line::new(": verbatim").output_text(), "verbatim");
        assert_eq!(Line::new("plain").output_text(), "plain");
    }

    #[test]
    fn test_assigned_type_overrides() {
        let mut line = Line::new("| a | b |");
        assert_eq!(line.effective_type(), ParagraphType::TableRow);
        line.assigned_type = Some(ParagraphType::Code);
        assert_eq!(line.effective_type(), ParagraphType::Code);
    }
}
