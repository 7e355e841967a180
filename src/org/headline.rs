//! Headline model
//!
//! A headline is a `*`-prefixed line that opens a section of the outline.
//! It owns every body line up to (but not including) the next headline;
//! nesting is implied by levels, never by parent pointers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::org::line::Line;

/// Export decision attached to a headline by the export selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    /// Headline and body are both exported.
    All,
    /// Only the headline itself is exported, not its body.
    HeadlineOnly,
    /// The whole subtree is dropped from the output.
    Exclude,
}

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+)\s+(.*?)\s*$").unwrap());
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*:((?:[\w@#%.]+:)+)\s*$").unwrap());

/// Default keywords recognized when the document declares no custom set.
pub const DEFAULT_KEYWORDS: [&str; 2] = ["TODO", "DONE"];

#[derive(Debug, Clone, Serialize)]
pub struct Headline {
    /// The headline's own line; `body_lines[0]` is a copy of it.
    pub line: Line,
    /// Marker run length plus the parse offset.
    pub level: usize,
    /// Leading workflow keyword, when the first word is a recognized one.
    pub keyword: Option<String>,
    /// Trailing `:tag:tag2:` tags in document order.
    pub tags: Vec<String>,
    /// Headline text with marker, keyword and tags stripped.
    pub headline_text: String,
    /// `:KEY: value` pairs from the property drawer, insertion ordered.
    pub property_drawer: Vec<(String, String)>,
    /// The headline line itself followed by the lines of its own section.
    pub body_lines: Vec<Line>,
    pub export_state: ExportState,
}

impl Headline {
    /// Parse a headline line. `offset` shifts the level (used when an
    /// included file is spliced beneath a headline). `keywords` is the
    /// document's custom keyword set; when empty, the defaults apply.
    pub fn parse(text: &str, offset: i32, keywords: &[String]) -> Headline {
        let line = Line::new(text);
        let caps = MARKER
            .captures(line.text())
            .expect("caller classified this line as a headline");
        let stars = caps[1].len();
        let level = (stars as i64 + offset as i64).max(1) as usize;
        let mut rest = caps[2].to_string();

        let mut tags = Vec::new();
        if let Some(tag_caps) = TAGS.captures(&rest) {
            let whole = tag_caps.get(0).unwrap();
            for tag in tag_caps[1].trim_matches(':').split(':') {
                if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
            rest.truncate(whole.start());
        }

        let keyword = extract_keyword(&mut rest, keywords);

        let mut headline = Headline {
            line,
            level,
            keyword,
            tags,
            headline_text: rest,
            property_drawer: Vec::new(),
            body_lines: Vec::new(),
            export_state: ExportState::All,
        };
        headline.body_lines.push(headline.line.clone());
        headline
    }

    /// True when the headline text starts with the COMMENT marker, which
    /// excludes the subtree from export.
    pub fn is_comment_headline(&self) -> bool {
        self.headline_text.starts_with("COMMENT ") || self.headline_text == "COMMENT"
    }

    /// Tag lookup used by the export selector.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn extract_keyword(text: &mut String, keywords: &[String]) -> Option<String> {
    let first = text.split_whitespace().next()?.to_string();
    let recognized = if keywords.is_empty() {
        DEFAULT_KEYWORDS.iter().any(|k| *k == first)
    } else {
        keywords.iter().any(|k| *k == first)
    };
    if !recognized {
        return None;
    }
    let rest = text[first.len()..].trim_start().to_string();
    *text = rest;
    Some(first)
}
