//! Inline markup rewriting
//!
//! Shared regex machinery for the inline pass every emitter runs at flush
//! time. The pipeline order matters:
//!
//! 1. Emphasis spans (`*bold*`, `/italic/`, `_underline_`, `=code=`,
//!    `~verbatim~`, `+strike+`), found in a single left-to-right scan over
//!    all six markers at once. Code and verbatim spans are formatted and
//!    swapped out for placeholders the moment they match, so nothing ever
//!    rewrites their contents; they are restored last.
//! 2. Sub/superscript (`_{...}` / `^{...}`).
//! 3. Links (`[[target]]` and `[[target][description]]`), including link
//!    abbreviation expansion and image-suffix detection.
//! 4. Placeholder restoration.
//!
//! Emphasis recognition needs flanking context: an opening marker must sit
//! at start-of-text or after whitespace/opening punctuation, a closing
//! marker before whitespace/closing punctuation or end-of-text. The
//! trailing context is shared between adjacent spans (`*a* *b*`), so the
//! scanner leaves it unconsumed instead of folding it into the match.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const EMPHASIS_MARKERS: [char; 6] = ['*', '/', '_', '=', '~', '+'];

/// Markers whose spans are protected from later pipeline stages.
const CODE_MARKERS: [char; 2] = ['=', '~'];

static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    // One alternation branch per marker. The body class excludes the
    // marker itself, so a span can never swallow its own closing delimiter
    // and run on to a later one.
    let branches = EMPHASIS_MARKERS
        .iter()
        .map(|&marker| {
            let m = regex::escape(&marker.to_string());
            format!(r"{m}([^\s{m}](?:[^{m}]*?[^\s{m}])?){m}", m = m)
        })
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r#"(^|[\s({{'"])(?:{})([\s\-.,:!?;'")}}\[\]]|$)"#, branches);
    Regex::new(&pattern).unwrap()
});

static SUBP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([_^])\{([^{}]*)\}").unwrap());
static LINK_WITH_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\[([^\]]*)\]\]").unwrap());
static LINK_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\]").unwrap());
static IMAGE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(gif|jpe?g|p(?:bm|gm|n[gm]|pm)|svgz?|tiff?|x[bp]m)$").unwrap()
});
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new("\u{0}(\\d+)\u{0}").unwrap());
static ABBREV_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+):(.*)$").unwrap());

/// True when a link target names an image file.
pub fn is_image_file(target: &str) -> bool {
    IMAGE_FILE.is_match(target)
}

/// Stateful rewriter: owns the protected-snippet stack for one line group.
pub struct Rewriter {
    snippets: Vec<String>,
}

impl Rewriter {
    pub fn new() -> Rewriter {
        Rewriter {
            snippets: Vec::new(),
        }
    }

    /// Rewrite emphasis spans in one pass. `format` receives the marker and
    /// the span body and returns the replacement. Code/verbatim replacements
    /// are parked behind placeholders until `restore_code_snippets`, so a
    /// code span matched here is never touched by anything downstream.
    /// Replaced text is never re-scanned; the trailing flank stays in place
    /// so the next span can reuse it as its leading flank.
    pub fn rewrite_emphasis<F>(&mut self, input: &str, format: F) -> String
    where
        F: Fn(char, &str) -> String,
    {
        let mut out = String::new();
        let mut last = 0;
        while let Some(caps) = EMPHASIS.captures_at(input, last) {
            let pre = caps.get(1).unwrap();
            let post = caps.get(2 + EMPHASIS_MARKERS.len()).unwrap();
            let (marker, body) = EMPHASIS_MARKERS
                .iter()
                .enumerate()
                .find_map(|(i, &marker)| caps.get(2 + i).map(|body| (marker, body)))
                .unwrap();
            out.push_str(&input[last..pre.end()]);
            let formatted = format(marker, body.as_str());
            if CODE_MARKERS.contains(&marker) {
                self.snippets.push(formatted);
                out.push_str(&format!("\u{0}{}\u{0}", self.snippets.len() - 1));
            } else {
                out.push_str(&formatted);
            }
            last = post.start();
        }
        out.push_str(&input[last..]);
        out
    }

    /// Swap placeholders back for their protected contents.
    pub fn restore_code_snippets(&mut self, input: &str) -> String {
        let result = PLACEHOLDER
            .replace_all(input, |caps: &Captures| {
                let index: usize = caps[1].parse().unwrap_or(0);
                self.snippets
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        result
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Rewriter::new()
    }
}

/// Rewrite `_{...}` and `^{...}`. `format` receives the sigil and the
/// braced text.
pub fn rewrite_subp<F>(input: &str, format: F) -> String
where
    F: Fn(&str, &str) -> String,
{
    SUBP.replace_all(input, |caps: &Captures| format(&caps[1], &caps[2]))
        .into_owned()
}

/// Rewrite `[[target][description]]` and `[[target]]` links. The target is
/// run through abbreviation expansion before `format` sees it; the
/// description (when present) is passed through untouched.
pub fn rewrite_links<F>(input: &str, abbrevs: &HashMap<String, String>, format: F) -> String
where
    F: Fn(&str, Option<&str>) -> String,
{
    let pass1 = LINK_WITH_DESCRIPTION.replace_all(input, |caps: &Captures| {
        let target = expand_link_abbrev(&caps[1], abbrevs);
        format(&target, Some(&caps[2]))
    });
    LINK_BARE
        .replace_all(&pass1, |caps: &Captures| {
            let target = expand_link_abbrev(&caps[1], abbrevs);
            format(&target, None)
        })
        .into_owned()
}

/// Expand `abbrev:tail` against the document's `#+LINK:` table. Templates
/// substitute `%s` with the tail and `%h` with the url-encoded tail;
/// templates with neither get the tail appended.
fn expand_link_abbrev(target: &str, abbrevs: &HashMap<String, String>) -> String {
    let caps = match ABBREV_LINK.captures(target) {
        Some(caps) => caps,
        None => return target.to_string(),
    };
    let template = match abbrevs.get(&caps[1]) {
        Some(t) => t,
        None => return target.to_string(),
    };
    let tail = &caps[2];
    if template.contains("%s") {
        template.replace("%s", tail)
    } else if template.contains("%h") {
        template.replace("%h", &url_encode(tail))
    } else {
        format!("{}{}", template, tail)
    }
}

/// Escape spaces in a link target for output.
pub fn escape_link_spaces(target: &str) -> String {
    target.replace(' ', "%20")
}

fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn markdown_marker(marker: char) -> &'static str {
        match marker {
            '*' => "**",
            '/' => "*",
            '_' => "*",
            '=' | '~' => "`",
            '+' => "~~",
            _ => "",
        }
    }

    fn markdown_emphasis(input: &str) -> String {
        let mut rw = Rewriter::new();
        let text = rw.rewrite_emphasis(input, |marker, body| {
            let m = markdown_marker(marker);
            format!("{}{}{}", m, body, m)
        });
        rw.restore_code_snippets(&text)
    }

    #[rstest]
    #[case("*bold*", "**bold**")]
    #[case("/italic/", "*italic*")]
    #[case("_underline_", "*underline*")]
    #[case("=code=", "`code`")]
    #[case("~verbatim~", "`verbatim`")]
    #[case("+strike+", "~~strike~~")]
    fn test_emphasis_markers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_emphasis(input), expected);
    }

    #[test]
    fn test_adjacent_spans_share_flank() {
        assert_eq!(markdown_emphasis("*a* *b*"), "**a** **b**");
        assert_eq!(markdown_emphasis("/x/ and /y/."), "*x* and *y*.");
    }

    #[test]
    fn test_emphasis_needs_flanking() {
        assert_eq!(markdown_emphasis("2*3*4"), "2*3*4");
        assert_eq!(markdown_emphasis("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_code_span_contents_are_protected() {
        // The * inside the code span must not be treated as emphasis.
        assert_eq!(markdown_emphasis("use =*ptr*= here"), "use `*ptr*` here");
        // Spans that would match on their own stay verbatim too.
        assert_eq!(
            markdown_emphasis("keep =x *b* y= safe"),
            "keep `x *b* y` safe"
        );
        assert_eq!(markdown_emphasis("~a /b/ c~ after"), "`a /b/ c` after");
        // Nor should link syntax inside a protected span be rewritten.
        let mut rw = Rewriter::new();
        let text = rw.rewrite_emphasis("see =[[not a link]]=", |marker, body| {
            let m = markdown_marker(marker);
            format!("{}{}{}", m, body, m)
        });
        let text = rewrite_links(&text, &HashMap::new(), |target, _| {
            format!("[{}]({})", target, target)
        });
        assert_eq!(rw.restore_code_snippets(&text), "see `[[not a link]]`");
    }

    #[test]
    fn test_subp() {
        let out = rewrite_subp("H_{2}O and x^{2}", |sigil, text| {
            if sigil == "_" {
                format!("<sub>{}</sub>", text)
            } else {
                format!("<sup>{}</sup>", text)
            }
        });
        assert_eq!(out, "H<sub>2</sub>O and x<sup>2</sup>");
    }

    fn textile_links(input: &str, abbrevs: &HashMap<String, String>) -> String {
        rewrite_links(input, abbrevs, |target, description| {
            let description = description.map(|d| d.to_string()).unwrap_or_else(|| target.to_string());
            let target = escape_link_spaces(target);
            if is_image_file(&description) {
                format!("!{}!", description)
            } else {
                format!("\"{}\":{}", description, target)
            }
        })
    }

    #[test]
    fn test_simple_links() {
        let none = HashMap::new();
        assert_eq!(
            textile_links("[[http://www.google.com]]", &none),
            "\"http://www.google.com\":http://www.google.com"
        );
        assert_eq!(
            textile_links("[[http://www.google.com][Google]]", &none),
            "\"Google\":http://www.google.com"
        );
    }

    #[test]
    fn test_link_spaces_escaped_in_target_only() {
        let none = HashMap::new();
        assert_eq!(textile_links("[[my url]]", &none), "\"my url\":my%20url");
    }

    #[test]
    fn test_image_suffixes() {
        assert!(is_image_file("foo.png"));
        assert!(is_image_file("foo.JPEG"));
        assert!(is_image_file("foo.svgz"));
        assert!(is_image_file("foo.tiff"));
        assert!(!is_image_file("foo.png.txt"));
        assert!(!is_image_file("foo.html"));
    }

    #[test]
    fn test_link_abbrev_expansion() {
        let mut abbrevs = HashMap::new();
        abbrevs.insert("bz".to_string(), "http://bugs/show?id=".to_string());
        abbrevs.insert("google".to_string(), "http://google.com/search?q=%s".to_string());
        abbrevs.insert("find".to_string(), "http://find.example/%h".to_string());

        // A bare abbreviated link labels itself with the expanded target.
        let appended = textile_links("[[bz:1234][bug 1234]]", &abbrevs);
        assert_eq!(appended, "\"bug 1234\":http://bugs/show?id=1234");

        let templated = textile_links("[[google:rust regex][search]]", &abbrevs);
        assert_eq!(
            templated,
            "\"search\":http://google.com/search?q=rust%20regex"
        );

        let encoded = textile_links("[[find:a b][lookup]]", &abbrevs);
        assert_eq!(encoded, "\"lookup\":http://find.example/a%20b");
    }

    #[test]
    fn test_unknown_abbrev_left_alone() {
        let none = HashMap::new();
        assert_eq!(
            textile_links("[[mailto:someone@example.com][mail]]", &none),
            "\"mail\":mailto:someone@example.com"
        );
    }

    #[test]
    fn test_emphasis_spanning_soft_break() {
        assert_eq!(markdown_emphasis("*two\nlines*"), "**two\nlines**");
    }
}
