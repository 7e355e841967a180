//! HTML emitter
//!
//! Structural frames map to container tags (`<blockquote>`, `<ul>`/`<ol>`,
//! `<table>`, a centered `<div>`); paragraphs, list items and table rows
//! are wrapped at flush time. All buffered text is entity-escaped before
//! inline rewriting, except raw HTML blocks which pass through verbatim.
//!
//! Footnote references (`[fn:label]` / `[fn:label:definition]`) are
//! collected during inline rewriting and emitted as a trailing section
//! when footnote export is enabled.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::org::buffer::{Emitter, ExportOptions, FlushContext, OutputMode, OutputType};
use crate::org::emitters::table_cells;
use crate::org::headline::Headline;
use crate::org::rewrite::{self, Rewriter};

static FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[fn:([^\]:]*)(?::([^\]]*))?\]").unwrap());

/// Whole-document post-processing hook (smart typography and the like).
pub type TypographyPass = fn(String) -> String;

pub struct HtmlEmitter {
    options: ExportOptions,
    /// (label, definition) in first-reference order.
    footnotes: Vec<(String, String)>,
    /// Heading counters per level, for `num:t`.
    section_numbers: Vec<usize>,
    typography: Option<TypographyPass>,
}

impl HtmlEmitter {
    pub fn new(options: ExportOptions) -> HtmlEmitter {
        HtmlEmitter {
            options,
            footnotes: Vec::new(),
            section_numbers: Vec::new(),
            typography: None,
        }
    }

    pub fn with_typography(mut self, pass: TypographyPass) -> HtmlEmitter {
        self.typography = Some(pass);
        self
    }

    fn emphasis_tags(&self, marker: char) -> Option<(String, String)> {
        if let Some(overrides) = self.options.emphasis_overrides.as_ref() {
            if let Some(tag) = overrides.get(&marker) {
                return Some((format!("<{}>", tag), format!("</{}>", tag)));
            }
        }
        let (open, close) = match marker {
            '*' => ("<b>", "</b>"),
            '/' => ("<i>", "</i>"),
            '_' => ("<span style=\"text-decoration:underline;\">", "</span>"),
            '=' | '~' => ("<code>", "</code>"),
            '+' => ("<del>", "</del>"),
            _ => return None,
        };
        Some((open.to_string(), close.to_string()))
    }

    fn inline(&mut self, input: &str) -> String {
        let escaped = escape(input);
        let mut rewriter = Rewriter::new();
        let text = rewriter.rewrite_emphasis(&escaped, |marker, body| {
            match self.emphasis_tags(marker) {
                Some((open, close)) => format!("{}{}{}", open, body, close),
                None => body.to_string(),
            }
        });
        let text = if self.options.use_sub_superscripts {
            rewrite::rewrite_subp(&text, |sigil, body| {
                if sigil == "_" {
                    format!("<sub>{}</sub>", body)
                } else {
                    format!("<sup>{}</sup>", body)
                }
            })
        } else {
            text
        };
        let text = rewrite::rewrite_links(&text, &self.options.link_abbrevs, |target, defi| {
            let link = rewrite::escape_link_spaces(target);
            match defi {
                Some(d) if rewrite::is_image_file(d) => {
                    format!("<a href=\"{}\"><img src=\"{}\" /></a>", link, d)
                }
                Some(d) => format!("<a href=\"{}\">{}</a>", link, d),
                None if rewrite::is_image_file(&link) => {
                    format!("<img src=\"{}\" />", link)
                }
                None => format!("<a href=\"{}\">{}</a>", link, link),
            }
        });
        let text = if self.options.export_footnotes {
            self.rewrite_footnotes(&text)
        } else {
            text
        };
        rewriter.restore_code_snippets(&text)
    }

    fn rewrite_footnotes(&mut self, input: &str) -> String {
        let footnotes = &mut self.footnotes;
        FOOTNOTE
            .replace_all(input, |caps: &Captures| {
                let label = caps[1].to_string();
                let definition = caps.get(2).map(|m| m.as_str().to_string());
                let index = match footnotes.iter().position(|(l, _)| *l == label) {
                    Some(i) => {
                        if let Some(def) = definition {
                            footnotes[i].1 = def;
                        }
                        i
                    }
                    None => {
                        footnotes.push((label.clone(), definition.unwrap_or_default()));
                        footnotes.len() - 1
                    }
                };
                format!(
                    "<sup><a class=\"footnum\" name=\"fnr.{label}\" href=\"#fn.{label}\">{}</a></sup>",
                    index + 1,
                    label = label
                )
            })
            .into_owned()
    }

    fn section_number(&mut self, level: usize) -> String {
        while self.section_numbers.len() < level {
            self.section_numbers.push(0);
        }
        self.section_numbers.truncate(level);
        self.section_numbers[level - 1] += 1;
        self.section_numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Emitter for HtmlEmitter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn headline(&mut self, headline: &Headline, output: &mut String) {
        output.push_str(&format!("<h{}>", headline.level));
        if self.options.export_heading_number {
            let number = self.section_number(headline.level);
            output.push_str(&format!("<span class=\"heading-number heading-number-{}\">{}</span> ", headline.level, number));
        }
        if self.options.export_todo {
            if let Some(keyword) = headline.keyword.as_ref() {
                output.push_str(&format!("<span class=\"todo-keyword\">{}</span> ", keyword));
            }
        }
        output.push_str(&self.inline(&headline.headline_text));
        output.push_str(&format!("</h{}>\n", headline.level));
    }

    fn push_mode(&mut self, mode: &OutputMode, output: &mut String) {
        match mode {
            OutputMode::Quote => output.push_str("<blockquote>\n"),
            OutputMode::Center => output.push_str("<div style=\"text-align: center\">\n"),
            OutputMode::ListItem { ordered: true, .. } => output.push_str("<ol>\n"),
            OutputMode::ListItem { ordered: false, .. } => output.push_str("<ul>\n"),
            OutputMode::Table => output.push_str("<table>\n"),
            _ => {}
        }
    }

    fn pop_mode(&mut self, mode: &OutputMode, output: &mut String) {
        match mode {
            OutputMode::Quote => output.push_str("</blockquote>\n"),
            OutputMode::Center => output.push_str("</div>\n"),
            OutputMode::ListItem { ordered: true, .. } => output.push_str("</ol>\n"),
            OutputMode::ListItem { ordered: false, .. } => output.push_str("</ul>\n"),
            OutputMode::Table => output.push_str("</table>\n"),
            _ => {}
        }
    }

    fn flush(&mut self, ctx: &FlushContext, output: &mut String) {
        if ctx.output_type == OutputType::Blank {
            return;
        }
        let buffer = ctx.buffer.trim_start_matches('\n');
        match ctx.current_mode() {
            Some(OutputMode::Code { lang }) => {
                output.push_str("<pre class=\"src\">");
                match lang {
                    Some(lang) => {
                        output.push_str(&format!("<code class=\"{}\">", escape(lang)))
                    }
                    None => output.push_str("<code>"),
                }
                output.push_str(&escape(buffer));
                output.push_str("</code></pre>\n");
            }
            Some(OutputMode::Example) | Some(OutputMode::InlineExample) => {
                output.push_str("<pre class=\"example\">");
                output.push_str(&escape(buffer));
                output.push_str("</pre>\n");
            }
            Some(OutputMode::RawHtml) => {
                output.push_str(buffer);
                output.push('\n');
            }
            Some(OutputMode::ListItem { .. }) => {
                output.push_str("<li>");
                output.push_str(&self.inline(buffer));
                output.push_str("</li>\n");
            }
            Some(OutputMode::Table) => {
                let tag = if ctx.output_type == OutputType::TableHeader {
                    "th"
                } else {
                    "td"
                };
                output.push_str("<tr>");
                for cell in table_cells(buffer) {
                    output.push_str(&format!("<{}>{}</{}>", tag, self.inline(&cell), tag));
                }
                output.push_str("</tr>\n");
            }
            _ => {
                output.push_str("<p>");
                output.push_str(&self.inline(buffer));
                output.push_str("</p>\n");
            }
        }
    }

    fn horizontal_rule(&mut self, output: &mut String) {
        output.push_str("<hr />\n");
    }

    fn title(&mut self, text: &str, output: &mut String) {
        output.push_str("<h1 class=\"title\">");
        output.push_str(&self.inline(text));
        output.push_str("</h1>\n");
    }

    fn output_footnotes(&mut self, output: &mut String) {
        if !self.options.export_footnotes || self.footnotes.is_empty() {
            return;
        }
        output.push_str("<div id=\"footnotes\">\n");
        output.push_str("<h2 class=\"footnotes\">Footnotes:</h2>\n");
        output.push_str("<div id=\"text-footnotes\">\n");
        for (index, (label, definition)) in self.footnotes.iter().enumerate() {
            output.push_str(&format!(
                "<div class=\"footdef\"><sup><a class=\"footnum\" name=\"fn.{label}\" href=\"#fnr.{label}\">{}</a></sup> <p class=\"footpara\">{}</p></div>\n",
                index + 1,
                definition,
                label = label
            ));
        }
        output.push_str("</div>\n</div>\n");
    }

    fn finalize(&mut self, output: String) -> String {
        match self.typography {
            Some(pass) => pass(output),
            None => output,
        }
    }
}

/// Elements whose text content the typography pass must not touch.
const LITERAL_ELEMENTS: [&str; 4] = ["pre", "code", "kbd", "script"];

/// Smart-typography pass over finished HTML: straight quotes become curly
/// quote entities, `---` an em dash, `--` an en dash, `...` an ellipsis.
/// Markup and literal elements pass through untouched.
pub fn smart_typography(input: String) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_tag = false;
    let mut literal_depth: usize = 0;
    let mut prev_text: Option<char> = None;

    while i < chars.len() {
        let c = chars[i];
        if in_tag {
            out.push(c);
            if c == '>' {
                in_tag = false;
            }
            i += 1;
            continue;
        }
        if c == '<' {
            let closing = chars.get(i + 1) == Some(&'/');
            let name_start = if closing { i + 2 } else { i + 1 };
            let name: String = chars[name_start..]
                .iter()
                .take_while(|ch| ch.is_ascii_alphanumeric())
                .collect();
            if LITERAL_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
                if closing {
                    literal_depth = literal_depth.saturating_sub(1);
                } else {
                    literal_depth += 1;
                }
            }
            in_tag = true;
            out.push(c);
            i += 1;
            continue;
        }
        if literal_depth > 0 {
            out.push(c);
            i += 1;
            continue;
        }
        let opening_context = prev_text
            .map(|p| p.is_whitespace() || "([{-".contains(p))
            .unwrap_or(true);
        match c {
            '-' if chars[i..].starts_with(&['-', '-', '-']) => {
                out.push_str("&#8212;");
                i += 3;
            }
            '-' if chars[i..].starts_with(&['-', '-']) => {
                out.push_str("&#8211;");
                i += 2;
            }
            '.' if chars[i..].starts_with(&['.', '.', '.']) => {
                out.push_str("&#8230;");
                i += 3;
            }
            '"' => {
                out.push_str(if opening_context { "&#8220;" } else { "&#8221;" });
                i += 1;
            }
            '\'' => {
                out.push_str(if opening_context { "&#8216;" } else { "&#8217;" });
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
        prev_text = Some(c);
    }
    out
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
