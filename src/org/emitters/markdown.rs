//! Markdown emitter
//!
//! Emphasis marker map (org marker on the left):
//!
//! | org | markdown |
//! |-----|----------|
//! | `*` | `**`     |
//! | `/` | `*`      |
//! | `_` | `*`      |
//! | `=` | `` ` ``  |
//! | `~` | `` ` ``  |
//! | `+` | `~~`     |
//!
//! The map can be replaced wholesale by an override markup file.

use std::collections::HashMap;

use crate::org::buffer::{Emitter, ExportOptions, FlushContext, OutputMode, OutputType};
use crate::org::emitters::table_cells;
use crate::org::headline::Headline;
use crate::org::rewrite::{self, Rewriter};

pub struct MarkdownEmitter {
    options: ExportOptions,
}

impl MarkdownEmitter {
    pub fn new(options: ExportOptions) -> MarkdownEmitter {
        MarkdownEmitter { options }
    }

    fn marker_for(&self, marker: char) -> &str {
        if let Some(overrides) = self.options.emphasis_overrides.as_ref() {
            if let Some(replacement) = overrides.get(&marker) {
                return replacement;
            }
        }
        match marker {
            '*' => "**",
            '/' | '_' => "*",
            '=' | '~' => "`",
            '+' => "~~",
            _ => "",
        }
    }

    fn inline(&self, input: &str) -> String {
        let mut rewriter = Rewriter::new();
        let text = rewriter.rewrite_emphasis(input, |marker, body| {
            let m = self.marker_for(marker);
            format!("{}{}{}", m, body, m)
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
            // Images get no generated description: an empty alt forces the
            // image to be inlined by downstream renderers.
            let description = match defi {
                Some(d) => Some(d.to_string()),
                None if !rewrite::is_image_file(target) => Some(target.to_string()),
                None => None,
            };
            let link = rewrite::escape_link_spaces(target);
            match description {
                Some(d) if rewrite::is_image_file(&d) => format!("![{}]({})", d, d),
                Some(d) => format!("[{}]({})", d, link),
                None => format!("[{}]({})", link, link),
            }
        });
        rewriter.restore_code_snippets(&text)
    }
}

impl Emitter for MarkdownEmitter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn headline(&mut self, headline: &Headline, output: &mut String) {
        if !output.is_empty() {
            output.push('\n');
        }
        for _ in 0..headline.level {
            output.push('#');
        }
        output.push(' ');
        if self.options.export_todo {
            if let Some(keyword) = headline.keyword.as_ref() {
                output.push_str(keyword);
                output.push(' ');
            }
        }
        output.push_str(&self.inline(&headline.headline_text));
        output.push('\n');
    }

    fn flush(&mut self, ctx: &FlushContext, output: &mut String) {
        if ctx.output_type == OutputType::Blank && ctx.buffer.is_empty() {
            output.push('\n');
            return;
        }
        let buffer = ctx.buffer.trim_start_matches('\n');
        match ctx.current_mode() {
            Some(OutputMode::Code { lang }) => {
                output.push_str("```");
                if let Some(lang) = lang {
                    output.push_str(lang);
                }
                output.push('\n');
                output.push_str(buffer);
                output.push_str("\n```\n");
            }
            Some(OutputMode::Example) | Some(OutputMode::InlineExample) => {
                output.push_str("```\n");
                output.push_str(buffer);
                output.push_str("\n```\n");
            }
            Some(OutputMode::RawHtml) => {
                output.push_str(buffer);
                output.push('\n');
            }
            Some(OutputMode::ListItem { ordered, .. }) => {
                let depth = ctx.list_depth();
                for _ in 1..depth {
                    output.push_str("  ");
                }
                output.push_str(if *ordered { "1. " } else { "* " });
                output.push_str(&self.inline(buffer));
                output.push('\n');
            }
            Some(OutputMode::Table) => {
                output.push_str(&self.inline(buffer));
                output.push('\n');
                if ctx.output_type == OutputType::TableHeader {
                    let cells = table_cells(buffer).len();
                    output.push('|');
                    for _ in 0..cells {
                        output.push_str(" --- |");
                    }
                    output.push('\n');
                }
            }
            _ => {
                if ctx.in_quote() {
                    output.push_str("> ");
                }
                output.push_str(&self.inline(buffer));
                output.push('\n');
            }
        }
    }

    fn horizontal_rule(&mut self, output: &mut String) {
        output.push_str("---\n");
    }
}

/// Parse an override markup map for this emitter out of a loaded YAML
/// document. Expected shape: `markdown: { emphasis: { "*": "__", ... } }`.
pub fn emphasis_overrides_from_yaml(
    doc: &serde_yaml::Value,
    format: &str,
) -> Option<HashMap<char, String>> {
    let emphasis = doc.get(format)?.get("emphasis")?.as_mapping()?;
    let mut map = HashMap::new();
    for (key, value) in emphasis {
        let key = key.as_str()?;
        let mut chars = key.chars();
        let marker = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        map.insert(marker, value.as_str()?.to_string());
    }
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
