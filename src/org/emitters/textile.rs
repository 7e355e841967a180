//! Textile emitter
//!
//! Headlines become `h<level>.` blocks, quotes `bq.` paragraphs, centered
//! text `p=.` paragraphs, and literal blocks are wrapped in `<pre>` tags
//! (Textile has no native multi-line literal that survives every dialect).
//! Emphasis map: `*bold*` stays `*`, `/italic/` and `_underline_` become
//! `_`, `=code=` and `~verbatim~` become `@`, `+strike+` becomes `-`.

use crate::org::buffer::{Emitter, ExportOptions, FlushContext, OutputMode, OutputType};
use crate::org::emitters::table_cells;
use crate::org::headline::Headline;
use crate::org::rewrite::{self, Rewriter};

pub struct TextileEmitter {
    options: ExportOptions,
}

impl TextileEmitter {
    pub fn new(options: ExportOptions) -> TextileEmitter {
        TextileEmitter { options }
    }

    fn marker_for(&self, marker: char) -> &'static str {
        match marker {
            '*' => "*",
            '/' | '_' => "_",
            '=' | '~' => "@",
            '+' => "-",
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
                    format!("~{}~", body)
                } else {
                    format!("^{}^", body)
                }
            })
        } else {
            text
        };
        let text = rewrite::rewrite_links(&text, &self.options.link_abbrevs, |target, defi| {
            let description = defi.map(|d| d.to_string()).unwrap_or_else(|| target.to_string());
            let link = rewrite::escape_link_spaces(target);
            if rewrite::is_image_file(&description) {
                format!("!{}!", description)
            } else {
                format!("\"{}\":{}", description, link)
            }
        });
        rewriter.restore_code_snippets(&text)
    }
}

impl Emitter for TextileEmitter {
    fn name(&self) -> &'static str {
        "textile"
    }

    fn headline(&mut self, headline: &Headline, output: &mut String) {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("h{}. ", headline.level));
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
            Some(OutputMode::Code { .. })
            | Some(OutputMode::Example)
            | Some(OutputMode::InlineExample) => {
                output.push_str("<pre>\n");
                output.push_str(buffer);
                output.push_str("\n</pre>\n");
            }
            Some(OutputMode::RawHtml) => {
                output.push_str(buffer);
                output.push('\n');
            }
            Some(OutputMode::ListItem { ordered, .. }) => {
                let depth = ctx.list_depth();
                let marker = if *ordered { '#' } else { '*' };
                for _ in 0..depth {
                    output.push(marker);
                }
                output.push(' ');
                output.push_str(&self.inline(buffer));
                output.push('\n');
            }
            Some(OutputMode::Table) => {
                if ctx.output_type == OutputType::TableHeader {
                    output.push('|');
                    for cell in table_cells(buffer) {
                        output.push_str("_. ");
                        output.push_str(&self.inline(&cell));
                        output.push_str(" |");
                    }
                } else {
                    output.push('|');
                    for cell in table_cells(buffer) {
                        output.push(' ');
                        output.push_str(&self.inline(&cell));
                        output.push_str(" |");
                    }
                }
                output.push('\n');
            }
            _ => {
                if ctx.in_quote() {
                    output.push_str("bq. ");
                } else if ctx.in_center() {
                    output.push_str("p=. ");
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

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> TextileEmitter {
        TextileEmitter::new(ExportOptions {
            use_sub_superscripts: true,
            ..ExportOptions::default()
        })
    }

    #[test]
    fn test_italic_becomes_underscore() {
        assert_eq!(emitter().inline("/italic/"), "_italic_");
    }

    #[test]
    fn test_simple_links() {
        assert_eq!(
            emitter().inline("[[http://www.google.com]]"),
            "\"http://www.google.com\":http://www.google.com"
        );
        assert_eq!(
            emitter().inline("[[http://www.google.com][Google]]"),
            "\"Google\":http://www.google.com"
        );
    }

    #[test]
    fn test_spaces_in_urls() {
        assert_eq!(emitter().inline("[[my url]]"), "\"my url\":my%20url");
    }

    #[test]
    fn test_images_inline() {
        assert_eq!(emitter().inline("[[logo.png]]"), "!logo.png!");
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(emitter().inline("use =let= here"), "use @let@ here");
    }
}
