//! Export orchestration
//!
//! Drives a parsed [`Document`] through the export selector and an output
//! buffer, one line group at a time: first the header lines, then each
//! headline's body. The buffer's mode stack is drained between groups, so
//! no structural context leaks across section boundaries.

use crate::org::buffer::{ExportOptions, OutputBuffer};
use crate::org::config;
use crate::org::emitters::html::smart_typography;
use crate::org::emitters::{HtmlEmitter, MarkdownEmitter, TextileEmitter};
use crate::org::headline::ExportState;
use crate::org::line::Line;
use crate::org::parser::Document;
use crate::org::selection::mark_trees_for_export;
use crate::org::OrgError;

/// The supported target formats, as accepted by [`export`].
pub const FORMATS: [&str; 3] = ["html", "markdown", "textile"];

/// Convert by format name.
pub fn export(doc: &mut Document, format: &str) -> Result<String, OrgError> {
    match format {
        "html" => Ok(to_html(doc)),
        "markdown" | "md" => Ok(to_markdown(doc)),
        "textile" => Ok(to_textile(doc)),
        other => Err(OrgError::UnknownFormat(other.to_string())),
    }
}

pub fn to_html(doc: &mut Document) -> String {
    mark_trees_for_export(doc);
    let options = export_options(doc, "html");
    let skip_tables = options.skip_tables;
    let mut emitter = HtmlEmitter::new(options);
    if !doc.config.skip_typography_pass {
        emitter = emitter.with_typography(smart_typography);
    }
    let mut buffer = OutputBuffer::new(
        Box::new(emitter),
        skip_tables,
        doc.config.offset,
        doc.custom_keywords.clone(),
    );

    if let Some(title) = doc.settings.get("TITLE") {
        let title = Line::title(title);
        buffer.start_group();
        buffer.insert(&title);
        buffer.finish_group();
    }
    if !doc.skip_header_lines() {
        translate(&doc.header_lines, &mut buffer);
    }
    for headline in &doc.headlines {
        match headline.export_state {
            ExportState::Exclude => {}
            ExportState::HeadlineOnly => {
                buffer.start_group();
                buffer.insert_headline(headline);
                buffer.finish_group();
            }
            ExportState::All => {
                buffer.start_group();
                buffer.insert_headline(headline);
                for line in &headline.body_lines[1..] {
                    buffer.insert(line);
                }
                buffer.finish_group();
            }
        }
    }
    buffer.output_footnotes();
    let mut output = buffer.into_output();
    output.push('\n');
    output
}

pub fn to_markdown(doc: &mut Document) -> String {
    mark_trees_for_export(doc);
    let options = export_options(doc, "markdown");
    let skip_tables = options.skip_tables;
    let emitter = MarkdownEmitter::new(options);
    let mut buffer = OutputBuffer::new(
        Box::new(emitter),
        skip_tables,
        doc.config.offset,
        doc.custom_keywords.clone(),
    );

    translate(&doc.header_lines, &mut buffer);
    for headline in &doc.headlines {
        match headline.export_state {
            ExportState::Exclude => {}
            ExportState::HeadlineOnly => {
                buffer.start_group();
                buffer.insert_headline(headline);
                buffer.finish_group();
            }
            ExportState::All => {
                buffer.start_group();
                buffer.insert_headline(headline);
                for line in &headline.body_lines[1..] {
                    buffer.insert(line);
                }
                buffer.finish_group();
            }
        }
    }
    buffer.into_output()
}

/// Textile export walks every headline; the selector does not apply.
pub fn to_textile(doc: &mut Document) -> String {
    let options = export_options(doc, "textile");
    let skip_tables = options.skip_tables;
    let emitter = TextileEmitter::new(options);
    let mut buffer = OutputBuffer::new(
        Box::new(emitter),
        skip_tables,
        doc.config.offset,
        doc.custom_keywords.clone(),
    );

    translate(&doc.header_lines, &mut buffer);
    for headline in &doc.headlines {
        buffer.start_group();
        buffer.insert_headline(headline);
        for line in &headline.body_lines[1..] {
            buffer.insert(line);
        }
        buffer.finish_group();
    }
    buffer.into_output()
}

fn translate(lines: &[Line], buffer: &mut OutputBuffer) {
    buffer.start_group();
    for line in lines {
        buffer.insert(line);
    }
    buffer.finish_group();
}

fn export_options(doc: &Document, format: &str) -> ExportOptions {
    ExportOptions {
        export_heading_number: doc.export_heading_number(),
        export_todo: doc.export_todo(),
        use_sub_superscripts: doc.use_sub_superscripts(),
        export_footnotes: doc.export_footnotes(),
        link_abbrevs: doc.link_abbrevs.clone(),
        skip_tables: !doc.export_tables(),
        skip_syntax_highlight: doc.config.skip_syntax_highlight,
        emphasis_overrides: doc
            .config
            .markup_file
            .as_ref()
            .and_then(|path| config::load_markup_overrides(path, format)),
    }
}

impl Document {
    /// Convert the document to HTML.
    pub fn to_html(&mut self) -> String {
        to_html(self)
    }

    /// Convert the document to Markdown.
    pub fn to_markdown(&mut self) -> String {
        to_markdown(self)
    }

    /// Convert the document to Textile.
    pub fn to_textile(&mut self) -> String {
        to_textile(self)
    }
}
