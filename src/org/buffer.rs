//! Output buffering
//!
//! The output buffer receives classified lines in document order and
//! decides *when* text gets emitted; an [`Emitter`] decides *how*. Text
//! accumulates in a scratch buffer and is flushed when a structural
//! boundary arrives (blank line, list item, table row, block delimiter,
//! headline, end of group). Structural context is a mode stack: entering a
//! quote block pushes a frame, starting a nested list pushes one frame per
//! level, and so on. Frames are popped in LIFO order, at the boundary that
//! ends them or when the line group finishes.
//!
//! Blank lines are deferred: a blank sets a marker and the separator is
//! emitted by the *next* flush, so trailing blanks never produce output.

use std::collections::HashMap;

use crate::org::headline::Headline;
use crate::org::line::{BlockKind, Line, ParagraphType};

/// Structural context frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Paragraph,
    ListItem { ordered: bool, indent: usize },
    Quote,
    Center,
    Code { lang: Option<String> },
    Example,
    RawHtml,
    InlineExample,
    Table,
}

impl OutputMode {
    /// Modes that accumulate verbatim text and suppress inline rewriting.
    pub fn preserves_whitespace(&self) -> bool {
        matches!(
            self,
            OutputMode::Code { .. }
                | OutputMode::Example
                | OutputMode::RawHtml
                | OutputMode::InlineExample
        )
    }
}

/// What the buffered text is, at flush time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Start of a line group; nothing pending.
    Start,
    /// A blank line was seen; the next flush emits a separator.
    Blank,
    /// A silent line (comment, setting, drawer, separator) was seen.
    Silent,
    /// Ordinary buffered text (paragraph or list item).
    Text,
    TableRow,
    TableHeader,
}

/// Per-export options shared by the emitters.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub export_heading_number: bool,
    pub export_todo: bool,
    pub use_sub_superscripts: bool,
    pub export_footnotes: bool,
    pub link_abbrevs: HashMap<String, String>,
    pub skip_tables: bool,
    pub skip_syntax_highlight: bool,
    /// Emphasis marker replacements, when an override markup file was
    /// loaded successfully.
    pub emphasis_overrides: Option<HashMap<char, String>>,
}

/// Everything an emitter sees at flush time.
pub struct FlushContext<'a> {
    pub buffer: &'a str,
    pub output_type: OutputType,
    pub mode_stack: &'a [OutputMode],
}

impl<'a> FlushContext<'a> {
    pub fn current_mode(&self) -> Option<&OutputMode> {
        self.mode_stack.last()
    }

    pub fn list_depth(&self) -> usize {
        self.mode_stack
            .iter()
            .filter(|m| matches!(m, OutputMode::ListItem { .. }))
            .count()
    }

    pub fn in_quote(&self) -> bool {
        self.mode_stack.contains(&OutputMode::Quote)
    }

    pub fn in_center(&self) -> bool {
        self.mode_stack.contains(&OutputMode::Center)
    }
}

/// Target-format strategy. The buffer calls these in document order;
/// implementations append decorated text to `output`.
pub trait Emitter {
    fn name(&self) -> &'static str;

    fn headline(&mut self, headline: &Headline, output: &mut String);

    fn flush(&mut self, ctx: &FlushContext, output: &mut String);

    fn horizontal_rule(&mut self, output: &mut String);

    /// A structural frame was entered (list level, quote, table, ...).
    fn push_mode(&mut self, _mode: &OutputMode, _output: &mut String) {}

    /// A structural frame was left.
    fn pop_mode(&mut self, _mode: &OutputMode, _output: &mut String) {}

    /// A synthetic document title.
    fn title(&mut self, _text: &str, _output: &mut String) {}

    /// Collected footnote definitions, at end of document.
    fn output_footnotes(&mut self, _output: &mut String) {}

    /// Whole-document post-processing (typography pass for HTML).
    fn finalize(&mut self, output: String) -> String {
        output
    }
}

pub struct OutputBuffer {
    emitter: Box<dyn Emitter>,
    mode_stack: Vec<OutputMode>,
    buffer: String,
    output: String,
    output_type: OutputType,
    skip_tables: bool,
    /// Level shift for headline lines met inside blocks, matching the
    /// offset the parser applied to the section headlines.
    headline_offset: i32,
    custom_keywords: Vec<String>,
}

impl OutputBuffer {
    pub fn new(
        emitter: Box<dyn Emitter>,
        skip_tables: bool,
        headline_offset: i32,
        custom_keywords: Vec<String>,
    ) -> OutputBuffer {
        OutputBuffer {
            emitter,
            mode_stack: Vec::new(),
            buffer: String::new(),
            output: String::new(),
            output_type: OutputType::Start,
            skip_tables,
            headline_offset,
            custom_keywords,
        }
    }

    /// Reset for a new line group (header lines or one headline's body).
    pub fn start_group(&mut self) {
        self.output_type = OutputType::Start;
    }

    /// Flush pending text and drain the mode stack, LIFO.
    pub fn finish_group(&mut self) {
        // A blank at the end of a group separates nothing; drop it.
        if self.output_type == OutputType::Blank && self.buffer.is_empty() {
            self.output_type = OutputType::Silent;
        }
        self.flush();
        while let Some(mode) = self.mode_stack.pop() {
            self.emitter.pop_mode(&mode, &mut self.output);
        }
    }

    pub fn insert_headline(&mut self, headline: &Headline) {
        self.flush();
        self.emitter.headline(headline, &mut self.output);
        self.output_type = OutputType::Start;
    }

    pub fn insert(&mut self, line: &Line) {
        // Inline examples have no closing delimiter; any other line ends
        // the run and is then handled normally.
        if self.top() == Some(&OutputMode::InlineExample)
            && line.effective_type() != ParagraphType::InlineExample
        {
            self.flush();
            self.pop_frame();
            self.output_type = OutputType::Silent;
        }

        if self.top().map(|m| m.preserves_whitespace()).unwrap_or(false) {
            if line.effective_type() == ParagraphType::EndBlock {
                self.flush();
                self.pop_frame();
                self.output_type = OutputType::Silent;
            } else if self.top() == Some(&OutputMode::InlineExample) {
                let text = line.output_text();
                self.append(&text);
            } else {
                let text = line.text().to_string();
                self.append(&text);
            }
            return;
        }

        match line.effective_type() {
            ParagraphType::Blank => {
                self.flush();
                if self.top() == Some(&OutputMode::Paragraph) {
                    self.pop_frame();
                }
                if self.top() == Some(&OutputMode::Table) {
                    self.pop_frame();
                }
                self.output_type = OutputType::Blank;
            }

            ParagraphType::Comment
            | ParagraphType::InBufferSetting
            | ParagraphType::PropertyDrawerBegin
            | ParagraphType::PropertyDrawerEnd
            | ParagraphType::PropertyDrawerItem
            | ParagraphType::TableSeparator => {
                self.flush();
                self.output_type = OutputType::Silent;
            }

            ParagraphType::Paragraph | ParagraphType::Code => {
                if let Some(&OutputMode::ListItem { indent, .. }) = self.top() {
                    if line.indent() > indent {
                        // Indented continuation of the current list item.
                        let text = line.output_text().trim().to_string();
                        self.append(&text);
                        return;
                    }
                }
                if self.top() == Some(&OutputMode::Paragraph)
                    && self.output_type == OutputType::Text
                {
                    let text = line.output_text().trim().to_string();
                    self.append(&text);
                    return;
                }
                self.flush();
                self.pop_inline_frames();
                if self.top() != Some(&OutputMode::Paragraph) {
                    self.push_frame(OutputMode::Paragraph);
                }
                let text = line.output_text().trim().to_string();
                self.append(&text);
                self.output_type = OutputType::Text;
            }

            ParagraphType::OrderedList | ParagraphType::UnorderedList => {
                let ordered = line.effective_type() == ParagraphType::OrderedList;
                self.flush();
                while matches!(
                    self.top(),
                    Some(OutputMode::Paragraph) | Some(OutputMode::Table)
                ) {
                    self.pop_frame();
                }
                while let Some(&OutputMode::ListItem { indent, .. }) = self.top() {
                    if indent > line.indent() {
                        self.pop_frame();
                    } else {
                        break;
                    }
                }
                match self.top() {
                    Some(&OutputMode::ListItem {
                        ordered: o,
                        indent: i,
                    }) if i == line.indent() => {
                        if o != ordered {
                            self.pop_frame();
                            self.push_frame(OutputMode::ListItem {
                                ordered,
                                indent: line.indent(),
                            });
                        }
                    }
                    _ => self.push_frame(OutputMode::ListItem {
                        ordered,
                        indent: line.indent(),
                    }),
                }
                let text = line.output_text();
                self.append(&text);
                self.output_type = OutputType::Text;
            }

            ParagraphType::TableRow | ParagraphType::TableHeader => {
                if self.skip_tables {
                    self.flush();
                    self.output_type = OutputType::Silent;
                    return;
                }
                self.flush();
                while matches!(
                    self.top(),
                    Some(OutputMode::Paragraph) | Some(OutputMode::ListItem { .. })
                ) {
                    self.pop_frame();
                }
                if self.top() != Some(&OutputMode::Table) {
                    self.push_frame(OutputMode::Table);
                }
                let text = line.text().trim().to_string();
                self.append(&text);
                self.output_type = if line.effective_type() == ParagraphType::TableHeader {
                    OutputType::TableHeader
                } else {
                    OutputType::TableRow
                };
            }

            ParagraphType::BeginBlock => {
                self.flush();
                self.pop_inline_frames();
                match line.begin_block() {
                    Some(BlockKind::Src) => self.push_frame(OutputMode::Code {
                        lang: line.block_lang(),
                    }),
                    Some(BlockKind::Example) => self.push_frame(OutputMode::Example),
                    Some(BlockKind::Html) => self.push_frame(OutputMode::RawHtml),
                    Some(BlockKind::Quote) => self.push_frame(OutputMode::Quote),
                    Some(BlockKind::Center) => self.push_frame(OutputMode::Center),
                    _ => {}
                }
                self.output_type = OutputType::Silent;
            }

            ParagraphType::EndBlock => {
                self.flush();
                if self.top() == Some(&OutputMode::Paragraph) {
                    self.pop_frame();
                }
                let matches_top = match (line.end_block(), self.top()) {
                    (Some(BlockKind::Quote), Some(OutputMode::Quote)) => true,
                    (Some(BlockKind::Center), Some(OutputMode::Center)) => true,
                    _ => false,
                };
                if matches_top {
                    self.pop_frame();
                }
                self.output_type = OutputType::Silent;
            }

            ParagraphType::HorizontalRule => {
                self.flush();
                if self.top() == Some(&OutputMode::Paragraph) {
                    self.pop_frame();
                }
                self.emitter.horizontal_rule(&mut self.output);
                self.output_type = OutputType::Silent;
            }

            ParagraphType::InlineExample => {
                self.flush();
                self.pop_inline_frames();
                self.push_frame(OutputMode::InlineExample);
                let text = line.output_text();
                self.append(&text);
                self.output_type = OutputType::Text;
            }

            ParagraphType::Headline => {
                // Headlines inside quote/center blocks are emitted in place
                // but never own a section.
                self.flush();
                let headline =
                    Headline::parse(line.text(), self.headline_offset, &self.custom_keywords);
                self.emitter.headline(&headline, &mut self.output);
                self.output_type = OutputType::Start;
            }

            ParagraphType::Title => {
                self.flush();
                self.emitter.title(line.text(), &mut self.output);
                self.output_type = OutputType::Silent;
            }
        }
    }

    /// Emit collected footnotes; call once per document.
    pub fn output_footnotes(&mut self) {
        self.emitter.output_footnotes(&mut self.output);
    }

    /// Consume the buffer and return the finalized output.
    pub fn into_output(mut self) -> String {
        let output = std::mem::take(&mut self.output);
        self.emitter.finalize(output)
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    fn top(&self) -> Option<&OutputMode> {
        self.mode_stack.last()
    }

    fn push_frame(&mut self, mode: OutputMode) {
        self.emitter.push_mode(&mode, &mut self.output);
        self.mode_stack.push(mode);
    }

    fn pop_frame(&mut self) {
        if let Some(mode) = self.mode_stack.pop() {
            self.emitter.pop_mode(&mode, &mut self.output);
        }
    }

    /// Pop paragraph, list, and table frames before a block-level boundary.
    fn pop_inline_frames(&mut self) {
        while matches!(
            self.top(),
            Some(OutputMode::Paragraph)
                | Some(OutputMode::ListItem { .. })
                | Some(OutputMode::Table)
        ) {
            self.pop_frame();
        }
    }

    fn append(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() && self.output_type != OutputType::Blank {
            return;
        }
        log::debug!("flush {:?}: {:?}", self.output_type, self.buffer);
        let ctx = FlushContext {
            buffer: &self.buffer,
            output_type: self.output_type,
            mode_stack: &self.mode_stack,
        };
        self.emitter.flush(&ctx, &mut self.output);
        self.buffer.clear();
    }
}
