//! # orgish
//!
//! A converter for org-style outline documents. Parses the plain-text
//! outline format (headlines, blocks, tables, lists, inline emphasis) and
//! renders it as HTML, Textile, or Markdown.
//!
//! ```text
//! use orgish::{Document, ParserConfig};
//!
//! let mut doc = Document::from_str("* Hello\nSome *bold* text.\n", ParserConfig::default());
//! let html = doc.to_html();
//! ```

pub mod org;

pub use org::config::ParserConfig;
pub use org::exporter::{export, FORMATS};
pub use org::parser::Document;
pub use org::OrgError;
