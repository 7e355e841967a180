//! Main module for the org conversion library

use std::error::Error;
use std::fmt;

pub mod buffer;
pub mod config;
pub mod emitters;
pub mod exporter;
pub mod headline;
pub mod line;
pub mod parser;
pub mod rewrite;
pub mod selection;

/// Errors surfaced to callers. Structural problems in the input never
/// error: unrecognized markup falls back to plain paragraphs, and include
/// or markup-file failures degrade silently.
#[derive(Debug)]
pub enum OrgError {
    /// A file could not be read.
    Io(String),
    /// An export format name nothing answers to.
    UnknownFormat(String),
}

impl fmt::Display for OrgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgError::Io(detail) => write!(f, "i/o error: {}", detail),
            OrgError::UnknownFormat(name) => write!(f, "unknown output format: {}", name),
        }
    }
}

impl Error for OrgError {}
