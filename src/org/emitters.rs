//! Target-format emitters
//!
//! One module per output grammar. Each implements [`Emitter`] and owns its
//! inline markup map, block decorations, and headline shape; the shared
//! buffering and flush timing live in [`crate::org::buffer`].

pub mod html;
pub mod markdown;
pub mod textile;

pub use html::HtmlEmitter;
pub use markdown::MarkdownEmitter;
pub use textile::TextileEmitter;

/// Split a pipe-delimited table row into trimmed cell strings.
pub(crate) fn table_cells(row: &str) -> Vec<String> {
    let trimmed = row.trim();
    let inner = trimmed
        .strip_prefix('|')
        .unwrap_or(trimmed)
        .strip_suffix('|')
        .unwrap_or_else(|| trimmed.strip_prefix('|').unwrap_or(trimmed));
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::table_cells;

    #[test]
    fn test_table_cells() {
        assert_eq!(table_cells("| a | b |"), vec!["a", "b"]);
        assert_eq!(table_cells("|a|b"), vec!["a", "b"]);
        assert_eq!(table_cells("| one |  | three |"), vec!["one", "", "three"]);
    }
}
