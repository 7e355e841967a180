//! Property-based tests for the document pipeline
//!
//! These ensure that parsing and exporting handle arbitrary outline-ish
//! documents without panicking, for every target format, and that a few
//! structural invariants hold on whatever comes out.

use proptest::prelude::*;

use orgish::org::line::Line;
use orgish::{export, Document, ParserConfig, FORMATS};

/// Generate plain text lines, including empty ones.
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]+",
        "[a-zA-Z0-9]+ [a-zA-Z0-9]+[.,!?]",
        "\\*[a-z]+\\* and /[a-z]+/",
        "=[a-z ]+=",
        "",
    ]
}

/// Generate headline lines of varying depth.
fn headline_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\* [A-Za-z ]+",
        "\\*\\* TODO [A-Za-z ]+",
        "\\*\\*\\* [A-Za-z]+ :tag:",
    ]
}

/// Generate list items, table rows, and structural one-liners.
fn structure_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "- [a-zA-Z0-9 ]+",
        "  - [a-zA-Z0-9 ]+",
        "[0-9]+\\. [a-zA-Z0-9 ]+",
        "\\| [a-z]+ \\| [a-z]+ \\|",
        "\\|---\\+---\\|",
        ": [a-z ]+",
        "-----",
        "#\\+OPTIONS: (num:t|todo:t|\\|:nil|\\^:nil)",
        "#\\+BEGIN_(SRC|EXAMPLE|QUOTE|CENTER|HTML)",
        "#\\+END_(SRC|EXAMPLE|QUOTE|CENTER|HTML)",
        "# [a-z ]+",
    ]
}

/// Generate whole documents by mixing the line strategies.
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => text_strategy(),
            1 => headline_strategy(),
            2 => structure_strategy(),
        ],
        0..30,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_parse_never_panics(input in document_strategy()) {
        let _doc = Document::from_str(&input, ParserConfig::default());
    }

    #[test]
    fn test_every_format_exports_without_panic(input in document_strategy()) {
        for format in FORMATS {
            let mut doc = Document::from_str(&input, ParserConfig::default());
            let output = export(&mut doc, format).unwrap();
            // HTML output always carries a final newline.
            if format == "html" {
                prop_assert!(output.ends_with('\n'));
            }
        }
    }

    #[test]
    fn test_headline_levels_are_positive(input in document_strategy()) {
        let doc = Document::from_str(&input, ParserConfig::default());
        for headline in &doc.headlines {
            prop_assert!(headline.level >= 1);
        }
    }

    #[test]
    fn test_classifier_total_on_arbitrary_text(input in "\\PC{0,80}") {
        // Any single line gets exactly one classification, panic-free.
        let _line = Line::new(&input);
    }

    #[test]
    fn test_code_spans_survive_markdown_rewriting(body in "[a-z]{1,12}") {
        // Text inside =...= must come out verbatim between backticks, no
        // matter what the body looks like to the other rewrite passes.
        let input = format!("keep ={}= safe", body);
        let mut doc = Document::from_str(&input, ParserConfig::default());
        let output = doc.to_markdown();
        let needle = format!("`{}`", body);
        prop_assert!(output.contains(&needle));
    }
}
