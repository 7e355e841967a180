//! End-to-end conversion tests
//!
//! These exercise the whole pipeline (parse, select, buffer, emit) through
//! the public API, one realistic document per scenario. Expected outputs
//! are inline snapshots; targeted assertions cover the behaviors that
//! snapshots would bury (selection, include handling, option toggles).

use std::env;
use std::fs;
use std::io::Write;

use orgish::{export, Document, ParserConfig};

fn doc(text: &str) -> Document {
    Document::from_str(text, ParserConfig::default())
}

#[test]
fn test_markdown_document_with_lists_and_emphasis() {
    let mut d = doc(
        "* Overview\n\
         Plain text with *bold*, /italic/, and =verbatim= words.\n\
         \n\
         - first\n\
         - second\n\
         \x20\x20- nested\n\
         \n\
         1. one\n\
         2. two\n",
    );
    insta::assert_snapshot!(d.to_markdown(), @r"
    # Overview
    Plain text with **bold**, *italic*, and `verbatim` words.

    * first
    * second
      * nested

    1. one
    1. two
    ");
}

#[test]
fn test_html_document_with_numbering_and_footnotes() {
    let mut d = doc(
        "#+TITLE: Sample\n\
         #+OPTIONS: num:t f:t\n\
         \n\
         * First\n\
         Body[fn:1:The note.] text.\n\
         ** Inner\n\
         More.\n",
    );
    insta::assert_snapshot!(d.to_html(), @r##"
    <h1 class="title">Sample</h1>
    <h1><span class="heading-number heading-number-1">1</span> First</h1>
    <p>Body<sup><a class="footnum" name="fnr.1" href="#fn.1">1</a></sup> text.</p>
    <h2><span class="heading-number heading-number-2">1.1</span> Inner</h2>
    <p>More.</p>
    <div id="footnotes">
    <h2 class="footnotes">Footnotes:</h2>
    <div id="text-footnotes">
    <div class="footdef"><sup><a class="footnum" name="fn.1" href="#fnr.1">1</a></sup> <p class="footpara">The note.</p></div>
    </div>
    </div>
    "##);
}

#[test]
fn test_html_table_and_source_block() {
    let mut d = doc(
        "| Name | Qty |\n\
         |------+-----|\n\
         | bolt | 4 |\n\
         \n\
         #+BEGIN_SRC sh\n\
         echo \"done\" -- fast\n\
         #+END_SRC\n",
    );
    // Quotes and dashes inside the code block must survive the typography
    // pass untouched.
    insta::assert_snapshot!(d.to_html(), @r#"
    <table>
    <tr><th>Name</th><th>Qty</th></tr>
    <tr><td>bolt</td><td>4</td></tr>
    </table>
    <pre class="src"><code class="sh">echo "done" -- fast</code></pre>
    "#);
}

#[test]
fn test_textile_headline_and_center_block() {
    let mut d = doc(
        "* TODO Task :work:\n\
         Finish /this/ and =that=.\n\
         \n\
         #+BEGIN_CENTER\n\
         middle\n\
         #+END_CENTER\n",
    );
    insta::assert_snapshot!(d.to_textile(), @r"
    h1. Task
    Finish _this_ and @that@.

    p=. middle
    ");
}

#[test]
fn test_textile_table_header_cells() {
    let mut d = doc("| a | b |\n|---+---|\n| 1 | 2 |\n");
    assert_eq!(d.to_textile(), "|_. a |_. b |\n| 1 | 2 |\n");
}

#[test]
fn test_code_spans_shield_markup_in_documents() {
    let mut d = doc("keep =x *b* y= safe\n");
    assert_eq!(d.to_markdown(), "keep `x *b* y` safe\n");
}

#[test]
fn test_link_abbreviation_expansion() {
    let mut d = doc("#+LINK: bug http://bugs/show?id=%s\nSee [[bug:42][the bug]].\n");
    assert_eq!(d.to_markdown(), "See [the bug](http://bugs/show?id=42).\n");
}

#[test]
fn test_custom_todo_keywords_exported() {
    let mut d = doc("#+TODO: OPEN | CLOSED\n#+OPTIONS: todo:t\n* OPEN Fix the latch\n");
    assert_eq!(d.to_markdown(), "# OPEN Fix the latch\n");
}

#[test]
fn test_tables_disabled_by_option() {
    let mut d = doc("#+OPTIONS: |:nil\nintro\n| a | b |\n| 1 | 2 |\n");
    let out = d.to_markdown();
    assert!(out.contains("intro"));
    assert!(!out.contains('|'));
}

#[test]
fn test_subscripts_respect_option() {
    let mut on = doc("H_{2}O\n");
    assert_eq!(on.to_markdown(), "H<sub>2</sub>O\n");
    let mut off = doc("#+OPTIONS: ^:nil\nH_{2}O\n");
    assert_eq!(off.to_markdown(), "H_{2}O\n");
}

#[test]
fn test_export_selection_across_formats() {
    let text = "#+EXPORT_EXCLUDE_TAGS: noexport\n\
                * Public\nshown\n\
                * Private :noexport:\nhidden\n";
    let mut d = doc(text);
    let html = d.to_html();
    assert!(html.contains("shown"));
    assert!(!html.contains("hidden"));
    // Textile has no selection pass and keeps everything.
    let textile = d.to_textile();
    assert!(textile.contains("hidden"));
}

#[test]
fn test_include_files_disabled_by_default() {
    let path = env::temp_dir().join("orgish-include-default.org");
    fs::write(&path, "- alpha\n- beta\n").unwrap();

    let text = format!("before\n#+INCLUDE: \"{}\"\nafter\n", path.display());
    let mut d = doc(&text);
    let out = d.to_markdown();
    assert!(!out.contains("alpha"));
    assert!(out.contains("before"));
    assert!(out.contains("after"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_include_files_spliced_when_enabled() {
    let path = env::temp_dir().join("orgish-include-enabled.org");
    fs::write(&path, "- alpha\n- beta\n").unwrap();

    let text = format!("before\n#+INCLUDE: \"{}\"\nafter\n", path.display());
    let mut d = Document::from_str(
        &text,
        ParserConfig {
            allow_include_files: Some(true),
            ..ParserConfig::default()
        },
    );
    let out = d.to_markdown();
    assert!(out.contains("* alpha"));
    assert!(out.contains("* beta"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_markup_override_file_changes_markdown_emphasis() {
    let path = env::temp_dir().join("orgish-markup-integration.yml");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "markdown:").unwrap();
    writeln!(file, "  emphasis:").unwrap();
    writeln!(file, "    \"*\": \"__\"").unwrap();
    drop(file);

    let mut d = Document::from_str(
        "some *bold* text\n",
        ParserConfig {
            markup_file: Some(path.clone()),
            ..ParserConfig::default()
        },
    );
    assert_eq!(d.to_markdown(), "some __bold__ text\n");
    fs::remove_file(&path).ok();
}

#[test]
fn test_export_by_name_matches_direct_calls() {
    let text = "* h\nbody\n";
    let mut named = doc(text);
    let mut direct = doc(text);
    assert_eq!(export(&mut named, "html").unwrap(), direct.to_html());
    let mut named = doc(text);
    let mut direct = doc(text);
    assert_eq!(export(&mut named, "textile").unwrap(), direct.to_textile());
    assert!(export(&mut doc(text), "asciidoc").is_err());
}
