//! Command-line interface for orgish
//! Converts org-style outline documents into HTML, Textile, or Markdown.
//!
//! Usage:
//!   orgish convert `<path>` [--to `<format>`] [--include-files] ...  - Convert a document
//!   orgish inspect `<path>` [--json]                               - Dump the parsed structure
//!   orgish list-formats                                          - List output formats

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use orgish::org::config::{self, ParserConfig};
use orgish::{export, Document, FORMATS};

fn main() {
    let matches = Command::new("orgish")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A converter for org-style outline documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("convert")
                .about("Convert a document and print the result")
                .arg(
                    Arg::new("path")
                        .help("Path to the org file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Output format ('html', 'textile', 'markdown')")
                        .default_value("html"),
                )
                .arg(
                    Arg::new("include-files")
                        .long("include-files")
                        .help("Expand #+INCLUDE: directives")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("include-root")
                        .long("include-root")
                        .help("Restrict included files to this directory (implies --include-files)"),
                )
                .arg(
                    Arg::new("markup")
                        .long("markup")
                        .help("YAML file overriding the emphasis markup map"),
                )
                .arg(
                    Arg::new("no-typography")
                        .long("no-typography")
                        .help("Skip the typography pass on HTML output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .help("Log conversion internals to stderr")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Dump the parsed document structure")
                .arg(
                    Arg::new("path")
                        .help("Path to the org file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Emit the structure as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("convert", convert_matches)) => {
            let path = convert_matches.get_one::<String>("path").unwrap();
            let format = convert_matches.get_one::<String>("to").unwrap();
            init_logging(convert_matches.get_flag("verbose"));

            let mut parser_config = ParserConfig {
                skip_typography_pass: convert_matches.get_flag("no-typography"),
                markup_file: convert_matches.get_one::<String>("markup").map(PathBuf::from),
                ..ParserConfig::default()
            };
            if convert_matches.get_flag("include-files") {
                parser_config.allow_include_files = Some(true);
            }
            if let Some(root) = convert_matches.get_one::<String>("include-root") {
                parser_config.allow_include_files = Some(true);
                parser_config.include_root = Some(PathBuf::from(root));
            }
            let parser_config = config::resolve_from_env(parser_config);

            handle_convert_command(path, format, parser_config);
        }
        Some(("inspect", inspect_matches)) => {
            let path = inspect_matches.get_one::<String>("path").unwrap();
            handle_inspect_command(path, inspect_matches.get_flag("json"));
        }
        Some(("list-formats", _)) => {
            handle_list_formats_command();
        }
        _ => unreachable!(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Warn
    };
    let _ = simplelog::SimpleLogger::init(level, simplelog::Config::default());
}

/// Handle the convert command
fn handle_convert_command(path: &str, format: &str, parser_config: ParserConfig) {
    let mut doc = Document::load(path, parser_config).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let output = export(&mut doc, format).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    print!("{}", output);
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, json: bool) {
    let doc = Document::load(path, ParserConfig::default()).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    if json {
        let rendered = serde_json::to_string_pretty(&doc).unwrap_or_else(|e| {
            eprintln!("Error serializing document: {}", e);
            std::process::exit(1);
        });
        println!("{}", rendered);
        return;
    }

    println!("headlines: {}", doc.headlines.len());
    for headline in &doc.headlines {
        let keyword = headline
            .keyword
            .as_deref()
            .map(|k| format!(" [{}]", k))
            .unwrap_or_default();
        let tags = if headline.tags.is_empty() {
            String::new()
        } else {
            format!("  :{}:", headline.tags.join(":"))
        };
        println!(
            "{}{} {}{}",
            "*".repeat(headline.level),
            keyword,
            headline.headline_text,
            tags
        );
    }
    if !doc.settings.is_empty() {
        println!("settings:");
        let mut keys: Vec<&String> = doc.settings.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {}: {}", key, doc.settings[key]);
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Available output formats:\n");
    for format in FORMATS {
        println!("  {}", format);
    }
}
