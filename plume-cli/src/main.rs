//! Plume CLI
//!
//! Parses a markup file (or literal markup) and prints the resulting tree,
//! its serialization or its text content.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use owo_colors::OwoColorize;
use plume_dom::{DomTree, NodeId, NodeType, SerializeOptions};
use plume_markup::{IncrementalParser, ParseOptions, parse_document};
use simple_logger::SimpleLogger;

/// Plume: streaming, error-tolerant markup parser
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "plume")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Dump the tree of a file
    plume page.html

    # Parse inline markup as XML and print it back
    plume --markup --xml --format markup '<a><b/></a>'

    # Feed the parser 16 characters at a time with debug logging
    plume --chunk-size 16 -vv page.html
"#)]
struct Cli {
    /// File to parse, or the markup itself with --markup
    #[arg(value_name = "INPUT")]
    input: String,

    /// Treat INPUT as literal markup instead of a path
    #[arg(long)]
    markup: bool,

    /// Strict XML mode
    #[arg(long)]
    xml: bool,

    /// Lowercase tag names
    #[arg(long)]
    fold_tags: bool,

    /// Lowercase attribute names
    #[arg(long)]
    fold_attributes: bool,

    /// Keep CDATA sections instead of turning them into comments
    #[arg(long)]
    cdata: bool,

    /// JSON file with parse options; flags above are applied on top
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Feed the parser incrementally in chunks of N characters
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// What to print
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Disable colors in tree output
    #[arg(long)]
    no_color: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented node dump
    Tree,
    /// Markup of the whole document
    Markup,
    /// Markup inside the document element
    Inner,
    /// Text content
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(log_level(cli.verbose))
        .init()
        .context("installing logger")?;

    let source = if cli.markup {
        cli.input.clone()
    } else {
        fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input))?
    };
    let options = parse_options(&cli)?;
    log::debug!("parsing {} bytes with {options:?}", source.len());

    let tree = match cli.chunk_size {
        Some(size) => parse_in_chunks(&source, &options, size)?,
        None => parse_document(&source, &options),
    };

    let serialize = if options.treat_as_xml {
        SerializeOptions::XML
    } else {
        SerializeOptions::HTML
    };
    match cli.format {
        Format::Tree => print!("{}", render_tree(&tree, !cli.no_color)),
        Format::Markup => println!("{}", tree.outer_markup(NodeId::ROOT, &serialize)),
        Format::Inner => {
            let element = tree
                .document_element()
                .context("document has no element")?;
            println!("{}", tree.inner_markup(element, &serialize));
        }
        Format::Text => println!("{}", tree.text_content(NodeId::ROOT)),
    }
    Ok(())
}

const fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Options file first, then command-line flags.
fn parse_options(cli: &Cli) -> Result<ParseOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parsing options in {}", path.display()))?
        }
        None => ParseOptions::default(),
    };
    options.treat_as_xml |= cli.xml;
    options.fold_tag_name_case |= cli.fold_tags;
    options.fold_attribute_name_case |= cli.fold_attributes;
    options.treat_cdata_as_text |= cli.cdata;
    Ok(options)
}

fn parse_in_chunks(source: &str, options: &ParseOptions, size: usize) -> Result<DomTree> {
    anyhow::ensure!(size > 0, "--chunk-size must be positive");
    let mut parser = IncrementalParser::new(options);
    let mut chunk = String::new();
    let mut chars = 0;
    for c in source.chars() {
        chunk.push(c);
        chars += 1;
        if chars == size {
            parser.write(&chunk)?;
            chunk.clear();
            chars = 0;
        }
    }
    parser.write(&chunk)?;
    parser.end()?;
    Ok(parser.into_tree())
}

/// Indented dump of every node, one per line.
fn render_tree(tree: &DomTree, color: bool) -> String {
    let mut out = String::new();
    let mut stack = vec![(NodeId::ROOT, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let prefix = "  ".repeat(depth);
        let line = match &node.node_type {
            NodeType::Document => paint("Document", color, Paint::Dim),
            NodeType::Element(data) => {
                let mut tag = format!("<{}", data.tag_name);
                for attr in &data.attrs {
                    let _ = write!(tag, " {}=\"{}\"", attr.name, attr.value);
                }
                tag.push_str(if data.self_closing { "/>" } else { ">" });
                paint(&tag, color, Paint::Element)
            }
            NodeType::Text(text) => {
                paint(&format!("{text:?}"), color, Paint::Text)
            }
            NodeType::Comment(text) => paint(&format!("<!--{text}-->"), color, Paint::Dim),
            NodeType::CData => paint("<![CDATA[", color, Paint::Dim),
            NodeType::ProcessingInstruction { data, .. } => {
                paint(&format!("<{data}>"), color, Paint::Dim)
            }
        };
        let _ = writeln!(out, "{prefix}{line}");
        stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1)));
    }
    out
}

#[derive(Clone, Copy)]
enum Paint {
    Element,
    Text,
    Dim,
}

fn paint(s: &str, color: bool, paint: Paint) -> String {
    if !color {
        return s.to_string();
    }
    match paint {
        Paint::Element => s.cyan().to_string(),
        Paint::Text => s.green().to_string(),
        Paint::Dim => s.dimmed().to_string(),
    }
}
