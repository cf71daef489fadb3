//! The `inkdown` command-line interface.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use inkdown::adapters::{DefaultTermSize, TermSizeProbe};
use inkdown::{
    ConsoleOptions, FormatOptions, HtmlOptions, ParseOptions, Plugins, RangeOptions,
};

#[derive(Debug, Parser)]
#[command(
    name = "inkdown",
    about = "Render Markdown to the terminal, to HTML, or back to normalized Markdown",
    version
)]
struct Cli {
    /// Input file; stdin when omitted.
    file: Option<PathBuf>,

    /// Emit a standalone HTML page.
    #[arg(long)]
    html: bool,

    /// Emit normalized Markdown.
    #[arg(long, conflicts_with = "html")]
    format: bool,

    /// Emit plain text and dump the style ranges to stderr.
    #[arg(long, conflicts_with_all = ["html", "format"])]
    ranges: bool,

    /// Output width in columns; defaults to the terminal width.
    #[arg(short, long)]
    width: Option<usize>,

    /// Left margin in columns.
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Disable ANSI escape sequences.
    #[arg(long)]
    no_color: bool,

    /// Do not fetch remote images.
    #[arg(long)]
    nofetch: bool,

    /// Syntect theme for code blocks.
    #[arg(long, default_value = "base16-ocean.dark")]
    theme: String,

    /// Write to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print parse and render diagnostics to stderr.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("inkdown: {}", e);
        process::exit(1);
    }
}

fn run() -> io::Result<()> {
    let cli = Cli::parse();

    let bytes = match &cli.file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let source = String::from_utf8_lossy(&bytes);

    let diagnostic: Option<Arc<dyn inkdown::Diagnostic>> = if cli.verbose {
        Some(Arc::new(|line: &str| eprintln!("inkdown: {}", line)))
    } else {
        None
    };

    let parse_options = ParseOptions {
        diagnostic: diagnostic.clone(),
    };
    let doc = inkdown::parse_with_options(&source, &parse_options);

    let termsize = DefaultTermSize.probe();
    let width = cli.width.unwrap_or(termsize.cols);

    #[cfg(feature = "syntect")]
    let highlighter = inkdown::plugins::syntect::SyntectAdapter::new(&cli.theme);
    let mut plugins = Plugins::default();
    #[cfg(feature = "syntect")]
    {
        plugins.highlighter = Some(&highlighter);
    }

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    if cli.html {
        let options = HtmlOptions {
            diagnostic,
            ..HtmlOptions::default()
        };
        inkdown::html::format_document_with_plugins(&doc, &options, &plugins, &mut out)?;
    } else if cli.format {
        let options = FormatOptions {
            width,
            indent: 0,
        };
        inkdown::md::format_document(&doc, &options, &mut out)?;
    } else if cli.ranges {
        let options = RangeOptions {
            width,
            indent: cli.indent,
            diagnostic,
            ..RangeOptions::default()
        };
        let ranges =
            inkdown::ranges::format_document_with_plugins(&doc, &options, &plugins, &mut out)?;
        for r in ranges {
            eprintln!("{}:{}..{} {:?}", r.line, r.start, r.end, r.style);
        }
    } else {
        let options = ConsoleOptions {
            width,
            indent: cli.indent,
            nofetch: cli.nofetch,
            termsize,
            colors: !cli.no_color,
            diagnostic,
            ..ConsoleOptions::default()
        };
        inkdown::console::format_document_with_plugins(&doc, &options, &plugins, &mut out)?;
    }

    out.flush()
}
