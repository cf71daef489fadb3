//! A Markdown toolkit: a pragmatic parser and four renderers.
//!
//! Source text parses into a typed document tree ([`nodes::Block`]); the
//! tree renders as ANSI-styled terminal output ([`console`]), as plain
//! text plus styled ranges for embedders ([`ranges`]), as a standalone
//! HTML page ([`html`]), or back to normalized Markdown ([`md`]).
//!
//! ```
//! let html = inkdown::markdown_to_html("# Hello\n", &inkdown::HtmlOptions::default());
//! assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
//!
//! let md = inkdown::format_markdown("  *   ***list*** item ", &inkdown::FormatOptions::default());
//! assert_eq!(md, "- _**list**_ item\n");
//! ```
//!
//! Syntax highlighting, image drawing and network fetches are injected as
//! capability objects ([`adapters`], [`Plugins`]); the core never reaches
//! for them on its own.

pub mod adapters;
pub mod console;
mod ctype;
pub mod html;
mod lexer;
pub mod md;
pub mod nodes;
pub mod parser;
pub mod plugins;
pub mod ranges;
mod reflow;
mod scanners;
mod strings;
mod term;
pub mod toc;

#[cfg(test)]
mod tests;

pub use crate::console::ConsoleOptions;
pub use crate::html::{Css, HtmlOptions};
pub use crate::md::FormatOptions;
pub use crate::parser::{parse, parse_with_options, Diagnostic, ParseOptions};
pub use crate::plugins::Plugins;
pub use crate::ranges::{RangeOptions, StyleRange};
pub use crate::term::BoxStyle;

/// Parse and render to a complete HTML page in one call.
pub fn markdown_to_html(md: &str, options: &HtmlOptions) -> String {
    let doc = parse(md);
    let mut out = Vec::new();
    html::format_document(&doc, options, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Parse and render to ANSI terminal text in one call.
pub fn markdown_to_ansi(md: &str, options: &ConsoleOptions) -> String {
    let doc = parse(md);
    let mut out = Vec::new();
    console::format_document(&doc, options, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Parse and render to plain text plus styled ranges in one call.
pub fn markdown_to_ranges(md: &str, options: &RangeOptions) -> (String, Vec<StyleRange>) {
    let doc = parse(md);
    let mut out = Vec::new();
    let ranges = ranges::format_document(&doc, options, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), ranges)
}

/// Parse and pretty-print back to normalized Markdown in one call.
pub fn format_markdown(md: &str, options: &FormatOptions) -> String {
    let doc = parse(md);
    let mut out = Vec::new();
    md::format_document(&doc, options, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}
