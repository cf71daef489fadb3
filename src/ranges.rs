//! The range renderer: plain text plus a side channel of styled ranges.
//!
//! Shares the entire visual grammar with the console renderer; where the
//! console writes escape sequences, this serialization records
//! `(line, byte range, style)` triples for embedders that apply their own
//! highlighting. Images appear only as their `alt → src` text.

use std::io::{self, Write};
use std::sync::Arc;

use crate::nodes::{Block, TextStyle};
use crate::parser::Diagnostic;
use crate::plugins::Plugins;
use crate::term::{self, BoxStyle, TermConfig};

/// One styled region of the emitted text.
///
/// `line` counts emitted line breaks (0-based); `start`/`end` are
/// inclusive-exclusive byte offsets into that line's text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRange {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub style: TextStyle,
}

/// Range renderer configuration: the console knobs minus everything
/// image-related.
#[derive(Debug, Clone)]
pub struct RangeOptions {
    pub width: usize,
    pub indent: usize,
    pub box_style: BoxStyle,
    pub diagnostic: Option<Arc<dyn Diagnostic>>,
}

impl Default for RangeOptions {
    fn default() -> Self {
        RangeOptions {
            width: 80,
            indent: 0,
            box_style: BoxStyle::default(),
            diagnostic: None,
        }
    }
}

/// Render a document as plain text into `output`, returning the styled
/// ranges over that text.
pub fn format_document<W: Write>(
    root: &Block,
    options: &RangeOptions,
    output: &mut W,
) -> io::Result<Vec<StyleRange>> {
    format_document_with_plugins(root, options, &Plugins::default(), output)
}

/// Like [`format_document`], with collaborator plugins (the highlight
/// provider styles code block bodies here too).
pub fn format_document_with_plugins<W: Write>(
    root: &Block,
    options: &RangeOptions,
    plugins: &Plugins,
    output: &mut W,
) -> io::Result<Vec<StyleRange>> {
    let cfg = TermConfig {
        width: options.width,
        indent: options.indent,
        box_style: options.box_style.clone(),
        highlighter: plugins.highlighter,
        diagnostic: options.diagnostic.as_deref(),
    };
    let rendered = term::render_tree(root, &cfg);

    let mut ranges = Vec::new();
    for (i, line) in rendered.lines.iter().enumerate() {
        let mut offset = 0;
        for span in &line.spans {
            let len = span.text.len();
            if !span.style.is_default() && len > 0 {
                ranges.push(StyleRange {
                    line: i,
                    start: offset,
                    end: offset + len,
                    style: span.style,
                });
            }
            output.write_all(span.text.as_bytes())?;
            offset += len;
        }
        output.write_all(b"\n")?;
    }
    Ok(ranges)
}
