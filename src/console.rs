//! The console renderer: ANSI-styled UTF-8.
//!
//! Serializes the shared terminal rendering ([`crate::term`]) to an output
//! sink. Style changes are diffed against the current style so only
//! transitions are written; links become OSC-8 hyperlinks; images go
//! through the injected [`crate::adapters::ImageSender`].

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::TermSize;
use crate::nodes::{Block, Color, ImageFormat, ImageKind, TextStyle};
use crate::parser::Diagnostic;
use crate::plugins::Plugins;
use crate::term::{self, BoxStyle, PlacedImage, TermConfig};

/// Console renderer configuration.
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Total output width in columns.
    pub width: usize,
    /// Left margin, emitted as a space leader.
    pub indent: usize,
    /// Cap on inline image width, in cells.
    pub max_image_cols: usize,
    /// Cap on inline image height, in cells.
    pub max_image_rows: usize,
    pub box_style: BoxStyle,
    /// Base directory for resolving relative image paths.
    pub root_dir: PathBuf,
    /// Disable fetching of remote images.
    pub nofetch: bool,
    /// Terminal dimensions, from a probe or the embedder.
    pub termsize: TermSize,
    /// Emit ANSI escapes. With `false` the layout is identical but the
    /// stream is plain text.
    pub colors: bool,
    pub diagnostic: Option<Arc<dyn Diagnostic>>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        ConsoleOptions {
            width: 80,
            indent: 0,
            max_image_cols: 80,
            max_image_rows: 24,
            box_style: BoxStyle::default(),
            root_dir: PathBuf::from("."),
            nofetch: false,
            termsize: TermSize::default(),
            colors: true,
            diagnostic: None,
        }
    }
}

impl ConsoleOptions {
    fn warn(&self, msg: &str) {
        if let Some(d) = &self.diagnostic {
            d.emit(msg);
        }
    }
}

/// Render a document to ANSI text.
pub fn format_document<W: Write>(
    root: &Block,
    options: &ConsoleOptions,
    output: &mut W,
) -> io::Result<()> {
    format_document_with_plugins(root, options, &Plugins::default(), output)
}

/// Render a document to ANSI text with collaborator plugins.
pub fn format_document_with_plugins<W: Write>(
    root: &Block,
    options: &ConsoleOptions,
    plugins: &Plugins,
    output: &mut W,
) -> io::Result<()> {
    let cfg = TermConfig {
        width: options.width,
        indent: options.indent,
        box_style: options.box_style.clone(),
        highlighter: plugins.highlighter,
        diagnostic: options.diagnostic.as_deref(),
    };
    let rendered = term::render_tree(root, &cfg);

    let mut images = rendered.images.iter().peekable();
    for (i, line) in rendered.lines.iter().enumerate() {
        let mut cur = TextStyle::default();
        for span in &line.spans {
            if options.colors {
                if span.style != cur {
                    write_transition(output, &span.style)?;
                    cur = span.style;
                }
                if let Some(url) = &span.link {
                    write!(output, "\x1b]8;;{}\x1b\\", url)?;
                }
            }
            output.write_all(span.text.as_bytes())?;
            if options.colors && span.link.is_some() {
                write!(output, "\x1b]8;;\x1b\\")?;
            }
        }
        if options.colors && cur != TextStyle::default() {
            output.write_all(b"\x1b[0m")?;
        }
        output.write_all(b"\n")?;

        while images.peek().map_or(false, |img| img.after_line <= i) {
            let img = images.next().unwrap();
            emit_image(output, img, options, plugins);
        }
    }
    // Images anchored past the last line (trailing blanks were trimmed).
    for img in images {
        emit_image(output, img, options, plugins);
    }
    Ok(())
}

/// Write the SGR transition into `style`. A reset clears the previous
/// state first so styles never accumulate across spans.
fn write_transition<W: Write>(output: &mut W, style: &TextStyle) -> io::Result<()> {
    output.write_all(b"\x1b[0m")?;
    if style.is_default() {
        return Ok(());
    }
    let mut codes: Vec<u8> = Vec::new();
    if style.bold {
        codes.push(1);
    }
    if style.italic {
        codes.push(3);
    }
    if style.underline {
        codes.push(4);
    }
    if style.strike {
        codes.push(9);
    }
    if let Some(fg) = style.fg {
        codes.push(color_code(fg, false));
    }
    if let Some(bg) = style.bg {
        codes.push(color_code(bg, true));
    }
    let joined = codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";");
    write!(output, "\x1b[{}m", joined)
}

fn color_code(color: Color, bg: bool) -> u8 {
    let base = match color {
        Color::Black => 30,
        Color::Red => 31,
        Color::Green => 32,
        Color::Yellow => 33,
        Color::Blue => 34,
        Color::Magenta => 35,
        Color::Cyan => 36,
        Color::White => 37,
        Color::BrightBlack => 90,
        Color::BrightRed => 91,
        Color::BrightGreen => 92,
        Color::BrightYellow => 93,
        Color::BrightBlue => 94,
        Color::BrightMagenta => 95,
        Color::BrightCyan => 96,
        Color::BrightWhite => 97,
    };
    base + if bg { 10 } else { 0 }
}

/// Draw one image through the image sender, best-effort. Every failure
/// degrades to the already-emitted `alt → src` text.
fn emit_image<W: Write>(
    output: &mut W,
    img: &PlacedImage,
    options: &ConsoleOptions,
    plugins: &Plugins,
) {
    let Some(sender) = plugins.image_sender else {
        return;
    };
    if img.kind == ImageKind::Web && options.nofetch {
        options.warn(&format!("remote image skipped (nofetch): {}", img.src));
        return;
    }

    let bytes = match img.kind {
        ImageKind::Local => match std::fs::read(options.root_dir.join(&img.src)) {
            Ok(b) => b,
            Err(e) => {
                options.warn(&format!("image unreadable: {}: {}", img.src, e));
                return;
            }
        },
        ImageKind::Web => {
            let Some(fetcher) = plugins.fetcher else {
                options.warn(&format!("no fetcher for remote image: {}", img.src));
                return;
            };
            match fetcher.fetch(&img.src) {
                Ok(b) => b,
                Err(e) => {
                    options.warn(&format!("image fetch failed: {}: {}", img.src, e));
                    return;
                }
            }
        }
    };

    if img.format != ImageFormat::Png {
        options.warn(&format!(
            "image format not drawable without a decoder: {}",
            img.src
        ));
        return;
    }

    let mut cols = options
        .max_image_cols
        .min(options.width.saturating_sub(options.indent));
    if options.termsize.cols > 0 {
        cols = cols.min(options.termsize.cols);
    }
    let rows = options.max_image_rows.max(1);
    sender.send_png(output, &bytes, cols.max(1), rows);
}
