//! Adapter traits for collaborators injected by the embedder.
//!
//! The core never talks to a highlighting engine, the filesystem/network or
//! the terminal directly; it goes through these capability objects. Test
//! suites substitute mocks, and every trait has a no-op implementation so
//! the renderers work with no collaborator at all.

use std::error::Error;
use std::fmt;
use std::io::Write;

use crate::nodes::{Color, TextStyle};

/// One highlighted fragment of a code block body.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpan {
    pub style: TextStyle,
    pub text: String,
    /// Set on the final fragment of each source line.
    pub newline: bool,
}

/// A collaborator failure. Renderers degrade instead of propagating these.
#[derive(Debug)]
pub struct AdapterError(pub String);

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for AdapterError {}

/// Syntax highlighting for fenced code blocks.
pub trait HighlightAdapter {
    /// Highlight `source` as `lang`. Multi-line tokens must be split so
    /// that every fragment carrying `newline` really ends a line.
    fn highlight(&self, lang: Option<&str>, source: &str)
        -> Result<Vec<HighlightSpan>, AdapterError>;
}

/// Draws images into a terminal. Best-effort: implementations report
/// problems to their own diagnostics and never fail the render.
pub trait ImageSender {
    /// Send PNG bytes, scaled to at most the given cell box.
    fn send_png(&self, sink: &mut dyn Write, bytes: &[u8], width_cells: usize, height_cells: usize);

    /// Send pre-decoded RGB pixels.
    fn send_rgb(&self, sink: &mut dyn Write, image: &RgbImage, width_cells: usize, height_cells: usize);
}

/// A decoded image, 8-bit RGB, row-major.
#[derive(Debug, Clone)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Fetches remote image bytes.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AdapterError>;
}

/// Terminal dimensions, in cells and pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: usize,
    pub rows: usize,
    pub width_px: usize,
    pub height_px: usize,
}

impl Default for TermSize {
    fn default() -> Self {
        TermSize {
            cols: 80,
            rows: 24,
            width_px: 0,
            height_px: 0,
        }
    }
}

/// Queries the terminal size, falling back to sensible defaults.
pub trait TermSizeProbe {
    fn probe(&self) -> TermSize;
}

/// Highlighting disabled: every block renders in one muted style.
#[derive(Debug, Default)]
pub struct NoHighlight;

impl HighlightAdapter for NoHighlight {
    fn highlight(
        &self,
        _lang: Option<&str>,
        _source: &str,
    ) -> Result<Vec<HighlightSpan>, AdapterError> {
        Err(AdapterError("highlighting disabled".into()))
    }
}

/// Image drawing disabled.
#[derive(Debug, Default)]
pub struct NoImages;

impl ImageSender for NoImages {
    fn send_png(&self, _: &mut dyn Write, _: &[u8], _: usize, _: usize) {}
    fn send_rgb(&self, _: &mut dyn Write, _: &RgbImage, _: usize, _: usize) {}
}

/// Remote fetches disabled.
#[derive(Debug, Default)]
pub struct NoFetch;

impl Fetcher for NoFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AdapterError> {
        Err(AdapterError(format!("fetch disabled: {}", url)))
    }
}

/// A probe that always reports the defaults.
#[derive(Debug, Default)]
pub struct DefaultTermSize;

impl TermSizeProbe for DefaultTermSize {
    fn probe(&self) -> TermSize {
        TermSize::default()
    }
}

/// The single muted style used when highlighting fails.
pub fn muted_style() -> TextStyle {
    TextStyle::fg(Color::BrightBlack)
}
