//! Syntect-backed highlight provider.
//!
//! Bridges syntect's RGB output onto the crate's 16-name semantic palette
//! by nearest-color quantization, so the same provider drives the console,
//! range and HTML renderers.

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::adapters::{AdapterError, HighlightAdapter, HighlightSpan};
use crate::nodes::{Color, TextStyle};

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntect syntax highlighter plugin.
///
/// `SyntaxSet` and `ThemeSet` are expensive to construct; build one
/// adapter and reuse it for every render.
pub struct SyntectAdapter {
    theme: String,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectAdapter {
    /// Construct an adapter using the named syntect theme.
    pub fn new(theme: &str) -> Self {
        SyntectAdapter {
            theme: theme.to_string(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }
}

impl Default for SyntectAdapter {
    fn default() -> Self {
        SyntectAdapter::new(DEFAULT_THEME)
    }
}

impl HighlightAdapter for SyntectAdapter {
    fn highlight(
        &self,
        lang: Option<&str>,
        source: &str,
    ) -> Result<Vec<HighlightSpan>, AdapterError> {
        let syntax = match lang {
            Some(l) if !l.is_empty() => self
                .syntax_set
                .find_syntax_by_token(l)
                .or_else(|| self.syntax_set.find_syntax_by_first_line(source))
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text()),
            _ => self.syntax_set.find_syntax_plain_text(),
        };
        let theme = self
            .theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.get(DEFAULT_THEME))
            .ok_or_else(|| AdapterError(format!("theme not found: {}", self.theme)))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut out = Vec::new();

        for line in LinesWithEndings::from(source) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| AdapterError(e.to_string()))?;

            let trimmed: Vec<(SyntectStyle, &str)> = ranges
                .into_iter()
                .map(|(style, text)| (style, text.trim_end_matches(['\r', '\n'])))
                .filter(|(_, text)| !text.is_empty())
                .collect();

            if trimmed.is_empty() {
                out.push(HighlightSpan {
                    style: TextStyle::default(),
                    text: String::new(),
                    newline: true,
                });
                continue;
            }
            let last = trimmed.len() - 1;
            for (i, (style, text)) in trimmed.into_iter().enumerate() {
                out.push(HighlightSpan {
                    style: quantize(style),
                    text: text.to_string(),
                    newline: i == last,
                });
            }
        }

        Ok(out)
    }
}

fn quantize(style: SyntectStyle) -> TextStyle {
    TextStyle {
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
        underline: style.font_style.contains(FontStyle::UNDERLINE),
        strike: false,
        fg: Some(nearest_color(
            style.foreground.r,
            style.foreground.g,
            style.foreground.b,
        )),
        bg: None,
    }
}

/// Reference values for the 16-color palette (standard xterm).
const PALETTE: [(Color, (u8, u8, u8)); 16] = [
    (Color::Black, (0, 0, 0)),
    (Color::Red, (205, 0, 0)),
    (Color::Green, (0, 205, 0)),
    (Color::Yellow, (205, 205, 0)),
    (Color::Blue, (0, 0, 238)),
    (Color::Magenta, (205, 0, 205)),
    (Color::Cyan, (0, 205, 205)),
    (Color::White, (229, 229, 229)),
    (Color::BrightBlack, (127, 127, 127)),
    (Color::BrightRed, (255, 0, 0)),
    (Color::BrightGreen, (0, 255, 0)),
    (Color::BrightYellow, (255, 255, 0)),
    (Color::BrightBlue, (92, 92, 255)),
    (Color::BrightMagenta, (255, 0, 255)),
    (Color::BrightCyan, (0, 255, 255)),
    (Color::BrightWhite, (255, 255, 255)),
];

fn nearest_color(r: u8, g: u8, b: u8) -> Color {
    let mut best = Color::White;
    let mut best_d = u32::MAX;
    for (color, (pr, pg, pb)) in PALETTE {
        let d = dist(r, pr) + dist(g, pg) + dist(b, pb);
        if d < best_d {
            best_d = d;
            best = color;
        }
    }
    best
}

fn dist(a: u8, b: u8) -> u32 {
    let d = a as i32 - b as i32;
    (d * d) as u32
}
