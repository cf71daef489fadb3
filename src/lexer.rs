//! Source tokenization.
//!
//! The lexer splits source text into lines and each line into a flat run of
//! [`Token`]s annotated with line, column and byte offset. Block structure
//! and inline structure are both recognized later, over these tokens; the
//! lexer itself knows nothing about Markdown beyond which ASCII characters
//! can begin structure.

/// Kind of a single token.
///
/// Characters whose *run length* is meaningful (`#`, `*`, `_`, `~`, `` ` ``,
/// `-`) are lexed as one token per run; the run length is the text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok {
    /// Maximal run of characters with no structural meaning.
    Word,
    /// Maximal run of ASCII digits.
    Digits,
    /// Maximal run of spaces and tabs.
    Space,
    /// End of line.
    Break,
    /// Run of `#`.
    Hash,
    /// Run of `*`.
    Star,
    /// Run of `_`.
    Underscore,
    /// Run of `~`.
    Tilde,
    /// Run of `` ` ``.
    Backtick,
    /// Run of `-`.
    Dash,
    Plus,
    Gt,
    Lt,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Pipe,
    Bang,
    Period,
    Colon,
    Backslash,
}

/// A token, borrowing its text from the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub tok: Tok,
    pub text: &'s str,
    /// 0-based source line.
    pub line: usize,
    /// 0-based column, counted in code points.
    pub col: usize,
    /// Byte offset within the line.
    pub offset: usize,
}

impl<'s> Token<'s> {
    /// Run length in code points.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_space(&self) -> bool {
        matches!(self.tok, Tok::Space)
    }

    pub fn is_break(&self) -> bool {
        matches!(self.tok, Tok::Break)
    }
}

/// One source line: its text (line ending excluded) and its tokens.
///
/// The token list always ends with a single [`Tok::Break`].
#[derive(Debug, Clone)]
pub struct Line<'s> {
    pub text: &'s str,
    /// 0-based line number.
    pub number: usize,
    pub toks: Vec<Token<'s>>,
}

impl<'s> Line<'s> {
    /// True when the line holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.toks.iter().all(|t| t.is_space() || t.is_break())
    }
}

fn tok_for(b: u8) -> Option<Tok> {
    Some(match b {
        b'#' => Tok::Hash,
        b'*' => Tok::Star,
        b'_' => Tok::Underscore,
        b'~' => Tok::Tilde,
        b'`' => Tok::Backtick,
        b'-' => Tok::Dash,
        b'+' => Tok::Plus,
        b'>' => Tok::Gt,
        b'<' => Tok::Lt,
        b'[' => Tok::OpenBracket,
        b']' => Tok::CloseBracket,
        b'(' => Tok::OpenParen,
        b')' => Tok::CloseParen,
        b'{' => Tok::OpenBrace,
        b'}' => Tok::CloseBrace,
        b'|' => Tok::Pipe,
        b'!' => Tok::Bang,
        b'.' => Tok::Period,
        b':' => Tok::Colon,
        b'\\' => Tok::Backslash,
        _ => return None,
    })
}

fn is_run_tok(t: Tok) -> bool {
    matches!(
        t,
        Tok::Hash | Tok::Star | Tok::Underscore | Tok::Tilde | Tok::Backtick | Tok::Dash
    )
}

/// Tokenize one line of text (line ending already stripped).
fn lex_line<'s>(text: &'s str, number: usize) -> Line<'s> {
    let bytes = text.as_bytes();
    let mut toks = Vec::new();
    let mut offset = 0;
    let mut col = 0;

    while offset < bytes.len() {
        let start = offset;
        let start_col = col;
        let b = bytes[offset];

        let tok = if b == b' ' || b == b'\t' {
            while offset < bytes.len() && (bytes[offset] == b' ' || bytes[offset] == b'\t') {
                offset += 1;
                col += 1;
            }
            Tok::Space
        } else if b.is_ascii_digit() {
            while offset < bytes.len() && bytes[offset].is_ascii_digit() {
                offset += 1;
                col += 1;
            }
            Tok::Digits
        } else if let Some(t) = tok_for(b) {
            offset += 1;
            col += 1;
            if is_run_tok(t) {
                while offset < bytes.len() && bytes[offset] == b {
                    offset += 1;
                    col += 1;
                }
            }
            t
        } else {
            // A word runs until the next byte that means anything else.
            while offset < bytes.len() {
                let c = bytes[offset];
                if c == b' ' || c == b'\t' || c.is_ascii_digit() || tok_for(c).is_some() {
                    break;
                }
                // Skip the whole UTF-8 sequence; count one column per char.
                let ch_len = text[offset..].chars().next().map_or(1, char::len_utf8);
                offset += ch_len;
                col += 1;
            }
            Tok::Word
        };

        toks.push(Token {
            tok,
            text: &text[start..offset],
            line: number,
            col: start_col,
            offset: start,
        });
    }

    toks.push(Token {
        tok: Tok::Break,
        text: "\n",
        line: number,
        col,
        offset,
    });

    Line {
        text,
        number,
        toks,
    }
}

/// Tokenize a whole document into lines.
///
/// Handles `\n` and `\r\n` endings; a trailing newline does not produce an
/// extra empty line.
pub fn lex(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut rest = source;
    let mut number = 0;

    while !rest.is_empty() {
        let (line, tail) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        lines.push(lex_line(line, number));
        number += 1;
        rest = tail;
    }

    lines
}
