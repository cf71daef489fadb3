//! Prefix classification over token slices.
//!
//! Every function here inspects the tokens remaining on a line (after any
//! container prefixes have been consumed) and reports what structure, if
//! any, begins there. None of them mutate anything; the parser decides what
//! to do with a match.

use crate::lexer::{Tok, Token};
use crate::nodes::ListKind;
use crate::strings;

/// An ATX heading opener: 1-6 `#` followed by a space (or an empty
/// heading). Returns the level and the number of tokens consumed, the
/// separating space included.
pub fn atx_heading(toks: &[Token]) -> Option<(u8, usize)> {
    let first = toks.first()?;
    if first.tok != Tok::Hash || first.len() > 6 {
        return None;
    }
    match toks.get(1) {
        Some(t) if t.is_space() => Some((first.len() as u8, 2)),
        Some(t) if t.is_break() => Some((first.len() as u8, 1)),
        _ => None,
    }
}

/// A code fence opener: a run of three or more backticks or tildes.
/// Returns the fence text and the number of tokens consumed (just the run;
/// the info string is read separately).
pub fn open_code_fence<'s>(toks: &[Token<'s>]) -> Option<(&'s str, usize)> {
    let first = toks.first()?;
    if !matches!(first.tok, Tok::Backtick | Tok::Tilde) || first.len() < 3 {
        return None;
    }
    Some((first.text, 1))
}

/// Whether the remaining tokens close a fence opened with `opener`: a run
/// of the same character, at least as long, then nothing but whitespace.
pub fn close_code_fence(toks: &[Token], opener: &str) -> bool {
    let Some(first) = toks.first() else {
        return false;
    };
    let fence_char = opener.as_bytes()[0];
    if first.text.as_bytes().first() != Some(&fence_char) || first.len() < opener.chars().count() {
        return false;
    }
    if !matches!(first.tok, Tok::Backtick | Tok::Tilde) {
        return false;
    }
    toks[1..].iter().all(|t| t.is_space() || t.is_break())
}

/// Parse a fence info string into `(tag, directive)`.
///
/// `{label}` (and nothing else) is a directive; any other non-blank text is
/// a free-form tag.
pub fn fence_info(rest: &str) -> (Option<String>, Option<String>) {
    let rest = strings::trim_slice(rest);
    if rest.is_empty() {
        return (None, None);
    }
    if let Some(inner) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        let inner = strings::trim_slice(inner);
        if !inner.is_empty() {
            return (None, Some(inner.to_string()));
        }
    }
    (Some(rest.to_string()), None)
}

/// A recognized list item marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ListKind,
    /// Bullet character for unordered and task lists; `0` for ordered.
    pub bullet_char: u8,
    /// First ordinal for ordered lists; `0` otherwise.
    pub start: usize,
    /// Checkbox state for task items.
    pub checked: bool,
    /// Tokens consumed by the marker, trailing space included.
    pub consumed: usize,
}

/// A list item marker: `-`/`+`/`*` plus space, `N.`/`N)` plus space, or a
/// bullet followed by `[ ]`/`[x]` for a task item.
pub fn list_marker(toks: &[Token]) -> Option<ListMarker> {
    let first = toks.first()?;

    let bullet = match first.tok {
        Tok::Dash | Tok::Star if first.len() == 1 => Some(first.text.as_bytes()[0]),
        Tok::Plus => Some(b'+'),
        _ => None,
    };

    if let Some(bullet_char) = bullet {
        if !toks.get(1)?.is_space() {
            return None;
        }
        if let Some((checked, extra)) = task_box(&toks[2..]) {
            return Some(ListMarker {
                kind: ListKind::Task,
                bullet_char,
                start: 0,
                checked,
                consumed: 2 + extra,
            });
        }
        return Some(ListMarker {
            kind: ListKind::Unordered,
            bullet_char,
            start: 0,
            checked: false,
            consumed: 2,
        });
    }

    if first.tok == Tok::Digits && first.text.len() <= 9 {
        let delim = toks.get(1)?;
        if !matches!(delim.tok, Tok::Period | Tok::CloseParen) {
            return None;
        }
        if !toks.get(2)?.is_space() {
            return None;
        }
        let start = first.text.parse().ok()?;
        return Some(ListMarker {
            kind: ListKind::Ordered,
            bullet_char: 0,
            start,
            checked: false,
            consumed: 3,
        });
    }

    None
}

/// `[ ]`, `[x]` or `[X]` immediately after a bullet, followed by a space.
/// Returns the checkbox state and tokens consumed.
fn task_box(toks: &[Token]) -> Option<(bool, usize)> {
    if toks.first()?.tok != Tok::OpenBracket {
        return None;
    }
    let inner = toks.get(1)?;
    let checked = match inner.tok {
        Tok::Space if inner.text == " " => false,
        Tok::Word if inner.text.eq_ignore_ascii_case("x") => true,
        _ => return None,
    };
    if toks.get(2)?.tok != Tok::CloseBracket {
        return None;
    }
    if !toks.get(3)?.is_space() {
        return None;
    }
    Some((checked, 4))
}

/// A table delimiter row (`| --- | :--- |`): returns the column count.
///
/// Each cell is a dash run, optionally wrapped in `:` on either side.
pub fn table_delimiter_row(toks: &[Token]) -> Option<usize> {
    let mut i = 0;
    skip_space(toks, &mut i);

    if toks.get(i)?.tok != Tok::Pipe {
        return None;
    }

    let mut ncol = 0;
    loop {
        i += 1; // past the pipe
        skip_space(toks, &mut i);
        match toks.get(i).map(|t| t.tok) {
            Some(Tok::Break) | None => break,
            _ => {}
        }

        if toks.get(i).map(|t| t.tok) == Some(Tok::Colon) {
            i += 1;
        }
        match toks.get(i) {
            Some(t) if t.tok == Tok::Dash => i += 1,
            _ => return None,
        }
        if toks.get(i).map(|t| t.tok) == Some(Tok::Colon) {
            i += 1;
        }
        skip_space(toks, &mut i);
        if toks.get(i).map(|t| t.tok) != Some(Tok::Pipe) {
            return None;
        }
        ncol += 1;
    }

    if ncol == 0 {
        None
    } else {
        Some(ncol)
    }
}

/// Whether the line looks like a table row at all: starts with an
/// (optionally indented) pipe.
pub fn table_row_start(toks: &[Token]) -> bool {
    let mut i = 0;
    skip_space(toks, &mut i);
    toks.get(i).map(|t| t.tok) == Some(Tok::Pipe)
}

/// An alert tag: `[!LABEL]` alone on the line. Returns the label,
/// case preserved.
pub fn alert_tag(toks: &[Token]) -> Option<String> {
    let mut i = 0;
    skip_space(toks, &mut i);

    if toks.get(i)?.tok != Tok::OpenBracket {
        return None;
    }
    if toks.get(i + 1)?.tok != Tok::Bang {
        return None;
    }
    let label = toks.get(i + 2)?;
    if label.tok != Tok::Word {
        return None;
    }
    if toks.get(i + 3)?.tok != Tok::CloseBracket {
        return None;
    }
    let mut j = i + 4;
    skip_space(toks, &mut j);
    if !toks.get(j)?.is_break() {
        return None;
    }
    Some(label.text.to_string())
}

fn skip_space(toks: &[Token], i: &mut usize) {
    while toks.get(*i).map_or(false, |t| t.is_space()) {
        *i += 1;
    }
}
