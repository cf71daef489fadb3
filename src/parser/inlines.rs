//! The inline pass.
//!
//! Runs over the raw tokens a leaf collected while open and produces its
//! inline sequence. Styles are resolved here: emphasis delimiters are
//! paired with a per-run stack and the flags they toggle are flattened onto
//! the text runs between them, so renderers never see delimiters.

use crate::lexer::{Tok, Token};
use crate::nodes::{
    ImageFormat, ImageKind, Inline, NodeImage, NodeLink, NodeText, TextStyle,
};

// Brackets inside brackets recurse; contrived nesting is cut off rather
// than recursed into.
const MAX_BRACKET_DEPTH: usize = 32;

/// Parse a leaf's raw tokens into inline content.
pub fn parse(toks: &[Token]) -> Vec<Inline> {
    Subject::new(toks, 0).run()
}

/// An intermediate event; emphasis is resolved over these before the final
/// inline list is emitted.
enum Event<'s> {
    Text(&'s str),
    /// Collapsible whitespace: space runs and soft line breaks.
    Space,
    Node(Inline),
    Delim {
        ch: u8,
        len: usize,
        can_open: bool,
        can_close: bool,
    },
}

/// Style flag counts applied at one event boundary.
#[derive(Default, Clone, Copy)]
struct Delta {
    bold: u32,
    italic: u32,
    strike: u32,
}

impl Delta {
    fn for_run(ch: u8, used: usize) -> Delta {
        if ch == b'~' {
            Delta {
                strike: 1,
                ..Delta::default()
            }
        } else {
            Delta {
                bold: (used / 2) as u32,
                italic: (used % 2) as u32,
                strike: 0,
            }
        }
    }

    fn add(&mut self, other: Delta) {
        self.bold += other.bold;
        self.italic += other.italic;
        self.strike += other.strike;
    }

    fn is_zero(&self) -> bool {
        self.bold == 0 && self.italic == 0 && self.strike == 0
    }
}

struct OpenDelim {
    event: usize,
    ch: u8,
    remaining: usize,
}

struct Subject<'s, 't> {
    toks: &'t [Token<'s>],
    pos: usize,
    depth: usize,
    events: Vec<Event<'s>>,
}

impl<'s, 't> Subject<'s, 't> {
    fn new(toks: &'t [Token<'s>], depth: usize) -> Self {
        Subject {
            toks,
            pos: 0,
            depth,
            events: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Inline> {
        while self.pos < self.toks.len() {
            self.step();
        }
        let (opens, closes, leftover) = self.resolve_emphasis();
        self.emit(opens, closes, leftover)
    }

    fn step(&mut self) {
        let t = &self.toks[self.pos];
        match t.tok {
            Tok::Space => {
                self.events.push(Event::Space);
                self.pos += 1;
            }
            Tok::Break => self.handle_break(),
            Tok::Backtick => self.handle_backticks(),
            Tok::Star | Tok::Underscore | Tok::Tilde => self.handle_delim(),
            Tok::Lt => self.handle_pointy_brace(),
            Tok::Bang => self.handle_bang(),
            Tok::OpenBracket => {
                if !self.handle_open_bracket() {
                    self.push_literal();
                }
            }
            _ => self.push_literal(),
        }
    }

    fn push_literal(&mut self) {
        self.events.push(Event::Text(self.toks[self.pos].text));
        self.pos += 1;
    }

    /// A newline folds to a space unless the previous token was a run of
    /// two or more spaces, which is a hard break. The final newline of the
    /// leaf is dropped entirely.
    fn handle_break(&mut self) {
        let last = self.pos + 1 >= self.toks.len();
        if last {
            self.pos += 1;
            return;
        }
        let hard = self.pos > 0 && {
            let prev = &self.toks[self.pos - 1];
            prev.is_space() && prev.len() >= 2
        };
        if hard {
            if matches!(self.events.last(), Some(Event::Space)) {
                self.events.pop();
            }
            self.events.push(Event::Node(Inline::LineBreak));
        } else {
            self.events.push(Event::Space);
        }
        self.pos += 1;
    }

    /// A code span: the closing backtick run must match the opener's
    /// length; the body is verbatim except that line breaks fold to
    /// spaces.
    fn handle_backticks(&mut self) {
        let open_len = self.toks[self.pos].len();
        let mut j = self.pos + 1;
        while j < self.toks.len() {
            if self.toks[j].tok == Tok::Backtick && self.toks[j].len() == open_len {
                break;
            }
            j += 1;
        }
        if j >= self.toks.len() {
            self.push_literal();
            return;
        }

        let mut body = String::new();
        for t in &self.toks[self.pos + 1..j] {
            if t.is_break() {
                body.push(' ');
            } else {
                body.push_str(t.text);
            }
        }
        // A symmetric padding space pair is not part of the span; it only
        // separates the body from the backticks.
        if body.starts_with(' ') && body.ends_with(' ') && !body.trim().is_empty() {
            body = body[1..body.len() - 1].to_string();
        }
        self.events.push(Event::Node(Inline::CodeSpan(body)));
        self.pos = j + 1;
    }

    fn handle_delim(&mut self) {
        let t = &self.toks[self.pos];
        let prev_ok = self.pos > 0 && {
            let p = &self.toks[self.pos - 1];
            !p.is_space() && !p.is_break()
        };
        let next_ok = self.pos + 1 < self.toks.len() && {
            let n = &self.toks[self.pos + 1];
            !n.is_space() && !n.is_break()
        };
        if !prev_ok && !next_ok {
            self.push_literal();
            return;
        }
        self.events.push(Event::Delim {
            ch: t.text.as_bytes()[0],
            len: t.len(),
            can_open: next_ok,
            can_close: prev_ok,
        });
        self.pos += 1;
    }

    /// `<scheme://...>` with no whitespace inside.
    fn handle_pointy_brace(&mut self) {
        let mut j = self.pos + 1;
        while j < self.toks.len() {
            match self.toks[j].tok {
                Tok::Gt => break,
                Tok::Space | Tok::Break => {
                    self.push_literal();
                    return;
                }
                _ => j += 1,
            }
        }
        if j >= self.toks.len() {
            self.push_literal();
            return;
        }

        let url: String = self.toks[self.pos + 1..j].iter().map(|t| t.text).collect();
        if !is_autolink_url(&url) {
            self.push_literal();
            return;
        }
        self.events.push(Event::Node(Inline::Autolink(url)));
        self.pos = j + 1;
    }

    fn handle_bang(&mut self) {
        if self.toks.get(self.pos + 1).map(|t| t.tok) != Some(Tok::OpenBracket) {
            self.push_literal();
            return;
        }
        let Some((label, url, next)) = self.scan_bracket(self.pos + 1) else {
            self.push_literal();
            return;
        };
        let alt = self.parse_label(label);
        let kind = if url.starts_with("http://") || url.starts_with("https://") {
            ImageKind::Web
        } else {
            ImageKind::Local
        };
        let format = ImageFormat::from_src(&url);
        self.events.push(Event::Node(Inline::Image(NodeImage {
            src: url,
            alt,
            kind,
            format,
        })));
        self.pos = next;
    }

    fn handle_open_bracket(&mut self) -> bool {
        let Some((label, url, next)) = self.scan_bracket(self.pos) else {
            return false;
        };
        let label = self.parse_label(label);
        self.events.push(Event::Node(Inline::Link(NodeLink {
            url,
            label,
        })));
        self.pos = next;
        true
    }

    /// `[label](url)` starting at `open`: the label brackets nest, the URL
    /// is verbatim up to its matching `)`. Returns the label tokens, the
    /// URL and the position after the closing paren.
    fn scan_bracket(&self, open: usize) -> Option<(&'t [Token<'s>], String, usize)> {
        if self.depth >= MAX_BRACKET_DEPTH {
            return None;
        }

        let mut depth = 1;
        let mut j = open + 1;
        while j < self.toks.len() {
            match self.toks[j].tok {
                Tok::OpenBracket => depth += 1,
                Tok::CloseBracket => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            j += 1;
        }
        if depth != 0 {
            return None;
        }

        if self.toks.get(j + 1).map(|t| t.tok) != Some(Tok::OpenParen) {
            return None;
        }

        let mut url = String::new();
        let mut parens = 1;
        let mut k = j + 2;
        while k < self.toks.len() {
            match self.toks[k].tok {
                Tok::OpenParen => parens += 1,
                Tok::CloseParen => {
                    parens -= 1;
                    if parens == 0 {
                        break;
                    }
                }
                Tok::Break => return None,
                _ => {}
            }
            url.push_str(self.toks[k].text);
            k += 1;
        }
        if parens != 0 {
            return None;
        }

        Some((&self.toks[open + 1..j], url.trim().to_string(), k + 1))
    }

    /// Inline-parse a link label or image alt and flatten the result into
    /// styled text runs.
    fn parse_label(&self, toks: &'t [Token<'s>]) -> Vec<NodeText> {
        let inlines = Subject::new(toks, self.depth + 1).run();
        let mut runs = Vec::new();
        flatten_runs(&inlines, &mut runs);
        runs
    }

    /// Pair emphasis delimiters with a per-run stack. A closing run takes
    /// as much as it can from the nearest open run of the same character;
    /// mixed lengths split into smaller emphases. Returns per-event open
    /// and close deltas and leftover literal lengths.
    fn resolve_emphasis(&self) -> (Vec<Delta>, Vec<Delta>, Vec<usize>) {
        let n = self.events.len();
        let mut opens = vec![Delta::default(); n];
        let mut closes = vec![Delta::default(); n];
        let mut leftover = vec![0usize; n];
        let mut stack: Vec<OpenDelim> = Vec::new();

        for idx in 0..n {
            let Event::Delim {
                ch,
                len,
                can_open,
                can_close,
            } = &self.events[idx]
            else {
                continue;
            };
            let (ch, len, can_open, can_close) = (*ch, *len, *can_open, *can_close);

            let mut remaining = len;
            if can_close {
                while remaining > 0 {
                    let Some(at) = stack.iter().rposition(|d| d.ch == ch) else {
                        break;
                    };
                    let used = stack[at].remaining.min(remaining);
                    let delta = Delta::for_run(ch, used);
                    opens[stack[at].event].add(delta);
                    closes[idx].add(delta);
                    stack[at].remaining -= used;
                    remaining -= used;
                    if stack[at].remaining == 0 {
                        stack.remove(at);
                    }
                }
            }
            if remaining > 0 {
                if can_open {
                    stack.push(OpenDelim {
                        event: idx,
                        ch,
                        remaining,
                    });
                } else {
                    leftover[idx] = remaining;
                }
            }
        }

        // Unpaired openers fall back to literal text.
        for d in stack {
            leftover[d.event] += d.remaining;
        }

        (opens, closes, leftover)
    }

    /// Final pass: walk the events with running style counts and build the
    /// inline list, collapsing whitespace and merging adjacent runs.
    fn emit(&self, opens: Vec<Delta>, closes: Vec<Delta>, leftover: Vec<usize>) -> Vec<Inline> {
        let mut out: Vec<Inline> = Vec::new();
        let mut buf = String::new();
        let mut buf_style = TextStyle::default();
        let mut active = Delta::default();
        let mut pending_space = false;

        fn style_of(active: &Delta) -> TextStyle {
            TextStyle {
                bold: active.bold > 0,
                italic: active.italic > 0,
                strike: active.strike > 0,
                ..TextStyle::default()
            }
        }

        fn flush(out: &mut Vec<Inline>, buf: &mut String, style: TextStyle) {
            if !buf.is_empty() {
                out.push(Inline::Text(NodeText::new(std::mem::take(buf), style)));
            }
        }

        // A separating space sticks to the run before it when one is still
        // buffered; otherwise it opens the following run.
        fn attach_pending(buf: &mut String, pending_space: &mut bool) {
            if *pending_space && !buf.is_empty() {
                buf.push(' ');
                *pending_space = false;
            }
        }

        let push_text =
            |out: &mut Vec<Inline>,
             buf: &mut String,
             buf_style: &mut TextStyle,
             pending_space: &mut bool,
             active: &Delta,
             s: &str| {
                attach_pending(buf, pending_space);
                let style = style_of(active);
                if !buf.is_empty() && *buf_style != style {
                    flush(out, buf, *buf_style);
                }
                if buf.is_empty() {
                    *buf_style = style;
                    if *pending_space && !out.is_empty() {
                        buf.push(' ');
                    }
                    *pending_space = false;
                }
                buf.push_str(s);
            };

        for (idx, ev) in self.events.iter().enumerate() {
            match ev {
                Event::Text(s) => {
                    push_text(
                        &mut out,
                        &mut buf,
                        &mut buf_style,
                        &mut pending_space,
                        &active,
                        *s,
                    );
                }
                Event::Space => {
                    if !buf.is_empty() || !out.is_empty() {
                        pending_space = true;
                    }
                }
                Event::Node(inl) => {
                    if pending_space {
                        push_text(
                            &mut out,
                            &mut buf,
                            &mut buf_style,
                            &mut pending_space,
                            &active,
                            "",
                        );
                    }
                    flush(&mut out, &mut buf, buf_style);
                    out.push(overlay_style(inl.clone(), style_of(&active)));
                }
                Event::Delim { ch, .. } => {
                    if !closes[idx].is_zero() {
                        flush(&mut out, &mut buf, buf_style);
                        active.bold -= closes[idx].bold;
                        active.italic -= closes[idx].italic;
                        active.strike -= closes[idx].strike;
                    }
                    if !opens[idx].is_zero() {
                        attach_pending(&mut buf, &mut pending_space);
                    }
                    if leftover[idx] > 0 {
                        let lit: String = (0..leftover[idx]).map(|_| *ch as char).collect();
                        push_text(
                            &mut out,
                            &mut buf,
                            &mut buf_style,
                            &mut pending_space,
                            &active,
                            &lit,
                        );
                    }
                    if !opens[idx].is_zero() {
                        flush(&mut out, &mut buf, buf_style);
                        active.add(opens[idx]);
                    }
                }
            }
        }

        flush(&mut out, &mut buf, buf_style);

        // A leaf never starts or ends with a bare line break.
        while matches!(out.last(), Some(Inline::LineBreak)) {
            out.pop();
        }
        out
    }
}

/// Apply the styles active around a link or image onto its label runs.
fn overlay_style(inl: Inline, style: TextStyle) -> Inline {
    if style.is_default() {
        return inl;
    }
    let overlay = |runs: &mut Vec<NodeText>| {
        for run in runs {
            run.style.bold |= style.bold;
            run.style.italic |= style.italic;
            run.style.strike |= style.strike;
        }
    };
    match inl {
        Inline::Link(mut nl) => {
            overlay(&mut nl.label);
            Inline::Link(nl)
        }
        Inline::Image(mut ni) => {
            overlay(&mut ni.alt);
            Inline::Image(ni)
        }
        other => other,
    }
}

/// Flatten arbitrary inlines into plain styled runs, for link labels and
/// image alt text.
fn flatten_runs(inlines: &[Inline], out: &mut Vec<NodeText>) {
    for inl in inlines {
        match inl {
            Inline::Text(t) => out.push(t.clone()),
            Inline::CodeSpan(s) => out.push(NodeText::new(s.clone(), TextStyle::default())),
            Inline::Autolink(u) => out.push(NodeText::new(u.clone(), TextStyle::default())),
            Inline::Link(nl) => out.extend(nl.label.iter().cloned()),
            Inline::Image(ni) => out.extend(ni.alt.iter().cloned()),
            Inline::LineBreak => out.push(NodeText::new(" ", TextStyle::default())),
        }
    }
}

fn is_autolink_url(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-')
        }
        None => false,
    }
}
