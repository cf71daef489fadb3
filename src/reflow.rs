//! The shared reflow engine.
//!
//! Both terminal renderers build their output through this engine: it
//! word-wraps styled text at a column limit, re-emits a stack of leaders at
//! the start of every line, and treats pre-measured span groups (links,
//! code spans, table cells) as atomic words. Columns are counted in
//! Unicode code points throughout; byte offsets only appear when the range
//! renderer serializes the finished lines.

use smallvec::SmallVec;

use crate::nodes::TextStyle;
use crate::strings::cp_width;

/// A styled fragment of one output line. `link` carries the OSC-8 target
/// for the console serializer; the range serializer ignores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: TextStyle,
    pub link: Option<String>,
}

impl Span {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Span {
        Span {
            text: text.into(),
            style,
            link: None,
        }
    }

    pub fn linked(text: impl Into<String>, style: TextStyle, url: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            style,
            link: Some(url.into()),
        }
    }

    pub fn width(&self) -> usize {
        cp_width(&self.text)
    }
}

/// One finished output line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedLine {
    pub spans: Vec<Span>,
}

impl RenderedLine {
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A per-line prefix: emitted, in stack order, at the start of every line
/// opened while it is pushed.
#[derive(Debug, Clone)]
pub struct Leader {
    pub text: String,
    pub style: TextStyle,
}

impl Leader {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Leader {
        Leader {
            text: text.into(),
            style,
        }
    }

    /// A plain indent of `n` spaces.
    pub fn indent(n: usize) -> Leader {
        Leader::new(" ".repeat(n), TextStyle::default())
    }
}

/// The reflow state machine.
pub struct Reflow {
    width: usize,
    lines: Vec<RenderedLine>,
    cur: RenderedLine,
    col: usize,
    style: TextStyle,
    leaders: SmallVec<[Leader; 8]>,
    /// A separating space is owed before the next word.
    pending_space: bool,
    /// The current line already carries its leaders.
    line_started: bool,
}

impl Reflow {
    pub fn new(width: usize) -> Reflow {
        Reflow {
            width: width.max(4),
            lines: Vec::new(),
            cur: RenderedLine::default(),
            col: 0,
            style: TextStyle::default(),
            leaders: SmallVec::new(),
            pending_space: false,
            line_started: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns of leader prefix currently in force.
    pub fn leader_width(&self) -> usize {
        self.leaders.iter().map(|l| cp_width(&l.text)).sum()
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn push_leader(&mut self, leader: Leader) {
        self.leaders.push(leader);
    }

    pub fn pop_leader(&mut self) {
        self.leaders.pop();
    }

    /// Index of the line currently under construction.
    pub fn line_index(&self) -> usize {
        self.lines.len()
    }

    fn start_line(&mut self) {
        if self.line_started {
            return;
        }
        self.line_started = true;
        for leader in self.leaders.iter() {
            if !leader.text.is_empty() {
                self.cur.spans.push(Span::new(leader.text.clone(), leader.style));
                self.col += cp_width(&leader.text);
            }
        }
    }

    /// Finish the current line (trailing whitespace stripped) and begin a
    /// fresh one.
    pub fn break_line(&mut self) {
        self.start_line();
        self.pending_space = false;
        strip_trailing_spaces(&mut self.cur);
        self.lines.push(std::mem::take(&mut self.cur));
        self.col = 0;
        self.line_started = false;
    }

    /// An empty line (leaders only) between blocks.
    pub fn blank_line(&mut self) {
        if self.line_started || self.col > 0 {
            self.break_line();
        }
        self.break_line();
    }

    /// Queue a separating space before whatever comes next.
    pub fn space(&mut self) {
        if self.col > 0 || self.line_started {
            self.pending_space = true;
        }
    }

    fn push_span(&mut self, span: Span) {
        let w = span.width();
        if w == 0 {
            return;
        }
        // Merge with the previous span when nothing distinguishes them.
        if let Some(last) = self.cur.spans.last_mut() {
            if last.style == span.style && last.link == span.link {
                last.text.push_str(&span.text);
                self.col += w;
                return;
            }
        }
        self.cur.spans.push(span);
        self.col += w;
    }

    fn flush_pending_space(&mut self) {
        if self.pending_space {
            self.pending_space = false;
            self.push_span(Span::new(" ", self.style));
        }
    }

    /// Write one word in the current style, wrapping first when it would
    /// not fit. Words wider than a whole line are hard-split so no line
    /// ever exceeds the limit.
    pub fn word(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.start_line();

        let style = self.style;
        let sep = if self.pending_space { 1 } else { 0 };
        let w = cp_width(word);

        if self.col + sep + w > self.width && self.col > self.leader_width() {
            self.break_line();
            self.start_line();
        }
        self.flush_pending_space();

        if self.col + w <= self.width {
            self.push_span(Span::new(word, style));
            return;
        }

        // Hard-split an overlong word across lines.
        let mut rest: &str = word;
        while !rest.is_empty() {
            let room = self.width.saturating_sub(self.col).max(1);
            let take: String = rest.chars().take(room).collect();
            let taken = take.len();
            self.push_span(Span::new(take, style));
            rest = &rest[taken..];
            if !rest.is_empty() {
                self.break_line();
                self.start_line();
            }
        }
    }

    /// Write prose: split on ASCII spaces, wrap at word boundaries, and
    /// turn embedded newlines into explicit breaks.
    pub fn text(&mut self, text: &str) {
        for (i, seg) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            if seg.starts_with(' ') {
                self.space();
            }
            let mut first = true;
            for word in seg.split(' ') {
                if word.is_empty() {
                    continue;
                }
                if !first {
                    self.space();
                }
                self.word(word);
                first = false;
            }
            if seg.ends_with(' ') {
                self.space();
            }
        }
    }

    /// Write a pre-measured group of spans as one unbreakable word. A
    /// group too wide for a whole line degrades to hard-split output so
    /// the width invariant still holds.
    pub fn atom(&mut self, spans: &[Span]) {
        let w: usize = spans.iter().map(Span::width).sum();
        if w == 0 {
            return;
        }
        self.start_line();

        let sep = if self.pending_space { 1 } else { 0 };
        if self.col + sep + w > self.width && self.col > self.leader_width() {
            self.break_line();
            self.start_line();
        }
        self.flush_pending_space();

        if self.col + w <= self.width {
            for span in spans {
                self.push_span(span.clone());
            }
            return;
        }
        for span in spans {
            self.hard_split(span);
        }
    }

    /// Write verbatim text (code): no word wrap; embedded newlines break,
    /// and overlong lines hard-split at the limit so the width invariant
    /// still holds.
    pub fn verbatim(&mut self, text: &str) {
        for (i, seg) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            self.start_line();
            let style = self.style;
            self.hard_split(&Span::new(seg, style));
        }
    }

    fn hard_split(&mut self, span: &Span) {
        let mut rest: &str = &span.text;
        while !rest.is_empty() {
            let room = self.width.saturating_sub(self.col).max(1);
            let take: String = rest.chars().take(room).collect();
            let taken = take.len();
            self.push_span(Span {
                text: take,
                style: span.style,
                link: span.link.clone(),
            });
            rest = &rest[taken..];
            if !rest.is_empty() {
                self.break_line();
                self.start_line();
            }
        }
    }

    /// Pad with spaces up to `target` columns.
    pub fn pad_to(&mut self, target: usize) {
        self.start_line();
        if self.col < target {
            let run = " ".repeat(target - self.col);
            let style = TextStyle::default();
            self.push_span(Span {
                text: run,
                style,
                link: None,
            });
        }
    }

    /// Append pre-formed spans to the current line without any wrapping.
    pub fn append_raw(&mut self, spans: Vec<Span>) {
        self.start_line();
        for span in spans {
            self.push_span(span);
        }
    }

    pub fn current_col(&self) -> usize {
        self.col
    }

    /// Finish and return all lines. A line under construction is emitted
    /// only if it carries visible content.
    pub fn finish(mut self) -> Vec<RenderedLine> {
        if self.cur.spans.iter().any(|s| !s.text.trim().is_empty()) {
            self.break_line();
        }
        // Trailing blank lines carry no information.
        while self
            .lines
            .last()
            .map_or(false, |l| l.plain().trim().is_empty())
        {
            self.lines.pop();
        }
        self.lines
    }
}

fn strip_trailing_spaces(line: &mut RenderedLine) {
    while let Some(last) = line.spans.last_mut() {
        let trimmed = last.text.trim_end_matches(' ').len();
        if trimmed == last.text.len() {
            break;
        }
        last.text.truncate(trimmed);
        if last.text.is_empty() {
            line.spans.pop();
        } else {
            break;
        }
    }
}
