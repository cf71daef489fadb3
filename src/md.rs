//! The format renderer: normalized Markdown.
//!
//! Reparsing the output yields a tree equal to the input modulo whitespace
//! normalization and marker canonicalization: bullets become `-`, emphasis
//! nests strike over italic over bold, tables are padded to their widest
//! cell, and paragraphs re-wrap at the configured width. Wrapping happens
//! at word boundaries only, never inside links, images or code spans.

use std::io::{self, Write};

use crate::nodes::{Block, BlockValue, Inline, ListKind, NodeCode, NodeText};
use crate::strings::cp_width;

/// Format renderer configuration.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Wrap column for paragraph text.
    pub width: usize,
    /// Left margin, in spaces.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            width: 80,
            indent: 0,
        }
    }
}

/// Render a document as normalized Markdown.
pub fn format_document<W: Write>(
    root: &Block,
    options: &FormatOptions,
    output: &mut W,
) -> io::Result<()> {
    let mut f = MdFormatter::new(options.width);
    if options.indent > 0 {
        f.prefix.push_str(&" ".repeat(options.indent));
    }
    f.format_children(&root.children);
    output.write_all(f.finish().as_bytes())
}

/// Emphasis marker per nesting level, outermost first.
const MARKS: [&str; 3] = ["~", "_", "**"];

struct MdFormatter {
    v: String,
    prefix: String,
    width: usize,
    column: usize,
    /// Byte offset of the last breakable space on the current line.
    last_breakable: usize,
    /// Byte offset where the current line's content starts.
    line_start: usize,
    at_line_start: bool,
    need_cr: u8,
    /// Trailing whitespace on the current line is load-bearing (hard
    /// breaks, verbatim code).
    keep_trailing: bool,
    /// Inside a tight list item blank separators collapse to one newline.
    in_tight_item: bool,
}

impl MdFormatter {
    fn new(width: usize) -> Self {
        MdFormatter {
            v: String::new(),
            prefix: String::new(),
            width,
            column: 0,
            last_breakable: 0,
            line_start: 0,
            at_line_start: true,
            need_cr: 0,
            keep_trailing: false,
            in_tight_item: false,
        }
    }

    fn cr(&mut self) {
        self.need_cr = self.need_cr.max(1);
    }

    fn blankline(&mut self) {
        self.need_cr = self.need_cr.max(2);
    }

    fn end_line(&mut self) {
        if !self.keep_trailing {
            while self.v.ends_with(' ') || self.v.ends_with('\t') {
                self.v.pop();
            }
        }
        self.keep_trailing = false;
        self.v.push('\n');
        self.at_line_start = true;
        self.column = 0;
        self.last_breakable = 0;
        self.line_start = self.v.len();
    }

    fn flush_cr(&mut self) {
        if self.in_tight_item {
            self.need_cr = self.need_cr.min(1);
        }
        if self.need_cr == 0 {
            return;
        }
        if !self.at_line_start {
            self.end_line();
        }
        if self.need_cr > 1 {
            // The separating blank line still carries the prefix, minus
            // its own trailing whitespace.
            let p = self.prefix.trim_end().to_string();
            self.v.push_str(&p);
            self.end_line();
        }
        self.need_cr = 0;
    }

    fn begin_content(&mut self) {
        self.flush_cr();
        if self.at_line_start {
            self.v.push_str(&self.prefix.clone());
            self.column = cp_width(&self.prefix);
            self.line_start = self.v.len() - self.prefix.len();
            self.at_line_start = false;
            self.last_breakable = 0;
        }
    }

    /// Append text, wrapping at recorded spaces when `wrap` and the line
    /// overflows.
    fn out(&mut self, s: &str, wrap: bool) {
        if s.is_empty() {
            return;
        }
        self.begin_content();

        for ch in s.chars() {
            if ch == ' ' && wrap {
                self.last_breakable = self.v.len();
            }
            self.v.push(ch);
            self.column += 1;

            // Unbreakable content still moves whole to the next line when
            // the line overflows past an earlier breakable space.
            if self.column > self.width && self.last_breakable > self.line_start {
                let remainder = self.v[self.last_breakable + 1..].to_string();
                self.v.truncate(self.last_breakable);
                self.v.push('\n');
                self.line_start = self.v.len();
                self.v.push_str(&self.prefix.clone());
                self.v.push_str(&remainder);
                self.column = cp_width(&self.prefix) + cp_width(&remainder);
                self.last_breakable = 0;
            }
        }
    }

    fn finish(mut self) -> String {
        self.need_cr = self.need_cr.min(1);
        self.flush_cr();
        if !self.at_line_start {
            self.end_line();
        }
        // Exactly one trailing newline.
        while self.v.ends_with("\n\n") {
            self.v.pop();
        }
        if !self.v.is_empty() && !self.v.ends_with('\n') {
            self.v.push('\n');
        }
        self.v
    }

    fn format_children(&mut self, children: &[Block]) {
        for block in children {
            self.format_block(block);
        }
    }

    fn format_block(&mut self, block: &Block) {
        match &block.value {
            BlockValue::Paragraph => {
                self.format_inlines(&block.inlines, true);
                self.blankline();
            }
            BlockValue::Heading(nh) => {
                self.out(&"#".repeat(nh.level as usize), false);
                self.out(" ", false);
                self.format_inlines(&block.inlines, false);
                self.blankline();
            }
            BlockValue::Quote => {
                self.flush_cr();
                let saved = self.prefix.len();
                self.prefix.push_str("> ");
                self.format_children(&block.children);
                self.prefix.truncate(saved);
                self.blankline();
            }
            BlockValue::List(nl) => self.format_list(block, nl.kind, nl.start, nl.spacing == 0),
            BlockValue::Code(nc) => self.format_code(nc),
            BlockValue::Alert(na) => {
                self.flush_cr();
                let saved = self.prefix.len();
                self.prefix.push_str("> ");
                self.out(&format!("[!{}]", na.label), false);
                self.cr();
                self.format_inlines(&block.inlines, true);
                self.prefix.truncate(saved);
                self.blankline();
            }
            BlockValue::Table(nt) => self.format_table(block, nt.ncol),
            BlockValue::Break => {}
            BlockValue::Document | BlockValue::Item(..) => unreachable!(),
        }
    }

    fn format_list(&mut self, block: &Block, kind: ListKind, start: usize, tight: bool) {
        let items: Vec<&Block> = block
            .children
            .iter()
            .filter(|c| matches!(c.value, BlockValue::Item(..)))
            .collect();

        for (i, item) in items.iter().enumerate() {
            let checked = match item.value {
                BlockValue::Item(ni) => ni.checked,
                _ => false,
            };
            let marker = match kind {
                ListKind::Unordered => "- ".to_string(),
                ListKind::Ordered => format!("{}. ", start + i),
                ListKind::Task => {
                    if checked {
                        "- [x] ".to_string()
                    } else {
                        "- [ ] ".to_string()
                    }
                }
            };

            self.out(&marker, false);
            let saved = self.prefix.len();
            self.prefix.push_str(&" ".repeat(cp_width(&marker)));
            let prev_tight = self.in_tight_item;
            self.in_tight_item = tight;
            if item
                .children
                .iter()
                .all(|c| matches!(c.value, BlockValue::Break))
            {
                self.cr();
            } else {
                self.format_children(&item.children);
            }
            self.in_tight_item = prev_tight;
            self.prefix.truncate(saved);

            if tight {
                self.need_cr = self.need_cr.min(1);
            } else {
                self.blankline();
            }
        }
        self.blankline();
    }

    fn format_code(&mut self, nc: &NodeCode) {
        let mut opener_line = nc.opener.clone();
        if let Some(directive) = &nc.directive {
            opener_line.push('{');
            opener_line.push_str(directive);
            opener_line.push('}');
        } else if let Some(tag) = &nc.tag {
            opener_line.push_str(tag);
        }
        self.out(&opener_line, false);
        self.cr();

        for line in nc.text.lines() {
            self.begin_content();
            self.keep_trailing = true;
            self.out(line, false);
            self.cr();
        }

        self.out(&nc.opener, false);
        self.blankline();
    }

    fn format_table(&mut self, block: &Block, ncol: usize) {
        if ncol == 0 {
            return;
        }
        let cells: Vec<String> = block
            .children
            .iter()
            .map(|c| inline_string(&c.inlines).replace('|', "\\|"))
            .collect();

        let mut widths = vec![3usize; ncol];
        for (i, cell) in cells.iter().enumerate() {
            let col = i % ncol;
            widths[col] = widths[col].max(cp_width(cell));
        }

        for (row_i, row) in cells.chunks(ncol).enumerate() {
            let mut line = String::from("|");
            for (col, cell) in row.iter().enumerate() {
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(widths[col] - cp_width(cell)));
                line.push_str(" |");
            }
            self.out(&line, false);
            self.cr();

            if row_i == 0 {
                let mut delim = String::from("|");
                for w in &widths {
                    delim.push(' ');
                    delim.push_str(&"-".repeat(*w));
                    delim.push_str(" |");
                }
                self.out(&delim, false);
                self.cr();
            }
        }
        self.blankline();
    }

    /// Emit inline content with minimal emphasis transitions. Styles nest
    /// strike over italic over bold, so a fully-styled run comes out as
    /// `~_**text**_~`.
    fn format_inlines(&mut self, inlines: &[Inline], wrap: bool) {
        let mut active = [false; 3];
        let mut pending_ws = String::new();

        for inl in inlines {
            match inl {
                Inline::Text(run) => {
                    let target = levels(run);
                    let text = run.text.as_str();
                    let core = text.trim_matches(' ');
                    if core.is_empty() {
                        pending_ws.push_str(text);
                        continue;
                    }
                    let lead = &text[..text.len() - text.trim_start_matches(' ').len()];
                    let trail = &text[text.trim_end_matches(' ').len()..];

                    if target != active {
                        let d = (0..3).find(|&l| active[l] != target[l]).unwrap();
                        self.close_levels(&mut active, d);
                        pending_ws.push_str(lead);
                        self.out(&std::mem::take(&mut pending_ws), wrap);
                        self.open_levels(&mut active, &target, d);
                    } else {
                        pending_ws.push_str(lead);
                        self.out(&std::mem::take(&mut pending_ws), wrap);
                    }
                    self.out(core, wrap);
                    pending_ws = trail.to_string();
                }
                Inline::LineBreak => {
                    self.close_levels(&mut active, 0);
                    pending_ws.clear();
                    self.keep_trailing = true;
                    self.out("  ", false);
                    self.cr();
                }
                node => {
                    self.close_levels(&mut active, 0);
                    self.out(&std::mem::take(&mut pending_ws), wrap);
                    self.out(&atom_string(node), false);
                }
            }
        }
        self.close_levels(&mut active, 0);
    }

    fn close_levels(&mut self, active: &mut [bool; 3], from: usize) {
        for level in (from..3).rev() {
            if active[level] {
                self.out(MARKS[level], false);
                active[level] = false;
            }
        }
    }

    fn open_levels(&mut self, active: &mut [bool; 3], target: &[bool; 3], from: usize) {
        for level in from..3 {
            if target[level] {
                self.out(MARKS[level], false);
                active[level] = true;
            }
        }
    }
}

fn levels(run: &NodeText) -> [bool; 3] {
    [run.style.strike, run.style.italic, run.style.bold]
}

/// Render one non-text inline as its atomic source form.
fn atom_string(inl: &Inline) -> String {
    match inl {
        Inline::CodeSpan(body) => {
            let fence = "`".repeat(unused_backtick_run(body));
            if body.starts_with('`') || body.ends_with('`') {
                format!("{} {} {}", fence, body, fence)
            } else {
                format!("{}{}{}", fence, body, fence)
            }
        }
        Inline::Link(nl) => format!("[{}]({})", runs_string(&nl.label), nl.url),
        Inline::Autolink(url) => format!("<{}>", url),
        Inline::Image(ni) => format!("![{}]({})", runs_string(&ni.alt), ni.src),
        Inline::Text(..) | Inline::LineBreak => unreachable!(),
    }
}

/// Shortest backtick run length not present in `body`.
fn unused_backtick_run(body: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for ch in body.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let mut n = 1;
    while n <= longest && contains_run(body, n) {
        n += 1;
    }
    n
}

fn contains_run(body: &str, n: usize) -> bool {
    let mut run = 0;
    for ch in body.chars() {
        if ch == '`' {
            run += 1;
        } else {
            if run == n {
                return true;
            }
            run = 0;
        }
    }
    run == n
}

/// Styled runs as inline Markdown, markers included, without wrapping.
fn runs_string(runs: &[NodeText]) -> String {
    let mut f = MdFormatter::new(usize::MAX);
    let inlines: Vec<Inline> = runs.iter().map(|r| Inline::Text(r.clone())).collect();
    f.format_inlines(&inlines, false);
    f.v
}

/// A cell's inline content as a single unwrapped line.
fn inline_string(inlines: &[Inline]) -> String {
    let mut f = MdFormatter::new(usize::MAX);
    f.format_inlines(inlines, false);
    f.v
}
