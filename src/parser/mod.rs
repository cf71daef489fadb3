//! The block parser.
//!
//! A line-oriented loop drives an explicit stack of open blocks. For each
//! source line the parser first walks the stack from the root down, letting
//! every open container consume its continuation prefix (`> ` for quotes,
//! the content indent for list items); the first block that fails to match
//! is closed together with everything deeper. Whatever structure then opens
//! at the remaining prefix is pushed, and the residual tokens are handed to
//! the innermost open leaf.
//!
//! Inline content is not interpreted here at all: leaves collect raw tokens
//! while open and the inline pass runs once, when the leaf is closed.

pub mod alert;
pub(crate) mod inlines;
mod table;

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::lexer::{self, Line, Tok, Token};
use crate::nodes::{
    Block, BlockValue, ListKind, NodeAlert, NodeCode, NodeHeading, NodeItem, NodeList, NodeTable,
};
use crate::scanners::{self, ListMarker};
use crate::strings;

// Deeply nested lists come almost exclusively from contrived input, and
// renderers recurse over the tree.
const MAX_LIST_DEPTH: usize = 100;

/// Receives one-line diagnostics (parse warnings, collaborator failures).
///
/// Configured by the embedder; when absent, diagnostics are dropped.
pub trait Diagnostic: Send + Sync {
    /// Consume a single diagnostic line, without its newline.
    fn emit(&self, line: &str);
}

impl<F> Diagnostic for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

impl Debug for dyn Diagnostic {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        formatter.write_str("<dyn Diagnostic>")
    }
}

/// Parse-time options.
#[derive(Default, Clone, Debug)]
pub struct ParseOptions {
    /// Sink for parse warnings (unclosed fence at end of input, mismatched
    /// table delimiter row). `None` drops them.
    pub diagnostic: Option<Arc<dyn Diagnostic>>,
}

impl ParseOptions {
    fn warn(&self, line: usize, msg: &str) {
        if let Some(d) = &self.diagnostic {
            d.emit(&format!("line {}: {}", line + 1, msg));
        }
    }
}

/// Parse a Markdown document into a tree rooted at
/// [`BlockValue::Document`].
///
/// Never fails: unrecognized constructs parse as paragraph text.
pub fn parse(source: &str) -> Block {
    parse_with_options(source, &ParseOptions::default())
}

/// Like [`parse`], with explicit [`ParseOptions`].
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Block {
    let lines = lexer::lex(source);
    let mut parser = Parser::new(options);
    for line in &lines {
        parser.process_line(line);
    }
    parser.finish()
}

/// One entry of the open-block stack. The entry below an open block is
/// always its parent-to-be; closing an entry pops it and appends its block
/// to the entry underneath.
struct OpenBlock<'s> {
    block: Block,
    /// Raw tokens of an open leaf, pending the inline pass.
    raw: Vec<Token<'s>>,
    /// For lists: column of the first item's marker.
    marker_col: usize,
    /// For lists and items: column where item content begins.
    content_col: usize,
    /// For lists: a blank line has been seen since the last item opened.
    pending_blank: bool,
}

impl<'s> OpenBlock<'s> {
    fn new(block: Block) -> OpenBlock<'s> {
        OpenBlock {
            block,
            raw: Vec::new(),
            marker_col: 0,
            content_col: 0,
            pending_blank: false,
        }
    }
}

/// Cursor over one line's tokens. Space runs can be consumed one column at
/// a time, which is how container prefixes eat exact indents.
struct LineCursor<'t, 's> {
    line: &'t Line<'s>,
    pos: usize,
    space_used: usize,
}

impl<'t, 's> LineCursor<'t, 's> {
    fn new(line: &'t Line<'s>) -> Self {
        LineCursor {
            line,
            pos: 0,
            space_used: 0,
        }
    }

    fn peek(&self) -> &'t Token<'s> {
        // The lexer guarantees a trailing Break, so a line is never empty.
        &self.line.toks[self.pos.min(self.line.toks.len() - 1)]
    }

    fn at_line_end(&self) -> bool {
        self.peek().is_break()
    }

    fn bump(&mut self) {
        if !self.at_line_end() {
            self.pos += 1;
            self.space_used = 0;
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn consume_rest(&mut self) {
        while !self.at_line_end() {
            self.bump();
        }
    }

    /// Current column, partial space consumption included.
    fn col(&self) -> usize {
        self.peek().col + self.space_used
    }

    /// Byte offset of the cursor within the line text. Space runs are one
    /// byte per column, so partial consumption stays byte-accurate.
    fn byte(&self) -> usize {
        self.peek().offset + self.space_used
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_space() {
            self.bump();
        }
    }

    /// Consume one column of whitespace if one is next.
    fn eat_space_col(&mut self) {
        if self.peek().is_space() {
            self.space_used += 1;
            if self.space_used >= self.peek().len() {
                self.bump();
            }
        }
    }

    /// Consume whitespace columns until `target` is reached or the next
    /// token is not a space.
    fn consume_space_to_col(&mut self, target: usize) {
        while self.col() < target && self.peek().is_space() {
            self.eat_space_col();
        }
    }

    /// Column of the first non-space token at or after the cursor.
    fn first_nonspace_col(&self) -> usize {
        let mut i = self.pos;
        while self.line.toks[i].is_space() {
            i += 1;
        }
        self.line.toks[i].col
    }

    /// Remaining tokens, the trailing Break included.
    fn rest(&self) -> &'t [Token<'s>] {
        &self.line.toks[self.pos.min(self.line.toks.len() - 1)..]
    }

    /// Remaining tokens with leading whitespace skipped.
    fn rest_nonspace(&self) -> &'t [Token<'s>] {
        let mut i = self.pos;
        while self.line.toks[i].is_space() {
            i += 1;
        }
        &self.line.toks[i..]
    }

    /// True when nothing but whitespace remains on the line.
    fn rest_blank(&self) -> bool {
        self.rest_nonspace()[0].is_break()
    }

    /// Remaining line text, verbatim.
    fn rest_text(&self) -> &'s str {
        if self.at_line_end() {
            ""
        } else {
            &self.line.text[self.byte()..]
        }
    }
}

/// `>` plus at most one following space column. Restores the cursor when
/// there is no marker.
fn quote_prefix(cursor: &mut LineCursor<'_, '_>) -> bool {
    let save = (cursor.pos, cursor.space_used);
    cursor.skip_spaces();
    if cursor.peek().tok != Tok::Gt {
        cursor.pos = save.0;
        cursor.space_used = save.1;
        return false;
    }
    cursor.bump();
    cursor.eat_space_col();
    true
}

enum Continuation {
    Match,
    Fail,
    /// The line belonged to a fenced code block and is fully consumed.
    LineConsumed,
    /// The line closed a fenced code block.
    FenceClosed,
}

pub(crate) struct Parser<'s, 'o> {
    stack: Vec<OpenBlock<'s>>,
    options: &'o ParseOptions,
    line_number: usize,
}

impl<'s, 'o> Parser<'s, 'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Parser {
            stack: vec![OpenBlock::new(Block::new(BlockValue::Document, 0))],
            options,
            line_number: 0,
        }
    }

    fn process_line(&mut self, line: &Line<'s>) {
        self.line_number = line.number;
        let mut cursor = LineCursor::new(line);

        if self.check_open_blocks(&mut cursor) {
            return;
        }

        if cursor.rest_blank() {
            // Nothing remains once prefixes are consumed: a block boundary.
            self.add_break_leaf();
            self.note_blank_line();
            return;
        }

        self.open_new_blocks(&mut cursor);
        self.add_text_to_leaf(&mut cursor);
    }

    fn top(&self) -> &OpenBlock<'s> {
        self.stack.last().unwrap()
    }

    fn top_mut(&mut self) -> &mut OpenBlock<'s> {
        self.stack.last_mut().unwrap()
    }

    fn in_code_block(&self) -> bool {
        matches!(self.top().block.value, BlockValue::Code(..))
    }

    /// Phase 1: walk the open stack from the root down, consuming
    /// continuation prefixes. Returns true when the line was consumed
    /// entirely (fenced code body or closing fence).
    fn check_open_blocks(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        let mut i = 1;
        while i < self.stack.len() {
            let outcome = self.continue_block(cursor, i);
            match outcome {
                Continuation::Match => i += 1,
                Continuation::Fail => {
                    self.close_from(i);
                    return false;
                }
                Continuation::FenceClosed => {
                    self.close_from(i);
                    return true;
                }
                Continuation::LineConsumed => {
                    self.append_code_line(cursor, i);
                    return true;
                }
            }
        }
        false
    }

    fn continue_block(&self, cursor: &mut LineCursor<'_, 's>, i: usize) -> Continuation {
        let entry = &self.stack[i];
        match &entry.block.value {
            BlockValue::Quote => {
                if quote_prefix(cursor) {
                    Continuation::Match
                } else {
                    Continuation::Fail
                }
            }
            BlockValue::Alert(..) => {
                if quote_prefix(cursor) && !cursor.rest_blank() {
                    Continuation::Match
                } else {
                    Continuation::Fail
                }
            }
            BlockValue::List(..) => self.continue_list(cursor, i),
            BlockValue::Item(..) => self.continue_item(cursor, i),
            BlockValue::Table(..) => {
                if !cursor.rest_blank() && scanners::table_row_start(cursor.rest()) {
                    Continuation::Match
                } else {
                    Continuation::Fail
                }
            }
            BlockValue::Paragraph => {
                if cursor.rest_blank() {
                    Continuation::Fail
                } else {
                    Continuation::Match
                }
            }
            BlockValue::Heading(..) => Continuation::Fail,
            BlockValue::Code(nc) => {
                let fence_col = entry.block.start_col;
                if cursor.first_nonspace_col() <= fence_col + 3
                    && scanners::close_code_fence(cursor.rest_nonspace(), &nc.opener)
                {
                    Continuation::FenceClosed
                } else {
                    Continuation::LineConsumed
                }
            }
            BlockValue::Document | BlockValue::Break => unreachable!(),
        }
    }

    /// Lists defer to their items except on marker lines, where the marker
    /// column decides between sibling, nested and closing.
    fn continue_list(&self, cursor: &mut LineCursor<'_, 's>, i: usize) -> Continuation {
        if cursor.rest_blank() {
            return Continuation::Match;
        }
        let Some(marker) = scanners::list_marker(cursor.rest_nonspace()) else {
            return Continuation::Match;
        };
        let col = cursor.first_nonspace_col();
        let entry = &self.stack[i];
        if col < entry.marker_col {
            return Continuation::Fail;
        }
        if col < entry.content_col && !marker_compatible(&marker, &entry.block.value) {
            // A sibling-positioned marker of a different kind starts a new
            // list in the parent instead.
            return Continuation::Fail;
        }
        Continuation::Match
    }

    fn continue_item(&self, cursor: &mut LineCursor<'_, 's>, i: usize) -> Continuation {
        if cursor.rest_blank() {
            return Continuation::Match;
        }
        let col = cursor.first_nonspace_col();
        if scanners::list_marker(cursor.rest_nonspace()).is_some() {
            // Markers nest once they reach the content column of the
            // enclosing list's first item; shallower ones close us.
            if col >= self.stack[i - 1].content_col {
                cursor.skip_spaces();
                return Continuation::Match;
            }
            return Continuation::Fail;
        }
        if col >= self.stack[i].content_col {
            cursor.consume_space_to_col(self.stack[i].content_col);
            return Continuation::Match;
        }
        Continuation::Fail
    }

    /// Verbatim body line of the fenced code block at stack depth `i`,
    /// stripped of indentation up to the fence column.
    fn append_code_line(&mut self, cursor: &mut LineCursor<'_, 's>, i: usize) {
        let fence_col = self.stack[i].block.start_col;
        cursor.consume_space_to_col(fence_col);
        let text = cursor.rest_text();
        if let BlockValue::Code(nc) = &mut self.stack[i].block.value {
            nc.text.push_str(text);
            nc.text.push('\n');
        }
    }

    /// Phase 2: open whatever new structure begins at the cursor.
    fn open_new_blocks(&mut self, cursor: &mut LineCursor<'_, 's>) {
        loop {
            if cursor.rest_blank() {
                break;
            }

            let opened = self.handle_alert(cursor)
                || self.handle_blockquote(cursor)
                || self.handle_atx_heading(cursor)
                || self.handle_code_fence(cursor)
                || self.handle_table(cursor)
                || self.handle_list_item(cursor);

            if !opened {
                break;
            }

            if self.top().block.value.accepts_lines()
                || matches!(self.top().block.value, BlockValue::Table(..))
            {
                break;
            }
        }
    }

    /// `[!LABEL]` as the first content of the outermost quote promotes the
    /// quote to an alert leaf.
    fn handle_alert(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        if !matches!(self.top().block.value, BlockValue::Quote)
            || !self.top().block.children.is_empty()
        {
            return false;
        }
        let quotes = self
            .stack
            .iter()
            .filter(|e| matches!(e.block.value, BlockValue::Quote))
            .count();
        if quotes != 1 {
            return false;
        }
        let Some(label) = scanners::alert_tag(cursor.rest()) else {
            return false;
        };

        let start_col = self.top().block.start_col;
        self.top_mut().block = Block::new(BlockValue::Alert(NodeAlert { label }), start_col);
        // The tag line contributes nothing to the body.
        cursor.consume_rest();
        true
    }

    fn handle_blockquote(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        if cursor.rest_nonspace()[0].tok != Tok::Gt {
            return false;
        }
        let start_col = cursor.first_nonspace_col();
        quote_prefix(cursor);
        self.add_child(Block::new(BlockValue::Quote, start_col));
        true
    }

    fn handle_atx_heading(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        let Some((level, consumed)) = scanners::atx_heading(cursor.rest_nonspace()) else {
            return false;
        };
        let start_col = cursor.first_nonspace_col();
        cursor.skip_spaces();
        cursor.bump_n(consumed);
        self.add_child(Block::new(
            BlockValue::Heading(NodeHeading {
                level,
                text: String::new(),
            }),
            start_col,
        ));
        true
    }

    fn handle_code_fence(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        let Some((fence, consumed)) = scanners::open_code_fence(cursor.rest_nonspace()) else {
            return false;
        };
        let start_col = cursor.first_nonspace_col();
        cursor.skip_spaces();
        cursor.bump_n(consumed);

        let (tag, directive) = scanners::fence_info(cursor.rest_text());
        self.add_child(Block::new(
            BlockValue::Code(NodeCode {
                opener: fence.to_string(),
                tag,
                directive,
                text: String::new(),
            }),
            start_col,
        ));
        // The rest of the line is the info string; the body starts on the
        // next line.
        cursor.consume_rest();
        true
    }

    /// Either convert a one-line paragraph into a table (on its delimiter
    /// row) or append a row to the open table.
    fn handle_table(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        if let BlockValue::Table(nt) = self.top().block.value {
            if !scanners::table_row_start(cursor.rest()) {
                return false;
            }
            let cells = table::split_row(cursor.rest_nonspace());
            table::append_row(&mut self.top_mut().block, nt.ncol, cells);
            cursor.consume_rest();
            return true;
        }

        let Some(ncol) = scanners::table_delimiter_row(cursor.rest_nonspace()) else {
            return false;
        };
        if !matches!(self.top().block.value, BlockValue::Paragraph) {
            return false;
        }
        // The header must be exactly the one line collected so far.
        if self.top().raw.iter().filter(|t| t.is_break()).count() != 1 {
            return false;
        }

        let header = table::split_row(&self.top().raw);
        if header.len() != ncol {
            self.options.warn(
                self.line_number,
                &format!(
                    "table delimiter row has {} columns but the header has {}",
                    ncol,
                    header.len()
                ),
            );
            return false;
        }

        let para = self.stack.pop().unwrap();
        let mut block = Block::new(BlockValue::Table(NodeTable { ncol }), para.block.start_col);
        table::append_row(&mut block, ncol, header);
        self.stack.push(OpenBlock::new(block));
        cursor.consume_rest();
        true
    }

    fn handle_list_item(&mut self, cursor: &mut LineCursor<'_, 's>) -> bool {
        let Some(marker) = scanners::list_marker(cursor.rest_nonspace()) else {
            return false;
        };
        let depth = self
            .stack
            .iter()
            .filter(|e| matches!(e.block.value, BlockValue::List(..)))
            .count();
        if depth >= MAX_LIST_DEPTH {
            return false;
        }

        let marker_col = cursor.first_nonspace_col();
        cursor.skip_spaces();
        cursor.bump_n(marker.consumed);
        cursor.skip_spaces();
        let content_col = if cursor.at_line_end() {
            marker_col + 2
        } else {
            cursor.col()
        };

        // A marker interrupts any open leaf.
        while !self.top().block.container() {
            self.finalize_top();
        }

        let sibling = marker_compatible(&marker, &self.top().block.value)
            && marker_col < self.top().content_col;
        if sibling {
            let list = self.top_mut();
            if list.pending_blank {
                if let BlockValue::List(nl) = &mut list.block.value {
                    nl.spacing = 1;
                }
                list.pending_blank = false;
            }
        } else {
            while !self
                .top()
                .block
                .value
                .can_contain(&BlockValue::List(NodeList::default()))
            {
                self.finalize_top();
            }
            let nl = NodeList {
                kind: marker.kind,
                start: if marker.kind == ListKind::Ordered {
                    marker.start
                } else {
                    1
                },
                spacing: 0,
                bullet_char: marker.bullet_char,
            };
            let mut list = OpenBlock::new(Block::new(BlockValue::List(nl), marker_col));
            list.marker_col = marker_col;
            list.content_col = content_col;
            self.stack.push(list);
        }

        let mut item = OpenBlock::new(Block::new(
            BlockValue::Item(NodeItem {
                checked: marker.checked,
            }),
            marker_col,
        ));
        item.content_col = content_col;
        self.stack.push(item);
        true
    }

    /// Phase 3: hand the residual tokens to the innermost leaf, opening a
    /// paragraph when nothing else claimed the line.
    fn add_text_to_leaf(&mut self, cursor: &mut LineCursor<'_, 's>) {
        match self.top().block.value {
            BlockValue::Code(..) | BlockValue::Table(..) => return,
            BlockValue::Paragraph | BlockValue::Heading(..) | BlockValue::Alert(..) => {}
            _ => {
                if cursor.rest_blank() {
                    return;
                }
                let start_col = cursor.first_nonspace_col();
                while !self.top().block.container()
                    || !self.top().block.value.can_contain(&BlockValue::Paragraph)
                {
                    self.finalize_top();
                }
                self.stack
                    .push(OpenBlock::new(Block::new(BlockValue::Paragraph, start_col)));
            }
        }

        let toks = cursor.rest_nonspace();
        self.top_mut().raw.extend_from_slice(toks);
    }

    /// Materialize a blank-line boundary in the deepest open container that
    /// may hold one.
    fn add_break_leaf(&mut self) {
        let top = self.top_mut();
        if !top.block.value.can_contain(&BlockValue::Break) || top.block.children.is_empty() {
            return;
        }
        if matches!(
            top.block.children.last().map(|b| &b.value),
            Some(BlockValue::Break)
        ) {
            return;
        }
        let col = top.block.start_col;
        let mut b = Block::new(BlockValue::Break, col);
        b.open = false;
        top.block.children.push(b);
    }

    fn note_blank_line(&mut self) {
        for entry in &mut self.stack {
            if matches!(entry.block.value, BlockValue::List(..)) {
                entry.pending_blank = true;
            }
        }
    }

    /// Close open blocks until one can adopt `block`, then push it as the
    /// new innermost open block.
    fn add_child(&mut self, block: Block) {
        while !self.top().block.container() || !self.top().block.value.can_contain(&block.value) {
            self.finalize_top();
        }
        self.stack.push(OpenBlock::new(block));
    }

    /// Close every open block at stack depth `idx` and deeper.
    fn close_from(&mut self, idx: usize) {
        while self.stack.len() > idx {
            self.finalize_top();
        }
    }

    /// Close the innermost open block: run the inline pass on leaves, then
    /// attach the block to its parent.
    fn finalize_top(&mut self) {
        let mut entry = self.stack.pop().expect("document root never closes early");
        debug_assert!(!self.stack.is_empty());

        match &mut entry.block.value {
            BlockValue::Paragraph | BlockValue::Alert(..) => {
                entry.block.inlines = inlines::parse(&entry.raw);
            }
            BlockValue::Heading(nh) => {
                let raw = chop_heading_raw(&entry.raw);
                nh.text = flat_text(raw);
                entry.block.inlines = inlines::parse(raw);
            }
            _ => {}
        }

        entry.block.open = false;
        self.stack
            .last_mut()
            .unwrap()
            .block
            .children
            .push(entry.block);
    }

    fn finish(mut self) -> Block {
        if self.in_code_block() {
            self.options
                .warn(self.line_number, "code fence not closed before end of input");
        }
        while self.stack.len() > 1 {
            self.finalize_top();
        }
        let mut root = self.stack.pop().unwrap().block;
        root.open = false;
        root
    }
}

fn marker_compatible(marker: &ListMarker, list: &BlockValue) -> bool {
    match list {
        BlockValue::List(nl) => {
            marker.kind == nl.kind
                && (marker.kind == ListKind::Ordered || marker.bullet_char == nl.bullet_char)
        }
        _ => false,
    }
}

/// Strip a trailing `##` closer (and its separating space) from heading
/// tokens.
fn chop_heading_raw<'t, 's>(raw: &'t [Token<'s>]) -> &'t [Token<'s>] {
    let mut end = raw.len();
    while end > 0 && (raw[end - 1].is_break() || raw[end - 1].is_space()) {
        end -= 1;
    }
    if end > 0 && raw[end - 1].tok == Tok::Hash {
        if end == 1 {
            return &raw[..0];
        }
        if raw[end - 2].is_space() {
            let mut cut = end - 2;
            while cut > 0 && raw[cut - 1].is_space() {
                cut -= 1;
            }
            return &raw[..cut];
        }
    }
    &raw[..end]
}

/// Flatten tokens to plain text with whitespace normalized to single
/// spaces.
pub(crate) fn flat_text(toks: &[Token]) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for t in toks {
        if t.is_space() || t.is_break() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push_str(t.text);
    }
    strings::rtrim(&mut out);
    out
}
