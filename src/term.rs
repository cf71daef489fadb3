//! Shared terminal visual grammar.
//!
//! Turns a document tree into styled line buffers via the reflow engine.
//! The console renderer serializes these lines as ANSI; the range renderer
//! serializes them as plain text plus style ranges. Everything about the
//! *shape* of terminal output lives here so the two cannot drift apart.

use crate::adapters::{muted_style, HighlightAdapter};
use crate::nodes::{
    Block, BlockValue, Color, ImageFormat, ImageKind, Inline, ListKind, NodeCode, NodeList,
    TextStyle,
};
use crate::parser::alert;
use crate::parser::Diagnostic;
use crate::reflow::{Leader, Reflow, RenderedLine, Span};
use crate::toc;

/// The box-drawing character set used for code frames, alert boxes and
/// tables. Each entry is a string so embedders can substitute ASCII art.
#[derive(Debug, Clone)]
pub struct BoxStyle {
    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
    pub horizontal: String,
    pub vertical: String,
    pub tee_down: String,
    pub tee_up: String,
    pub tee_right: String,
    pub tee_left: String,
    pub cross: String,
}

impl Default for BoxStyle {
    fn default() -> Self {
        BoxStyle {
            top_left: "╭".into(),
            top_right: "╮".into(),
            bottom_left: "╰".into(),
            bottom_right: "╯".into(),
            horizontal: "─".into(),
            vertical: "│".into(),
            tee_down: "┬".into(),
            tee_up: "┴".into(),
            tee_right: "├".into(),
            tee_left: "┤".into(),
            cross: "┼".into(),
        }
    }
}

impl BoxStyle {
    fn h_run(&self, n: usize) -> String {
        self.horizontal.repeat(n)
    }
}

/// Everything the visual grammar needs to know, independent of the final
/// serialization.
pub(crate) struct TermConfig<'p> {
    pub width: usize,
    pub indent: usize,
    pub box_style: BoxStyle,
    pub highlighter: Option<&'p dyn HighlightAdapter>,
    pub diagnostic: Option<&'p dyn Diagnostic>,
}

impl TermConfig<'_> {
    fn warn(&self, msg: &str) {
        if let Some(d) = self.diagnostic {
            d.emit(msg);
        }
    }
}

/// An inline image, anchored after the line that mentioned it.
pub(crate) struct PlacedImage {
    pub after_line: usize,
    pub src: String,
    pub kind: ImageKind,
    pub format: ImageFormat,
}

/// The finished terminal rendering, pre-serialization.
pub(crate) struct Rendered {
    pub lines: Vec<RenderedLine>,
    pub images: Vec<PlacedImage>,
}

pub(crate) fn render_tree(root: &Block, cfg: &TermConfig) -> Rendered {
    let mut r = TermRenderer::new(Reflow::new(cfg.width), cfg);
    r.toc = toc::generate(root);
    if cfg.indent > 0 {
        r.rf.push_leader(Leader::indent(cfg.indent));
    }
    r.render_children(&root.children);
    let images = std::mem::take(&mut r.images);
    Rendered {
        lines: r.rf.finish(),
        images,
    }
}

struct TermRenderer<'p, 'c> {
    rf: Reflow,
    cfg: &'c TermConfig<'p>,
    images: Vec<PlacedImage>,
    /// Pre-generated table of contents, substituted for `{toc}`.
    toc: Option<Block>,
}

/// What goes inside an alert or directive box.
enum BoxBody<'a> {
    /// Phrasing content (alerts).
    Inlines(&'a [Inline]),
    /// Plain wrapped text (directive bodies).
    Text(&'a str),
    /// A generated block (the table of contents).
    List(&'a Block),
    Empty,
}

fn merge(base: TextStyle, run: TextStyle) -> TextStyle {
    TextStyle {
        bold: base.bold || run.bold,
        italic: base.italic || run.italic,
        underline: base.underline || run.underline,
        strike: base.strike || run.strike,
        fg: run.fg.or(base.fg),
        bg: run.bg.or(base.bg),
    }
}

fn heading_style(level: u8) -> TextStyle {
    match level {
        1 => TextStyle::fg(Color::Blue).bold(),
        2 => TextStyle::fg(Color::Green).bold(),
        3 => TextStyle::fg(Color::White).bold().italic().underline(),
        _ => TextStyle::fg(Color::White).underline(),
    }
}

fn codespan_style() -> TextStyle {
    TextStyle::fg(Color::Cyan)
}

fn link_style() -> TextStyle {
    TextStyle::fg(Color::Blue).underline()
}

impl<'p, 'c> TermRenderer<'p, 'c> {
    fn new(rf: Reflow, cfg: &'c TermConfig<'p>) -> Self {
        TermRenderer {
            rf,
            cfg,
            images: Vec::new(),
            toc: None,
        }
    }

    /// Render sibling blocks with one blank line between them. Break
    /// leaves mark boundaries the spacing already covers, so they emit
    /// nothing of their own.
    fn render_children(&mut self, children: &[Block]) {
        let mut first = true;
        for block in children {
            if matches!(block.value, BlockValue::Break) {
                continue;
            }
            if !first {
                self.rf.blank_line();
            }
            first = false;
            self.render_block(block);
        }
    }

    fn render_block(&mut self, block: &Block) {
        match &block.value {
            BlockValue::Paragraph => {
                self.render_inlines(&block.inlines, TextStyle::default());
                self.rf.break_line();
            }
            BlockValue::Heading(nh) => self.render_heading(block, nh.level),
            BlockValue::Quote => {
                self.rf
                    .push_leader(Leader::new("┃ ", TextStyle::fg(Color::White)));
                self.render_children(&block.children);
                self.rf.pop_leader();
            }
            BlockValue::List(nl) => self.render_list(block, nl),
            BlockValue::Code(nc) => self.render_code(nc),
            BlockValue::Alert(na) => {
                self.render_box(&na.label, BoxBody::Inlines(&block.inlines));
            }
            BlockValue::Table(nt) => self.render_table(block, nt.ncol),
            BlockValue::Break => {}
            BlockValue::Document | BlockValue::Item(..) => unreachable!(),
        }
    }

    fn render_heading(&mut self, block: &Block, level: u8) {
        let style = heading_style(level);
        self.rf.set_style(style);
        self.rf.word(&"#".repeat(level as usize));
        self.rf.space();
        self.render_inlines(&block.inlines, style);

        let rule = match level {
            1 => Some('═'),
            2 => Some('─'),
            _ => None,
        };
        if let Some(ch) = rule {
            let col = self.rf.current_col();
            if col + 2 <= self.rf.width() {
                let run: String = std::iter::repeat(ch)
                    .take(self.rf.width() - col - 1)
                    .collect();
                self.rf.append_raw(vec![
                    Span::new(" ", TextStyle::default()),
                    Span::new(run, style),
                ]);
            }
        }
        self.rf.break_line();
    }

    fn render_list(&mut self, block: &Block, nl: &NodeList) {
        let items: Vec<&Block> = block
            .children
            .iter()
            .filter(|c| matches!(c.value, BlockValue::Item(..)))
            .collect();
        let ordinal_width = match nl.kind {
            ListKind::Ordered => digits(nl.start + items.len().saturating_sub(1)),
            _ => 0,
        };

        self.rf.push_leader(Leader::indent(2));
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                for _ in 0..nl.spacing {
                    self.rf.blank_line();
                }
            }

            let checked = match item.value {
                BlockValue::Item(ni) => ni.checked,
                _ => false,
            };
            let (marker, style) = match nl.kind {
                ListKind::Unordered => ("‣ ".to_string(), TextStyle::fg(Color::Blue).bold()),
                ListKind::Ordered => (
                    format!("{:>w$}. ", nl.start + i, w = ordinal_width),
                    TextStyle::default(),
                ),
                ListKind::Task => {
                    if checked {
                        ("☑ ".to_string(), TextStyle::fg(Color::Green))
                    } else {
                        ("☐ ".to_string(), TextStyle::fg(Color::Red))
                    }
                }
            };
            let marker_width = crate::strings::cp_width(&marker);
            self.rf.append_raw(vec![Span::new(marker, style)]);
            self.rf.push_leader(Leader::indent(marker_width));

            if item.children.iter().all(|c| matches!(c.value, BlockValue::Break)) {
                self.rf.break_line();
            } else {
                self.render_children(&item.children);
            }
            self.rf.pop_leader();
        }
        self.rf.pop_leader();
    }

    fn render_inlines(&mut self, inlines: &[Inline], base: TextStyle) {
        for inl in inlines {
            match inl {
                Inline::Text(t) => {
                    self.rf.set_style(merge(base, t.style));
                    self.rf.text(&t.text);
                }
                Inline::CodeSpan(s) => {
                    self.rf
                        .atom(&[Span::new(s.clone(), merge(base, codespan_style()))]);
                }
                Inline::Link(nl) => {
                    let spans: Vec<Span> = nl
                        .label
                        .iter()
                        .map(|run| {
                            Span::linked(
                                run.text.clone(),
                                merge(merge(base, link_style()), run.style),
                                nl.url.clone(),
                            )
                        })
                        .collect();
                    self.rf.atom(&spans);
                }
                Inline::Autolink(url) => {
                    self.rf.atom(&[Span::linked(
                        url.clone(),
                        merge(base, link_style()),
                        url.clone(),
                    )]);
                }
                Inline::Image(ni) => {
                    let mut spans: Vec<Span> = ni
                        .alt
                        .iter()
                        .map(|run| {
                            Span::new(
                                run.text.clone(),
                                merge(merge(base, TextStyle::fg(Color::Magenta)), run.style),
                            )
                        })
                        .collect();
                    spans.push(Span::new(" → ", TextStyle::default()));
                    spans.push(Span::new(
                        ni.src.clone(),
                        TextStyle::fg(Color::BrightBlack),
                    ));
                    self.rf.atom(&spans);
                    self.images.push(PlacedImage {
                        after_line: self.rf.line_index(),
                        src: ni.src.clone(),
                        kind: ni.kind,
                        format: ni.format,
                    });
                }
                Inline::LineBreak => self.rf.break_line(),
            }
        }
        self.rf.set_style(TextStyle::default());
    }

    fn render_code(&mut self, nc: &NodeCode) {
        match nc.directive.as_deref() {
            Some("toc") => self.render_toc_box(),
            Some(label) => {
                let label = label.to_string();
                self.render_box(&label, BoxBody::Text(&nc.text));
            }
            None => self.render_code_box(nc),
        }
    }

    fn render_code_box(&mut self, nc: &NodeCode) {
        let bs = &self.cfg.box_style;
        let frame = TextStyle::fg(Color::BrightBlack);

        let mut header = vec![Span::new(
            format!("{}{}", bs.top_left, bs.h_run(4)),
            frame,
        )];
        if let Some(tag) = &nc.tag {
            header.push(Span::new(format!(" {}", tag), TextStyle::fg(Color::White)));
        }
        self.rf.append_raw(header);
        self.rf.break_line();

        self.rf
            .push_leader(Leader::new(format!("{} ", bs.vertical), frame));
        self.render_code_body(nc);
        self.rf.pop_leader();

        self.rf.append_raw(vec![Span::new(
            format!("{}{}", bs.bottom_left, bs.h_run(4)),
            frame,
        )]);
        self.rf.break_line();
    }

    /// Body lines, syntax highlighted when a provider is available; a
    /// single muted style otherwise or when the provider fails.
    fn render_code_body(&mut self, nc: &NodeCode) {
        if let Some(h) = self.cfg.highlighter {
            match h.highlight(nc.tag.as_deref(), &nc.text) {
                Ok(spans) => {
                    for span in spans {
                        self.rf.set_style(span.style);
                        self.rf.verbatim(span.text.trim_end_matches('\n'));
                        if span.newline {
                            self.rf.break_line();
                        }
                    }
                    self.rf.set_style(TextStyle::default());
                    return;
                }
                Err(e) => {
                    self.cfg
                        .warn(&format!("highlighting failed, rendering muted: {}", e));
                }
            }
        }
        self.rf.set_style(muted_style());
        for line in nc.text.lines() {
            self.rf.verbatim(line);
            self.rf.break_line();
        }
        self.rf.set_style(TextStyle::default());
    }

    fn render_toc_box(&mut self) {
        match self.toc.clone() {
            Some(list) => self.render_box("TOC", BoxBody::List(&list)),
            None => self.render_box("TOC", BoxBody::Empty),
        }
    }

    /// A rounded, full-width box with a colored label in the header and a
    /// right-aligned edge on every body line. The body renders through a
    /// width-narrowed sub-renderer.
    fn render_box(&mut self, label: &str, body: BoxBody<'_>) {
        let bs = self.cfg.box_style.clone();
        let accent = alert::color(label);
        let frame = TextStyle {
            fg: accent,
            ..TextStyle::default()
        };
        let label_style = TextStyle {
            fg: accent,
            bold: true,
            ..TextStyle::default()
        };

        let box_width = self.rf.width().saturating_sub(self.rf.leader_width());
        let inner = box_width.saturating_sub(4);

        // Sub-render the body at the narrowed width.
        let sub_cfg = TermConfig {
            width: inner,
            indent: 0,
            box_style: bs.clone(),
            highlighter: self.cfg.highlighter,
            diagnostic: self.cfg.diagnostic,
        };
        let mut sub = TermRenderer::new(Reflow::new(inner), &sub_cfg);
        match body {
            BoxBody::Inlines(inlines) => {
                sub.render_inlines(inlines, TextStyle::default());
                sub.rf.break_line();
            }
            BoxBody::Text(text) => {
                for line in text.lines() {
                    sub.rf.set_style(TextStyle::default());
                    sub.rf.text(line);
                    sub.rf.break_line();
                }
            }
            BoxBody::List(list) => sub.render_block(list),
            BoxBody::Empty => {}
        }
        let body_lines = sub.rf.finish();
        let sub_images = sub.images;

        // Header: ╭─ ⚠ LABEL ───────╮
        let mut title = String::new();
        if let Some(icon) = alert::icon(label) {
            title.push_str(icon);
            title.push(' ');
        }
        title.push_str(label);
        let title_width = crate::strings::cp_width(&title);
        let fill = box_width.saturating_sub(title_width + 5);
        self.rf.append_raw(vec![
            Span::new(format!("{}{} ", bs.top_left, bs.horizontal), frame),
            Span::new(title, label_style),
            Span::new(format!(" {}{}", bs.h_run(fill), bs.top_right), frame),
        ]);
        self.rf.break_line();

        let body_start = self.rf.line_index();
        let left_edge = self.rf.leader_width();
        for line in body_lines {
            self.rf
                .append_raw(vec![Span::new(format!("{} ", bs.vertical), frame)]);
            self.rf.append_raw(line.spans);
            self.rf.pad_to((left_edge + box_width).saturating_sub(2));
            self.rf
                .append_raw(vec![Span::new(format!(" {}", bs.vertical), frame)]);
            self.rf.break_line();
        }
        for mut img in sub_images {
            img.after_line += body_start;
            self.images.push(img);
        }

        self.rf.append_raw(vec![Span::new(
            format!(
                "{}{}{}",
                bs.bottom_left,
                bs.h_run(box_width.saturating_sub(2)),
                bs.bottom_right
            ),
            frame,
        )]);
        self.rf.break_line();
    }

    fn render_table(&mut self, block: &Block, ncol: usize) {
        if ncol == 0 || block.children.is_empty() {
            return;
        }
        let bs = self.cfg.box_style.clone();
        let width = self.rf.width();
        let indent = self.cfg.indent;
        let cell_w = width
            .saturating_sub(2 * indent)
            .saturating_sub(ncol + 1)
            .checked_div(ncol)
            .unwrap_or(1)
            .max(3);

        // Render every cell through an isolated sub-renderer.
        let sub_cfg = TermConfig {
            width: cell_w,
            indent: 0,
            box_style: bs.clone(),
            highlighter: self.cfg.highlighter,
            diagnostic: self.cfg.diagnostic,
        };
        let nrow = block.children.len() / ncol;
        let mut cells: Vec<Vec<RenderedLine>> = Vec::with_capacity(block.children.len());
        for (i, cell) in block.children.iter().enumerate() {
            let header = i < ncol;
            let mut sub = TermRenderer::new(Reflow::new(cell_w), &sub_cfg);
            let base = if header {
                TextStyle::default().bold()
            } else {
                TextStyle::default()
            };
            sub.render_inlines(&cell.inlines, base);
            sub.rf.break_line();
            cells.push(sub.rf.finish());
        }

        let border = |left: &str, mid: &str, right: &str| {
            let mut s = String::from(left);
            for c in 0..ncol {
                s.push_str(&bs.h_run(cell_w));
                s.push_str(if c + 1 == ncol { right } else { mid });
            }
            s
        };

        self.rf
            .append_raw(vec![Span::new(
                border(&bs.top_left, &bs.tee_down, &bs.top_right),
                TextStyle::default(),
            )]);
        self.rf.break_line();

        for row in 0..nrow {
            let row_cells = &cells[row * ncol..(row + 1) * ncol];
            let height = row_cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            for line_no in 0..height {
                for cell in row_cells {
                    self.rf
                        .append_raw(vec![Span::new(bs.vertical.clone(), TextStyle::default())]);
                    let base = self.rf.current_col();
                    if let Some(line) = cell.get(line_no) {
                        self.rf.append_raw(line.spans.clone());
                    }
                    self.rf.pad_to(base + cell_w);
                }
                self.rf
                    .append_raw(vec![Span::new(bs.vertical.clone(), TextStyle::default())]);
                self.rf.break_line();
            }
            if row == 0 && nrow > 1 {
                self.rf.append_raw(vec![Span::new(
                    border(&bs.tee_right, &bs.cross, &bs.tee_left),
                    TextStyle::default(),
                )]);
                self.rf.break_line();
            }
        }

        self.rf.append_raw(vec![Span::new(
            border(&bs.bottom_left, &bs.tee_up, &bs.bottom_right),
            TextStyle::default(),
        )]);
        self.rf.break_line();
    }
}

fn digits(n: usize) -> usize {
    let mut n = n;
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}
