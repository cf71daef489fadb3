//! The HTML renderer.
//!
//! Emits a self-contained document: a `<head>` carrying a Google-Fonts
//! link and a `<style>` block assembled from the [`Css`] bundle, then the
//! rendered body. Every text character is HTML-escaped except inside
//! already-escaped code.

use std::io::{self, Write};
use std::sync::Arc;

use crate::adapters::muted_style;
use crate::nodes::{
    Block, BlockValue, Color, Inline, ListKind, NodeCode, NodeText, TextStyle,
};
use crate::parser::{alert, Diagnostic};
use crate::plugins::Plugins;
use crate::toc::{self, Anchorizer};

/// The CSS bundle: one chunk per visual element, in emission order. Every
/// chunk has a default and may be overridden wholesale.
#[derive(Debug, Clone)]
pub struct Css {
    pub body: String,
    pub title: String,
    pub heading: String,
    pub paragraph: String,
    pub blockquote: String,
    pub list: String,
    pub task_list: String,
    pub code_block: String,
    pub code_span: String,
    pub directive: String,
    pub md_table: String,
    pub link: String,
}

impl Default for Css {
    fn default() -> Self {
        Css {
            body: "\
body {
  font-family: 'Source Serif 4', serif;
  max-width: 46em;
  margin: 2em auto;
  padding: 0 1em;
  color: #1a1a1a;
  line-height: 1.5;
}"
            .into(),
            title: "\
.title { border-bottom: 3px double #444; margin-bottom: 1.5em; }"
                .into(),
            heading: "\
h1, h2, h3, h4, h5, h6 { font-family: 'Source Sans 3', sans-serif; }
h1 { color: #1d4ed8; }
h2 { color: #15803d; }"
                .into(),
            paragraph: "p { margin: 0.8em 0; }".into(),
            blockquote: "\
blockquote {
  border-left: 4px solid #94a3b8;
  margin-left: 0;
  padding-left: 1em;
  color: #475569;
}"
            .into(),
            list: "ul, ol { padding-left: 1.6em; }".into(),
            task_list: "\
ul.task_list { list-style: none; padding-left: 0.6em; }
li.task_checked::before { content: '☑ '; color: #15803d; }
li.task_unchecked::before { content: '☐ '; color: #b91c1c; }"
                .into(),
            code_block: "\
div.code_block {
  background: #0f172a;
  color: #e2e8f0;
  border-radius: 6px;
  padding: 0.6em 0.8em;
  overflow-x: auto;
}
div.code_block table { border-collapse: collapse; font-family: 'JetBrains Mono', monospace; }
div.code_block td.line_no {
  color: #64748b;
  text-align: right;
  padding-right: 1em;
  user-select: none;
}
div.code_block td.line { white-space: pre; }"
                .into(),
            code_span: "\
code { font-family: 'JetBrains Mono', monospace; background: #f1f5f9; padding: 0 0.2em; }"
                .into(),
            directive: "\
div.directive { border: 1px solid #94a3b8; border-radius: 6px; padding: 0.5em 1em; margin: 1em 0; }
div.directive p.directive_label { font-weight: bold; margin: 0 0 0.4em 0; }
div.directive.note { border-color: #1d4ed8; }
div.directive.tip { border-color: #15803d; }
div.directive.warning, div.directive.caution { border-color: #b91c1c; }"
                .into(),
            md_table: "\
div.md_table table { border-collapse: collapse; }
div.md_table th, div.md_table td { border: 1px solid #94a3b8; padding: 0.3em 0.8em; }
div.md_table th { background: #f1f5f9; }"
                .into(),
            link: "a { color: #1d4ed8; }".into(),
        }
    }
}

impl Css {
    fn write_style<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for chunk in [
            &self.body,
            &self.title,
            &self.heading,
            &self.paragraph,
            &self.blockquote,
            &self.list,
            &self.task_list,
            &self.code_block,
            &self.code_span,
            &self.directive,
            &self.md_table,
            &self.link,
        ] {
            out.write_all(chunk.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

const FONTS_HREF: &str = "https://fonts.googleapis.com/css2?family=Source+Serif+4&family=Source+Sans+3&family=JetBrains+Mono&display=swap";

/// HTML renderer configuration.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    pub css: Css,
    /// Extra HTML injected at the top of `<body>`.
    pub header: Option<String>,
    /// Extra HTML injected at the bottom of `<body>`.
    pub footer: Option<String>,
    pub diagnostic: Option<Arc<dyn Diagnostic>>,
}

/// Render a document as a complete HTML page.
pub fn format_document<W: Write>(
    root: &Block,
    options: &HtmlOptions,
    output: &mut W,
) -> io::Result<()> {
    format_document_with_plugins(root, options, &Plugins::default(), output)
}

/// Like [`format_document`], with collaborator plugins for code block
/// highlighting.
pub fn format_document_with_plugins<W: Write>(
    root: &Block,
    options: &HtmlOptions,
    plugins: &Plugins,
    output: &mut W,
) -> io::Result<()> {
    let mut f = HtmlFormatter {
        output,
        options,
        plugins,
        anchorizer: Anchorizer::new(),
        toc: toc::generate(root),
    };
    f.document(root)
}

/// Write `buffer` with the five HTML-special characters escaped.
pub fn escape<W: Write>(output: &mut W, buffer: &str) -> io::Result<()> {
    for ch in buffer.chars() {
        match ch {
            '<' => output.write_all(b"&lt;")?,
            '>' => output.write_all(b"&gt;")?,
            '&' => output.write_all(b"&amp;")?,
            '"' => output.write_all(b"&quot;")?,
            '\'' => output.write_all(b"&#39;")?,
            _ => write!(output, "{}", ch)?,
        }
    }
    Ok(())
}

/// Escape a URL for an attribute position.
pub fn escape_href<W: Write>(output: &mut W, buffer: &str) -> io::Result<()> {
    for ch in buffer.chars() {
        match ch {
            '<' => output.write_all(b"&lt;")?,
            '>' => output.write_all(b"&gt;")?,
            '&' => output.write_all(b"&amp;")?,
            '"' => output.write_all(b"%22")?,
            '\'' => output.write_all(b"%27")?,
            ' ' => output.write_all(b"%20")?,
            _ => write!(output, "{}", ch)?,
        }
    }
    Ok(())
}

fn css_color(color: Color) -> &'static str {
    match color {
        Color::Black => "#000000",
        Color::Red => "#b91c1c",
        Color::Green => "#15803d",
        Color::Yellow => "#a16207",
        Color::Blue => "#1d4ed8",
        Color::Magenta => "#a21caf",
        Color::Cyan => "#0e7490",
        Color::White => "#e2e8f0",
        Color::BrightBlack => "#64748b",
        Color::BrightRed => "#ef4444",
        Color::BrightGreen => "#22c55e",
        Color::BrightYellow => "#eab308",
        Color::BrightBlue => "#3b82f6",
        Color::BrightMagenta => "#d946ef",
        Color::BrightCyan => "#06b6d4",
        Color::BrightWhite => "#f8fafc",
    }
}

struct HtmlFormatter<'o, W: Write> {
    output: &'o mut W,
    options: &'o HtmlOptions,
    plugins: &'o Plugins<'o>,
    anchorizer: Anchorizer,
    toc: Option<Block>,
}

impl<'o, W: Write> HtmlFormatter<'o, W> {
    fn document(&mut self, root: &Block) -> io::Result<()> {
        writeln!(self.output, "<!DOCTYPE html>")?;
        writeln!(self.output, "<html>")?;
        writeln!(self.output, "<head>")?;
        writeln!(self.output, "<meta charset=\"utf-8\">")?;
        writeln!(
            self.output,
            "<link rel=\"stylesheet\" href=\"{}\">",
            FONTS_HREF
        )?;
        writeln!(self.output, "<style>")?;
        self.options.css.write_style(self.output)?;
        writeln!(self.output, "</style>")?;
        writeln!(self.output, "</head>")?;
        writeln!(self.output, "<body>")?;
        if let Some(header) = &self.options.header {
            writeln!(self.output, "{}", header)?;
        }

        self.blocks(&root.children)?;

        if let Some(footer) = &self.options.footer {
            writeln!(self.output, "{}", footer)?;
        }
        writeln!(self.output, "</body>")?;
        writeln!(self.output, "</html>")?;
        Ok(())
    }

    fn blocks(&mut self, children: &[Block]) -> io::Result<()> {
        for block in children {
            self.block(block)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> io::Result<()> {
        match &block.value {
            BlockValue::Paragraph => {
                self.output.write_all(b"<p>")?;
                self.inlines(&block.inlines)?;
                self.output.write_all(b"</p>\n")?;
            }
            BlockValue::Heading(nh) => {
                let id = self.anchorizer.anchorize(&nh.text);
                if nh.level == 1 {
                    self.output.write_all(b"<div class=\"title\">")?;
                }
                write!(self.output, "<h{} id=\"", nh.level)?;
                escape(self.output, &id)?;
                self.output.write_all(b"\">")?;
                self.inlines(&block.inlines)?;
                write!(self.output, "</h{}>", nh.level)?;
                if nh.level == 1 {
                    self.output.write_all(b"</div>")?;
                }
                self.output.write_all(b"\n")?;
            }
            BlockValue::Quote => {
                self.output.write_all(b"<blockquote>\n")?;
                self.blocks(&block.children)?;
                self.output.write_all(b"</blockquote>\n")?;
            }
            BlockValue::List(nl) => self.list(block, nl.kind, nl.start, nl.spacing == 0)?,
            BlockValue::Code(nc) => self.code(nc)?,
            BlockValue::Alert(na) => {
                self.directive_open(&na.label)?;
                self.output.write_all(b"<p>")?;
                self.inlines(&block.inlines)?;
                self.output.write_all(b"</p>\n</div>\n")?;
            }
            BlockValue::Table(nt) => self.table(block, nt.ncol)?,
            BlockValue::Break => {}
            BlockValue::Document | BlockValue::Item(..) => unreachable!(),
        }
        Ok(())
    }

    fn list(&mut self, block: &Block, kind: ListKind, start: usize, tight: bool) -> io::Result<()> {
        match kind {
            ListKind::Ordered if start != 1 => {
                writeln!(self.output, "<ol start=\"{}\">", start)?
            }
            ListKind::Ordered => self.output.write_all(b"<ol>\n")?,
            ListKind::Unordered => self.output.write_all(b"<ul>\n")?,
            ListKind::Task => self.output.write_all(b"<ul class=\"task_list\">\n")?,
        }

        for item in &block.children {
            let BlockValue::Item(ni) = item.value else {
                continue;
            };
            match kind {
                ListKind::Task if ni.checked => {
                    self.output.write_all(b"<li class=\"task_checked\">")?
                }
                ListKind::Task => self.output.write_all(b"<li class=\"task_unchecked\">")?,
                _ => self.output.write_all(b"<li>")?,
            }
            self.item_body(item, tight)?;
            self.output.write_all(b"</li>\n")?;
        }

        match kind {
            ListKind::Ordered => self.output.write_all(b"</ol>\n")?,
            _ => self.output.write_all(b"</ul>\n")?,
        }
        Ok(())
    }

    /// Tight list items render a sole paragraph without its `<p>` wrapper.
    fn item_body(&mut self, item: &Block, tight: bool) -> io::Result<()> {
        let visible: Vec<&Block> = item
            .children
            .iter()
            .filter(|c| !matches!(c.value, BlockValue::Break))
            .collect();
        if tight && visible.len() == 1 && matches!(visible[0].value, BlockValue::Paragraph) {
            self.inlines(&visible[0].inlines)
        } else {
            self.output.write_all(b"\n")?;
            for child in visible {
                self.block(child)?;
            }
            Ok(())
        }
    }

    fn code(&mut self, nc: &NodeCode) -> io::Result<()> {
        match nc.directive.as_deref() {
            Some("toc") => {
                self.directive_open("toc")?;
                if let Some(list) = self.toc.clone() {
                    self.block(&list)?;
                }
                self.output.write_all(b"</div>\n")?;
            }
            Some(label) => {
                let label = label.to_string();
                self.directive_open(&label)?;
                self.output.write_all(b"<p>")?;
                let mut first = true;
                for line in nc.text.lines() {
                    if !first {
                        self.output.write_all(b"<br />")?;
                    }
                    first = false;
                    escape(self.output, line)?;
                }
                self.output.write_all(b"</p>\n</div>\n")?;
            }
            None => self.code_block(nc)?,
        }
        Ok(())
    }

    fn directive_open(&mut self, label: &str) -> io::Result<()> {
        self.output.write_all(b"<div class=\"directive ")?;
        escape(self.output, &alert::css_class(label))?;
        self.output.write_all(b"\">\n<p class=\"directive_label\">")?;
        escape(self.output, label)?;
        self.output.write_all(b"</p>\n")?;
        Ok(())
    }

    /// A code block becomes a table with a line-number column and
    /// per-token colored spans from the highlight provider.
    fn code_block(&mut self, nc: &NodeCode) -> io::Result<()> {
        self.output.write_all(b"<div class=\"code_block\"><table>\n")?;

        let lines = self.highlight_lines(nc);
        for (no, spans) in lines.iter().enumerate() {
            write!(
                self.output,
                "<tr><td class=\"line_no\">{}</td><td class=\"line\">",
                no + 1
            )?;
            for run in spans {
                if let Some(fg) = run.style.fg {
                    write!(self.output, "<span style=\"color:{}\">", css_color(fg))?;
                } else {
                    self.output.write_all(b"<span>")?;
                }
                escape(self.output, &run.text)?;
                self.output.write_all(b"</span>")?;
            }
            self.output.write_all(b"</td></tr>\n")?;
        }

        self.output.write_all(b"</table></div>\n")?;
        Ok(())
    }

    /// Group highlight-provider output into per-line span runs, falling
    /// back to one muted run per line.
    fn highlight_lines(&mut self, nc: &NodeCode) -> Vec<Vec<NodeText>> {
        if let Some(h) = self.plugins.highlighter {
            match h.highlight(nc.tag.as_deref(), &nc.text) {
                Ok(spans) => {
                    let mut lines: Vec<Vec<NodeText>> = vec![Vec::new()];
                    for span in spans {
                        let text = span.text.trim_end_matches('\n').to_string();
                        if !text.is_empty() {
                            lines
                                .last_mut()
                                .unwrap()
                                .push(NodeText::new(text, span.style));
                        }
                        if span.newline {
                            lines.push(Vec::new());
                        }
                    }
                    while lines.last().map_or(false, Vec::is_empty) {
                        lines.pop();
                    }
                    return lines;
                }
                Err(e) => {
                    if let Some(d) = &self.options.diagnostic {
                        d.emit(&format!("highlighting failed, rendering muted: {}", e));
                    }
                }
            }
        }
        nc.text
            .lines()
            .map(|l| vec![NodeText::new(l, muted_style())])
            .collect()
    }

    fn table(&mut self, block: &Block, ncol: usize) -> io::Result<()> {
        self.output.write_all(b"<div class=\"md_table\"><table>\n")?;
        for (row_i, row) in block.children.chunks(ncol).enumerate() {
            let cell_tag = if row_i == 0 { "th" } else { "td" };
            self.output.write_all(b"<tr>")?;
            for cell in row {
                write!(self.output, "<{}>", cell_tag)?;
                self.inlines(&cell.inlines)?;
                write!(self.output, "</{}>", cell_tag)?;
            }
            self.output.write_all(b"</tr>\n")?;
        }
        self.output.write_all(b"</table></div>\n")?;
        Ok(())
    }

    fn inlines(&mut self, inlines: &[Inline]) -> io::Result<()> {
        for inl in inlines {
            match inl {
                Inline::Text(t) => self.styled_text(t)?,
                Inline::CodeSpan(s) => {
                    self.output.write_all(b"<code>")?;
                    escape(self.output, s)?;
                    self.output.write_all(b"</code>")?;
                }
                Inline::Link(nl) => {
                    self.output.write_all(b"<a href=\"")?;
                    escape_href(self.output, &nl.url)?;
                    self.output.write_all(b"\">")?;
                    for run in &nl.label {
                        self.styled_text(run)?;
                    }
                    self.output.write_all(b"</a>")?;
                }
                Inline::Autolink(url) => {
                    self.output.write_all(b"<a href=\"")?;
                    escape_href(self.output, url)?;
                    self.output.write_all(b"\">")?;
                    escape(self.output, url)?;
                    self.output.write_all(b"</a>")?;
                }
                Inline::Image(ni) => {
                    self.output.write_all(b"<img src=\"")?;
                    escape_href(self.output, &ni.src)?;
                    self.output.write_all(b"\" alt=\"")?;
                    for run in &ni.alt {
                        escape(self.output, &run.text)?;
                    }
                    self.output.write_all(b"\" />")?;
                }
                Inline::LineBreak => self.output.write_all(b"<br />\n")?,
            }
        }
        Ok(())
    }

    /// One styled run: nested tags, innermost first in a fixed order.
    fn styled_text(&mut self, run: &NodeText) -> io::Result<()> {
        let TextStyle {
            bold,
            italic,
            underline,
            strike,
            ..
        } = run.style;
        if strike {
            self.output.write_all(b"<del>")?;
        }
        if italic {
            self.output.write_all(b"<em>")?;
        }
        if bold {
            self.output.write_all(b"<strong>")?;
        }
        if underline {
            self.output.write_all(b"<u>")?;
        }
        escape(self.output, &run.text)?;
        if underline {
            self.output.write_all(b"</u>")?;
        }
        if bold {
            self.output.write_all(b"</strong>")?;
        }
        if italic {
            self.output.write_all(b"</em>")?;
        }
        if strike {
            self.output.write_all(b"</del>")?;
        }
        Ok(())
    }
}
