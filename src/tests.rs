mod console;
mod emphasis;
mod format;
mod links;
mod lists;
mod ranges;
mod table;

use std::sync::{Arc, Mutex};

use crate::nodes::Block;
use crate::{ConsoleOptions, FormatOptions, HtmlOptions, ParseOptions, RangeOptions, StyleRange};

pub(crate) fn parse(input: &str) -> Block {
    crate::parse(input)
}

/// Render the body of the HTML page, skeleton stripped.
pub(crate) fn html_body(input: &str) -> String {
    let page = crate::markdown_to_html(input, &HtmlOptions::default());
    let start = page.find("<body>\n").expect("page has a body") + "<body>\n".len();
    let end = page.find("</body>").expect("page closes its body");
    page[start..end].to_string()
}

#[track_caller]
pub(crate) fn html(input: &str, expected_body: &str) {
    pretty_assertions::assert_eq!(html_body(input), expected_body);
}

#[track_caller]
pub(crate) fn fmtmd(input: &str, expected: &str) {
    let out = crate::format_markdown(input, &FormatOptions::default());
    pretty_assertions::assert_eq!(out, expected);
}

pub(crate) fn console_plain(input: &str, width: usize) -> String {
    let options = ConsoleOptions {
        width,
        colors: false,
        ..ConsoleOptions::default()
    };
    crate::markdown_to_ansi(input, &options)
}

pub(crate) fn ansi(input: &str, width: usize) -> String {
    let options = ConsoleOptions {
        width,
        ..ConsoleOptions::default()
    };
    crate::markdown_to_ansi(input, &options)
}

pub(crate) fn ranges_of(input: &str, width: usize) -> (String, Vec<StyleRange>) {
    let options = RangeOptions {
        width,
        ..RangeOptions::default()
    };
    crate::markdown_to_ranges(input, &options)
}

/// Column width in code points.
pub(crate) fn cp(s: &str) -> usize {
    s.chars().count()
}

/// A diagnostic sink that remembers every line it was handed.
pub(crate) fn recording_diagnostic() -> (Arc<Mutex<Vec<String>>>, ParseOptions) {
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let options = ParseOptions {
        diagnostic: Some(Arc::new(move |line: &str| {
            sink.lock().unwrap().push(line.to_string());
        })),
    };
    (log, options)
}

/// Inputs exercised by the cross-renderer property tests.
pub(crate) const CORPUS: &[&str] = &[
    "hello world\n",
    "# Title\n\nBody text with **bold**, _italic_ and ~gone~.\n",
    "## Second ##\n\npara one\n\npara two\n",
    "> quoted\n> across lines\n",
    "> outer\n> > inner\n",
    "- one\n- two\n  - three\n",
    "1. first\n2. second\n",
    "5. five\n6. six\n",
    "- [x] done\n- [ ] todo\n",
    "- a\n\n- b\n",
    "```rust\nfn main() {}\n```\n",
    "~~~\nplain text\n~~~\n",
    "```{warning}\nwatch out\n```\n",
    "a `code span` b\n",
    "[label](https://example.com) text\n",
    "![alt](img.png)\n",
    "<https://example.com/x>\n",
    "line one  \nline two\n",
    "| a | b |\n|---|---|\n| 1 | 2 |\n",
    "> [!NOTE]\n> something useful\n",
    "# A\n\n## B\n\ntext under b\n\n# C\n",
    "***both*** and **bold _mixed_**\n",
];
