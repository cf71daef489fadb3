use super::*;
use crate::nodes::{BlockValue, Inline};

fn cell_text(cell: &crate::nodes::Block) -> String {
    cell.inlines
        .iter()
        .map(|i| match i {
            Inline::Text(t) => t.text.clone(),
            Inline::CodeSpan(s) => s.clone(),
            other => panic!("unexpected cell inline {:?}", other),
        })
        .collect()
}

#[test]
fn basic_table_tree() {
    let doc = parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert_eq!(doc.children.len(), 1);
    let table = &doc.children[0];
    match table.value {
        BlockValue::Table(nt) => assert_eq!(nt.ncol, 2),
        ref other => panic!("expected table, got {:?}", other),
    }
    assert_eq!(table.children.len(), 4);
    let texts: Vec<String> = table.children.iter().map(cell_text).collect();
    assert_eq!(texts, vec!["a", "b", "1", "2"]);
}

#[test]
fn short_rows_pad_and_long_rows_truncate() {
    let doc = parse("| a | b |\n|---|---|\n| 1 |\n| x | y | z |\n");
    let table = &doc.children[0];
    assert_eq!(table.children.len(), 6);
    let texts: Vec<String> = table.children.iter().map(cell_text).collect();
    assert_eq!(texts, vec!["a", "b", "1", "", "x", "y"]);
}

#[test]
fn cells_run_the_inline_pass() {
    let doc = parse("| **bold** | `code` |\n|---|---|\n");
    let table = &doc.children[0];
    match &table.children[0].inlines[0] {
        Inline::Text(t) => {
            assert_eq!(t.text, "bold");
            assert!(t.style.bold);
        }
        other => panic!("unexpected inline {:?}", other),
    }
    assert!(matches!(&table.children[1].inlines[0], Inline::CodeSpan(s) if s == "code"));
}

#[test]
fn escaped_pipes_stay_in_cells() {
    let doc = parse("| a \\| b | c |\n|---|---|\n");
    let table = &doc.children[0];
    assert_eq!(cell_text(&table.children[0]), "a | b");
}

#[test]
fn delimiter_needs_single_line_header() {
    let doc = parse("para line one\nline two\n|---|\n");
    assert!(matches!(doc.children[0].value, BlockValue::Paragraph));
    assert!(doc
        .children
        .iter()
        .all(|b| !matches!(b.value, BlockValue::Table(..))));
}

#[test]
fn mismatched_delimiter_warns_and_stays_text() {
    let (log, options) = recording_diagnostic();
    let doc = crate::parse_with_options("| a | b |\n|---|---|---|\n", &options);
    assert!(doc
        .children
        .iter()
        .all(|b| !matches!(b.value, BlockValue::Table(..))));
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].contains("delimiter"), "unexpected warning: {}", log[0]);
}

#[test]
fn blank_line_ends_the_table() {
    let doc = parse("| a |\n|---|\n| 1 |\n\nafter\n");
    let table = &doc.children[0];
    assert_eq!(table.children.len(), 2);
    assert!(doc
        .children
        .iter()
        .any(|b| matches!(b.value, BlockValue::Paragraph)));
}

#[test]
fn non_table_line_ends_the_table() {
    let doc = parse("| a |\n|---|\nplain text\n");
    assert!(matches!(doc.children[0].value, BlockValue::Table(..)));
    assert!(matches!(doc.children[1].value, BlockValue::Paragraph));
}

#[test]
fn html_table_cells() {
    let body = html_body("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(body.contains("<th>a</th><th>b</th>"));
    assert!(body.contains("<td>1</td><td>2</td>"));
    assert!(body.contains("<div class=\"md_table\">"));
}

#[test]
fn console_table_grid() {
    let out = console_plain("| a | b |\n|---|---|\n| 1 | 2 |\n", 21);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "╭─────────┬─────────╮");
    assert_eq!(lines[1], "│a        │b        │");
    assert_eq!(lines[2], "├─────────┼─────────┤");
    assert_eq!(lines[3], "│1        │2        │");
    assert_eq!(lines[4], "╰─────────┴─────────╯");
}

#[test]
fn console_table_tall_cells_expand_rows() {
    // A long cell wraps inside its column; the row grows to the tallest
    // cell and the short cell pads with blanks.
    let out = console_plain("| aaaa bbbb cccc | x |\n|---|---|\n", 17);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.len() > 3, "expected a multi-line row: {:?}", lines);
    assert!(lines[1].starts_with("│aaaa"));
    assert!(lines[2].starts_with("│"));
}
