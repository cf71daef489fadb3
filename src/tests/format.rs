use super::*;
use crate::FormatOptions;

#[test]
fn heading_normalizes_whitespace() {
    fmtmd(" #   Hello!  ", "# Hello!\n");
}

#[test]
fn bullet_and_emphasis_canonicalize() {
    fmtmd("  *   ***list*** item ", "- _**list**_ item\n");
}

#[test]
fn nested_list_indents_normalize() {
    fmtmd(
        "- one\n - two\n  - three\n   - four",
        "- one\n- two\n  - three\n  - four\n",
    );
}

#[test]
fn emphasis_order_is_strike_italic_bold() {
    fmtmd("~***x***~\n", "~_**x**_~\n");
}

#[test]
fn ordered_list_keeps_start() {
    fmtmd("7. a\n9. b\n", "7. a\n8. b\n");
}

#[test]
fn task_list_markers() {
    fmtmd("- [X] done\n- [ ] todo\n", "- [x] done\n- [ ] todo\n");
}

#[test]
fn loose_list_keeps_blank_lines() {
    fmtmd("- a\n\n- b\n", "- a\n\n- b\n");
}

#[test]
fn quote_leaders_concatenate() {
    fmtmd("> a\n> > b\n", "> a\n>\n> > b\n");
}

#[test]
fn fence_and_tag_are_preserved() {
    fmtmd("````py\nx = 1\n````\n", "````py\nx = 1\n````\n");
    fmtmd("~~~\nplain\n~~~\n", "~~~\nplain\n~~~\n");
    fmtmd("```{warning}\nboo\n```\n", "```{warning}\nboo\n```\n");
}

#[test]
fn code_body_is_untouched() {
    fmtmd(
        "```\n  indented\n\nspaced\n```\n",
        "```\n  indented\n\nspaced\n```\n",
    );
}

#[test]
fn link_image_and_autolink_forms() {
    fmtmd(
        "[l](u) ![a](s.png) <https://e.com>\n",
        "[l](u) ![a](s.png) <https://e.com>\n",
    );
}

#[test]
fn hard_break_survives() {
    fmtmd("a  \nb\n", "a  \nb\n");
}

#[test]
fn table_pads_to_widest_cell() {
    fmtmd(
        "| a | long |\n|---|---|\n| wider | b |\n",
        "| a     | long |\n| ----- | ---- |\n| wider | b    |\n",
    );
}

#[test]
fn table_cells_escape_pipes() {
    fmtmd(
        "| a \\| b |\n|---|\n",
        "| a \\| b |\n| ------ |\n",
    );
}

#[test]
fn paragraphs_rewrap_at_width() {
    let input = "one two three four five six seven\n";
    let out = crate::format_markdown(input, &FormatOptions { width: 12, indent: 0 });
    assert_eq!(out, "one two\nthree four\nfive six\nseven\n");
}

#[test]
fn wrap_never_splits_atoms() {
    let out = crate::format_markdown(
        "xx [a long label](https://example.com/long)\n",
        &FormatOptions { width: 10, indent: 0 },
    );
    assert_eq!(out, "xx\n[a long label](https://example.com/long)\n");
}

#[test]
fn format_is_idempotent_over_corpus() {
    let options = FormatOptions::default();
    for input in CORPUS {
        let once = crate::format_markdown(input, &options);
        let twice = crate::format_markdown(&once, &options);
        pretty_assertions::assert_eq!(once, twice, "not idempotent for {:?}", input);
    }
}

#[test]
fn format_then_parse_reproduces_the_tree() {
    let options = FormatOptions::default();
    for input in FIDELITY_CORPUS {
        let tree = parse(input);
        let formatted = {
            let mut out = Vec::new();
            crate::md::format_document(&tree, &options, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        };
        let reparsed = parse(&formatted);
        assert!(
            tree.structural_eq(&reparsed),
            "tree changed for {:?}\nformatted: {:?}\nbefore: {:#?}\nafter: {:#?}",
            input,
            formatted,
            tree,
            reparsed
        );
    }
}

/// Inputs whose emphasis boundaries carry no styled whitespace, so the
/// round trip is exact rather than merely whitespace-normalized.
const FIDELITY_CORPUS: &[&str] = &[
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
    "***both*** and plain\n",
];
