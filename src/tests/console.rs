use super::*;

/// Lines of the plain (color-free) console rendering.
fn plain_lines(input: &str, width: usize) -> Vec<String> {
    console_plain(input, width)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn h1_fills_with_double_rules() {
    let lines = plain_lines("# Hi\n", 20);
    assert_eq!(lines, vec![format!("# Hi {}", "═".repeat(15))]);
}

#[test]
fn h2_fills_with_single_rules() {
    let lines = plain_lines("## Hi\n", 20);
    assert_eq!(lines, vec![format!("## Hi {}", "─".repeat(14))]);
}

#[test]
fn h3_has_no_rule() {
    let lines = plain_lines("### Hi\n", 20);
    assert_eq!(lines, vec!["### Hi".to_string()]);
}

#[test]
fn heading_styles() {
    // H1 blue bold; H2 green bold; H3 bold italic underline; H4 underline.
    assert!(ansi("# x\n", 30).contains("\x1b[1;34m"));
    assert!(ansi("## x\n", 30).contains("\x1b[1;32m"));
    assert!(ansi("### x\n", 30).contains("\x1b[1;3;4;37m"));
    assert!(ansi("#### x\n", 30).contains("\x1b[4;37m"));
}

#[test]
fn paragraphs_separated_by_one_blank_line() {
    let lines = plain_lines("a\n\nb\n", 20);
    assert_eq!(lines, vec!["a", "", "b"]);
}

#[test]
fn quote_leader_on_every_line() {
    let lines = plain_lines("> aaa bbb ccc ddd\n", 10);
    assert!(lines.len() > 1);
    for line in &lines {
        assert!(line.starts_with("┃ "), "line {:?}", line);
    }
}

#[test]
fn quote_leader_is_white() {
    assert!(ansi("> x\n", 20).contains("\x1b[37m┃ "));
}

#[test]
fn unordered_marker_and_indent() {
    let lines = plain_lines("- aaa\n- bbb\n", 20);
    assert_eq!(lines, vec!["  ‣ aaa", "  ‣ bbb"]);
}

#[test]
fn unordered_marker_is_blue_bold() {
    assert!(ansi("- x\n", 20).contains("\x1b[1;34m‣ "));
}

#[test]
fn wrapped_item_content_aligns_under_marker() {
    let lines = plain_lines("- aaa bbb ccc\n", 9);
    assert_eq!(lines[0], "  ‣ aaa");
    for cont in &lines[1..] {
        assert!(cont.starts_with("    "), "line {:?}", cont);
    }
}

#[test]
fn ordered_list_renumbers_from_start() {
    let lines = plain_lines("10. a\n77. b\n12. c\n", 20);
    assert_eq!(lines, vec!["  10. a", "  11. b", "  12. c"]);
}

#[test]
fn ordered_start_ten_uses_six_column_leader() {
    let lines = plain_lines("10. aaaa bbbb\n", 12);
    assert_eq!(lines[0], "  10. aaaa");
    assert_eq!(lines[1], "      bbbb");
    assert_eq!(lines[1].find("bbbb"), Some(6));
}

#[test]
fn task_markers_and_colors() {
    let lines = plain_lines("- [x] done\n- [ ] todo\n", 20);
    assert_eq!(lines, vec!["  ☑ done", "  ☐ todo"]);
    let styled = ansi("- [x] done\n- [ ] todo\n", 20);
    assert!(styled.contains("\x1b[32m☑ "));
    assert!(styled.contains("\x1b[31m☐ "));
}

#[test]
fn loose_list_gets_blank_lines_between_items() {
    let lines = plain_lines("- a\n\n- b\n", 20);
    assert_eq!(lines, vec!["  ‣ a", "", "  ‣ b"]);
}

#[test]
fn codespan_is_cyan() {
    assert!(ansi("a `b` c\n", 20).contains("\x1b[36mb"));
}

#[test]
fn strike_and_underline_codes() {
    assert!(ansi("~x~\n", 20).contains("\x1b[9mx"));
}

#[test]
fn hard_break_starts_a_new_line() {
    let lines = plain_lines("one  \ntwo\n", 20);
    assert_eq!(lines, vec!["one", "two"]);
}

#[test]
fn no_color_output_has_no_escapes() {
    for input in CORPUS {
        let out = console_plain(input, 60);
        assert!(!out.contains('\x1b'), "escape leaked for {:?}", input);
    }
}

#[test]
fn styles_reset_at_line_end() {
    let out = ansi("**bold**\n", 20);
    assert!(out.ends_with("\x1b[0m\n"), "output was {:?}", out);
}

#[test]
fn width_invariant_over_corpus() {
    for input in CORPUS {
        for width in [30, 45, 72] {
            let out = console_plain(input, width);
            for line in out.lines() {
                assert!(
                    cp(line) <= width,
                    "line {:?} wider than {} for {:?}",
                    line,
                    width,
                    input
                );
            }
        }
    }
}

#[test]
fn indent_adds_left_margin() {
    let options = crate::ConsoleOptions {
        width: 20,
        indent: 4,
        colors: false,
        ..crate::ConsoleOptions::default()
    };
    let out = crate::markdown_to_ansi("hello\n", &options);
    assert_eq!(out, "    hello\n");
}

#[test]
fn toc_directive_renders_heading_links() {
    let out = console_plain("# One\n\n## Two\n\n```{toc}\n```\n", 40);
    assert!(out.contains("TOC"), "{}", out);
    assert!(out.contains("‣ One"));
    assert!(out.contains("‣ Two"));
}

#[test]
fn toc_links_point_at_anchors() {
    let out = ansi("# My Title\n\n```{toc}\n```\n", 40);
    assert!(out.contains("\x1b]8;;#my-title\x1b\\"), "{:?}", out);
}
