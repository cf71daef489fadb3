use super::*;
use crate::nodes::{Color, TextStyle};

#[test]
fn bold_text_yields_one_range() {
    let (text, ranges) = ranges_of("a **b** c\n", 40);
    assert_eq!(text, "a b c\n");
    assert_eq!(ranges.len(), 1);
    let r = &ranges[0];
    assert_eq!(r.line, 0);
    assert_eq!((r.start, r.end), (1, 3));
    assert!(r.style.bold);
    assert_eq!(&text.lines().next().unwrap()[r.start..r.end], " b");
}

#[test]
fn plain_text_yields_no_ranges() {
    let (text, ranges) = ranges_of("just words\n", 40);
    assert_eq!(text, "just words\n");
    assert!(ranges.is_empty());
}

#[test]
fn line_numbers_count_emitted_breaks() {
    let (text, ranges) = ranges_of("# head\n\n**b**\n", 40);
    let lines: Vec<&str> = text.lines().collect();
    // Heading on line 0, blank line 1, bold paragraph on line 2.
    assert!(lines[0].starts_with("# head"));
    assert!(ranges.iter().any(|r| r.line == 0));
    assert!(ranges.iter().any(|r| r.line == 2 && r.style.bold));
}

#[test]
fn offsets_are_bytes_not_chars() {
    let (text, ranges) = ranges_of("é **b**\n", 40);
    assert_eq!(text, "é b\n");
    let r = ranges.iter().find(|r| r.style.bold).unwrap();
    // "é" is two bytes; the bold range starts after "é" (2) at the
    // separating space.
    assert_eq!((r.start, r.end), (2, 4));
}

#[test]
fn ranges_stay_inside_their_lines() {
    for input in CORPUS {
        let (text, ranges) = ranges_of(input, 40);
        let lines: Vec<&str> = text.split('\n').collect();
        for r in &ranges {
            assert!(r.line < lines.len(), "line out of bounds for {:?}", input);
            let line = lines[r.line];
            assert!(
                r.start < r.end && r.end <= line.len(),
                "bad range {:?} on line {:?} for input {:?}",
                (r.start, r.end),
                line,
                input
            );
        }
    }
}

#[test]
fn ranges_do_not_overlap_on_a_line() {
    for input in CORPUS {
        let (_, ranges) = ranges_of(input, 40);
        for pair in ranges.windows(2) {
            if pair[0].line == pair[1].line {
                assert!(
                    pair[0].end <= pair[1].start,
                    "overlap: {:?} for {:?}",
                    pair,
                    input
                );
            }
        }
    }
}

#[test]
fn quote_leader_is_a_styled_range() {
    let (text, ranges) = ranges_of("> x\n", 40);
    assert_eq!(text, "┃ x\n");
    let r = &ranges[0];
    assert_eq!(r.start, 0);
    assert_eq!(r.end, "┃ ".len());
    assert_eq!(r.style, TextStyle::fg(Color::White));
}

#[test]
fn table_cell_styles_are_relocated_past_the_border() {
    let (text, ranges) = ranges_of("| **x** | y |\n|---|---|\n", 21);
    let lines: Vec<&str> = text.lines().collect();
    // Header cells render bold; their ranges sit inside the bordered row.
    let row_line = 1;
    let bold: Vec<_> = ranges
        .iter()
        .filter(|r| r.line == row_line && r.style.bold)
        .collect();
    assert!(!bold.is_empty(), "no bold ranges in {:?}", ranges);
    for r in &bold {
        assert!(r.start >= "│".len(), "range not shifted: {:?}", r);
        let slice = &lines[row_line][r.start..r.end];
        assert!(!slice.contains('│'), "range covers the border: {:?}", slice);
    }
}

#[test]
fn images_appear_as_text_only() {
    let (text, ranges) = ranges_of("![alt](a.png)\n", 40);
    assert_eq!(text, "alt → a.png\n");
    assert!(!ranges.is_empty());
}

#[test]
fn code_block_body_is_muted_without_provider() {
    let (text, ranges) = ranges_of("```\nxyz\n```\n", 40);
    assert!(text.contains("│ xyz"));
    assert!(ranges
        .iter()
        .any(|r| r.style == TextStyle::fg(Color::BrightBlack)));
}
