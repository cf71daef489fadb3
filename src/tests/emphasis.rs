use super::*;
use crate::nodes::{Inline, NodeText, TextStyle};

fn inlines(input: &str) -> Vec<Inline> {
    let mut doc = parse(input);
    let para = doc.children.remove(0);
    para.inlines
}

fn text(t: &str, f: impl FnOnce(TextStyle) -> TextStyle) -> Inline {
    Inline::Text(NodeText::new(t, f(TextStyle::default())))
}

fn plain(t: &str) -> Inline {
    Inline::Text(NodeText::new(t, TextStyle::default()))
}

#[test]
fn single_star_is_italic() {
    assert_eq!(inlines("*word*\n"), vec![text("word", |s| s.italic())]);
}

#[test]
fn single_underscore_is_italic() {
    assert_eq!(inlines("_word_\n"), vec![text("word", |s| s.italic())]);
}

#[test]
fn double_star_is_bold() {
    assert_eq!(inlines("**word**\n"), vec![text("word", |s| s.bold())]);
}

#[test]
fn tilde_is_strike() {
    assert_eq!(
        inlines("~word~\n"),
        vec![Inline::Text(NodeText::new(
            "word",
            TextStyle {
                strike: true,
                ..TextStyle::default()
            }
        ))]
    );
}

#[test]
fn triple_star_is_bold_italic() {
    assert_eq!(
        inlines("***word***\n"),
        vec![text("word", |s| s.bold().italic())]
    );
}

#[test]
fn styles_nest_and_combine() {
    assert_eq!(
        inlines("**a _b_ c**\n"),
        vec![
            text("a ", |s| s.bold()),
            text("b", |s| s.bold().italic()),
            text(" c", |s| s.bold()),
        ]
    );
}

#[test]
fn unmatched_delimiters_are_literal() {
    assert_eq!(inlines("a ** b\n"), vec![plain("a ** b")]);
    assert_eq!(inlines("*open\n"), vec![plain("*open")]);
}

#[test]
fn spaced_stars_do_not_emphasize() {
    assert_eq!(inlines("a * b * c\n"), vec![plain("a * b * c")]);
}

#[test]
fn mixed_length_runs_split() {
    // The closer's remaining length keeps closing the nearest opener.
    assert_eq!(
        inlines("***a** b*\n"),
        vec![
            text("a", |s| s.bold().italic()),
            text(" b", |s| s.italic()),
        ]
    );
}

#[test]
fn codespan_is_verbatim() {
    assert_eq!(
        inlines("`**not bold**`\n"),
        vec![Inline::CodeSpan("**not bold**".into())]
    );
}

#[test]
fn codespan_backtick_counts_must_match() {
    assert_eq!(
        inlines("``a `b` c``\n"),
        vec![Inline::CodeSpan("a `b` c".into())]
    );
}

#[test]
fn unclosed_backtick_is_literal() {
    assert_eq!(inlines("a `b\n"), vec![plain("a `b")]);
}

#[test]
fn soft_break_folds_to_space() {
    assert_eq!(inlines("one\ntwo\n"), vec![plain("one two")]);
}

#[test]
fn hard_break_needs_two_trailing_spaces() {
    assert_eq!(
        inlines("one  \ntwo\n"),
        vec![plain("one"), Inline::LineBreak, plain("two")]
    );
    assert_eq!(inlines("one \ntwo\n"), vec![plain("one two")]);
}

#[test]
fn interior_whitespace_collapses() {
    assert_eq!(inlines("a   b\n"), vec![plain("a b")]);
}

#[test]
fn emphasis_spans_soft_breaks() {
    assert_eq!(
        inlines("*one\ntwo*\n"),
        vec![text("one two", |s| s.italic())]
    );
}
