use super::*;
use crate::nodes::{ImageFormat, ImageKind, Inline, NodeText, TextStyle};

fn inlines(input: &str) -> Vec<Inline> {
    let mut doc = parse(input);
    doc.children.remove(0).inlines
}

#[test]
fn basic_link() {
    let inl = inlines("[text](https://example.com)\n");
    match &inl[0] {
        Inline::Link(nl) => {
            assert_eq!(nl.url, "https://example.com");
            assert_eq!(nl.label, vec![NodeText::new("text", TextStyle::default())]);
        }
        other => panic!("expected link, got {:?}", other),
    }
}

#[test]
fn link_label_is_inline_parsed() {
    let inl = inlines("[**bold** plain](u)\n");
    match &inl[0] {
        Inline::Link(nl) => {
            assert!(nl.label[0].style.bold);
            assert_eq!(nl.label[0].text, "bold");
            assert!(!nl.label[1].style.bold);
        }
        other => panic!("expected link, got {:?}", other),
    }
}

#[test]
fn surrounding_emphasis_overlays_the_label() {
    let inl = inlines("*a [b](u) c*\n");
    match &inl[1] {
        Inline::Link(nl) => assert!(nl.label[0].style.italic),
        other => panic!("expected link, got {:?}", other),
    }
}

#[test]
fn url_runs_to_matching_paren() {
    let inl = inlines("[x](https://e.com/a(b)c)\n");
    match &inl[0] {
        Inline::Link(nl) => assert_eq!(nl.url, "https://e.com/a(b)c"),
        other => panic!("expected link, got {:?}", other),
    }
}

#[test]
fn unclosed_bracket_is_literal_text() {
    let inl = inlines("[not a link\n");
    match &inl[0] {
        Inline::Text(t) => assert_eq!(t.text, "[not a link"),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn bracket_without_paren_is_literal() {
    let inl = inlines("[label] no url\n");
    match &inl[0] {
        Inline::Text(t) => assert!(t.text.starts_with("[label]")),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn image_kind_and_format() {
    let cases = [
        ("![a](pic.png)", ImageKind::Local, ImageFormat::Png),
        ("![a](pic.JPG)", ImageKind::Local, ImageFormat::Jpeg),
        ("![a](art.jpeg)", ImageKind::Local, ImageFormat::Jpeg),
        ("![a](d/iagram.svg)", ImageKind::Local, ImageFormat::Svg),
        ("![a](file.webp)", ImageKind::Local, ImageFormat::Other),
        (
            "![a](https://x.com/p.png)",
            ImageKind::Web,
            ImageFormat::Png,
        ),
        ("![a](http://x.com/p)", ImageKind::Web, ImageFormat::Other),
    ];
    for (input, kind, format) in cases {
        let inl = inlines(&format!("{}\n", input));
        match &inl[0] {
            Inline::Image(ni) => {
                assert_eq!(ni.kind, kind, "{}", input);
                assert_eq!(ni.format, format, "{}", input);
            }
            other => panic!("expected image for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn bang_without_bracket_is_literal() {
    let inl = inlines("hey!\n");
    match &inl[0] {
        Inline::Text(t) => assert_eq!(t.text, "hey!"),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn autolink() {
    let inl = inlines("<https://example.com/path>\n");
    assert_eq!(
        inl[0],
        Inline::Autolink("https://example.com/path".into())
    );
}

#[test]
fn autolink_requires_scheme() {
    let inl = inlines("<no.scheme.here>\n");
    match &inl[0] {
        Inline::Text(t) => assert!(t.text.starts_with("<")),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn autolink_rejects_spaces() {
    let inl = inlines("<https://a b>\n");
    match &inl[0] {
        Inline::Text(t) => assert!(t.text.starts_with("<")),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn console_link_emits_osc8() {
    let out = ansi("[text](https://e.com)\n", 40);
    assert!(out.contains("\x1b]8;;https://e.com\x1b\\"), "{:?}", out);
    assert!(out.contains("text"));
    assert!(out.contains("\x1b]8;;\x1b\\"));
}

#[test]
fn console_image_shows_alt_and_src() {
    let out = console_plain("![diagram](d.png)\n", 40);
    assert!(out.contains("diagram → d.png"), "{:?}", out);
}

#[test]
fn html_link_and_image() {
    let body = html_body("[a](https://e.com) ![b](c.png)\n");
    assert!(body.contains("<a href=\"https://e.com\">a</a>"));
    assert!(body.contains("<img src=\"c.png\" alt=\"b\" />"));
}
