use super::*;
use crate::nodes::{BlockValue, ListKind};

fn as_list(block: &crate::nodes::Block) -> (&crate::nodes::NodeList, Vec<&crate::nodes::Block>) {
    match &block.value {
        BlockValue::List(nl) => (
            nl,
            block
                .children
                .iter()
                .filter(|c| matches!(c.value, BlockValue::Item(..)))
                .collect(),
        ),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn unordered_list_basics() {
    let doc = parse("- one\n- two\n");
    let (nl, items) = as_list(&doc.children[0]);
    assert_eq!(nl.kind, ListKind::Unordered);
    assert_eq!(nl.bullet_char, b'-');
    assert_eq!(nl.spacing, 0);
    assert_eq!(items.len(), 2);
}

#[test]
fn ordered_list_keeps_start() {
    let doc = parse("7. seven\n8. eight\n");
    let (nl, items) = as_list(&doc.children[0]);
    assert_eq!(nl.kind, ListKind::Ordered);
    assert_eq!(nl.start, 7);
    assert_eq!(items.len(), 2);
}

#[test]
fn paren_delimiter_is_ordered_too() {
    let doc = parse("3) three\n");
    let (nl, _) = as_list(&doc.children[0]);
    assert_eq!(nl.kind, ListKind::Ordered);
    assert_eq!(nl.start, 3);
}

#[test]
fn task_list_checkboxes() {
    let doc = parse("- [x] done\n- [ ] todo\n- [X] also done\n");
    let (nl, items) = as_list(&doc.children[0]);
    assert_eq!(nl.kind, ListKind::Task);
    let checked: Vec<bool> = items
        .iter()
        .map(|i| match i.value {
            BlockValue::Item(ni) => ni.checked,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(checked, vec![true, false, true]);
}

#[test]
fn different_bullets_do_not_merge() {
    let doc = parse("- a\n* b\n");
    let lists: Vec<_> = doc
        .children
        .iter()
        .filter(|b| matches!(b.value, BlockValue::List(..)))
        .collect();
    assert_eq!(lists.len(), 2);
}

#[test]
fn kind_change_starts_a_new_list() {
    let doc = parse("- a\n1. b\n");
    let lists: Vec<_> = doc
        .children
        .iter()
        .filter(|b| matches!(b.value, BlockValue::List(..)))
        .collect();
    assert_eq!(lists.len(), 2);
}

#[test]
fn task_and_plain_bullets_do_not_merge() {
    let doc = parse("- plain\n- [ ] task\n");
    let lists: Vec<_> = doc
        .children
        .iter()
        .filter(|b| matches!(b.value, BlockValue::List(..)))
        .collect();
    assert_eq!(lists.len(), 2);
}

#[test]
fn continuation_line_joins_item_paragraph() {
    let doc = parse("- one\n  two\n");
    let (_, items) = as_list(&doc.children[0]);
    assert_eq!(items.len(), 1);
    let para = &items[0].children[0];
    assert_eq!(para.inlines.len(), 1);
    match &para.inlines[0] {
        crate::nodes::Inline::Text(t) => assert_eq!(t.text, "one two"),
        other => panic!("unexpected inline {:?}", other),
    }
}

#[test]
fn dedent_closes_the_item() {
    let doc = parse("- one\ntwo\n");
    assert!(matches!(doc.children[0].value, BlockValue::List(..)));
    assert!(matches!(doc.children[1].value, BlockValue::Paragraph));
}

#[test]
fn nested_list_shape_from_varying_indents() {
    // "- one" and " - two" are siblings; "  - three" and "   - four" form
    // one nested list under "two".
    let doc = parse("- one\n - two\n  - three\n   - four\n");
    let (_, items) = as_list(&doc.children[0]);
    assert_eq!(items.len(), 2);

    let two = items[1];
    let sublists: Vec<_> = two
        .children
        .iter()
        .filter(|c| matches!(c.value, BlockValue::List(..)))
        .collect();
    assert_eq!(sublists.len(), 1);
    let (_, sub_items) = as_list(sublists[0]);
    assert_eq!(sub_items.len(), 2);
}

#[test]
fn blank_between_items_makes_list_loose() {
    let doc = parse("- a\n\n- b\n");
    let (nl, items) = as_list(&doc.children[0]);
    assert_eq!(items.len(), 2);
    assert_eq!(nl.spacing, 1);
}

#[test]
fn trailing_blank_keeps_list_tight() {
    let doc = parse("- a\n- b\n\npara\n");
    let (nl, _) = as_list(&doc.children[0]);
    assert_eq!(nl.spacing, 0);
}

#[test]
fn blank_inside_item_then_new_item_is_loose() {
    let doc = parse("- a\n\n  more\n- b\n");
    let (nl, items) = as_list(&doc.children[0]);
    assert_eq!(items.len(), 2);
    assert_eq!(nl.spacing, 1);
    // "more" stayed inside the first item.
    assert!(items[0].children.len() >= 2);
}

#[test]
fn list_inside_quote() {
    let q = &parse("> - a\n> - b\n").children[0];
    assert!(matches!(q.value, BlockValue::Quote));
    let (_, items) = as_list(&q.children[0]);
    assert_eq!(items.len(), 2);
}
