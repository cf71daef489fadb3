//! Table-of-contents generation.
//!
//! Walks the document in order, collects every heading, and builds a
//! nested list of links to the heading anchors. The `{toc}` directive is
//! replaced by this list at render time; the generated subtree is fresh
//! and owns all of its memory.

use rustc_hash::FxHashSet;

use crate::nodes::{
    Block, BlockValue, Inline, NodeItem, NodeLink, NodeList, NodeText, TextStyle,
};
use crate::strings;

/// Converts heading text to unique, still human-readable anchor ids.
///
/// Tracks every id it has handed out; use one per output document so
/// repeated headings get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Anchorizer(FxHashSet<String>);

impl Anchorizer {
    pub fn new() -> Self {
        Anchorizer(FxHashSet::default())
    }

    /// Anchor id for one heading: lowercased, spaces to `-`, plus a
    /// numeric suffix on collision.
    pub fn anchorize(&mut self, header: &str) -> String {
        let id = strings::anchor_id(header);
        let mut uniq = 0;
        let id = loop {
            let candidate = if uniq == 0 {
                id.clone()
            } else {
                format!("{}-{}", id, uniq)
            };
            if !self.0.contains(&candidate) {
                break candidate;
            }
            uniq += 1;
        };
        self.0.insert(id.clone());
        id
    }
}

/// Collect `(level, text)` for every heading, in document order.
pub fn headings(root: &Block) -> Vec<(u8, String)> {
    let mut out = Vec::new();
    collect(root, &mut out);
    out
}

fn collect(block: &Block, out: &mut Vec<(u8, String)>) {
    if let BlockValue::Heading(nh) = &block.value {
        out.push((nh.level, nh.text.clone()));
    }
    for child in &block.children {
        collect(child, out);
    }
}

/// Build the table-of-contents list for a document. `None` when there are
/// no headings.
pub fn generate(root: &Block) -> Option<Block> {
    let hs = headings(root);
    if hs.is_empty() {
        return None;
    }

    let mut anchorizer = Anchorizer::new();
    let entries: Vec<(u8, String, String)> = hs
        .into_iter()
        .map(|(level, text)| {
            let id = anchorizer.anchorize(&text);
            (level, text, id)
        })
        .collect();

    let mut pos = 0;
    let list = build_level(&entries, &mut pos, entries[0].0);
    Some(list)
}

fn build_level(entries: &[(u8, String, String)], pos: &mut usize, level: u8) -> Block {
    let mut list = Block::new(
        BlockValue::List(NodeList {
            kind: crate::nodes::ListKind::Unordered,
            start: 1,
            spacing: 0,
            bullet_char: b'-',
        }),
        0,
    );
    list.open = false;

    while *pos < entries.len() {
        let (hl, _, _) = &entries[*pos];
        if *hl < level {
            break;
        }
        if *hl > level {
            // Deeper heading: nest a sublist into the most recent item,
            // synthesizing an empty item when the document skips levels.
            let sub_level = *hl;
            let sub = build_level(entries, pos, sub_level);
            if list.children.is_empty() {
                let mut item = Block::new(BlockValue::Item(NodeItem::default()), 0);
                item.open = false;
                list.children.push(item);
            }
            list.children.last_mut().unwrap().children.push(sub);
            continue;
        }

        let (_, text, id) = &entries[*pos];
        *pos += 1;

        let mut para = Block::new(BlockValue::Paragraph, 0);
        para.open = false;
        para.inlines.push(Inline::Link(NodeLink {
            url: format!("#{}", id),
            label: vec![NodeText::new(text.clone(), TextStyle::default())],
        }));

        let mut item = Block::new(BlockValue::Item(NodeItem::default()), 0);
        item.open = false;
        item.children.push(para);
        list.children.push(item);
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_uniqueness() {
        let mut a = Anchorizer::new();
        assert_eq!(a.anchorize("Stuff"), "stuff");
        assert_eq!(a.anchorize("Stuff"), "stuff-1");
        assert_eq!(a.anchorize("Stuff"), "stuff-2");
    }

    #[test]
    fn nested_toc_shape() {
        let doc = crate::parser::parse("# a\n\n## b\n\n## c\n\n# d\n");
        let toc = generate(&doc).unwrap();
        // Two top-level items: "a" (with a sublist) and "d".
        assert_eq!(toc.children.len(), 2);
        let first = &toc.children[0];
        assert_eq!(first.children.len(), 2); // paragraph + sublist
        assert!(matches!(first.children[1].value, BlockValue::List(..)));
    }

    #[test]
    fn empty_document_has_no_toc() {
        let doc = crate::parser::parse("just text\n");
        assert!(generate(&doc).is_none());
    }
}
