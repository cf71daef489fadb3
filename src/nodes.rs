//! The document tree.

/// The core block enum. A document is a tree of [`Block`]s; each block is
/// either a **container** (owns child blocks) or a **leaf** (owns inline
/// phrasing content, or verbatim text for code).
#[derive(Debug, Clone, PartialEq)]
pub enum BlockValue {
    /// The root of every document. Container.
    Document,

    /// A block quote (`> ...`). Container; may hold any block.
    Quote,

    /// A list. Container; holds only [`BlockValue::Item`]s.
    List(NodeList),

    /// A list item. Container; may hold any block.
    Item(NodeItem),

    /// A table. Container; its children are the cells in row-major order,
    /// each a [`BlockValue::Paragraph`] leaf. The header row comes first and
    /// `children.len() == ncol * nrow` always holds; short rows are padded
    /// with empty cells at parse time and long rows truncated.
    Table(NodeTable),

    /// A paragraph. Leaf with inline content.
    Paragraph,

    /// An ATX heading (`#` through `######`). Leaf with inline content;
    /// also carries a flat copy of its text for anchor generation.
    Heading(NodeHeading),

    /// A fenced code block. Leaf; the body is verbatim and never holds
    /// inlines.
    Code(NodeCode),

    /// A GitHub-style admonition (`> [!NOTE]`). Leaf with inline content.
    Alert(NodeAlert),

    /// A blank-line boundary between sibling blocks. Leaf; renders nothing.
    Break,
}

/// The metadata of a list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeList {
    /// The kind of list.
    pub kind: ListKind,

    /// For ordered lists, the ordinal of the first item.
    pub start: usize,

    /// 0 for a tight list; >= 1 for a loose one, counting the blank lines
    /// rendered between items.
    pub spacing: usize,

    /// For unordered and task lists, the bullet character used (`-`, `+` or
    /// `*`). A different bullet starts a new list rather than merging.
    pub bullet_char: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    #[default]
    Unordered,
    Ordered,
    Task,
}

/// The metadata of a list item.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeItem {
    /// Only meaningful when the parent list is [`ListKind::Task`].
    pub checked: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeTable {
    /// Column count, fixed by the header row.
    pub ncol: usize,
}

/// The metadata of a heading.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeHeading {
    /// 1 through 6.
    pub level: u8,

    /// Flat text of the heading, whitespace-normalized. This is what anchor
    /// ids and the table of contents are derived from; the styled rendering
    /// comes from the block's inlines instead.
    pub text: String,
}

/// The metadata and body of a fenced code block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeCode {
    /// The opening fence, verbatim (e.g. ```` ``` ```` or `~~~~`).
    pub opener: String,

    /// The info string after the fence, if any (e.g. `c++`).
    pub tag: Option<String>,

    /// A `{label}` directive in place of an info string, braces stripped
    /// (e.g. `warning`, `toc`).
    pub directive: Option<String>,

    /// The literal body, interior newlines included.
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeAlert {
    /// The label inside `[!LABEL]`, case preserved.
    pub label: String,
}

/// Inline phrasing content inside a leaf block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A styled run of text.
    Text(NodeText),

    /// `[label](url)`.
    Link(NodeLink),

    /// `<scheme://...>`; the URL labels itself.
    Autolink(String),

    /// `![alt](src)`.
    Image(NodeImage),

    /// A backtick code span, verbatim.
    CodeSpan(String),

    /// A hard line break (two trailing spaces before a newline).
    LineBreak,
}

/// A run of text with the styles that were active where it appeared.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeText {
    pub text: String,
    pub style: TextStyle,
}

impl NodeText {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        NodeText {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLink {
    pub url: String,
    /// The visible label as styled runs.
    pub label: Vec<NodeText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeImage {
    pub src: String,
    pub alt: Vec<NodeText>,
    pub kind: ImageKind,
    pub format: ImageFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// A path, resolved against the renderer's root directory.
    Local,
    /// An `http://` or `https://` source.
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
    Other,
}

impl ImageFormat {
    /// Infer a format from the final extension of a source path.
    pub fn from_src(src: &str) -> ImageFormat {
        let ext = src.rsplit('.').next().unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "svg" => ImageFormat::Svg,
            _ => ImageFormat::Other,
        }
    }
}

/// Style flags and colors carried by text runs and applied by renderers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl TextStyle {
    pub fn is_default(&self) -> bool {
        *self == TextStyle::default()
    }

    pub fn fg(color: Color) -> TextStyle {
        TextStyle {
            fg: Some(color),
            ..TextStyle::default()
        }
    }

    pub fn bold(mut self) -> TextStyle {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> TextStyle {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> TextStyle {
        self.underline = true;
        self
    }
}

/// The semantic palette. Each renderer maps these onto its own output
/// (ANSI SGR codes, CSS colors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// A single node in the document tree.
///
/// `children` is populated only for containers, `inlines` only for leaves
/// that accept phrasing content; [`Block::container`] and
/// [`BlockValue::accepts_inlines`] tell them apart. The parser maintains
/// both invariants; renderers rely on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub value: BlockValue,
    pub children: Vec<Block>,
    pub inlines: Vec<Inline>,
    /// Column where the block's first line began.
    pub start_col: usize,
    /// Whether the block can still absorb lines. Meaningful during parsing
    /// only; every block in a finished tree is closed.
    pub open: bool,
}

impl Block {
    pub fn new(value: BlockValue, start_col: usize) -> Block {
        Block {
            value,
            children: Vec::new(),
            inlines: Vec::new(),
            start_col,
            open: true,
        }
    }

    /// Whether this block owns child blocks rather than inlines.
    pub fn container(&self) -> bool {
        self.value.container()
    }

    /// Structural equality, ignoring token provenance columns and the
    /// blank-line [`BlockValue::Break`] markers (which carry no content).
    pub fn structural_eq(&self, other: &Block) -> bool {
        let mine: Vec<&Block> = self
            .children
            .iter()
            .filter(|c| !matches!(c.value, BlockValue::Break))
            .collect();
        let theirs: Vec<&Block> = other
            .children
            .iter()
            .filter(|c| !matches!(c.value, BlockValue::Break))
            .collect();
        self.value == other.value
            && self.inlines == other.inlines
            && mine.len() == theirs.len()
            && mine.iter().zip(&theirs).all(|(a, b)| a.structural_eq(b))
    }
}

impl BlockValue {
    pub fn container(&self) -> bool {
        matches!(
            *self,
            BlockValue::Document
                | BlockValue::Quote
                | BlockValue::List(..)
                | BlockValue::Item(..)
                | BlockValue::Table(..)
        )
    }

    /// Whether a leaf of this kind accumulates raw lines while open.
    pub fn accepts_lines(&self) -> bool {
        matches!(
            *self,
            BlockValue::Paragraph
                | BlockValue::Heading(..)
                | BlockValue::Code(..)
                | BlockValue::Alert(..)
        )
    }

    /// Whether a leaf of this kind holds inline content after parsing.
    pub fn accepts_inlines(&self) -> bool {
        matches!(
            *self,
            BlockValue::Paragraph | BlockValue::Heading(..) | BlockValue::Alert(..)
        )
    }

    /// Whether a container of this kind may adopt `child`.
    pub fn can_contain(&self, child: &BlockValue) -> bool {
        if let BlockValue::Document = *child {
            return false;
        }

        match *self {
            BlockValue::Document | BlockValue::Quote | BlockValue::Item(..) => {
                !matches!(*child, BlockValue::Item(..))
            }
            BlockValue::List(..) => matches!(*child, BlockValue::Item(..)),
            BlockValue::Table(..) => matches!(*child, BlockValue::Paragraph),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment() {
        let list = BlockValue::List(NodeList::default());
        let item = BlockValue::Item(NodeItem::default());
        assert!(list.can_contain(&item));
        assert!(!list.can_contain(&BlockValue::Paragraph));
        assert!(BlockValue::Document.can_contain(&BlockValue::Quote));
        assert!(!BlockValue::Document.can_contain(&item));
        assert!(!BlockValue::Quote.can_contain(&BlockValue::Document));
    }

    #[test]
    fn structural_eq_ignores_columns() {
        let mut a = Block::new(BlockValue::Paragraph, 0);
        let mut b = Block::new(BlockValue::Paragraph, 4);
        a.inlines
            .push(Inline::Text(NodeText::new("x", TextStyle::default())));
        b.inlines
            .push(Inline::Text(NodeText::new("x", TextStyle::default())));
        assert!(a.structural_eq(&b));
    }

    #[test]
    fn image_formats() {
        assert_eq!(ImageFormat::from_src("a/b.PNG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_src("x.jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_src("logo.svg"), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_src("noext"), ImageFormat::Other);
    }
}
