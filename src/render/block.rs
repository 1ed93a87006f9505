use crate::{
    domain::{BlockKind, Identifier, RenderedBlock},
    render::Node,
};

/// A rendered item, graphic, or listing.
///
/// Pass one produces the block with its fixed attributes and forward
/// relationship rows; pass two may append inverse relationship rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    identifier: Option<Identifier>,
    title: Option<String>,
    classes: Vec<String>,
    rows: Vec<MetadataRow>,
    content: Option<BlockContent>,
    caption: Option<String>,
}

/// One row of a block's metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    /// The field name, e.g. `Status`.
    pub label: String,
    /// The field value.
    pub value: String,
    /// Classes applied to the value.
    pub classes: Vec<String>,
    /// Inline style applied to the value.
    pub style: Option<String>,
}

impl MetadataRow {
    /// A plain row with no styling.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            classes: Vec::new(),
            style: None,
        }
    }

    /// Adds a class to the value.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets the inline style of the value.
    #[must_use]
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }
}

/// The main content of a block, shown below its metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    /// Free text, rendered as paragraphs.
    Text(String),
    /// Text interleaved with nested blocks, in document order.
    Body(Vec<Node>),
    /// An image file, rendered full-width and clickable.
    Image {
        /// Path of the image, relative to the output.
        file: String,
        /// Alternative text.
        alt: String,
        /// Scale in percent, as written in the source.
        scale: Option<String>,
    },
    /// A `PlantUML` diagram source.
    Uml(String),
    /// A source code listing.
    Code {
        /// Highlighting language.
        language: String,
        /// The code itself.
        code: String,
    },
}

impl Block {
    /// An empty block of the given kind.
    #[must_use]
    pub const fn new(kind: BlockKind, identifier: Option<Identifier>) -> Self {
        Self {
            kind,
            identifier,
            title: None,
            classes: Vec::new(),
            rows: Vec::new(),
            content: None,
            caption: None,
        }
    }

    /// Sets the title shown as the block's header.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Adds a container class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets the block's content.
    #[must_use]
    pub fn with_content(mut self, content: Option<BlockContent>) -> Self {
        self.content = content;
        self
    }

    /// Sets the caption shown below the content.
    #[must_use]
    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    /// Appends a row to the metadata table.
    pub fn push_row(&mut self, row: MetadataRow) {
        self.rows.push(row);
    }

    /// The HTML anchor of this block, if it has an identifier.
    #[must_use]
    pub fn anchor(&self) -> Option<String> {
        self.identifier.as_ref().map(|id| self.kind.anchor(id))
    }

    /// The block's title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The container classes.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The metadata rows, in display order.
    #[must_use]
    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    /// Looks up the value of the first row with the given label.
    #[must_use]
    pub fn row_value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    /// The block's content.
    #[must_use]
    pub const fn content(&self) -> Option<&BlockContent> {
        self.content.as_ref()
    }

    /// The caption.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// The blocks nested directly in this block's body.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        let nodes: &[Node] = match &self.content {
            Some(BlockContent::Body(nodes)) => nodes.as_slice(),
            _ => &[],
        };
        nodes.iter().filter_map(|node| match node {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        })
    }

    /// Splits the block into a handle on its metadata rows and its nested
    /// nodes, so both can be borrowed mutably at once.
    pub fn split_rows_mut(&mut self) -> (BlockRowsMut<'_>, &mut [Node]) {
        let nested: &mut [Node] = match &mut self.content {
            Some(BlockContent::Body(nodes)) => nodes.as_mut_slice(),
            _ => &mut [],
        };
        let rows = BlockRowsMut {
            kind: self.kind,
            identifier: self.identifier.as_ref(),
            rows: &mut self.rows,
        };
        (rows, nested)
    }
}

/// Mutable access to one block's metadata rows, without its nested blocks.
#[derive(Debug)]
pub struct BlockRowsMut<'a> {
    kind: BlockKind,
    identifier: Option<&'a Identifier>,
    rows: &'a mut Vec<MetadataRow>,
}

impl RenderedBlock for BlockRowsMut<'_> {
    fn identifier(&self) -> Option<&Identifier> {
        self.identifier
    }

    fn kind(&self) -> BlockKind {
        self.kind
    }

    fn append_metadata_row(&mut self, label: String, value: String) {
        self.rows.push(MetadataRow::new(label, value));
    }
}

impl RenderedBlock for Block {
    fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    fn kind(&self) -> BlockKind {
        self.kind
    }

    fn append_metadata_row(&mut self, label: String, value: String) {
        self.rows.push(MetadataRow::new(label, value));
    }
}
