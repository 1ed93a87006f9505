//! Presentation of directives as typed blocks.
//!
//! Rendering is the first pass of a build: every directive becomes a
//! [`Block`] carrying its fixed attributes and forward relationship rows, and
//! its declared relationships are recorded with the build's
//! [`LinkCollector`].

use std::path::{Path, PathBuf};

use crate::{
    domain::{BlockKind, Config, Identifier, LinkCollector, RenderedBlock},
    storage::{Directive, Fragment, Segment},
};

mod block;
pub use block::{Block, BlockContent, BlockRowsMut, MetadataRow};

mod graphic;
/// HTML output.
pub mod html;
mod item;
mod listing;

/// Everything a directive needs while it is rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    config: &'a Config,
    collector: &'a LinkCollector<'a>,
}

impl<'a> RenderContext<'a> {
    /// A context rendering against the given configuration and recording
    /// relationships with the given collector.
    #[must_use]
    pub const fn new(config: &'a Config, collector: &'a LinkCollector<'a>) -> Self {
        Self { config, collector }
    }
}

/// Renders one directive.
#[must_use]
pub fn render_directive(directive: &Directive, ctx: RenderContext<'_>) -> Block {
    let block = match directive.kind {
        BlockKind::Item => item::render(directive, ctx),
        BlockKind::Graphic => graphic::render(directive, ctx),
        BlockKind::Listing => listing::render(directive, ctx),
    };
    if directive.options.contains_key("id") && block.identifier().is_none() {
        tracing::warn!(line = directive.line, "ignoring blank {} identifier", directive.kind);
    }
    block
}

/// A fragment after the first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    path: PathBuf,
    nodes: Vec<Node>,
}

/// A piece of a rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text outside any directive.
    Text(String),
    /// A rendered directive.
    Block(Block),
}

impl RenderedFragment {
    /// Renders every directive in a fragment, in document order.
    #[must_use]
    pub fn render(fragment: &Fragment, ctx: RenderContext<'_>) -> Self {
        let nodes = fragment
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => Node::Text(text.clone()),
                Segment::Directive(directive) => Node::Block(render_directive(directive, ctx)),
            })
            .collect();

        Self {
            path: fragment.path().to_path_buf(),
            nodes,
        }
    }

    /// The source path, relative to the corpus root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The rendered nodes, in document order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every rendered block, nested ones included, in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        let mut blocks = Vec::new();
        for node in &self.nodes {
            if let Node::Block(block) = node {
                collect_blocks(block, &mut blocks);
            }
        }
        blocks.into_iter()
    }

    /// The metadata rows of every block, nested ones included, in document
    /// order.
    pub fn block_rows_mut(&mut self) -> Vec<BlockRowsMut<'_>> {
        let mut rows = Vec::new();
        collect_rows(&mut self.nodes, &mut rows);
        rows
    }
}

fn collect_blocks<'a>(block: &'a Block, blocks: &mut Vec<&'a Block>) {
    blocks.push(block);
    for child in block.children() {
        collect_blocks(child, blocks);
    }
}

fn collect_rows<'a>(nodes: &'a mut [Node], rows: &mut Vec<BlockRowsMut<'a>>) {
    for node in nodes {
        if let Node::Block(block) = node {
            let (block_rows, nested) = block.split_rows_mut();
            rows.push(block_rows);
            collect_rows(nested, rows);
        }
    }
}

/// The identifier declared by a directive's `:id:` option.
fn declared_identifier(directive: &Directive) -> Option<Identifier> {
    directive.option("id").and_then(|id| Identifier::new(id).ok())
}

/// Pushes the `ID` row, if the block has an identifier.
fn push_id_row(block: &mut Block) {
    if let Some(id) = block.identifier() {
        let row = MetadataRow::new("ID", id.as_str()).with_class("rigr-id");
        block.push_row(row);
    }
}

/// Records the directive's relationships and pushes one forward row per
/// declared relationship kind.
fn push_forward_rows(block: &mut Block, directive: &Directive, ctx: RenderContext<'_>) {
    let record = ctx.collector.record(block.identifier(), &directive.options);
    let schema = ctx.collector.schema();
    for (key, targets) in record.iter() {
        let value = targets
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        block.push_row(MetadataRow::new(schema.forward_label(key), value));
    }
}

/// Content lines as free text, if there are any.
fn text_content(directive: &Directive) -> Option<BlockContent> {
    if directive.content.is_empty() {
        None
    } else {
        Some(BlockContent::Text(directive.content_text()))
    }
}

/// The directive's body. Nested directives are rendered in turn, so their
/// relationships are recorded after those of the enclosing block.
fn body_content(directive: &Directive, ctx: RenderContext<'_>) -> Option<BlockContent> {
    if !directive.has_nested_directives() {
        return text_content(directive);
    }
    let nodes = directive
        .body
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => Node::Text(text.clone()),
            Segment::Directive(nested) => Node::Block(render_directive(nested, ctx)),
        })
        .collect();
    Some(BlockContent::Body(nodes))
}
