use crate::{
    domain::BlockKind,
    render::{
        Block, BlockContent, RenderContext, body_content, declared_identifier, push_forward_rows,
        push_id_row,
    },
    storage::Directive,
};

const UML_MARKERS: [&str; 3] = ["@startuml", "@startmindmap", "@startgantt"];

/// Renders a `graphic` directive.
///
/// A `:file:` option takes precedence over inline content. Inline content
/// containing a `PlantUML` start marker becomes a diagram, anything else is
/// kept as text.
pub(super) fn render(directive: &Directive, ctx: RenderContext<'_>) -> Block {
    let title = directive.argument.clone();

    let mut block = Block::new(BlockKind::Graphic, declared_identifier(directive))
        .with_title(title.clone())
        .with_class("rigr-graphic")
        .with_caption(directive.option("caption").map(String::from));

    push_id_row(&mut block);
    push_forward_rows(&mut block, directive, ctx);

    let content = if let Some(file) = directive.option("file") {
        let alt = directive
            .option("alt")
            .or(title.as_deref())
            .unwrap_or("Graphic");
        Some(BlockContent::Image {
            file: file.to_string(),
            alt: alt.to_string(),
            scale: directive.option("scale").map(String::from),
        })
    } else {
        let text = directive.content_text();
        if UML_MARKERS.iter().any(|marker| text.contains(marker)) {
            Some(BlockContent::Uml(text))
        } else {
            body_content(directive, ctx)
        }
    };
    block.with_content(content)
}
