use crate::{
    domain::BlockKind,
    render::{Block, BlockContent, RenderContext, declared_identifier, push_forward_rows, push_id_row},
    storage::Directive,
};

const DEFAULT_LANGUAGE: &str = "text";

/// Renders a `listing` directive.
pub(super) fn render(directive: &Directive, ctx: RenderContext<'_>) -> Block {
    let content = (!directive.content.is_empty()).then(|| BlockContent::Code {
        language: directive
            .option("language")
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
        code: directive.content_text(),
    });

    let mut block = Block::new(BlockKind::Listing, declared_identifier(directive))
        .with_title(directive.argument.clone())
        .with_class("rigr-code")
        .with_content(content)
        .with_caption(directive.option("caption").map(String::from));

    push_id_row(&mut block);
    push_forward_rows(&mut block, directive, ctx);
    block
}
