use crate::{
    domain::{BlockKind, schema::humanize},
    render::{
        Block, MetadataRow, RenderContext, body_content, declared_identifier, push_forward_rows,
        push_id_row,
    },
    storage::Directive,
};

const DEFAULT_TYPE: &str = "requirement";
const DEFAULT_TITLE: &str = "Untitled";

/// Renders an `item` directive.
///
/// Rows are `ID`, `Type`, `Level` (when declared) and `Status`, then one row
/// per declared relationship in schema order, then the configured extra
/// options.
pub(super) fn render(directive: &Directive, ctx: RenderContext<'_>) -> Block {
    let config = ctx.config;
    let item_type = directive.option("type").unwrap_or(DEFAULT_TYPE);
    let status = directive
        .option("status")
        .unwrap_or_else(|| config.default_status());
    let title = directive
        .argument
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut block = Block::new(BlockKind::Item, declared_identifier(directive))
        .with_title(Some(title))
        .with_class("rigr-item")
        .with_class(format!("rigr-type-{item_type}"))
        .with_class(format!("rigr-status-{status}"));

    push_id_row(&mut block);
    block.push_row(
        MetadataRow::new("Type", config.type_title(item_type)).with_class("rigr-type-label"),
    );
    if let Some(level) = directive.option("level") {
        block.push_row(MetadataRow::new("Level", config.level_title(level)));
    }
    block.push_row(
        MetadataRow::new("Status", status)
            .with_class("rigr-status-badge")
            .with_class(format!("rigr-status-{status}"))
            .with_style(
                config
                    .status_color(status)
                    .map(|color| format!("background-color: {color}")),
            ),
    );

    push_forward_rows(&mut block, directive, ctx);

    let schema = ctx.collector.schema();
    for option in config.extra_options() {
        if schema.contains(option) {
            continue;
        }
        if let Some(value) = directive.option(option) {
            block.push_row(MetadataRow::new(humanize(option), value));
        }
    }

    block.with_content(body_content(directive, ctx))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        domain::{Config, RelationshipSchema, RenderedBlock, begin_build},
        render::{BlockContent, test_support::*},
    };

    fn labels(block: &Block) -> Vec<(&str, &str)> {
        block
            .rows()
            .iter()
            .map(|row| (row.label.as_str(), row.value.as_str()))
            .collect()
    }

    #[test]
    fn full_item() {
        let config = config();
        let schema = RelationshipSchema::new(config.link_types());
        let collector = begin_build(&schema);
        let directive = directive(
            "\
.. item:: Login works
   :id: REQ-001
   :type: requirement
   :level: system
   :status: approved
   :priority: high
   :depends_on: REQ-000
   :satisfies: STK-001, STK-002

   Users can log in.
",
        );

        let block = render(&directive, RenderContext::new(&config, &collector));

        assert_eq!(block.title(), Some("Login works"));
        assert_eq!(block.anchor().as_deref(), Some("req-REQ-001"));
        assert_eq!(
            block.classes(),
            ["rigr-item", "rigr-type-requirement", "rigr-status-approved"]
        );
        assert_eq!(
            labels(&block),
            [
                ("ID", "REQ-001"),
                ("Type", "Requirement"),
                ("Level", "System"),
                ("Status", "approved"),
                ("Satisfies", "STK-001, STK-002"),
                ("Depends On", "REQ-000"),
                ("Priority", "high"),
            ]
        );
        assert_eq!(
            block.content(),
            Some(&BlockContent::Text("Users can log in.".to_string()))
        );

        let registry = collector.into_registry();
        let record = registry.get("REQ-001").expect("recorded");
        assert_eq!(
            record.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            ["satisfies", "depends_on"]
        );
    }

    #[test]
    fn defaults() {
        let config = config();
        let schema = RelationshipSchema::new(config.link_types());
        let collector = begin_build(&schema);
        let directive = directive(".. item::\n   :id: R1\n");

        let block = render(&directive, RenderContext::new(&config, &collector));

        assert_eq!(block.title(), Some("Untitled"));
        assert_eq!(block.row_value("Type"), Some("Requirement"));
        assert_eq!(block.row_value("Status"), Some("draft"));
        assert_eq!(block.row_value("Level"), None);
        assert_eq!(block.content(), None);
        assert_eq!(block.kind(), BlockKind::Item);
    }

    #[test]
    fn status_badge_uses_configured_colour() {
        let config = config();
        let schema = RelationshipSchema::new(config.link_types());
        let collector = begin_build(&schema);
        let directive = directive(".. item:: Badge\n   :status: approved\n");

        let block = render(&directive, RenderContext::new(&config, &collector));

        let status = block
            .rows()
            .iter()
            .find(|row| row.label == "Status")
            .expect("status row");
        assert_eq!(status.classes, ["rigr-status-badge", "rigr-status-approved"]);
        assert_eq!(status.style.as_deref(), Some("background-color: #4CAF50"));
    }

    #[test]
    fn extra_option_named_like_a_relationship_renders_once() {
        let config: Config = toml::from_str(
            r#"
_version = "1"
extra_options = ["satisfies", "priority"]

[[link_types]]
option = "satisfies"
outgoing = "satisfies"
incoming = "satisfied_by"
"#,
        )
        .unwrap();
        let schema = RelationshipSchema::new(config.link_types());
        let collector = begin_build(&schema);
        let directive = directive(
            "\
.. item:: Collision
   :id: R1
   :satisfies: STK-1,  STK-2 ,
   :priority: high
",
        );

        let block = render(&directive, RenderContext::new(&config, &collector));

        let satisfies: Vec<_> = block
            .rows()
            .iter()
            .filter(|row| row.label == "Satisfies")
            .map(|row| row.value.as_str())
            .collect();
        assert_eq!(satisfies, ["STK-1, STK-2"]);
        assert_eq!(block.row_value("Priority"), Some("high"));
    }

    #[test_case(":satisfies:" ; "empty value")]
    #[test_case(":satisfies: , ," ; "only separators")]
    fn empty_relationships_render_no_row(option: &str) {
        let config = config();
        let schema = RelationshipSchema::new(config.link_types());
        let collector = begin_build(&schema);
        let directive = directive(&format!(".. item:: Empty\n   :id: R1\n   {option}\n"));

        let block = render(&directive, RenderContext::new(&config, &collector));

        assert_eq!(block.row_value("Satisfies"), None);
        let registry = collector.into_registry();
        assert!(registry.get("R1").expect("recorded").is_empty());
    }
}
