//! Serialization of rendered fragments to standalone HTML pages.

use crate::render::{Block, BlockContent, MetadataRow, Node, RenderedFragment};

/// Renders a fragment as a complete HTML page.
#[must_use]
pub fn page(fragment: &RenderedFragment) -> String {
    let title = fragment
        .path()
        .file_stem()
        .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned());

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&title)));
    out.push_str("</head>\n<body>\n");
    push_nodes(&mut out, fragment.nodes());
    out.push_str("</body>\n</html>\n");
    out
}

/// Renders one block as a `div` container.
#[must_use]
pub fn block(block: &Block) -> String {
    let mut out = String::new();
    push_block(&mut out, block);
    out
}

fn push_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => push_paragraphs(out, text),
            Node::Block(block) => push_block(out, block),
        }
    }
}

fn push_block(out: &mut String, block: &Block) {
    out.push_str(&format!("<div class=\"{}\"", escape(&block.classes().join(" "))));
    if let Some(anchor) = block.anchor() {
        out.push_str(&format!(" id=\"{}\"", escape(&anchor)));
    }
    out.push_str(">\n");

    if let Some(title) = block.title() {
        out.push_str(&format!(
            "<p class=\"rubric rigr-title\">{}</p>\n",
            escape(title)
        ));
    }

    if !block.rows().is_empty() {
        push_table(out, block.rows());
    }

    let body_class = match block.classes().first().map(String::as_str) {
        Some("rigr-graphic") => "rigr-graphic-content",
        _ => "rigr-body",
    };
    match block.content() {
        Some(BlockContent::Text(text)) => {
            out.push_str(&format!("<div class=\"{body_class}\">\n"));
            push_paragraphs(out, text);
            out.push_str("</div>\n");
        }
        Some(BlockContent::Body(nodes)) => {
            out.push_str(&format!("<div class=\"{body_class}\">\n"));
            push_nodes(out, nodes);
            out.push_str("</div>\n");
        }
        Some(BlockContent::Image { file, alt, scale }) => {
            out.push_str("<div class=\"rigr-graphic-content\">\n");
            out.push_str("<div class=\"rigr-graphic-image rigr-clickable\">");
            out.push_str(&format!(
                "<a href=\"{file}\"><img src=\"{file}\" alt=\"{alt}\"",
                file = escape(file),
                alt = escape(alt),
            ));
            if let Some(scale) = scale {
                out.push_str(&format!(" data-scale=\"{}\"", escape(scale)));
            }
            out.push_str("></a></div>\n</div>\n");
        }
        Some(BlockContent::Uml(source)) => {
            out.push_str("<div class=\"rigr-graphic-content\">\n");
            out.push_str(&format!(
                "<div class=\"rigr-graphic-uml\"><pre class=\"uml\">{}</pre></div>\n",
                escape(source)
            ));
            out.push_str("</div>\n");
        }
        Some(BlockContent::Code { language, code }) => {
            out.push_str(&format!(
                "<div class=\"rigr-code-content\"><pre><code class=\"language-{}\">{}</code></pre></div>\n",
                escape(language),
                escape(code)
            ));
        }
        None => {}
    }

    if let Some(caption) = block.caption() {
        let class = match block.classes().first().map(String::as_str) {
            Some("rigr-code") => "rigr-code-caption",
            _ => "rigr-graphic-caption",
        };
        out.push_str(&format!(
            "<div class=\"{class}\"><p>{}</p></div>\n",
            escape(caption)
        ));
    }

    out.push_str("</div>\n");
}

fn push_table(out: &mut String, rows: &[MetadataRow]) {
    out.push_str("<table class=\"rigr-metadata-table\">\n");
    out.push_str("<colgroup><col style=\"width: 30%\"><col style=\"width: 70%\"></colgroup>\n");
    out.push_str("<tbody>\n");
    for row in rows {
        out.push_str(&format!(
            "<tr><td><p>{}</p></td><td class=\"rigr-field-{}\"><p><span",
            escape(&row.label),
            field_slug(&row.label)
        ));
        if !row.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&row.classes.join(" "))));
        }
        if let Some(style) = &row.style {
            out.push_str(&format!(" style=\"{}\"", escape(style)));
        }
        out.push_str(&format!(">{}</span></p></td></tr>\n", escape(&row.value)));
    }
    out.push_str("</tbody>\n</table>\n");
}

/// Groups lines into paragraphs separated by blank lines.
fn push_paragraphs(out: &mut String, text: &str) {
    let mut paragraph: Vec<&str> = Vec::new();
    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !paragraph.is_empty() {
                out.push_str(&format!("<p>{}</p>\n", escape(&paragraph.join("\n"))));
                paragraph.clear();
            }
        } else {
            paragraph.push(line.trim());
        }
    }
}

/// The class suffix for a metadata field, e.g. `Satisfied By` ->
/// `satisfied-by`.
fn field_slug(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
