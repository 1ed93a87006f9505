use std::path::PathBuf;

use clap::Parser;
use rigr::{Block, Corpus, Identifier, domain::RenderedBlock, storage::corpus::Rendered};
use serde::Serialize;
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Show the relationships of one item")]
pub struct Trace {
    /// The identifier of the item, graphic or listing
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

/// The relationships of one identifier, grouped by kind.
#[derive(Debug, Serialize)]
struct TraceReport<'a> {
    id: &'a str,
    kind: Option<&'static str>,
    anchor: Option<String>,
    title: Option<&'a str>,
    outgoing: Vec<Relationship<'a>>,
    incoming: Vec<Relationship<'a>>,
}

#[derive(Debug, Serialize)]
struct Relationship<'a> {
    option: &'a str,
    label: String,
    items: Vec<&'a str>,
}

impl Trace {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let corpus = super::render_corpus(root, false)?;

        let Some(report) = report(&corpus, &self.id) else {
            anyhow::bail!("No item declares or is linked as {}", self.id);
        };

        match self.output {
            OutputFormat::Pretty => output_pretty(&report),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }
}

fn report<'a>(corpus: &'a Corpus<Rendered>, id: &'a str) -> Option<TraceReport<'a>> {
    let block = corpus.find_any(id);
    let resolution = corpus.resolution();
    let schema = corpus.schema();

    let outgoing: Vec<_> = resolution
        .registry
        .get(id)
        .into_iter()
        .flat_map(|record| record.iter())
        .map(|(key, targets)| Relationship {
            option: key,
            label: schema.forward_label(key),
            items: targets.iter().map(Identifier::as_str).collect(),
        })
        .collect();

    let incoming: Vec<_> = resolution
        .index
        .incoming(id)
        .into_iter()
        .flatten()
        .map(|(key, sources)| Relationship {
            option: key,
            label: schema.inverse_label(key),
            items: sources.iter().map(Identifier::as_str).collect(),
        })
        .collect();

    if block.is_none() && outgoing.is_empty() && incoming.is_empty() {
        return None;
    }

    Some(TraceReport {
        id,
        kind: block.map(|block| block.kind().directive()),
        anchor: block.and_then(Block::anchor),
        title: block.and_then(Block::title),
        outgoing,
        incoming,
    })
}

fn output_pretty(report: &TraceReport<'_>) {
    match report.kind {
        Some(kind) => println!("# {} ({kind})", report.id),
        None => println!(
            "# {} {}",
            report.id,
            "(not declared by any block)".warning()
        ),
    }
    if let Some(title) = report.title {
        println!("{title}");
    }
    if let Some(anchor) = &report.anchor {
        println!("{}", format!("#{anchor}").dim());
    }

    for (heading, relationships, arrow) in [
        ("Outgoing", &report.outgoing, "→"),
        ("Incoming", &report.incoming, "←"),
    ] {
        if relationships.is_empty() {
            continue;
        }
        println!("\n{}", heading.dim());
        for relationship in relationships {
            println!(
                "  {} {arrow} {}",
                relationship.label,
                relationship.items.join(", ").info()
            );
        }
    }
}
