use std::path::PathBuf;

use clap::Parser;
use rigr::{Corpus, Identifier, storage::corpus::Rendered};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "List every recorded relationship and its inverse")]
pub struct Links {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

/// One declared link, as written on its source.
#[derive(Debug, PartialEq, Eq)]
struct Outgoing<'a> {
    source: &'a str,
    label: String,
    target: &'a str,
    declared: bool,
}

/// Every source pointing at one target through one relationship kind.
#[derive(Debug, PartialEq, Eq)]
struct Incoming<'a> {
    target: &'a str,
    label: String,
    sources: Vec<&'a str>,
}

impl Links {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let corpus = super::render_corpus(root, false)?;

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(corpus.resolution())?);
            }
            OutputFormat::Pretty => output_pretty(&corpus),
        }
        Ok(())
    }
}

fn outgoing(corpus: &Corpus<Rendered>) -> Vec<Outgoing<'_>> {
    let schema = corpus.schema();
    corpus
        .resolution()
        .registry
        .triples()
        .map(|(source, key, target)| Outgoing {
            source: source.as_str(),
            label: schema.forward_label(key),
            target: target.as_str(),
            declared: corpus.find_any(target.as_str()).is_some(),
        })
        .collect()
}

fn incoming(corpus: &Corpus<Rendered>) -> Vec<Incoming<'_>> {
    let schema = corpus.schema();
    corpus
        .resolution()
        .index
        .iter()
        .flat_map(|(target, kinds)| {
            kinds.iter().map(move |(key, sources)| Incoming {
                target: target.as_str(),
                label: schema.inverse_label(key),
                sources: sources.iter().map(Identifier::as_str).collect(),
            })
        })
        .collect()
}

fn output_pretty(corpus: &Corpus<Rendered>) {
    let outgoing = outgoing(corpus);
    let incoming = incoming(corpus);

    println!("{}", "Outgoing".dim());
    for link in &outgoing {
        let target = if link.declared {
            link.target.to_string()
        } else {
            format!("{} (undeclared)", link.target).warning()
        };
        println!(
            "  {} {} {target}",
            link.source,
            format!("--{}-->", link.label).dim()
        );
    }

    println!("\n{}", "Incoming".dim());
    for inverse in &incoming {
        println!(
            "  {} {} {}",
            inverse.target,
            format!("<--{}--", inverse.label).dim(),
            inverse.sources.join(", ").info()
        );
    }

    let dangling = outgoing.iter().filter(|link| !link.declared).count();
    println!(
        "\n{} link(s) into {} target(s), {} to undeclared item(s)",
        outgoing.len(),
        corpus.resolution().index.len(),
        dangling
    );
}
