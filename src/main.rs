//! The `rigr` command line: builds a corpus of `.rst` fragments to HTML and
//! inspects the traceability links between its items.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
