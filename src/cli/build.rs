use std::path::PathBuf;

use clap::Parser;
use rigr::storage::corpus::DEFAULT_OUT_DIR;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "Render every fragment to HTML")]
pub struct Build {
    /// Output directory. Defaults to `_build` below the corpus root.
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Render fragments concurrently.
    ///
    /// Incoming relationships are then listed in the order they were
    /// recorded rather than in document order.
    #[arg(long)]
    parallel: bool,
}

impl Build {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let out = self.out.unwrap_or_else(|| root.join(DEFAULT_OUT_DIR));
        let corpus = super::render_corpus(root, self.parallel)?;
        let written = corpus.write_html(&out)?;

        let resolution = corpus.resolution();
        println!(
            "{}",
            format!(
                "Rendered {} fragment(s) with {} block(s)",
                corpus.fragments().len(),
                corpus.blocks().count()
            )
            .success()
        );
        println!(
            "  {} link(s) from {} item(s), {} inverse row(s)",
            resolution.link_count(),
            resolution.registry.len(),
            resolution.injected_rows
        );
        println!(
            "{}",
            format!("  Wrote {} page(s) to {}", written.len(), out.display()).dim()
        );

        Ok(())
    }
}
