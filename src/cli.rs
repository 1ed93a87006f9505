use std::path::{Path, PathBuf};

mod build;
mod links;
mod terminal;
mod trace;

use build::Build;
use clap::ArgAction;
use links::Links;
use rigr::{Config, Corpus, storage::corpus::Rendered};
use tracing::instrument;
use trace::Trace;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the document corpus
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Build(Build::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Write a starter `rigr.toml` to the corpus root
    Init,

    /// Render every fragment to HTML (default)
    Build(Build),

    /// Show the outgoing and incoming relationships of one item
    Trace(Trace),

    /// List every recorded relationship and its inverse
    Links(Links),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => Init::run(&root)?,
            Self::Build(command) => command.run(root)?,
            Self::Trace(command) => command.run(root)?,
            Self::Links(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Output format shared by the inspection commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Loads and renders the corpus at `root`.
fn render_corpus(root: PathBuf, parallel: bool) -> anyhow::Result<Corpus<Rendered>> {
    Ok(Corpus::new(root).load()?.render(parallel))
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let path = root.join(Config::FILE_NAME);
        if path.exists() {
            anyhow::bail!(
                "Corpus already initialized (found existing {})",
                Config::FILE_NAME
            );
        }

        std::fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;
        Config::starter()
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", Config::FILE_NAME))?;

        println!(
            "{}",
            format!("Initialized corpus in {}", root.display()).success()
        );
        println!("  Created: {}", Config::FILE_NAME);
        println!();
        println!("Next steps:");
        println!("  add .rst files with `.. item::` directives, then run `rigr build`");

        Ok(())
    }
}
