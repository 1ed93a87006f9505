//! A filesystem backed document corpus.
//!
//! A [`Corpus`] moves through three states: [`Unloaded`], [`Loaded`] once
//! the configuration and every fragment have been read, and [`Rendered`]
//! once both passes of the build have run. Rendering consumes the loaded
//! corpus, so a build cannot be resolved twice.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use walkdir::{DirEntry, WalkDir};

use crate::{
    domain::{
        BlockKind, Config, ConfigError, RelationshipSchema, RenderedBlock, Resolution,
        begin_build,
    },
    render::{Block, RenderContext, RenderedFragment, html},
    storage::Fragment,
};

/// The directory name skipped when collecting sources, and the default
/// output location.
pub const DEFAULT_OUT_DIR: &str = "_build";

const SOURCE_EXTENSION: &str = "rst";

/// A corpus that has not been read from disk yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A corpus whose configuration and fragments have been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    config: Config,
    fragments: Vec<Fragment>,
}

/// A corpus after both passes, with inverse rows injected into its blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    config: Config,
    schema: RelationshipSchema,
    fragments: Vec<RenderedFragment>,
    resolution: Resolution,
}

/// A directory of source fragments with an optional `rigr.toml`.
#[derive(Debug)]
pub struct Corpus<S> {
    root: PathBuf,
    state: S,
}

/// Errors raised while loading or writing a corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The configuration file exists but could not be loaded.
    #[error("failed to load {}: {source}", Config::FILE_NAME)]
    Config {
        /// The underlying error.
        #[from]
        source: ConfigError,
    },
    /// A directory could not be walked.
    #[error("failed to walk the corpus: {0}")]
    Walk(#[from] walkdir::Error),
    /// A file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

impl<S> Corpus<S> {
    /// The corpus root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Corpus<Unloaded> {
    /// Opens a corpus rooted at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Loads the configuration and parses every source fragment.
    ///
    /// A missing configuration file is not an error; the default
    /// configuration is used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed, or if a directory
    /// or source file cannot be read.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub fn load(self) -> Result<Corpus<Loaded>, CorpusError> {
        let config = load_config(&self.root)?;
        let paths = collect_source_paths(&self.root)?;

        let mut fragments = paths
            .par_iter()
            .map(|path| load_fragment(&self.root, path))
            .collect::<Result<Vec<_>, _>>()?;
        fragments.sort_by(|a, b| a.path().cmp(b.path()));

        tracing::debug!(fragments = fragments.len(), "loaded corpus");

        Ok(Corpus {
            root: self.root,
            state: Loaded { config, fragments },
        })
    }
}

impl Corpus<Loaded> {
    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// The parsed fragments, ordered by path.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.state.fragments
    }

    /// Runs both passes of the build.
    ///
    /// Pass one renders every directive and records its relationships.
    /// Fragments are rendered concurrently when `parallel` is set, in which
    /// case the order of sources in an inverse row follows the order they
    /// were recorded in. Pass two resolves the inverse relationships and
    /// appends them to every rendered block.
    #[instrument(level = "debug", skip(self))]
    pub fn render(self, parallel: bool) -> Corpus<Rendered> {
        let Loaded { config, fragments } = self.state;
        let schema = RelationshipSchema::new(config.link_types());

        let (fragments, resolution) = {
            let collector = begin_build(&schema);
            let ctx = RenderContext::new(&config, &collector);

            let mut rendered: Vec<RenderedFragment> = if parallel {
                fragments
                    .par_iter()
                    .map(|fragment| RenderedFragment::render(fragment, ctx))
                    .collect()
            } else {
                fragments
                    .iter()
                    .map(|fragment| RenderedFragment::render(fragment, ctx))
                    .collect()
            };

            let mut blocks: Vec<_> = rendered
                .iter_mut()
                .flat_map(RenderedFragment::block_rows_mut)
                .collect();
            let resolution = collector.finalize(blocks.iter_mut());
            drop(blocks);
            (rendered, resolution)
        };

        Corpus {
            root: self.root,
            state: Rendered {
                config,
                schema,
                fragments,
                resolution,
            },
        }
    }
}

impl Corpus<Rendered> {
    /// The configuration the corpus was rendered with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// The relationship schema the corpus was rendered with.
    #[must_use]
    pub const fn schema(&self) -> &RelationshipSchema {
        &self.state.schema
    }

    /// The rendered fragments, ordered by path.
    #[must_use]
    pub fn fragments(&self) -> &[RenderedFragment] {
        &self.state.fragments
    }

    /// The recorded relationships and their inverses.
    #[must_use]
    pub const fn resolution(&self) -> &Resolution {
        &self.state.resolution
    }

    /// Every rendered block, in path and then document order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.state.fragments.iter().flat_map(RenderedFragment::blocks)
    }

    /// Finds the first block of the given kind with the given identifier.
    #[must_use]
    pub fn find_block(&self, kind: BlockKind, id: &str) -> Option<&Block> {
        self.blocks().find(|block| {
            block.kind() == kind && block.identifier().is_some_and(|block_id| block_id.as_str() == id)
        })
    }

    /// Finds the first block of any kind with the given identifier.
    #[must_use]
    pub fn find_any(&self, id: &str) -> Option<&Block> {
        self.blocks()
            .find(|block| block.identifier().is_some_and(|block_id| block_id.as_str() == id))
    }

    /// Writes one HTML page per fragment below `out`, mirroring the source
    /// layout.
    ///
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or page cannot be written.
    #[instrument(level = "debug", skip(self), fields(out = %out.display()))]
    pub fn write_html(&self, out: &Path) -> Result<Vec<PathBuf>, CorpusError> {
        let mut written = Vec::with_capacity(self.state.fragments.len());
        for fragment in &self.state.fragments {
            let path = out.join(fragment.path()).with_extension("html");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| CorpusError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, html::page(fragment)).map_err(|source| CorpusError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::trace!(path = %path.display(), "wrote page");
            written.push(path);
        }
        tracing::info!(pages = written.len(), "wrote HTML output");
        Ok(written)
    }
}

fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let path = root.join(Config::FILE_NAME);
    match Config::load(&path) {
        Err(ConfigError::NotFound) => {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
        result => result,
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == DEFAULT_OUT_DIR)
}

fn collect_source_paths(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry))
    {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn load_fragment(root: &Path, path: &Path) -> Result<Fragment, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let relative = path.strip_prefix(root).unwrap_or(path);
    Ok(Fragment::parse(relative, &text))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = r#"
_version = "1"

[[link_types]]
option = "satisfies"
outgoing = "satisfies"
incoming = "satisfied_by"

[[link_types]]
option = "depends_on"
"#;

    fn corpus(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (path, content) in files {
            let path = tmp.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        tmp
    }

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = corpus(&[("index.rst", ".. item:: One\n   :id: R1\n")]);

        let loaded = Corpus::new(tmp.path().to_path_buf()).load().unwrap();

        assert_eq!(loaded.config(), &Config::default());
        assert_eq!(loaded.fragments().len(), 1);
        assert_eq!(loaded.fragments()[0].path(), Path::new("index.rst"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = corpus(&[("rigr.toml", "not [valid toml")]);

        let error = Corpus::new(tmp.path().to_path_buf()).load().unwrap_err();

        assert!(matches!(error, CorpusError::Config { .. }));
    }

    #[test]
    fn hidden_and_output_directories_are_skipped() {
        let tmp = corpus(&[
            ("a.rst", ""),
            ("nested/b.rst", ""),
            ("notes.txt", ".. item:: Not a source\n"),
            (".hidden/c.rst", ""),
            ("_build/d.rst", ""),
        ]);

        let loaded = Corpus::new(tmp.path().to_path_buf()).load().unwrap();

        let paths: Vec<_> = loaded.fragments().iter().map(Fragment::path).collect();
        assert_eq!(paths, [Path::new("a.rst"), Path::new("nested/b.rst")]);
    }

    #[test]
    fn inverse_rows_cross_fragments() {
        let tmp = corpus(&[
            ("rigr.toml", CONFIG),
            ("a.rst", ".. item:: Source\n   :id: R1\n   :satisfies: R2\n"),
            ("b.rst", ".. item:: Target\n   :id: R2\n"),
            ("c.rst", ".. listing:: Code\n   :id: C1\n   :depends_on: R2\n"),
        ]);

        let rendered = Corpus::new(tmp.path().to_path_buf())
            .load()
            .unwrap()
            .render(false);

        let target = rendered.find_block(BlockKind::Item, "R2").unwrap();
        assert_eq!(target.row_value("Satisfied By"), Some("R1"));
        assert_eq!(target.row_value("Depends On (Incoming)"), Some("C1"));
        assert!(rendered.find_block(BlockKind::Graphic, "R2").is_none());
        assert_eq!(rendered.find_any("C1").map(Block::kind), Some(BlockKind::Listing));
        assert_eq!(rendered.resolution().injected_rows, 2);
        assert_eq!(rendered.resolution().link_count(), 2);
    }

    #[test]
    fn nested_blocks_are_linked_both_ways() {
        let tmp = corpus(&[
            ("rigr.toml", CONFIG),
            (
                "index.rst",
                "\
.. item:: Outer
   :id: R1

   .. item:: Inner
      :id: R3
      :satisfies: R1

.. item:: Sibling
   :id: R4
   :depends_on: R3
",
            ),
        ]);

        let rendered = Corpus::new(tmp.path().to_path_buf())
            .load()
            .unwrap()
            .render(false);

        let outer = rendered.find_block(BlockKind::Item, "R1").unwrap();
        assert_eq!(outer.row_value("Satisfied By"), Some("R3"));
        let inner = rendered.find_block(BlockKind::Item, "R3").unwrap();
        assert_eq!(inner.row_value("Satisfies"), Some("R1"));
        assert_eq!(inner.row_value("Depends On (Incoming)"), Some("R4"));
        let sources: Vec<_> = rendered
            .resolution()
            .registry
            .iter()
            .map(|(source, _)| source.as_str())
            .collect();
        assert_eq!(sources, ["R1", "R3", "R4"]);
        assert_eq!(rendered.resolution().injected_rows, 2);
    }

    #[test]
    fn byte_order_mark_does_not_hide_the_first_directive() {
        let tmp = corpus(&[
            ("rigr.toml", CONFIG),
            ("a.rst", "\u{feff}.. item:: Source\n   :id: R1\n   :satisfies: R2\n"),
            ("b.rst", ".. item:: Target\n   :id: R2\n"),
        ]);

        let rendered = Corpus::new(tmp.path().to_path_buf())
            .load()
            .unwrap()
            .render(false);

        assert!(rendered.find_block(BlockKind::Item, "R1").is_some());
        let target = rendered.find_block(BlockKind::Item, "R2").unwrap();
        assert_eq!(target.row_value("Satisfied By"), Some("R1"));
    }

    #[test]
    fn parallel_render_finds_the_same_links() {
        let mut files = vec![("rigr.toml".to_string(), CONFIG.to_string())];
        for i in 0..20 {
            files.push((
                format!("doc{i:02}.rst"),
                format!(".. item:: Item {i}\n   :id: R{i}\n   :satisfies: ROOT\n"),
            ));
        }
        files.push(("root.rst".to_string(), ".. item:: Root\n   :id: ROOT\n".to_string()));
        let borrowed: Vec<_> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let tmp = corpus(&borrowed);

        let rendered = Corpus::new(tmp.path().to_path_buf())
            .load()
            .unwrap()
            .render(true);

        let root = rendered.find_block(BlockKind::Item, "ROOT").unwrap();
        let mut sources: Vec<_> = root.row_value("Satisfied By").unwrap().split(", ").collect();
        sources.sort_unstable();
        let mut expected: Vec<_> = (0..20).map(|i| format!("R{i}")).collect();
        expected.sort_unstable();
        assert_eq!(sources, expected);
    }

    #[test]
    fn writes_one_page_per_fragment() {
        let tmp = corpus(&[
            ("rigr.toml", CONFIG),
            ("guide/intro.rst", "Hello.\n\n.. item:: One\n   :id: R1\n"),
        ]);
        let out = TempDir::new().unwrap();

        let written = Corpus::new(tmp.path().to_path_buf())
            .load()
            .unwrap()
            .render(false)
            .write_html(out.path())
            .unwrap();

        assert_eq!(written, [out.path().join("guide/intro.html")]);
        let page = fs::read_to_string(&written[0]).unwrap();
        assert!(page.contains("<title>intro</title>"));
        assert!(page.contains("<p>Hello.</p>"));
        assert!(page.contains("id=\"req-R1\""));
    }
}
