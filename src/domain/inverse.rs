//! Inverse relationship resolution and injection.
//!
//! An item's incoming relationships are only known once every fragment in
//! the corpus has been parsed. The [`InverseIndex`] is the transpose of the
//! [`Registry`], and [`inject`] appends one metadata row per incoming
//! relationship kind to each block that is the target of a link.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::instrument;

use crate::domain::{BlockKind, Identifier, Registry, RelationshipSchema};

/// A rendered block that can receive inverse relationship rows.
pub trait RenderedBlock {
    /// The identifier the block was rendered for, if it declared one.
    fn identifier(&self) -> Option<&Identifier>;

    /// The kind of block.
    fn kind(&self) -> BlockKind;

    /// Appends a row after all existing metadata rows.
    fn append_metadata_row(&mut self, label: String, value: String);
}

/// Incoming relationships grouped by target.
///
/// Maps a target identifier to the relationship kinds pointing at it, and
/// each kind to the sources that declared it, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InverseIndex {
    incoming: IndexMap<Identifier, IndexMap<String, Vec<Identifier>>>,
}

impl InverseIndex {
    /// Computes the transpose of a registry.
    ///
    /// Duplicate declarations of the same pair are kept as duplicates.
    #[must_use]
    pub fn resolve(registry: &Registry) -> Self {
        let mut incoming: IndexMap<Identifier, IndexMap<String, Vec<Identifier>>> =
            IndexMap::new();
        for (source, key, target) in registry.triples() {
            incoming
                .entry(target.clone())
                .or_default()
                .entry(key.to_string())
                .or_default()
                .push(source.clone());
        }
        Self { incoming }
    }

    /// The incoming relationships of a target, by option key.
    #[must_use]
    pub fn incoming(&self, target: &str) -> Option<&IndexMap<String, Vec<Identifier>>> {
        self.incoming.get(target)
    }

    /// The sources that declared a relationship of the given kind toward a
    /// target.
    #[must_use]
    pub fn sources(&self, target: &str, option_key: &str) -> &[Identifier] {
        self.incoming(target)
            .and_then(|kinds| kinds.get(option_key))
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates over targets and their incoming relationships.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &IndexMap<String, Vec<Identifier>>)> {
        self.incoming.iter()
    }

    /// The number of targets with at least one incoming relationship.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    /// Whether no item is the target of any relationship.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }
}

/// Appends inverse relationship rows to every block that is a link target.
///
/// Blocks without an identifier, or whose identifier nobody links to, are
/// left untouched. Returns the number of rows appended.
#[instrument(level = "debug", skip_all, fields(targets = index.len()))]
pub fn inject<'a, B, I>(blocks: I, index: &InverseIndex, schema: &RelationshipSchema) -> usize
where
    B: RenderedBlock + 'a,
    I: IntoIterator<Item = &'a mut B>,
{
    let mut appended = 0;
    for block in blocks {
        let Some(kinds) = block.identifier().and_then(|id| index.incoming(id)) else {
            continue;
        };

        for (key, sources) in kinds {
            let value = sources
                .iter()
                .map(Identifier::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            block.append_metadata_row(schema.inverse_label(key), value);
            appended += 1;
        }
    }
    appended
}
