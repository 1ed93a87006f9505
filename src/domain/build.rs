//! The two-pass traceability pipeline.
//!
//! A build starts with [`begin_build`], which hands out a [`LinkCollector`].
//! Every rendered block is recorded with the collector during the first pass.
//! [`LinkCollector::finalize`] consumes the collector, so no relationship can
//! be recorded once resolution has started.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::instrument;

use crate::domain::{
    DeclaredOptions, Identifier, InverseIndex, OutgoingRecord, Registry, RelationshipSchema,
    inverse::{RenderedBlock, inject},
};

/// Starts a build over the given relationship schema.
#[must_use]
pub fn begin_build(schema: &RelationshipSchema) -> LinkCollector<'_> {
    LinkCollector::new(schema)
}

/// Collects outgoing relationships while fragments are parsed.
///
/// The collector can be shared between threads: registry writes are
/// serialized through a single lock.
#[derive(Debug)]
pub struct LinkCollector<'s> {
    schema: &'s RelationshipSchema,
    registry: Mutex<Registry>,
}

impl<'s> LinkCollector<'s> {
    fn new(schema: &'s RelationshipSchema) -> Self {
        Self {
            schema,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// The schema this build uses.
    #[must_use]
    pub const fn schema(&self) -> &'s RelationshipSchema {
        self.schema
    }

    /// Records the relationships declared by one block.
    ///
    /// The parsed record is always returned so the caller can render the
    /// forward rows, but it is only stored when the block has an identifier.
    /// Recording the same identifier twice replaces the earlier record.
    pub fn record(&self, source: Option<&Identifier>, options: &DeclaredOptions) -> OutgoingRecord {
        let record = OutgoingRecord::from_options(self.schema, options);

        let Some(source) = source else {
            if !record.is_empty() {
                tracing::debug!("dropping relationships declared without an identifier");
            }
            return record;
        };

        let replaced = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.clone(), record.clone());
        if replaced.is_some() {
            tracing::debug!(%source, "identifier recorded twice, keeping the later declaration");
        }

        record
    }

    /// Ends the collection pass without resolving, returning the registry.
    #[must_use]
    pub fn into_registry(self) -> Registry {
        self.registry
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves inverse relationships and injects them into the rendered
    /// blocks.
    ///
    /// This must be handed every block of the corpus at once.
    #[instrument(level = "debug", skip_all)]
    pub fn finalize<'b, B, I>(self, blocks: I) -> Resolution
    where
        B: RenderedBlock + 'b,
        I: IntoIterator<Item = &'b mut B>,
    {
        let schema = self.schema;
        let registry = self.into_registry();
        let index = InverseIndex::resolve(&registry);
        let injected_rows = inject(blocks, &index, schema);

        let resolution = Resolution {
            registry,
            index,
            injected_rows,
        };
        tracing::info!(
            sources = resolution.registry.len(),
            links = resolution.link_count(),
            targets = resolution.index.len(),
            injected_rows,
            "resolved traceability links"
        );
        resolution
    }
}

/// The outcome of a build's resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Every outgoing relationship recorded during the build.
    pub registry: Registry,
    /// The inverse of `registry`, grouped by target.
    pub index: InverseIndex,
    /// The number of inverse rows appended to rendered blocks.
    pub injected_rows: usize,
}

impl Resolution {
    /// The total number of recorded links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.registry.iter().map(|(_, record)| record.link_count()).sum()
    }
}
