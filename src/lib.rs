//! Requirement items with bidirectional traceability
//!
//! Requirements, graphics and code listings are declared as directives in
//! plain-text documents. Each directive declares its outgoing relationships
//! to other items, and every item it points at is rendered with the matching
//! incoming relationship.

pub mod domain;
pub use domain::{BlockKind, Config, Identifier, LinkCollector, RelationshipSchema, begin_build};

pub mod render;
pub use render::{Block, RenderedFragment};

/// Filesystem storage of source fragments.
pub mod storage;
pub use storage::{Corpus, CorpusError};
