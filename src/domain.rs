//! Domain models for the traceability link graph.
//!
//! This module contains the identifier and block-kind types, the
//! configuration, the relationship schema, and the two-pass pipeline that
//! records outgoing relationships and injects their inverses.

pub mod build;
pub use build::{LinkCollector, Resolution, begin_build};

/// Configuration loading and display tables.
pub mod config;
pub use config::{Config, ConfigError};

mod identifier;
pub use identifier::{BlockKind, EmptyIdentifierError, Identifier};

pub mod inverse;
pub use inverse::{InverseIndex, RenderedBlock};

pub mod registry;
pub use registry::{DeclaredOptions, OutgoingRecord, Registry};

pub mod schema;
pub use schema::{RelationshipKind, RelationshipSchema};
