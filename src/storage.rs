/// Loading, rendering and writing of a whole corpus.
pub mod corpus;
/// Parsing of source fragments.
pub mod fragment;

pub use corpus::{Corpus, CorpusError};
pub use fragment::{Directive, Fragment, Segment};
