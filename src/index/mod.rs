// Embedding index over filtered places

pub mod collection;
pub mod indexer;

pub use collection::{DistanceSpace, IndexEntry, QueryMatch, VectorCollection};
pub use indexer::{build_collection, load_documents, search, IndexDocument};
