//! Vector index domain models and traits

mod index;
mod record;

pub use index::VectorIndex;
pub use record::{IndexRecord, RetrievedPassage, CONTENT_METADATA_KEY};

#[cfg(test)]
pub use index::mock::MockVectorIndex;
