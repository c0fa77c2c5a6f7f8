//! Vector index implementations

mod factory;
mod in_memory;
mod pinecone;

pub use factory::{VectorIndexConfig, VectorIndexFactory, VectorIndexType};
pub use in_memory::InMemoryVectorIndex;
pub use pinecone::PineconeIndex;

pub use super::http_client::{HttpClient, HttpClientTrait};
