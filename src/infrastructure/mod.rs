//! Infrastructure layer - External service implementations

pub mod completion;
pub mod credentials;
pub mod embedding;
pub mod http_client;
pub mod ingestion;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod vector_index;
