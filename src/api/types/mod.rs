//! Request, response and error types for the HTTP API

pub mod ask;
pub mod error;
pub mod json;

pub use ask::{AskRequest, AskResponse};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
