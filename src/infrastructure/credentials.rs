//! API key lookup from the process environment

use std::env;

use crate::domain::DomainError;

/// Read a provider API key from the environment variable `var`
pub fn env_api_key(var: &str) -> Result<String, DomainError> {
    api_key_from(var, |name| env::var(name).ok())
}

/// Resolve an API key through `lookup`; blank values count as missing
pub fn api_key_from<F>(var: &str, lookup: F) -> Result<String, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DomainError::configuration(format!(
            "Environment variable {} is not set",
            var
        ))),
    }
}
