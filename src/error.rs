// src/error.rs
use std::fmt;
use warp::reject::Reject;

/// Errors surfaced by the computation and gateway layers. All variants
/// carry a human-readable message; handlers report them uniformly as a
/// 400 response with an `{"error": ...}` body.
#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Malformed or missing request fields, caught before any fetch.
    Validation(String),
    /// Provider fetch or decode failure.
    Upstream(String),
    /// Arithmetic failure, e.g. a zero denominator.
    Math(String),
}

impl ServiceError {
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Validation(m) | ServiceError::Upstream(m) | ServiceError::Math(m) => m,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

impl Reject for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Upstream(e.to_string())
    }
}
