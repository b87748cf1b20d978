//! Error types for the SmartBill client.
//!
//! # Design
//! Public operations never return these directly. `ApiError` is the internal
//! pipeline error; the executor renders it into a failure envelope and its
//! `Display` output becomes the envelope message. `SmartBillError` describes
//! a raw non-2xx response for callers that drive the transport themselves.

use thiserror::Error;

use crate::http::HttpResponse;

/// Failures inside the request pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained: connect, TLS, DNS, timeout, or body read.
    #[error("{0}")]
    Transport(String),

    /// A 2xx body did not match the shape expected for its request kind.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(serde_json::Error),
}

/// A non-2xx HTTP response reduced to its status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SmartBill API Error: {status} {status_text}")]
pub struct SmartBillError {
    pub status: u16,
    pub status_text: String,
}

impl SmartBillError {
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
        }
    }
}

/// Invalid or missing client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid timeout {value:?}: expected whole seconds")]
    InvalidTimeout { value: String },
}
