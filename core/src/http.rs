//! HTTP transport types and the pluggable `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to a `Transport`, and interprets the returned
//! `HttpResponse`. Swapping the transport is how tests stub the network;
//! `UreqTransport` is the real one.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded and
//! compared in tests without lifetime concerns.

use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, SmartBillError};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// The body is kept as bytes because PDF downloads are binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns the response unchanged on 2xx, otherwise a `SmartBillError`
    /// carrying the raw status line.
    pub fn error_for_status(self) -> Result<Self, SmartBillError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SmartBillError::from_response(&self))
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok`; only failures to
/// obtain a response at all (DNS, connect, TLS, timeouts) are `Err`.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Statuses are data for the executor, not transport errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an existing agent. The agent must have `http_status_as_error`
    /// disabled, otherwise vendor error bodies are lost.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(url), request).call(),
            (HttpMethod::Delete, _) => prepare(self.agent.delete(url), request).call(),
            (HttpMethod::Post, Some(body)) => prepare(self.agent.post(url), request).send(body.as_bytes()),
            (HttpMethod::Post, None) => prepare(self.agent.post(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => prepare(self.agent.put(url), request).send(body.as_bytes()),
            (HttpMethod::Put, None) => prepare(self.agent.put(url), request).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: reason_phrase(status),
            headers,
            body,
        })
    }
}

/// Canonical reason phrase, or `Unknown` for codes without one (e.g. 520).
fn reason_phrase(status: ureq::http::StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

fn prepare<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(timeout) = request.timeout {
        builder = builder.config().timeout_global(Some(timeout)).build();
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, status_text: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Vec::new(),
        }
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(response(200, "OK").is_success());
        assert!(response(204, "No Content").is_success());
        assert!(!response(199, "").is_success());
        assert!(!response(301, "Moved Permanently").is_success());
        assert!(!response(500, "Internal Server Error").is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(200, "OK");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("accept"), None);
    }

    #[test]
    fn error_for_status_keeps_status_line() {
        let err = response(503, "Service Unavailable").error_for_status().unwrap_err();
        assert_eq!(err.status, 503);
        assert_eq!(err.status_text, "Service Unavailable");
        assert_eq!(err.to_string(), "SmartBill API Error: 503 Service Unavailable");
    }

    #[test]
    fn error_for_status_passes_success_through() {
        let resp = response(200, "OK").error_for_status().unwrap();
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn reason_phrase_falls_back_for_unregistered_codes() {
        let known = ureq::http::StatusCode::from_u16(404).unwrap();
        assert_eq!(reason_phrase(known), "Not Found");
        let unregistered = ureq::http::StatusCode::from_u16(520).unwrap();
        assert_eq!(reason_phrase(unregistered), "Unknown");
    }

    #[test]
    fn method_display_matches_verb() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
