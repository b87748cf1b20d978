//! Recording stub transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Replays queued responses in order and records every request it sees.
/// An empty queue answers `200 {}`.
#[derive(Default)]
pub(crate) struct StubTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.push_raw(status, reason(status), body.as_bytes());
    }

    pub(crate) fn push_raw(&self, status: u16, status_text: &str, body: &[u8]) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: Vec::new(),
            body: body.to_vec(),
        }));
    }

    pub(crate) fn push_error(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request recorded")
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ApiError::Transport(message)),
            None => Ok(HttpResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: b"{}".to_vec(),
            }),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
