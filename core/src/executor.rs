//! Authenticated request execution.
//!
//! # Design
//! `Executor` is the single dispatch path every facade goes through. It owns
//! the configuration and a shared `Transport`, injects the JSON and Basic auth
//! headers, performs exactly one round-trip, and folds every failure mode
//! (transport, non-2xx, undecodable body) into an `ApiResponse::Failure`.
//! Nothing here returns `Err` or panics across the public boundary.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::normalize::{normalize, Payload, RequestKind, VendorError};
use crate::response::ApiResponse;

const JSON: &str = "application/json";
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Per-call options. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    /// Merged over the default headers; a same-named header replaces the default.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Overrides the configured timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_string(value).map_err(ApiError::Serialize)?);
        Ok(self)
    }
}

/// Shared executor: configuration plus transport.
#[derive(Clone)]
pub struct Executor {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Build the request without sending it.
    pub fn build_request(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), JSON.to_string()),
            ("Content-Type".to_string(), JSON.to_string()),
            ("Authorization".to_string(), self.config.authorization()),
        ];
        for (name, value) in options.headers {
            match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
                Some(existing) => existing.1 = value,
                None => headers.push((name, value)),
            }
        }

        HttpRequest {
            method: options.method,
            url: format!("{}{}", self.config.base_url(), endpoint),
            headers,
            body: options.body,
            timeout: options.timeout.or(self.config.timeout()),
        }
    }

    /// Perform one call and decode the outcome according to `kind`.
    pub fn execute(&self, endpoint: &str, kind: RequestKind, options: RequestOptions) -> ApiResponse<Payload> {
        let request = self.build_request(endpoint, options);
        debug!(method = %request.method, url = %request.url, %kind, "sending request");

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %request.method, url = %request.url, error = %err, "transport failure");
                return ApiResponse::failure(non_empty(err.to_string()));
            }
        };
        debug!(status = response.status, %kind, "received response");

        interpret(kind, &response)
    }

    /// `execute`, then narrow the payload to the type the caller expects.
    pub(crate) fn call<T>(&self, endpoint: &str, kind: RequestKind, options: RequestOptions) -> ApiResponse<T>
    where
        T: TryFrom<Payload, Error = Payload>,
    {
        match self.execute(endpoint, kind, options) {
            ApiResponse::Success { data, message } => match T::try_from(data) {
                Ok(data) => ApiResponse::Success { data, message },
                Err(other) => ApiResponse::failure(format!(
                    "unexpected {} payload for {kind} request",
                    other.variant_name()
                )),
            },
            ApiResponse::Failure { message } => ApiResponse::Failure { message },
        }
    }

    /// `call` with a JSON body; a body that fails to serialize becomes a failure envelope.
    pub(crate) fn call_json<T, B>(
        &self,
        endpoint: &str,
        kind: RequestKind,
        method: HttpMethod,
        body: &B,
    ) -> ApiResponse<T>
    where
        T: TryFrom<Payload, Error = Payload>,
        B: serde::Serialize + ?Sized,
    {
        match RequestOptions::new(method).json(body) {
            Ok(options) => self.call(endpoint, kind, options),
            Err(err) => ApiResponse::failure(err.to_string()),
        }
    }
}

/// Fold a received response into an envelope.
fn interpret(kind: RequestKind, response: &HttpResponse) -> ApiResponse<Payload> {
    if !response.is_success() {
        let message = serde_json::from_slice::<VendorError>(&response.body)
            .ok()
            .and_then(VendorError::into_message)
            .unwrap_or_else(|| status_line(response));
        debug!(status = response.status, %message, "vendor rejected request");
        return ApiResponse::failure(message);
    }

    match normalize(kind, &response.body) {
        Ok(decoded) => ApiResponse::Success {
            data: decoded.payload,
            message: decoded.message,
        },
        Err(err) => ApiResponse::failure(non_empty(err.to_string())),
    }
}

fn status_line(response: &HttpResponse) -> String {
    if response.status_text.is_empty() {
        format!("HTTP error {}", response.status)
    } else {
        format!("HTTP error {}: {}", response.status, response.status_text)
    }
}

fn non_empty(message: String) -> String {
    if message.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTransport;
    use crate::types::{DocumentNumber, Tax};

    fn executor(transport: &Arc<StubTransport>) -> Executor {
        let config = Config::new("user", "token").with_base_url("http://mock/api");
        Executor::new(config, transport.clone())
    }

    #[test]
    fn injects_json_and_auth_headers() {
        let transport = Arc::new(StubTransport::new());
        let req = executor(&transport).build_request("/tax?cif=RO1", RequestOptions::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://mock/api/tax?cif=RO1");
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Basic dXNlcjp0b2tlbg==".to_string()),
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn caller_headers_override_defaults() {
        let transport = Arc::new(StubTransport::new());
        let options = RequestOptions::default()
            .header("accept", "application/octet-stream")
            .header("X-Trace", "1");
        let req = executor(&transport).build_request("/invoice/pdf", options);
        assert_eq!(req.header("Accept"), Some("application/octet-stream"));
        assert_eq!(req.header("x-trace"), Some("1"));
        assert_eq!(req.headers.len(), 4);
    }

    #[test]
    fn call_json_accepts_unsized_bodies() {
        let transport = Arc::new(StubTransport::new());
        let exec = executor(&transport);

        let ids: &[u32] = &[1, 2];
        let resp: ApiResponse<()> = exec.call_json("/ids", RequestKind::Void, HttpMethod::Post, ids);
        assert!(resp.is_success());
        assert_eq!(transport.last_request().body.as_deref(), Some("[1,2]"));

        let resp: ApiResponse<()> = exec.call_json("/note", RequestKind::Void, HttpMethod::Put, "hello");
        assert!(resp.is_success());
        assert_eq!(transport.last_request().body.as_deref(), Some(r#""hello""#));
    }

    #[test]
    fn timeout_falls_back_to_config() {
        let transport = Arc::new(StubTransport::new());
        let config = Config::new("u", "t").with_timeout(Duration::from_secs(30));
        let exec = Executor::new(config, transport.clone());

        let req = exec.build_request("/tax", RequestOptions::default());
        assert_eq!(req.timeout, Some(Duration::from_secs(30)));

        let options = RequestOptions {
            timeout: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        assert_eq!(exec.build_request("/tax", options).timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn success_decodes_by_kind() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(200, r#"{"series":"FCT","number":"0203","extra":"ignored"}"#);
        let resp: ApiResponse<DocumentNumber> =
            executor(&transport).call("/invoice", RequestKind::DocumentCreate, RequestOptions::new(HttpMethod::Post));
        assert_eq!(
            resp,
            ApiResponse::success(DocumentNumber {
                series: "FCT".to_string(),
                number: "0203".to_string(),
            })
        );
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn error_text_wins_over_message() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(400, r#"{"errorText":"A","message":"B"}"#);
        let resp = executor(&transport).execute("/invoice", RequestKind::Void, RequestOptions::default());
        assert_eq!(resp, ApiResponse::failure("A"));
    }

    #[test]
    fn message_used_when_error_text_missing() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(404, r#"{"message":"B"}"#);
        let resp = executor(&transport).execute("/invoice", RequestKind::Void, RequestOptions::default());
        assert_eq!(resp.message(), Some("B"));
    }

    #[test]
    fn status_line_synthesized_for_unparseable_error_body() {
        let transport = Arc::new(StubTransport::new());
        transport.push_raw(502, "Bad Gateway", b"<html>upstream down</html>");
        let resp = executor(&transport).execute("/series", RequestKind::SeriesList, RequestOptions::default());
        assert_eq!(resp, ApiResponse::failure("HTTP error 502: Bad Gateway"));
    }

    #[test]
    fn status_line_synthesized_for_empty_vendor_fields() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(500, r#"{"errorText":"","message":""}"#);
        let resp = executor(&transport).execute("/tax", RequestKind::TaxList, RequestOptions::default());
        assert_eq!(resp.message(), Some("HTTP error 500: Internal Server Error"));
    }

    #[test]
    fn status_line_without_reason_phrase_has_no_separator() {
        let transport = Arc::new(StubTransport::new());
        transport.push_raw(520, "", b"");
        let resp = executor(&transport).execute("/tax", RequestKind::TaxList, RequestOptions::default());
        assert_eq!(resp.message(), Some("HTTP error 520"));
    }

    #[test]
    fn transport_failure_becomes_failure_envelope() {
        let transport = Arc::new(StubTransport::new());
        transport.push_error("connection refused");
        let resp = executor(&transport).execute("/tax", RequestKind::TaxList, RequestOptions::default());
        assert_eq!(resp, ApiResponse::failure("connection refused"));
    }

    #[test]
    fn empty_transport_message_becomes_unknown_error() {
        let transport = Arc::new(StubTransport::new());
        transport.push_error("");
        let resp = executor(&transport).execute("/tax", RequestKind::TaxList, RequestOptions::default());
        assert_eq!(resp.message(), Some("Unknown error occurred"));
    }

    #[test]
    fn malformed_success_body_is_a_failure() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(200, "{not json");
        let resp: ApiResponse<Vec<Tax>> =
            executor(&transport).call("/tax", RequestKind::TaxList, RequestOptions::default());
        assert!(!resp.is_success());
        assert!(!resp.message().unwrap().is_empty());
    }

    #[test]
    fn mismatched_payload_type_is_a_failure() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(200, r#"{"message":"ok"}"#);
        let resp: ApiResponse<Vec<Tax>> =
            executor(&transport).call("/tax", RequestKind::Void, RequestOptions::default());
        assert_eq!(resp.message(), Some("unexpected empty payload for void request"));
    }

    #[test]
    fn json_options_serialize_body() {
        let options = RequestOptions::new(HttpMethod::Post)
            .json(&serde_json::json!({"cif": "RO1"}))
            .unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"cif":"RO1"}"#));
    }
}
