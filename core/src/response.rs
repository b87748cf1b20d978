//! The uniform success/failure envelope returned by every operation.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Outcome of one API call.
///
/// A payload exists only on success. Failures carry a human-readable message
/// that already reflects the vendor's `errorText` when one was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: T, message: Option<String> },
    Failure { message: String },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success { data, message: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiResponse::Success { message, .. } => message.as_deref(),
            ApiResponse::Failure { message } => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success { data, message } => ApiResponse::Success {
                data: f(data),
                message,
            },
            ApiResponse::Failure { message } => ApiResponse::Failure { message },
        }
    }

    /// Convert into a `Result`, keeping only the failure message on error.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure { message } => Err(message),
        }
    }
}

/// Serializes as `{"success": bool, "data"?: .., "message"?: ..}`.
impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResponse::Success { data, message } => {
                let len = if message.is_some() { 3 } else { 2 };
                let mut state = serializer.serialize_struct("ApiResponse", len)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                if let Some(message) = message {
                    state.serialize_field("message", message)?;
                }
                state.end()
            }
            ApiResponse::Failure { message } => {
                let mut state = serializer.serialize_struct("ApiResponse", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("message", message)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_present_only_on_success() {
        let ok: ApiResponse<u32> = ApiResponse::success(7);
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&7));
        assert_eq!(ok.message(), None);

        let err: ApiResponse<u32> = ApiResponse::failure("boom");
        assert!(!err.is_success());
        assert_eq!(err.data(), None);
        assert_eq!(err.message(), Some("boom"));
    }

    #[test]
    fn map_keeps_message() {
        let resp = ApiResponse::Success {
            data: 2,
            message: Some("done".to_string()),
        }
        .map(|n| n * 10);
        assert_eq!(resp.data(), Some(&20));
        assert_eq!(resp.message(), Some("done"));
    }

    #[test]
    fn into_result_splits_variants() {
        assert_eq!(ApiResponse::success("x").into_result(), Ok("x"));
        assert_eq!(
            ApiResponse::<()>::failure("nope").into_result(),
            Err("nope".to_string())
        );
    }

    #[test]
    fn serializes_with_success_flag() {
        let ok = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(ok, json!({"success": true, "data": [1, 2]}));

        let err = serde_json::to_value(ApiResponse::<()>::failure("denied")).unwrap();
        assert_eq!(err, json!({"success": false, "message": "denied"}));
    }
}
