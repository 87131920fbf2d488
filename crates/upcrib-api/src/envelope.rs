//! The backend's JSON response envelope.

use serde::Deserialize;
use upcrib_core::{Result, UpcribError};

/// Error payload inside a failed envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Every `/api` endpoint wraps its payload in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the payload, surfacing the server-supplied message (falling
    /// back to `fallback`) when the envelope reports failure or carries no
    /// data.
    pub fn into_data(self, fallback: &str) -> Result<T> {
        if !self.success {
            let (message, code) = match self.error {
                Some(err) => (err.message, err.code),
                None => (fallback.to_string(), None),
            };
            return Err(UpcribError::Api { message, code });
        }
        self.data
            .ok_or_else(|| UpcribError::api(fallback.to_string()))
    }
}
