use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PhishnetError, Result};

/// Decoded API payload.
///
/// `error_code == 0` is the only success signal; anything above zero is an
/// application failure no matter what the HTTP status said.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub error_code: i64,
    pub error_message: Option<String>,
    pub count: Option<u64>,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    error_code: i64,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    response: Option<WirePayload>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePayload {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    data: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }

    /// Decodes a response body. A positive `error_code` becomes
    /// [`PhishnetError::Api`].
    pub fn decode(endpoint: &str, body: &str) -> Result<Self> {
        let wire: WireResponse =
            serde_json::from_str(body).map_err(|source| PhishnetError::Decode {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        if wire.error_code > 0 {
            return Err(PhishnetError::Api {
                endpoint: endpoint.to_owned(),
                code: wire.error_code,
                message: wire.error_message.filter(|m| !m.is_empty()),
            });
        }

        let payload = wire.response.unwrap_or_default();
        Ok(Self {
            error_code: wire.error_code,
            error_message: wire.error_message,
            count: payload.count,
            data: payload.data,
        })
    }
}
