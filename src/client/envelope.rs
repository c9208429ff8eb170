//! The `{success, message, data}` wrapper every endpoint answers with

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::TransportResponse;
use crate::error::{ApiError, Result};

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Decode the envelope from a raw response.
    ///
    /// An error status never counts as success, whatever the body claims.
    /// A body that is not an envelope is an invalid response.
    pub fn decode(response: &TransportResponse) -> Result<Self> {
        let mut envelope: Envelope = serde_json::from_str(&response.body).map_err(|e| {
            if response.is_success() {
                ApiError::InvalidResponse(format!("Failed to parse response envelope: {}", e))
            } else {
                ApiError::InvalidResponse(format!(
                    "HTTP {}: {}",
                    response.status,
                    truncate(&response.body, 200)
                ))
            }
        })?;

        if !response.is_success() && envelope.success {
            envelope.success = false;
            if envelope.message.is_empty() {
                envelope.message = format!("HTTP {}", response.status);
            }
        }

        Ok(envelope)
    }

    /// The payload if the server reported success, otherwise `ResponseNotOk`
    pub fn into_data(self) -> Result<Value> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::ResponseNotOk(self.message).into())
        }
    }
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
