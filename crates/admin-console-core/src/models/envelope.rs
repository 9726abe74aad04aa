//! Response wrapper shared by every endpoint of the management API.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// `{ success, data?, message?, errorCode? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl Envelope {
    /// Parse an envelope from a raw response body
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Extract only the `message` field from an arbitrary error body.
    /// Error responses are not always full envelopes.
    pub fn message_from(body: &str) -> Option<String> {
        #[derive(Deserialize)]
        struct MessageOnly {
            message: Option<String>,
        }
        serde_json::from_str::<MessageOnly>(body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty())
    }

    /// Deserialize the `data` payload. A missing payload is treated as JSON null,
    /// so `()` and `Option<T>` targets succeed on message-only responses.
    pub fn into_data<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(self.data.unwrap_or(Value::Null))
    }
}

/// One page of a server-side paged list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}
