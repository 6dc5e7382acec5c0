// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client for the backend REST API.
//!
//! Every response is a JSON envelope carrying a `success` flag. Failures are
//! turned into [`DeckError::Remote`] with the message from the body's
//! `error` (or `message`) field when there is one.

use crate::error::{DeckError, DeckResult};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shown when the request never got a response.
pub const NETWORK_FAILURE: &str = "No response from server. Please check if the backend is running.";
/// Shown when a failure carried no readable message.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract the human-readable message from an error body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// Decode a successful response body, honouring `"success": false`.
pub fn decode<T: DeserializeOwned>(body: &str) -> DeckResult<T> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        log::error!("Malformed response body: {}", e);
        DeckError::remote(GENERIC_FAILURE)
    })?;

    if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
        return Err(DeckError::Remote(error_message(body)));
    }

    serde_json::from_value(value).map_err(|e| {
        log::error!("Unexpected response shape: {}", e);
        DeckError::remote(GENERIC_FAILURE)
    })
}

/// Blocking JSON client bound to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying client, for requests outside the API (image fetches).
    pub fn http(&self) -> &reqwest::blocking::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> DeckResult<T> {
        self.send(self.client.get(self.url(path)))
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> DeckResult<T> {
        self.send(self.client.post(self.url(path)).json(body))
    }

    pub fn post_empty<T: DeserializeOwned>(&self, path: &str) -> DeckResult<T> {
        self.send(self.client.post(self.url(path)))
    }

    pub fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> DeckResult<T> {
        self.send(self.client.put(self.url(path)).json(body))
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> DeckResult<T> {
        self.send(self.client.delete(self.url(path)))
    }

    fn send<T: DeserializeOwned>(&self, request: reqwest::blocking::RequestBuilder) -> DeckResult<T> {
        let response = request.send().map_err(|e| {
            log::error!("Network error: {}", e);
            DeckError::remote(NETWORK_FAILURE)
        })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            log::error!("Failed to read response body: {}", e);
            DeckError::remote(NETWORK_FAILURE)
        })?;

        if !status.is_success() {
            log::error!("HTTP {} error: {}", status.as_u16(), body);
            return Err(DeckError::Remote(error_message(&body)));
        }

        decode(&body)
    }
}

/// Body of responses that carry nothing but a status.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"success": false, "error": "Overlay not found: abc", "message": "x"}"#),
            "Overlay not found: abc"
        );
        assert_eq!(error_message(r#"{"message": "Stream stopped"}"#), "Stream stopped");
    }

    #[test]
    fn test_error_message_falls_back() {
        assert_eq!(error_message("<html>502 Bad Gateway</html>"), GENERIC_FAILURE);
        assert_eq!(error_message(r#"{"error": "  "}"#), GENERIC_FAILURE);
        assert_eq!(error_message(""), GENERIC_FAILURE);
    }

    #[test]
    fn test_decode_rejects_unsuccessful_envelope() {
        let result: DeckResult<Ack> = decode(r#"{"success": false, "error": "Stream URL is required"}"#);
        assert_eq!(result.unwrap_err(), DeckError::remote("Stream URL is required"));
    }

    #[test]
    fn test_decode_success() {
        let ack: Ack = decode(r#"{"success": true, "message": "Overlay deleted successfully"}"#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Overlay deleted successfully"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/overlays"), "http://localhost:5001/api/overlays");
    }
}
