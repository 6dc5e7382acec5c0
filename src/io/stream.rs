// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream conversion service client.
//!
//! The backend converts a source stream (RTSP) into an HLS playlist the
//! player can attach to.

use super::api::{Ack, ApiClient};
use crate::error::DeckResult;
use crate::models::session::StreamStatus;
use serde::{Deserialize, Serialize};

/// Remote conversion pipeline.
pub trait StreamService: Send + Sync {
    /// Start converting `source_url`; returns the playable URL.
    fn start(&self, source_url: &str) -> DeckResult<String>;
    fn stop(&self) -> DeckResult<()>;
    fn status(&self) -> DeckResult<StreamStatus>;
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    rtsp_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    hls_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    active: bool,
    #[serde(default)]
    rtsp_url: Option<String>,
}

/// Conversion service backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpStreamService {
    api: ApiClient,
}

impl HttpStreamService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl StreamService for HttpStreamService {
    fn start(&self, source_url: &str) -> DeckResult<String> {
        log::info!("Requesting conversion of {}", source_url);
        let response: StartResponse = self
            .api
            .post("/stream/start", &StartRequest { rtsp_url: source_url })?;
        log::info!("Playable URL: {}", response.hls_url);
        Ok(response.hls_url)
    }

    fn stop(&self) -> DeckResult<()> {
        let ack: Ack = self.api.post_empty("/stream/stop")?;
        log::info!("{}", ack.message.as_deref().unwrap_or("Stream stopped"));
        Ok(())
    }

    fn status(&self) -> DeckResult<StreamStatus> {
        let response: StatusResponse = self.api.get("/stream/status")?;
        Ok(StreamStatus {
            active: response.active,
            source_url: response.rtsp_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::decode;

    #[test]
    fn test_start_request_body() {
        let body = serde_json::to_value(StartRequest { rtsp_url: "rtsp://cam/1" }).unwrap();
        assert_eq!(body, serde_json::json!({"rtsp_url": "rtsp://cam/1"}));
    }

    #[test]
    fn test_status_response_when_idle() {
        let response: StatusResponse = decode(r#"{"success": true, "active": false, "rtsp_url": null}"#).unwrap();
        assert!(!response.active);
        assert!(response.rtsp_url.is_none());
    }
}
