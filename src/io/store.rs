// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay store client.

use super::api::{Ack, ApiClient};
use crate::error::DeckResult;
use crate::models::overlay::{Overlay, OverlayDraft, OverlayPatch};
use serde::Deserialize;

/// Remote overlay persistence.
pub trait OverlayStore: Send + Sync {
    fn list(&self) -> DeckResult<Vec<Overlay>>;
    fn create(&self, draft: &OverlayDraft) -> DeckResult<Overlay>;
    fn update(&self, id: &str, patch: &OverlayPatch) -> DeckResult<Overlay>;
    fn delete(&self, id: &str) -> DeckResult<()>;
}

#[derive(Debug, Deserialize)]
struct OverlayListResponse {
    overlays: Vec<Overlay>,
}

#[derive(Debug, Deserialize)]
struct OverlayResponse {
    overlay: Overlay,
}

/// Overlay store backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpOverlayStore {
    api: ApiClient,
}

impl HttpOverlayStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl OverlayStore for HttpOverlayStore {
    fn list(&self) -> DeckResult<Vec<Overlay>> {
        let response: OverlayListResponse = self.api.get("/overlays")?;
        log::info!("Fetched {} overlays", response.overlays.len());
        Ok(response.overlays)
    }

    fn create(&self, draft: &OverlayDraft) -> DeckResult<Overlay> {
        let response: OverlayResponse = self.api.post("/overlays", draft)?;
        log::info!("Created overlay {}", response.overlay.id);
        Ok(response.overlay)
    }

    fn update(&self, id: &str, patch: &OverlayPatch) -> DeckResult<Overlay> {
        let response: OverlayResponse = self.api.put(&format!("/overlays/{}", id), patch)?;
        log::debug!("Updated overlay {}", id);
        Ok(response.overlay)
    }

    fn delete(&self, id: &str) -> DeckResult<()> {
        let _: Ack = self.api.delete(&format!("/overlays/{}", id))?;
        log::info!("Deleted overlay {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::decode;

    #[test]
    fn test_list_response_shape() {
        let body = r#"{
            "success": true,
            "overlays": [
                {"id": "1", "type": "text", "content": "LIVE", "position": {"x": 100, "y": 100}},
                {"id": "2", "type": "image", "content": "https://example.com/a.png",
                 "positionPercent": {"x": 5, "y": 5}, "sizePercent": {"width": 20, "height": 20}}
            ]
        }"#;

        let response: OverlayListResponse = decode(body).unwrap();
        assert_eq!(response.overlays.len(), 2);
        assert_eq!(response.overlays[1].normalized_size.unwrap().width_pct, 20.0);
    }

    #[test]
    fn test_create_response_shape() {
        let body = r#"{"success": true, "id": "9", "overlay": {"id": "9", "type": "text", "content": "hi"}}"#;
        let response: OverlayResponse = decode(body).unwrap();
        assert_eq!(response.overlay.id, "9");
    }
}
