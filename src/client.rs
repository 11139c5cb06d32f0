//! Route and room service client.
//!
//! Thin HTTP wrapper over `POST /api/navigate` and `GET /api/rooms`. Status
//! handling and decoding live in pure `parse_*` functions for testability.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{HttpTimeouts, MapConfig};
use crate::error::MapError;
use crate::rooms::Room;
use crate::route::{RouteRequest, RouteResponse, parse_route_payload};

pub const NAVIGATE_PATH: &str = "/api/navigate";
pub const ROOMS_PATH: &str = "/api/rooms";
pub const INVALID_ROOMS_MESSAGE: &str = "Error loading locations (invalid data format).";

pub struct NavApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl NavApiClient {
    /// # Errors
    ///
    /// Returns [`MapError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, MapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| MapError::Http(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// # Errors
    ///
    /// See [`NavApiClient::new`].
    pub fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        Self::new(&config.api_base_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the room directory.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Http`] on transport failure, a non-success status or a non-array payload.
    pub async fn fetch_rooms(&self) -> Result<Vec<Room>, MapError> {
        let url = format!("{}{ROOMS_PATH}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MapError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| MapError::Http(e.to_string()))?;
        let rooms = parse_rooms_response(status, &text)?;
        info!(count = rooms.len(), "room directory loaded");
        Ok(rooms)
    }

    /// Ask the route service for a path.
    ///
    /// # Errors
    ///
    /// - [`MapError::InvalidPath`] if the request fails validation or the payload is malformed.
    /// - [`MapError::Http`] on transport failure or a non-success status.
    pub async fn navigate(&self, request: &RouteRequest) -> Result<RouteResponse, MapError> {
        request.validate()?;
        let url = format!("{}{NAVIGATE_PATH}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| MapError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| MapError::Http(e.to_string()))?;
        parse_navigate_response(status, &text)
    }
}

// =============================================================
// PARSING
// =============================================================

/// Message for a non-success response: the body's `message` field, else the bare status.
#[must_use]
pub fn http_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

/// Decode a route service response.
///
/// # Errors
///
/// Returns [`MapError::Http`] for non-success statuses and [`MapError::InvalidPath`] for malformed bodies.
pub fn parse_navigate_response(status: u16, body: &str) -> Result<RouteResponse, MapError> {
    if !(200..300).contains(&status) {
        let message = http_error_message(status, body);
        warn!(status, %message, "route request failed");
        return Err(MapError::Http(message));
    }
    parse_route_payload(body)
}

/// Decode a room directory response.
///
/// # Errors
///
/// Returns [`MapError::Http`] for non-success statuses or a payload that is not an array of rooms.
pub fn parse_rooms_response(status: u16, body: &str) -> Result<Vec<Room>, MapError> {
    if !(200..300).contains(&status) {
        return Err(MapError::Http(http_error_message(status, body)));
    }
    serde_json::from_str::<Vec<Room>>(body).map_err(|e| {
        warn!(error = %e, "room directory payload did not decode");
        MapError::Http(INVALID_ROOMS_MESSAGE.into())
    })
}
