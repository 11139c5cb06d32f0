//! Route payloads and the navigation path model.
//!
//! The route service answers a [`RouteRequest`] with a [`RouteResponse`]. The
//! response is validated once into an immutable [`NavigationPath`]: an ordered
//! list of per-floor [`PathSegment`]s. A "no route" answer is an empty path
//! plus a message, not an error; only malformed payloads fail.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::error::MapError;

pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to find a path.";
pub const NO_PATH_NEEDED_MESSAGE: &str = "Navigation successful (no path needed).";
pub const MISSING_ENDPOINTS_MESSAGE: &str = "Please select both FROM and TO locations.";
pub const SAME_ENDPOINTS_MESSAGE: &str = "Start and end locations cannot be the same.";
pub const UNEXPECTED_PAYLOAD_MESSAGE: &str = "Received unexpected data from the server.";

// =============================================================
// Wire types
// =============================================================

/// Request body for the route service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
}

impl RouteRequest {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }

    /// Both endpoints present and distinct.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidPath`] naming what is wrong.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(MapError::InvalidPath(MISSING_ENDPOINTS_MESSAGE.into()));
        }
        if self.from == self.to {
            return Err(MapError::InvalidPath(SAME_ENDPOINTS_MESSAGE.into()));
        }
        Ok(())
    }
}

/// Route service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Success,
    Error,
}

/// One segment as sent by the route service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSegment {
    pub floor: String,
    #[serde(default)]
    pub coords: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node_type: Option<String>,
}

/// Route service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub status: RouteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_segments: Option<Vec<WireSegment>>,
}

impl RouteResponse {
    /// Error response carrying `message`, for transport failures surfaced like service errors.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { status: RouteStatus::Error, message: Some(message.into()), path_segments: None }
    }
}

/// Decode a raw route payload.
///
/// # Errors
///
/// Returns [`MapError::InvalidPath`] when the bytes are not a route response.
pub fn parse_route_payload(body: &str) -> Result<RouteResponse, MapError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "route payload did not decode");
        MapError::InvalidPath(UNEXPECTED_PAYLOAD_MESSAGE.into())
    })
}

// =============================================================
// Model
// =============================================================

/// How a segment ends, which decides the instruction for moving to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndNodeType {
    #[default]
    None,
    Stairs,
    Elevator,
}

impl EndNodeType {
    /// Classify by case-insensitive prefix, so `"Stairs_2"` is stairs.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::None;
        };
        let lower = raw.trim().to_ascii_lowercase();
        if lower.starts_with("stairs") {
            Self::Stairs
        } else if lower.starts_with("elevator") {
            Self::Elevator
        } else {
            Self::None
        }
    }
}

/// The part of a route confined to one floor.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub floor_id: String,
    /// At least one point, all finite, in the floor's native coordinates.
    pub points: Vec<Point>,
    pub end_node_type: EndNodeType,
}

impl PathSegment {
    /// Validate and build a segment.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidPath`] for an empty point list or non-finite coordinates.
    pub fn new(floor_id: impl Into<String>, points: Vec<Point>, end_node_type: EndNodeType) -> Result<Self, MapError> {
        let floor_id = floor_id.into();
        if points.is_empty() {
            return Err(MapError::InvalidPath(format!("segment on floor {floor_id} has no points")));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(MapError::InvalidPath(format!(
                "segment on floor {floor_id} has non-finite point ({}, {})",
                bad.x, bad.y
            )));
        }
        Ok(Self { floor_id, points, end_node_type })
    }

    fn from_wire(wire: &WireSegment) -> Result<Self, MapError> {
        let points = wire
            .coords
            .iter()
            .map(|pair| match pair.as_slice() {
                [x, y] => Ok(Point::new(*x, *y)),
                other => Err(MapError::InvalidPath(format!(
                    "segment on floor {} has a coordinate with {} values",
                    wire.floor,
                    other.len()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(wire.floor.clone(), points, EndNodeType::parse(wire.end_node_type.as_deref()))
    }

    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// An ordered, immutable multi-floor route. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationPath {
    segments: Vec<PathSegment>,
}

/// A validated route plus the message to display with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub path: NavigationPath,
    pub message: String,
}

impl NavigationPath {
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate a route response.
    ///
    /// An `error` status or a success without segments yields an empty path and a message.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidPath`] if any segment is malformed.
    pub fn from_response(response: &RouteResponse) -> Result<RouteOutcome, MapError> {
        match response.status {
            RouteStatus::Error => Ok(RouteOutcome {
                path: Self::empty(),
                message: non_blank(response.message.as_deref()).unwrap_or(FALLBACK_ERROR_MESSAGE).to_owned(),
            }),
            RouteStatus::Success => {
                let wire = response.path_segments.as_deref().unwrap_or_default();
                let segments = wire
                    .iter()
                    .map(PathSegment::from_wire)
                    .collect::<Result<Vec<_>, _>>()?;
                let message = match non_blank(response.message.as_deref()) {
                    Some(m) => m.to_owned(),
                    None if segments.is_empty() => NO_PATH_NEEDED_MESSAGE.to_owned(),
                    None => format!("Path found. Displaying segment 1 of {}.", segments.len()),
                };
                Ok(RouteOutcome { path: Self { segments }, message })
            }
        }
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn segment_at(&self, index: usize) -> Option<&PathSegment> {
        self.segments.get(index)
    }

    #[must_use]
    pub fn is_first(&self, index: usize) -> bool {
        index == 0 && !self.segments.is_empty()
    }

    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        !self.segments.is_empty() && index == self.segments.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|m| !m.trim().is_empty())
}
