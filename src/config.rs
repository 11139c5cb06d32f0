//! Configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use crate::camera::Size;
use crate::error::MapError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_FLOOR_DIR: &str = "floors";
pub const DEFAULT_FLOOR: &str = "B";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONTAINER_WIDTH: f64 = 900.0;
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Where floor-plan documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorLocation {
    /// A local directory of `Floor_{id}.svg` files.
    Dir(PathBuf),
    /// A base URL serving `Floor_{id}.svg`.
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub api_base_url: String,
    pub floors: FloorLocation,
    pub default_floor: String,
    pub timeouts: HttpTimeouts,
    pub container: Size,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            floors: FloorLocation::Dir(PathBuf::from(DEFAULT_FLOOR_DIR)),
            default_floor: DEFAULT_FLOOR.to_owned(),
            timeouts: HttpTimeouts::default(),
            container: Size::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT),
        }
    }
}

impl MapConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `FLOORMAP_API_BASE_URL`: route/room service base, default `http://localhost:5000`
    /// - `FLOORMAP_FLOOR_DIR` or `FLOORMAP_FLOOR_BASE_URL` (not both): default dir `floors`
    /// - `FLOORMAP_DEFAULT_FLOOR`: default `B`
    /// - `FLOORMAP_REQUEST_TIMEOUT_SECS`: default 10
    /// - `FLOORMAP_CONNECT_TIMEOUT_SECS`: default 5
    /// - `FLOORMAP_CONTAINER_WIDTH` / `FLOORMAP_CONTAINER_HEIGHT`: default 900×600
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Config`] for conflicting floor locations or a non-positive container size.
    pub fn from_env() -> Result<Self, MapError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`MapConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`MapConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MapError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_base_url = var("FLOORMAP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let floors = match (var("FLOORMAP_FLOOR_DIR"), var("FLOORMAP_FLOOR_BASE_URL")) {
            (Some(_), Some(_)) => {
                return Err(MapError::Config(
                    "set only one of FLOORMAP_FLOOR_DIR and FLOORMAP_FLOOR_BASE_URL".into(),
                ));
            }
            (Some(dir), None) => FloorLocation::Dir(PathBuf::from(dir)),
            (None, Some(url)) => FloorLocation::Url(url.trim_end_matches('/').to_owned()),
            (None, None) => FloorLocation::Dir(PathBuf::from(DEFAULT_FLOOR_DIR)),
        };

        let default_floor = var("FLOORMAP_DEFAULT_FLOOR").unwrap_or_else(|| DEFAULT_FLOOR.to_owned());

        let timeouts = HttpTimeouts {
            request_secs: parse_u64(var("FLOORMAP_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(var("FLOORMAP_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let container = Size::new(
            parse_dimension("FLOORMAP_CONTAINER_WIDTH", var("FLOORMAP_CONTAINER_WIDTH"), DEFAULT_CONTAINER_WIDTH)?,
            parse_dimension("FLOORMAP_CONTAINER_HEIGHT", var("FLOORMAP_CONTAINER_HEIGHT"), DEFAULT_CONTAINER_HEIGHT)?,
        );

        Ok(Self { api_base_url, floors, default_floor, timeouts, container })
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}

fn parse_dimension(key: &str, raw: Option<String>, default: f64) -> Result<f64, MapError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(MapError::Config(format!("{key} must be a positive number, got '{raw}'"))),
    }
}
