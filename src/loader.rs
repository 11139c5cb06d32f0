//! Floor-plan loading: catalog lookup, async sources and stale-load suppression.
//!
//! DESIGN
//! ======
//! Fetches are asynchronous, but only the most recently requested floor may
//! commit. Every [`FloorPlanLoader::request`] bumps a generation counter and
//! hands out a [`LoadTicket`] stamped with it; [`FloorPlanLoader::complete`]
//! drops any result whose ticket is no longer current. Cancelling bumps the
//! generation too, so an in-flight fetch cannot resurrect a loading or error
//! state after the user has moved on. The network request itself is not
//! aborted.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{FloorLocation, HttpTimeouts, MapConfig};
use crate::error::{ErrorCode, MapError};
use crate::plan::{FloorPlan, parse_floor_plan};

const FLOOR_FILE_PREFIX: &str = "Floor_";
const FLOOR_FILE_SUFFIX: &str = ".svg";

/// File name of a floor's plan document.
#[must_use]
pub fn floor_file_name(floor: &str) -> String {
    format!("{FLOOR_FILE_PREFIX}{floor}{FLOOR_FILE_SUFFIX}")
}

/// Canonical floor id: the last whitespace-separated token, upper-cased.
/// `"Floor a"` and `"A"` both become `"A"`.
#[must_use]
pub fn normalize_floor_id(raw: &str) -> Option<String> {
    raw.split_whitespace().last().map(str::to_uppercase)
}

// =============================================================
// Catalog
// =============================================================

/// A floor id resolved to the document that holds its plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFloor {
    pub floor: String,
    pub uri: String,
}

/// Maps floor identifiers to floor-plan resource URIs.
///
/// Known floors come from explicit entries (or a directory scan). A catalog
/// built over a location with no entries accepts any floor id and derives its
/// URI from the `Floor_{id}.svg` pattern. Unknown ids fall back to the
/// default floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorCatalog {
    entries: BTreeMap<String, String>,
    pattern_base: Option<String>,
    default_floor: String,
}

impl FloorCatalog {
    /// Empty catalog. Add floors with [`FloorCatalog::with_entry`].
    #[must_use]
    pub fn new(default_floor: &str) -> Self {
        Self {
            entries: BTreeMap::new(),
            pattern_base: None,
            default_floor: normalize_floor_id(default_floor).unwrap_or_default(),
        }
    }

    /// Open catalog over a location. Directory URIs are bare file names,
    /// resolved against the directory by [`DirFloorSource`].
    #[must_use]
    pub fn from_location(location: &FloorLocation, default_floor: &str) -> Self {
        let base = match location {
            FloorLocation::Dir(_) => String::new(),
            FloorLocation::Url(url) => format!("{}/", url.trim_end_matches('/')),
        };
        Self { pattern_base: Some(base), ..Self::new(default_floor) }
    }

    /// Catalog of the `Floor_{id}.svg` files present in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Load`] if the directory cannot be read.
    pub async fn scan_dir(dir: &Path, default_floor: &str) -> Result<Self, MapError> {
        let load_err = |e: std::io::Error| MapError::Load { uri: dir.display().to_string(), reason: e.to_string() };
        let mut catalog = Self::new(default_floor);
        let mut read = tokio::fs::read_dir(dir).await.map_err(load_err)?;
        while let Some(entry) = read.next_entry().await.map_err(load_err)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(floor) = name
                .strip_prefix(FLOOR_FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FLOOR_FILE_SUFFIX))
                .and_then(normalize_floor_id)
            else {
                continue;
            };
            catalog.entries.insert(floor, name);
        }
        debug!(dir = %dir.display(), floors = catalog.entries.len(), "scanned floor directory");
        Ok(catalog)
    }

    /// Register `floor` at `uri`.
    #[must_use]
    pub fn with_entry(mut self, floor: &str, uri: impl Into<String>) -> Self {
        if let Some(floor) = normalize_floor_id(floor) {
            self.entries.insert(floor, uri.into());
        }
        self
    }

    #[must_use]
    pub fn default_floor(&self) -> &str {
        &self.default_floor
    }

    /// Known floor ids, sorted. Empty for an open catalog.
    pub fn floors(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve `raw` (e.g. `"A"` or `"Floor A"`), falling back to the default floor.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<ResolvedFloor> {
        if let Some(found) = normalize_floor_id(raw).and_then(|floor| self.lookup(&floor)) {
            return Some(found);
        }
        let fallback = self.lookup(&self.default_floor)?;
        debug!(requested = raw, floor = %fallback.floor, "unknown floor, using default");
        Some(fallback)
    }

    fn lookup(&self, floor: &str) -> Option<ResolvedFloor> {
        if floor.is_empty() {
            return None;
        }
        let uri = match (self.entries.get(floor), &self.pattern_base) {
            (Some(uri), _) => uri.clone(),
            (None, Some(base)) if self.entries.is_empty() => format!("{base}{}", floor_file_name(floor)),
            _ => return None,
        };
        Some(ResolvedFloor { floor: floor.to_owned(), uri })
    }
}

// =============================================================
// Sources
// =============================================================

/// Fetches floor-plan documents. Enables mocking in tests.
#[async_trait::async_trait]
pub trait FloorSource: Send + Sync {
    /// Retrieve the raw document at `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Load`] if the resource is unreachable or answers with a failure.
    async fn fetch(&self, uri: &str) -> Result<String, MapError>;
}

/// Floor plans served over HTTP.
pub struct HttpFloorSource {
    http: reqwest::Client,
}

impl HttpFloorSource {
    /// # Errors
    ///
    /// Returns [`MapError::Http`] if the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, MapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| MapError::Http(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl FloorSource for HttpFloorSource {
    async fn fetch(&self, uri: &str) -> Result<String, MapError> {
        let load_err = |reason: String| MapError::Load { uri: uri.to_owned(), reason };
        let response = self.http.get(uri).send().await.map_err(|e| load_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(load_err(format!("HTTP status {}", status.as_u16())));
        }
        response.text().await.map_err(|e| load_err(e.to_string()))
    }
}

/// Floor plans stored in a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFloorSource {
    root: PathBuf,
}

impl DirFloorSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl FloorSource for DirFloorSource {
    async fn fetch(&self, uri: &str) -> Result<String, MapError> {
        let path = self.root.join(uri);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MapError::Load { uri: path.display().to_string(), reason: e.to_string() })
    }
}

/// Source matching the configured floor location.
///
/// # Errors
///
/// Returns [`MapError::Http`] if an HTTP source cannot be built.
pub fn floor_source(config: &MapConfig) -> Result<Box<dyn FloorSource>, MapError> {
    Ok(match &config.floors {
        FloorLocation::Dir(dir) => Box::new(DirFloorSource::new(dir.clone())),
        FloorLocation::Url(_) => Box::new(HttpFloorSource::new(config.timeouts)?),
    })
}

// =============================================================
// Loader
// =============================================================

/// Permission to commit one fetch result. Stale once a newer request or a cancel happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub floor: String,
    pub uri: String,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading {
        floor: String,
        generation: u64,
    },
    Ready(Box<FloorPlan>),
    Failed(String),
}

/// Result of committing a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The ticket was superseded; nothing changed.
    Stale,
    /// The floor is now mounted.
    Ready { floor: String },
    /// The fetch or parse failed; the loader is in [`LoadState::Failed`].
    Failed(MapError),
}

/// Floor-plan loader for one consumer.
#[derive(Debug, Clone)]
pub struct FloorPlanLoader {
    catalog: FloorCatalog,
    state: LoadState,
    generation: u64,
}

impl FloorPlanLoader {
    #[must_use]
    pub fn new(catalog: FloorCatalog) -> Self {
        Self { catalog, state: LoadState::Idle, generation: 0 }
    }

    #[must_use]
    pub fn catalog(&self) -> &FloorCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The mounted plan, if any.
    #[must_use]
    pub fn plan(&self) -> Option<&FloorPlan> {
        match &self.state {
            LoadState::Ready(plan) => Some(plan.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// Start loading `floor`. Returns `Ok(None)` when that floor is already mounted.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Load`] (and enters [`LoadState::Failed`]) if neither the
    /// floor nor the default floor is in the catalog.
    pub fn request(&mut self, floor: &str) -> Result<Option<LoadTicket>, MapError> {
        let Some(resolved) = self.catalog.resolve(floor) else {
            self.generation += 1;
            let err = MapError::Load { uri: floor.to_owned(), reason: "no floor plan registered".into() };
            warn!(floor, "floor not in catalog");
            self.state = LoadState::Failed(err.to_string());
            return Err(err);
        };
        if self.plan().is_some_and(|p| p.id == resolved.floor) {
            return Ok(None);
        }
        self.generation += 1;
        self.state = LoadState::Loading { floor: resolved.floor.clone(), generation: self.generation };
        Ok(Some(LoadTicket { floor: resolved.floor, uri: resolved.uri, generation: self.generation }))
    }

    /// Commit a fetch result for `ticket`.
    pub fn complete(&mut self, ticket: &LoadTicket, fetched: Result<String, MapError>) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                floor = %ticket.floor,
                generation = ticket.generation,
                current = self.generation,
                "dropping stale floor load"
            );
            return LoadOutcome::Stale;
        }
        match fetched.and_then(|content| parse_floor_plan(&ticket.floor, &ticket.uri, &content)) {
            Ok(plan) => {
                info!(
                    floor = %plan.id,
                    width = plan.native_width,
                    height = plan.native_height,
                    nodes = plan.scene.len(),
                    "floor plan mounted"
                );
                self.state = LoadState::Ready(Box::new(plan));
                LoadOutcome::Ready { floor: ticket.floor.clone() }
            }
            Err(e) => {
                warn!(
                    floor = %ticket.floor,
                    uri = %ticket.uri,
                    code = e.error_code(),
                    retryable = e.retryable(),
                    error = %e,
                    "floor plan load failed"
                );
                self.state = LoadState::Failed(e.to_string());
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Invalidate any in-flight ticket. Loading and error states return to idle;
    /// a mounted plan stays mounted.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if !matches!(self.state, LoadState::Ready(_)) {
            self.state = LoadState::Idle;
        }
    }

    /// Request, fetch and commit `floor` in one step.
    ///
    /// # Errors
    ///
    /// Returns the catalog, fetch or parse error.
    pub async fn load(&mut self, source: &dyn FloorSource, floor: &str) -> Result<&FloorPlan, MapError> {
        if let Some(ticket) = self.request(floor)? {
            let fetched = source.fetch(&ticket.uri).await;
            if let LoadOutcome::Failed(e) = self.complete(&ticket, fetched) {
                return Err(e);
            }
        }
        self.plan()
            .ok_or_else(|| MapError::Load { uri: floor.to_owned(), reason: "floor plan not mounted".into() })
    }
}
