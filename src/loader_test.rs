#![allow(clippy::float_cmp)]

use std::collections::HashMap;
use std::sync::Mutex;

use super::*;

const SVG_A: &str = r#"<svg viewBox="0 0 100 50"><rect id="A1" width="10" height="10"/></svg>"#;
const SVG_B: &str = r#"<svg viewBox="0 0 200 80"/>"#;

/// In-memory source that records every fetched URI.
struct MockSource {
    docs: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MockSource {
    fn new(docs: &[(&str, &str)]) -> Self {
        Self {
            docs: docs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl FloorSource for MockSource {
    async fn fetch(&self, uri: &str) -> Result<String, MapError> {
        self.fetched.lock().unwrap().push(uri.to_owned());
        self.docs
            .get(uri)
            .cloned()
            .ok_or_else(|| MapError::Load { uri: uri.to_owned(), reason: "not found".into() })
    }
}

fn catalog() -> FloorCatalog {
    FloorCatalog::new("B")
        .with_entry("A", "Floor_A.svg")
        .with_entry("Floor B", "Floor_B.svg")
}

// =============================================================
// Catalog
// =============================================================

#[test]
fn normalizes_floor_ids() {
    assert_eq!(normalize_floor_id("A").as_deref(), Some("A"));
    assert_eq!(normalize_floor_id("Floor a").as_deref(), Some("A"));
    assert_eq!(normalize_floor_id("  floor   c2 ").as_deref(), Some("C2"));
    assert_eq!(normalize_floor_id("   "), None);
}

#[test]
fn resolves_both_id_styles() {
    let c = catalog();
    assert_eq!(c.resolve("A"), Some(ResolvedFloor { floor: "A".into(), uri: "Floor_A.svg".into() }));
    assert_eq!(c.resolve("Floor A").unwrap().floor, "A");
    assert_eq!(c.floors().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn unknown_floor_falls_back_to_default() {
    let c = catalog();
    assert_eq!(c.resolve("Z").unwrap().floor, "B");
    assert_eq!(c.resolve("").unwrap().floor, "B");
}

#[test]
fn no_fallback_when_default_missing() {
    let c = FloorCatalog::new("Q").with_entry("A", "a.svg");
    assert_eq!(c.resolve("Z"), None);
}

#[test]
fn open_catalog_uses_file_pattern() {
    let c = FloorCatalog::from_location(&FloorLocation::Url("https://maps.test/floors/".into()), "B");
    assert_eq!(c.resolve("Floor c").unwrap().uri, "https://maps.test/floors/Floor_C.svg");
    let d = FloorCatalog::from_location(&FloorLocation::Dir("maps".into()), "B");
    assert_eq!(d.resolve("A").unwrap().uri, "Floor_A.svg");
}

#[tokio::test]
async fn scan_dir_finds_floor_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Floor_A.svg"), SVG_A).unwrap();
    std::fs::write(dir.path().join("Floor_B.svg"), SVG_B).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

    let c = FloorCatalog::scan_dir(dir.path(), "B").await.unwrap();
    assert_eq!(c.floors().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(c.resolve("C").unwrap().floor, "B");
}

#[tokio::test]
async fn scan_missing_dir_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FloorCatalog::scan_dir(&dir.path().join("nope"), "B").await.unwrap_err();
    assert!(matches!(err, MapError::Load { .. }));
}

// =============================================================
// Sources
// =============================================================

#[tokio::test]
async fn dir_source_reads_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Floor_A.svg"), SVG_A).unwrap();
    let source = DirFloorSource::new(dir.path());
    assert_eq!(source.fetch("Floor_A.svg").await.unwrap(), SVG_A);
    let err = source.fetch("Floor_Z.svg").await.unwrap_err();
    assert!(matches!(err, MapError::Load { ref uri, .. } if uri.ends_with("Floor_Z.svg")));
}

// =============================================================
// Loader state machine
// =============================================================

#[test]
fn request_enters_loading() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    assert_eq!(ticket.floor, "A");
    assert_eq!(ticket.uri, "Floor_A.svg");
    assert!(loader.is_loading());
    assert_eq!(loader.state(), &LoadState::Loading { floor: "A".into(), generation: ticket.generation() });
}

#[test]
fn complete_mounts_plan() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    assert_eq!(loader.complete(&ticket, Ok(SVG_A.into())), LoadOutcome::Ready { floor: "A".into() });
    let plan = loader.plan().unwrap();
    assert_eq!(plan.id, "A");
    assert_eq!(plan.native_width, 100.0);
}

#[test]
fn stale_result_is_dropped() {
    let mut loader = FloorPlanLoader::new(catalog());
    let first = loader.request("A").unwrap().unwrap();
    let second = loader.request("B").unwrap().unwrap();

    assert_eq!(loader.complete(&first, Ok(SVG_A.into())), LoadOutcome::Stale);
    assert!(loader.is_loading());

    assert_eq!(loader.complete(&second, Ok(SVG_B.into())), LoadOutcome::Ready { floor: "B".into() });
    assert_eq!(loader.plan().unwrap().id, "B");

    // A late failure from the superseded request must not clobber the mounted plan.
    let outcome = loader.complete(&first, Err(MapError::Load { uri: "x".into(), reason: "timeout".into() }));
    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(loader.plan().unwrap().id, "B");
}

#[test]
fn cancel_invalidates_in_flight_ticket() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    loader.cancel();
    assert_eq!(loader.state(), &LoadState::Idle);
    assert_eq!(loader.complete(&ticket, Err(MapError::Parse("bad".into()))), LoadOutcome::Stale);
    assert_eq!(loader.state(), &LoadState::Idle);
}

#[test]
fn cancel_keeps_mounted_plan() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    loader.complete(&ticket, Ok(SVG_A.into()));
    loader.cancel();
    assert_eq!(loader.plan().unwrap().id, "A");
}

#[test]
fn requesting_mounted_floor_is_noop() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    loader.complete(&ticket, Ok(SVG_A.into()));
    assert_eq!(loader.request("Floor A").unwrap(), None);
    assert!(loader.plan().is_some());
}

#[test]
fn parse_failure_enters_failed() {
    let mut loader = FloorPlanLoader::new(catalog());
    let ticket = loader.request("A").unwrap().unwrap();
    let outcome = loader.complete(&ticket, Ok("<html>oops</html>".into()));
    assert!(matches!(outcome, LoadOutcome::Failed(MapError::Parse(_))));
    assert!(matches!(loader.state(), LoadState::Failed(_)));
    assert!(loader.plan().is_none());
}

#[test]
fn unresolvable_floor_fails_request() {
    let mut loader = FloorPlanLoader::new(FloorCatalog::new("B"));
    let err = loader.request("A").unwrap_err();
    assert!(matches!(err, MapError::Load { .. }));
    assert!(matches!(loader.state(), LoadState::Failed(_)));
}

#[tokio::test]
async fn load_fetches_once_then_reuses() {
    let source = MockSource::new(&[("Floor_A.svg", SVG_A)]);
    let mut loader = FloorPlanLoader::new(catalog());
    assert_eq!(loader.load(&source, "A").await.unwrap().id, "A");
    assert_eq!(loader.load(&source, "Floor A").await.unwrap().id, "A");
    assert_eq!(source.fetched.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn load_surfaces_fetch_errors() {
    let source = MockSource::new(&[]);
    let mut loader = FloorPlanLoader::new(catalog());
    let err = loader.load(&source, "A").await.unwrap_err();
    assert!(err.to_string().contains("Floor_A.svg"));
    assert!(matches!(loader.state(), LoadState::Failed(_)));
}
