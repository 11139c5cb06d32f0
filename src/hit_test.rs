#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::Transform;
use crate::plan::parse_floor_plan;

const PLAN: &str = r##"<svg viewBox="0 0 1000 800">
  <rect x="0" y="0" width="1000" height="800" fill="#fafafa"/>
  <g id="A101">
    <rect x="100" y="100" width="100" height="100"/>
    <text x="110" y="150">Lab</text>
  </g>
  <g>
    <rect x="300" y="100" width="100" height="100"/>
    <text x="310" y="150">Library</text>
  </g>
  <rect id="A103" x="500" y="100" width="100" height="100"/>
  <g id="wing"><g id="inner"/></g>
</svg>"##;

fn plan() -> FloorPlan {
    parse_floor_plan("A", "a.svg", PLAN).unwrap()
}

fn rooms() -> RoomDirectory {
    RoomDirectory::new(vec![
        Room {
            room_id: None,
            room_name: "A101".into(),
            floor: Some("A".into()),
            room_type: Some("Lab".into()),
            description: Some("Chemistry lab".into()),
        },
        Room {
            room_id: Some("9".into()),
            room_name: "A103".into(),
            floor: None,
            room_type: None,
            description: None,
        },
    ])
}

fn node(plan: &FloorPlan, id: &str) -> NodeId {
    plan.scene.find_by_element_id(id).unwrap()
}

// =============================================================
// Key resolution
// =============================================================

#[test]
fn key_from_own_id() {
    let p = plan();
    assert_eq!(resolve_room_key(&p, node(&p, "A103")).as_deref(), Some("A103"));
}

#[test]
fn key_from_parent_group() {
    let p = plan();
    let rect = node(&p, "A101") + 1;
    assert_eq!(resolve_room_key(&p, rect).as_deref(), Some("A101"));
}

#[test]
fn key_from_label_text() {
    let p = plan();
    let hit = hit_test(&p, Point::new(315.0, 145.0)).unwrap();
    assert_eq!(p.scene.get(hit).unwrap().kind, NodeKind::Text);
    assert_eq!(resolve_room_key(&p, hit).as_deref(), Some("Library"));
}

#[test]
fn no_key_for_anonymous_shape() {
    let p = plan();
    let background = p.scene.roots()[0];
    assert_eq!(resolve_room_key(&p, background), None);
    assert_eq!(resolve_room_key(&p, 999), None);
}

// =============================================================
// Hit testing
// =============================================================

#[test]
fn topmost_leaf_wins() {
    let p = plan();
    let hit = hit_test(&p, Point::new(550.0, 150.0)).unwrap();
    assert_eq!(hit, node(&p, "A103"));
}

#[test]
fn background_hit_when_nothing_else() {
    let p = plan();
    assert_eq!(hit_test(&p, Point::new(900.0, 700.0)), Some(p.scene.roots()[0]));
}

#[test]
fn miss_outside_everything() {
    let p = plan();
    assert_eq!(hit_test(&p, Point::new(-5.0, -5.0)), None);
}

#[test]
fn highlight_target_prefers_enclosing_group() {
    let p = plan();
    let group = node(&p, "A101");
    assert_eq!(highlight_target(&p, group + 1), group);
    assert_eq!(highlight_target(&p, group), group);
    let lone = node(&p, "A103");
    assert_eq!(highlight_target(&p, lone), lone);
}

// =============================================================
// Tooltip content
// =============================================================

#[test]
fn tooltip_for_directory_match() {
    let c = TooltipContent::resolve(Some("A101"), &rooms());
    assert_eq!(c.lines(), vec!["A101", "Type: Lab", "Floor: A", "Chemistry lab"]);
}

#[test]
fn tooltip_missing_fields_are_na() {
    let c = TooltipContent::resolve(Some("9"), &rooms());
    assert_eq!(c.lines(), vec!["A103", "Type: N/A", "Floor: N/A"]);
}

#[test]
fn tooltip_unmatched_key_shows_key() {
    let c = TooltipContent::resolve(Some("Library"), &rooms());
    assert_eq!(c.lines(), vec!["Library"]);
}

#[test]
fn tooltip_without_key_says_room() {
    let c = TooltipContent::resolve(None, &RoomDirectory::default());
    assert_eq!(c.title, "Room");
    assert_eq!(c.details, None);
}

// =============================================================
// HighlightEngine
// =============================================================

#[test]
fn hover_over_unidentified_shape_shows_room_fallback() {
    let p = plan();
    let mut engine = HighlightEngine::new();
    let background = p.scene.roots()[0];
    engine.pointer_enter(&p, &RoomDirectory::default(), background, Point::new(40.0, 60.0));
    let tip = engine.tooltip().unwrap();
    assert_eq!(tip.content.title, "Room");
    assert_eq!(tip.position, Point::new(40.0, 45.0));
    assert_eq!(engine.highlighted(), Some(background));
}

#[test]
fn hover_highlights_group_and_follows_pointer() {
    let p = plan();
    let mut engine = HighlightEngine::new();
    let group = node(&p, "A101");
    engine.pointer_enter(&p, &rooms(), group + 1, Point::new(10.0, 20.0));
    assert_eq!(engine.highlighted(), Some(group));
    assert_eq!(engine.hovered(), Some(group + 1));

    assert!(engine.pointer_move(group + 1, Point::new(12.0, 30.0)));
    assert_eq!(engine.tooltip().unwrap().position, Point::new(12.0, 15.0));

    assert!(!engine.pointer_move(group + 2, Point::new(99.0, 99.0)));
    assert_eq!(engine.tooltip().unwrap().position, Point::new(12.0, 15.0));

    engine.pointer_leave();
    assert_eq!(engine.highlighted(), None);
    assert!(engine.tooltip().is_none());
}

#[test]
fn programmatic_highlight_anchors_to_shape_top_center() {
    let p = plan();
    let mut camera = Camera::default();
    camera.set_transform(Transform { scale: 2.0, translate_x: 10.0, translate_y: 20.0 });
    let room = rooms().lookup("A103").unwrap().clone();
    let mut engine = HighlightEngine::new();

    assert!(engine.highlight_room(&p, &room, &camera, 1_000.0));
    assert_eq!(engine.highlighted(), Some(node(&p, "A103")));
    let tip = engine.tooltip().unwrap();
    assert_eq!(tip.position, Point::new(1110.0, 220.0));
    assert_eq!(tip.close_at_ms, Some(3_000.0));
}

#[test]
fn programmatic_highlight_auto_closes() {
    let p = plan();
    let room = rooms().lookup("A101").unwrap().clone();
    let mut engine = HighlightEngine::new();
    engine.highlight_room(&p, &room, &Camera::default(), 0.0);

    assert!(!engine.tick(1_999.0));
    assert!(engine.tooltip().is_some());
    assert!(engine.tick(2_000.0));
    assert!(engine.tooltip().is_none());
    assert_eq!(engine.highlighted(), None);
    assert!(!engine.tick(5_000.0));
}

#[test]
fn hover_cancels_pending_auto_close() {
    let p = plan();
    let room = rooms().lookup("A101").unwrap().clone();
    let mut engine = HighlightEngine::new();
    engine.highlight_room(&p, &room, &Camera::default(), 0.0);
    engine.pointer_enter(&p, &rooms(), node(&p, "A103"), Point::new(0.0, 0.0));

    assert!(!engine.tick(10_000.0));
    assert_eq!(engine.tooltip().unwrap().content.title, "A103");
}

#[test]
fn programmatic_highlight_without_match_clears_state() {
    let p = plan();
    let mut engine = HighlightEngine::new();
    engine.pointer_enter(&p, &rooms(), node(&p, "A103"), Point::new(0.0, 0.0));
    let ghost = Room {
        room_id: None,
        room_name: "Z999".into(),
        floor: None,
        room_type: None,
        description: None,
    };
    assert!(!engine.highlight_room(&p, &ghost, &Camera::default(), 0.0));
    assert_eq!(engine, HighlightEngine::default());
}
