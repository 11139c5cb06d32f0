#![allow(clippy::float_cmp)]

use super::*;
use crate::plan::parse_floor_plan;
use crate::route::EndNodeType;

fn segment(points: &[(f64, f64)]) -> PathSegment {
    PathSegment::new("A", points.iter().map(|&(x, y)| Point::new(x, y)).collect(), EndNodeType::None).unwrap()
}

const PLAN: &str = r##"<svg viewBox="0 0 1000 800">
  <g id="A101" class="room"><rect x="10" y="10" width="50" height="50" fill="#ccc"/>
    <text x="12" y="30">A &amp; B</text></g>
  <rect id="A102" x="100" y="10" width="50" height="50" fill="#ddd" stroke="#000"/>
</svg>"##;

const CONTAINER: Size = Size { width: 1000.0, height: 800.0 };

// =============================================================
// Overlay
// =============================================================

#[test]
fn single_point_draws_only_start_marker() {
    let mut surface = OverlaySurface::new();
    draw_segment(&mut surface, &segment(&[(50.0, 50.0)]), 1.0);
    assert_eq!(surface.len(), 1);
    assert!(surface.get(OverlayRole::StartMarker).is_some());
    assert!(surface.get(OverlayRole::RoutePath).is_none());
    assert!(surface.get(OverlayRole::EndMarker).is_none());
}

#[test]
fn multi_point_draws_path_and_both_markers() {
    let mut surface = OverlaySurface::new();
    draw_segment(&mut surface, &segment(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]), 1.0);
    assert_eq!(surface.len(), 3);
    let Some(OverlayShape::Marker { center, fill, .. }) = surface.get(OverlayRole::EndMarker) else {
        panic!("missing end marker");
    };
    assert_eq!(*center, Point::new(10.0, 10.0));
    assert_eq!(*fill, END_MARKER_COLOR);
    let Some(OverlayShape::Marker { center, fill, .. }) = surface.get(OverlayRole::StartMarker) else {
        panic!("missing start marker");
    };
    assert_eq!(*center, Point::new(0.0, 0.0));
    assert_eq!(*fill, START_MARKER_COLOR);
}

#[test]
fn redraw_never_accumulates() {
    let mut surface = OverlaySurface::new();
    let seg = segment(&[(0.0, 0.0), (10.0, 0.0)]);
    for _ in 0..5 {
        draw_segment(&mut surface, &seg, 2.0);
    }
    assert_eq!(surface.len(), 3);
    draw_segment(&mut surface, &segment(&[(5.0, 5.0)]), 2.0);
    assert_eq!(surface.len(), 1);
}

#[test]
fn sizes_scale_inversely_with_zoom() {
    let mut surface = OverlaySurface::new();
    draw_segment(&mut surface, &segment(&[(0.0, 0.0), (10.0, 0.0)]), 2.0);
    let Some(OverlayShape::Polyline { stroke_width, opacity, stroke, .. }) = surface.get(OverlayRole::RoutePath) else {
        panic!("missing path");
    };
    assert_eq!(*stroke_width, 2.5);
    assert_eq!(*opacity, 0.9);
    assert_eq!(*stroke, "#800080");
    let Some(OverlayShape::Marker { radius, outline_width, .. }) = surface.get(OverlayRole::StartMarker) else {
        panic!("missing marker");
    };
    assert_eq!(*radius, 4.0);
    assert_eq!(*outline_width, 0.75);
}

#[test]
fn degenerate_scale_falls_back_to_one() {
    let mut surface = OverlaySurface::new();
    draw_segment(&mut surface, &segment(&[(0.0, 0.0), (10.0, 0.0)]), 0.0);
    let Some(OverlayShape::Polyline { stroke_width, .. }) = surface.get(OverlayRole::RoutePath) else {
        panic!("missing path");
    };
    assert_eq!(*stroke_width, 5.0);
}

#[test]
fn clear_removes_route() {
    let mut surface = OverlaySurface::new();
    draw_segment(&mut surface, &segment(&[(0.0, 0.0), (10.0, 0.0)]), 1.0);
    clear(&mut surface);
    assert!(surface.is_empty());
}

// =============================================================
// SVG output
// =============================================================

#[test]
fn svg_wraps_scene_and_overlay_in_zoom_group() {
    let plan = parse_floor_plan("A", "a.svg", PLAN).unwrap();
    let mut camera = Camera::default();
    camera.set_transform(crate::camera::Transform { scale: 2.0, translate_x: 10.0, translate_y: -5.0 });
    let mut overlay = OverlaySurface::new();
    draw_segment(&mut overlay, &segment(&[(0.0, 0.0), (10.0, 0.0)]), camera.scale);

    let svg = render_svg(&plan, &camera, Size::new(640.0, 480.0), &overlay, None);
    assert!(svg.starts_with(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 640 480" width="640" height="480">"#
    ));
    assert!(svg.contains(r#"<g class="zoom-group" transform="translate(10 -5) scale(2)">"#));
    let zoom = svg.find("zoom-group").unwrap();
    let overlay_at = svg.find("route-overlay").unwrap();
    let room = svg.find(r#"id="A102""#).unwrap();
    assert!(zoom < room && room < overlay_at);
    assert!(svg.contains(r#"points="0,0 10,0""#));
    assert!(svg.contains(r#"stroke-width="2.5""#));
    assert!(svg.ends_with("</g></svg>"));
}

#[test]
fn svg_output_parses_back() {
    let plan = parse_floor_plan("A", "a.svg", PLAN).unwrap();
    let svg = render_svg(&plan, &Camera::default(), CONTAINER, &OverlaySurface::new(), None);
    let again = parse_floor_plan("A", "a.svg", &svg).unwrap();
    assert!(again.scene.find_by_element_id("A101").is_some());
    assert!(svg.contains("A &amp; B"));
    assert!(!svg.contains("route-overlay"));
}

#[test]
fn highlighted_shape_is_purple() {
    let plan = parse_floor_plan("A", "a.svg", PLAN).unwrap();
    let id = plan.scene.find_by_element_id("A102").unwrap();
    let svg = render_svg(&plan, &Camera::default(), CONTAINER, &OverlaySurface::new(), Some(id));
    assert!(svg.contains(
        r#"<rect id="A102" x="100" y="10" width="50" height="50" class="highlighted" fill="purple" stroke="purple"/>"#
    ));
    assert!(!svg.contains("#ddd"));
}

#[test]
fn highlighted_group_turns_label_white() {
    let plan = parse_floor_plan("A", "a.svg", PLAN).unwrap();
    let id = plan.scene.find_by_element_id("A101").unwrap();
    let svg = render_svg(&plan, &Camera::default(), CONTAINER, &OverlaySurface::new(), Some(id));
    assert!(svg.contains(r#"<g id="A101" class="room highlighted" fill="purple" stroke="purple">"#));
    assert!(svg.contains(r#"<text x="12" y="30" fill="white">A &amp; B</text>"#));
    assert!(!svg.contains("#ccc"));
}
