#![allow(clippy::float_cmp)]

use super::*;

fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn scenario_a_points() -> Vec<Point> {
    pts(&[(100.0, 100.0), (200.0, 100.0), (200.0, 300.0)])
}

// --- easing ---

#[test]
fn ease_endpoints_and_midpoint() {
    assert_eq!(ease_cubic_in_out(0.0), 0.0);
    assert_eq!(ease_cubic_in_out(1.0), 1.0);
    assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn ease_is_monotonic() {
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = ease_cubic_in_out(f64::from(i) / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}

// --- fit ---

#[test]
fn fit_points_starts_a_750ms_transition() {
    let mut vp = Viewport::default();
    vp.fit_points(&scenario_a_points(), Size::new(500.0, 400.0), 1000.0);
    let tr = vp.transition().copied().unwrap();
    assert_eq!(tr.duration_ms, 750.0);
    assert_eq!(tr.start_ms, 1000.0);
    assert_eq!(tr.from, Transform::IDENTITY);
    assert!((tr.to.scale - 5.0 / 3.0).abs() < 1e-9);
}

#[test]
fn fit_reaches_target_after_duration() {
    let mut vp = Viewport::default();
    vp.fit_points(&scenario_a_points(), Size::new(500.0, 400.0), 0.0);
    assert_eq!(vp.tick(375.0), TickResult::Animating);
    assert_eq!(vp.tick(750.0), TickResult::Finished);
    let cam = vp.camera();
    assert!((cam.scale - 5.0 / 3.0).abs() < 1e-9);
    assert!(cam.translate_x.abs() < 1e-9);
    assert!((cam.translate_y + 133.333_333_333).abs() < 1e-6);
}

#[test]
fn target_applied_exactly_once() {
    let mut vp = Viewport::default();
    vp.fit_points(&scenario_a_points(), Size::new(500.0, 400.0), 0.0);
    assert_eq!(vp.tick(10_000.0), TickResult::Finished);
    assert_eq!(vp.tick(10_001.0), TickResult::Idle);
    assert!(!vp.is_animating());
}

#[test]
fn empty_points_reset_to_identity_over_500ms() {
    let mut vp = Viewport::default();
    vp.jump_to(Transform { scale: 3.0, translate_x: 40.0, translate_y: 40.0 });
    vp.fit_points(&[], Size::new(500.0, 400.0), 0.0);
    assert_eq!(vp.transition().map(|t| t.duration_ms), Some(500.0));
    vp.tick(500.0);
    assert_eq!(vp.camera().transform(), Transform::IDENTITY);
}

#[test]
fn new_fit_supersedes_running_transition() {
    let mut vp = Viewport::default();
    vp.fit_points(&scenario_a_points(), Size::new(500.0, 400.0), 0.0);
    vp.tick(300.0);
    let mid = vp.camera().transform();

    vp.fit_points(&pts(&[(0.0, 0.0), (1000.0, 800.0)]), Size::new(500.0, 400.0), 400.0);
    let tr = vp.transition().copied().unwrap();
    // Restarts from where the old animation was at t=400, not from its end.
    assert_ne!(tr.from, mid);
    assert_eq!(tr.start_ms, 400.0);
    assert_eq!(vp.tick(1150.0), TickResult::Finished);
    assert_eq!(vp.camera().transform(), tr.to);
    assert_eq!(vp.tick(1200.0), TickResult::Idle);
}

#[test]
fn user_pan_cancels_transition() {
    let mut vp = Viewport::default();
    vp.fit_points(&scenario_a_points(), Size::new(500.0, 400.0), 0.0);
    vp.pan_by(10.0, 0.0);
    assert!(!vp.is_animating());
    assert_eq!(vp.camera().translate_x, 10.0);
}

#[test]
fn wheel_zoom_in_and_out_stays_in_bounds() {
    let mut vp = Viewport::default();
    for _ in 0..100 {
        vp.wheel_zoom(Point::new(100.0, 100.0), -500.0);
    }
    assert_eq!(vp.camera().scale, 5.0);
    for _ in 0..100 {
        vp.wheel_zoom(Point::new(100.0, 100.0), 500.0);
    }
    assert_eq!(vp.camera().scale, 0.3);
}

#[test]
fn wheel_zoom_direction() {
    let mut vp = Viewport::default();
    vp.wheel_zoom(Point::new(0.0, 0.0), -100.0);
    assert!(vp.camera().scale > 1.0);
}

#[test]
fn camera_scale_stays_clamped_during_animation() {
    let mut vp = Viewport::default();
    vp.fit_points(&pts(&[(5.0, 5.0)]), Size::new(5000.0, 5000.0), 0.0);
    for step in 0..=20 {
        vp.tick(f64::from(step) * 40.0);
        let cam = vp.camera();
        assert!(cam.scale >= cam.min_scale && cam.scale <= cam.max_scale);
    }
}

#[test]
fn zero_duration_transition_finishes_immediately() {
    let mut vp = Viewport::default();
    let target = Transform { scale: 2.0, translate_x: 1.0, translate_y: 1.0 };
    vp.animate_to(target, 0.0, 0.0);
    assert_eq!(vp.tick(0.0), TickResult::Finished);
    assert_eq!(vp.camera().transform(), target);
}
