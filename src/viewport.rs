//! Viewport controller: owns the camera of the mounted floor plan and runs
//! animated fit/reset transitions.
//!
//! DESIGN
//! ======
//! Transitions are time-stepped by the host through [`Viewport::tick`] with a
//! monotonic millisecond clock; the controller never reads the clock itself.
//! There is at most one transition. Starting a new one supersedes the running
//! transition from the camera's current interpolated position, so animations
//! never queue. A transition's target is applied exactly once: on the tick
//! that reaches its end, after which the transition is dropped. User pan/zoom
//! cancels any running transition.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::debug;

use crate::camera::{Camera, Point, Size, Transform, bounding_box, fit_to_region};
use crate::consts::{FIT_DURATION_MS, FIT_PADDING, RESET_DURATION_MS, WHEEL_ZOOM_SENSITIVITY};

/// An in-flight camera animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Transform,
    pub to: Transform,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Transition {
    /// Eased transform at `now_ms`, and whether the end has been reached.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> (Transform, bool) {
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }
        let t = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            return (self.to, true);
        }
        (self.from.lerp(&self.to, ease_cubic_in_out(t)), false)
    }
}

/// Result of advancing the viewport clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// No transition running; nothing changed.
    Idle,
    /// The camera moved and the transition continues.
    Animating,
    /// The transition's target was applied; the transition is gone.
    Finished,
}

/// Camera plus optional running transition.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    camera: Camera,
    transition: Option<Transition>,
}

impl Viewport {
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self { camera, transition: None }
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Start animating towards the transform that frames `points` in `container`.
    ///
    /// Empty `points` animate back to the identity transform instead.
    pub fn fit_points(&mut self, points: &[Point], container: Size, now_ms: f64) {
        match bounding_box(points) {
            Some(bbox) => {
                let target = fit_to_region(&bbox, container, FIT_PADDING, self.camera.min_scale, self.camera.max_scale);
                self.animate_to(target, FIT_DURATION_MS, now_ms);
            }
            None => self.reset(now_ms),
        }
    }

    /// Animate back to scale 1, translate 0.
    pub fn reset(&mut self, now_ms: f64) {
        self.animate_to(Transform::IDENTITY, RESET_DURATION_MS, now_ms);
    }

    /// Start a transition to `target`, superseding any running one.
    pub fn animate_to(&mut self, target: Transform, duration_ms: f64, now_ms: f64) {
        if let Some(running) = self.transition.take() {
            let (current, _) = running.sample(now_ms);
            self.camera.set_transform(current);
            debug!(from = ?running.to, to = ?target, "camera transition superseded");
        }
        let mut to = target;
        to.scale = self.camera.clamp_scale(to.scale);
        self.transition = Some(Transition { from: self.camera.transform(), to, start_ms: now_ms, duration_ms });
    }

    /// Jump straight to `target`, cancelling any transition.
    pub fn jump_to(&mut self, target: Transform) {
        self.transition = None;
        self.camera.set_transform(target);
    }

    /// Advance the running transition to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickResult {
        let Some(transition) = self.transition else {
            return TickResult::Idle;
        };
        let (current, done) = transition.sample(now_ms);
        self.camera.set_transform(current);
        if done {
            self.transition = None;
            TickResult::Finished
        } else {
            TickResult::Animating
        }
    }

    /// Drag-pan by a screen delta. Cancels any transition.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transition = None;
        self.camera.pan_by(dx, dy);
    }

    /// Wheel zoom around `screen_anchor`. Positive `dy` zooms out. Cancels any transition.
    pub fn wheel_zoom(&mut self, screen_anchor: Point, dy: f64) {
        self.transition = None;
        let factor = (-dy * WHEEL_ZOOM_SENSITIVITY).exp2();
        self.camera.zoom_at(screen_anchor, factor);
    }
}

/// Cubic ease-in-out on `[0, 1]`.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}
