//! Camera transform, coordinate conversions and auto-fit math.
//!
//! All geometry is expressed in a floor plan's native coordinate space
//! ("world"). The camera maps world to screen as `screen = world * scale +
//! translate`. The scale is kept inside `[min_scale, max_scale]` at all times;
//! out-of-range requests are clamped, never rejected.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, MIN_FIT_SPAN};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a screen container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Rectangle from an origin and a size.
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { min_x: x, min_y: y, max_x: x + w, max_y: y + h }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect { min_x: self.min_x + dx, min_y: self.min_y + dy, max_x: self.max_x + dx, max_y: self.max_y + dy }
    }
}

/// Scale + translate, the value type the viewport animates between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0, translate_x: 0.0, translate_y: 0.0 };

    /// Linear interpolation between `self` (t = 0) and `to` (t = 1).
    #[must_use]
    pub fn lerp(&self, to: &Transform, t: f64) -> Transform {
        Transform {
            scale: self.scale + (to.scale - self.scale) * t,
            translate_x: self.translate_x + (to.translate_x - self.translate_x) * t,
            translate_y: self.translate_y + (to.translate_y - self.translate_y) * t,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Camera state for one mounted floor plan.
///
/// `translate_x` / `translate_y` are in CSS pixels.
/// `scale` is a zoom factor (1.0 = native size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_bounds(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

impl Camera {
    /// Identity camera with the given zoom bounds. Bounds given in the wrong order are swapped.
    #[must_use]
    pub fn with_bounds(min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) =
            if min_scale <= max_scale { (min_scale, max_scale) } else { (max_scale, min_scale) };
        let mut camera = Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0, min_scale, max_scale };
        camera.scale = camera.clamp_scale(1.0);
        camera
    }

    /// Clamp a requested scale into bounds. NaN keeps the current scale.
    #[must_use]
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform { scale: self.scale, translate_x: self.translate_x, translate_y: self.translate_y }
    }

    /// Apply a transform, clamping its scale.
    pub fn set_transform(&mut self, t: Transform) {
        self.scale = self.clamp_scale(t.scale);
        if t.translate_x.is_finite() {
            self.translate_x = t.translate_x;
        }
        if t.translate_y.is_finite() {
            self.translate_y = t.translate_y;
        }
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.translate_x += dx;
            self.translate_y += dy;
        }
    }

    /// Multiply the scale by `factor`, keeping the world point under `screen_anchor` fixed.
    pub fn zoom_at(&mut self, screen_anchor: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world = self.screen_to_world(screen_anchor);
        self.scale = self.clamp_scale(self.scale * factor);
        self.translate_x = screen_anchor.x - world.x * self.scale;
        self.translate_y = screen_anchor.y - world.y * self.scale;
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.translate_x) / self.scale,
            y: (screen.y - self.translate_y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.translate_x,
            y: world.y * self.scale + self.translate_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Project a world rectangle to screen space.
    #[must_use]
    pub fn world_rect_to_screen(&self, rect: &Rect) -> Rect {
        let a = self.world_to_screen(Point::new(rect.min_x, rect.min_y));
        let b = self.world_to_screen(Point::new(rect.max_x, rect.max_y));
        Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}

/// Bounding box of `points`, widened to [`MIN_FIT_SPAN`] on any axis with zero extent.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::new(first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        rect.min_x = rect.min_x.min(p.x);
        rect.min_y = rect.min_y.min(p.y);
        rect.max_x = rect.max_x.max(p.x);
        rect.max_y = rect.max_y.max(p.y);
    }
    if rect.width() <= 0.0 {
        let cx = rect.min_x;
        rect.min_x = cx - MIN_FIT_SPAN / 2.0;
        rect.max_x = cx + MIN_FIT_SPAN / 2.0;
    }
    if rect.height() <= 0.0 {
        let cy = rect.min_y;
        rect.min_y = cy - MIN_FIT_SPAN / 2.0;
        rect.max_y = cy + MIN_FIT_SPAN / 2.0;
    }
    Some(rect)
}

/// Transform that centers `bbox` in `container` with `padding` margin, scale clamped to bounds.
///
/// `scale = clamp(min(cw / (bw * (1 + p)), ch / (bh * (1 + p))))`, then the
/// bbox center is mapped to the container center.
#[must_use]
pub fn fit_to_region(bbox: &Rect, container: Size, padding: f64, min_scale: f64, max_scale: f64) -> Transform {
    let bw = if bbox.width() > 0.0 { bbox.width() } else { MIN_FIT_SPAN };
    let bh = if bbox.height() > 0.0 { bbox.height() } else { MIN_FIT_SPAN };
    let scale_x = container.width / (bw * (1.0 + padding));
    let scale_y = container.height / (bh * (1.0 + padding));
    let raw = scale_x.min(scale_y);
    let scale = if raw.is_nan() { min_scale } else { raw.clamp(min_scale, max_scale) };
    let center = bbox.center();
    Transform {
        scale,
        translate_x: container.width / 2.0 - center.x * scale,
        translate_y: container.height / 2.0 - center.y * scale,
    }
}
