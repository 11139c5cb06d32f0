//! Rendering: the route overlay and standalone SVG output.
//!
//! The overlay is a small retained surface of route shapes keyed by role.
//! Drawing a segment always clears the previous route shapes first, so
//! repeated draws never accumulate. Overlay geometry lives in the floor's
//! native coordinate space inside the same zoom group as the plan; stroke and
//! marker sizes are divided by the current scale so they stay constant on
//! screen.
//!
//! [`render_svg`] re-serializes the parsed scene under the camera transform
//! inside a container-sized root and appends the overlay. It reads state
//! only; it never mutates it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point, Size};
use crate::consts::{
    END_MARKER_COLOR, HIGHLIGHT_COLOR, HIGHLIGHT_TEXT_COLOR, MARKER_OUTLINE_COLOR, MARKER_OUTLINE_PX, MARKER_RADIUS_PX,
    PATH_COLOR, PATH_OPACITY, PATH_STROKE_PX, START_MARKER_COLOR,
};
use crate::plan::{FloorPlan, NodeId, NodeKind, Scene};
use crate::route::PathSegment;

/// CSS class carried by the highlighted scene node.
pub const HIGHLIGHT_CLASS: &str = "highlighted";

/// Fixed slot an overlay shape occupies. At most one shape per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRole {
    RoutePath,
    StartMarker,
    EndMarker,
}

impl OverlayRole {
    fn class(self) -> &'static str {
        match self {
            Self::RoutePath => "route-path",
            Self::StartMarker => "start-marker",
            Self::EndMarker => "end-marker",
        }
    }
}

/// Geometry and paint of one overlay shape, in world units.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    Polyline {
        points: Vec<Point>,
        stroke: &'static str,
        stroke_width: f64,
        opacity: f64,
    },
    Marker {
        center: Point,
        radius: f64,
        fill: &'static str,
        outline: &'static str,
        outline_width: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub role: OverlayRole,
    pub shape: OverlayShape,
}

/// Route shapes currently drawn over the mounted floor plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySurface {
    items: Vec<OverlayItem>,
}

impl OverlaySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn items(&self) -> &[OverlayItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, role: OverlayRole) -> Option<&OverlayShape> {
        self.items.iter().find(|i| i.role == role).map(|i| &i.shape)
    }

    /// Remove every route shape.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Put `shape` in `role`'s slot, replacing whatever was there.
    fn set(&mut self, role: OverlayRole, shape: OverlayShape) {
        self.items.retain(|i| i.role != role);
        self.items.push(OverlayItem { role, shape });
    }
}

/// Draw one segment onto `surface`, replacing any previous route shapes.
///
/// One point draws only the start marker. Two or more draw the polyline,
/// the start marker and the end marker.
pub fn draw_segment(surface: &mut OverlaySurface, segment: &PathSegment, scale: f64) {
    surface.clear();
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

    let (Some(start), Some(end)) = (segment.start(), segment.end()) else {
        return;
    };
    let multi = segment.points.len() >= 2;

    if multi {
        surface.set(
            OverlayRole::RoutePath,
            OverlayShape::Polyline {
                points: segment.points.clone(),
                stroke: PATH_COLOR,
                stroke_width: PATH_STROKE_PX / scale,
                opacity: PATH_OPACITY,
            },
        );
    }
    surface.set(OverlayRole::StartMarker, marker(start, START_MARKER_COLOR, scale));
    if multi {
        surface.set(OverlayRole::EndMarker, marker(end, END_MARKER_COLOR, scale));
    }
}

/// Remove the route from `surface`.
pub fn clear(surface: &mut OverlaySurface) {
    surface.clear();
}

fn marker(center: Point, fill: &'static str, scale: f64) -> OverlayShape {
    OverlayShape::Marker {
        center,
        radius: MARKER_RADIUS_PX / scale,
        fill,
        outline: MARKER_OUTLINE_COLOR,
        outline_width: MARKER_OUTLINE_PX / scale,
    }
}

// =============================================================
// SVG output
// =============================================================

/// Standalone SVG document for `plan` as seen through `camera` in a `container`-sized view.
///
/// The root is sized to the container's screen space, the space the camera
/// maps native coordinates into; the zoom group inside it carries the camera
/// transform, so a segment framed by the viewport is framed in the output too.
#[must_use]
pub fn render_svg(
    plan: &FloorPlan,
    camera: &Camera,
    container: Size,
    overlay: &OverlaySurface,
    highlight: Option<NodeId>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = container.width,
        h = container.height,
    ));
    out.push_str(&format!(
        r#"<g class="zoom-group" transform="translate({} {}) scale({})">"#,
        camera.translate_x, camera.translate_y, camera.scale
    ));
    for &root in plan.scene.roots() {
        write_node(&mut out, &plan.scene, root, highlight, false);
    }
    write_overlay(&mut out, overlay);
    out.push_str("</g></svg>");
    out
}

fn write_node(out: &mut String, scene: &Scene, id: NodeId, highlight: Option<NodeId>, in_highlight: bool) {
    let Some(node) = scene.get(id) else {
        return;
    };
    let is_target = highlight == Some(id);
    let lit = is_target || in_highlight;
    let tag = node.kind.tag();

    out.push('<');
    out.push_str(tag);
    if let Some(el_id) = &node.id {
        push_attr(out, "id", el_id);
    }
    for (name, value) in &node.attrs {
        if lit && (name == "fill" || name == "stroke") {
            continue;
        }
        if is_target && name == "class" {
            continue;
        }
        push_attr(out, name, value);
    }
    if is_target {
        let class = match node.attrs.iter().find(|(k, _)| k == "class") {
            Some((_, existing)) => format!("{existing} {HIGHLIGHT_CLASS}"),
            None => HIGHLIGHT_CLASS.to_owned(),
        };
        push_attr(out, "class", &class);
    }
    if lit {
        match node.kind {
            NodeKind::Text if in_highlight => push_attr(out, "fill", HIGHLIGHT_TEXT_COLOR),
            NodeKind::Text => push_attr(out, "fill", HIGHLIGHT_COLOR),
            NodeKind::Group | NodeKind::Shape(_) => {
                push_attr(out, "fill", HIGHLIGHT_COLOR);
                push_attr(out, "stroke", HIGHLIGHT_COLOR);
            }
        }
    }

    match node.kind {
        NodeKind::Group => {
            out.push('>');
            for &child in &node.children {
                write_node(out, scene, child, highlight, lit);
            }
            out.push_str("</g>");
        }
        NodeKind::Text => {
            out.push('>');
            out.push_str(&escape_xml(node.text.as_deref().unwrap_or_default()));
            out.push_str("</text>");
        }
        NodeKind::Shape(_) => out.push_str("/>"),
    }
}

fn write_overlay(out: &mut String, overlay: &OverlaySurface) {
    if overlay.is_empty() {
        return;
    }
    out.push_str(r#"<g class="route-overlay">"#);
    for item in overlay.items() {
        match &item.shape {
            OverlayShape::Polyline { points, stroke, stroke_width, opacity } => {
                let pts = points
                    .iter()
                    .map(|p| format!("{},{}", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push_str(&format!(
                    concat!(
                        r#"<polyline class="{}" points="{}" fill="none" stroke="{}" stroke-width="{}" "#,
                        r#"stroke-opacity="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                    ),
                    item.role.class(),
                    pts,
                    stroke,
                    stroke_width,
                    opacity
                ));
            }
            OverlayShape::Marker { center, radius, fill, outline, outline_width } => {
                out.push_str(&format!(
                    r#"<circle class="{}" cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                    item.role.class(),
                    center.x,
                    center.y,
                    radius,
                    fill,
                    outline,
                    outline_width
                ));
            }
        }
    }
    out.push_str("</g>");
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_xml(value));
    out.push('"');
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
