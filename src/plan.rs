//! Floor plans: parsing, coordinate-space normalization and the scene graph.
//!
//! A floor plan's vector document is parsed once into an arena of typed
//! [`SceneNode`]s (groups, shapes, labels) carrying identifiers, label text,
//! parent pointers and world-space bounds. Everything downstream (hit-testing,
//! highlight, SVG output) works on this scene rather than on raw markup.
//!
//! The native coordinate space comes from the root's `viewBox`; failing that,
//! from its `width`/`height` attributes; failing both, from a 600×400 default
//! with a synthesized view box, so geometry math never divides by zero.

#[cfg(test)]
#[path = "plan_test.rs"]
mod plan_test;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_PLAN_HEIGHT, DEFAULT_PLAN_WIDTH};
use crate::error::MapError;

/// Index of a node in a [`Scene`].
pub type NodeId = usize;

/// Default label font size when the document gives none.
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Average glyph advance as a fraction of font size, for label bounds.
const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// Drawing primitives recognised in floor plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Path,
    Polygon,
    Polyline,
    Line,
    Circle,
    Ellipse,
}

impl ShapeKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rect" => Some(Self::Rect),
            "path" => Some(Self::Path),
            "polygon" => Some(Self::Polygon),
            "polyline" => Some(Self::Polyline),
            "line" => Some(Self::Line),
            "circle" => Some(Self::Circle),
            "ellipse" => Some(Self::Ellipse),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Path => "path",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
        }
    }
}

/// What a scene node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A visual group (`<g>`).
    Group,
    /// A drawing primitive.
    Shape(ShapeKind),
    /// A text label.
    Text,
}

impl NodeKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Group => "g",
            Self::Shape(kind) => kind.tag(),
            Self::Text => "text",
        }
    }
}

/// One element of a floor plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    /// The element's own `id`, if non-empty.
    pub id: Option<String>,
    /// Trimmed text content, for labels only.
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// World-space bounds; `None` when the geometry is missing or degenerate.
    pub bounds: Option<Rect>,
    /// Source attributes (local names) other than `id`, kept for re-serialization.
    pub attrs: Vec<(String, String)>,
}

/// Arena of scene nodes in document order. Parents always precede children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Parent accessor used for upward traversal.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Top-level nodes in document order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// All nodes with their ids, in document order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate()
    }

    /// First node whose own `id` equals `element_id`.
    #[must_use]
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(element_id))
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        let id = self.nodes.len();
        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    /// Groups take the union of their children's bounds. Children follow parents,
    /// so a reverse sweep sees every child before its parent.
    fn propagate_group_bounds(&mut self) {
        for idx in (0..self.nodes.len()).rev() {
            if self.nodes[idx].kind != NodeKind::Group {
                continue;
            }
            let union = self.nodes[idx]
                .children
                .iter()
                .filter_map(|&c| self.nodes[c].bounds)
                .reduce(|a, b| a.union(&b));
            if union.is_some() {
                self.nodes[idx].bounds = union;
            }
        }
    }
}

/// The declared `viewBox` of a floor plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    #[must_use]
    pub fn as_attr(&self) -> String {
        format!("{} {} {} {}", self.min_x, self.min_y, self.width, self.height)
    }
}

/// Where a floor plan's native size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    ViewBox,
    Attributes,
    Default,
}

/// A parsed, normalized floor plan. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlan {
    pub id: String,
    pub source_uri: String,
    pub native_width: f64,
    pub native_height: f64,
    pub view_box: ViewBox,
    pub size_source: SizeSource,
    pub content: String,
    pub scene: Scene,
}

/// Parse a floor plan document and derive its native coordinate space.
///
/// # Errors
///
/// - [`MapError::Parse`] if the content is not XML or its root is not `<svg>`.
/// - [`MapError::Dimension`] if a declared `viewBox` or `width`/`height` cannot yield a positive size.
pub fn parse_floor_plan(id: &str, source_uri: &str, content: &str) -> Result<FloorPlan, MapError> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(content, options).map_err(|e| MapError::Parse(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(MapError::Parse(format!("root element is <{}>, expected <svg>", root.tag_name().name())));
    }

    let (view_box, size_source) = derive_view_box(root)?;

    let mut scene = Scene::default();
    for child in root.children().filter(roxmltree::Node::is_element) {
        collect_nodes(child, None, Point::new(0.0, 0.0), &mut scene);
    }
    scene.propagate_group_bounds();

    Ok(FloorPlan {
        id: id.to_owned(),
        source_uri: source_uri.to_owned(),
        native_width: view_box.width,
        native_height: view_box.height,
        view_box,
        size_source,
        content: content.to_owned(),
        scene,
    })
}

fn derive_view_box(root: roxmltree::Node<'_, '_>) -> Result<(ViewBox, SizeSource), MapError> {
    if let Some(raw) = root.attribute("viewBox") {
        let nums = parse_number_list(raw);
        let [min_x, min_y, width, height] = nums.as_slice() else {
            return Err(MapError::Dimension(format!("viewBox \"{raw}\" must have four numbers")));
        };
        if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) {
            return Err(MapError::Dimension(format!("viewBox \"{raw}\" has non-positive size")));
        }
        return Ok((ViewBox { min_x: *min_x, min_y: *min_y, width: *width, height: *height }, SizeSource::ViewBox));
    }

    let width = dimension_attr(root, "width")?;
    let height = dimension_attr(root, "height")?;
    let source = if width.is_some() || height.is_some() { SizeSource::Attributes } else { SizeSource::Default };
    let view_box = ViewBox {
        min_x: 0.0,
        min_y: 0.0,
        width: width.unwrap_or(DEFAULT_PLAN_WIDTH),
        height: height.unwrap_or(DEFAULT_PLAN_HEIGHT),
    };
    Ok((view_box, source))
}

/// Absolute length attribute. Relative units (`%`, `em`) count as absent.
fn dimension_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Option<f64>, MapError> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let numeric = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    let Ok(value) = numeric.parse::<f64>() else {
        return Ok(None);
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(MapError::Dimension(format!("{name}=\"{raw}\" is not a positive length")));
    }
    Ok(Some(value))
}

fn collect_nodes(el: roxmltree::Node<'_, '_>, parent: Option<NodeId>, offset: Point, scene: &mut Scene) {
    let tag = el.tag_name().name();
    if matches!(tag, "defs" | "style" | "script" | "metadata" | "title" | "desc" | "clipPath" | "mask") {
        return;
    }
    let offset = match el.attribute("transform").and_then(parse_translate) {
        Some(t) => Point::new(offset.x + t.x, offset.y + t.y),
        None => offset,
    };

    let kind = match tag {
        "g" => Some(NodeKind::Group),
        "text" => Some(NodeKind::Text),
        other => ShapeKind::from_tag(other).map(NodeKind::Shape),
    };

    let Some(kind) = kind else {
        // Unknown container (<a>, <switch>, nested <svg>): its children attach to our parent.
        for child in el.children().filter(roxmltree::Node::is_element) {
            collect_nodes(child, parent, offset, scene);
        }
        return;
    };

    let id = el
        .attribute("id")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let text = if kind == NodeKind::Text { label_text(el) } else { None };
    let bounds = element_bounds(el, kind, text.as_deref()).map(|b| b.translated(offset.x, offset.y));
    let attrs = el
        .attributes()
        .filter(|a| a.name() != "id")
        .map(|a| (a.name().to_owned(), a.value().to_owned()))
        .collect();

    let node_id = scene.push(SceneNode { kind, id, text, parent, children: Vec::new(), bounds, attrs });

    if kind == NodeKind::Group {
        for child in el.children().filter(roxmltree::Node::is_element) {
            collect_nodes(child, Some(node_id), offset, scene);
        }
    }
}

fn label_text(el: roxmltree::Node<'_, '_>) -> Option<String> {
    let joined = el
        .descendants()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join("");
    let trimmed = joined.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

fn num_attr(el: roxmltree::Node<'_, '_>, name: &str) -> Option<f64> {
    let raw = el.attribute(name)?.trim();
    raw.strip_suffix("px")
        .unwrap_or(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn element_bounds(el: roxmltree::Node<'_, '_>, kind: NodeKind, text: Option<&str>) -> Option<Rect> {
    match kind {
        NodeKind::Group => None,
        NodeKind::Text => {
            let x = num_attr(el, "x").unwrap_or(0.0);
            let y = num_attr(el, "y").unwrap_or(0.0);
            let size = num_attr(el, "font-size").unwrap_or(DEFAULT_FONT_SIZE);
            let chars = text.map_or(0, |t| t.chars().count());
            #[allow(clippy::cast_precision_loss)]
            let width = chars as f64 * size * GLYPH_ADVANCE_RATIO;
            let (min_x, max_x) = match el.attribute("text-anchor") {
                Some("middle") => (x - width / 2.0, x + width / 2.0),
                Some("end") => (x - width, x),
                _ => (x, x + width),
            };
            Some(Rect::new(min_x, y - size, max_x, y))
        }
        NodeKind::Shape(ShapeKind::Rect) => {
            let w = num_attr(el, "width")?;
            let h = num_attr(el, "height")?;
            if w < 0.0 || h < 0.0 {
                return None;
            }
            Some(Rect::from_xywh(num_attr(el, "x").unwrap_or(0.0), num_attr(el, "y").unwrap_or(0.0), w, h))
        }
        NodeKind::Shape(ShapeKind::Circle) => {
            let r = num_attr(el, "r")?;
            let cx = num_attr(el, "cx").unwrap_or(0.0);
            let cy = num_attr(el, "cy").unwrap_or(0.0);
            Some(Rect::new(cx - r, cy - r, cx + r, cy + r))
        }
        NodeKind::Shape(ShapeKind::Ellipse) => {
            let rx = num_attr(el, "rx")?;
            let ry = num_attr(el, "ry")?;
            let cx = num_attr(el, "cx").unwrap_or(0.0);
            let cy = num_attr(el, "cy").unwrap_or(0.0);
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        NodeKind::Shape(ShapeKind::Line) => {
            let pts = [
                Point::new(num_attr(el, "x1").unwrap_or(0.0), num_attr(el, "y1").unwrap_or(0.0)),
                Point::new(num_attr(el, "x2").unwrap_or(0.0), num_attr(el, "y2").unwrap_or(0.0)),
            ];
            points_bounds(&pts)
        }
        NodeKind::Shape(ShapeKind::Polygon | ShapeKind::Polyline) => {
            let nums = parse_number_list(el.attribute("points")?);
            let pts = nums
                .chunks_exact(2)
                .map(|c| Point::new(c[0], c[1]))
                .collect::<Vec<_>>();
            points_bounds(&pts)
        }
        NodeKind::Shape(ShapeKind::Path) => points_bounds(&path_points(el.attribute("d")?)),
    }
}

/// Exact bounds of a point set (no minimum span).
fn points_bounds(points: &[Point]) -> Option<Rect> {
    let mut finite = points.iter().filter(|p| p.is_finite());
    let first = finite.next()?;
    let init = Rect::new(first.x, first.y, first.x, first.y);
    Some(finite.fold(init, |r, p| Rect::new(r.min_x.min(p.x), r.min_y.min(p.y), r.max_x.max(p.x), r.max_y.max(p.y))))
}

/// Parse `translate(x[, y])`. Other transforms are ignored.
fn parse_translate(transform: &str) -> Option<Point> {
    let t = transform.trim();
    let t = t.strip_prefix("translate")?.trim_start();
    let t = t.strip_prefix('(')?;
    let t = &t[..t.find(')')?];
    match parse_number_list(t).as_slice() {
        [x, y] => Some(Point::new(*x, *y)),
        [x] => Some(Point::new(*x, 0.0)),
        _ => None,
    }
}

/// Numbers separated by whitespace and/or commas. Unparseable tokens are dropped.
fn parse_number_list(raw: &str) -> Vec<f64> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect()
}

// =============================================================
// Path data
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn tokenize_path(d: &str) -> Vec<PathToken> {
    let bytes = d.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(PathToken::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            let start = i;
            let mut seen_dot = false;
            let mut seen_exp = false;
            if c == '-' || c == '+' {
                i += 1;
            }
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch.is_ascii_digit() {
                    i += 1;
                } else if ch == '.' && !seen_dot && !seen_exp {
                    seen_dot = true;
                    i += 1;
                } else if (ch == 'e' || ch == 'E') && !seen_exp {
                    seen_exp = true;
                    i += 1;
                    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            if let Ok(v) = d[start..i].parse::<f64>() {
                tokens.push(PathToken::Number(v));
            }
            if i == start {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    tokens
}

/// Absolute points touched by a path (vertices and control points).
///
/// Control points over-approximate curve extents, which is fine for hit boxes.
fn path_points(d: &str) -> Vec<Point> {
    let tokens = tokenize_path(d);
    let mut out = Vec::new();
    let mut cur = Point::new(0.0, 0.0);
    let mut start = cur;
    let mut cmd = 'M';
    let mut i = 0;

    let take = |i: &mut usize, n: usize| -> Option<Vec<f64>> {
        let mut vals = Vec::with_capacity(n);
        for _ in 0..n {
            match tokens.get(*i) {
                Some(PathToken::Number(v)) => {
                    vals.push(*v);
                    *i += 1;
                }
                _ => return None,
            }
        }
        Some(vals)
    };

    while i < tokens.len() {
        if let PathToken::Command(c) = tokens[i] {
            cmd = c;
            i += 1;
            if c == 'Z' || c == 'z' {
                cur = start;
                continue;
            }
        }
        let rel = cmd.is_ascii_lowercase();
        let base = if rel { cur } else { Point::new(0.0, 0.0) };
        let step = match cmd.to_ascii_uppercase() {
            'M' | 'L' | 'T' => take(&mut i, 2).map(|v| vec![Point::new(base.x + v[0], base.y + v[1])]),
            'H' => take(&mut i, 1).map(|v| vec![Point::new(base.x + v[0], cur.y)]),
            'V' => take(&mut i, 1).map(|v| vec![Point::new(cur.x, base.y + v[0])]),
            'Q' | 'S' => take(&mut i, 4).map(|v| {
                vec![Point::new(base.x + v[0], base.y + v[1]), Point::new(base.x + v[2], base.y + v[3])]
            }),
            'C' => take(&mut i, 6).map(|v| {
                vec![
                    Point::new(base.x + v[0], base.y + v[1]),
                    Point::new(base.x + v[2], base.y + v[3]),
                    Point::new(base.x + v[4], base.y + v[5]),
                ]
            }),
            'A' => take(&mut i, 7).map(|v| vec![Point::new(base.x + v[5], base.y + v[6])]),
            _ => None,
        };
        let Some(points) = step else {
            break;
        };
        if let Some(last) = points.last() {
            cur = *last;
        }
        if cmd == 'M' || cmd == 'm' {
            start = cur;
            // Subsequent coordinate pairs after a moveto are implicit linetos.
            cmd = if rel { 'l' } else { 'L' };
        }
        out.extend(points);
    }
    out
}
