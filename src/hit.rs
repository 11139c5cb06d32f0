//! Hit-testing, room-key resolution and the hover/selection highlight state.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use tracing::debug;

use crate::camera::{Camera, Point};
use crate::consts::{FALLBACK_ROOM_LABEL, MISSING_FIELD_LABEL, TOOLTIP_AUTO_CLOSE_MS, TOOLTIP_OFFSET_PX};
use crate::plan::{FloorPlan, NodeId, NodeKind};
use crate::rooms::{Room, RoomDirectory};

/// Room key of a scene node: its own id, else its label text, else its parent group's id.
#[must_use]
pub fn resolve_room_key(plan: &FloorPlan, node: NodeId) -> Option<String> {
    let n = plan.scene.get(node)?;
    if let Some(id) = &n.id {
        return Some(id.clone());
    }
    if n.kind == NodeKind::Text
        && let Some(text) = &n.text
    {
        return Some(text.clone());
    }
    let parent = plan.scene.get(n.parent?)?;
    parent.id.clone()
}

/// Topmost node under `world_pt`. Leaves win over groups; later nodes are on top.
#[must_use]
pub fn hit_test(plan: &FloorPlan, world_pt: Point) -> Option<NodeId> {
    let hits = |want_group: bool| {
        plan.scene
            .iter()
            .rev()
            .filter(move |(_, n)| (n.kind == NodeKind::Group) == want_group)
            .find(|(_, n)| n.bounds.is_some_and(|b| b.contains(world_pt)))
            .map(|(id, _)| id)
    };
    hits(false).or_else(|| hits(true))
}

/// Node to visually highlight for a hit on `node`: the group itself, its enclosing group, or the node.
#[must_use]
pub fn highlight_target(plan: &FloorPlan, node: NodeId) -> NodeId {
    match plan.scene.get(node) {
        Some(n) if n.kind == NodeKind::Group => node,
        Some(n) => n
            .parent
            .filter(|&p| plan.scene.get(p).is_some_and(|pn| pn.kind == NodeKind::Group))
            .unwrap_or(node),
        None => node,
    }
}

/// What a tooltip shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    pub title: String,
    /// Type and floor lines; present only for directory matches.
    pub details: Option<(String, String)>,
    pub description: Option<String>,
}

impl TooltipContent {
    /// Content for a directory room.
    #[must_use]
    pub fn for_room(room: &Room) -> Self {
        let title = if room.room_name.trim().is_empty() {
            FALLBACK_ROOM_LABEL.to_owned()
        } else {
            room.room_name.clone()
        };
        let or_missing = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(MISSING_FIELD_LABEL)
                .to_owned()
        };
        Self {
            title,
            details: Some((or_missing(&room.room_type), or_missing(&room.floor))),
            description: room.description.clone().filter(|d| !d.trim().is_empty()),
        }
    }

    /// Content for a resolved key: the directory room if one matches, else the bare key, else "Room".
    #[must_use]
    pub fn resolve(key: Option<&str>, rooms: &RoomDirectory) -> Self {
        if let Some(room) = key.and_then(|k| rooms.lookup(k)) {
            return Self::for_room(room);
        }
        Self {
            title: key.unwrap_or(FALLBACK_ROOM_LABEL).to_owned(),
            details: None,
            description: None,
        }
    }

    /// Display lines, title first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone()];
        if let Some((room_type, floor)) = &self.details {
            lines.push(format!("Type: {room_type}"));
            lines.push(format!("Floor: {floor}"));
        }
        if let Some(d) = &self.description {
            lines.push(d.clone());
        }
        lines
    }
}

/// An open tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub content: TooltipContent,
    /// Screen position in container pixels.
    pub position: Point,
    /// Close deadline for programmatic highlights; hover tooltips stay open.
    pub close_at_ms: Option<f64>,
}

/// Hover and selection highlight for one mounted floor plan.
///
/// Discard it (or call [`HighlightEngine::reset`]) when the plan is replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightEngine {
    hovered: Option<NodeId>,
    highlighted: Option<NodeId>,
    tooltip: Option<Tooltip>,
}

impl HighlightEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Pointer entered `node`: highlight it and open its tooltip above the pointer.
    pub fn pointer_enter(&mut self, plan: &FloorPlan, rooms: &RoomDirectory, node: NodeId, screen_pt: Point) {
        let key = resolve_room_key(plan, node);
        self.hovered = Some(node);
        self.highlighted = Some(highlight_target(plan, node));
        self.tooltip = Some(Tooltip {
            content: TooltipContent::resolve(key.as_deref(), rooms),
            position: tooltip_position(screen_pt),
            close_at_ms: None,
        });
    }

    /// Pointer moved over `node`. Only the current hover target moves the tooltip.
    pub fn pointer_move(&mut self, node: NodeId, screen_pt: Point) -> bool {
        if self.hovered != Some(node) {
            return false;
        }
        match &mut self.tooltip {
            Some(t) => {
                t.position = tooltip_position(screen_pt);
                true
            }
            None => false,
        }
    }

    /// Pointer left the hover target (or the plan).
    pub fn pointer_leave(&mut self) {
        self.reset();
    }

    /// Highlight the shape whose room key is `room`'s name and pin a tooltip to it
    /// for [`TOOLTIP_AUTO_CLOSE_MS`]. Returns `false` with state cleared when no shape matches.
    pub fn highlight_room(&mut self, plan: &FloorPlan, room: &Room, camera: &Camera, now_ms: f64) -> bool {
        self.reset();
        let Some(node) = plan
            .scene
            .iter()
            .map(|(id, _)| id)
            .find(|&id| resolve_room_key(plan, id).as_deref() == Some(room.room_name.as_str()))
        else {
            debug!(room = %room.room_name, floor = %plan.id, "no shape for room");
            return false;
        };
        let target = highlight_target(plan, node);
        let anchor = plan
            .scene
            .get(target)
            .and_then(|n| n.bounds)
            .map(|b| camera.world_rect_to_screen(&b))
            .map_or_else(|| Point::new(0.0, 0.0), |r| Point::new(r.center().x, r.min_y));

        self.highlighted = Some(target);
        self.tooltip = Some(Tooltip {
            content: TooltipContent::for_room(room),
            position: anchor,
            close_at_ms: Some(now_ms + TOOLTIP_AUTO_CLOSE_MS),
        });
        true
    }

    /// Close an expired programmatic tooltip. Returns `true` if anything changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let expired = self
            .tooltip
            .as_ref()
            .and_then(|t| t.close_at_ms)
            .is_some_and(|deadline| now_ms >= deadline);
        if expired {
            self.reset();
        }
        expired
    }

    /// Drop hover, highlight and tooltip.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.highlighted = None;
        self.tooltip = None;
    }
}

fn tooltip_position(screen_pt: Point) -> Point {
    Point::new(screen_pt.x, screen_pt.y - TOOLTIP_OFFSET_PX)
}
