//! Top-level map engine.
//!
//! `EngineCore` wires the navigator, loader, viewport, overlay and highlight
//! engine together. It performs no I/O and never reads a clock: the host
//! feeds it pointer events, fetch results and a monotonic `now_ms`, and acts
//! on the returned [`Action`]s (fetch a floor, repaint, show a status line,
//! open a room panel).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{info, warn};

use crate::camera::{Camera, Point, Size};
use crate::config::MapConfig;
use crate::error::{ErrorCode, MapError};
use crate::hit::{self, HighlightEngine};
use crate::input::{Button, InputState, WheelDelta};
use crate::loader::{FloorCatalog, FloorPlanLoader, LoadOutcome, LoadTicket};
use crate::navigator::SegmentNavigator;
use crate::plan::FloorPlan;
use crate::render::{self, OverlaySurface};
use crate::rooms::{Room, RoomDirectory};
use crate::route::{NavigationPath, RouteResponse};
use crate::viewport::{TickResult, Viewport};

/// Actions returned from engine operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Fetch `uri` and hand the result back through [`EngineCore::floor_loaded`] with `ticket`.
    LoadFloor { ticket: LoadTicket, uri: String },
    /// The status line changed.
    StatusChanged(String),
    /// A directory room was clicked.
    RoomSelected(Room),
    RenderNeeded,
}

/// Callback invoked when the user clicks a shape that resolves to a directory room.
pub type RoomSelectedFn = Box<dyn FnMut(&Room)>;

/// Core engine state: all map logic, independent of any presentation layer.
pub struct EngineCore {
    navigator: SegmentNavigator,
    loader: FloorPlanLoader,
    viewport: Viewport,
    overlay: OverlaySurface,
    highlight: HighlightEngine,
    rooms: RoomDirectory,
    input: InputState,
    last_gesture_was_drag: bool,
    container: Size,
    status: String,
    instruction: Option<String>,
    on_select: Option<RoomSelectedFn>,
}

impl EngineCore {
    #[must_use]
    pub fn new(catalog: FloorCatalog, container: Size) -> Self {
        Self {
            navigator: SegmentNavigator::default(),
            loader: FloorPlanLoader::new(catalog),
            viewport: Viewport::default(),
            overlay: OverlaySurface::new(),
            highlight: HighlightEngine::new(),
            rooms: RoomDirectory::default(),
            input: InputState::Idle,
            last_gesture_was_drag: false,
            container,
            status: String::new(),
            instruction: None,
            on_select: None,
        }
    }

    /// Engine over the configured floor location and container size.
    #[must_use]
    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(FloorCatalog::from_location(&config.floors, &config.default_floor), config.container)
    }

    // --- Data inputs ---

    pub fn set_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = RoomDirectory::new(rooms);
    }

    /// Update the container size. Non-positive or non-finite sizes are ignored.
    pub fn set_container(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.container = Size::new(width, height);
        }
    }

    /// Register the room-selection callback, replacing any previous one.
    pub fn on_room_selected(&mut self, callback: RoomSelectedFn) {
        self.on_select = Some(callback);
    }

    // --- Route ---

    /// Replace the active route with `response` and activate its first segment.
    ///
    /// An error status, an empty route or a malformed payload clears the
    /// route and shows the message instead.
    pub fn apply_route(&mut self, response: &RouteResponse, now_ms: f64) -> Vec<Action> {
        let outcome = match NavigationPath::from_response(response) {
            Ok(outcome) => outcome,
            Err(e) => return self.route_failed(&e, now_ms),
        };
        self.status = outcome.message;
        if outcome.path.is_empty() {
            self.clear_route(now_ms);
            return vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded];
        }
        info!(segments = outcome.path.segment_count(), "route applied");
        self.navigator = SegmentNavigator::new(outcome.path);
        let mut actions = vec![Action::StatusChanged(self.status.clone())];
        actions.extend(self.activate_segment(now_ms));
        actions
    }

    /// Surface a failure from outside the route model (transport, validation) like a route error.
    pub fn route_failed(&mut self, error: &MapError, now_ms: f64) -> Vec<Action> {
        warn!(code = error.error_code(), retryable = error.retryable(), error = %error, "route unavailable");
        self.clear_route(now_ms);
        self.status = error.to_string();
        vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded]
    }

    pub fn next_segment(&mut self, now_ms: f64) -> Vec<Action> {
        if !self.navigator.next() {
            return Vec::new();
        }
        self.activate_segment(now_ms)
    }

    pub fn previous_segment(&mut self, now_ms: f64) -> Vec<Action> {
        if !self.navigator.previous() {
            return Vec::new();
        }
        self.activate_segment(now_ms)
    }

    /// Show `floor` with no route on it.
    pub fn show_floor(&mut self, floor: &str, now_ms: f64) -> Vec<Action> {
        self.clear_route(now_ms);
        self.request_floor(floor, now_ms)
    }

    fn activate_segment(&mut self, now_ms: f64) -> Vec<Action> {
        let Some(floor) = self.navigator.current().map(|s| s.floor_id.clone()) else {
            return Vec::new();
        };
        self.instruction = self.navigator.instruction();
        self.request_floor(&floor, now_ms)
    }

    fn request_floor(&mut self, floor: &str, now_ms: f64) -> Vec<Action> {
        self.loader.cancel();
        match self.loader.request(floor) {
            Ok(None) => {
                self.mount_current(now_ms);
                vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded]
            }
            Ok(Some(ticket)) => {
                self.highlight.reset();
                self.overlay.clear();
                let uri = ticket.uri.clone();
                vec![Action::LoadFloor { ticket, uri }, Action::RenderNeeded]
            }
            Err(e) => {
                self.highlight.reset();
                self.overlay.clear();
                self.status = e.to_string();
                vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded]
            }
        }
    }

    /// Commit a floor fetch started by [`Action::LoadFloor`]. Stale results yield no actions.
    pub fn floor_loaded(
        &mut self,
        ticket: &LoadTicket,
        fetched: Result<String, MapError>,
        now_ms: f64,
    ) -> Vec<Action> {
        match self.loader.complete(ticket, fetched) {
            LoadOutcome::Stale => Vec::new(),
            LoadOutcome::Failed(e) => {
                self.overlay.clear();
                self.status = e.to_string();
                vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded]
            }
            LoadOutcome::Ready { .. } => {
                self.highlight.reset();
                self.mount_current(now_ms);
                vec![Action::StatusChanged(self.status.clone()), Action::RenderNeeded]
            }
        }
    }

    /// Draw the active segment on the mounted plan and frame it.
    fn mount_current(&mut self, now_ms: f64) {
        let Some(segment) = self.navigator.current() else {
            self.overlay.clear();
            return;
        };
        render::draw_segment(&mut self.overlay, segment, self.viewport.camera().scale);
        self.viewport.fit_points(&segment.points, self.container, now_ms);
        if let Some(status) = self.navigator.status_message() {
            self.status = status;
        }
    }

    fn clear_route(&mut self, now_ms: f64) {
        self.navigator = SegmentNavigator::default();
        self.instruction = None;
        render::clear(&mut self.overlay);
        self.loader.cancel();
        if self.loader.plan().is_some() {
            self.viewport.fit_points(&[], self.container, now_ms);
        }
    }

    fn redraw_overlay(&mut self) {
        if self.loader.plan().is_none() {
            return;
        }
        if let Some(segment) = self.navigator.current() {
            render::draw_segment(&mut self.overlay, segment, self.viewport.camera().scale);
        }
    }

    // --- Clock ---

    /// Advance the camera transition and tooltip auto-close.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        let mut changed = false;
        if self.viewport.tick(now_ms) != TickResult::Idle {
            self.redraw_overlay();
            changed = true;
        }
        changed |= self.highlight.tick(now_ms);
        if changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.input = InputState::press(button, screen_pt);
        self.last_gesture_was_drag = false;
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        if let Some((dx, dy)) = self.input.drag_to(screen_pt) {
            self.viewport.pan_by(dx, dy);
            return vec![Action::RenderNeeded];
        }
        if self.hover(screen_pt) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button) -> Vec<Action> {
        self.last_gesture_was_drag = self.input.is_drag();
        self.input = InputState::Idle;
        Vec::new()
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        let had_hover = self.highlight.hovered().is_some() || self.highlight.tooltip().is_some();
        self.highlight.pointer_leave();
        if had_hover { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if delta.dy == 0.0 || !delta.dy.is_finite() {
            return Vec::new();
        }
        self.viewport.wheel_zoom(screen_pt, delta.dy);
        self.redraw_overlay();
        vec![Action::RenderNeeded]
    }

    /// Click at `screen_pt`. Emits [`Action::RoomSelected`] and calls the
    /// selection callback when the clicked shape resolves to a directory room.
    /// A click ending a drag-pan is ignored.
    pub fn on_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if std::mem::take(&mut self.last_gesture_was_drag) {
            return Vec::new();
        }
        let Some(plan) = self.loader.plan() else {
            return Vec::new();
        };
        let world = self.viewport.camera().screen_to_world(screen_pt);
        let Some(room) = hit::hit_test(plan, world)
            .and_then(|node| hit::resolve_room_key(plan, node))
            .and_then(|key| self.rooms.lookup(&key))
        else {
            return Vec::new();
        };
        info!(room = %room.room_name, "room selected");
        if let Some(callback) = self.on_select.as_mut() {
            callback(room);
        }
        vec![Action::RoomSelected(room.clone())]
    }

    /// Highlight `room` on the mounted plan with a self-closing tooltip.
    /// Any earlier highlight is cleared, even when `room` has no shape.
    pub fn select_room(&mut self, room: &Room, now_ms: f64) -> Vec<Action> {
        let Some(plan) = self.loader.plan() else {
            return Vec::new();
        };
        let camera = *self.viewport.camera();
        let was_visible = self.highlight.highlighted().is_some() || self.highlight.tooltip().is_some();
        if self.highlight.highlight_room(plan, room, &camera, now_ms) || was_visible {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Update hover state for the pointer at `screen_pt`. Returns `true` if anything visible changed.
    fn hover(&mut self, screen_pt: Point) -> bool {
        let Some(plan) = self.loader.plan() else {
            return false;
        };
        let world = self.viewport.camera().screen_to_world(screen_pt);
        match (hit::hit_test(plan, world), self.highlight.hovered()) {
            (Some(node), Some(current)) if node == current => self.highlight.pointer_move(node, screen_pt),
            (Some(node), _) => {
                self.highlight.pointer_enter(plan, &self.rooms, node, screen_pt);
                true
            }
            (None, Some(_)) => {
                self.highlight.pointer_leave();
                true
            }
            (None, None) => false,
        }
    }

    // --- Render ---

    /// SVG for the mounted floor at the container size, or `None` while nothing is mounted.
    #[must_use]
    pub fn render_svg(&self) -> Option<String> {
        let plan = self.loader.plan()?;
        Some(render::render_svg(
            plan,
            self.viewport.camera(),
            self.container,
            &self.overlay,
            self.highlight.highlighted(),
        ))
    }

    // --- Queries ---

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Instruction for the active segment.
    #[must_use]
    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        self.navigator.progress_label()
    }

    #[must_use]
    pub fn navigator(&self) -> &SegmentNavigator {
        &self.navigator
    }

    #[must_use]
    pub fn loader(&self) -> &FloorPlanLoader {
        &self.loader
    }

    #[must_use]
    pub fn plan(&self) -> Option<&FloorPlan> {
        self.loader.plan()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        *self.viewport.camera()
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn overlay(&self) -> &OverlaySurface {
        &self.overlay
    }

    #[must_use]
    pub fn highlight(&self) -> &HighlightEngine {
        &self.highlight
    }

    #[must_use]
    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }
}
