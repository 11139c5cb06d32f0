//! Shared numeric and visual constants for the map renderer.

// ── Floor plans ─────────────────────────────────────────────────

/// Native width used when a floor plan declares neither a view box nor a width.
pub const DEFAULT_PLAN_WIDTH: f64 = 600.0;

/// Native height used when a floor plan declares neither a view box nor a height.
pub const DEFAULT_PLAN_HEIGHT: f64 = 400.0;

// ── Camera ──────────────────────────────────────────────────────

/// Lower zoom bound.
pub const DEFAULT_MIN_SCALE: f64 = 0.3;

/// Upper zoom bound.
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

/// Fraction of the segment extent added as margin when auto-fitting.
pub const FIT_PADDING: f64 = 0.2;

/// Minimum extent, in native units, substituted for a zero-width or zero-height bounding box.
pub const MIN_FIT_SPAN: f64 = 50.0;

/// Duration of the animated fit-to-segment transition.
pub const FIT_DURATION_MS: f64 = 750.0;

/// Duration of the animated reset-to-identity transition.
pub const RESET_DURATION_MS: f64 = 500.0;

/// Wheel delta (pixels) to zoom exponent factor.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.002;

// ── Overlay ─────────────────────────────────────────────────────

/// Route stroke width in screen pixels.
pub const PATH_STROKE_PX: f64 = 5.0;

/// Start/end marker radius in screen pixels.
pub const MARKER_RADIUS_PX: f64 = 8.0;

/// Marker outline width in screen pixels.
pub const MARKER_OUTLINE_PX: f64 = 1.5;

pub const PATH_COLOR: &str = "#800080";
pub const PATH_OPACITY: f64 = 0.9;
pub const START_MARKER_COLOR: &str = "#32CD32";
pub const END_MARKER_COLOR: &str = "#FF0000";
pub const MARKER_OUTLINE_COLOR: &str = "#000000";

/// Fill/stroke applied to highlighted room shapes.
pub const HIGHLIGHT_COLOR: &str = "purple";

/// Fill applied to labels inside a highlighted room.
pub const HIGHLIGHT_TEXT_COLOR: &str = "white";

// ── Tooltip ─────────────────────────────────────────────────────

/// Tooltip is placed this many pixels above the pointer.
pub const TOOLTIP_OFFSET_PX: f64 = 15.0;

/// Programmatic highlights close their tooltip after this long.
pub const TOOLTIP_AUTO_CLOSE_MS: f64 = 2000.0;

/// Label used when neither a room nor an identifier could be resolved.
pub const FALLBACK_ROOM_LABEL: &str = "Room";

/// Placeholder for missing room attributes in tooltips.
pub const MISSING_FIELD_LABEL: &str = "N/A";
