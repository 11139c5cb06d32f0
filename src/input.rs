//! Input model: mouse buttons, wheel deltas and the pan gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. The only gesture is a drag-pan; it carries the last screen
//! position so each move yields an incremental delta.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;

/// Pointer travel, in screen pixels, below which a press-release still counts as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta. Horizontal scroll does not zoom and is not carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Vertical scroll amount in pixels (positive = down, zooms out).
    pub dy: f64,
}

/// Gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the map by dragging.
    Panning {
        /// Screen position at pointer-down.
        origin: Point,
        /// Screen position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
}

impl InputState {
    /// Begin a pan at `screen_pt`. Only the primary and middle buttons pan.
    #[must_use]
    pub fn press(button: Button, screen_pt: Point) -> Self {
        match button {
            Button::Primary | Button::Middle => Self::Panning { origin: screen_pt, last_screen: screen_pt },
            Button::Secondary => Self::Idle,
        }
    }

    /// Advance a pan to `screen_pt`, returning the screen delta since the last event.
    pub fn drag_to(&mut self, screen_pt: Point) -> Option<(f64, f64)> {
        match self {
            Self::Panning { last_screen, .. } => {
                let delta = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                Some(delta)
            }
            Self::Idle => None,
        }
    }

    /// Whether the pointer has travelled beyond [`CLICK_SLOP_PX`] since pointer-down.
    #[must_use]
    pub fn is_drag(&self) -> bool {
        match self {
            Self::Panning { origin, last_screen } => {
                (last_screen.x - origin.x).hypot(last_screen.y - origin.y) > CLICK_SLOP_PX
            }
            Self::Idle => false,
        }
    }
}
