//! Pointer-side types: the three tools, buttons and modifiers, and the
//! gesture record kept between pointer-down and pointer-up.
//!
//! A gesture is one of pan, draw, move or resize. Draw and resize keep their
//! in-progress geometry here (signed draft extents, transient scale) so the
//! committed list only ever sees normalized, absolute boxes.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{Annotation, AnnotationId};
use crate::hit::ResizeAnchor;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Select, move, and resize existing boxes.
    Select,
    /// Draw a new box (default).
    #[default]
    DrawRect,
    /// Drag to translate the view.
    Pan,
}

impl Tool {
    /// Map a shortcut letter (case-insensitive) to its tool.
    #[must_use]
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(Self::Select),
            'r' => Some(Self::DrawRect),
            'h' => Some(Self::Pan),
            _ => None,
        }
    }

    /// Cursor the host should show while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pan => "grab",
            Self::Select => "default",
            Self::DrawRect => "crosshair",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    #[serde(default)]
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Tool chosen by the user.
    pub tool: Tool,
    /// The id of the currently selected annotation, if any.
    pub selected_id: Option<AnnotationId>,
    /// Whether the shortcut help overlay is shown.
    pub help_visible: bool,
    /// Whether the grid overlay is drawn.
    pub show_grid: bool,
    /// Space is held down, temporarily switching to panning.
    pub space_held: bool,
}

impl UiState {
    /// The tool that pointer events are routed through right now.
    #[must_use]
    pub fn effective_tool(&self) -> Tool {
        if self.space_held { Tool::Pan } else { self.tool }
    }
}

/// Transient scale applied to a box while a resize handle is dragged.
///
/// Committed annotations never carry a scale; on release the factors are
/// folded into width and height and this value is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeTransform {
    /// Box origin during the gesture.
    pub x: f64,
    pub y: f64,
    /// Horizontal factor relative to the width at gesture start.
    pub scale_x: f64,
    /// Vertical factor relative to the height at gesture start.
    pub scale_y: f64,
}

impl ResizeTransform {
    /// Identity transform for a box at rest.
    #[must_use]
    pub fn identity(orig: &Annotation) -> Self {
        Self { x: orig.x, y: orig.y, scale_x: 1.0, scale_y: 1.0 }
    }

    /// Fold the transient scale into absolute dimensions.
    #[must_use]
    pub fn apply(&self, orig: &Annotation) -> Annotation {
        Annotation {
            x: self.x,
            y: self.y,
            width: orig.width * self.scale_x,
            height: orig.height * self.scale_y,
            ..orig.clone()
        }
    }
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is dragging the view.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is drawing a new box. Extents are signed until release.
    Drawing { draft: Annotation },
    /// The user is dragging a selected box.
    MovingAnnotation {
        id: AnnotationId,
        /// Image-space position of the pointer at the previous event.
        last_world: Point,
        /// Box origin when the drag started, restored if the gesture is cancelled.
        origin: Point,
    },
    /// The user is dragging one of the eight resize handles.
    ResizingAnnotation {
        id: AnnotationId,
        anchor: ResizeAnchor,
        /// Image-space pointer position at the start of the resize.
        start_world: Point,
        /// The box as it was when the gesture started.
        orig: Annotation,
        /// Last accepted transient scale.
        transient: ResizeTransform,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
