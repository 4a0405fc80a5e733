//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Multiplicative zoom ratio applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.05;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 20.0;

/// Canvas size assumed until the host reports the real one.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

// ── Geometry ────────────────────────────────────────────────────

/// Minimum width and height, in image pixels, of a drawn or resized box.
pub const MIN_BOX_SIZE: f64 = 5.0;

/// Label given to a freshly drawn box.
pub const DEFAULT_LABEL: &str = "New Object";

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Rendering ───────────────────────────────────────────────────

/// Distance between grid lines, in image pixels.
pub const GRID_SPACING: f64 = 50.0;

/// Stroke color for committed boxes.
pub const BOX_COLOR: &str = "#00ff00";

/// Stroke color for the box being drawn.
pub const DRAFT_COLOR: &str = "#FFFF00";

/// Grid line color.
pub const GRID_COLOR: &str = "rgba(255, 255, 255, 0.2)";
