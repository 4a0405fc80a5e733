#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// A point in either screen or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Quarter-turn rotation of the image layer, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// `(rotation, cos, sin)` for every quarter turn. Exact integers so that
/// rotating never perturbs projected coordinates.
const ROTATION_BASIS: [(Rotation, f64, f64); 4] = [
    (Rotation::Deg0, 1.0, 0.0),
    (Rotation::Deg90, 0.0, 1.0),
    (Rotation::Deg180, -1.0, 0.0),
    (Rotation::Deg270, 0.0, -1.0),
];

impl Rotation {
    fn from_quarter_turns(quarters: i64) -> Self {
        match quarters.rem_euclid(4) {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    fn quarter_turns(self) -> i64 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Rotate by a signed number of quarter turns (positive = clockwise).
    #[must_use]
    pub fn rotated_by(self, quarter_turns: i64) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + quarter_turns)
    }

    /// `(cos, sin)` of this rotation.
    #[must_use]
    pub fn basis(self) -> (f64, f64) {
        ROTATION_BASIS
            .iter()
            .find(|(r, _, _)| *r == self)
            .map_or((1.0, 0.0), |&(_, c, s)| (c, s))
    }

    /// Translation applied to the rotated layer so the image's visible
    /// bounding box stays anchored at the layer origin.
    #[must_use]
    pub fn anchor(self, image_width: f64, image_height: f64) -> Point {
        match self {
            Self::Deg0 => Point::new(0.0, 0.0),
            Self::Deg90 => Point::new(image_height, 0.0),
            Self::Deg180 => Point::new(image_width, image_height),
            Self::Deg270 => Point::new(0.0, image_width),
        }
    }
}

/// Direction of a discrete zoom action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel convention: scrolling up (negative delta) zooms in.
    #[must_use]
    pub fn from_wheel(dy: f64) -> Self {
        if dy < 0.0 { Self::In } else { Self::Out }
    }
}

/// Viewport transform between screen pixels and image pixels.
///
/// The composed mapping is `screen = pan + zoom * (anchor + R * image)`,
/// where `R` and `anchor` come from `rotation`. `pan_x` / `pan_y` are in
/// screen pixels and `zoom` is a scale factor (1.0 = one image pixel per
/// screen pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    pub rotation: Rotation,
    pub image_width: f64,
    pub image_height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0, rotation: Rotation::Deg0, image_width: 0.0, image_height: 0.0 }
    }
}

impl Camera {
    /// Scale the image to fit the viewport without upscaling, and center it.
    pub fn fit_to_window(&mut self, image_width: f64, image_height: f64, viewport_width: f64, viewport_height: f64) {
        self.image_width = image_width;
        self.image_height = image_height;
        self.rotation = Rotation::Deg0;
        if image_width <= 0.0 || image_height <= 0.0 {
            self.zoom = 1.0;
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            return;
        }
        let zoom = (viewport_width / image_width)
            .min(viewport_height / image_height)
            .min(1.0);
        self.zoom = if zoom > 0.0 { zoom } else { 1.0 };
        self.pan_x = (viewport_width - image_width * self.zoom) / 2.0;
        self.pan_y = (viewport_height - image_height * self.zoom) / 2.0;
    }

    /// Convert a screen-space point to image coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let (cos, sin) = self.rotation.basis();
        let anchor = self.anchor();
        let qx = (screen.x - self.pan_x) / self.zoom - anchor.x;
        let qy = (screen.y - self.pan_y) / self.zoom - anchor.y;
        Point { x: qx * cos + qy * sin, y: -qx * sin + qy * cos }
    }

    /// Convert an image-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let (cos, sin) = self.rotation.basis();
        let anchor = self.anchor();
        let lx = anchor.x + world.x * cos - world.y * sin;
        let ly = anchor.y + world.x * sin + world.y * cos;
        Point { x: self.pan_x + lx * self.zoom, y: self.pan_y + ly * self.zoom }
    }

    /// Convert a screen-space distance (pixels) to image-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Zoom one step about `screen`, keeping the image point under it fixed.
    ///
    /// Returns `false` when the zoom limit made this a no-op.
    pub fn zoom_at(&mut self, screen: Point, direction: ZoomDirection) -> bool {
        let old = self.zoom;
        let target = match direction {
            ZoomDirection::In => (old * ZOOM_STEP).min(MAX_ZOOM),
            ZoomDirection::Out => (old / ZOOM_STEP).max(MIN_ZOOM),
        };
        let changed = match direction {
            ZoomDirection::In => target > old,
            ZoomDirection::Out => target < old,
        };
        if !changed {
            return false;
        }

        let anchored = self.screen_to_world(screen);
        self.zoom = target;
        let projected = self.world_to_screen(anchored);
        self.pan_x += screen.x - projected.x;
        self.pan_y += screen.y - projected.y;
        true
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Rotate the image layer by signed quarter turns (positive = clockwise).
    pub fn rotate_by(&mut self, quarter_turns: i64) {
        self.rotation = self.rotation.rotated_by(quarter_turns);
    }

    /// Layer anchor offset for the current rotation and image size.
    #[must_use]
    pub fn anchor(&self) -> Point {
        self.rotation.anchor(self.image_width, self.image_height)
    }

    /// Screen-space corners of the image, clockwise from image origin.
    #[must_use]
    pub fn image_quad(&self) -> [Point; 4] {
        let (w, h) = (self.image_width, self.image_height);
        [
            self.world_to_screen(Point::new(0.0, 0.0)),
            self.world_to_screen(Point::new(w, 0.0)),
            self.world_to_screen(Point::new(w, h)),
            self.world_to_screen(Point::new(0.0, h)),
        ]
    }
}
