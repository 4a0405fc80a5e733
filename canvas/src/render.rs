//! Scene projection: a pure function from engine state to screen geometry.
//!
//! The drawing surface never owns state. Each frame the host calls
//! [`project`] and draws the returned [`Scene`]. The [`ShapeRegistry`] maps
//! every annotation id to its current screen-space quad and is what resize
//! handles and overlays are positioned from.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use crate::camera::{Camera, Point};
use crate::consts::{BOX_COLOR, DRAFT_COLOR, GRID_COLOR, GRID_SPACING};
use crate::doc::{Annotation, AnnotationId};
use crate::engine::EngineCore;
use crate::grid::grid_lines;
use crate::hit::ResizeAnchor;
use crate::keyboard::{SHORTCUTS, ShortcutRow};

/// Four screen-space corners, clockwise from the box's image-space top-left.
pub type Quad = [Point; 4];

/// Id → screen-space geometry, rebuilt every frame.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    quads: HashMap<AnnotationId, Quad>,
}

impl ShapeRegistry {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Quad> {
        self.quads.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

/// A box as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxView {
    pub id: AnnotationId,
    pub label: String,
    pub quad: Quad,
    pub color: &'static str,
    pub selected: bool,
}

/// A grid line in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineView {
    pub from: Point,
    pub to: Point,
    pub color: &'static str,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub image_quad: Quad,
    pub boxes: Vec<BoxView>,
    pub draft: Option<BoxView>,
    pub handles: Vec<(ResizeAnchor, Point)>,
    pub grid: Vec<LineView>,
    pub registry: ShapeRegistry,
    pub zoom_label: String,
    pub help_visible: bool,
    /// Rows of the shortcut overlay; empty while help is hidden.
    pub help_rows: &'static [ShortcutRow],
}

/// Project the engine state into screen space.
#[must_use]
pub fn project(core: &EngineCore) -> Scene {
    let camera = &core.camera;
    let selected = core.selection();

    let mut registry = ShapeRegistry::default();
    let mut boxes = Vec::with_capacity(core.annotations().len());
    for annotation in core.annotations() {
        let shown = core.displayed(annotation);
        let quad = quad_of(camera, &shown);
        registry.quads.insert(shown.id.clone(), quad);
        boxes.push(BoxView {
            selected: selected == Some(shown.id.as_str()),
            id: shown.id,
            label: shown.label,
            quad,
            color: BOX_COLOR,
        });
    }

    let handles = selected
        .and_then(|id| registry.get(id))
        .map(quad_handles)
        .unwrap_or_default();

    let draft = core.draft().map(|d| BoxView {
        quad: quad_of(camera, &d),
        id: d.id,
        label: d.label,
        color: DRAFT_COLOR,
        selected: false,
    });

    let grid = if core.ui.show_grid {
        grid_lines(camera.image_width, camera.image_height, GRID_SPACING)
            .into_iter()
            .map(|s| LineView { from: camera.world_to_screen(s.from), to: camera.world_to_screen(s.to), color: GRID_COLOR })
            .collect()
    } else {
        Vec::new()
    };

    Scene {
        image_quad: camera.image_quad(),
        boxes,
        draft,
        handles,
        grid,
        registry,
        zoom_label: format!("Scale: {:.2}x", camera.zoom),
        help_visible: core.ui.help_visible,
        help_rows: if core.ui.help_visible { SHORTCUTS } else { &[] },
    }
}

/// Handle positions on a registered quad: corners plus edge midpoints.
fn quad_handles(quad: &Quad) -> Vec<(ResizeAnchor, Point)> {
    let [nw, ne, se, sw] = *quad;
    let mid = |a: Point, b: Point| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    vec![
        (ResizeAnchor::N, mid(nw, ne)),
        (ResizeAnchor::Ne, ne),
        (ResizeAnchor::E, mid(ne, se)),
        (ResizeAnchor::Se, se),
        (ResizeAnchor::S, mid(se, sw)),
        (ResizeAnchor::Sw, sw),
        (ResizeAnchor::W, mid(sw, nw)),
        (ResizeAnchor::Nw, nw),
    ]
}

fn quad_of(camera: &Camera, a: &Annotation) -> Quad {
    let r = a.normalized();
    [
        camera.world_to_screen(Point::new(r.x, r.y)),
        camera.world_to_screen(Point::new(r.right(), r.y)),
        camera.world_to_screen(Point::new(r.right(), r.bottom())),
        camera.world_to_screen(Point::new(r.x, r.bottom())),
    ]
}
