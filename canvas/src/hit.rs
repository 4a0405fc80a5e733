#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Annotation, AnnotationId, AnnotationList};

/// Which part of an annotation was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles, in unrotated image orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: AnnotationId,
    pub part: HitPart,
}

/// Image-space centers of the eight resize handles of a box.
#[must_use]
pub fn handle_points(rect: &Annotation) -> [(ResizeAnchor, Point); 8] {
    let r = rect.normalized();
    let cx = r.x + r.width / 2.0;
    let cy = r.y + r.height / 2.0;
    [
        (ResizeAnchor::N, Point::new(cx, r.y)),
        (ResizeAnchor::Ne, Point::new(r.right(), r.y)),
        (ResizeAnchor::E, Point::new(r.right(), cy)),
        (ResizeAnchor::Se, Point::new(r.right(), r.bottom())),
        (ResizeAnchor::S, Point::new(cx, r.bottom())),
        (ResizeAnchor::Sw, Point::new(r.x, r.bottom())),
        (ResizeAnchor::W, Point::new(r.x, cy)),
        (ResizeAnchor::Nw, Point::new(r.x, r.y)),
    ]
}

/// Test which annotation (if any) is under `world_pt`.
///
/// Handles of the selected annotation win over any body. Bodies are checked
/// topmost first, so the last annotation in the list takes precedence.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &AnnotationList, camera: &Camera, selected_id: Option<&str>) -> Option<Hit> {
    if let Some(selected) = selected_id.and_then(|id| doc.get(id)) {
        let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
        for (anchor, center) in handle_points(selected) {
            let dx = world_pt.x - center.x;
            let dy = world_pt.y - center.y;
            if dx * dx + dy * dy <= radius * radius {
                return Some(Hit { id: selected.id.clone(), part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    doc.iter()
        .rev()
        .find(|a| a.contains(world_pt))
        .map(|a| Hit { id: a.id.clone(), part: HitPart::Body })
}

/// Candidate box after dragging `anchor` by `(dx, dy)` image pixels.
///
/// The result may have small or negative extents; the caller decides whether
/// to accept it.
#[must_use]
pub fn resize_box(orig: &Annotation, anchor: ResizeAnchor, dx: f64, dy: f64) -> Annotation {
    let mut out = orig.clone();
    if anchor.moves_left() {
        out.x = orig.x + dx;
        out.width = orig.width - dx;
    } else if anchor.moves_right() {
        out.width = orig.width + dx;
    }
    if anchor.moves_top() {
        out.y = orig.y + dy;
        out.height = orig.height - dy;
    } else if anchor.moves_bottom() {
        out.height = orig.height + dy;
    }
    out
}
