//! Document model: annotations, the ordered annotation list, and the class vocabulary.
//!
//! Annotations are axis-aligned boxes stored in unrotated image space. The
//! list order is the display order of the objects panel and the draw order on
//! the canvas (later entries are drawn on top). Data flows into this layer from
//! the remote store as JSON and out of it as full-list snapshots for saving or
//! export.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::MIN_BOX_SIZE;

/// Unique identifier for an annotation within its image.
pub type AnnotationId = String;

/// Generate a fresh client-side annotation id.
#[must_use]
pub fn new_annotation_id() -> AnnotationId {
    Uuid::new_v4().simple().to_string()
}

/// A labelled rectangle in image space, as stored locally and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Left edge in image pixels.
    pub x: f64,
    /// Top edge in image pixels.
    pub y: f64,
    /// Width in image pixels. Non-negative once committed.
    pub width: f64,
    /// Height in image pixels. Non-negative once committed.
    pub height: f64,
    pub label: String,
}

impl Annotation {
    /// Open a zero-sized draft anchored at `at`.
    #[must_use]
    pub fn draft(at: Point, label: &str) -> Self {
        Self { id: new_annotation_id(), x: at.x, y: at.y, width: 0.0, height: 0.0, label: label.to_owned() }
    }

    /// Flip negative extents so the box has its origin at the top-left corner.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if out.width < 0.0 {
            out.x += out.width;
            out.width = -out.width;
        }
        if out.height < 0.0 {
            out.y += out.height;
            out.height = -out.height;
        }
        out
    }

    /// Whether a draft is large enough to be committed.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.width.abs() > MIN_BOX_SIZE && self.height.abs() > MIN_BOX_SIZE
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether an image-space point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let n = self.normalized();
        p.x >= n.x && p.x <= n.right() && p.y >= n.y && p.y <= n.bottom()
    }
}

/// Ordered in-memory list of annotations for the current image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationList {
    items: Vec<Annotation>,
}

impl AnnotationList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replace all annotations with a snapshot from the store.
    ///
    /// Boxes are normalized; an empty or repeated id gets a fresh one so
    /// every entry stays addressable.
    pub fn load_snapshot(&mut self, annotations: Vec<Annotation>) {
        self.items.clear();
        for annotation in annotations {
            let mut annotation = annotation.normalized();
            if annotation.id.is_empty() || self.get(&annotation.id).is_some() {
                let fresh = new_annotation_id();
                debug!(old = %annotation.id, new = %fresh, "reassigning duplicate annotation id");
                annotation.id = fresh;
            }
            self.items.push(annotation);
        }
    }

    /// Append an annotation. An existing entry with the same id is replaced in place.
    pub fn push(&mut self, annotation: Annotation) {
        if let Some(existing) = self.get_mut(&annotation.id) {
            *existing = annotation;
        } else {
            self.items.push(annotation);
        }
    }

    /// Append several annotations, preserving their order.
    pub fn extend(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        for annotation in annotations {
            self.push(annotation);
        }
    }

    /// Remove an annotation by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Annotation> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Annotation> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    /// Index of an annotation in display order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|a| a.id == id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Annotation> {
        self.items.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Project-wide set of label strings. Append-only from the canvas side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassVocabulary {
    classes: Vec<String>,
}

impl ClassVocabulary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the vocabulary with the store's copy, dropping blanks and duplicates.
    pub fn load(&mut self, classes: Vec<String>) {
        self.classes.clear();
        for class in classes {
            self.insert(&class);
        }
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.classes.iter().any(|c| c == label)
    }

    /// Add a label. Returns `true` if it was not already present and non-blank.
    pub fn insert(&mut self, label: &str) -> bool {
        if label.trim().is_empty() || self.contains(label) {
            return false;
        }
        self.classes.push(label.to_owned());
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Pretty-printed JSON export of an annotation list.
///
/// # Errors
///
/// Returns the serializer error if the list cannot be encoded (non-finite
/// coordinates are encoded as `null`, so in practice this does not fail).
pub fn export_json(annotations: &[Annotation]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(annotations)
}

/// File name used for a downloaded export.
#[must_use]
pub fn export_file_name(image_id: &str) -> String {
    format!("annotations_{image_id}.json")
}
