//! Project image sequence used for previous/next navigation.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use serde::{Deserialize, Serialize};

/// An image entry of a project, as listed by the project endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub id: String,
    /// Path of the raster relative to the project's image directory.
    #[serde(default)]
    pub file_path: String,
    /// Original upload name.
    #[serde(default)]
    pub filename: String,
}

/// Direction of an image navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavDirection {
    Prev,
    Next,
}

impl NavDirection {
    fn offset(self) -> isize {
        match self {
            Self::Prev => -1,
            Self::Next => 1,
        }
    }
}

/// Ordered, read-only list of a project's images.
#[derive(Debug, Clone, Default)]
pub struct ImageSequence {
    images: Vec<ImageRef>,
}

impl ImageSequence {
    #[must_use]
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self { images }
    }

    #[must_use]
    pub fn position(&self, image_id: &str) -> Option<usize> {
        self.images.iter().position(|i| i.id == image_id)
    }

    #[must_use]
    pub fn get(&self, image_id: &str) -> Option<&ImageRef> {
        self.images.iter().find(|i| i.id == image_id)
    }

    /// The image one step away from `image_id`, if there is one.
    #[must_use]
    pub fn neighbor(&self, image_id: &str, direction: NavDirection) -> Option<&ImageRef> {
        let index = self.position(image_id)?;
        let target = index.checked_add_signed(direction.offset())?;
        self.images.get(target)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
