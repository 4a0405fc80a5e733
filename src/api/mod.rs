//! Remote store: the project backend the studio reads from and saves to.
//!
//! DESIGN
//! ======
//! [`RemoteStore`] is the seam between the session and the network. The
//! production implementation is [`HttpStore`]; tests substitute an in-memory
//! store. Every payload parser lives in [`types`] as a pure function so the
//! safe-fallback rules are testable without a server.

pub mod http;
pub mod types;

#[cfg(test)]
#[path = "mock_test.rs"]
pub(crate) mod mock;

use canvas::doc::Annotation;
use canvas::nav::ImageRef;

pub use http::HttpStore;
pub use types::{ApiError, Project};

/// Operations the annotation studio needs from the project backend.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// `GET /projects/{project_id}`.
    async fn load_project(&self, project_id: &str) -> Result<Project, ApiError>;

    /// `GET /projects/{project_id}/images/{image_id}/annotations`.
    async fn load_annotations(&self, project_id: &str, image_id: &str) -> Result<Vec<Annotation>, ApiError>;

    /// `POST /projects/{project_id}/images/{image_id}/annotations` with the full list.
    async fn save_annotations(&self, project_id: &str, image_id: &str, annotations: &[Annotation])
    -> Result<(), ApiError>;

    /// `GET /projects/{project_id}/classes`.
    async fn load_classes(&self, project_id: &str) -> Result<Vec<String>, ApiError>;

    /// `POST /projects/{project_id}/classes` with the full vocabulary.
    async fn save_classes(&self, project_id: &str, classes: &[String]) -> Result<(), ApiError>;

    /// `POST /projects/{project_id}/images/{image_id}/predict`: proposed boxes.
    async fn predict(&self, project_id: &str, image_id: &str) -> Result<Vec<Annotation>, ApiError>;

    /// Pixel dimensions of an image's raster.
    async fn image_size(&self, project_id: &str, image: &ImageRef) -> Result<(u32, u32), ApiError>;
}
