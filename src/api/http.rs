//! HTTP implementation of [`RemoteStore`] over `reqwest`.

use std::io::Cursor;
use std::time::Duration;

use canvas::doc::Annotation;
use canvas::nav::ImageRef;
use serde::Serialize;

use super::RemoteStore;
use super::types::{ApiError, Project, parse_annotations, parse_classes, parse_project};
use crate::config::HttpTimeouts;

pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Where the backend serves an image's raster.
    #[must_use]
    pub fn image_url(&self, project_id: &str, image: &ImageRef) -> String {
        self.url(&format!("/static/{project_id}/images/{}", image.file_path))
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_body(response).await
    }

    async fn post<B>(&self, url: &str, body: Option<&B>) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), body: text });
    }
    Ok(text)
}

/// Read width and height from an encoded raster without decoding pixels.
///
/// # Errors
///
/// Returns [`ApiError::Image`] if the format is unknown or the header is corrupt.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), ApiError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ApiError::Image(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ApiError::Image(e.to_string()))
}

#[derive(Serialize)]
struct ClassesBody<'a> {
    classes: &'a [String],
}

#[async_trait::async_trait]
impl RemoteStore for HttpStore {
    async fn load_project(&self, project_id: &str) -> Result<Project, ApiError> {
        let text = self.get_text(&self.url(&format!("/projects/{project_id}"))).await?;
        let mut project = parse_project(&text)?;
        if project.id.is_empty() {
            project_id.clone_into(&mut project.id);
        }
        Ok(project)
    }

    async fn load_annotations(&self, project_id: &str, image_id: &str) -> Result<Vec<Annotation>, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/images/{image_id}/annotations"));
        parse_annotations(&self.get_text(&url).await?)
    }

    async fn save_annotations(
        &self,
        project_id: &str,
        image_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/projects/{project_id}/images/{image_id}/annotations"));
        self.post(&url, Some(annotations)).await?;
        Ok(())
    }

    async fn load_classes(&self, project_id: &str) -> Result<Vec<String>, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/classes"));
        parse_classes(&self.get_text(&url).await?)
    }

    async fn save_classes(&self, project_id: &str, classes: &[String]) -> Result<(), ApiError> {
        let url = self.url(&format!("/projects/{project_id}/classes"));
        self.post(&url, Some(&ClassesBody { classes })).await?;
        Ok(())
    }

    async fn predict(&self, project_id: &str, image_id: &str) -> Result<Vec<Annotation>, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/images/{image_id}/predict"));
        parse_annotations(&self.post::<()>(&url, None).await?)
    }

    async fn image_size(&self, project_id: &str, image: &ImageRef) -> Result<(u32, u32), ApiError> {
        let response = self
            .http
            .get(self.image_url(project_id, image))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: String::new() });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode_dimensions(&bytes)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
