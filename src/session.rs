//! Annotation session: one project, one image at a time.
//!
//! DESIGN
//! ======
//! The session owns the engine and routes what the engine asks for:
//! annotation snapshots go to the autosave worker, new classes are persisted
//! in the background, and navigation runs a fresh load cycle. Everything the
//! host still needs to act on (render, cursor, selection, help) is returned.
//!
//! LOAD CYCLE
//! ==========
//! Project, classes, annotations and raster size are fetched on open. Each
//! failure is logged and that piece falls back to its empty default; a
//! session never fails to open. The seeded list is not a change and is never
//! autosaved.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::camera::Point;
use canvas::doc::{Annotation, export_file_name, export_json};
use canvas::engine::{Action, EngineCore};
use canvas::input::{Button, Modifiers, Tool, WheelDelta};
use canvas::keyboard::{KeyEvent, KeyTarget};
use canvas::nav::{ImageRef, ImageSequence, NavDirection};
use canvas::render::{Scene, project};
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, RemoteStore};
use crate::autosave::{AutosaveHandle, SaveRequest, SaveStatus, spawn_autosave_worker};
use crate::config::StudioConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no image is open")]
    NoImage,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("export serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A host input, as recorded in replay scripts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionInput {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        x: f64,
        y: f64,
        dy: f64,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        target: KeyTarget,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        target: KeyTarget,
    },
    Rotate {
        quarter_turns: i64,
    },
    SetTool {
        tool: Tool,
    },
    Select {
        id: String,
    },
    Delete,
    SetLabel {
        label: String,
    },
    CommitLabel,
    ToggleGrid,
    Fit,
    Predict,
    /// Let wall-clock time pass (autosave windows elapse).
    Wait {
        ms: u64,
    },
}

pub struct AnnotationSession {
    engine: EngineCore,
    store: Arc<dyn RemoteStore>,
    autosave: AutosaveHandle,
    project_id: String,
    images: ImageSequence,
    current: Option<ImageRef>,
    /// Background class-vocabulary writes, drained on close.
    class_writes: JoinSet<()>,
}

impl AnnotationSession {
    /// Create a session and its autosave worker. Must run inside a tokio runtime.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, config: &StudioConfig) -> Self {
        let mut engine = EngineCore::new();
        engine.set_viewport(config.viewport_width, config.viewport_height);
        let autosave = spawn_autosave_worker(Arc::clone(&store), config.autosave_window());
        Self {
            engine,
            store,
            autosave,
            project_id: String::new(),
            images: ImageSequence::default(),
            current: None,
            class_writes: JoinSet::new(),
        }
    }

    /// Load an image of a project into the engine.
    pub async fn open(&mut self, project_id: &str, image_id: &str) -> Vec<Action> {
        if self.project_id != project_id || self.images.is_empty() {
            self.images = match self.store.load_project(project_id).await {
                Ok(project) => ImageSequence::new(project.images),
                Err(e) => {
                    error!(error = %e, %project_id, "project load failed");
                    ImageSequence::default()
                }
            };
            let classes = match self.store.load_classes(project_id).await {
                Ok(classes) => classes,
                Err(e) => {
                    error!(error = %e, %project_id, "class load failed");
                    Vec::new()
                }
            };
            self.engine.load_classes(classes);
            project_id.clone_into(&mut self.project_id);
        }

        let image = self.images.get(image_id).cloned().unwrap_or_else(|| {
            warn!(%project_id, %image_id, "image not listed in project");
            ImageRef { id: image_id.to_owned(), ..ImageRef::default() }
        });

        let annotations = match self.store.load_annotations(project_id, image_id).await {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, %project_id, %image_id, "annotation load failed");
                Vec::new()
            }
        };
        let (width, height) = match self.store.image_size(project_id, &image).await {
            Ok(size) => size,
            Err(e) => {
                error!(error = %e, %project_id, %image_id, "image size unavailable");
                (0, 0)
            }
        };

        info!(%project_id, %image_id, count = annotations.len(), width, height, "image opened");
        self.current = Some(image);
        self.engine
            .load_image(f64::from(width), f64::from(height), annotations)
    }

    /// Route engine actions: persist what needs persisting, navigate, and
    /// return the rest for the host.
    pub async fn handle_actions(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                Action::AnnotationsChanged(annotations) => self.schedule_save(annotations),
                Action::ClassAdded { label, classes } => self.persist_classes(&label, classes),
                Action::Navigate(direction) => out.extend(self.navigate(direction).await),
                other => out.push(other),
            }
        }
        out
    }

    /// Open the previous or next image, if there is one.
    pub async fn navigate(&mut self, direction: NavDirection) -> Vec<Action> {
        let Some(current) = &self.current else {
            return Vec::new();
        };
        let Some(next) = self.images.neighbor(&current.id, direction) else {
            debug!(image_id = %current.id, ?direction, "no image in that direction");
            return Vec::new();
        };
        let next_id = next.id.clone();
        let project_id = self.project_id.clone();
        self.open(&project_id, &next_id).await
    }

    /// Apply one host input and route the resulting actions.
    pub async fn apply(&mut self, input: SessionInput) -> Result<Vec<Action>, SessionError> {
        let actions = match input {
            SessionInput::PointerDown { x, y, button, modifiers } => {
                self.engine.on_pointer_down(Point::new(x, y), button, modifiers)
            }
            SessionInput::PointerMove { x, y, modifiers } => self.engine.on_pointer_move(Point::new(x, y), modifiers),
            SessionInput::PointerUp { x, y, button, modifiers } => {
                self.engine.on_pointer_up(Point::new(x, y), button, modifiers)
            }
            SessionInput::Wheel { x, y, dy } => {
                self.engine
                    .on_wheel(Point::new(x, y), WheelDelta { dx: 0.0, dy }, Modifiers::default())
            }
            SessionInput::KeyDown { key, target, modifiers } => {
                self.engine.on_key_down(&KeyEvent { key, target, modifiers })
            }
            SessionInput::KeyUp { key, target } => {
                self.engine
                    .on_key_up(&KeyEvent { key, target, modifiers: Modifiers::default() })
            }
            SessionInput::Rotate { quarter_turns } => self.engine.rotate_by(quarter_turns),
            SessionInput::SetTool { tool } => self.engine.set_tool(tool),
            SessionInput::Select { id } => self.engine.select_from_list(&id),
            SessionInput::Delete => self.engine.delete_selected(),
            SessionInput::SetLabel { label } => self.engine.set_label(&label),
            SessionInput::CommitLabel => self.engine.commit_label(),
            SessionInput::ToggleGrid => self.engine.toggle_grid(),
            SessionInput::Fit => self.engine.fit_to_window(),
            SessionInput::Predict => return self.predict().await,
            SessionInput::Wait { ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
                Vec::new()
            }
        };
        Ok(self.handle_actions(actions).await)
    }

    /// Ask the backend for proposed boxes and append them to the list.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoImage`] without an open image, or the
    /// backend error; the list is unchanged on error.
    pub async fn predict(&mut self) -> Result<Vec<Action>, SessionError> {
        let image_id = self.current_image_id()?;
        let proposals = self.store.predict(&self.project_id, &image_id).await?;
        info!(project_id = %self.project_id, %image_id, count = proposals.len(), "predictions received");
        let actions = self.engine.append_annotations(proposals);
        Ok(self.handle_actions(actions).await)
    }

    /// Write the current list as pretty JSON to `dir/annotations_{image_id}.json`.
    ///
    /// # Errors
    ///
    /// Returns an error without an open image or if the file cannot be written.
    pub async fn export_to(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let image_id = self.current_image_id()?;
        let path = dir.join(export_file_name(&image_id));
        let json = export_json(self.engine.annotations())?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), count = self.engine.annotations().len(), "annotations exported");
        Ok(path)
    }

    /// Leave the annotation view: remove the key listener, flush autosave and
    /// wait for outstanding class writes.
    pub async fn close(mut self) -> SaveStatus {
        self.engine.unload();
        let status = self.autosave.shutdown().await;
        while let Some(joined) = self.class_writes.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "class save task ended abnormally");
            }
        }
        status
    }

    // --- Queries ---

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        self.engine.annotations()
    }

    #[must_use]
    pub fn current_image(&self) -> Option<&ImageRef> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn images(&self) -> &ImageSequence {
        &self.images
    }

    /// True while an autosave write is in flight.
    #[must_use]
    pub fn saving(&self) -> bool {
        self.autosave.is_saving()
    }

    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status().borrow().clone()
    }

    #[must_use]
    pub fn scene(&self) -> Scene {
        project(&self.engine)
    }

    // --- Internals ---

    fn current_image_id(&self) -> Result<String, SessionError> {
        self.current
            .as_ref()
            .map(|i| i.id.clone())
            .ok_or(SessionError::NoImage)
    }

    fn schedule_save(&self, annotations: Vec<Annotation>) {
        let Some(image) = &self.current else {
            warn!("annotation change with no open image; not saved");
            return;
        };
        self.autosave.schedule(SaveRequest {
            project_id: self.project_id.clone(),
            image_id: image.id.clone(),
            annotations,
        });
    }

    fn persist_classes(&mut self, label: &str, classes: Vec<String>) {
        while let Some(joined) = self.class_writes.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "class save task ended abnormally");
            }
        }
        info!(project_id = %self.project_id, %label, "persisting new class");
        let store = Arc::clone(&self.store);
        let project_id = self.project_id.clone();
        self.class_writes.spawn(async move {
            if let Err(e) = store.save_classes(&project_id, &classes).await {
                error!(error = %e, %project_id, "class save failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
