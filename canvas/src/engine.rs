//! The annotation engine: one authoritative state record plus the handlers
//! that mutate it.
//!
//! `EngineCore` owns the annotation list, viewport, tool, selection, class
//! vocabulary and keyboard listener. Pointer, wheel and key handlers run the
//! tool state machine and geometry editor and return [`Action`]s; the host
//! persists `AnnotationsChanged` snapshots, saves new classes, performs
//! navigation, and redraws on `RenderNeeded`. Nothing here blocks or performs
//! I/O.

use tracing::{debug, trace};

use crate::camera::{Camera, Point, ZoomDirection};
use crate::consts::{DEFAULT_LABEL, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, MIN_BOX_SIZE};
use crate::doc::{Annotation, AnnotationId, AnnotationList, ClassVocabulary, new_annotation_id};
use crate::hit::{HitPart, hit_test, resize_box};
use crate::input::{Button, InputState, Modifiers, ResizeTransform, Tool, UiState, WheelDelta};
use crate::keyboard::{KeyCommand, KeyDispatcher, KeyEvent};
use crate::nav::NavDirection;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The committed annotation list changed; carries the full list.
    AnnotationsChanged(Vec<Annotation>),
    SelectionChanged(Option<AnnotationId>),
    ToolChanged(Tool),
    /// A label entered the class vocabulary; carries the full vocabulary.
    ClassAdded { label: String, classes: Vec<String> },
    Navigate(NavDirection),
    HelpToggled(bool),
    SetCursor(&'static str),
    RenderNeeded,
}

/// Read-only projection of the selected annotation for the properties panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    pub id: AnnotationId,
    pub label: String,
    /// One-based position in the objects list.
    pub index: usize,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Core engine state. All logic that doesn't depend on a drawing surface.
pub struct EngineCore {
    pub doc: AnnotationList,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub classes: ClassVocabulary,
    pub keyboard: KeyDispatcher,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: AnnotationList::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            classes: ClassVocabulary::new(),
            keyboard: KeyDispatcher::new(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Seed the engine for a freshly loaded image.
    ///
    /// Replaces the annotation list, fits the image to the viewport, clears
    /// selection and any gesture, and installs the keyboard listener. The
    /// seeded list is not reported as a change.
    pub fn load_image(&mut self, image_width: f64, image_height: f64, annotations: Vec<Annotation>) -> Vec<Action> {
        self.doc.load_snapshot(annotations);
        self.camera
            .fit_to_window(image_width, image_height, self.viewport_width, self.viewport_height);
        self.input = InputState::Idle;
        self.ui.space_held = false;
        self.ui.selected_id = None;
        self.keyboard.install();
        vec![Action::SelectionChanged(None), Action::SetCursor(self.ui.tool.cursor()), Action::RenderNeeded]
    }

    /// Replace the class vocabulary with the project's copy.
    pub fn load_classes(&mut self, classes: Vec<String>) {
        self.classes.load(classes);
    }

    /// Leave the annotation view: stop reacting to keys and drop any gesture.
    pub fn unload(&mut self) {
        self.cancel_gesture();
        self.keyboard.remove();
    }

    /// Update the canvas size in screen pixels. Does not refit.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// Refit the current image into the viewport.
    pub fn fit_to_window(&mut self) -> Vec<Action> {
        let (w, h) = (self.camera.image_width, self.camera.image_height);
        self.camera
            .fit_to_window(w, h, self.viewport_width, self.viewport_height);
        vec![Action::RenderNeeded]
    }

    // --- Tool / view ---

    /// Set the active tool. Switching tools cancels an unfinished gesture.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if self.ui.tool == tool {
            return Vec::new();
        }
        self.cancel_gesture();
        self.ui.tool = tool;
        vec![Action::ToolChanged(tool), Action::SetCursor(self.ui.effective_tool().cursor()), Action::RenderNeeded]
    }

    /// Rotate the image layer by signed quarter turns (positive = clockwise).
    pub fn rotate_by(&mut self, quarter_turns: i64) -> Vec<Action> {
        self.cancel_gesture();
        self.camera.rotate_by(quarter_turns);
        vec![Action::RenderNeeded]
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.ui.show_grid = !self.ui.show_grid;
        vec![Action::RenderNeeded]
    }

    pub fn toggle_help(&mut self) -> Vec<Action> {
        self.ui.help_visible = !self.ui.help_visible;
        vec![Action::HelpToggled(self.ui.help_visible), Action::RenderNeeded]
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        match button {
            Button::Secondary => return Vec::new(),
            Button::Middle => return self.begin_pan(screen_pt),
            Button::Primary => {}
        }

        match self.ui.effective_tool() {
            Tool::Pan => self.begin_pan(screen_pt),
            Tool::DrawRect => self.begin_draw(screen_pt),
            Tool::Select => self.begin_select(screen_pt),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { draft } => {
                draft.width = world.x - draft.x;
                draft.height = world.y - draft.y;
                vec![Action::RenderNeeded]
            }
            InputState::MovingAnnotation { id, last_world, .. } => {
                let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                *last_world = world;
                if let Some(annotation) = self.doc.get_mut(id) {
                    annotation.x += dx;
                    annotation.y += dy;
                }
                vec![Action::RenderNeeded]
            }
            InputState::ResizingAnnotation { anchor, start_world, orig, transient, .. } => {
                let candidate = resize_box(orig, *anchor, world.x - start_world.x, world.y - start_world.y);
                if candidate.width < MIN_BOX_SIZE || candidate.height < MIN_BOX_SIZE {
                    trace!(width = candidate.width, height = candidate.height, "resize below minimum rejected");
                } else {
                    *transient = ResizeTransform {
                        x: candidate.x,
                        y: candidate.y,
                        scale_x: candidate.width / orig.width,
                        scale_y: candidate.height / orig.height,
                    };
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = self.on_pointer_move(screen_pt, modifiers);
        match std::mem::take(&mut self.input) {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } => {
                actions.push(Action::SetCursor(self.ui.effective_tool().cursor()));
            }
            InputState::Drawing { draft } => actions.extend(self.finish_draw(draft)),
            InputState::MovingAnnotation { id, origin, .. } => {
                let moved = self
                    .doc
                    .get(&id)
                    .is_some_and(|a| a.x != origin.x || a.y != origin.y);
                if moved {
                    actions.push(self.annotations_changed());
                }
            }
            InputState::ResizingAnnotation { id, orig, transient, .. } => {
                if transient != ResizeTransform::identity(&orig) {
                    let committed = transient.apply(&orig);
                    if let Some(annotation) = self.doc.get_mut(&id) {
                        *annotation = committed;
                        actions.push(self.annotations_changed());
                    }
                }
            }
        }
        actions.push(Action::RenderNeeded);
        dedupe_render(actions)
    }

    /// Zoom one step about the pointer.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        if self.camera.zoom_at(screen_pt, ZoomDirection::from_wheel(delta.dy)) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, event: &KeyEvent) -> Vec<Action> {
        match self.keyboard.key_down(event) {
            KeyCommand::None => Vec::new(),
            KeyCommand::SetTool(tool) => self.set_tool(tool),
            KeyCommand::Navigate(direction) => {
                self.cancel_gesture();
                vec![Action::Navigate(direction)]
            }
            KeyCommand::ToggleHelp => self.toggle_help(),
            KeyCommand::DeleteSelection => self.delete_selected(),
            KeyCommand::ClearSelection => {
                self.cancel_gesture();
                let mut actions: Vec<Action> = self.set_selection(None).into_iter().collect();
                actions.push(Action::RenderNeeded);
                actions
            }
            KeyCommand::HoldPan(held) => self.hold_pan(held),
        }
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) -> Vec<Action> {
        match self.keyboard.key_up(event) {
            KeyCommand::HoldPan(held) => self.hold_pan(held),
            _ => Vec::new(),
        }
    }

    // --- Selection & label editing ---

    /// Select an annotation from the objects list; switches to the select tool.
    pub fn select_from_list(&mut self, id: &str) -> Vec<Action> {
        if self.doc.get(id).is_none() {
            return Vec::new();
        }
        let mut actions = self.set_tool(Tool::Select);
        actions.extend(self.set_selection(Some(id.to_owned())));
        actions.push(Action::RenderNeeded);
        dedupe_render(actions)
    }

    /// Delete the selected annotation and clear the selection.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        self.delete_annotation(&id)
    }

    /// Delete an annotation by id, clearing the selection if it pointed at it.
    pub fn delete_annotation(&mut self, id: &str) -> Vec<Action> {
        self.cancel_gesture();
        if self.doc.remove(id).is_none() {
            return Vec::new();
        }
        let mut actions = vec![self.annotations_changed()];
        if self.ui.selected_id.as_deref() == Some(id) {
            actions.extend(self.set_selection(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace the selected annotation's label as the user types.
    pub fn set_label(&mut self, label: &str) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        let Some(annotation) = self.doc.get_mut(&id) else {
            return Vec::new();
        };
        if annotation.label == label {
            return Vec::new();
        }
        label.clone_into(&mut annotation.label);
        vec![self.annotations_changed(), Action::RenderNeeded]
    }

    /// The label field lost focus: add the label to the vocabulary if it is new.
    pub fn commit_label(&mut self) -> Vec<Action> {
        let Some(label) = self.selected_annotation().map(|a| a.label.clone()) else {
            return Vec::new();
        };
        if !self.classes.insert(&label) {
            return Vec::new();
        }
        debug!(%label, "class added to vocabulary");
        vec![Action::ClassAdded { label, classes: self.classes.as_slice().to_vec() }]
    }

    /// Append boxes proposed by auto-detection to the list.
    ///
    /// Proposals are normalized; an id that collides with an existing box is replaced.
    pub fn append_annotations(&mut self, proposals: Vec<Annotation>) -> Vec<Action> {
        if proposals.is_empty() {
            return Vec::new();
        }
        for proposal in proposals {
            let mut annotation = proposal.normalized();
            if annotation.id.is_empty() || self.doc.get(&annotation.id).is_some() {
                annotation.id = new_annotation_id();
            }
            self.doc.push(annotation);
        }
        vec![self.annotations_changed(), Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        self.doc.as_slice()
    }

    /// The currently selected annotation id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.ui.selected_id.as_deref()
    }

    #[must_use]
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selection().and_then(|id| self.doc.get(id))
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// Look up an annotation by id.
    #[must_use]
    pub fn object(&self, id: &str) -> Option<&Annotation> {
        self.doc.get(id)
    }

    /// The box being drawn, normalized for display.
    #[must_use]
    pub fn draft(&self) -> Option<Annotation> {
        match &self.input {
            InputState::Drawing { draft } => Some(draft.normalized()),
            _ => None,
        }
    }

    /// How an annotation should be displayed right now, including any
    /// in-progress resize.
    #[must_use]
    pub fn displayed(&self, annotation: &Annotation) -> Annotation {
        match &self.input {
            InputState::ResizingAnnotation { id, orig, transient, .. } if *id == annotation.id => transient.apply(orig),
            _ => annotation.clone(),
        }
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        self.classes.as_slice()
    }

    /// Properties panel projection of the selection.
    #[must_use]
    pub fn properties(&self) -> Option<Properties> {
        let annotation = self.selected_annotation()?;
        let index = self.doc.position(&annotation.id)? + 1;
        #[allow(clippy::cast_possible_truncation)]
        let round = |v: f64| v.round() as i64;
        Some(Properties {
            id: annotation.id.clone(),
            label: annotation.label.clone(),
            index,
            x: round(annotation.x),
            y: round(annotation.y),
            width: round(annotation.width),
            height: round(annotation.height),
        })
    }

    // --- Internals ---

    fn begin_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.input = InputState::Panning { last_screen: screen_pt };
        vec![Action::SetCursor("grabbing")]
    }

    fn begin_draw(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions: Vec<Action> = self.set_selection(None).into_iter().collect();
        let world = self.camera.screen_to_world(screen_pt);
        self.input = InputState::Drawing { draft: Annotation::draft(world, DEFAULT_LABEL) };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_select(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let hit = hit_test(world, &self.doc, &self.camera, self.selection());
        let mut actions = Vec::new();
        match hit {
            None => actions.extend(self.set_selection(None)),
            Some(hit) => {
                let Some(orig) = self.doc.get(&hit.id).cloned() else {
                    return Vec::new();
                };
                match hit.part {
                    HitPart::ResizeHandle(anchor) => {
                        if orig.width > 0.0 && orig.height > 0.0 {
                            self.input = InputState::ResizingAnnotation {
                                id: hit.id,
                                anchor,
                                start_world: world,
                                transient: ResizeTransform::identity(&orig),
                                orig,
                            };
                        }
                    }
                    HitPart::Body => {
                        actions.extend(self.set_selection(Some(hit.id.clone())));
                        self.input = InputState::MovingAnnotation {
                            id: hit.id,
                            last_world: world,
                            origin: Point::new(orig.x, orig.y),
                        };
                    }
                }
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn finish_draw(&mut self, draft: Annotation) -> Vec<Action> {
        if !draft.is_drawable() {
            debug!(width = draft.width, height = draft.height, "draft below minimum size discarded");
            return Vec::new();
        }
        let committed = draft.normalized();
        let id = committed.id.clone();
        self.doc.push(committed);
        let mut actions = vec![self.annotations_changed()];
        actions.extend(self.set_tool(Tool::Select));
        actions.extend(self.set_selection(Some(id)));
        actions
    }

    /// Abandon the current gesture without committing it.
    fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.input) {
            InputState::MovingAnnotation { id, origin, .. } => {
                if let Some(annotation) = self.doc.get_mut(&id) {
                    annotation.x = origin.x;
                    annotation.y = origin.y;
                }
            }
            InputState::Idle
            | InputState::Panning { .. }
            | InputState::Drawing { .. }
            | InputState::ResizingAnnotation { .. } => {}
        }
    }

    fn hold_pan(&mut self, held: bool) -> Vec<Action> {
        if self.ui.space_held == held {
            return Vec::new();
        }
        self.ui.space_held = held;
        vec![Action::SetCursor(self.ui.effective_tool().cursor())]
    }

    /// Change the selection, returning the notification if it actually changed.
    fn set_selection(&mut self, id: Option<AnnotationId>) -> Option<Action> {
        if self.ui.selected_id == id {
            return None;
        }
        self.ui.selected_id.clone_from(&id);
        Some(Action::SelectionChanged(id))
    }

    fn annotations_changed(&self) -> Action {
        Action::AnnotationsChanged(self.doc.to_vec())
    }
}

/// Keep at most one trailing `RenderNeeded`.
fn dedupe_render(actions: Vec<Action>) -> Vec<Action> {
    let mut out: Vec<Action> = actions
        .into_iter()
        .filter(|a| *a != Action::RenderNeeded)
        .collect();
    out.push(Action::RenderNeeded);
    out
}
