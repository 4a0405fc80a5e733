#![allow(clippy::float_cmp)]

use std::sync::Arc;
use std::time::Duration;

use canvas::doc::Annotation;
use tokio::time::sleep;

use super::*;
use crate::api::mock::MockStore;

// =============================================================================
// Helpers
// =============================================================================

fn ann(id: &str, x: f64, y: f64, w: f64, h: f64, label: &str) -> Annotation {
    Annotation { id: id.to_owned(), x, y, width: w, height: h, label: label.to_owned() }
}

/// Project p1 with images i1..i3; i1 holds a1, every raster is 800x600 so
/// screen and image coordinates coincide in the default viewport.
fn seeded_store() -> Arc<MockStore> {
    let store = MockStore::with_project("p1", &["i1", "i2", "i3"]);
    {
        let mut annotations = store.annotations.lock().unwrap();
        annotations.insert("i1".into(), vec![ann("a1", 10.0, 10.0, 50.0, 40.0, "car")]);
        annotations.insert("i2".into(), Vec::new());
        annotations.insert("i3".into(), Vec::new());
        let mut sizes = store.sizes.lock().unwrap();
        for id in ["i1", "i2", "i3"] {
            sizes.insert(id.into(), (800, 600));
        }
    }
    *store.classes.lock().unwrap() = Some(vec!["car".into()]);
    Arc::new(store)
}

async fn open_session(store: &Arc<MockStore>, image_id: &str) -> AnnotationSession {
    let mut session = AnnotationSession::new(store.clone(), &StudioConfig::default());
    session.open("p1", image_id).await;
    session
}

async fn draw(session: &mut AnnotationSession, from: (f64, f64), to: (f64, f64)) {
    let inputs = [
        SessionInput::PointerDown { x: from.0, y: from.1, button: Button::Primary, modifiers: Modifiers::default() },
        SessionInput::PointerMove { x: to.0, y: to.1, modifiers: Modifiers::default() },
        SessionInput::PointerUp { x: to.0, y: to.1, button: Button::Primary, modifiers: Modifiers::default() },
    ];
    for input in inputs {
        session.apply(input).await.unwrap();
    }
}

fn key(key: &str) -> SessionInput {
    SessionInput::KeyDown { key: key.into(), target: KeyTarget::Canvas, modifiers: Modifiers::default() }
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Load cycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn open_seeds_engine_without_saving() {
    let store = seeded_store();
    let session = open_session(&store, "i1").await;

    assert_eq!(session.annotations(), &[ann("a1", 10.0, 10.0, 50.0, 40.0, "car")]);
    assert_eq!(session.engine().classes(), ["car"]);
    assert_eq!(session.images().len(), 3);
    assert_eq!(session.current_image().map(|i| i.id.as_str()), Some("i1"));
    assert!(session.engine().keyboard.is_installed());

    sleep(Duration::from_secs(5)).await;
    assert!(store.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn open_with_every_load_failing_falls_back_to_defaults() {
    let store = Arc::new(MockStore::default());
    let session = open_session(&store, "i9").await;

    assert!(session.annotations().is_empty());
    assert!(session.engine().classes().is_empty());
    assert!(session.images().is_empty());
    assert_eq!(session.current_image().map(|i| i.id.as_str()), Some("i9"));
    assert_eq!(session.engine().camera().zoom, 1.0);
}

// =============================================================================
// Autosave routing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn drawing_saves_full_list_after_window() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    draw(&mut session, (200.0, 200.0), (150.0, 140.0)).await;
    assert!(store.saved().is_empty());

    sleep(Duration::from_millis(1100)).await;
    settle().await;
    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].image_id, "i1");
    let list = &saved[0].annotations;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0], ann("a1", 10.0, 10.0, 50.0, 40.0, "car"));
    assert_eq!((list[1].x, list[1].y, list[1].width, list[1].height), (150.0, 140.0, 50.0, 60.0));
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_produce_one_save() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::Select { id: "a1".into() }).await.unwrap();
    for label in ["t", "tr", "tru", "truc", "truck"] {
        session.apply(SessionInput::SetLabel { label: label.into() }).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_millis(1100)).await;
    settle().await;

    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].annotations[0].label, "truck");
}

#[tokio::test(start_paused = true)]
async fn pan_tool_never_triggers_save() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::SetTool { tool: Tool::Pan }).await.unwrap();
    draw(&mut session, (20.0, 20.0), (300.0, 300.0)).await;
    sleep(Duration::from_secs(3)).await;

    assert!(store.saved().is_empty());
    assert!(session.engine().selection().is_none());
}

#[tokio::test(start_paused = true)]
async fn close_flushes_pending_save() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::Select { id: "a1".into() }).await.unwrap();
    session.apply(SessionInput::Delete).await.unwrap();
    let status = session.close().await;

    assert_eq!(status.completed, 1);
    assert!(store.saved()[0].annotations.is_empty());
}

// =============================================================================
// Classes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn committing_new_label_persists_vocabulary() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::Select { id: "a1".into() }).await.unwrap();
    session.apply(SessionInput::SetLabel { label: "bus".into() }).await.unwrap();
    session.apply(SessionInput::CommitLabel).await.unwrap();
    settle().await;

    assert_eq!(*store.saved_classes.lock().unwrap(), vec![vec!["car".to_owned(), "bus".to_owned()]]);
}

#[tokio::test(start_paused = true)]
async fn close_waits_for_slow_class_save() {
    let store = seeded_store();
    *store.class_save_delay.lock().unwrap() = Some(Duration::from_millis(50));
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::Select { id: "a1".into() }).await.unwrap();
    session.apply(SessionInput::SetLabel { label: "bus".into() }).await.unwrap();
    session.apply(SessionInput::CommitLabel).await.unwrap();
    let status = session.close().await;

    assert_eq!(status.completed, 1);
    assert_eq!(*store.saved_classes.lock().unwrap(), vec![vec!["car".to_owned(), "bus".to_owned()]]);
}

#[tokio::test(start_paused = true)]
async fn typing_in_label_field_does_not_switch_tool() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;
    session.apply(SessionInput::Select { id: "a1".into() }).await.unwrap();

    let typed = SessionInput::KeyDown { key: "r".into(), target: KeyTarget::TextInput, modifiers: Modifiers::default() };
    session.apply(typed).await.unwrap();
    assert_eq!(session.engine().tool(), Tool::Select);
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn arrow_keys_navigate_through_images() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    session.apply(key("ArrowRight")).await.unwrap();
    assert_eq!(session.current_image().map(|i| i.id.as_str()), Some("i2"));
    assert!(session.annotations().is_empty());

    session.apply(key("ArrowLeft")).await.unwrap();
    session.apply(key("ArrowLeft")).await.unwrap();
    assert_eq!(session.current_image().map(|i| i.id.as_str()), Some("i1"));
}

#[tokio::test(start_paused = true)]
async fn navigation_keeps_unsaved_edit_for_previous_image() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;

    draw(&mut session, (300.0, 300.0), (400.0, 400.0)).await;
    session.apply(key("ArrowRight")).await.unwrap();
    // Drawing switched to Select and the tool carries over; draw again.
    session.apply(key("r")).await.unwrap();
    draw(&mut session, (100.0, 100.0), (200.0, 200.0)).await;
    settle().await;

    // The i2 edit flushes the pending i1 snapshot at once.
    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].image_id, "i1");
    assert_eq!(saved[0].annotations.len(), 2);

    sleep(Duration::from_millis(1100)).await;
    settle().await;
    let images: Vec<String> = store.saved().into_iter().map(|s| s.image_id).collect();
    assert_eq!(images, ["i1", "i2"]);
}

#[tokio::test(start_paused = true)]
async fn tool_survives_navigation() {
    let store = seeded_store();
    let mut session = open_session(&store, "i1").await;
    session.apply(key("h")).await.unwrap();
    session.apply(key("ArrowRight")).await.unwrap();
    assert_eq!(session.engine().tool(), Tool::Pan);
}

// =============================================================================
// Predict and export
// =============================================================================

#[tokio::test(start_paused = true)]
async fn predict_appends_and_saves() {
    let store = seeded_store();
    store.predictions.lock().unwrap().push(ann("auto-1", 5.0, 5.0, 30.0, 30.0, "person"));
    let mut session = open_session(&store, "i1").await;

    session.apply(SessionInput::Predict).await.unwrap();
    let ids: Vec<&str> = session.annotations().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a1", "auto-1"]);

    sleep(Duration::from_millis(1100)).await;
    settle().await;
    assert_eq!(store.saved()[0].annotations.len(), 2);
}

#[tokio::test]
async fn predict_without_image_errors() {
    let store = seeded_store();
    let mut session = AnnotationSession::new(store, &StudioConfig::default());
    assert!(matches!(session.predict().await, Err(SessionError::NoImage)));
}

#[tokio::test]
async fn export_writes_pretty_json_named_after_image() {
    let store = seeded_store();
    let session = open_session(&store, "i1").await;
    let dir = std::env::temp_dir().join(format!("annostudio-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = session.export_to(&dir).await.unwrap();
    assert!(path.ends_with("annotations_i1.json"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    let reloaded: Vec<Annotation> = serde_json::from_str(&text).unwrap();
    assert_eq!(reloaded, session.annotations());

    std::fs::remove_dir_all(&dir).unwrap();
}

// =============================================================================
// Replay input format
// =============================================================================

#[test]
fn session_input_parses_script_lines() {
    let down: SessionInput = serde_json::from_str(r#"{"type": "pointer_down", "x": 1, "y": 2}"#).unwrap();
    assert_eq!(
        down,
        SessionInput::PointerDown { x: 1.0, y: 2.0, button: Button::Primary, modifiers: Modifiers::default() }
    );

    let typed: SessionInput =
        serde_json::from_str(r#"{"type": "key_down", "key": "r", "target": "text_input"}"#).unwrap();
    assert!(matches!(typed, SessionInput::KeyDown { target: KeyTarget::TextInput, .. }));

    let tool: SessionInput = serde_json::from_str(r#"{"type": "set_tool", "tool": "draw_rect"}"#).unwrap();
    assert_eq!(tool, SessionInput::SetTool { tool: Tool::DrawRect });

    assert_eq!(serde_json::from_str::<SessionInput>(r#"{"type": "delete"}"#).unwrap(), SessionInput::Delete);
    assert!(serde_json::from_str::<SessionInput>(r#"{"type": "explode"}"#).is_err());
}
