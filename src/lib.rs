//! Annotation studio host: connects the headless [`canvas`] engine to the
//! remote project store.
//!
//! DESIGN
//! ======
//! The engine is synchronous and owns all interaction state. This crate runs
//! it inside a tokio runtime: [`session::AnnotationSession`] feeds it events,
//! loads projects/images/classes through [`api::RemoteStore`], and hands every
//! annotation snapshot to the [`autosave`] worker, which debounces and writes
//! in the background so interaction never waits on the network.

pub mod api;
pub mod autosave;
pub mod config;
pub mod session;
