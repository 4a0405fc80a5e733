//! Headless engine for the bounding-box annotation canvas.
//!
//! The crate owns everything about annotating one image that does not need a
//! drawing surface or a network: the viewport transform (pan, zoom, quarter
//! turn rotation), the tool state machine, the geometry editor for drawing,
//! moving and resizing boxes, selection and label editing, and the keyboard
//! dispatcher. Hosts feed it pointer, wheel and key events, draw the
//! [`render::Scene`] it projects, and act on the returned [`engine::Action`]s
//! (persisting annotations, saving classes, navigating images).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: state record and event handlers |
//! | [`doc`] | Annotation records, the ordered list, and the class vocabulary |
//! | [`camera`] | Viewport transform and coordinate conversions |
//! | [`input`] | Tools, pointer types, and the gesture state machine |
//! | [`hit`] | Hit-testing boxes and resize handles |
//! | [`keyboard`] | Shortcut dispatch with a text-input focus guard |
//! | [`nav`] | Prev/next image ordering |
//! | [`grid`] | Grid overlay geometry |
//! | [`render`] | Screen-space scene projection and shape registry |
//! | [`consts`] | Shared constants (zoom limits, minimum box size, colors) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod grid;
pub mod hit;
pub mod input;
pub mod keyboard;
pub mod nav;
pub mod render;
