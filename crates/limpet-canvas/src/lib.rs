#![forbid(unsafe_code)]

//! The limpet canvas: a pannable, auto-expanding frame whose coordinates never go negative.
//!
//! All state is owned by one thread; every update is synchronous. Geometry changes enter
//! through [`Canvas::apply`] or a [`DragGesture`].

mod autoscroll;
mod canvas;
mod drag;
mod error;
mod event;
mod layout;
mod viewport;

pub use autoscroll::AutoScroll;
pub use canvas::Canvas;
pub use drag::{DragGesture, DragTarget};
pub use error::{Error, Result};
pub use event::{CanvasEvent, Update};
pub use layout::LayoutEngine;
pub use viewport::Viewport;
