//! Persistent-mode driver over the host bridge.
//!
//! [`render`] compares the next scene description against the one committed last time on the same
//! [`RenderTarget`], position by position, and drives the bridge the way a persistent-mode
//! reconciler does: unchanged subtrees are reused, changed props clone the old instance, changed
//! child lists build a fresh one. The whole top-level list is then swapped in and committed.

mod render;

pub use render::{RenderTarget, render};
