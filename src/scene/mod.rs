//! Declarative scene descriptions.
//!
//! A [`SceneNode`] tree is what an embedder (or the CLI) hands to [`crate::session::render`]: one
//! node per element, carrying the element's props and its children. Descriptions are plain data;
//! no element or native handle exists until a session reconciles them.

pub mod model;
mod source;

pub use model::SceneNode;
