//! Canopy is a retained-mode scene graph bridge.
//!
//! A declarative tree of drawable elements is turned into imperative calls against a stateful 2D
//! drawing engine:
//!
//! - Start the engine with [`Runtime`] (or [`init`]) to obtain a [`HostBridge`]
//! - Describe a frame as a list of [`SceneNode`]s
//! - Commit it into a [`RenderTarget`] with [`render`], as often as the description changes
//!
//! Every native handle the engine hands out is owned by exactly one element and released exactly
//! once, after it is no longer reachable from the committed tree.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod bridge;
pub mod element;
pub mod engine;
pub mod scene;
pub mod session;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Affine, Point, Rgba8Premul, Rotation};
pub use crate::foundation::error::{CanopyError, CanopyResult};

pub use crate::bridge::root::RootContainer;
pub use crate::bridge::runtime::{FontSource, Runtime, init};
pub use crate::bridge::{CommitStats, Context, HostBridge, HostContext};
pub use crate::element::factory::create_element;
pub use crate::element::props::{
    EncodedImageProps, LayerProps, LineProps, Paint, ParagraphProps, Props, RegionProps, Rotate,
};
pub use crate::element::{ChildList, ElementId, ElementTag, Node, RenderCx, RenderParent};
pub use crate::engine::cpu::{CpuEngineOpts, VelloCpuEngine};
pub use crate::engine::recording::{EngineCall, HandleKind, RecordingEngine, Violation};
pub use crate::engine::{
    CanvasHandle, DrawingEngine, DynEngine, FontContextHandle, FrameRGBA, ImageHandle,
    PaintDesc, PaintHandle, PaintStyle, ParagraphHandle, ParagraphStyle, SurfaceHandle,
};
pub use crate::scene::SceneNode;
pub use crate::session::{RenderTarget, render};
