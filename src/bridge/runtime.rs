//! Two-phase startup: load the drawing engine, then the default font, then hand out the bridge.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::bridge::{CommitStats, Context, HostBridge};
use crate::engine::DynEngine;
use crate::foundation::error::{CanopyError, CanopyResult};
use crate::scene::SceneNode;
use crate::session::RenderTarget;

/// Where the default font comes from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// Font file contents.
    Bytes(Vec<u8>),
    /// Font file on disk.
    Path(PathBuf),
    /// No font files: paragraphs lay out to nothing.
    Empty,
}

impl FontSource {
    fn load(&self) -> CanopyResult<Option<Vec<u8>>> {
        match self {
            Self::Bytes(bytes) => Ok(Some(bytes.clone())),
            Self::Path(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read font file '{}'", path.display()))?;
                Ok(Some(bytes))
            }
            Self::Empty => Ok(None),
        }
    }
}

enum Phase {
    Unloaded,
    EngineLoaded(DynEngine),
    Ready(HostBridge<DynEngine>),
}

/// Startup state machine: `Unloaded -> EngineLoaded -> Ready`.
///
/// The bridge only becomes reachable once both phases completed, in order.
pub struct Runtime {
    phase: Phase,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Runtime with nothing loaded.
    pub fn new() -> Self {
        Self {
            phase: Phase::Unloaded,
        }
    }

    /// Phase 1: obtain the drawing engine.
    pub fn load_engine(
        &mut self,
        loader: impl FnOnce() -> CanopyResult<DynEngine>,
    ) -> CanopyResult<()> {
        if !matches!(self.phase, Phase::Unloaded) {
            return Err(CanopyError::structural("drawing engine is already loaded"));
        }
        let engine = loader()?;
        self.phase = Phase::EngineLoaded(engine);
        tracing::debug!("drawing engine loaded");
        Ok(())
    }

    /// Phase 2: load the default font and build the bridge.
    pub fn load_default_font(&mut self, font: FontSource) -> CanopyResult<()> {
        match &self.phase {
            Phase::Unloaded => {
                return Err(CanopyError::not_initialized(
                    "load the drawing engine before the default font",
                ));
            }
            Phase::Ready(_) => {
                return Err(CanopyError::structural("default font is already loaded"));
            }
            Phase::EngineLoaded(_) => {}
        }
        let bytes = font.load()?;

        let Phase::EngineLoaded(engine) = std::mem::replace(&mut self.phase, Phase::Unloaded)
        else {
            return Err(CanopyError::not_initialized("drawing engine is not loaded"));
        };
        let files: Vec<&[u8]> = bytes.as_deref().into_iter().collect();
        // A context build failure drops the engine; startup has to begin again.
        let ctx = Context::new(engine, &files)?;
        self.phase = Phase::Ready(HostBridge::new(ctx));
        tracing::debug!(font_files = files.len(), "default font loaded");
        Ok(())
    }

    /// Whether both phases completed.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// The bridge, once ready.
    pub fn bridge(&mut self) -> CanopyResult<&mut HostBridge<DynEngine>> {
        match &mut self.phase {
            Phase::Ready(bridge) => Ok(bridge),
            Phase::Unloaded => Err(CanopyError::not_initialized("drawing engine is not loaded")),
            Phase::EngineLoaded(_) => {
                Err(CanopyError::not_initialized("default font is not loaded"))
            }
        }
    }

    /// Take the bridge out of the runtime, once ready.
    pub fn into_bridge(self) -> CanopyResult<HostBridge<DynEngine>> {
        match self.phase {
            Phase::Ready(bridge) => Ok(bridge),
            Phase::Unloaded => Err(CanopyError::not_initialized("drawing engine is not loaded")),
            Phase::EngineLoaded(_) => {
                Err(CanopyError::not_initialized("default font is not loaded"))
            }
        }
    }

    /// [`crate::session::render`] behind the startup check.
    pub fn render(
        &mut self,
        tree: &[SceneNode],
        target: &mut RenderTarget,
        on_committed: Option<&mut dyn FnMut(&CommitStats)>,
    ) -> CanopyResult<CommitStats> {
        let bridge = self.bridge()?;
        crate::session::render(bridge, tree, target, on_committed)
    }
}

/// Run both startup phases and return the bridge.
pub fn init(
    loader: impl FnOnce() -> CanopyResult<DynEngine>,
    font: FontSource,
) -> CanopyResult<HostBridge<DynEngine>> {
    let mut rt = Runtime::new();
    rt.load_engine(loader)?;
    rt.load_default_font(font)?;
    rt.into_bridge()
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/runtime.rs"]
mod tests;
