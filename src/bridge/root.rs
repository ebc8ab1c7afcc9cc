//! Root container: the mount point a committed tree renders into.

use crate::element::resource::Owned;
use crate::element::ChildList;
use crate::engine::{DrawingEngine, SurfaceHandle};
use crate::foundation::error::{CanopyError, CanopyResult};

/// The mount point of a committed tree.
///
/// Presents itself to its children as a layer backed by the root surface, so its direct children
/// are regions.
pub struct RootContainer {
    surface: Owned<SurfaceHandle>,
    width: u32,
    height: u32,
    children: ChildList,
    commits: u64,
}

impl RootContainer {
    pub(crate) fn new(
        engine: &mut dyn DrawingEngine,
        width: u32,
        height: u32,
    ) -> CanopyResult<Self> {
        let mut surface = Owned::empty();
        surface.recreate(engine, |e| e.make_surface(width, height))?;
        Ok(Self {
            surface,
            width,
            height,
            children: ChildList::new(),
            commits: 0,
        })
    }

    /// Root surface; fails once the root was released.
    pub fn surface(&self) -> CanopyResult<SurfaceHandle> {
        self.surface
            .get()
            .ok_or_else(|| CanopyError::released("root container"))
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Committed children.
    pub fn children(&self) -> &ChildList {
        &self.children
    }

    /// Completed commits.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub(crate) fn swap_children(&mut self, incoming: ChildList) -> ChildList {
        std::mem::replace(&mut self.children, incoming)
    }

    pub(crate) fn bump_commits(&mut self) -> u64 {
        self.commits += 1;
        self.commits
    }

    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) {
        let children = std::mem::take(&mut self.children);
        for child in &children {
            child.release(engine);
        }
        self.surface.release(engine);
    }
}
