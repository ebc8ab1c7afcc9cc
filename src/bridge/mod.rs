//! Host bridge: the lifecycle surface a persistent-mode tree-diffing engine drives.
//!
//! The diffing engine creates elements, attaches children, clones elements whose props changed,
//! swaps whole child sets and asks for a commit. Every callback here is expressed in terms of
//! the element model; the bridge itself only owns the engine and the font contexts.

pub mod root;
pub mod runtime;

use crate::bridge::root::RootContainer;
use crate::element::factory::{create_element, create_from_tag};
use crate::element::props::Props;
use crate::element::resource::Owned;
use crate::element::{ChildList, ElementTag, Node, RenderCx, RenderParent};
use crate::engine::{DrawingEngine, FontContextHandle, FrameRGBA};
use crate::foundation::error::{CanopyError, CanopyResult};

/// Initialized engine plus the default font context.
///
/// Constructing one is the prerequisite for a [`HostBridge`].
pub struct Context<E: DrawingEngine> {
    engine: E,
    default_fonts: Owned<FontContextHandle>,
}

impl<E: DrawingEngine> Context<E> {
    /// Context whose default font context is built from `font_files` (may be empty).
    pub fn new(mut engine: E, font_files: &[&[u8]]) -> CanopyResult<Self> {
        let mut default_fonts = Owned::empty();
        default_fonts.recreate(&mut engine, |e| e.make_font_context(font_files))?;
        Ok(Self {
            engine,
            default_fonts,
        })
    }

    /// Context without a default font context; paragraphs need their own.
    pub fn without_fonts(engine: E) -> Self {
        Self {
            engine,
            default_fonts: Owned::empty(),
        }
    }
}

/// Context handed down the tree while instances are created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostContext {
    /// Font context assigned to paragraphs that do not name one.
    pub fonts: Option<FontContextHandle>,
}

/// Per-commit statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// 1-based commit number on the target.
    pub commit: u64,
    /// Elements rendered by the walk.
    pub rendered: usize,
    /// Elements created from scratch for this commit.
    pub created: usize,
    /// Elements cloned from a previous instance.
    pub cloned: usize,
    /// Elements carried over unchanged.
    pub reused: usize,
}

/// Persistent-mode host over a drawing engine.
pub struct HostBridge<E: DrawingEngine> {
    engine: E,
    default_fonts: Owned<FontContextHandle>,
    extra_fonts: Vec<Owned<FontContextHandle>>,
}

impl<E: DrawingEngine> HostBridge<E> {
    /// Bridge over an initialized context.
    pub fn new(ctx: Context<E>) -> Self {
        Self {
            engine: ctx.engine,
            default_fonts: ctx.default_fonts,
            extra_fonts: Vec::new(),
        }
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Default font context, if one was loaded.
    pub fn default_fonts(&self) -> Option<FontContextHandle> {
        self.default_fonts.get()
    }

    /// Build an additional font context owned by the bridge.
    pub fn register_fonts(&mut self, files: &[Vec<u8>]) -> CanopyResult<FontContextHandle> {
        let files = files.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let mut owned = Owned::empty();
        let handle = owned.recreate(&mut self.engine, |e| e.make_font_context(&files))?;
        self.extra_fonts.push(owned);
        Ok(handle)
    }

    /// Root container backed by a fresh `width x height` surface.
    pub fn make_root(&mut self, width: u32, height: u32) -> CanopyResult<RootContainer> {
        RootContainer::new(&mut self.engine, width, height)
    }

    /// Release every element under `root` and the root surface.
    pub fn release_root(&mut self, mut root: RootContainer) {
        root.release(&mut self.engine);
    }

    /// Read back the root surface.
    pub fn read_pixels(&mut self, root: &RootContainer) -> CanopyResult<FrameRGBA> {
        let surface = root.surface()?;
        self.engine.read_pixels(surface)
    }

    /// Host context at the root.
    pub fn root_context(&self, _root: &RootContainer) -> HostContext {
        HostContext {
            fonts: self.default_fonts.get(),
        }
    }

    /// Host context for the children of a `tag` instance. Pass-through.
    pub fn child_context(&self, parent: &HostContext, _tag: ElementTag) -> HostContext {
        *parent
    }

    /// Whether `tag` carries its text as a prop instead of as text children.
    pub fn should_set_text_content(&self, tag: ElementTag) -> bool {
        tag == ElementTag::Paragraph
    }

    /// Create an element. Paragraphs without a font context get the host context's.
    pub fn create_instance(
        &self,
        tag: &str,
        mut props: Props,
        host: &HostContext,
    ) -> CanopyResult<Node> {
        if let Props::Paragraph(p) = &mut props {
            p.font_context = p.font_context.or(host.fonts);
        }
        create_element(tag, props)
    }

    /// Bare text is never an element.
    pub fn create_text_instance(&self, text: &str, _host: &HostContext) -> CanopyResult<Node> {
        Err(CanopyError::structural(format!(
            "text \"{text}\" must be wrapped in a paragraph element"
        )))
    }

    /// Append `child` to a container that is still being built.
    pub fn append_initial_child(&self, parent: &Node, child: Node) -> CanopyResult<()> {
        parent.append_child(child)
    }

    /// Build a replacement for `old` with `props`.
    ///
    /// With `keep_children` the replacement shares `old`'s child list (no copy); otherwise it
    /// starts empty. `old` is left untouched.
    pub fn clone_instance(
        &self,
        old: &Node,
        mut props: Props,
        keep_children: bool,
    ) -> CanopyResult<Node> {
        old.ensure_live("clone")?;
        if let Props::Paragraph(p) = &mut props
            && p.font_context.is_none()
            && let Props::Paragraph(prev) = old.props()?
        {
            p.font_context = prev.font_context;
        }
        let node = create_from_tag(old.tag(), props)?;
        if keep_children && node.tag().is_container() {
            node.set_children(old.children()?)?;
        }
        tracing::trace!(old = ?old, new = ?node, keep_children, "cloned");
        Ok(node)
    }

    /// Fresh, empty child set.
    pub fn create_child_set(&self) -> ChildList {
        ChildList::new()
    }

    /// Append to a child set under construction.
    pub fn append_child_to_set(&self, set: &mut ChildList, child: Node) {
        set.push(child);
    }

    /// Install `incoming` as the root's children and release the outgoing ones.
    ///
    /// Outgoing elements still reachable from `incoming` are kept alive.
    pub fn replace_container_children(&mut self, root: &mut RootContainer, incoming: ChildList) {
        let outgoing = root.swap_children(incoming);
        self.release_outgoing(&outgoing, root.children());
    }

    /// Install `incoming` as `parent`'s children and release the outgoing ones.
    pub fn replace_children(&mut self, parent: &Node, incoming: ChildList) -> CanopyResult<()> {
        let outgoing = parent.children()?;
        parent.set_children(incoming.clone())?;
        self.release_outgoing(&outgoing, &incoming);
        Ok(())
    }

    fn release_outgoing(&mut self, outgoing: &ChildList, incoming: &ChildList) {
        if outgoing.is_empty() || ChildList::ptr_eq(outgoing, incoming) {
            return;
        }
        let keep = incoming.reachable_ids();
        for child in outgoing {
            child.release_unreachable(&mut self.engine, &keep);
        }
    }

    /// Render every root child against the root, then flush the root surface.
    #[tracing::instrument(skip_all, fields(commit = root.commits() + 1))]
    pub fn commit_root(&mut self, root: &mut RootContainer) -> CanopyResult<CommitStats> {
        let surface = root.surface()?;
        let parent = RenderParent::layer(surface);
        let mut cx = RenderCx::new(&mut self.engine, self.default_fonts.get());
        for child in root.children() {
            child.render(&parent, &mut cx)?;
        }
        let rendered = cx.rendered();
        self.engine.flush(surface)?;

        let commit = root.bump_commits();
        tracing::debug!(rendered, "committed");
        Ok(CommitStats {
            commit,
            rendered,
            ..CommitStats::default()
        })
    }

    /// Release the font contexts and return the engine.
    pub fn shutdown(mut self) -> E {
        for mut fonts in self.extra_fonts.drain(..) {
            fonts.release(&mut self.engine);
        }
        self.default_fonts.release(&mut self.engine);
        self.engine
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/bridge.rs"]
mod tests;
