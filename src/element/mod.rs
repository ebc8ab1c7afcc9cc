//! Element model, render protocol and release discipline.
//!
//! An element is one node of the retained scene graph. Its tag is fixed at construction and its
//! props are immutable; an update builds a replacement element. Containers (region, layer) own an
//! ordered child list, leaves own none. Every native handle an element materializes is owned by
//! exactly that element and returned to the engine by [`Node::release`].

pub mod factory;
mod image;
mod layer;
mod line;
mod paragraph;
pub mod props;
mod region;
pub(crate) mod resource;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::props::Props;
use crate::engine::{CanvasHandle, DrawingEngine, FontContextHandle, SurfaceHandle};
use crate::foundation::error::{CanopyError, CanopyResult};

/// The closed set of drawable element types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementTag {
    /// Draw target bound to a parent layer's surface; clears, rotates, hosts leaves and layers.
    Region,
    /// Offscreen surface composited into its parent region.
    Layer,
    /// Stroked line segment.
    Line,
    /// Image decoded from encoded bytes.
    EncodedImage,
    /// Laid-out text block.
    Paragraph,
}

impl ElementTag {
    /// Every tag.
    pub const ALL: [Self; 5] = [
        Self::Region,
        Self::Layer,
        Self::Line,
        Self::EncodedImage,
        Self::Paragraph,
    ];

    /// Stable string form (`region`, `layer`, `line`, `encoded-image`, `paragraph`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Layer => "layer",
            Self::Line => "line",
            Self::EncodedImage => "encoded-image",
            Self::Paragraph => "paragraph",
        }
    }

    /// Whether elements of this tag may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Region | Self::Layer)
    }

    /// The only tag admissible as this tag's parent. Regions and layers alternate.
    pub fn expected_parent(self) -> Self {
        match self {
            Self::Region => Self::Layer,
            Self::Layer | Self::Line | Self::EncodedImage | Self::Paragraph => Self::Region,
        }
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementTag {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CanopyError::structural(format!("unrecognized element type \"{s}\"")))
    }
}

/// Process-unique element identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Access the raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered, copy-on-write list of child elements.
///
/// Cloning a list shares it; [`ChildList::ptr_eq`] reports whether two lists are the same
/// allocation. Pushing onto a shared list copies it first.
#[derive(Clone, Default)]
pub struct ChildList(Rc<Vec<Node>>);

impl ChildList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no children.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Children in paint order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    /// Child at `index`.
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    /// Append a child.
    pub fn push(&mut self, node: Node) {
        Rc::make_mut(&mut self.0).push(node);
    }

    /// Whether both lists are the same allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Ids of every element reachable through this list.
    pub fn reachable_ids(&self) -> HashSet<ElementId> {
        let mut out = HashSet::new();
        for child in self.iter() {
            child.collect_ids(&mut out);
        }
        out
    }
}

impl FromIterator<Node> for ChildList {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self(Rc::new(iter.into_iter().collect()))
    }
}

impl<'a> IntoIterator for &'a ChildList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ChildList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub(crate) enum ElementKind {
    Region(region::RegionElement),
    Layer(layer::LayerElement),
    Line(line::LineElement),
    EncodedImage(image::ImageElement),
    Paragraph(paragraph::ParagraphElement),
}

impl ElementKind {
    fn tag(&self) -> ElementTag {
        match self {
            Self::Region(_) => ElementTag::Region,
            Self::Layer(_) => ElementTag::Layer,
            Self::Line(_) => ElementTag::Line,
            Self::EncodedImage(_) => ElementTag::EncodedImage,
            Self::Paragraph(_) => ElementTag::Paragraph,
        }
    }

    fn props(&self) -> Props {
        match self {
            Self::Region(e) => Props::Region(e.props.clone()),
            Self::Layer(e) => Props::Layer(e.props.clone()),
            Self::Line(e) => Props::Line(e.props.clone()),
            Self::EncodedImage(e) => Props::EncodedImage(e.props.clone()),
            Self::Paragraph(e) => Props::Paragraph(e.props.clone()),
        }
    }

    fn release_resources(&mut self, engine: &mut dyn DrawingEngine) {
        match self {
            Self::Region(e) => e.release(),
            Self::Layer(e) => e.release(engine),
            Self::Line(e) => e.release(engine),
            Self::EncodedImage(e) => e.release(engine),
            Self::Paragraph(e) => e.release(engine),
        }
    }
}

struct Element {
    released: bool,
    children: ChildList,
    kind: ElementKind,
}

struct NodeInner {
    id: ElementId,
    tag: ElementTag,
    state: RefCell<Element>,
}

/// Shared handle to an element.
///
/// Clones refer to the same element. Identity is the [`ElementId`].
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0.tag, self.0.id)
    }
}

impl Node {
    pub(crate) fn new(kind: ElementKind) -> Self {
        let tag = kind.tag();
        Self(Rc::new(NodeInner {
            id: ElementId::next(),
            tag,
            state: RefCell::new(Element {
                released: false,
                children: ChildList::new(),
                kind,
            }),
        }))
    }

    /// Element identity.
    pub fn id(&self) -> ElementId {
        self.0.id
    }

    /// Element tag.
    pub fn tag(&self) -> ElementTag {
        self.0.tag
    }

    /// Whether both handles refer to the same element.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Whether [`Node::release`] has run on this element.
    pub fn is_released(&self) -> bool {
        self.0.state.try_borrow().is_ok_and(|e| e.released)
    }

    /// Fail with [`CanopyError::Released`] once the element has been released.
    pub fn ensure_live(&self, what: &str) -> CanopyResult<()> {
        if self.borrow(what)?.released {
            return Err(CanopyError::released(format!("cannot {what} {self:?}")));
        }
        Ok(())
    }

    /// Snapshot of the element's props.
    pub fn props(&self) -> CanopyResult<Props> {
        Ok(self.borrow("props")?.kind.props())
    }

    /// The current child list (shared, not copied).
    pub fn children(&self) -> CanopyResult<ChildList> {
        Ok(self.borrow("children")?.children.clone())
    }

    /// Append `child` to this container's child list.
    pub fn append_child(&self, child: Node) -> CanopyResult<()> {
        self.ensure_container("append a child to")?;
        if Node::ptr_eq(self, &child) {
            return Err(CanopyError::structural(format!(
                "cannot append {self:?} to itself"
            )));
        }
        let mut el = self.borrow_mut("append_child")?;
        if el.released {
            return Err(CanopyError::released(format!(
                "cannot append to {self:?}"
            )));
        }
        el.children.push(child);
        Ok(())
    }

    /// Install `children` as this container's child list, replacing the current list as is.
    pub(crate) fn set_children(&self, children: ChildList) -> CanopyResult<()> {
        self.ensure_container("set children of")?;
        let mut el = self.borrow_mut("set_children")?;
        if el.released {
            return Err(CanopyError::released(format!(
                "cannot set children of {self:?}"
            )));
        }
        el.children = children;
        Ok(())
    }

    /// Validate the parent, materialize native resources, draw, and recurse into children.
    ///
    /// Errors abort the walk; a region pops any transform it pushed before the error propagates.
    pub fn render(&self, parent: &RenderParent, cx: &mut RenderCx<'_>) -> CanopyResult<()> {
        let tag = self.tag();
        let mut el = self.0.state.try_borrow_mut().map_err(|_| {
            CanopyError::structural(format!(
                "{self:?} is already being rendered (cycle in the element tree)"
            ))
        })?;
        if el.released {
            return Err(CanopyError::released(format!("cannot render {self:?}")));
        }
        parent.admit(tag)?;
        cx.rendered += 1;

        let Element { children, kind, .. } = &mut *el;
        match kind {
            ElementKind::Region(e) => e.render(parent, children, cx),
            ElementKind::Layer(e) => e.render(parent, children, cx),
            ElementKind::Line(e) => e.render(parent, cx),
            ElementKind::EncodedImage(e) => e.render(parent, cx),
            ElementKind::Paragraph(e) => e.render(parent, cx),
        }
    }

    /// Release this element, every descendant, and all their native handles.
    ///
    /// Idempotent: a second call is a no-op. Afterwards the element has an empty child list and
    /// rendering it fails.
    pub fn release(&self, engine: &mut dyn DrawingEngine) {
        self.release_unreachable(engine, &HashSet::new());
    }

    /// Like [`Node::release`], but leaves every element whose id is in `keep` (and its subtree)
    /// untouched.
    pub fn release_unreachable(&self, engine: &mut dyn DrawingEngine, keep: &HashSet<ElementId>) {
        if keep.contains(&self.id()) {
            return;
        }
        // Only a render walk borrows element state, and it holds the engine exclusively. The
        // borrow is dropped before recursing, so cycles meet the tombstone instead.
        let children = {
            let mut el = self.0.state.borrow_mut();
            if el.released {
                return;
            }
            el.released = true;
            std::mem::take(&mut el.children)
        };
        for child in &children {
            child.release_unreachable(engine, keep);
        }
        self.0.state.borrow_mut().kind.release_resources(engine);
        tracing::trace!(element = ?self, "released");
    }

    fn collect_ids(&self, out: &mut HashSet<ElementId>) {
        if !out.insert(self.id()) {
            return;
        }
        if let Ok(el) = self.0.state.try_borrow() {
            for child in &el.children {
                child.collect_ids(out);
            }
        }
    }

    fn ensure_container(&self, what: &str) -> CanopyResult<()> {
        if self.tag().is_container() {
            Ok(())
        } else {
            Err(CanopyError::structural(format!(
                "cannot {what} {self:?}: {} is not a container",
                self.tag()
            )))
        }
    }

    fn borrow(&self, op: &str) -> CanopyResult<std::cell::Ref<'_, Element>> {
        self.0.state.try_borrow().map_err(|_| {
            CanopyError::structural(format!("{op}: {self:?} is being rendered"))
        })
    }

    fn borrow_mut(&self, op: &str) -> CanopyResult<std::cell::RefMut<'_, Element>> {
        self.0.state.try_borrow_mut().map_err(|_| {
            CanopyError::structural(format!("{op}: {self:?} is being rendered"))
        })
    }
}

/// What a child sees of its parent during render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderParent {
    tag: ElementTag,
    surface: Option<SurfaceHandle>,
    canvas: Option<CanvasHandle>,
}

impl RenderParent {
    /// A layer backed by `surface`. The root container presents itself this way.
    pub fn layer(surface: SurfaceHandle) -> Self {
        Self {
            tag: ElementTag::Layer,
            surface: Some(surface),
            canvas: None,
        }
    }

    /// A region drawing into `canvas`, the draw target of `surface`.
    pub fn region(surface: SurfaceHandle, canvas: CanvasHandle) -> Self {
        Self {
            tag: ElementTag::Region,
            surface: Some(surface),
            canvas: Some(canvas),
        }
    }

    /// Parent tag.
    pub fn tag(&self) -> ElementTag {
        self.tag
    }

    fn admit(&self, child: ElementTag) -> CanopyResult<()> {
        let expected = child.expected_parent();
        if self.tag == expected {
            Ok(())
        } else {
            Err(CanopyError::structural(format!(
                "expected {expected} parent for {child}, found {}",
                self.tag
            )))
        }
    }

    pub(crate) fn canvas_for(&self, child: ElementTag) -> CanopyResult<CanvasHandle> {
        self.canvas.ok_or_else(|| {
            CanopyError::structural(format!("{child} requires an initialized region parent"))
        })
    }

    pub(crate) fn surface_for(&self, child: ElementTag) -> CanopyResult<SurfaceHandle> {
        self.surface.ok_or_else(|| {
            CanopyError::structural(format!("{child} requires an initialized layer parent"))
        })
    }
}

/// Per-commit render state threaded through the walk.
pub struct RenderCx<'a> {
    pub(crate) engine: &'a mut dyn DrawingEngine,
    pub(crate) fonts: Option<FontContextHandle>,
    pub(crate) rendered: usize,
}

impl<'a> RenderCx<'a> {
    /// Render state drawing through `engine`; paragraphs without their own font context use
    /// `fonts`.
    pub fn new(engine: &'a mut dyn DrawingEngine, fonts: Option<FontContextHandle>) -> Self {
        Self {
            engine,
            fonts,
            rendered: 0,
        }
    }

    /// Elements rendered so far in this walk.
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

fn render_children(
    children: &ChildList,
    parent: &RenderParent,
    cx: &mut RenderCx<'_>,
) -> CanopyResult<()> {
    for child in children {
        child.render(parent, cx)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/element/element.rs"]
mod tests;
