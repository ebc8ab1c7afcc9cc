use crate::bridge::root::RootContainer;
use crate::bridge::{CommitStats, HostBridge, HostContext};
use crate::element::props::Props;
use crate::element::Node;
use crate::engine::{DrawingEngine, FrameRGBA};
use crate::foundation::error::CanopyResult;
use crate::scene::SceneNode;

/// What was committed for one scene node last time.
struct Fiber {
    props: Props,
    node: Node,
    children: Vec<Fiber>,
}

/// A root container plus the description committed into it last.
pub struct RenderTarget {
    root: RootContainer,
    fibers: Vec<Fiber>,
}

impl RenderTarget {
    /// Target backed by a fresh `width x height` surface.
    pub fn new<E: DrawingEngine>(
        bridge: &mut HostBridge<E>,
        width: u32,
        height: u32,
    ) -> CanopyResult<Self> {
        Ok(Self {
            root: bridge.make_root(width, height)?,
            fibers: Vec::new(),
        })
    }

    /// The root container.
    pub fn root(&self) -> &RootContainer {
        &self.root
    }

    /// Top-level elements of the last committed tree.
    pub fn elements(&self) -> Vec<Node> {
        self.fibers.iter().map(|f| f.node.clone()).collect()
    }

    /// Read back the root surface.
    pub fn read_pixels<E: DrawingEngine>(
        &self,
        bridge: &mut HostBridge<E>,
    ) -> CanopyResult<FrameRGBA> {
        bridge.read_pixels(&self.root)
    }

    /// Release the committed tree and the root surface.
    pub fn release<E: DrawingEngine>(self, bridge: &mut HostBridge<E>) {
        bridge.release_root(self.root);
    }
}

#[derive(Default)]
struct Tally {
    created: usize,
    cloned: usize,
    reused: usize,
}

/// Reconcile `tree` against the last commit on `target`, commit it, and report.
///
/// `on_committed` runs after the root surface was flushed. Errors from the render walk abort the
/// commit; the elements already swapped in stay installed and are released with the target.
#[tracing::instrument(skip_all, fields(nodes = tree.len()))]
pub fn render<E: DrawingEngine>(
    bridge: &mut HostBridge<E>,
    tree: &[SceneNode],
    target: &mut RenderTarget,
    on_committed: Option<&mut dyn FnMut(&CommitStats)>,
) -> CanopyResult<CommitStats> {
    for node in tree {
        node.validate()?;
    }

    let host = bridge.root_context(&target.root);
    let mut tally = Tally::default();
    let fibers = tree
        .iter()
        .enumerate()
        .map(|(i, next)| reconcile(bridge, &host, next, target.fibers.get(i), &mut tally))
        .collect::<CanopyResult<Vec<_>>>()?;

    if !same_nodes(&fibers, &target.fibers) {
        let mut set = bridge.create_child_set();
        for fiber in &fibers {
            bridge.append_child_to_set(&mut set, fiber.node.clone());
        }
        bridge.replace_container_children(&mut target.root, set);
    }
    target.fibers = fibers;

    let mut stats = bridge.commit_root(&mut target.root)?;
    stats.created = tally.created;
    stats.cloned = tally.cloned;
    stats.reused = tally.reused;
    tracing::debug!(
        commit = stats.commit,
        created = stats.created,
        cloned = stats.cloned,
        reused = stats.reused,
        "render complete"
    );

    if let Some(cb) = on_committed {
        cb(&stats);
    }
    Ok(stats)
}

fn same_nodes(a: &[Fiber], b: &[Fiber]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Node::ptr_eq(&x.node, &y.node))
}

fn reconcile<E: DrawingEngine>(
    bridge: &HostBridge<E>,
    host: &HostContext,
    next: &SceneNode,
    prev: Option<&Fiber>,
    tally: &mut Tally,
) -> CanopyResult<Fiber> {
    let tag = next.tag();
    let child_host = bridge.child_context(host, tag);

    let Some(prev) = prev.filter(|p| p.node.tag() == tag) else {
        let node = bridge.create_instance(tag.as_str(), next.props.clone(), host)?;
        let mut children = Vec::with_capacity(next.children.len());
        for child in &next.children {
            let fiber = reconcile(bridge, &child_host, child, None, tally)?;
            bridge.append_initial_child(&node, fiber.node.clone())?;
            children.push(fiber);
        }
        tally.created += 1;
        return Ok(Fiber {
            props: next.props.clone(),
            node,
            children,
        });
    };

    let children = next
        .children
        .iter()
        .enumerate()
        .map(|(i, child)| reconcile(bridge, &child_host, child, prev.children.get(i), tally))
        .collect::<CanopyResult<Vec<_>>>()?;
    let children_unchanged = same_nodes(&children, &prev.children);

    let node = if children_unchanged && next.props == prev.props {
        tally.reused += 1;
        prev.node.clone()
    } else if children_unchanged {
        tally.cloned += 1;
        bridge.clone_instance(&prev.node, next.props.clone(), true)?
    } else {
        let node = bridge.clone_instance(&prev.node, next.props.clone(), false)?;
        for child in &children {
            bridge.append_initial_child(&node, child.node.clone())?;
        }
        tally.cloned += 1;
        node
    };

    Ok(Fiber {
        props: next.props.clone(),
        node,
        children,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/render.rs"]
mod tests;
