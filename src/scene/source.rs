use std::path::Path;

use anyhow::Context as _;

use crate::element::props::Props;
use crate::foundation::error::{CanopyError, CanopyResult};
use crate::scene::SceneNode;

/// Normalize a scene-relative path: `/` separators, no absolute paths, no `..`.
pub(crate) fn normalize_rel_path(source: &str) -> CanopyResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CanopyError::validation("source paths must be relative"));
    }
    if s.is_empty() {
        return Err(CanopyError::validation("source path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CanopyError::validation("source paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CanopyError::validation(
            "source path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

impl SceneNode {
    /// Load every `encoded-image` `source` below `root` into the node's `bytes`.
    ///
    /// Nodes that already carry bytes are left alone.
    pub fn resolve_sources(&mut self, root: &Path) -> CanopyResult<()> {
        if let Props::EncodedImage(p) = &mut self.props
            && p.bytes.is_empty()
            && let Some(source) = &p.source
        {
            let rel = normalize_rel_path(source)?;
            let path = root.join(&rel);
            p.bytes = std::fs::read(&path)
                .with_context(|| format!("read image source '{}'", path.display()))?;
            tracing::trace!(source = %rel, len = p.bytes.len(), "image source loaded");
        }
        for child in &mut self.children {
            child.resolve_sources(root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/source.rs"]
mod tests;
