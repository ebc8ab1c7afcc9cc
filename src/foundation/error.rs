/// Convenience result type used across canopy.
pub type CanopyResult<T> = Result<T, CanopyError>;

/// Top-level error taxonomy.
///
/// Structural and released errors indicate a defect in the code building the element tree and
/// are never worth retrying. Resource errors are raised by a single element's render step when the
/// drawing engine refuses an allocation or a decode.
#[derive(thiserror::Error, Debug)]
pub enum CanopyError {
    /// Wrong parent type, bare text, unknown tag, or another tree-shape defect.
    #[error("structural error: {0}")]
    Structural(String),

    /// An operation reached an element after its native resources were released.
    #[error("already released: {0}")]
    Released(String),

    /// The drawing engine refused an allocation or failed to decode input.
    #[error("resource error: {0}")]
    Resource(String),

    /// The bridge was used before the two-phase startup completed.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// Invalid user-provided scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanopyError {
    /// Build a [`CanopyError::Structural`] value.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Build a [`CanopyError::Released`] value.
    pub fn released(msg: impl Into<String>) -> Self {
        Self::Released(msg.into())
    }

    /// Build a [`CanopyError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`CanopyError::NotInitialized`] value.
    pub fn not_initialized(msg: impl Into<String>) -> Self {
        Self::NotInitialized(msg.into())
    }

    /// Build a [`CanopyError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors caused by a defect in tree-building code.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Structural(_) | Self::Released(_) | Self::NotInitialized(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
