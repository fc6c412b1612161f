/// Convenience result type used across depthlift.
pub type DepthliftResult<T> = Result<T, DepthliftError>;

/// Top-level error taxonomy used by the build path and the public API.
///
/// None of these are produced by the per-frame loop: every fallible step happens while a session
/// is being built.
#[derive(thiserror::Error, Debug)]
pub enum DepthliftError {
    /// The depth provider returned a non-success response or could not be reached.
    #[error("provider error: {0}")]
    Provider(String),

    /// The depth grid is missing, empty, or not rectangular.
    #[error("malformed depth data: {0}")]
    MalformedDepthData(String),

    /// Neither a usable layer list nor valid mesh data was present.
    #[error("missing layer data: {0}")]
    MissingLayerData(String),

    /// An image referenced by the provider could not be resolved or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration, geometry parameters, or surface sizes.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DepthliftError {
    /// Build a [`DepthliftError::Provider`] value.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Build a [`DepthliftError::MalformedDepthData`] value.
    pub fn malformed_depth(msg: impl Into<String>) -> Self {
        Self::MalformedDepthData(msg.into())
    }

    /// Build a [`DepthliftError::MissingLayerData`] value.
    pub fn missing_layers(msg: impl Into<String>) -> Self {
        Self::MissingLayerData(msg.into())
    }

    /// Build a [`DepthliftError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`DepthliftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors raised while building a session from provider data.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDepthData(_) | Self::MissingLayerData(_) | Self::Decode(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
