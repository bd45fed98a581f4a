use std::path::PathBuf;

/// Engine failure categories.
///
/// Setup code wraps these in `anyhow::Error` with added context; callers that
/// need to react to a category (e.g. to show a capability message) downcast.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No adapter or device able to drive the surface.
    #[error("no compatible GPU available: {0}")]
    Capability(String),

    /// A configuration value the engine cannot work with.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A texture asset could not be read, decoded or validated.
    #[error("asset {path}: {reason}")]
    Asset { path: PathBuf, reason: String },

    /// A frame could not be completed; the scheduler halts.
    #[error("frame failed: {0}")]
    Frame(String),
}

impl EngineError {
    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Asset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Message shown to the user when startup fails for lack of GPU support.
    pub fn capability_banner(&self) -> Option<String> {
        match self {
            Self::Capability(detail) => Some(format!(
                "GPU rendering is NOT supported on this system ({detail}).\n\
                 A Vulkan, Metal, DX12 or WebGPU capable adapter is required."
            )),
            _ => None,
        }
    }
}
