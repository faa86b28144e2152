use thiserror::Error;
use vulkanalia::vk;

/// Failures of the context bootstrap and per-window presentation setup.
///
/// Context-level variants (`Loader`, `Capability`, `NoDevice`, queue
/// resolution) abort the whole bootstrap. `PresentationInit` is scoped to a
/// single window and leaves the context usable for the others.
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("Vulkan loader unavailable: {0}")]
    Loader(String),

    #[error("missing required capability: {0}")]
    Capability(String),

    #[error("no physical devices reported by the driver")]
    NoDevice,

    #[error(
        "graphics queue family {graphics} differs from present family {present}; \
         a single family supporting both is required"
    )]
    UnifiedQueueRequired { graphics: u32, present: u32 },

    #[error("no queue family supports both graphics and presentation")]
    NoSuitableQueueFamily,

    #[error("presentation setup failed: {0}")]
    PresentationInit(#[source] Box<GraphicsError>),

    #[error("no suitable memory type for bits {type_bits:#x} with properties {required:?}")]
    NoSuitableMemoryType {
        type_bits: u32,
        required: vk::MemoryPropertyFlags,
    },

    #[error(transparent)]
    Vulkan(#[from] vk::ErrorCode),
}

impl GraphicsError {
    /// Scopes an error to one window's presentation path.
    pub(crate) fn into_presentation(self) -> GraphicsError {
        match self {
            already @ GraphicsError::PresentationInit(_) => already,
            other => GraphicsError::PresentationInit(Box::new(other)),
        }
    }
}
