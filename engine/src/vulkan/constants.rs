use vulkanalia::{vk, Version};

pub const PORTABILITY_MACOS_VERSION: Version = Version::new(1, 3, 216);

/// The bundled validation layer, tried first.
pub const BUNDLED_VALIDATION_LAYERS: [vk::ExtensionName; 1] =
    [vk::ExtensionName::from_bytes(b"VK_LAYER_KHRONOS_validation")];

/// Component layers accepted as a fallback when the bundled layer is absent.
pub const COMPONENT_VALIDATION_LAYERS: [vk::ExtensionName; 7] = [
    vk::ExtensionName::from_bytes(b"VK_LAYER_GOOGLE_threading"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_parameter_validation"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_object_tracker"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_image"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_core_validation"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_swapchain"),
    vk::ExtensionName::from_bytes(b"VK_LAYER_GOOGLE_unique_objects"),
];

/// Fallback when the surface reports only the `UNDEFINED` sentinel format.
pub const DEFAULT_SURFACE_FORMAT: vk::Format = vk::Format::B8G8R8A8_UNORM;

pub const DEPTH_FORMAT: vk::Format = vk::Format::D16_UNORM;

/// We request a single presentable image and let the surface minimum raise it.
pub const DESIRED_IMAGE_COUNT: u32 = 1;
