use log::*;
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;
use vulkanalia::window as vk_window;
use winit::window::Window;

use super::constants;
use super::error::GraphicsError;

/// The tuple a swapchain is built from, resolved once per (re)creation.
#[derive(Copy, Clone, Debug)]
pub struct Negotiated {
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

/// The OS-window-to-GPU binding. Holds the surface handle and, after the
/// first negotiation, the chosen format pair. Does not own the window.
#[derive(Debug)]
pub struct PresentationSurface {
    pub surface: vk::SurfaceKHR,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
}

impl PresentationSurface {
    pub unsafe fn create(instance: &Instance, window: &Window) -> Result<Self, GraphicsError> {
        let surface = vk_window::create_surface(instance, window, window)?;
        Ok(Self {
            surface,
            format: vk::Format::UNDEFINED,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        })
    }

    /// Queries what the driver supports for this surface and resolves it to
    /// one format/extent/present-mode tuple. `window_size` is consulted only
    /// when the surface leaves the extent up to the caller.
    pub unsafe fn negotiate(
        &mut self,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        window_size: (u32, u32),
    ) -> Result<Negotiated, GraphicsError> {
        let capabilities = instance
            .get_physical_device_surface_capabilities_khr(physical_device, self.surface)?;
        let formats =
            instance.get_physical_device_surface_formats_khr(physical_device, self.surface)?;
        let present_modes = instance
            .get_physical_device_surface_present_modes_khr(physical_device, self.surface)?;
        trace!("Surface offers {} present modes.", present_modes.len());

        let (format, color_space) = resolve_surface_format(&formats)?;
        self.format = format;
        self.color_space = color_space;

        let negotiated = Negotiated {
            format,
            color_space,
            // Strict FIFO is the one mode every driver carries; alternate
            // mode negotiation is out of scope.
            present_mode: vk::PresentModeKHR::FIFO,
            extent: resolve_extent(&capabilities, window_size),
            image_count: resolve_image_count(&capabilities),
            pre_transform: resolve_pre_transform(&capabilities),
        };
        debug!("Negotiated surface tuple: {:?}", negotiated);

        Ok(negotiated)
    }

    /// Only called after the owning swapchain is gone.
    pub unsafe fn destroy(&mut self, instance: &Instance) {
        instance.destroy_surface_khr(self.surface, None);
        self.surface = vk::SurfaceKHR::null();
    }
}

/// A lone `UNDEFINED` entry means the surface has no preference and we
/// substitute the default; otherwise the first reported pair is taken as-is.
fn resolve_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Result<(vk::Format, vk::ColorSpaceKHR), GraphicsError> {
    let first = formats.first().ok_or_else(|| {
        GraphicsError::Capability("surface reports no supported formats".into())
    })?;

    if formats.len() == 1 && first.format == vk::Format::UNDEFINED {
        Ok((constants::DEFAULT_SURFACE_FORMAT, first.color_space))
    } else {
        Ok((first.format, first.color_space))
    }
}

/// Surfaces either dictate their extent outright or report the all-ones
/// sentinel, in which case the window size clamped to the reported bounds
/// is used.
fn resolve_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window_size: (u32, u32)) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    let (width, height) = window_size;
    vk::Extent2D {
        width: width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// `max_image_count == 0` means the surface imposes no upper bound.
fn resolve_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = constants::DESIRED_IMAGE_COUNT.max(capabilities.min_image_count);
    if capabilities.max_image_count != 0 {
        count = count.min(capabilities.max_image_count);
    }
    count
}

fn resolve_pre_transform(
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if capabilities
        .supported_transforms
        .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
    {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        capabilities.current_transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller_decided_capabilities(
        min: (u32, u32),
        max: (u32, u32),
    ) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: min.0,
                height: min.1,
            },
            max_image_extent: vk::Extent2D {
                width: max.0,
                height: max.1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn undefined_sentinel_resolves_to_default_format() {
        let formats = [vk::SurfaceFormatKHR {
            format: vk::Format::UNDEFINED,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }];

        let (format, color_space) = resolve_surface_format(&formats).unwrap();
        assert_eq!(format, constants::DEFAULT_SURFACE_FORMAT);
        assert_eq!(color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn first_reported_format_is_taken() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R8G8B8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];

        let (format, _) = resolve_surface_format(&formats).unwrap();
        assert_eq!(format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn empty_format_list_is_rejected() {
        assert!(matches!(
            resolve_surface_format(&[]),
            Err(GraphicsError::Capability(_))
        ));
    }

    #[test]
    fn sentinel_extent_uses_clamped_window_size() {
        let capabilities = caller_decided_capabilities((640, 480), (1600, 900));

        let extent = resolve_extent(&capabilities, (1920, 200));
        assert_eq!(extent.width, 1600);
        assert_eq!(extent.height, 480);
    }

    #[test]
    fn sentinel_extent_within_bounds_is_kept() {
        let capabilities = caller_decided_capabilities((1, 1), (4096, 4096));

        let extent = resolve_extent(&capabilities, (800, 600));
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn concrete_extent_overrides_window_size() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1024,
                height: 768,
            },
            ..Default::default()
        };

        let extent = resolve_extent(&capabilities, (800, 600));
        assert_eq!(extent.width, 1024);
        assert_eq!(extent.height, 768);
    }

    #[test]
    fn image_count_raised_to_surface_minimum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };

        assert_eq!(resolve_image_count(&capabilities), 2);
    }

    #[test]
    fn image_count_unbounded_when_max_is_zero() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 0,
            ..Default::default()
        };

        assert_eq!(resolve_image_count(&capabilities), 3);
    }

    #[test]
    fn repeated_negotiation_is_deterministic() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 4,
            ..caller_decided_capabilities((1, 1), (4096, 4096))
        };

        let first = (
            resolve_extent(&capabilities, (1920, 1080)),
            resolve_image_count(&capabilities),
        );
        let second = (
            resolve_extent(&capabilities, (1920, 1080)),
            resolve_image_count(&capabilities),
        );
        assert_eq!(first.0.width, second.0.width);
        assert_eq!(first.0.height, second.0.height);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn identity_pre_transform_preferred() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY
                | vk::SurfaceTransformFlagsKHR::ROTATE_90,
            current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_90,
            ..Default::default()
        };

        assert_eq!(
            resolve_pre_transform(&capabilities),
            vk::SurfaceTransformFlagsKHR::IDENTITY
        );
    }

    #[test]
    fn current_transform_when_identity_unsupported() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            supported_transforms: vk::SurfaceTransformFlagsKHR::ROTATE_180,
            current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_180,
            ..Default::default()
        };

        assert_eq!(
            resolve_pre_transform(&capabilities),
            vk::SurfaceTransformFlagsKHR::ROTATE_180
        );
    }
}
