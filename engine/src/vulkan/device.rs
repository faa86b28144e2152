use log::*;
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;

use super::capability;
use super::constants;
use super::error::GraphicsError;

/// Per-family capability summary fed into queue resolution.
#[derive(Copy, Clone, Debug)]
pub struct QueueFamilySupport {
    pub graphics: bool,
    pub present: bool,
}

/// The resolved queue family. Creation requires a single family that can
/// both render and present; split families are a documented limitation
/// because no cross-queue synchronization is implemented.
#[derive(Copy, Clone, Debug)]
pub struct QueueSelection {
    pub family_index: u32,
}

impl QueueSelection {
    /// Queries each family's graphics flag and per-surface present support,
    /// then resolves them.
    pub unsafe fn query(
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Self, GraphicsError> {
        let properties = instance.get_physical_device_queue_family_properties(physical_device);

        let mut families = Vec::with_capacity(properties.len());
        for (index, family) in properties.iter().enumerate() {
            families.push(QueueFamilySupport {
                graphics: family.queue_flags.contains(vk::QueueFlags::GRAPHICS),
                present: instance.get_physical_device_surface_support_khr(
                    physical_device,
                    index as u32,
                    surface,
                )?,
            });
        }

        Self::resolve(&families)
    }

    /// Resolves a queue family from capability pairs.
    ///
    /// The first family supporting both graphics and present wins
    /// immediately, overriding any earlier graphics-only candidate. With no
    /// combined family the device is unusable: distinct graphics/present
    /// families are rejected rather than synchronized across.
    pub fn resolve(families: &[QueueFamilySupport]) -> Result<Self, GraphicsError> {
        let mut graphics_only = None;
        let mut present_only = None;

        for (index, family) in families.iter().enumerate() {
            let index = index as u32;
            if family.graphics && family.present {
                return Ok(Self {
                    family_index: index,
                });
            }
            if family.graphics && graphics_only.is_none() {
                graphics_only = Some(index);
            }
            if family.present && present_only.is_none() {
                present_only = Some(index);
            }
        }

        match (graphics_only, present_only) {
            (Some(graphics), Some(present)) => {
                Err(GraphicsError::UnifiedQueueRequired { graphics, present })
            }
            _ => Err(GraphicsError::NoSuitableQueueFamily),
        }
    }
}

/// Grabs the first enumerated physical device.
///
/// Single-GPU assumption; swap this function out for a ranking policy when
/// multi-GPU selection is needed.
pub unsafe fn pick_physical_device(
    instance: &Instance,
) -> Result<vk::PhysicalDevice, GraphicsError> {
    let physical_devices = instance.enumerate_physical_devices()?;

    let physical_device = *physical_devices.first().ok_or(GraphicsError::NoDevice)?;

    let properties = instance.get_physical_device_properties(physical_device);
    info!("Selected physical device (`{}`).", properties.device_name);

    Ok(physical_device)
}

/// Creates the logical device with exactly one queue from the resolved
/// family and returns the queue handle alongside it.
pub unsafe fn create_logical_device(
    entry: &Entry,
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    selection: QueueSelection,
    enabled_layers: &[vk::ExtensionName],
) -> Result<(Device, vk::Queue), GraphicsError> {
    let available = capability::probe_device_extensions(instance, physical_device)?;
    if !available.contains(&vk::KHR_SWAPCHAIN_EXTENSION.name) {
        return Err(GraphicsError::Capability(format!(
            "device extension {} is not supported",
            vk::KHR_SWAPCHAIN_EXTENSION.name
        )));
    }

    let queue_priorities = &[1.0];
    let queue_info = vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(selection.family_index)
        .queue_priorities(queue_priorities);

    // Pre-1.1 loaders still read device layers.
    let layers = enabled_layers.iter().map(|l| l.as_ptr()).collect::<Vec<_>>();

    let mut extensions = vec![vk::KHR_SWAPCHAIN_EXTENSION.name.as_ptr()];

    // Required by Vulkan SDK on macOS since 1.3.216.
    if cfg!(target_os = "macos") && entry.version()? >= constants::PORTABILITY_MACOS_VERSION {
        extensions.push(vk::KHR_PORTABILITY_SUBSET_EXTENSION.name.as_ptr());
    }

    let supported = instance.get_physical_device_features(physical_device);
    let features = vk::PhysicalDeviceFeatures::builder()
        .shader_clip_distance(supported.shader_clip_distance == vk::TRUE);

    let queue_infos = &[queue_info];
    let info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(queue_infos)
        .enabled_layer_names(&layers)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = instance.create_device(physical_device, &info, None)?;
    let queue = device.get_device_queue(selection.family_index, 0);

    Ok((device, queue))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(graphics: bool, present: bool) -> QueueFamilySupport {
        QueueFamilySupport { graphics, present }
    }

    #[test]
    fn combined_family_is_selected() {
        let selection = QueueSelection::resolve(&[family(true, true)]).unwrap();
        assert_eq!(selection.family_index, 0);
    }

    #[test]
    fn combined_family_overrides_earlier_graphics_only() {
        let families = [family(true, false), family(false, true), family(true, true)];
        let selection = QueueSelection::resolve(&families).unwrap();
        assert_eq!(selection.family_index, 2);
    }

    #[test]
    fn earliest_combined_family_wins() {
        let families = [family(false, false), family(true, true), family(true, true)];
        let selection = QueueSelection::resolve(&families).unwrap();
        assert_eq!(selection.family_index, 1);
    }

    #[test]
    fn split_families_are_rejected() {
        let families = [family(true, false), family(false, true)];
        assert!(matches!(
            QueueSelection::resolve(&families),
            Err(GraphicsError::UnifiedQueueRequired {
                graphics: 0,
                present: 1
            })
        ));
    }

    #[test]
    fn missing_present_support_is_rejected() {
        let families = [family(true, false), family(true, false)];
        assert!(matches!(
            QueueSelection::resolve(&families),
            Err(GraphicsError::NoSuitableQueueFamily)
        ));
    }

    #[test]
    fn no_families_is_rejected() {
        assert!(matches!(
            QueueSelection::resolve(&[]),
            Err(GraphicsError::NoSuitableQueueFamily)
        ));
    }
}
