use log::*;
use vulkanalia::prelude::v1_0::*;

use super::constants;
use super::error::GraphicsError;

/// Per-window depth buffer, sized to the window and rebuilt on every resize.
#[derive(Debug)]
pub struct DepthAttachment {
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
}

impl DepthAttachment {
    pub unsafe fn provision(
        instance: &Instance,
        device: &Device,
        physical_device: vk::PhysicalDevice,
        extent: vk::Extent2D,
    ) -> Result<Self, GraphicsError> {
        let format = constants::DEPTH_FORMAT;

        let info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = device.create_image(&info, None)?;

        let requirements = device.get_image_memory_requirements(image);
        let memory_properties = instance.get_physical_device_memory_properties(physical_device);
        let type_index = memory_type_index(
            &memory_properties,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::empty(),
        )?;

        let allocate_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(type_index);

        let memory = device.allocate_memory(&allocate_info, None)?;
        device.bind_image_memory(image, memory, 0)?;

        let subresource_range = vk::ImageSubresourceRange::builder()
            .aspect_mask(vk::ImageAspectFlags::DEPTH)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1);

        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::_2D)
            .format(format)
            .subresource_range(subresource_range);

        let view = device.create_image_view(&view_info, None)?;

        debug!(
            "Provisioned depth attachment {}x{} ({:?}).",
            extent.width, extent.height, format
        );

        Ok(Self {
            format,
            extent,
            image,
            memory,
            view,
        })
    }

    pub unsafe fn destroy(&mut self, device: &Device) {
        device.destroy_image_view(self.view, None);
        device.destroy_image(self.image, None);
        device.free_memory(self.memory, None);
        self.view = vk::ImageView::null();
        self.image = vk::Image::null();
        self.memory = vk::DeviceMemory::null();
    }
}

/// Finds the lowest memory type index whose bit is set in `type_bits` and
/// whose property flags cover `required`.
///
/// Drivers order memory types by preference, so the ascending scan with
/// early return is load-bearing; do not reorder it.
pub fn memory_type_index(
    memory: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Result<u32, GraphicsError> {
    for index in 0..memory.memory_type_count {
        let bit_set = type_bits & (1 << index) != 0;
        let properties = memory.memory_types[index as usize].property_flags;
        if bit_set && properties.contains(required) {
            return Ok(index);
        }
    }

    Err(GraphicsError::NoSuitableMemoryType {
        type_bits,
        required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut memory = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: types.len() as u32,
            ..Default::default()
        };
        for (index, flags) in types.iter().enumerate() {
            memory.memory_types[index].property_flags = *flags;
        }
        memory
    }

    #[test]
    fn lowest_qualifying_index_wins() {
        let memory = memory_with(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        let index =
            memory_type_index(&memory, 0b11, vk::MemoryPropertyFlags::DEVICE_LOCAL).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn masked_out_types_are_skipped() {
        let memory = memory_with(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        let index =
            memory_type_index(&memory, 0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn property_superset_is_accepted() {
        let memory = memory_with(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        let required =
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        let index = memory_type_index(&memory, 0b11, required).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn empty_requirement_matches_first_masked_type() {
        let memory = memory_with(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        ]);

        let index = memory_type_index(&memory, 0b10, vk::MemoryPropertyFlags::empty()).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn selection_is_deterministic() {
        let memory = memory_with(&[
            vk::MemoryPropertyFlags::empty(),
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        let first =
            memory_type_index(&memory, 0b111, vk::MemoryPropertyFlags::DEVICE_LOCAL).unwrap();
        let second =
            memory_type_index(&memory, 0b111, vk::MemoryPropertyFlags::DEVICE_LOCAL).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 1);
    }

    #[test]
    fn no_match_is_an_error() {
        let memory = memory_with(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);

        assert!(matches!(
            memory_type_index(&memory, 0b1, vk::MemoryPropertyFlags::DEVICE_LOCAL),
            Err(GraphicsError::NoSuitableMemoryType { .. })
        ));
    }
}
