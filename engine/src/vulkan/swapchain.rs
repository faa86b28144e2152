use log::*;
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSwapchainExtension;

use super::error::GraphicsError;
use super::surface::{Negotiated, PresentationSurface};

/// A window's set of presentable images plus one 2D view per image.
#[derive(Debug)]
pub struct Swapchain {
    pub swapchain: vk::SwapchainKHR,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
    pub current_image: usize,
}

impl Swapchain {
    /// Builds a swapchain from a negotiated tuple.
    ///
    /// `old_swapchain` is handed to the driver so in-flight resources carry
    /// over during recreation; the caller remains responsible for destroying
    /// the predecessor once this call succeeds.
    pub unsafe fn create(
        device: &Device,
        surface: &PresentationSurface,
        negotiated: &Negotiated,
        old_swapchain: vk::SwapchainKHR,
    ) -> Result<Self, GraphicsError> {
        let info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.surface)
            .min_image_count(negotiated.image_count)
            .image_format(negotiated.format)
            .image_color_space(negotiated.color_space)
            .image_extent(negotiated.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            // A single unified queue family renders and presents, so the
            // images never change owners.
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .queue_family_indices(&[])
            .pre_transform(negotiated.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(negotiated.present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = device.create_swapchain_khr(&info, None)?;
        let images = device.get_swapchain_images_khr(swapchain)?;

        let views = images
            .iter()
            .map(|i| {
                let components = vk::ComponentMapping::builder()
                    .r(vk::ComponentSwizzle::IDENTITY)
                    .g(vk::ComponentSwizzle::IDENTITY)
                    .b(vk::ComponentSwizzle::IDENTITY)
                    .a(vk::ComponentSwizzle::IDENTITY);

                let subresource_range = vk::ImageSubresourceRange::builder()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1);

                let info = vk::ImageViewCreateInfo::builder()
                    .image(*i)
                    .view_type(vk::ImageViewType::_2D)
                    .format(negotiated.format)
                    .components(components)
                    .subresource_range(subresource_range);

                device.create_image_view(&info, None)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Created swapchain: {} images, {:?}, {}x{}.",
            images.len(),
            negotiated.format,
            negotiated.extent.width,
            negotiated.extent.height
        );

        Ok(Self {
            swapchain,
            format: negotiated.format,
            extent: negotiated.extent,
            images,
            views,
            current_image: 0,
        })
    }

    /// Asks the driver for the next presentable image and advances the
    /// current-image index. Must be paired with a present of that image.
    pub unsafe fn acquire_next(
        &mut self,
        device: &Device,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<u32, GraphicsError> {
        let (index, _) =
            device.acquire_next_image_khr(self.swapchain, u64::MAX, semaphore, fence)?;
        self.current_image = index as usize;
        Ok(index)
    }

    /// Views first, then the swapchain handle; drivers require dependents
    /// freed before their parent. The surface outlives the swapchain and is
    /// destroyed by its own owner.
    pub unsafe fn destroy(&mut self, device: &Device) {
        for view in self.views.drain(..) {
            device.destroy_image_view(view, None);
        }
        device.destroy_swapchain_khr(self.swapchain, None);
        self.swapchain = vk::SwapchainKHR::null();
        self.images.clear();
    }
}
