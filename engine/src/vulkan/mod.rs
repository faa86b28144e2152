use log::*;
use vulkanalia::prelude::v1_0::*;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use depth::DepthAttachment;
use swapchain::Swapchain;

mod capability;
mod constants;
mod context;
mod depth;
mod device;
mod error;
mod instance;
mod surface;
mod swapchain;

pub use context::{ContextOptions, GraphicsContext};
pub use error::GraphicsError;
pub use surface::PresentationSurface;

/// Everything one window needs to present: its surface, the swapchain built
/// on it, and a depth buffer matching the current extent.
///
/// A failure here is fatal to this window only; the context and any other
/// window stay usable.
#[derive(Debug)]
pub struct WindowGraphics {
    surface: PresentationSurface,
    swapchain: Swapchain,
    depth: DepthAttachment,
}

impl WindowGraphics {
    /// Binds a window to the graphics context: surface creation, negotiation,
    /// swapchain, depth buffer.
    pub unsafe fn bind(
        graphics: &GraphicsContext,
        window: &Window,
    ) -> Result<Self, GraphicsError> {
        let surface = PresentationSurface::create(&graphics.instance, window)
            .map_err(GraphicsError::into_presentation)?;
        Self::from_surface(graphics, window, surface)
    }

    /// Like [`bind`](Self::bind) but reuses an already-created surface (the
    /// bootstrap window's surface is created during queue resolution).
    pub unsafe fn from_surface(
        graphics: &GraphicsContext,
        window: &Window,
        mut surface: PresentationSurface,
    ) -> Result<Self, GraphicsError> {
        let size = window.inner_size();
        let negotiated = match surface.negotiate(
            &graphics.instance,
            graphics.physical_device,
            (size.width, size.height),
        ) {
            Ok(negotiated) => negotiated,
            Err(err) => {
                surface.destroy(&graphics.instance);
                return Err(err.into_presentation());
            }
        };

        let mut swapchain = match Swapchain::create(
            &graphics.device,
            &surface,
            &negotiated,
            vk::SwapchainKHR::null(),
        ) {
            Ok(swapchain) => swapchain,
            Err(err) => {
                surface.destroy(&graphics.instance);
                return Err(err.into_presentation());
            }
        };

        sync_window_extent(window, negotiated.extent);

        let depth = match DepthAttachment::provision(
            &graphics.instance,
            &graphics.device,
            graphics.physical_device,
            negotiated.extent,
        ) {
            Ok(depth) => depth,
            Err(err) => {
                swapchain.destroy(&graphics.device);
                surface.destroy(&graphics.instance);
                return Err(err.into_presentation());
            }
        };

        Ok(Self {
            surface,
            swapchain,
            depth,
        })
    }

    /// Re-negotiates against the window's current size and rebuilds the
    /// swapchain and depth buffer.
    ///
    /// The new swapchain references the old one and the old one is destroyed
    /// only after creation succeeds, so presentation is never interrupted; a
    /// failed creation leaves the previous swapchain intact.
    pub unsafe fn recreate(
        &mut self,
        graphics: &GraphicsContext,
        window: &Window,
    ) -> Result<(), GraphicsError> {
        graphics
            .device
            .device_wait_idle()
            .map_err(|err| GraphicsError::from(err).into_presentation())?;

        let size = window.inner_size();
        let negotiated = self
            .surface
            .negotiate(
                &graphics.instance,
                graphics.physical_device,
                (size.width, size.height),
            )
            .map_err(GraphicsError::into_presentation)?;

        let new_swapchain = Swapchain::create(
            &graphics.device,
            &self.surface,
            &negotiated,
            self.swapchain.swapchain,
        )
        .map_err(GraphicsError::into_presentation)?;

        let mut predecessor = std::mem::replace(&mut self.swapchain, new_swapchain);
        predecessor.destroy(&graphics.device);

        sync_window_extent(window, negotiated.extent);

        let new_depth = DepthAttachment::provision(
            &graphics.instance,
            &graphics.device,
            graphics.physical_device,
            negotiated.extent,
        )
        .map_err(GraphicsError::into_presentation)?;

        let mut old_depth = std::mem::replace(&mut self.depth, new_depth);
        old_depth.destroy(&graphics.device);

        Ok(())
    }

    /// Advances to the next presentable image; must be paired with a present.
    pub unsafe fn acquire_next(
        &mut self,
        graphics: &GraphicsContext,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<u32, GraphicsError> {
        self.swapchain.acquire_next(&graphics.device, semaphore, fence)
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent
    }

    pub fn image_count(&self) -> usize {
        self.swapchain.images.len()
    }

    /// Depth buffer, then swapchain (with its views), then the surface.
    pub unsafe fn destroy(&mut self, graphics: &GraphicsContext) {
        self.depth.destroy(&graphics.device);
        self.swapchain.destroy(&graphics.device);
        self.surface.destroy(&graphics.instance);
    }
}

/// When the surface dictates a concrete extent the window follows it, not
/// the other way around.
fn sync_window_extent(window: &Window, extent: vk::Extent2D) {
    let size = window.inner_size();
    if size.width != extent.width || size.height != extent.height {
        debug!(
            "Surface dictates {}x{}, resizing window to match.",
            extent.width, extent.height
        );
        let _ = window.request_inner_size(PhysicalSize::new(extent.width, extent.height));
    }
}
