use log::*;
use vulkanalia::loader::{LibloadingLoader, LIBRARY};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::ExtDebugUtilsExtension;
use winit::window::Window;

use super::device::{self, QueueSelection};
use super::error::GraphicsError;
use super::instance::{self, InstanceBundle};
use super::surface::PresentationSurface;

#[derive(Copy, Clone, Debug)]
pub struct ContextOptions {
    /// Enables the validation layer set and driver diagnostics. A missing
    /// validation layer set then fails the bootstrap.
    pub validation: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            validation: cfg!(debug_assertions),
        }
    }
}

/// The process-wide GPU connection: instance, selected physical device,
/// logical device and the single graphics+present queue.
///
/// Created once, passed by reference everywhere, destroyed after every
/// window's presentation state is gone.
#[derive(Debug)]
pub struct GraphicsContext {
    _entry: Entry,
    pub instance: Instance,
    messenger: vk::DebugUtilsMessengerEXT,
    pub physical_device: vk::PhysicalDevice,
    pub device: Device,
    pub queue: vk::Queue,
    pub queue_family_index: u32,
    pub enabled_layers: Vec<vk::ExtensionName>,
    pub enabled_extensions: Vec<vk::ExtensionName>,
}

impl GraphicsContext {
    /// Bootstraps the GPU connection against `window`.
    ///
    /// Queue resolution needs a live surface to test present support, so the
    /// bootstrap window's surface is created mid-sequence and returned for
    /// reuse. On failure everything created so far is torn down; no partial
    /// context escapes.
    pub unsafe fn new(
        window: &Window,
        options: &ContextOptions,
    ) -> Result<(Self, PresentationSurface), GraphicsError> {
        let loader = LibloadingLoader::new(LIBRARY)
            .map_err(|err| GraphicsError::Loader(err.to_string()))?;
        let entry = Entry::new(loader).map_err(|err| GraphicsError::Loader(err.to_string()))?;

        let bundle = instance::create(&entry, window, options)?;

        match Self::bootstrap_device(&entry, &bundle, window) {
            Ok((physical_device, selection, surface, device, queue)) => {
                info!(
                    "Graphics context ready (queue family {}).",
                    selection.family_index
                );
                let InstanceBundle {
                    instance,
                    messenger,
                    enabled_layers,
                    enabled_extensions,
                } = bundle;
                Ok((
                    Self {
                        _entry: entry,
                        instance,
                        messenger,
                        physical_device,
                        device,
                        queue,
                        queue_family_index: selection.family_index,
                        enabled_layers,
                        enabled_extensions,
                    },
                    surface,
                ))
            }
            Err(err) => {
                error!("Graphics context bootstrap failed: {}", err);
                if !bundle.messenger.is_null() {
                    bundle
                        .instance
                        .destroy_debug_utils_messenger_ext(bundle.messenger, None);
                }
                bundle.instance.destroy_instance(None);
                Err(err)
            }
        }
    }

    unsafe fn bootstrap_device(
        entry: &Entry,
        bundle: &InstanceBundle,
        window: &Window,
    ) -> Result<
        (
            vk::PhysicalDevice,
            QueueSelection,
            PresentationSurface,
            Device,
            vk::Queue,
        ),
        GraphicsError,
    > {
        let physical_device = device::pick_physical_device(&bundle.instance)?;

        let mut surface = PresentationSurface::create(&bundle.instance, window)?;

        let rest: Result<(QueueSelection, Device, vk::Queue), GraphicsError> = (|| {
            let selection =
                QueueSelection::query(&bundle.instance, physical_device, surface.surface)?;
            let (device, queue) = device::create_logical_device(
                entry,
                &bundle.instance,
                physical_device,
                selection,
                &bundle.enabled_layers,
            )?;
            Ok((selection, device, queue))
        })();

        match rest {
            Ok((selection, device, queue)) => {
                Ok((physical_device, selection, surface, device, queue))
            }
            Err(err) => {
                surface.destroy(&bundle.instance);
                Err(err)
            }
        }
    }

    /// Destroys the device and instance. All window-level resources must be
    /// gone by the time this runs.
    pub unsafe fn destroy(&mut self) {
        self.device.destroy_device(None);
        if !self.messenger.is_null() {
            self.instance
                .destroy_debug_utils_messenger_ext(self.messenger, None);
        }
        self.instance.destroy_instance(None);
    }
}
