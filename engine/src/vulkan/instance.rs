use std::ffi::CStr;
use std::os::raw::c_void;

use log::*;
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::ExtDebugUtilsExtension;
use vulkanalia::window as vk_window;
use winit::window::Window;

use super::capability;
use super::constants;
use super::context::ContextOptions;
use super::error::GraphicsError;

/// The created instance together with everything negotiated while creating
/// it: the enabled layer/extension name lists and the debug messenger (null
/// when diagnostics are off or the debug extension is absent).
#[derive(Debug)]
pub struct InstanceBundle {
    pub instance: Instance,
    pub messenger: vk::DebugUtilsMessengerEXT,
    pub enabled_layers: Vec<vk::ExtensionName>,
    pub enabled_extensions: Vec<vk::ExtensionName>,
}

pub unsafe fn create(
    entry: &Entry,
    window: &Window,
    options: &ContextOptions,
) -> Result<InstanceBundle, GraphicsError> {
    let application_info = vk::ApplicationInfo::builder()
        .application_name(b"Humble\0")
        .application_version(vk::make_version(1, 0, 0))
        .engine_name(b"Humble\0")
        .engine_version(vk::make_version(1, 0, 0))
        .api_version(vk::make_version(1, 0, 0));

    // Layers
    let enabled_layers: Vec<vk::ExtensionName> = if options.validation {
        let available = capability::probe_instance_layers(entry)?;
        capability::resolve_validation_layers(&available)?.to_vec()
    } else {
        Vec::new()
    };

    // Extensions: the windowing layer dictates the surface extensions, the
    // probe decides whether debug reporting can be added on top.
    let available_extensions = capability::probe_instance_extensions(entry)?;

    let mut enabled_extensions = Vec::new();
    for required in vk_window::get_required_instance_extensions(window) {
        if !available_extensions.contains(*required) {
            return Err(GraphicsError::Capability(format!(
                "platform surface extension {} is not supported",
                required
            )));
        }
        enabled_extensions.push(**required);
    }

    // Required by Vulkan SDK on macOS since 1.3.216.
    let flags = if cfg!(target_os = "macos")
        && entry.version()? >= constants::PORTABILITY_MACOS_VERSION
    {
        info!("Enabling extensions for macOS portability.");
        enabled_extensions.push(vk::KHR_GET_PHYSICAL_DEVICE_PROPERTIES2_EXTENSION.name);
        enabled_extensions.push(vk::KHR_PORTABILITY_ENUMERATION_EXTENSION.name);
        vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
    } else {
        vk::InstanceCreateFlags::empty()
    };

    let debug_enabled =
        options.validation && available_extensions.contains(&vk::EXT_DEBUG_UTILS_EXTENSION.name);
    if debug_enabled {
        enabled_extensions.push(vk::EXT_DEBUG_UTILS_EXTENSION.name);
    } else if options.validation {
        warn!("Debug reporting extension not present, driver diagnostics disabled.");
    }

    let layer_ptrs = enabled_layers.iter().map(|l| l.as_ptr()).collect::<Vec<_>>();
    let extension_ptrs = enabled_extensions
        .iter()
        .map(|e| e.as_ptr())
        .collect::<Vec<_>>();

    let mut info = vk::InstanceCreateInfo::builder()
        .application_info(&application_info)
        .enabled_layer_names(&layer_ptrs)
        .enabled_extension_names(&extension_ptrs)
        .flags(flags);

    let mut debug_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(vk::DebugUtilsMessageSeverityFlagsEXT::all())
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .user_callback(Some(debug_callback));

    if debug_enabled {
        info = info.push_next(&mut debug_info);
    }

    let instance = entry.create_instance(&info, None)?;

    let messenger = if debug_enabled {
        instance.create_debug_utils_messenger_ext(&debug_info, None)?
    } else {
        vk::DebugUtilsMessengerEXT::null()
    };

    Ok(InstanceBundle {
        instance,
        messenger,
        enabled_layers,
        enabled_extensions,
    })
}

/// Routes driver diagnostics into the log stream, severity for severity.
extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    type_: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _: *mut c_void,
) -> vk::Bool32 {
    let data = unsafe { *data };
    let message = unsafe { CStr::from_ptr(data.message) }.to_string_lossy();
    let code = data.message_id_number;

    if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        error!("({:?}) [{}] {}", type_, code, message);
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        warn!("({:?}) [{}] {}", type_, code, message);
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::INFO {
        debug!("({:?}) [{}] {}", type_, code, message);
    } else {
        trace!("({:?}) [{}] {}", type_, code, message);
    }

    // Do not bail out of the API call that triggered the report; the app
    // would die inside the driver without validation anyway.
    vk::FALSE
}
