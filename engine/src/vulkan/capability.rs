use std::collections::HashSet;

use log::*;
use vulkanalia::prelude::v1_0::*;

use super::constants;
use super::error::GraphicsError;

/// Enumerates the instance layers the loader knows about.
///
/// The count-then-data handshake (including retrying `VK_INCOMPLETE` when the
/// set changes between the two calls) happens inside vulkanalia; we only fold
/// the result into a set.
pub unsafe fn probe_instance_layers(entry: &Entry) -> Result<HashSet<vk::ExtensionName>, GraphicsError> {
    let layers = entry
        .enumerate_instance_layer_properties()?
        .iter()
        .map(|l| l.layer_name)
        .collect::<HashSet<_>>();
    debug!("Probed {} instance layers.", layers.len());
    Ok(layers)
}

pub unsafe fn probe_instance_extensions(
    entry: &Entry,
) -> Result<HashSet<vk::ExtensionName>, GraphicsError> {
    let extensions = entry
        .enumerate_instance_extension_properties(None)?
        .iter()
        .map(|e| e.extension_name)
        .collect::<HashSet<_>>();
    debug!("Probed {} instance extensions.", extensions.len());
    Ok(extensions)
}

pub unsafe fn probe_device_extensions(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<HashSet<vk::ExtensionName>, GraphicsError> {
    let extensions = instance
        .enumerate_device_extension_properties(physical_device, None)?
        .iter()
        .map(|e| e.extension_name)
        .collect::<HashSet<_>>();
    debug!("Probed {} device extensions.", extensions.len());
    Ok(extensions)
}

/// Picks the validation layer set to enable.
///
/// The bundled layer wins when present; otherwise every component layer of
/// the fallback list must be available. Validation is mandatory once
/// requested, so an unusable set aborts the bootstrap.
pub fn resolve_validation_layers(
    available: &HashSet<vk::ExtensionName>,
) -> Result<&'static [vk::ExtensionName], GraphicsError> {
    if constants::BUNDLED_VALIDATION_LAYERS
        .iter()
        .all(|l| available.contains(l))
    {
        return Ok(&constants::BUNDLED_VALIDATION_LAYERS);
    }

    if constants::COMPONENT_VALIDATION_LAYERS
        .iter()
        .all(|l| available.contains(l))
    {
        info!("Bundled validation layer not found, using component layers.");
        return Ok(&constants::COMPONENT_VALIDATION_LAYERS);
    }

    Err(GraphicsError::Capability(
        "validation requested but no usable validation layer set is installed".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(names: &[vk::ExtensionName]) -> HashSet<vk::ExtensionName> {
        names.iter().copied().collect()
    }

    #[test]
    fn bundled_layer_preferred() {
        let mut available = set_of(&constants::COMPONENT_VALIDATION_LAYERS);
        available.insert(constants::BUNDLED_VALIDATION_LAYERS[0]);

        let resolved = resolve_validation_layers(&available).unwrap();
        assert_eq!(resolved, &constants::BUNDLED_VALIDATION_LAYERS[..]);
    }

    #[test]
    fn falls_back_to_component_layers() {
        let available = set_of(&constants::COMPONENT_VALIDATION_LAYERS);

        let resolved = resolve_validation_layers(&available).unwrap();
        assert_eq!(resolved, &constants::COMPONENT_VALIDATION_LAYERS[..]);
    }

    #[test]
    fn partial_component_set_is_rejected() {
        let available = set_of(&constants::COMPONENT_VALIDATION_LAYERS[1..]);

        assert!(matches!(
            resolve_validation_layers(&available),
            Err(GraphicsError::Capability(_))
        ));
    }

    #[test]
    fn empty_layer_list_is_rejected() {
        assert!(matches!(
            resolve_validation_layers(&HashSet::new()),
            Err(GraphicsError::Capability(_))
        ));
    }
}
