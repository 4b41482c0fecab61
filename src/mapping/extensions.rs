//! Extension mapper: `Extensions` ⇄ `KeyValues` through the registry.

use crate::error::{BindingError, BindingResult};
use crate::extensions::{ExtensionRegistry, Extensions};
use crate::mapping::KeyValues;
use crate::observability::metrics;

/// Flatten every extension into one key/value set.
///
/// Fails when an extension is not registered, or when two extensions would
/// write the same key (the registry prevents the latter at startup).
pub fn marshal(extensions: &Extensions, registry: &ExtensionRegistry) -> BindingResult<KeyValues> {
    let mut values = KeyValues::new();
    for extension in extensions.iter() {
        let entry = registry
            .get(extension.name())
            .ok_or_else(|| BindingError::UnregisteredExtension(extension.name().to_string()))?;
        let pairs = entry
            .marshal(extension)
            .ok_or_else(|| BindingError::UnregisteredExtension(extension.name().to_string()))?;

        for (key, value) in pairs {
            if values.contains_key(&key) {
                return Err(BindingError::ExtensionCollision {
                    header: key.clone(),
                    key,
                });
            }
            values.insert(key, value);
        }
    }
    Ok(values)
}

/// Split a key/value set into the groups owned by each registered extension.
///
/// Keys no extension owns are dropped. Extensions with no key present get no
/// group.
pub fn group(values: &KeyValues, registry: &ExtensionRegistry) -> Vec<(&'static str, KeyValues)> {
    registry
        .entries()
        .filter_map(|entry| {
            let owned: KeyValues = entry
                .keys()
                .iter()
                .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
                .collect();
            (!owned.is_empty()).then_some((entry.name(), owned))
        })
        .collect()
}

/// Rebuild typed extensions from a key/value set.
///
/// Unknown keys are ignored; a registered extension with a malformed value
/// is skipped with a warning.
pub fn unmarshal(values: &KeyValues, registry: &ExtensionRegistry) -> Extensions {
    let mut extensions = Extensions::new();
    for (name, owned) in group(values, registry) {
        let Some(entry) = registry.get(name) else {
            continue;
        };
        match entry.unmarshal(&owned) {
            Ok(Some(extension)) => extensions.insert_boxed(extension),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(extension = name, error = %e, "Skipping malformed extension");
                metrics::record_extension_skipped(name);
            }
        }
    }
    extensions
}
