//! Deep merge of a partial config value onto a base value.

use super::{ConfigMap, ConfigValue};

/// Merges `overlay` onto `base` and returns the result as a new tree.
///
/// Mappings are merged key by key, recursively. Anything else in the
/// overlay (scalars, arrays, `null`) replaces the base value at that
/// position. Keys are never deleted.
pub fn merge(base: &ConfigValue, overlay: &ConfigValue) -> ConfigValue {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay.clone());
    merged
}

/// In-place form of [`merge`].
pub fn merge_into(base: &mut ConfigValue, overlay: ConfigValue) {
    match (base, overlay) {
        (ConfigValue::Object(base_map), ConfigValue::Object(overlay_map)) => {
            deep_merge(base_map, overlay_map);
        }
        (base, overlay) => *base = overlay,
    }
}

/// Recursively merges `overlay` into `base`; nested mappings merge, other values replace.
fn deep_merge(base: &mut ConfigMap, overlay: ConfigMap) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(ConfigValue::Object(base_map)), ConfigValue::Object(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merges `value` at a dotted position inside `map`, creating intermediate
/// mappings as needed. A non-mapping sitting on the path is replaced.
pub(crate) fn merge_at_path(map: &mut ConfigMap, path: &[String], value: ConfigValue) {
    let Some((first, rest)) = path.split_first() else {
        if let ConfigValue::Object(overlay) = value {
            deep_merge(map, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match map.get_mut(first) {
            Some(existing) => merge_into(existing, value),
            None => {
                map.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(map.get(first), Some(ConfigValue::Object(_))) {
        map.insert(first.clone(), ConfigValue::Object(ConfigMap::new()));
    }

    if let Some(ConfigValue::Object(nested)) = map.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}
