//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively; every other value in a higher tier replaces the
//! lower one. A null in a higher tier means "not specified" and keeps the
//! lower value.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// ```
/// use serde_json::json;
/// use taskbook::config::deep_merge;
///
/// let base = json!({"storage": {"db_path": "/a.db"}, "logging": {"level": "info"}});
/// let overlay = json!({"logging": {"level": "debug"}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"storage": {"db_path": "/a.db"}, "logging": {"level": "debug"}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers lowest first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_tier_overrides_single_key() {
        let defaults = json!({"logging": {"level": "info"}, "display": {"format": "text"}});
        let user = json!({"display": {"format": "json"}});
        assert_eq!(
            deep_merge(defaults, user),
            json!({"logging": {"level": "info"}, "display": {"format": "json"}})
        );
    }

    #[test]
    fn null_keeps_lower_tier() {
        let defaults = json!({"storage": {"db_path": "/tmp/a.db"}});
        let user = json!({"storage": {"db_path": null}});
        assert_eq!(deep_merge(defaults.clone(), user), defaults);
    }

    #[test]
    fn merge_all_applies_in_order() {
        let merged = deep_merge_all(vec![
            json!({"logging": {"level": "info"}}),
            json!({"logging": {"level": "warn"}}),
            json!({"logging": {"level": "debug"}}),
        ]);
        assert_eq!(merged, json!({"logging": {"level": "debug"}}));
    }
}
