//! Serialization helpers for fields the matching service may send as `null`.
//!
//! The metadata extractor behind the service emits `null` for attributes it
//! could not infer; those decode to the type's default value.

use serde::{Deserialize, Deserializer};

/// Deserialize `T`, mapping an explicit `null` to `T::default()`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::deserialize")]
        name: String,
        #[serde(default, deserialize_with = "super::deserialize")]
        tags: Vec<String>,
    }

    #[test]
    fn null_becomes_default() {
        let probe: Probe = serde_json::from_str(r#"{"name": null, "tags": null}"#).unwrap();
        assert_eq!(probe.name, "");
        assert!(probe.tags.is_empty());
    }

    #[test]
    fn present_values_pass_through() {
        let probe: Probe = serde_json::from_str(r#"{"name": "leather", "tags": ["a"]}"#).unwrap();
        assert_eq!(probe.name, "leather");
        assert_eq!(probe.tags, vec!["a".to_string()]);
    }

    #[test]
    fn missing_values_use_default() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.name, "");
        assert!(probe.tags.is_empty());
    }
}
