//! Registry response types
//!
//! The registry answers `GET /model-versions/by-hash/{sha256}` with a model
//! version record. Only a handful of fields matter here; the rest are
//! ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Model version record returned by the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    /// Version identifier
    #[serde(default)]
    pub id: Option<u64>,
    /// Parent model identifier
    #[serde(default)]
    pub model_id: Option<u64>,
    /// Version name
    #[serde(default)]
    pub name: Option<String>,
    /// Base model family, e.g. "SDXL 1.0"
    #[serde(default)]
    pub base_model: Option<String>,
    /// Trigger words the adapter was trained on; `null` reads as none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trained_words: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ModelVersion {
    /// Create a record with only trigger words set
    pub fn with_trained_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trained_words: words.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLookup {
    /// The registry knows this hash
    Found(ModelVersion),
    /// The registry answered 404
    NotFound,
    /// Lookups are switched off
    Disabled,
    /// Transport, timeout, status or decode failure
    Failed(String),
}

impl RegistryLookup {
    /// Non-empty trained words, if the lookup found any
    pub fn trained_words(&self) -> Option<&[String]> {
        match self {
            Self::Found(version) if !version.trained_words.is_empty() => {
                Some(&version.trained_words)
            }
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_registry_payload() {
        let body = r#"{
            "id": 12345,
            "modelId": 678,
            "name": "v1.0",
            "baseModel": "SDXL 1.0",
            "trainedWords": ["cat", "dog"],
            "files": [{"name": "a.safetensors"}]
        }"#;
        let version: ModelVersion = serde_json::from_str(body).unwrap();

        assert_eq!(version.id, Some(12345));
        assert_eq!(version.model_id, Some(678));
        assert_eq!(version.base_model.as_deref(), Some("SDXL 1.0"));
        assert_eq!(version.trained_words, vec!["cat", "dog"]);
    }

    #[test]
    fn test_missing_trained_words() {
        let version: ModelVersion = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(version.trained_words.is_empty());

        let lookup = RegistryLookup::Found(version);
        assert!(lookup.trained_words().is_none());
    }

    #[test]
    fn test_null_trained_words() {
        let version: ModelVersion =
            serde_json::from_str(r#"{"id": 2, "trainedWords": null, "baseModel": null}"#).unwrap();
        assert!(version.trained_words.is_empty());
        assert!(version.base_model.is_none());
        assert!(RegistryLookup::Found(version).trained_words().is_none());
    }

    #[test]
    fn test_lookup_trained_words() {
        let lookup = RegistryLookup::Found(ModelVersion::with_trained_words(["a"]));
        assert_eq!(lookup.trained_words(), Some(&["a".to_string()][..]));
        assert!(RegistryLookup::NotFound.trained_words().is_none());
        assert!(RegistryLookup::Failed("x".into()).is_failure());
    }
}
