//! Trigger words recovered from embedded metadata
//!
//! Used when the registry knows nothing about a file. Only a single tag is
//! recovered: the first entry of the highest-priority key present.

use crate::metadata::{MetaValue, Metadata, MetadataError, MetadataReader};
use lorastack_core::TagSet;
use std::path::Path;

/// Metadata keys consulted, highest priority first
pub const TRIGGER_KEYS: [&str; 3] = ["ss_training_tags", "tags", "trigger_words"];

/// Pick the fallback tag from already-read metadata.
///
/// A list contributes its first element; a string its first comma-delimited
/// token. The first string key found decides the result, even when its token
/// is blank (which yields no tag). Empty lists fall through to the next key.
pub fn fallback_tags(metadata: &Metadata) -> TagSet {
    for key in TRIGGER_KEYS {
        let first = match metadata.get(key) {
            Some(MetaValue::List(items)) => match items.first() {
                Some(item) => item.trim(),
                None => continue,
            },
            Some(MetaValue::Text(text)) => text.split(',').next().unwrap_or_default().trim(),
            None => continue,
        };
        if first.is_empty() {
            return TagSet::new();
        }
        return TagSet::from(vec![first.to_string()]);
    }
    TagSet::new()
}

/// Read a file's metadata and pick its fallback tag
pub fn read_fallback_tags(
    reader: &dyn MetadataReader,
    path: &Path,
) -> Result<TagSet, MetadataError> {
    let metadata = reader.read_metadata(path)?;
    Ok(fallback_tags(&metadata))
}
