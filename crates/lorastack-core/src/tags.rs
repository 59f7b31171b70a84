//! Trigger-word tag sets and prior selections

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator used when tags are shown as one string
pub const TAG_SEPARATOR: &str = ", ";

/// Ordered list of trigger words
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a comma-delimited selection, trimming and dropping empty items
    pub fn parse_selection(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn push(&mut self, tag: impl Into<String>) {
        self.0.push(tag.into());
    }

    /// Join with `", "`
    pub fn joined(&self) -> String {
        self.0.join(TAG_SEPARATOR)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl<'a> From<&[&'a str]> for TagSet {
    fn from(tags: &[&'a str]) -> Self {
        Self(tags.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Trigger words the user picked on a previous run, keyed by 1-based slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorSelections(BTreeMap<usize, String>);

impl PriorSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw selection string for a slot
    pub fn with(mut self, index: usize, selection: impl Into<String>) -> Self {
        self.insert(index, selection);
        self
    }

    pub fn insert(&mut self, index: usize, selection: impl Into<String>) {
        self.0.insert(index, selection.into());
    }

    /// Collect selections from the host's extra arguments.
    ///
    /// The presentation layer stores each slot's choice in a hidden
    /// `lora{i}_selected` widget; every other key is ignored.
    pub fn from_extra_args<'a, I>(args: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let selections = args
            .into_iter()
            .filter_map(|(key, value)| {
                let index = key
                    .strip_prefix("lora")?
                    .strip_suffix("_selected")?
                    .parse::<usize>()
                    .ok()?;
                Some((index, value.to_string()))
            })
            .collect();
        Self(selections)
    }

    /// Parsed selection for a slot; empty when nothing usable was carried over
    pub fn for_slot(&self, index: usize) -> TagSet {
        self.0
            .get(&index)
            .map(|raw| TagSet::parse_selection(raw))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Name of the hidden widget carrying a slot's selection
pub fn selection_field(index: usize) -> String {
    format!("lora{index}_selected")
}
