//! Composed adapter stack

use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One adapter applied downstream: `(file, weight, 0.0)`
#[derive(Debug, Clone, PartialEq)]
pub struct StackEntry {
    /// File reference as shown to the user
    pub file_reference: String,
    /// Adapter strength
    pub weight: f64,
    /// Always 0.0; kept so hosts expecting the triple shape can consume it
    pub reserved: f64,
}

impl StackEntry {
    pub fn new(file_reference: impl Into<String>, weight: f64) -> Self {
        Self {
            file_reference: file_reference.into(),
            weight,
            reserved: 0.0,
        }
    }
}

// Hosts exchange stack entries as plain triples.
impl Serialize for StackEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.file_reference)?;
        tuple.serialize_element(&self.weight)?;
        tuple.serialize_element(&self.reserved)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for StackEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (file_reference, weight, reserved) = <(String, f64, f64)>::deserialize(deserializer)?;
        Ok(Self {
            file_reference,
            weight,
            reserved,
        })
    }
}

/// Ordered list of adapters, in slot order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoraStack {
    entries: Vec<StackEntry>,
}

impl LoraStack {
    /// Create an empty stack
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append an adapter
    pub fn push(&mut self, entry: StackEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// File references in stack order
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.file_reference.as_str())
            .collect()
    }
}
