//! Per-slot resolution reports
//!
//! Failures while resolving a slot never abort the run. They are recorded
//! here so callers can tell "no trigger words exist" apart from "the lookup
//! failed".

use serde::{Deserialize, Serialize};

/// Where a set of trigger words came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    /// Registry `trainedWords`
    Registry,
    /// Embedded file metadata
    Metadata,
    /// The user's selection from the previous run
    Selection,
    /// Nothing found
    None,
}

/// A failure absorbed while resolving a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SlotIssue {
    /// The storage resolver had no path for the file
    PathUnresolved,
    /// Reading the file for hashing failed
    HashFailed(String),
    /// Registry request failed (transport, timeout, status or decode)
    RegistryFailed(String),
    /// Registry has no entry for the hash
    RegistryMissing,
    /// Embedded metadata could not be read
    MetadataFailed(String),
}

/// Outcome of resolving one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReport {
    /// 1-based slot index
    pub index: usize,
    /// Display name of the file
    pub file: String,
    /// Content hash, when the file could be read
    pub sha256: Option<String>,
    /// Origin of the chosen trigger words
    pub source: TagSource,
    /// Origin of the candidates offered for selection (never `Selection`)
    pub candidate_source: TagSource,
    /// Absorbed failures, in the order they happened
    pub issues: Vec<SlotIssue>,
}

impl SlotReport {
    pub fn new(index: usize, file: impl Into<String>) -> Self {
        Self {
            index,
            file: file.into(),
            sha256: None,
            source: TagSource::None,
            candidate_source: TagSource::None,
            issues: Vec::new(),
        }
    }

    /// Record where the candidates came from; chosen tags follow them
    pub fn set_candidate_source(&mut self, source: TagSource) {
        self.candidate_source = source;
        self.source = source;
    }

    /// Mark the chosen tags as carried over from a prior selection
    pub fn mark_selection(&mut self) {
        self.source = TagSource::Selection;
    }

    /// Record an absorbed failure
    pub fn add_issue(&mut self, issue: SlotIssue) {
        self.issues.push(issue);
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether any lookup actually failed (as opposed to finding nothing)
    pub fn has_failures(&self) -> bool {
        self.issues.iter().any(|issue| {
            matches!(
                issue,
                SlotIssue::HashFailed(_) | SlotIssue::RegistryFailed(_) | SlotIssue::MetadataFailed(_)
            )
        })
    }
}
