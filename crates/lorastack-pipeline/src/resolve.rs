//! Per-slot resolution
//!
//! Turns one active slot into a stack entry plus its candidate and chosen
//! trigger words. Every external failure is absorbed into the slot's
//! [`SlotReport`]; resolution itself cannot fail.

use lorastack_api::{RegistryClient, RegistryLookup};
use lorastack_core::{
    LORA_CATEGORY, PriorSelections, Slot, SlotIssue, SlotReport, StackEntry, TagSet, TagSource,
    UiChoice,
};
use lorastack_lora::{MetadataReader, StorageResolver, read_fallback_tags, sha256_file};
use std::path::Path;
use tracing::{debug, warn};

/// A fully resolved slot
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSlot {
    /// 1-based slot index
    pub index: usize,
    /// Adapter to apply
    pub entry: StackEntry,
    /// File name as shown to the user
    pub display_name: String,
    /// Every trigger word found for the file
    pub candidates: TagSet,
    /// Trigger words passed downstream
    pub chosen: TagSet,
    /// What happened along the way
    pub report: SlotReport,
}

impl ResolvedSlot {
    /// Checkbox group for the presentation layer
    pub fn ui_choice(&self) -> UiChoice {
        UiChoice::new(self.index, self.candidates.clone(), self.chosen.clone())
    }
}

/// Collapse doubled backslashes left over from escaped host strings
pub fn display_name(file_reference: &str) -> String {
    file_reference.replace("\\\\", "\\")
}

/// Resolves slots against storage, the registry and embedded metadata
pub struct SlotResolver<'a> {
    storage: &'a dyn StorageResolver,
    metadata: &'a dyn MetadataReader,
    registry: &'a dyn RegistryClient,
}

impl<'a> SlotResolver<'a> {
    pub fn new(
        storage: &'a dyn StorageResolver,
        metadata: &'a dyn MetadataReader,
        registry: &'a dyn RegistryClient,
    ) -> Self {
        Self {
            storage,
            metadata,
            registry,
        }
    }

    /// Resolve one active slot
    pub async fn resolve(&self, slot: &Slot, prior: &PriorSelections) -> ResolvedSlot {
        let name = display_name(&slot.file_reference);
        let mut report = SlotReport::new(slot.index, name.clone());

        let candidates = self.candidate_tags(slot, &mut report).await;

        let selection = prior.for_slot(slot.index);
        let chosen = if selection.is_empty() {
            candidates.clone()
        } else {
            report.mark_selection();
            selection
        };

        debug!(
            slot = slot.index,
            file = %name,
            source = ?report.source,
            candidates = candidates.len(),
            chosen = chosen.len(),
            "Slot resolved"
        );

        ResolvedSlot {
            index: slot.index,
            entry: StackEntry::new(name.clone(), slot.weight),
            display_name: name,
            candidates,
            chosen,
            report,
        }
    }

    /// Registry trigger words, falling back to embedded metadata
    async fn candidate_tags(&self, slot: &Slot, report: &mut SlotReport) -> TagSet {
        let Some(path) = self
            .storage
            .resolve_path(LORA_CATEGORY, &slot.file_reference)
        else {
            warn!(slot = slot.index, file = %slot.file_reference, "LoRA file not found");
            report.add_issue(SlotIssue::PathUnresolved);
            return TagSet::new();
        };

        if let Some(words) = self.registry_tags(&path, report).await {
            report.set_candidate_source(TagSource::Registry);
            return words;
        }

        match read_fallback_tags(self.metadata, &path) {
            Ok(tags) if !tags.is_empty() => {
                report.set_candidate_source(TagSource::Metadata);
                tags
            }
            Ok(tags) => tags,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Metadata read failed");
                report.add_issue(SlotIssue::MetadataFailed(e.to_string()));
                TagSet::new()
            }
        }
    }

    async fn registry_tags(&self, path: &Path, report: &mut SlotReport) -> Option<TagSet> {
        let owned = path.to_path_buf();
        let hashed = tokio::task::spawn_blocking(move || sha256_file(&owned))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result.map_err(|e| e.to_string()));
        let hash = match hashed {
            Ok(hash) => hash.to_hex(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Hashing failed");
                report.add_issue(SlotIssue::HashFailed(e));
                return None;
            }
        };
        report.sha256 = Some(hash.clone());

        let lookup = self.registry.lookup(&hash).await;
        if let Some(words) = lookup.trained_words() {
            return Some(TagSet::from(words.to_vec()));
        }

        match lookup {
            RegistryLookup::NotFound => report.add_issue(SlotIssue::RegistryMissing),
            RegistryLookup::Failed(reason) => report.add_issue(SlotIssue::RegistryFailed(reason)),
            RegistryLookup::Found(_) | RegistryLookup::Disabled => {}
        }
        None
    }
}
