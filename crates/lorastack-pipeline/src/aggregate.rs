//! Aggregation of resolved slots into the node outputs

use crate::resolve::ResolvedSlot;
use lorastack_core::{LoraStack, SlotReport, TagSet, UiPayload};
use serde::{Deserialize, Serialize};

/// Everything the node hands downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOutput<M, C> {
    /// Model handle, passed through unchanged
    pub model: M,
    /// Text-encoder handle, passed through unchanged
    pub clip: C,
    /// Adapters in slot order
    pub stack: LoraStack,
    /// Chosen trigger words of every slot, in slot order
    pub selected_tags: Vec<String>,
    /// `selected_tags` joined with `", "`
    pub selected_tags_string: String,
    /// Display names of the stacked files
    pub lora_names: Vec<String>,
    /// Checkbox groups for the presentation layer
    pub ui: UiPayload,
    /// Per-slot diagnostics
    pub reports: Vec<SlotReport>,
}

/// Collects resolved slots in the order they are added
#[derive(Debug, Default)]
pub struct Aggregator {
    stack: LoraStack,
    selected: TagSet,
    names: Vec<String>,
    ui: UiPayload,
    reports: Vec<SlotReport>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one slot's results
    pub fn add(&mut self, slot: ResolvedSlot) {
        self.ui.insert(slot.index, slot.ui_choice());
        self.stack.push(slot.entry);
        self.names.push(slot.display_name);
        for tag in slot.chosen {
            self.selected.push(tag);
        }
        self.reports.push(slot.report);
    }

    /// Number of slots added so far
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Assemble the outputs around the passthrough handles
    pub fn finish<M, C>(self, model: M, clip: C) -> StackOutput<M, C> {
        StackOutput {
            model,
            clip,
            stack: self.stack,
            selected_tags_string: self.selected.joined(),
            selected_tags: self.selected.into_vec(),
            lora_names: self.names,
            ui: self.ui,
            reports: self.reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorastack_core::StackEntry;

    fn resolved(index: usize, file: &str, chosen: &[&str]) -> ResolvedSlot {
        ResolvedSlot {
            index,
            entry: StackEntry::new(file, 1.0),
            display_name: file.to_string(),
            candidates: TagSet::from(chosen),
            chosen: TagSet::from(chosen),
            report: SlotReport::new(index, file),
        }
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let mut agg = Aggregator::new();
        agg.add(resolved(1, "a.safetensors", &["cat", "dog"]));
        agg.add(resolved(3, "c.safetensors", &["dog", "bird"]));
        assert_eq!(agg.len(), 2);

        let out = agg.finish((), ());
        assert_eq!(out.selected_tags, vec!["cat", "dog", "dog", "bird"]);
        assert_eq!(out.selected_tags_string, "cat, dog, dog, bird");
        assert_eq!(out.lora_names, vec!["a.safetensors", "c.safetensors"]);
        assert!(out.ui.get(1).is_some());
        assert!(out.ui.get(2).is_none());
        assert!(out.ui.get(3).is_some());
    }

    #[test]
    fn test_empty_finish() {
        let out = Aggregator::new().finish("model", "clip");
        assert_eq!(out.model, "model");
        assert!(out.stack.is_empty());
        assert!(out.selected_tags.is_empty());
        assert_eq!(out.selected_tags_string, "");
        assert!(out.ui.is_empty());
    }
}
