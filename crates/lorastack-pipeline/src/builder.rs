//! Stack builder orchestration

use crate::aggregate::{Aggregator, StackOutput};
use crate::config::BuilderConfig;
use crate::resolve::SlotResolver;
use lorastack_api::{HttpRegistry, RegistryClient, RegistryError};
use lorastack_core::{
    LORA_CATEGORY, NodeSchema, PriorSelections, SlotCount, SlotInput, SlotInputs,
};
use lorastack_lora::{LoraFolders, MetadataReader, SafetensorsReader, StorageResolver};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{Instrument, Level, debug, info, span};

/// Builder errors
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Registry client: {0}")]
    Registry(#[from] RegistryError),
}

/// One invocation's inputs, apart from the passthrough handles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackRequest {
    /// Effective slot count
    pub count: SlotCount,
    /// The six form groups
    pub slots: SlotInputs,
    /// Trigger words picked on the previous run
    pub prior: PriorSelections,
}

impl StackRequest {
    /// Create a request from the host's raw slot count selector
    pub fn new(count: &str, slots: SlotInputs) -> Self {
        Self {
            count: SlotCount::parse(count),
            slots,
            prior: PriorSelections::new(),
        }
    }

    /// Set one slot group
    pub fn slot(mut self, index: usize, input: SlotInput) -> Self {
        self.slots = self.slots.with_slot(index, input);
        self
    }

    /// Carry over a slot's previous selection
    pub fn selected(mut self, index: usize, selection: impl Into<String>) -> Self {
        self.prior.insert(index, selection);
        self
    }

    /// Replace all prior selections
    pub fn with_prior(mut self, prior: PriorSelections) -> Self {
        self.prior = prior;
        self
    }
}

/// Builds LoRA stacks and trigger-word lists
pub struct StackBuilder {
    storage: Box<dyn StorageResolver>,
    metadata: Box<dyn MetadataReader>,
    registry: Box<dyn RegistryClient>,
}

impl StackBuilder {
    /// Create from explicit collaborators
    pub fn new(
        storage: impl StorageResolver + 'static,
        metadata: impl MetadataReader + 'static,
        registry: impl RegistryClient + 'static,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            metadata: Box::new(metadata),
            registry: Box::new(registry),
        }
    }

    /// Create with folder storage, safetensors metadata and the HTTP registry
    pub fn from_config(config: &BuilderConfig) -> Result<Self, BuilderError> {
        info!(
            registry = %config.registry.base_url,
            online = config.registry.enabled,
            folders = config.folders.lora_dirs.len(),
            "Creating stack builder"
        );

        Ok(Self::new(
            LoraFolders::from_config(&config.folders),
            SafetensorsReader::new(),
            HttpRegistry::new(config.registry.clone())?,
        ))
    }

    /// Swap the storage resolver
    pub fn with_storage(mut self, storage: impl StorageResolver + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    /// Swap the metadata reader
    pub fn with_metadata_reader(mut self, metadata: impl MetadataReader + 'static) -> Self {
        self.metadata = Box::new(metadata);
        self
    }

    /// Swap the registry client
    pub fn with_registry(mut self, registry: impl RegistryClient + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    /// LoRA files the storage resolver can see
    pub fn available_files(&self) -> Vec<String> {
        self.storage.list_available(LORA_CATEGORY)
    }

    /// Form description for the host
    pub fn schema(&self) -> NodeSchema {
        NodeSchema::describe(&self.available_files())
    }

    /// Resolver borrowing this builder's collaborators
    pub fn resolver(&self) -> SlotResolver<'_> {
        SlotResolver::new(
            self.storage.as_ref(),
            self.metadata.as_ref(),
            self.registry.as_ref(),
        )
    }

    /// Run one invocation
    pub async fn build<M, C>(&self, model: M, clip: C, request: &StackRequest) -> StackOutput<M, C> {
        let span = span!(Level::DEBUG, "build_stack", count = request.count.get());

        async move {
            let start = Instant::now();
            let resolver = self.resolver();
            let mut aggregator = Aggregator::new();

            for slot in request.slots.normalize() {
                if !slot.is_active(request.count) {
                    debug!(slot = slot.index, "Skipping slot");
                    continue;
                }
                aggregator.add(resolver.resolve(&slot, &request.prior).await);
            }

            let output = aggregator.finish(model, clip);
            info!(
                loras = output.stack.len(),
                tags = output.selected_tags.len(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Stack built"
            );
            output
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorastack_api::{MockRegistry, ModelVersion};
    use lorastack_core::{NO_LORAS_PLACEHOLDER, SlotIssue, StackEntry, TagSource};
    use lorastack_lora::metadata::encode_header;
    use lorastack_lora::sha256_file;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    /// Write a header-only LoRA file and return its hash
    fn write_lora(dir: &Path, name: &str, meta: &[(&str, &str)]) -> String {
        let meta: BTreeMap<String, String> = meta
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, encode_header(&meta)).unwrap();
        sha256_file(&path).unwrap().to_hex()
    }

    fn builder(dir: &Path, registry: MockRegistry) -> StackBuilder {
        let mut folders = LoraFolders::new();
        folders.add_folder(LORA_CATEGORY, dir);
        StackBuilder::new(folders, SafetensorsReader::new(), registry)
    }

    #[tokio::test]
    async fn test_single_slot_with_registry_words() {
        let dir = TempDir::new().unwrap();
        let hash = write_lora(dir.path(), "a.safetensors", &[]);
        let registry = MockRegistry::new()
            .with_version(&hash, ModelVersion::with_trained_words(["cat", "dog"]));

        let request = StackRequest::new("3", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 0.8));
        let out = builder(dir.path(), registry)
            .build("model", "clip", &request)
            .await;

        assert_eq!(out.model, "model");
        assert_eq!(out.clip, "clip");
        assert_eq!(out.stack.entries(), &[StackEntry::new("a.safetensors", 0.8)]);
        assert_eq!(out.selected_tags, vec!["cat", "dog"]);
        assert_eq!(out.selected_tags_string, "cat, dog");
        assert_eq!(out.lora_names, vec!["a.safetensors"]);

        let choice = out.ui.get(1).unwrap();
        assert_eq!(choice.choices.as_slice(), ["cat", "dog"]);
        assert_eq!(choice.selected, choice.choices);
    }

    #[tokio::test]
    async fn test_prior_selection_wins() {
        let dir = TempDir::new().unwrap();
        let hash = write_lora(dir.path(), "a.safetensors", &[]);
        let registry = MockRegistry::new()
            .with_version(&hash, ModelVersion::with_trained_words(["cat", "dog"]));

        let request = StackRequest::new("3", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 0.8))
            .selected(1, "dog");
        let out = builder(dir.path(), registry).build((), (), &request).await;

        assert_eq!(out.selected_tags, vec!["dog"]);
        let choice = out.ui.get(1).unwrap();
        assert_eq!(choice.choices.as_slice(), ["cat", "dog"]);
        assert_eq!(choice.selected.as_slice(), ["dog"]);
    }

    #[tokio::test]
    async fn test_placeholder_slot_skipped() {
        let dir = TempDir::new().unwrap();
        let registry = MockRegistry::new();

        let request = StackRequest::new("6", SlotInputs::default())
            .slot(1, SlotInput::enabled(NO_LORAS_PLACEHOLDER, 1.0));
        let out = builder(dir.path(), registry).build((), (), &request).await;

        assert!(out.stack.is_empty());
        assert!(out.selected_tags.is_empty());
        assert_eq!(out.selected_tags_string, "");
        assert!(out.lora_names.is_empty());
        assert!(out.ui.is_empty());
        assert!(out.reports.is_empty());
    }

    #[tokio::test]
    async fn test_count_and_enabled_limit_processing() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d"] {
            write_lora(dir.path(), &format!("{name}.safetensors"), &[("tags", name)]);
        }
        let registry = MockRegistry::new();

        let mut disabled = SlotInput::enabled("b.safetensors", 1.0);
        disabled.enabled = false;
        let request = StackRequest::new("3", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 1.0))
            .slot(2, disabled)
            .slot(3, SlotInput::enabled("c.safetensors", 1.0))
            .slot(4, SlotInput::enabled("d.safetensors", 1.0));
        let out = builder(dir.path(), registry).build((), (), &request).await;

        assert_eq!(out.lora_names, vec!["a.safetensors", "c.safetensors"]);
        assert_eq!(out.selected_tags, vec!["a", "c"]);
        assert_eq!(out.ui.len(), 2);
    }

    #[tokio::test]
    async fn test_non_numeric_count_processes_first_slot_only() {
        let dir = TempDir::new().unwrap();
        write_lora(dir.path(), "a.safetensors", &[]);
        write_lora(dir.path(), "b.safetensors", &[]);

        let request = StackRequest::new("many", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 1.0))
            .slot(2, SlotInput::enabled("b.safetensors", 1.0));
        let out = builder(dir.path(), MockRegistry::new())
            .build((), (), &request)
            .await;

        assert_eq!(out.lora_names, vec!["a.safetensors"]);
    }

    #[tokio::test]
    async fn test_slot_order_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let first = write_lora(dir.path(), "first.safetensors", &[]);
        let second = write_lora(dir.path(), "second.safetensors", &[("x", "y")]);
        let registry = MockRegistry::new()
            .with_version(&first, ModelVersion::with_trained_words(["b", "a"]))
            .with_version(&second, ModelVersion::with_trained_words(["a", "c"]));

        let request = StackRequest::new("6", SlotInputs::default())
            .slot(5, SlotInput::enabled("first.safetensors", 1.0))
            .slot(2, SlotInput::enabled("second.safetensors", -1.0));
        let out = builder(dir.path(), registry).build((), (), &request).await;

        assert_eq!(out.lora_names, vec!["second.safetensors", "first.safetensors"]);
        assert_eq!(out.selected_tags, vec!["a", "c", "b", "a"]);
        assert_eq!(out.selected_tags_string, out.selected_tags.join(", "));
    }

    #[tokio::test]
    async fn test_registry_failure_without_metadata() {
        let dir = TempDir::new().unwrap();
        let hash = write_lora(dir.path(), "a.safetensors", &[]);
        let registry = MockRegistry::new().with_failure(&hash);

        let request = StackRequest::new("1", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 1.0));
        let out = builder(dir.path(), registry).build((), (), &request).await;

        assert_eq!(out.stack.len(), 1);
        assert!(out.selected_tags.is_empty());
        assert!(out.ui.get(1).unwrap().choices.is_empty());

        let report = &out.reports[0];
        assert_eq!(report.source, TagSource::None);
        assert_eq!(
            report.issues,
            vec![SlotIssue::RegistryFailed("mock failure".to_string())]
        );
    }

    #[tokio::test]
    async fn test_escaped_backslashes_in_names() {
        let dir = TempDir::new().unwrap();
        write_lora(dir.path(), "style/a.safetensors", &[("tags", "ink")]);

        let request = StackRequest::new("1", SlotInputs::default())
            .slot(1, SlotInput::enabled("style\\\\a.safetensors", 1.0));
        let out = builder(dir.path(), MockRegistry::new())
            .build((), (), &request)
            .await;

        assert_eq!(out.lora_names, vec!["style\\a.safetensors"]);
        assert_eq!(out.selected_tags, vec!["ink"]);
    }

    #[tokio::test]
    async fn test_output_serializes_for_host() {
        let dir = TempDir::new().unwrap();
        write_lora(dir.path(), "a.safetensors", &[("tags", "ink")]);

        let request = StackRequest::new("1", SlotInputs::default())
            .slot(1, SlotInput::enabled("a.safetensors", 0.5));
        let out = builder(dir.path(), MockRegistry::new())
            .build("m", "c", &request)
            .await;

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["stack"], serde_json::json!([["a.safetensors", 0.5, 0.0]]));
        assert_eq!(json["ui"]["lora1_triggers"]["anchor"], "lora1_weight");
    }

    #[test]
    fn test_schema_lists_available_files() {
        let dir = TempDir::new().unwrap();
        write_lora(dir.path(), "a.safetensors", &[]);

        let schema = builder(dir.path(), MockRegistry::new()).schema();
        let field = schema.field("lora1_file").unwrap();
        assert_eq!(
            field.kind,
            lorastack_core::InputKind::Choice {
                options: vec!["a.safetensors".to_string()]
            }
        );
    }

    #[test]
    fn test_from_config() {
        let builder = StackBuilder::from_config(&BuilderConfig::offline());
        assert!(builder.is_ok());
    }
}
