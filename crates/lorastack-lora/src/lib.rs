//! LoraStack LoRA - File discovery, hashing and embedded metadata
//!
//! Everything the stack builder needs to know about a LoRA file on disk:
//!
//! - where it lives ([`LoraFolders`], behind the [`StorageResolver`] trait)
//! - its SHA-256 content hash, used as the registry lookup key
//! - trigger words embedded in its safetensors header, used when the
//!   registry has none

pub mod folders;
pub mod hash;
pub mod metadata;
pub mod triggers;

pub use folders::{FolderConfig, FolderError, LoraFolders, StorageResolver};
pub use hash::{ContentHash, HashError, sha256_file};
pub use metadata::{MetaValue, Metadata, MetadataError, MetadataReader, SafetensorsReader};
pub use triggers::{TRIGGER_KEYS, fallback_tags, read_fallback_tags};
