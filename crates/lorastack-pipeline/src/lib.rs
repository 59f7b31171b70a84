//! LoraStack Pipeline - Stack building
//!
//! Orchestrates one node invocation end to end.
//!
//! # Pipeline Architecture
//!
//! ```text
//! StackRequest → normalize → [resolve slot 1] → ... → [resolve slot 6] → aggregate → StackOutput
//!                                  ↑                        ↑
//!                   storage · registry · metadata    (inactive slots skipped)
//! ```
//!
//! Resolution never fails. Missing files, unreachable registries and broken
//! headers show up in the per-slot [`lorastack_core::SlotReport`]s instead.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod resolve;

// Re-export commonly used types
pub use aggregate::{Aggregator, StackOutput};
pub use builder::{BuilderError, StackBuilder, StackRequest};
pub use config::{BuilderConfig, ConfigError};
pub use resolve::{ResolvedSlot, SlotResolver, display_name};
