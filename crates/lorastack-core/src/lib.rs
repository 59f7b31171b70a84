//! LoraStack Core - Slot, stack and trigger-word types
//!
//! A LoRA stack node lets the user enable up to six LoRA files, give each a
//! weight and pick trigger words for it. This crate holds the types shared by
//! every stage of that process; it performs no I/O.
//!
//! # Data Flow
//!
//! ```text
//! SlotInputs ──normalize──► [Slot; 6] ──resolve──► StackEntry + TagSet + UiChoice
//!                                                        │
//!                                          LoraStack, Selected tags, UiPayload
//! ```
//!
//! Trigger words the user picked on a previous run come back through
//! [`PriorSelections`], keyed by slot index.

pub mod report;
pub mod schema;
pub mod slot;
pub mod stack;
pub mod tags;
pub mod ui;

// Re-export commonly used types
pub use report::{SlotIssue, SlotReport, TagSource};
pub use schema::{InputField, InputKind, NodeSchema};
pub use slot::{
    MAX_SLOTS, NO_LORAS_PLACEHOLDER, Slot, SlotCount, SlotInput, SlotInputs, is_placeholder,
};
pub use stack::{LoraStack, StackEntry};
pub use tags::{PriorSelections, TagSet};
pub use ui::{UiChoice, UiPayload};

/// Storage category LoRA files live under
pub const LORA_CATEGORY: &str = "loras";
