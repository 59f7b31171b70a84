//! LoraStack API - Model registry client
//!
//! Trigger words for a LoRA are looked up in a remote model registry using
//! the SHA-256 of the file content.
//!
//! ```text
//! StackBuilder                      Registry
//! ┌─────────────┐                  ┌──────────────┐
//! │  hashes     │  GET by-hash/    │              │
//! │  LoRA file  │ ───────────────► │  answers     │
//! │             │                  │  with        │
//! │             │ ◄─────────────── │  trainedWords│
//! │             │  200 / 404 / err │              │
//! └─────────────┘                  └──────────────┘
//! ```
//!
//! Every outcome is a [`RegistryLookup`] value; nothing here propagates
//! network errors to the caller.

pub mod client;
pub mod messages;

// Re-export commonly used types
pub use client::{HttpRegistry, MockRegistry, RegistryClient, RegistryConfig, RegistryError};
pub use messages::{ModelVersion, RegistryLookup};
