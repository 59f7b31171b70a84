//! Embedded metadata reading
//!
//! A safetensors file starts with an 8-byte little-endian header length
//! followed by a JSON header. Training tools store free-form string pairs
//! under the header's `__metadata__` key. Only the header is read; tensor
//! data is never touched.

use safetensors::tensor::Metadata as Header;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Header key holding the free-form metadata
pub const METADATA_KEY: &str = "__metadata__";

/// Headers larger than this are rejected (same bound as `safetensors`)
pub const MAX_HEADER_SIZE: u64 = 100_000_000;

/// Length prefix in front of the header
const HEADER_PREFIX: usize = 8;

/// Metadata errors
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too short for a header")]
    Truncated,

    #[error("Header too large: {0} bytes")]
    HeaderTooLarge(u64),

    #[error("Invalid safetensors header: {0}")]
    Format(#[from] serde_json::Error),
}

/// A metadata value: safetensors stores strings, other readers may yield lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

/// Embedded key/value metadata
pub type Metadata = BTreeMap<String, MetaValue>;

/// Reads embedded metadata from a model file
pub trait MetadataReader: Send + Sync {
    fn read_metadata(&self, path: &Path) -> Result<Metadata, MetadataError>;
}

/// Reads the `__metadata__` block of a safetensors header
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetensorsReader;

impl SafetensorsReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse metadata from any reader positioned at the start of the file
    pub fn read_from(&self, mut reader: impl Read) -> Result<Metadata, MetadataError> {
        let mut len_bytes = [0u8; HEADER_PREFIX];
        reader.read_exact(&mut len_bytes).map_err(truncated)?;
        let header_len = u64::from_le_bytes(len_bytes);
        if header_len > MAX_HEADER_SIZE {
            return Err(MetadataError::HeaderTooLarge(header_len));
        }

        let mut buffer = vec![0u8; header_len as usize];
        reader.read_exact(&mut buffer).map_err(truncated)?;

        // Decoded alone: `SafeTensors::read_metadata` insists on the tensor data too.
        let header: Header = serde_json::from_slice(&buffer)?;
        let metadata: Metadata = header
            .metadata()
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), MetaValue::Text(v.clone())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(metadata)
    }
}

impl MetadataReader for SafetensorsReader {
    fn read_metadata(&self, path: &Path) -> Result<Metadata, MetadataError> {
        let file = File::open(path)?;
        self.read_from(std::io::BufReader::new(file))
    }
}

fn truncated(e: std::io::Error) -> MetadataError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        MetadataError::Truncated
    } else {
        MetadataError::Io(e)
    }
}

/// Encode a header-only safetensors file carrying `metadata`.
///
/// Handy for writing fixtures and for tagging files that carry no tensors.
pub fn encode_header(metadata: &BTreeMap<String, String>) -> Vec<u8> {
    let header = serde_json::json!({ METADATA_KEY: metadata });
    let json = header.to_string().into_bytes();
    let mut out = Vec::with_capacity(8 + json.len());
    out.extend_from_slice(&(json.len() as u64).to_le_bytes());
    out.extend_from_slice(&json);
    out
}
