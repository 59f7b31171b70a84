//! LoRA file discovery
//!
//! Maps storage categories to search folders, lists the model files found
//! there and resolves a listed name back to an absolute path.

use lorastack_core::LORA_CATEGORY;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions recognised as model files
pub const MODEL_EXTENSIONS: &[&str] = &[
    "safetensors",
    "ckpt",
    "pt",
    "pt2",
    "bin",
    "pth",
    "pkl",
    "sft",
];

/// Environment variable holding extra LoRA folders (path-list syntax)
pub const LORA_DIRS_ENV: &str = "LORASTACK_LORA_DIRS";

/// Folder errors
#[derive(Debug, Error)]
pub enum FolderError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Resolves file names to paths for a storage category
pub trait StorageResolver: Send + Sync {
    /// Names of every available file in a category
    fn list_available(&self, category: &str) -> Vec<String>;

    /// Absolute path for a listed name, if it exists
    fn resolve_path(&self, category: &str, name: &str) -> Option<PathBuf>;
}

/// Folder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// LoRA search folders, searched in order
    pub lora_dirs: Vec<PathBuf>,
    /// Also read folders from `LORASTACK_LORA_DIRS`
    pub use_env: bool,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            lora_dirs: default_lora_dirs(),
            use_env: true,
        }
    }
}

/// `./models/loras` and the per-user data folder
pub fn default_lora_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("models").join("loras"),
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lorastack")
            .join("loras"),
    ]
}

/// Search folders per category
#[derive(Debug, Clone, Default)]
pub struct LoraFolders {
    folders: HashMap<String, Vec<PathBuf>>,
}

impl LoraFolders {
    /// Create with no folders registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from configuration
    pub fn from_config(config: &FolderConfig) -> Self {
        let mut folders = Self::new();
        if config.use_env {
            if let Some(paths) = std::env::var_os(LORA_DIRS_ENV) {
                for path in std::env::split_paths(&paths) {
                    folders.add_folder(LORA_CATEGORY, path);
                }
            }
        }
        for dir in &config.lora_dirs {
            folders.add_folder(LORA_CATEGORY, dir.clone());
        }
        folders
    }

    /// Register a folder for a category
    pub fn add_folder(&mut self, category: &str, path: impl Into<PathBuf>) {
        let path = path.into();
        let entry = self.folders.entry(category.to_string()).or_default();
        if !entry.contains(&path) {
            entry.push(path);
        }
    }

    /// Folders registered for a category
    pub fn folders(&self, category: &str) -> &[PathBuf] {
        self.folders.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// List files in a category, reporting unknown categories
    pub fn scan(&self, category: &str) -> Result<Vec<String>, FolderError> {
        let roots = self
            .folders
            .get(category)
            .ok_or_else(|| FolderError::UnknownCategory(category.to_string()))?;

        let mut names = BTreeSet::new();
        for root in roots {
            if !root.is_dir() {
                debug!(folder = %root.display(), "Skipping missing folder");
                continue;
            }
            collect_files(root, &mut names);
        }

        Ok(names.into_iter().collect())
    }
}

impl StorageResolver for LoraFolders {
    fn list_available(&self, category: &str) -> Vec<String> {
        match self.scan(category) {
            Ok(names) => names,
            Err(e) => {
                debug!(category, error = %e, "Listing failed");
                Vec::new()
            }
        }
    }

    fn resolve_path(&self, category: &str, name: &str) -> Option<PathBuf> {
        let relative = safe_relative(name)?;
        self.folders(category)
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

/// Walk a folder, following links; loops and unreadable entries are skipped
fn collect_files(root: &Path, names: &mut BTreeSet<String>) {
    let entries = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(folder = %root.display(), error = %e, "Skipping entry");
                None
            }
        });

    for entry in entries {
        if !entry.file_type().is_file() || !has_model_extension(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            names.insert(display_name(relative));
        }
    }
}

fn has_model_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MODEL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn display_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Accept only plain relative names; `..`, roots and prefixes are refused.
fn safe_relative(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let path = Path::new(&normalized);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}
