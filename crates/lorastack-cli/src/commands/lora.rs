//! LoRA inspection commands

use lorastack_core::{LORA_CATEGORY, PriorSelections, Slot};
use lorastack_lora::{LoraFolders, StorageResolver, sha256_file};
use lorastack_pipeline::{BuilderConfig, StackBuilder};
use std::path::Path;

pub fn list(config: &BuilderConfig) {
    let folders = LoraFolders::from_config(&config.folders);
    let found = folders.list_available(LORA_CATEGORY);

    println!("LoRA Search Paths:");
    for path in folders.folders(LORA_CATEGORY) {
        println!("  - {}", path.display());
    }

    println!();

    if found.is_empty() {
        println!("No LoRAs found.");
        return;
    }

    println!("Found {} LoRA(s):", found.len());
    for name in found {
        println!("  - {}", name);
    }
}

pub fn hash(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let hash = sha256_file(file)?;
    println!("{}  {}", hash, file.display());
    Ok(())
}

pub async fn triggers(config: &BuilderConfig, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let builder = StackBuilder::from_config(config)?;
    let slot = Slot {
        enabled: true,
        file_reference: name.to_string(),
        weight: 1.0,
        index: 1,
    };

    let resolved = builder
        .resolver()
        .resolve(&slot, &PriorSelections::new())
        .await;
    let report = &resolved.report;

    println!("LoRA: {}", resolved.display_name);
    println!("==============================");
    println!(
        "SHA-256: {}",
        report.sha256.as_deref().unwrap_or("(unavailable)")
    );
    println!("Source:  {:?}", report.source);
    println!();

    if resolved.candidates.is_empty() {
        println!("No triggers available.");
    } else {
        println!("Triggers: {}", resolved.candidates.joined());
    }

    if report.has_issues() {
        println!();
        println!("Issues:");
        for issue in &report.issues {
            println!("  - {:?}", issue);
        }
    }

    Ok(())
}
