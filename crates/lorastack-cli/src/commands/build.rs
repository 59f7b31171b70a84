//! Build command

use lorastack_core::{MAX_SLOTS, SlotInput, slot::DEFAULT_WEIGHT};
use lorastack_pipeline::{BuilderConfig, StackBuilder, StackRequest};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// `INDEX:FILE[:WEIGHT]`
#[derive(Debug, Clone, PartialEq)]
pub struct SlotArg {
    pub index: usize,
    pub input: SlotInput,
}

impl FromStr for SlotArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected INDEX:FILE[:WEIGHT], got '{s}'"))?;
        let index = parse_index(index)?;

        // A trailing `:number` is the weight; anything else belongs to the name.
        let (file, weight) = match rest.rsplit_once(':') {
            Some((file, weight)) => match weight.trim().parse::<f64>() {
                Ok(weight) => (file, weight),
                Err(_) => (rest, DEFAULT_WEIGHT),
            },
            None => (rest, DEFAULT_WEIGHT),
        };

        if file.is_empty() {
            return Err(format!("missing file name in '{s}'"));
        }

        Ok(Self {
            index,
            input: SlotInput::enabled(file, weight),
        })
    }
}

/// `INDEX:TAG[,TAG...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionArg {
    pub index: usize,
    pub tags: String,
}

impl FromStr for SelectionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, tags) = s
            .split_once(':')
            .ok_or_else(|| format!("expected INDEX:TAGS, got '{s}'"))?;
        Ok(Self {
            index: parse_index(index)?,
            tags: tags.to_string(),
        })
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(index) if (1..=MAX_SLOTS).contains(&index) => Ok(index),
        _ => Err(format!("slot index must be 1-{MAX_SLOTS}, got '{raw}'")),
    }
}

/// Assemble a request from command-line arguments
pub fn request(count: &str, slots: &[SlotArg], selections: &[SelectionArg]) -> StackRequest {
    let mut request = StackRequest::new(count, Default::default());
    for slot in slots {
        request = request.slot(slot.index, slot.input.clone());
    }
    for selection in selections {
        request = request.selected(selection.index, selection.tags.clone());
    }
    request
}

pub async fn run(
    config: &BuilderConfig,
    count: &str,
    slots: &[SlotArg],
    selections: &[SelectionArg],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = StackBuilder::from_config(config)?;
    let request = request(count, slots, selections);

    info!(
        count = request.count.get(),
        slots = slots.len(),
        "Building stack"
    );

    let result = builder
        .build("model".to_string(), "clip".to_string(), &request)
        .await;
    let json = serde_json::to_string_pretty(&result)?;

    match output {
        Some(path) => {
            fs::write(path, &json)?;
            println!("Output written to {}", path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
