//! Schema command

use lorastack_pipeline::{BuilderConfig, StackBuilder};

pub fn run(config: &BuilderConfig) -> Result<(), Box<dyn std::error::Error>> {
    let builder = StackBuilder::from_config(config)?;
    let schema = builder.schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
