//! LoraStack CLI - LoRA stack builder frontend
//!
//! Runs the stack builder outside the node-graph host: list LoRA files, look
//! up their trigger words and build stacks from the command line.

use clap::{Parser, Subcommand};
use lorastack_pipeline::BuilderConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::build::{SelectionArg, SlotArg};

/// LoraStack - LoRA stacks with selectable trigger words
#[derive(Parser)]
#[command(name = "lorastack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// LoRA folder to search (repeatable, searched before configured folders)
    #[arg(long = "lora-dir")]
    lora_dirs: Vec<PathBuf>,

    /// Skip registry lookups
    #[arg(long)]
    offline: bool,

    /// Registry API root
    #[arg(long)]
    registry_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available LoRA files
    List,

    /// Print the SHA-256 of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },

    /// Show the trigger words found for a LoRA
    Triggers {
        /// LoRA name as shown by `list`
        name: String,
    },

    /// Build a stack and print the node outputs as JSON
    Build {
        /// Number of slots to process (1-6)
        #[arg(short = 'n', long, default_value = "1")]
        count: String,

        /// Slot as INDEX:FILE[:WEIGHT]
        #[arg(short, long = "slot")]
        slots: Vec<SlotArg>,

        /// Prior trigger-word selection as INDEX:TAG[,TAG...]
        #[arg(long = "selected")]
        selections: Vec<SelectionArg>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the node form schema as JSON
    Schema,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied
    fn builder_config(&self) -> Result<BuilderConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => BuilderConfig::load(path)?,
            None => BuilderConfig::default(),
        };

        if !self.lora_dirs.is_empty() {
            let mut dirs = self.lora_dirs.clone();
            dirs.append(&mut config.folders.lora_dirs);
            config.folders.lora_dirs = dirs;
        }
        if self.offline {
            config.registry.enabled = false;
        }
        if let Some(url) = &self.registry_url {
            config.registry.base_url = url.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.builder_config()?;

    match cli.command {
        Commands::List => commands::lora::list(&config),

        Commands::Hash { file } => commands::lora::hash(&file)?,

        Commands::Triggers { name } => commands::lora::triggers(&config, &name).await?,

        Commands::Build {
            count,
            slots,
            selections,
            output,
        } => {
            commands::build::run(&config, &count, &slots, &selections, output.as_deref()).await?;
        }

        Commands::Schema => commands::schema::run(&config)?,
    }

    Ok(())
}
