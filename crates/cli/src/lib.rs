use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockflow")]
#[command(about = "StockFlow - correlated stock analysis pipeline")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the pipeline with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "stockflow.yaml")]
        config: PathBuf,
    },

    /// Validate configuration without starting the pipeline
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "stockflow.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "stockflow.yaml")]
        output: PathBuf,
    },

    /// Run a self-contained demo: seed prices, trigger an SMA analysis
    /// and print the result
    Demo {
        /// Path to the configuration file
        #[arg(short, long, default_value = "stockflow.yaml")]
        config: PathBuf,

        /// Symbol to analyze
        #[arg(short, long, default_value = "AAPL")]
        symbol: String,

        /// SMA window length
        #[arg(short, long, default_value_t = 5)]
        period: usize,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
