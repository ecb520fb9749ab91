use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pm2insomnia")]
#[command(version)]
#[command(about = "Convert Postman collections and environments to Insomnia v5", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert Postman exports to Insomnia documents
    Convert {
        /// Input files or directories (directories are scanned for *.json)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Transform rule configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip pre-process rules on the raw source text
        #[arg(long)]
        no_preprocess: bool,

        /// Skip post-process rules on generated scripts
        #[arg(long)]
        no_postprocess: bool,

        /// Also apply the experimental rules
        #[arg(long)]
        experimental: bool,

        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Inspect transform rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand)]
pub enum RulesCommand {
    /// List the active transform rules
    List {
        /// Transform rule configuration file (built-in rules if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the rule configuration as JSON
    Export {
        /// Output file (stdout if not specified)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,

        /// Start from this configuration instead of the built-in rules
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}
