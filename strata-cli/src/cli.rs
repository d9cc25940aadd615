//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve configuration and print the result
    Resolve {
        /// Source descriptor, tried in the order given (file path, file://, http://, https://)
        #[arg(long = "config", value_name = "SOURCE")]
        sources: Vec<String>,

        /// YAML file with loader settings
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,

        /// Prefix of environment variables mapped onto keys
        #[arg(long, value_name = "PREFIX")]
        env_prefix: Option<String>,

        /// Runtime mode to apply instead of the detected one
        #[arg(long, value_name = "MODE")]
        mode: Option<String>,

        /// Print only the value at this key
        #[arg(long, value_name = "KEY")]
        get: Option<String>,

        /// Change into the resolved `workdir` after loading
        #[arg(long)]
        chdir: bool,

        /// Overrides in `--key=value` form, given after `--`
        #[arg(last = true, value_name = "OVERRIDES")]
        overrides: Vec<String>,
    },

    /// Evaluate a check expression (`isnum`, `min:5`, `regexp:^a`) against arguments
    Check {
        /// Check expression
        #[arg(value_name = "EXPR")]
        expr: String,

        /// Arguments to validate
        #[arg(value_name = "ARG", required = true)]
        args: Vec<String>,
    },

    /// List registered readers, checks and check factories
    Readers,
}
