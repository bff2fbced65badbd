use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate {
        /// Path to config file (default: `$XDG_CONFIG_HOME/tessera/config.kdl`).
        ///
        /// This can also be set with the `TESSERA_CONFIG` environment variable. If both are set,
        /// the command line argument takes precedence.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a scripted drag-to-maximize session on headless outputs and print the final state as
    /// JSON.
    Simulate {
        /// Path to config file (default: `$XDG_CONFIG_HOME/tessera/config.kdl`).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Sub {
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Sub::Validate { config } | Sub::Simulate { config } => config.as_ref(),
        }
    }
}
