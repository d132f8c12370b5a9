//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod plan;

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile build configurations
    Build {
        /// Build only configurations of this module
        #[arg(short, long)]
        module: Option<String>,

        /// Build only this configuration
        #[arg(short, long)]
        config: Option<String>,

        /// Compile even when everything is up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Show the compile units a build would run
    Plan {
        /// Show only configurations of this module
        #[arg(short, long)]
        module: Option<String>,

        /// Show only this configuration
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Remove build state and generated compiler configs
    Clean,
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Build {
                module,
                config,
                force,
            } => {
                let options = build::BuildOptions {
                    module,
                    config,
                    force,
                };
                build::execute(&current_dir, options).await
            }
            Self::Plan { module, config } => {
                plan::execute(&current_dir, module.as_deref(), config.as_deref())
            }
            Self::Clean => clean::execute(&current_dir),
        }
    }
}
