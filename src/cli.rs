use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "mangibot")]
#[command(author, version, about = "Telegram bot with per-chat sessions, token auth and admin approval", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Load the config, print the resolved features and exit
    CheckConfig,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
