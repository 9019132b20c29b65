//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};

/// Finch - a small social feed server
#[derive(Parser)]
#[command(name = "finch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (the default when no command is given)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Write a default config.toml in the working directory
    #[command(alias = "--init")]
    Init,
}
