//! CLI module - Command-line interface for Doorman
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// Doorman - Self-service account authentication server
#[derive(Parser)]
#[command(name = "doorman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP authentication server
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Create default config file
    Init,

    /// Create an account from the terminal (password read from stdin)
    Useradd {
        username: String,

        email: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
}
