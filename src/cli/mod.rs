//! CLI module - Command-line interface for the account service
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Account service: register, login and rename users over HTTP
#[derive(Parser)]
#[command(name = "accounts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Decode a bearer token with the configured secret and show its claims
    VerifyToken {
        /// The token returned by POST /users/login
        token: String,
    },

    /// Create default config file
    Init,
}

pub use commands::*;
