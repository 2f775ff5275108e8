//! Command line interface
//!
//! - `serve`: run the HTTP API (default)
//! - `migrate`: apply, revert or inspect the PostgreSQL schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Course Marketplace - courses, point balances and subscriptions
#[derive(Parser)]
#[command(name = "course-market")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Manage the PostgreSQL schema
    Migrate {
        #[command(subcommand)]
        action: migrate::MigrateAction,
    },
}
