//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mc_core::connect::BusinessType;

#[derive(Debug, Parser)]
#[command(name = "merchant-console")]
#[command(about = "Merchant console: sign in and manage payment onboarding", long_about = None)]
pub struct Cli {
    /// TOML config file; local defaults are used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the local session
    Logout,
    /// Print the current payment onboarding status
    Status {
        /// Print the full state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow status changes (including realtime updates) until Ctrl+C
    Watch,
    /// Payment account onboarding
    Connect {
        #[command(subcommand)]
        action: ConnectCommand,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Status { .. } => "status",
            Command::Watch => "watch",
            Command::Connect { action } => match action {
                ConnectCommand::Start { .. } => "connect start",
                ConnectCommand::Continue => "connect continue",
                ConnectCommand::Sync => "connect sync",
            },
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConnectCommand {
    /// Create the payment account and print the onboarding link
    Start {
        /// Two-letter country code, e.g. US
        #[arg(long)]
        country: Option<String>,
        /// individual or company
        #[arg(long)]
        business_type: Option<BusinessType>,
    },
    /// Print a fresh link to resume onboarding
    Continue,
    /// Ask the backend to re-read the account from the processor
    Sync,
}
