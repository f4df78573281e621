//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::bid::BidCommands;
use crate::cli::commands::employee::EmployeeCommands;
use crate::cli::commands::org::OrgCommands;
use crate::cli::commands::tender::TenderCommands;

#[derive(Parser, Debug)]
#[command(name = "tdesk")]
#[command(author, version, about = "Tenders and bids with versioned history")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Database file (overrides config and TDESK_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file to use instead of ./tdesk.yaml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Employee acting on the request
    #[arg(long, short = 'u', global = true, env = "TDESK_USER")]
    pub user: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML for single records, TSV for lists
    Auto,
    Yaml,
    Json,
    Tsv,
    /// Ids only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the database answers
    Ping,

    /// Organizations and their members
    #[command(subcommand)]
    Org(OrgCommands),

    /// Employees
    #[command(subcommand)]
    Employee(EmployeeCommands),

    /// Tenders
    #[command(subcommand)]
    Tender(TenderCommands),

    /// Bids, decisions and reviews
    #[command(subcommand)]
    Bid(BidCommands),
}
