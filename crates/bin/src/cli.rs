//! CLI argument definitions for the Memoir node binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use memoir::NodeRole;

/// Deployment role of this node
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Role {
    /// Serves client traffic; receives replication pushes
    Primary,
    /// Pushes its recent records to the Primary
    Secondary,
}

impl From<Role> for NodeRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Primary => NodeRole::Primary,
            Role::Secondary => NodeRole::Secondary,
        }
    }
}

/// Memoir replicated diary backend server
#[derive(Parser, Debug)]
#[command(name = "memoird")]
#[command(about = "Memoir: replicated personal diary backend node")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Memoir node
    Serve(ServeArgs),
    /// Check health of a running Memoir node
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Role of this node
    #[arg(short, long, default_value = "primary", env = "MEMOIR_ROLE")]
    pub role: Role,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "MEMOIR_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "MEMOIR_HOST")]
    pub host: String,

    /// Base URL of the peer node
    #[arg(long, env = "MEMOIR_PEER_URL")]
    pub peer_url: String,

    /// Path of the JSON store file. State is loaded from here on start and
    /// saved back on shutdown.
    #[arg(short = 'D', long, default_value = "memoir.json", env = "MEMOIR_DATA_FILE")]
    pub data_file: PathBuf,

    /// Seconds between replication push cycles (Secondary only)
    #[arg(long, default_value_t = 60, env = "MEMOIR_SYNC_INTERVAL")]
    pub sync_interval: u64,

    /// Seconds between peer health probes
    #[arg(long, default_value_t = 30, env = "MEMOIR_HEALTH_INTERVAL")]
    pub health_interval: u64,

    /// Serve the operator recovery pull endpoint. Defaults by role
    /// (Primary only).
    #[arg(long, env = "MEMOIR_RECOVERY_ENDPOINT")]
    pub recovery_endpoint: Option<bool>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Port of the node to check
    #[arg(short, long, default_value_t = 3000, env = "MEMOIR_PORT")]
    pub port: u16,

    /// Host of the node to check
    #[arg(long, default_value = "127.0.0.1", env = "MEMOIR_HOST")]
    pub host: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
