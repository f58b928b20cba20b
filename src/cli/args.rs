//! CLI argument parsing.

use clap::Parser;

/// NetClock CLI - terminal client for a NetClock server
#[derive(Parser, Debug, Clone)]
#[command(name = "netclock-cli")]
#[command(about = "Interactive client for the NetClock line protocol", long_about = None)]
pub struct CliArgs {
    /// Server hostname
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server TCP port
    #[arg(short, long, default_value_t = 8445)]
    pub port: u16,

    /// Execute one command and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Read commands from stdin (pipe mode)
    #[arg(short = 'x', long)]
    pub pipe: bool,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

impl CliArgs {
    /// Get server address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
