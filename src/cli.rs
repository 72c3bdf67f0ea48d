//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{CONFIG_ENV_VAR, default_config_path};

#[derive(Debug, Parser)]
#[command(name = "jenkins-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Relays Jenkins build results to GitHub and GitHub pull requests to Jenkins", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = CONFIG_ENV_VAR, default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is unset, e.g. `debug` or `jenkins_relay=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Install the pull request webhook on every configured repository at startup
    #[arg(long)]
    pub register_hooks: bool,

    /// Print the route table and exit
    #[arg(long)]
    pub urls: bool,
}
