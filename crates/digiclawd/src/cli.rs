//! CLI - Command-line argument parsing
//!
//! Flags override the matching config-file values.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Digiclaw status daemon
#[derive(Parser, Debug)]
#[command(name = "digiclawd")]
#[command(about = "Digiclaw dashboard server - host and workspace status over HTTP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port to serve on (default: 8080)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub bind: Option<String>,

    /// Open browser automatically
    #[arg(short, long)]
    pub browser: bool,

    /// Config file (default: /etc/digiclaw/config.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Workspace root with daily logs and MEMORY.md
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Directory holding the dashboard's static files
    #[arg(long)]
    pub document_root: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print one status snapshot as JSON and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Apply command-line overrides onto a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if self.browser {
            config.server.open_browser = true;
        }
        if let Some(root) = &self.workspace {
            config.workspace.root = root.clone();
        }
        if let Some(root) = &self.document_root {
            config.server.document_root = root.clone();
        }
    }
}
