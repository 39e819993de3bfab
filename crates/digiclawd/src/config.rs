//! Configuration management for digiclawd.
//!
//! Loads settings from /etc/digiclaw/config.toml (or `--config`) or uses
//! defaults. Every field has a serde default, so a partial file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/digiclaw/config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for every non-API path
    #[serde(default = "default_document_root")]
    pub document_root: PathBuf,

    /// Launch a browser once listening
    #[serde(default)]
    pub open_browser: bool,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_document_root() -> PathBuf {
    PathBuf::from("dashboard")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            document_root: default_document_root(),
            open_browser: false,
        }
    }
}

/// Workspace the activity sources read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace root holding `memory/<date>.md` and `MEMORY.md`
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    /// Lines of today's log included in the memory summary
    #[serde(default = "default_daily_log_lines")]
    pub daily_log_lines: usize,

    /// Lines at the end of today's log scanned for conversations
    #[serde(default = "default_conversation_scan_lines")]
    pub conversation_scan_lines: usize,

    /// Conversations reported
    #[serde(default = "default_conversation_limit")]
    pub conversation_limit: usize,

    /// Case-insensitive command-line pattern of monitored processes
    #[serde(default = "default_process_pattern")]
    pub process_pattern: String,

    /// Process name of the dashboard server
    #[serde(default = "default_server_process")]
    pub server_process: String,

    /// Free-text description of current work
    #[serde(default = "default_activity_status")]
    pub activity_status: String,
}

fn default_workspace_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".openclaw")
        .join("workspace")
}

fn default_daily_log_lines() -> usize {
    20
}

fn default_conversation_scan_lines() -> usize {
    10
}

fn default_conversation_limit() -> usize {
    5
}

fn default_process_pattern() -> String {
    "openclaw".to_string()
}

fn default_server_process() -> String {
    "digiclawd".to_string()
}

fn default_activity_status() -> String {
    "Monitoring workspace".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            daily_log_lines: default_daily_log_lines(),
            conversation_scan_lines: default_conversation_scan_lines(),
            conversation_limit: default_conversation_limit(),
            process_pattern: default_process_pattern(),
            server_process: default_server_process(),
            activity_status: default_activity_status(),
        }
    }
}

/// Collection limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Per-source time limit in seconds
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
}

fn default_source_timeout() -> u64 {
    3
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout(),
        }
    }
}

impl CollectionConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

/// A tracked project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub status: String,
    /// Percent complete, 0-100
    #[serde(default)]
    pub progress: u8,
    /// File or directory relative to the workspace root
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Reported when `path` is unset
    #[serde(default)]
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronJob {
    pub name: String,
    pub schedule: String,
    pub last_run: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub status: String,
    pub last_seen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub action: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub action: String,
    pub priority: String,
    pub eta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_response_time")]
    pub response_time: String,
    #[serde(default = "default_uptime_target")]
    pub uptime: String,
    #[serde(default)]
    pub tasks_completed_today: u32,
    #[serde(default)]
    pub autonomous_decisions: u32,
    #[serde(default)]
    pub github_commits: u32,
}

fn default_response_time() -> String {
    "< 2s".to_string()
}

fn default_uptime_target() -> String {
    "99.8%".to_string()
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            response_time: default_response_time(),
            uptime: default_uptime_target(),
            tasks_completed_today: 8,
            autonomous_decisions: 4,
            github_commits: 3,
        }
    }
}

fn default_projects() -> Vec<ProjectConfig> {
    vec![
        ProjectConfig {
            name: "Comprehensive Dashboard".to_string(),
            status: "Building real-time status system".to_string(),
            progress: 60,
            path: Some(PathBuf::from("digiclaw-dashboard")),
            last_update: None,
        },
        ProjectConfig {
            name: "Camera Mount System".to_string(),
            status: "Files ready for 3D printing".to_string(),
            progress: 85,
            path: Some(PathBuf::from("camera-mount")),
            last_update: Some("16:54".to_string()),
        },
        ProjectConfig {
            name: "DDNS Setup".to_string(),
            status: "Setting up public hostname".to_string(),
            progress: 10,
            path: None,
            last_update: None,
        },
    ]
}

fn default_cron_jobs() -> Vec<CronJob> {
    vec![
        CronJob {
            name: "workspace-cleanup".to_string(),
            schedule: "daily".to_string(),
            last_run: "16:40".to_string(),
            status: "ok".to_string(),
        },
        CronJob {
            name: "daily-update".to_string(),
            schedule: "10:00".to_string(),
            last_run: "10:00".to_string(),
            status: "ok".to_string(),
        },
    ]
}

fn default_nodes() -> Vec<NodeRecord> {
    let node = |name: &str, status: &str, last_seen: &str| NodeRecord {
        name: name.to_string(),
        status: status.to_string(),
        last_seen: last_seen.to_string(),
    };
    vec![
        node("digized_rig", "online", "17:20"),
        node("digized_mbp", "offline", "unknown"),
        node("iphone", "offline", "unknown"),
    ]
}

fn default_autonomous_work() -> Vec<WorkItem> {
    let item = |action: &str, time: &str, kind: &str| WorkItem {
        action: action.to_string(),
        time: time.to_string(),
        kind: kind.to_string(),
    };
    vec![
        item("Built comprehensive status API", "17:30", "initiative"),
        item("Replaced mock data with real endpoints", "17:26", "improvement"),
        item("Created GitHub repository", "17:20", "infrastructure"),
        item("Cleaned up broken cron jobs", "16:40", "maintenance"),
    ]
}

fn default_next_actions() -> Vec<NextAction> {
    let action = |action: &str, priority: &str, eta: &str| NextAction {
        action: action.to_string(),
        priority: priority.to_string(),
        eta: eta.to_string(),
    };
    vec![
        action("Set up DDNS hostname", "high", "next 30min"),
        action("Add workspace file monitoring to dashboard", "high", "today"),
        action("Implement camera orientation fix", "medium", "pending 3D print"),
        action("Expand memory analysis capabilities", "medium", "this week"),
    ]
}

/// Full daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default = "default_projects")]
    pub projects: Vec<ProjectConfig>,

    #[serde(default = "default_cron_jobs")]
    pub cron_jobs: Vec<CronJob>,

    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeRecord>,

    #[serde(default = "default_autonomous_work")]
    pub autonomous_work: Vec<WorkItem>,

    #[serde(default = "default_next_actions")]
    pub next_actions: Vec<NextAction>,

    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workspace: WorkspaceConfig::default(),
            collection: CollectionConfig::default(),
            projects: default_projects(),
            cron_jobs: default_cron_jobs(),
            nodes: default_nodes(),
            autonomous_work: default_autonomous_work(),
            next_actions: default_next_actions(),
            performance: PerformanceConfig::default(),
        }
    }
}

impl Config {
    /// Load config from an explicit path, or the system path, or defaults.
    ///
    /// An explicit path must exist and parse; a broken system file only warns.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let system_path = Path::new(CONFIG_PATH);
        if !system_path.exists() {
            info!("No config at {}, using defaults", CONFIG_PATH);
            return Ok(Config::default());
        }

        Ok(Self::load_from_path(system_path).unwrap_or_else(|e| {
            warn!("Invalid config, using defaults: {:#}", e);
            Config::default()
        }))
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text and normalise out-of-range values
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        for project in &mut self.projects {
            if project.progress > 100 {
                warn!(
                    "Project '{}' progress {} clamped to 100",
                    project.name, project.progress
                );
                project.progress = 100;
            }
        }
        if self.collection.source_timeout_secs == 0 {
            warn!("source_timeout_secs must be positive, using default");
            self.collection.source_timeout_secs = default_source_timeout();
        }
    }
}
