//! Current-activity reader: monitored processes and dashboard server state.

use super::{into_section, MetricSource, CURRENT_ACTIVITY};
use crate::error::{SourceError, SourceResult};
use chrono::Local;
use digiclaw_common::SectionResult;
use serde::Serialize;
use sysinfo::System;

/// Longest command line reported per process
const MAX_COMMAND_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub command: String,
}

/// Payload of the `current_activity` section
#[derive(Debug, Clone, Serialize)]
pub struct CurrentActivity {
    pub status: String,
    pub processes: Vec<ProcessInfo>,
    pub process_count: usize,
    pub dashboard_server: &'static str,
    pub last_update: String,
}

pub struct CurrentActivitySource {
    pattern: String,
    server_process: String,
    status: String,
}

impl CurrentActivitySource {
    pub fn new(pattern: &str, server_process: &str, status: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            server_process: server_process.to_string(),
            status: status.to_string(),
        }
    }

    fn read(&self) -> SourceResult<CurrentActivity> {
        let mut sys = System::new();
        sys.refresh_processes();

        let own_pid = std::process::id();
        let listing: Vec<ProcessInfo> = sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                command: process.cmd().join(" "),
            })
            .collect();

        // Our own process is always running, so an empty listing means the
        // process table could not be read at all
        if listing.is_empty() {
            return Err(SourceError::Parse("process listing unavailable".to_string()));
        }

        Ok(self.summarize(listing, own_pid))
    }

    /// Build the payload from a process listing.
    ///
    /// `dashboard_server` counts `own_pid` as well: when the server itself
    /// collects, it reports "Running" for as long as it is serving. Only a
    /// one-shot collection under a different binary name can observe
    /// "Stopped". Monitored `processes` never include `own_pid`.
    fn summarize(&self, listing: Vec<ProcessInfo>, own_pid: u32) -> CurrentActivity {
        let server_running = listing.iter().any(|p| p.name == self.server_process);
        let processes: Vec<ProcessInfo> = listing
            .into_iter()
            .filter(|p| p.pid != own_pid)
            .filter(|p| matches_pattern(p, &self.pattern))
            .map(truncate_command)
            .collect();

        CurrentActivity {
            status: self.status.clone(),
            process_count: processes.len(),
            processes,
            dashboard_server: if server_running { "Running" } else { "Stopped" },
            last_update: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

impl MetricSource for CurrentActivitySource {
    fn name(&self) -> &str {
        CURRENT_ACTIVITY
    }

    fn collect(&self) -> SectionResult {
        into_section(CURRENT_ACTIVITY, self.read())
    }
}

/// Case-insensitive match of the command line against a lowercase pattern
pub fn matches_pattern(process: &ProcessInfo, pattern: &str) -> bool {
    !pattern.is_empty() && process.command.to_lowercase().contains(pattern)
}

fn truncate_command(mut process: ProcessInfo) -> ProcessInfo {
    if process.command.chars().count() > MAX_COMMAND_CHARS {
        process.command = process.command.chars().take(MAX_COMMAND_CHARS).collect();
    }
    process
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: u32, name: &str, command: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            command: command.to_string(),
        }
    }

    #[test]
    fn test_matches_pattern_case_insensitive() {
        let p = process(10, "node", "node /opt/OpenClaw/gateway.js");
        assert!(matches_pattern(&p, "openclaw"));
        assert!(!matches_pattern(&p, "nginx"));
        assert!(!matches_pattern(&p, ""));
    }

    #[test]
    fn test_truncate_command() {
        let long = "x".repeat(250);
        let p = truncate_command(process(1, "sh", &long));
        assert_eq!(p.command.chars().count(), MAX_COMMAND_CHARS);

        let p = truncate_command(process(1, "sh", "short"));
        assert_eq!(p.command, "short");
    }

    #[test]
    fn test_summarize_counts_self_as_server() {
        let source = CurrentActivitySource::new("openclaw", "digiclawd", "Active");
        let listing = vec![
            process(42, "digiclawd", "digiclawd --port 8888 --openclaw-root /srv"),
            process(77, "node", "node /opt/openclaw/gateway.js"),
        ];

        let activity = source.summarize(listing, 42);
        assert_eq!(activity.dashboard_server, "Running");
        assert_eq!(activity.process_count, 1);
        assert_eq!(activity.processes[0].pid, 77);
    }

    #[test]
    fn test_summarize_without_server_process() {
        let source = CurrentActivitySource::new("openclaw", "digiclawd", "Active");
        let listing = vec![
            process(42, "digiclawd-once", "digiclawd-once --once"),
            process(77, "node", "node /opt/openclaw/gateway.js"),
        ];

        let activity = source.summarize(listing, 42);
        assert_eq!(activity.dashboard_server, "Stopped");
        assert_eq!(activity.process_count, 1);
    }

    #[test]
    fn test_collect_reports_shape() {
        let source = CurrentActivitySource::new("no-such-process-pattern-xyz", "digiclawd", "Idle");
        let section = source.collect();
        let payload = section.payload().expect("process listing should be readable");
        assert_eq!(payload["status"], "Idle");
        assert_eq!(payload["process_count"], 0);
        assert!(payload["last_update"].is_string());
    }
}
