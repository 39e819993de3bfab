//! Host resource reader: memory, disk, CPU, uptime and load.

use super::{into_section, MetricSource, SYSTEM};
use crate::error::{SourceError, SourceResult};
use digiclaw_common::SectionResult;
use serde::Serialize;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Default limit for the disk-usage subprocess
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);

/// How often a running subprocess is checked for exit
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Payload of the `system` section
#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub memory_total: String,
    pub memory_available: String,
    pub memory_usage: String,
    pub disk_used: String,
    pub disk_free: String,
    pub disk_usage: String,
    pub cpu_usage: String,
    pub uptime: String,
    pub load_avg: f64,
}

/// Disk columns from one `df` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub used: String,
    pub free: String,
    pub usage: String,
}

pub struct SystemSource {
    df_program: String,
    disk_path: PathBuf,
    command_timeout: Duration,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            df_program: "df".to_string(),
            disk_path: PathBuf::from("/"),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Kill the disk-usage subprocess if it runs longer than `limit`
    pub fn with_command_timeout(mut self, limit: Duration) -> Self {
        self.command_timeout = limit;
        self
    }

    /// Use a different disk-usage program (must accept `df -hP <path>` arguments)
    pub fn with_df_program(mut self, program: impl Into<String>) -> Self {
        self.df_program = program.into();
        self
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    fn read(&self) -> SourceResult<SystemMetrics> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total_mb = sys.total_memory() / 1024 / 1024;
        let available_mb = sys.available_memory() / 1024 / 1024;
        if total_mb == 0 {
            return Err(SourceError::Parse("total memory reported as zero".to_string()));
        }
        let used_mb = total_mb.saturating_sub(available_mb);

        let disk = self.disk_usage()?;

        sys.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu();
        let cpu = sys.global_cpu_info().cpu_usage();

        Ok(SystemMetrics {
            memory_total: format!("{}MB", total_mb),
            memory_available: format!("{}MB", available_mb),
            memory_usage: format_percent(used_mb as f64 / total_mb as f64 * 100.0),
            disk_used: disk.used,
            disk_free: disk.free,
            disk_usage: disk.usage,
            cpu_usage: format_percent(cpu as f64),
            uptime: format_uptime(System::uptime()),
            load_avg: System::load_average().one,
        })
    }

    fn disk_usage(&self) -> SourceResult<DiskUsage> {
        let display = format!("{} -hP {}", self.df_program, self.disk_path.display());
        let mut command = Command::new(&self.df_program);
        command.arg("-hP").arg(&self.disk_path);
        let output = run_bounded(command, &display, self.command_timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::command(&display, stderr.trim()));
        }

        parse_df(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemSource {
    fn name(&self) -> &str {
        SYSTEM
    }

    fn collect(&self) -> SectionResult {
        into_section(SYSTEM, self.read())
    }
}

/// Run `command` to completion, killing and reaping it once `limit` passes.
///
/// Output is expected to be small; it is read only after the child exits.
pub fn run_bounded(mut command: Command, display: &str, limit: Duration) -> SourceResult<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SourceError::command(display, e.to_string()))?;

    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => {
                return child
                    .wait_with_output()
                    .map_err(|e| SourceError::command(display, e.to_string()));
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::Timeout {
                    source_name: display.to_string(),
                    limit,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::command(display, e.to_string()));
            }
        }
    }
}

/// Parse POSIX `df -hP` output: header line, then
/// `Filesystem Size Used Avail Use% Mounted-on`.
pub fn parse_df(output: &str) -> SourceResult<DiskUsage> {
    let row = output
        .lines()
        .nth(1)
        .ok_or_else(|| SourceError::Parse("df output has no data row".to_string()))?;

    let parts: Vec<&str> = row.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(SourceError::Parse(format!("unexpected df row: {}", row)));
    }

    Ok(DiskUsage {
        used: parts[2].to_string(),
        free: parts[3].to_string(),
        usage: parts[4].to_string(),
    })
}

/// One decimal place with a percent sign, e.g. `42.3%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// `H:MM:SS`, prefixed with `N day(s), ` past the first day
pub fn format_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
