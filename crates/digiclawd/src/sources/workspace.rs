//! Workspace log readers.
//!
//! The workspace holds one dated log per day (`memory/YYYY-MM-DD.md`) and a
//! long-term memory document (`MEMORY.md`). A missing workspace root is a
//! failure; a missing individual file just means there is nothing yet.

use super::{into_section, MetricSource, MEMORY_SUMMARY, RECENT_CONVERSATIONS};
use crate::error::{SourceError, SourceResult};
use chrono::{Local, NaiveDate};
use digiclaw_common::SectionResult;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Long-term memory document, relative to the workspace root
pub const LONG_TERM_MEMORY_FILE: &str = "MEMORY.md";

/// Marker of a titled section in the memory document
const SECTION_MARKER: &str = "##";

/// Payload of the `memory_summary` section
#[derive(Debug, Clone, Serialize)]
pub struct MemorySummary {
    pub date: String,
    pub daily_log: Option<String>,
    pub long_term_memory: Option<String>,
    /// Bullet points of the latest long-term section, empty when there are none
    pub key_insights: Vec<String>,
}

/// Path of the daily log for `date`
pub fn daily_log_path(root: &Path, date: NaiveDate) -> PathBuf {
    root.join("memory").join(format!("{}.md", date.format("%Y-%m-%d")))
}

fn ensure_root(root: &Path) -> SourceResult<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(SourceError::MissingPath(root.to_path_buf()))
    }
}

/// Read a file that may legitimately not exist yet
fn read_optional(path: &Path) -> SourceResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SourceError::io(path, e)),
    }
}

/// Last `n` lines of `content`
pub fn tail(content: &str, n: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Text of the most recent titled section (after the last `##`)
pub fn latest_section(content: &str) -> String {
    content
        .rsplit(SECTION_MARKER)
        .next()
        .unwrap_or(content)
        .trim()
        .to_string()
}

/// Bullet items (`- ` or `* `) of a section, without their markers
pub fn bullet_points(section: &str) -> Vec<String> {
    section
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
        })
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Non-heading, non-blank lines among the last `scan` lines, keeping the final `limit`
pub fn recent_entries(content: &str, scan: usize, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(scan);
    let entries: Vec<String> = lines[start..]
        .iter()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.trim().to_string())
        .collect();
    let skip = entries.len().saturating_sub(limit);
    entries.into_iter().skip(skip).collect()
}

pub struct MemorySummarySource {
    root: PathBuf,
    daily_log_lines: usize,
}

impl MemorySummarySource {
    pub fn new(root: impl Into<PathBuf>, daily_log_lines: usize) -> Self {
        Self {
            root: root.into(),
            daily_log_lines,
        }
    }

    /// Summary as of `date`
    pub fn summary_for(&self, date: NaiveDate) -> SourceResult<MemorySummary> {
        ensure_root(&self.root)?;

        let daily_log = read_optional(&daily_log_path(&self.root, date))?
            .map(|content| tail(&content, self.daily_log_lines));
        let long_term_memory = read_optional(&self.root.join(LONG_TERM_MEMORY_FILE))?
            .map(|content| latest_section(&content));

        let key_insights = long_term_memory
            .as_deref()
            .map(bullet_points)
            .unwrap_or_default();

        Ok(MemorySummary {
            date: date.format("%Y-%m-%d").to_string(),
            daily_log,
            long_term_memory,
            key_insights,
        })
    }
}

impl MetricSource for MemorySummarySource {
    fn name(&self) -> &str {
        MEMORY_SUMMARY
    }

    fn collect(&self) -> SectionResult {
        into_section(MEMORY_SUMMARY, self.summary_for(Local::now().date_naive()))
    }
}

pub struct RecentConversationsSource {
    root: PathBuf,
    scan_lines: usize,
    limit: usize,
}

impl RecentConversationsSource {
    pub fn new(root: impl Into<PathBuf>, scan_lines: usize, limit: usize) -> Self {
        Self {
            root: root.into(),
            scan_lines,
            limit,
        }
    }

    pub fn entries_for(&self, date: NaiveDate) -> SourceResult<Vec<String>> {
        ensure_root(&self.root)?;
        Ok(read_optional(&daily_log_path(&self.root, date))?
            .map(|content| recent_entries(&content, self.scan_lines, self.limit))
            .unwrap_or_default())
    }
}

impl MetricSource for RecentConversationsSource {
    fn name(&self) -> &str {
        RECENT_CONVERSATIONS
    }

    fn collect(&self) -> SectionResult {
        into_section(RECENT_CONVERSATIONS, self.entries_for(Local::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn workspace_with_log(log: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("memory")).unwrap();
        fs::write(daily_log_path(temp.path(), date()), log).unwrap();
        temp
    }

    #[test]
    fn test_daily_log_path() {
        let path = daily_log_path(Path::new("/ws"), date());
        assert_eq!(path, PathBuf::from("/ws/memory/2026-10-16.md"));
    }

    #[test]
    fn test_tail_bounds_lines() {
        let content: String = (1..=30).map(|i| format!("line {}\n", i)).collect();
        let tail = tail(&content, 20);
        assert_eq!(tail.lines().count(), 20);
        assert!(tail.starts_with("line 11"));
        assert_eq!(super::tail("short", 20), "short");
    }

    #[test]
    fn test_latest_section() {
        let doc = "# Memory\n## Early days\nold\n## Dashboard\nBuilt the status API\n";
        assert_eq!(latest_section(doc), "Dashboard\nBuilt the status API");
        assert_eq!(latest_section("no headings"), "no headings");
    }

    #[test]
    fn test_recent_entries_skip_headings_and_blanks() {
        let log = "# 2026-10-16\n\n- 09:00 started\n## Afternoon\n- 14:00 fixed cron\n- 15:00 pushed\n";
        let entries = recent_entries(log, 10, 2);
        assert_eq!(entries, vec!["- 14:00 fixed cron", "- 15:00 pushed"]);
    }

    #[test]
    fn test_summary_reads_both_documents() {
        let temp = workspace_with_log("# Today\n- did things\n");
        fs::write(temp.path().join(LONG_TERM_MEMORY_FILE), "## Old\nx\n## New\ny\n").unwrap();

        let summary = MemorySummarySource::new(temp.path(), 20).summary_for(date()).unwrap();
        assert_eq!(summary.daily_log.as_deref(), Some("# Today\n- did things"));
        assert_eq!(summary.long_term_memory.as_deref(), Some("New\ny"));
        assert!(summary.key_insights.is_empty());
    }

    #[test]
    fn test_key_insights_from_latest_section() {
        let temp = workspace_with_log("");
        fs::write(
            temp.path().join(LONG_TERM_MEMORY_FILE),
            "## Old\n- stale\n## Lessons\n- keep cron small\nnote\n  * check disk weekly\n-\n",
        )
        .unwrap();

        let summary = MemorySummarySource::new(temp.path(), 20).summary_for(date()).unwrap();
        assert_eq!(summary.key_insights, vec!["keep cron small", "check disk weekly"]);

        let payload = serde_json::to_value(&summary).unwrap();
        assert_eq!(payload["key_insights"][0], "keep cron small");
    }

    #[test]
    fn test_missing_files_degrade_to_null() {
        let temp = TempDir::new().unwrap();
        let summary = MemorySummarySource::new(temp.path(), 20).summary_for(date()).unwrap();
        assert!(summary.daily_log.is_none());
        assert!(summary.long_term_memory.is_none());
        assert_eq!(serde_json::to_value(&summary).unwrap()["key_insights"], serde_json::json!([]));

        let entries = RecentConversationsSource::new(temp.path(), 10, 5)
            .entries_for(date())
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_workspace_is_error_shaped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");

        let section = MemorySummarySource::new(&missing, 20).collect();
        assert!(section.error_message().unwrap().contains("Path not found"));

        let section = RecentConversationsSource::new(&missing, 10, 5).collect();
        assert!(section.is_error());
    }
}
