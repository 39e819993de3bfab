//! Metric sources - independent providers, one per snapshot section.
//!
//! A source never lets a failure escape `collect()`: errors become an
//! error-shaped [`SectionResult`] carrying the message.

pub mod activity;
pub mod projects;
pub mod seeded;
pub mod system;
pub mod workspace;

use crate::config::Config;
use crate::error::SourceResult;
use digiclaw_common::SectionResult;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub use activity::CurrentActivitySource;
pub use projects::ProjectsSource;
pub use seeded::SeededSource;
pub use system::SystemSource;
pub use workspace::{MemorySummarySource, RecentConversationsSource};

pub const SYSTEM: &str = "system";
pub const MEMORY_SUMMARY: &str = "memory_summary";
pub const CURRENT_ACTIVITY: &str = "current_activity";
pub const PROJECTS: &str = "projects";
pub const CRON_STATUS: &str = "cron_status";
pub const NODES: &str = "nodes";
pub const RECENT_CONVERSATIONS: &str = "recent_conversations";
pub const AUTONOMOUS_WORK: &str = "autonomous_work";
pub const NEXT_ACTIONS: &str = "next_actions";
pub const PERFORMANCE: &str = "performance";

/// Every section a default registry produces, in registration order
pub const SECTION_NAMES: [&str; 10] = [
    SYSTEM,
    MEMORY_SUMMARY,
    CURRENT_ACTIVITY,
    PROJECTS,
    CRON_STATUS,
    NODES,
    RECENT_CONVERSATIONS,
    AUTONOMOUS_WORK,
    NEXT_ACTIONS,
    PERFORMANCE,
];

/// A single data provider contributing one section.
///
/// `collect` may block on file I/O or a short subprocess; the aggregator
/// runs it on the blocking pool under a time limit.
pub trait MetricSource: Send + Sync {
    /// Section key in the snapshot
    fn name(&self) -> &str;

    /// Gather the section. Must not panic or propagate errors.
    fn collect(&self) -> SectionResult;
}

/// Convert a source's typed outcome into a section, logging failures
pub(crate) fn into_section<T: Serialize>(name: &str, result: SourceResult<T>) -> SectionResult {
    match result {
        Ok(payload) => SectionResult::ok(payload),
        Err(e) => {
            warn!("  Source {} degraded: {}", name, e);
            SectionResult::error(e.to_string())
        }
    }
}

/// Build the fixed, process-wide source registry
pub fn registry(config: &Config) -> Vec<Arc<dyn MetricSource>> {
    let ws = &config.workspace;
    vec![
        Arc::new(SystemSource::new().with_command_timeout(config.collection.source_timeout())),
        Arc::new(MemorySummarySource::new(&ws.root, ws.daily_log_lines)),
        Arc::new(CurrentActivitySource::new(
            &ws.process_pattern,
            &ws.server_process,
            &ws.activity_status,
        )),
        Arc::new(ProjectsSource::new(&ws.root, config.projects.clone())),
        Arc::new(SeededSource::new(CRON_STATUS, config.cron_jobs.clone())),
        Arc::new(SeededSource::new(NODES, config.nodes.clone())),
        Arc::new(RecentConversationsSource::new(
            &ws.root,
            ws.conversation_scan_lines,
            ws.conversation_limit,
        )),
        Arc::new(SeededSource::new(AUTONOMOUS_WORK, config.autonomous_work.clone())),
        Arc::new(SeededSource::new(NEXT_ACTIONS, config.next_actions.clone())),
        Arc::new(SeededSource::new(PERFORMANCE, config.performance.clone())),
    ]
}
