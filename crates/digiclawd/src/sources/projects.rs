//! Project-status reader.
//!
//! Projects are declared in configuration; when a project names a path in
//! the workspace, its file count and last update come from the filesystem.

use super::{into_section, MetricSource, PROJECTS};
use crate::config::ProjectConfig;
use crate::error::SourceResult;
use chrono::{DateTime, Local};
use digiclaw_common::SectionResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    pub name: String,
    pub status: String,
    pub progress: u8,
    pub last_update: Option<String>,
    pub files: usize,
}

/// File count and newest modification time under a path
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub files: usize,
    pub newest: Option<SystemTime>,
}

pub struct ProjectsSource {
    root: PathBuf,
    projects: Vec<ProjectConfig>,
}

impl ProjectsSource {
    pub fn new(root: impl Into<PathBuf>, projects: Vec<ProjectConfig>) -> Self {
        Self {
            root: root.into(),
            projects,
        }
    }

    pub fn statuses(&self) -> SourceResult<Vec<ProjectStatus>> {
        Ok(self.projects.iter().map(|p| self.status_of(p)).collect())
    }

    fn status_of(&self, project: &ProjectConfig) -> ProjectStatus {
        let stats = project
            .path
            .as_ref()
            .map(|path| file_stats(&self.root.join(path)))
            .unwrap_or_default();

        let last_update = stats
            .newest
            .map(|t| DateTime::<Local>::from(t).format("%H:%M").to_string())
            .or_else(|| project.last_update.clone());

        ProjectStatus {
            name: project.name.clone(),
            status: project.status.clone(),
            progress: project.progress.min(100),
            last_update,
            files: stats.files,
        }
    }
}

impl MetricSource for ProjectsSource {
    fn name(&self) -> &str {
        PROJECTS
    }

    fn collect(&self) -> SectionResult {
        into_section(PROJECTS, self.statuses())
    }
}

/// Count regular files under `path` (a plain file counts as one).
///
/// Unreadable entries are skipped; an absent path has no files.
pub fn file_stats(path: &Path) -> FileStats {
    let mut stats = FileStats::default();
    if !path.exists() {
        return stats;
    }

    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("  Skipping unreadable entry under {}: {}", path.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.files += 1;
        if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
            stats.newest = Some(stats.newest.map_or(modified, |n| n.max(modified)));
        }
    }
    stats
}
