//! Snapshot aggregator.
//!
//! Runs every registered source once per call and assembles the results
//! under their fixed section keys. A source that panics or overruns its
//! time limit still yields an error-shaped section; the snapshot as a whole
//! never fails.

use crate::config::Config;
use crate::error::SourceError;
use crate::sources::{self, MetricSource};
use anyhow::{bail, Result};
use chrono::Local;
use digiclaw_common::{SectionResult, StatusSnapshot};
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

pub struct Aggregator {
    sources: Vec<Arc<dyn MetricSource>>,
    source_timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator over a fixed set of uniquely named sources
    pub fn new(sources: Vec<Arc<dyn MetricSource>>, source_timeout: Duration) -> Result<Self> {
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.name().to_string()) {
                bail!("Duplicate metric source: {}", source.name());
            }
        }
        Ok(Self {
            sources,
            source_timeout,
        })
    }

    /// Build the default registry from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            sources::registry(config),
            config.collection.source_timeout(),
        )
    }

    /// Section keys every snapshot will contain
    pub fn section_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    /// Collect a fresh snapshot.
    ///
    /// Sources run concurrently on the blocking pool; each must finish
    /// within `source_timeout` of aggregation start.
    pub async fn aggregate(&self) -> StatusSnapshot {
        let generated_at = Local::now();
        let deadline = tokio::time::Instant::now() + self.source_timeout;

        let pending: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let name = source.name().to_string();
                (name, tokio::task::spawn_blocking(move || source.collect()))
            })
            .collect();

        let mut sections = BTreeMap::new();
        for (name, handle) in pending {
            let result = match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => panicked_section(&name, join_error),
                Err(_) => {
                    let err = SourceError::Timeout {
                        source_name: name.clone(),
                        limit: self.source_timeout,
                    };
                    warn!("  {}", err);
                    SectionResult::error(err.to_string())
                }
            };
            sections.insert(name, result);
        }

        let snapshot = StatusSnapshot::new(generated_at, sections);
        debug!(
            "  Aggregated {} sections ({} failed)",
            snapshot.sections().len(),
            snapshot.failed_sections().len()
        );
        snapshot
    }
}

fn panicked_section(name: &str, join_error: JoinError) -> SectionResult {
    let message = if join_error.is_panic() {
        panic_message(join_error.into_panic())
    } else {
        "task cancelled".to_string()
    };
    let err = SourceError::Panicked {
        source_name: name.to_string(),
        message,
    };
    error!("  {}", err);
    SectionResult::error(err.to_string())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
