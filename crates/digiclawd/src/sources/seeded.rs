//! Configuration-seeded sections.
//!
//! Scheduled jobs, nodes, autonomous work, next actions and performance
//! figures have no live integration; they are served from the records in
//! the config file under the same section contract as live sources.

use super::MetricSource;
use digiclaw_common::SectionResult;
use serde::Serialize;

pub struct SeededSource<T> {
    name: &'static str,
    records: T,
}

impl<T: Serialize> SeededSource<T> {
    pub fn new(name: &'static str, records: T) -> Self {
        Self { name, records }
    }
}

impl<T: Serialize + Send + Sync> MetricSource for SeededSource<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn collect(&self) -> SectionResult {
        SectionResult::ok(&self.records)
    }
}
