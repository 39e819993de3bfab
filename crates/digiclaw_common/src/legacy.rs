//! Legacy view for dashboard builds that predate the sectioned schema.
//!
//! `/api/system` clients expect four fixed fields and never an error object.
//! [`project`] derives that shape from a full [`StatusSnapshot`]; every
//! substitution it may make is listed in [`FALLBACKS`].

use crate::snapshot::StatusSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of activities carried in the legacy view
pub const MAX_ACTIVITIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyActivity {
    pub time: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProject {
    pub title: String,
    pub status: String,
    pub progress: u8,
}

/// Narrow response shape served on `/api/system`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyView {
    pub memory: String,
    pub storage: String,
    pub activities: Vec<LegacyActivity>,
    pub projects: Vec<LegacyProject>,
}

/// Backing section of a legacy field and the value used when that section
/// is error-shaped, absent, or lacks the field.
#[derive(Debug, Clone, Copy)]
pub struct Fallback<T: 'static> {
    pub section: &'static str,
    pub value: T,
}

#[derive(Debug, Clone, Copy)]
pub struct Fallbacks {
    pub memory: Fallback<&'static str>,
    pub storage: Fallback<&'static str>,
    pub activities: Fallback<&'static [LegacyActivity]>,
    pub projects: Fallback<&'static [LegacyProject]>,
}

/// The complete substitution table for the legacy view
pub const FALLBACKS: Fallbacks = Fallbacks {
    memory: Fallback {
        section: "system",
        value: "Unknown",
    },
    storage: Fallback {
        section: "system",
        value: "Unknown",
    },
    activities: Fallback {
        section: "autonomous_work",
        value: &[],
    },
    projects: Fallback {
        section: "projects",
        value: &[],
    },
};

/// Project a snapshot down to the legacy view. Never fails.
pub fn project(snapshot: &StatusSnapshot) -> LegacyView {
    let memory = text_field(snapshot, FALLBACKS.memory.section, "memory_available")
        .map(|available| format!("{} available", available))
        .unwrap_or_else(|| FALLBACKS.memory.value.to_string());

    let storage = text_field(snapshot, FALLBACKS.storage.section, "disk_free")
        .map(|free| format!("{} free", free))
        .unwrap_or_else(|| FALLBACKS.storage.value.to_string());

    let activities = records(snapshot, FALLBACKS.activities.section)
        .map(|items| {
            items
                .iter()
                .filter_map(activity_from)
                .take(MAX_ACTIVITIES)
                .collect()
        })
        .unwrap_or_else(|| FALLBACKS.activities.value.to_vec());

    let projects = records(snapshot, FALLBACKS.projects.section)
        .map(|items| items.iter().filter_map(project_from).collect())
        .unwrap_or_else(|| FALLBACKS.projects.value.to_vec());

    LegacyView {
        memory,
        storage,
        activities,
        projects,
    }
}

fn text_field<'a>(snapshot: &'a StatusSnapshot, section: &str, field: &str) -> Option<&'a str> {
    snapshot.payload(section)?.get(field)?.as_str()
}

fn records<'a>(snapshot: &'a StatusSnapshot, section: &str) -> Option<&'a Vec<Value>> {
    snapshot.payload(section)?.as_array()
}

fn activity_from(record: &Value) -> Option<LegacyActivity> {
    Some(LegacyActivity {
        time: record.get("time")?.as_str()?.to_string(),
        text: record.get("action")?.as_str()?.to_string(),
    })
}

fn project_from(record: &Value) -> Option<LegacyProject> {
    let progress = record.get("progress")?.as_u64()?.min(100) as u8;
    Some(LegacyProject {
        title: record.get("name")?.as_str()?.to_string(),
        status: record.get("status")?.as_str()?.to_string(),
        progress,
    })
}
