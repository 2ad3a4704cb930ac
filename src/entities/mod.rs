// 🗂️ Entity Models - Clients, Workers, Tasks
// The three row shapes the engine understands, plus the dataset views over them.

pub mod client;
pub mod task;
pub mod worker;

pub use client::{Attributes, Client};
pub use task::Task;
pub use worker::Worker;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(alias = "client")]
    Clients,
    #[serde(alias = "worker")]
    Workers,
    #[serde(alias = "task")]
    Tasks,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Clients, EntityKind::Workers, EntityKind::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Clients => "clients",
            EntityKind::Workers => "workers",
            EntityKind::Tasks => "tasks",
        }
    }

    /// Column holding the row identifier ("ClientID", "WorkerID", "TaskID")
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Clients => "ClientID",
            EntityKind::Workers => "WorkerID",
            EntityKind::Tasks => "TaskID",
        }
    }

    /// Declared columns in canonical order, with the shape ingestion coerces them to
    pub fn fields(&self) -> &'static [(&'static str, FieldShape)] {
        match self {
            EntityKind::Clients => Client::FIELDS,
            EntityKind::Workers => Worker::FIELDS,
            EntityKind::Tasks => Task::FIELDS,
        }
    }

    /// Required columns in canonical order
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields().iter().map(|(name, _)| *name).collect()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clients" | "client" => Ok(EntityKind::Clients),
            "workers" | "worker" => Ok(EntityKind::Workers),
            "tasks" | "task" => Ok(EntityKind::Tasks),
            other => Err(anyhow::anyhow!(
                "invalid entity kind '{}'. expected one of: clients | workers | tasks",
                other
            )),
        }
    }
}

/// Value shape of a column once the ingestion collaborator has coerced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Text,
    Number,
    TextList,
    NumberList,
    /// Free-form structured payload (JSON object or JSON text)
    Structured,
}

// ============================================================================
// ROW TRAIT
// ============================================================================

/// Common surface of the three row shapes
pub trait Record: Serialize {
    const KIND: EntityKind;
    const FIELDS: &'static [(&'static str, FieldShape)];

    /// Row identifier, if present
    fn id(&self) -> Option<&str>;

    /// Columns carrying a value on this row, in canonical order
    fn present_fields(&self) -> Vec<&'static str>;
}

// ============================================================================
// NUMERIC HELPERS
// ============================================================================

/// Whole number check on a coerced numeric cell (3.0 counts, 2.5 does not)
pub fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

pub fn is_positive_integer(value: f64) -> bool {
    is_integer(value) && value >= 1.0
}

// ============================================================================
// DATASET VIEWS
// ============================================================================

/// Borrowed, read-only view over one dataset
#[derive(Debug, Clone, Copy)]
pub enum Dataset<'a> {
    Clients(&'a [Client]),
    Workers(&'a [Worker]),
    Tasks(&'a [Task]),
}

impl<'a> Dataset<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Dataset::Clients(_) => EntityKind::Clients,
            Dataset::Workers(_) => EntityKind::Workers,
            Dataset::Tasks(_) => EntityKind::Tasks,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Clients(rows) => rows.len(),
            Dataset::Workers(rows) => rows.len(),
            Dataset::Tasks(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present columns of the first row (empty for an empty dataset)
    pub fn first_row_fields(&self) -> Option<Vec<&'static str>> {
        match self {
            Dataset::Clients(rows) => rows.first().map(|r| r.present_fields()),
            Dataset::Workers(rows) => rows.first().map(|r| r.present_fields()),
            Dataset::Tasks(rows) => rows.first().map(|r| r.present_fields()),
        }
    }

    /// Rows as a JSON array, the form handed to the advisory oracle
    pub fn to_json(&self) -> serde_json::Value {
        let encoded = match self {
            Dataset::Clients(rows) => serde_json::to_value(rows),
            Dataset::Workers(rows) => serde_json::to_value(rows),
            Dataset::Tasks(rows) => serde_json::to_value(rows),
        };
        // Rows are plain data with string keys; encoding cannot fail
        encoded.unwrap_or(serde_json::Value::Array(Vec::new()))
    }

    /// SHA-256 over the canonical JSON encoding of the rows
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.kind().as_str());
        hasher.update(self.to_json().to_string());
        format!("{:x}", hasher.finalize())
    }
}

/// The full triple of datasets used for cross-referencing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBundle {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl DataBundle {
    pub fn new(clients: Vec<Client>, workers: Vec<Worker>, tasks: Vec<Task>) -> Self {
        DataBundle {
            clients,
            workers,
            tasks,
        }
    }

    pub fn dataset(&self, kind: EntityKind) -> Dataset<'_> {
        match kind {
            EntityKind::Clients => Dataset::Clients(&self.clients),
            EntityKind::Workers => Dataset::Workers(&self.workers),
            EntityKind::Tasks => Dataset::Tasks(&self.tasks),
        }
    }

    pub fn has_task(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|t| t.task_id.as_deref() == Some(task_id))
    }

    /// True when at least one worker lists the skill
    pub fn skill_is_covered(&self, skill: &str) -> bool {
        self.workers.iter().any(|w| w.has_skill(skill))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("Tasks".parse::<EntityKind>().unwrap(), EntityKind::Tasks);
        assert_eq!("worker".parse::<EntityKind>().unwrap(), EntityKind::Workers);
        assert!("projects".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_required_fields_order() {
        assert_eq!(
            EntityKind::Clients.required_fields(),
            vec!["ClientID", "ClientName", "PriorityLevel", "RequestedTaskIDs", "GroupTag", "AttributesJSON"]
        );
        assert_eq!(EntityKind::Workers.required_fields().len(), 7);
        assert_eq!(EntityKind::Tasks.required_fields()[6], "MaxConcurrent");
    }

    #[test]
    fn test_integer_helpers() {
        assert!(is_integer(3.0));
        assert!(!is_integer(2.5));
        assert!(!is_integer(f64::NAN));
        assert!(is_positive_integer(1.0));
        assert!(!is_positive_integer(0.0));
        assert!(!is_positive_integer(-4.0));
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let mut bundle = DataBundle::default();
        bundle.tasks.push(Task {
            task_id: Some("T1".to_string()),
            ..Task::default()
        });

        let a = bundle.dataset(EntityKind::Tasks).fingerprint();
        let b = bundle.dataset(EntityKind::Tasks).fingerprint();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        bundle.tasks[0].duration = Some(2.0);
        assert_ne!(a, bundle.dataset(EntityKind::Tasks).fingerprint());
    }

    #[test]
    fn test_bundle_lookups() {
        let bundle = DataBundle::new(
            vec![],
            vec![Worker {
                worker_id: Some("W1".to_string()),
                skills: Some(vec!["python".to_string()]),
                ..Worker::default()
            }],
            vec![Task {
                task_id: Some("T1".to_string()),
                ..Task::default()
            }],
        );

        assert!(bundle.has_task("T1"));
        assert!(!bundle.has_task("T2"));
        assert!(bundle.skill_is_covered("python"));
        assert!(!bundle.skill_is_covered("welding"));
        assert_eq!(bundle.dataset(EntityKind::Clients).len(), 0);
    }
}
