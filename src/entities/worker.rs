// 🧑‍💼 Worker Entity - skills, phases and per-phase load ceiling

use super::{is_integer, EntityKind, FieldShape, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    #[serde(rename = "WorkerID", skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    #[serde(rename = "WorkerName", skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,

    #[serde(rename = "Skills", skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,

    /// Phases this worker can be scheduled in
    #[serde(rename = "AvailableSlots", skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<Vec<f64>>,

    #[serde(rename = "MaxLoadPerPhase", skip_serializing_if = "Option::is_none")]
    pub max_load_per_phase: Option<f64>,

    #[serde(rename = "WorkerGroup", skip_serializing_if = "Option::is_none")]
    pub worker_group: Option<String>,

    #[serde(rename = "QualificationLevel", skip_serializing_if = "Option::is_none")]
    pub qualification_level: Option<f64>,
}

impl Worker {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills
            .as_ref()
            .map_or(false, |skills| skills.iter().any(|s| s == skill))
    }

    /// Worker holds every listed skill
    pub fn covers(&self, required: &[String]) -> bool {
        required.iter().all(|skill| self.has_skill(skill))
    }

    pub fn is_available_in(&self, phase: i64) -> bool {
        self.available_slots.as_ref().map_or(false, |slots| {
            slots.iter().any(|slot| is_integer(*slot) && *slot as i64 == phase)
        })
    }
}

impl Record for Worker {
    const KIND: EntityKind = EntityKind::Workers;
    const FIELDS: &'static [(&'static str, FieldShape)] = &[
        ("WorkerID", FieldShape::Text),
        ("WorkerName", FieldShape::Text),
        ("Skills", FieldShape::TextList),
        ("AvailableSlots", FieldShape::NumberList),
        ("MaxLoadPerPhase", FieldShape::Number),
        ("WorkerGroup", FieldShape::Text),
        ("QualificationLevel", FieldShape::Number),
    ];

    fn id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let present = [
            self.worker_id.is_some(),
            self.worker_name.is_some(),
            self.skills.is_some(),
            self.available_slots.is_some(),
            self.max_load_per_phase.is_some(),
            self.worker_group.is_some(),
            self.qualification_level.is_some(),
        ];
        Self::FIELDS
            .iter()
            .zip(present)
            .filter(|(_, is_present)| *is_present)
            .map(|((name, _), _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welder() -> Worker {
        Worker {
            worker_id: Some("W1".to_string()),
            skills: Some(vec!["welding".to_string(), "rigging".to_string()]),
            available_slots: Some(vec![1.0, 3.0]),
            ..Worker::default()
        }
    }

    #[test]
    fn test_covers_requires_superset() {
        let worker = welder();
        assert!(worker.covers(&["welding".to_string()]));
        assert!(worker.covers(&[]));
        assert!(!worker.covers(&["welding".to_string(), "python".to_string()]));
    }

    #[test]
    fn test_worker_without_skills_covers_nothing() {
        let worker = Worker::default();
        assert!(!worker.has_skill("welding"));
        assert!(worker.covers(&[]));
    }

    #[test]
    fn test_is_available_in() {
        let worker = welder();
        assert!(worker.is_available_in(3));
        assert!(!worker.is_available_in(2));
    }
}
