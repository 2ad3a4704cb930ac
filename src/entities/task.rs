// 📋 Task Entity - duration, skills needed, preferred phases

use super::{is_integer, EntityKind, FieldShape, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "TaskID", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(rename = "TaskName", skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,

    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Number of phases the task occupies
    #[serde(rename = "Duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(rename = "RequiredSkills", skip_serializing_if = "Option::is_none")]
    pub required_skills: Option<Vec<String>>,

    #[serde(rename = "PreferredPhases", skip_serializing_if = "Option::is_none")]
    pub preferred_phases: Option<Vec<f64>>,

    /// Upper bound on workers assigned in parallel
    #[serde(rename = "MaxConcurrent", skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<f64>,
}

impl Task {
    pub fn required_skills(&self) -> &[String] {
        self.required_skills.as_deref().unwrap_or(&[])
    }

    /// Whole-numbered preferred phases; fractional entries are skipped
    pub fn integral_phases(&self) -> impl Iterator<Item = i64> + '_ {
        self.preferred_phases
            .iter()
            .flatten()
            .filter(|phase| is_integer(**phase))
            .map(|phase| *phase as i64)
    }
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Tasks;
    const FIELDS: &'static [(&'static str, FieldShape)] = &[
        ("TaskID", FieldShape::Text),
        ("TaskName", FieldShape::Text),
        ("Category", FieldShape::Text),
        ("Duration", FieldShape::Number),
        ("RequiredSkills", FieldShape::TextList),
        ("PreferredPhases", FieldShape::NumberList),
        ("MaxConcurrent", FieldShape::Number),
    ];

    fn id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let present = [
            self.task_id.is_some(),
            self.task_name.is_some(),
            self.category.is_some(),
            self.duration.is_some(),
            self.required_skills.is_some(),
            self.preferred_phases.is_some(),
            self.max_concurrent.is_some(),
        ];
        Self::FIELDS
            .iter()
            .zip(present)
            .filter(|(_, is_present)| *is_present)
            .map(|((name, _), _)| *name)
            .collect()
    }
}
