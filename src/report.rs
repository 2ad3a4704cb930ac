// 📊 Bundle Report - all three datasets, one verdict for the export gate

use crate::advisory::Advisor;
use crate::engine::validate_kind;
use crate::entities::{DataBundle, EntityKind};
use crate::rules::AllocationConfig;
use crate::validation::ValidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub kind: EntityKind,
    /// SHA-256 of the rows this result was computed from
    pub fingerprint: String,
    pub result: ValidationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleReport {
    pub generated_at: DateTime<Utc>,
    pub datasets: Vec<DatasetReport>,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Every dataset validated without errors
    pub ready_for_export: bool,
    /// Rules and priorities, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationConfig>,
}

impl BundleReport {
    pub fn from_reports(datasets: Vec<DatasetReport>) -> Self {
        let total_errors = datasets.iter().map(|d| d.result.summary.total_errors).sum();
        let total_warnings = datasets.iter().map(|d| d.result.summary.total_warnings).sum();
        let ready_for_export = datasets.iter().all(|d| d.result.is_valid);

        BundleReport {
            generated_at: Utc::now(),
            datasets,
            total_errors,
            total_warnings,
            ready_for_export,
            allocation: None,
        }
    }

    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = Some(allocation);
        self
    }

    pub fn get(&self, kind: EntityKind) -> Option<&DatasetReport> {
        self.datasets.iter().find(|d| d.kind == kind)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} datasets: {} errors, {} warnings | export {}",
            self.datasets.len(),
            self.total_errors,
            self.total_warnings,
            if self.ready_for_export { "ready" } else { "blocked" }
        )
    }
}

async fn dataset_report(kind: EntityKind, bundle: &DataBundle, advisor: &dyn Advisor) -> DatasetReport {
    DatasetReport {
        kind,
        fingerprint: bundle.dataset(kind).fingerprint(),
        result: validate_kind(kind, bundle, advisor).await,
    }
}

/// Validate the selected kinds, one independent pass each, run concurrently
pub async fn validate_selected(
    kinds: &[EntityKind],
    bundle: &DataBundle,
    advisor: &dyn Advisor,
) -> BundleReport {
    let (clients, workers, tasks) = tokio::join!(
        async {
            if kinds.contains(&EntityKind::Clients) {
                Some(dataset_report(EntityKind::Clients, bundle, advisor).await)
            } else {
                None
            }
        },
        async {
            if kinds.contains(&EntityKind::Workers) {
                Some(dataset_report(EntityKind::Workers, bundle, advisor).await)
            } else {
                None
            }
        },
        async {
            if kinds.contains(&EntityKind::Tasks) {
                Some(dataset_report(EntityKind::Tasks, bundle, advisor).await)
            } else {
                None
            }
        },
    );

    BundleReport::from_reports([clients, workers, tasks].into_iter().flatten().collect())
}

/// Validate all three datasets
pub async fn validate_bundle(bundle: &DataBundle, advisor: &dyn Advisor) -> BundleReport {
    validate_selected(&EntityKind::ALL, bundle, advisor).await
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::NoAdvisor;
    use crate::entities::{Attributes, Client, Task, Worker};

    fn bundle() -> DataBundle {
        DataBundle::new(
            vec![Client {
                client_id: Some("C1".to_string()),
                client_name: Some("Acme".to_string()),
                priority_level: Some(2.0),
                requested_task_ids: Some(vec!["T1".to_string()]),
                group_tag: Some("A".to_string()),
                attributes_json: Some(Attributes::Text("{}".to_string())),
            }],
            vec![Worker {
                worker_id: Some("W1".to_string()),
                worker_name: Some("Ana".to_string()),
                skills: Some(vec!["python".to_string()]),
                available_slots: Some(vec![1.0]),
                max_load_per_phase: Some(2.0),
                worker_group: Some("A".to_string()),
                qualification_level: Some(1.0),
            }],
            vec![Task {
                task_id: Some("T1".to_string()),
                task_name: Some("Build".to_string()),
                category: Some("Eng".to_string()),
                duration: Some(1.0),
                required_skills: Some(vec!["python".to_string()]),
                preferred_phases: Some(vec![1.0]),
                max_concurrent: Some(1.0),
            }],
        )
    }

    #[tokio::test]
    async fn test_clean_bundle_is_ready_for_export() {
        let report = validate_bundle(&bundle(), &NoAdvisor).await;

        assert_eq!(report.datasets.len(), 3);
        assert_eq!(report.total_errors, 0);
        assert!(report.ready_for_export);
        assert_eq!(report.datasets[0].kind, EntityKind::Clients);
        assert_eq!(report.datasets[2].kind, EntityKind::Tasks);
    }

    #[tokio::test]
    async fn test_any_error_blocks_export() {
        let mut data = bundle();
        data.workers[0].max_load_per_phase = Some(0.0);

        let report = validate_bundle(&data, &NoAdvisor).await;

        assert!(!report.ready_for_export);
        // Bad worker row, plus phase 1 now has no capacity for T1
        assert_eq!(report.get(EntityKind::Workers).unwrap().result.errors.len(), 1);
        assert_eq!(report.get(EntityKind::Tasks).unwrap().result.errors.len(), 1);
        assert_eq!(report.total_errors, 2);
        assert!(report.summary().contains("blocked"));
    }

    #[tokio::test]
    async fn test_validate_selected_subset() {
        let report = validate_selected(&[EntityKind::Tasks], &bundle(), &NoAdvisor).await;

        assert_eq!(report.datasets.len(), 1);
        assert!(report.get(EntityKind::Clients).is_none());
    }

    #[tokio::test]
    async fn test_fingerprints_match_for_identical_inputs() {
        let first = validate_bundle(&bundle(), &NoAdvisor).await;
        let second = validate_bundle(&bundle(), &NoAdvisor).await;

        for (a, b) in first.datasets.iter().zip(second.datasets.iter()) {
            assert_eq!(a.fingerprint, b.fingerprint);
            assert_eq!(a.result, b.result);
        }
    }
}
