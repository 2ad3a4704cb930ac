// ⚖️ Cross-Entity Checker - can the worker pool actually carry the tasks?
//
// Two feasibility checks over the task dataset:
//   qualified workers (skills ⊇ required) >= MaxConcurrent     (per task)
//   Σ Duration preferring phase p <= Σ MaxLoadPerPhase in p    (per phase)
//
// Both only make sense when there is at least one worker; otherwise this
// stage contributes nothing.

use crate::entities::{DataBundle, Dataset, Task};
use crate::validation::{Findings, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Penalty for a task that cannot reach its MaxConcurrent
pub const CONCURRENCY_PENALTY: i64 = 5;

/// Penalty per oversaturated phase
pub const PHASE_CAPACITY_PENALTY: i64 = 10;

// ============================================================================
// PHASE LOAD
// ============================================================================

/// Requested duration against available capacity for one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseLoad {
    pub phase: i64,
    pub requested: f64,
    pub capacity: f64,
}

impl PhaseLoad {
    pub fn is_oversaturated(&self) -> bool {
        self.requested > self.capacity
    }
}

// ============================================================================
// CROSS-ENTITY CHECKER
// ============================================================================

pub struct CrossEntityChecker<'a> {
    bundle: &'a DataBundle,
}

impl<'a> CrossEntityChecker<'a> {
    pub fn new(bundle: &'a DataBundle) -> Self {
        CrossEntityChecker { bundle }
    }

    pub fn validate(&self, dataset: &Dataset<'_>) -> Findings {
        match *dataset {
            Dataset::Tasks(tasks) if !self.bundle.workers.is_empty() => self
                .check_concurrency(tasks)
                .then(self.check_phase_capacity(tasks)),
            Dataset::Tasks(_) | Dataset::Clients(_) | Dataset::Workers(_) => Findings::new(),
        }
    }

    /// Workers whose skill set covers every skill the task requires
    pub fn qualified_workers(&self, task: &Task) -> usize {
        let required = task.required_skills();
        self.bundle
            .workers
            .iter()
            .filter(|worker| worker.covers(required))
            .count()
    }

    fn check_concurrency(&self, tasks: &[Task]) -> Findings {
        tasks
            .iter()
            .enumerate()
            .fold(Findings::new(), |findings, (index, task)| {
                let Some(max_concurrent) = task.max_concurrent else {
                    return findings;
                };

                let qualified = self.qualified_workers(task);
                if (qualified as f64) >= max_concurrent {
                    return findings;
                }

                findings.error(
                    ValidationIssue::error(
                        index + 1,
                        "MaxConcurrent",
                        format!("Not enough qualified workers for MaxConcurrent: {}", max_concurrent),
                    )
                    .with_suggestion(format!(
                        "Reduce MaxConcurrent to {} or add more qualified workers",
                        qualified
                    )),
                    CONCURRENCY_PENALTY,
                )
            })
    }

    /// Per-phase requested duration and capacity, phases ascending
    pub fn phase_loads(&self, tasks: &[Task]) -> Vec<PhaseLoad> {
        let mut requested: BTreeMap<i64, f64> = BTreeMap::new();
        for task in tasks {
            let duration = task.duration.unwrap_or(0.0);
            for phase in task.integral_phases() {
                *requested.entry(phase).or_insert(0.0) += duration;
            }
        }

        requested
            .into_iter()
            .map(|(phase, requested)| {
                let capacity: f64 = self
                    .bundle
                    .workers
                    .iter()
                    .filter(|worker| worker.is_available_in(phase))
                    .map(|worker| worker.max_load_per_phase.unwrap_or(0.0))
                    .sum();
                PhaseLoad {
                    phase,
                    requested,
                    capacity,
                }
            })
            .collect()
    }

    fn check_phase_capacity(&self, tasks: &[Task]) -> Findings {
        self.phase_loads(tasks)
            .into_iter()
            .filter(PhaseLoad::is_oversaturated)
            .fold(Findings::new(), |findings, load| {
                tracing::debug!(
                    phase = load.phase,
                    requested = load.requested,
                    capacity = load.capacity,
                    "phase oversaturated"
                );
                findings.error(
                    ValidationIssue::error(
                        0,
                        "",
                        format!(
                            "Phase {} is oversaturated: {} task duration exceeds {} available slots",
                            load.phase, load.requested, load.capacity
                        ),
                    )
                    .with_suggestion("Reduce task durations or increase worker availability for this phase"),
                    PHASE_CAPACITY_PENALTY,
                )
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Client, Worker};

    fn worker(id: &str, skills: &[&str], slots: &[f64], max_load: f64) -> Worker {
        Worker {
            worker_id: Some(id.to_string()),
            skills: Some(skills.iter().map(|s| s.to_string()).collect()),
            available_slots: Some(slots.to_vec()),
            max_load_per_phase: Some(max_load),
            ..Worker::default()
        }
    }

    fn task(id: &str, skills: &[&str], phases: &[f64], duration: f64, max_concurrent: f64) -> Task {
        Task {
            task_id: Some(id.to_string()),
            required_skills: Some(skills.iter().map(|s| s.to_string()).collect()),
            preferred_phases: Some(phases.to_vec()),
            duration: Some(duration),
            max_concurrent: Some(max_concurrent),
            ..Task::default()
        }
    }

    #[test]
    fn test_insufficient_qualified_workers() {
        let bundle = DataBundle::new(
            vec![],
            vec![
                worker("W1", &["python", "sql"], &[1.0], 10.0),
                worker("W2", &["python"], &[1.0], 10.0),
            ],
            vec![task("T1", &["python", "sql"], &[1.0], 1.0, 3.0)],
        );

        let findings = CrossEntityChecker::new(&bundle).validate(&Dataset::Tasks(&bundle.tasks));

        assert_eq!(findings.errors.len(), 1);
        let error = &findings.errors[0];
        assert_eq!(error.row, 1);
        assert_eq!(error.column, "MaxConcurrent");
        assert_eq!(error.message, "Not enough qualified workers for MaxConcurrent: 3");
        assert_eq!(
            error.suggestion.as_deref(),
            Some("Reduce MaxConcurrent to 1 or add more qualified workers")
        );
        assert_eq!(findings.penalty, CONCURRENCY_PENALTY);
    }

    #[test]
    fn test_task_without_skills_is_covered_by_everyone() {
        let bundle = DataBundle::new(
            vec![],
            vec![worker("W1", &[], &[1.0], 5.0), worker("W2", &[], &[1.0], 5.0)],
            vec![],
        );
        let t = task("T1", &[], &[1.0], 1.0, 2.0);
        assert_eq!(CrossEntityChecker::new(&bundle).qualified_workers(&t), 2);
    }

    #[test]
    fn test_phase_oversaturation_names_phase_load_and_capacity() {
        let bundle = DataBundle::new(
            vec![],
            vec![
                worker("W1", &["python"], &[2.0], 3.0),
                worker("W2", &["python"], &[1.0, 2.0], 2.0),
            ],
            vec![
                task("T1", &["python"], &[2.0], 5.0, 1.0),
                task("T2", &["python"], &[2.0], 3.0, 1.0),
            ],
        );

        let findings = CrossEntityChecker::new(&bundle).validate(&Dataset::Tasks(&bundle.tasks));

        assert_eq!(findings.errors.len(), 1);
        let error = &findings.errors[0];
        assert_eq!(error.row, 0);
        assert_eq!(error.column, "");
        assert_eq!(
            error.message,
            "Phase 2 is oversaturated: 8 task duration exceeds 5 available slots"
        );
        assert!(error.suggestion.is_some());
        assert_eq!(findings.penalty, PHASE_CAPACITY_PENALTY);
    }

    #[test]
    fn test_phase_loads_are_ascending() {
        let bundle = DataBundle::new(
            vec![],
            vec![worker("W1", &[], &[1.0], 1.0)],
            vec![task("T1", &[], &[3.0, 1.0], 2.0, 1.0)],
        );

        let loads = CrossEntityChecker::new(&bundle).phase_loads(&bundle.tasks);

        assert_eq!(loads.iter().map(|l| l.phase).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(loads[0].capacity, 1.0);
        assert_eq!(loads[1].capacity, 0.0);
        assert!(loads.iter().all(PhaseLoad::is_oversaturated));
    }

    #[test]
    fn test_no_workers_is_noop() {
        let bundle = DataBundle::new(vec![], vec![], vec![task("T1", &["x"], &[1.0], 9.0, 4.0)]);
        let findings = CrossEntityChecker::new(&bundle).validate(&Dataset::Tasks(&bundle.tasks));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_non_task_datasets_are_noop() {
        let bundle = DataBundle::new(
            vec![Client::default()],
            vec![worker("W1", &[], &[1.0], 1.0)],
            vec![task("T1", &["x"], &[1.0], 9.0, 4.0)],
        );
        let checker = CrossEntityChecker::new(&bundle);

        assert!(checker.validate(&Dataset::Clients(&bundle.clients)).is_empty());
        assert!(checker.validate(&Dataset::Workers(&bundle.workers)).is_empty());
    }
}
