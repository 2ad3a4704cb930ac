// 🔎 Row Validator - per-row structural and semantic checks
//
// Every row is checked in order: duplicate identifier first, then the
// kind-specific checks. Several checks can fire on one row.

use crate::entities::{
    is_integer, is_positive_integer, Client, DataBundle, Dataset, EntityKind, Record, Task,
    Worker,
};
use crate::validation::{Findings, ValidationIssue};
use std::collections::HashSet;

/// Penalty for each row-level error
pub const FIELD_ERROR_PENALTY: i64 = 5;

/// Penalty for each uncovered required skill
pub const UNCOVERED_SKILL_PENALTY: i64 = 2;

const POSITIVE_LIST_SUGGESTION: &str = "Correct to an array of positive integers (e.g., [1, 2, 3])";

// ============================================================================
// ROW VALIDATOR
// ============================================================================

pub struct RowValidator<'a> {
    /// Sibling datasets used for reference checks
    bundle: &'a DataBundle,
}

impl<'a> RowValidator<'a> {
    pub fn new(bundle: &'a DataBundle) -> Self {
        RowValidator { bundle }
    }

    /// Validate every row of the dataset, rows in original order
    pub fn validate(&self, dataset: &Dataset<'_>) -> Findings {
        match *dataset {
            Dataset::Clients(rows) => self.fold_rows(rows, |row, c| self.check_client(row, c)),
            Dataset::Workers(rows) => self.fold_rows(rows, |row, w| self.check_worker(row, w)),
            Dataset::Tasks(rows) => self.fold_rows(rows, |row, t| self.check_task(row, t)),
        }
    }

    fn fold_rows<R, F>(&self, rows: &[R], check: F) -> Findings
    where
        R: Record,
        F: Fn(usize, &R) -> Findings,
    {
        let mut seen: HashSet<&str> = HashSet::new();

        rows.iter()
            .enumerate()
            .fold(Findings::new(), |findings, (index, record)| {
                let row = index + 1;
                let duplicate = match record.id() {
                    Some(id) if !seen.insert(id) => duplicate_id(row, R::KIND, id),
                    _ => Findings::new(),
                };
                findings.then(duplicate).then(check(row, record))
            })
    }

    // ========================================================================
    // CLIENT RULES
    // ========================================================================

    fn check_client(&self, row: usize, client: &Client) -> Findings {
        let mut findings = Findings::new();

        let priority_ok = client
            .priority_level
            .map_or(false, |p| is_integer(p) && (1.0..=5.0).contains(&p));
        if !priority_ok {
            findings = findings.error(
                ValidationIssue::error(row, "PriorityLevel", "PriorityLevel must be an integer between 1 and 5")
                    .with_suggestion("Set PriorityLevel to a value between 1 and 5"),
                FIELD_ERROR_PENALTY,
            );
        }

        for task_id in client.requested_task_ids.iter().flatten() {
            if !self.bundle.has_task(task_id) {
                findings = findings.error(
                    ValidationIssue::error(row, "RequestedTaskIDs", format!("Unknown TaskID: {}", task_id)),
                    FIELD_ERROR_PENALTY,
                );
            }
        }

        let attributes_ok = client
            .attributes_json
            .as_ref()
            .map_or(false, |attributes| attributes.is_well_formed());
        if !attributes_ok {
            findings = findings.error(
                ValidationIssue::error(row, "AttributesJSON", "Invalid JSON in AttributesJSON")
                    .with_suggestion("Provide valid JSON or remove invalid content"),
                FIELD_ERROR_PENALTY,
            );
        }

        findings
    }

    // ========================================================================
    // WORKER RULES
    // ========================================================================

    fn check_worker(&self, row: usize, worker: &Worker) -> Findings {
        let mut findings = Findings::new();

        let slots_ok = worker
            .available_slots
            .as_ref()
            .map_or(false, |slots| !slots.is_empty() && slots.iter().all(|s| is_positive_integer(*s)));
        if !slots_ok {
            findings = findings.error(
                ValidationIssue::error(row, "AvailableSlots", "AvailableSlots must be a non-empty array of positive integers")
                    .with_suggestion(POSITIVE_LIST_SUGGESTION),
                FIELD_ERROR_PENALTY,
            );
        }

        if !worker.max_load_per_phase.map_or(false, is_positive_integer) {
            findings = findings.error(
                ValidationIssue::error(row, "MaxLoadPerPhase", "MaxLoadPerPhase must be a positive integer")
                    .with_suggestion("Set MaxLoadPerPhase to a positive integer"),
                FIELD_ERROR_PENALTY,
            );
        }

        findings
    }

    // ========================================================================
    // TASK RULES
    // ========================================================================

    fn check_task(&self, row: usize, task: &Task) -> Findings {
        let mut findings = Findings::new();

        if !task.duration.map_or(false, is_positive_integer) {
            findings = findings.error(
                ValidationIssue::error(row, "Duration", "Duration must be a positive integer")
                    .with_suggestion("Set Duration to a positive integer"),
                FIELD_ERROR_PENALTY,
            );
        }

        let phases_ok = task
            .preferred_phases
            .as_ref()
            .map_or(false, |phases| phases.iter().all(|p| is_positive_integer(*p)));
        if !phases_ok {
            findings = findings.error(
                ValidationIssue::error(row, "PreferredPhases", "PreferredPhases must be an array of positive integers")
                    .with_suggestion(POSITIVE_LIST_SUGGESTION),
                FIELD_ERROR_PENALTY,
            );
        }

        if !task.max_concurrent.map_or(false, is_positive_integer) {
            findings = findings.error(
                ValidationIssue::error(row, "MaxConcurrent", "MaxConcurrent must be a positive integer")
                    .with_suggestion("Set MaxConcurrent to a positive integer"),
                FIELD_ERROR_PENALTY,
            );
        }

        for skill in task.required_skills() {
            if !self.bundle.skill_is_covered(skill) {
                findings = findings.warning(
                    ValidationIssue::warning(row, "RequiredSkills", format!("No worker has the required skill: {}", skill))
                        .with_suggestion("Add a worker with this skill or remove it from RequiredSkills"),
                    UNCOVERED_SKILL_PENALTY,
                );
            }
        }

        findings
    }
}

fn duplicate_id(row: usize, kind: EntityKind, id: &str) -> Findings {
    let column = kind.id_column();
    Findings::new().error(
        ValidationIssue::error(row, column, format!("Duplicate {}: {}", column, id)),
        FIELD_ERROR_PENALTY,
    )
}

// ============================================================================
// TESTS
// ============================================================================
