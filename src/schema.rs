// 📐 Schema Gate - required columns present before row-level work
//
// Runs once per pass against the first row. Missing columns are reported as a
// single dataset-level error; the pass always continues.

use crate::entities::{Dataset, EntityKind};
use crate::validation::{Findings, ValidationIssue};

/// Flat penalty when any required column is missing
pub const MISSING_COLUMNS_PENALTY: i64 = 20;

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

pub struct SchemaValidator {
    kind: EntityKind,
}

impl SchemaValidator {
    pub fn new(kind: EntityKind) -> Self {
        SchemaValidator { kind }
    }

    /// Required columns absent from `present`, in canonical order
    pub fn missing_fields(&self, present: &[&str]) -> Vec<&'static str> {
        self.kind
            .required_fields()
            .into_iter()
            .filter(|field| !present.contains(field))
            .collect()
    }

    /// Check the first row's columns against the required list
    pub fn validate(&self, dataset: &Dataset<'_>) -> Findings {
        let Some(present) = dataset.first_row_fields() else {
            // No row to inspect; an empty dataset has the typed shape
            return Findings::new();
        };

        let missing = self.missing_fields(&present);
        if missing.is_empty() {
            return Findings::new();
        }

        tracing::debug!(kind = %self.kind, missing = ?missing, "schema gate: missing columns");

        Findings::new().error(
            ValidationIssue::error(
                0,
                "",
                format!("Missing required columns: {}", missing.join(", ")),
            ),
            MISSING_COLUMNS_PENALTY,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
