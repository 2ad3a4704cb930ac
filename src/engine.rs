// 🧪 Validation Engine - schema gate → rows → cross-entity → advisory merge
//
// Local stages are synchronous and deterministic. The advisory stage makes at
// most two sequential oracle calls and can only append issues, lower the
// confidence, or replace suggestions; it never removes a local finding.

use crate::advisory::{
    parse_assessment, parse_fixes, Advisor, AssessmentRequest, FixRequest, FixSuggestion,
};
use crate::cross_entity::CrossEntityChecker;
use crate::entities::{DataBundle, Dataset, EntityKind};
use crate::row_validator::RowValidator;
use crate::schema::SchemaValidator;
use crate::validation::{Findings, ValidationIssue, ValidationResult};
use tracing::{debug, info, warn};

// ============================================================================
// LOCAL PASS
// ============================================================================

/// Stages 1–3: schema gate, row checks, cross-entity checks, in that order
pub fn local_findings(dataset: &Dataset<'_>, bundle: &DataBundle) -> Findings {
    let schema = SchemaValidator::new(dataset.kind()).validate(dataset);
    let rows = RowValidator::new(bundle).validate(dataset);
    let cross = CrossEntityChecker::new(bundle).validate(dataset);

    debug!(
        kind = %dataset.kind(),
        schema_errors = schema.errors.len(),
        row_errors = rows.errors.len(),
        row_warnings = rows.warnings.len(),
        cross_errors = cross.errors.len(),
        "local stages complete"
    );

    schema.then(rows).then(cross)
}

// ============================================================================
// ADVISORY MERGE
// ============================================================================

/// Overwrite suggestions on errors whose (row, column) matches a fix exactly.
/// The first matching fix wins; unmatched fixes are dropped.
pub fn attach_fixes(
    errors: Vec<ValidationIssue>,
    fixes: &[FixSuggestion],
) -> Vec<ValidationIssue> {
    errors
        .into_iter()
        .map(|error| {
            match fixes
                .iter()
                .find(|fix| fix.row == error.row && fix.column == error.column)
            {
                Some(fix) => error.with_suggestion(fix.suggestion.clone()),
                None => error,
            }
        })
        .collect()
}

async fn merge_assessment(
    dataset: &Dataset<'_>,
    local: Findings,
    advisor: &dyn Advisor,
) -> (Findings, Option<i64>) {
    let req = AssessmentRequest {
        kind: dataset.kind(),
        rows: dataset.to_json(),
    };

    let assessment = match advisor.assess(&req).await.and_then(|text| parse_assessment(&text)) {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(advisor = advisor.name(), kind = %dataset.kind(), "advisory validation skipped: {}", e);
            return (local, None);
        }
    };

    debug!(
        advisor = advisor.name(),
        errors = assessment.errors.len(),
        warnings = assessment.warnings.len(),
        confidence = ?assessment.confidence,
        "advisory assessment merged"
    );

    let advisory = Findings {
        errors: assessment.errors,
        warnings: assessment.warnings,
        penalty: 0,
    };
    (local.then(advisory), assessment.confidence)
}

async fn request_fixes(
    dataset: &Dataset<'_>,
    errors: Vec<ValidationIssue>,
    advisor: &dyn Advisor,
) -> Vec<ValidationIssue> {
    let req = FixRequest {
        kind: dataset.kind(),
        rows: dataset.to_json(),
        errors,
    };

    match advisor.suggest_fixes(&req).await.and_then(|text| parse_fixes(&text)) {
        Ok(fixes) => {
            debug!(advisor = advisor.name(), fixes = fixes.len(), "advisory fixes received");
            attach_fixes(req.errors, &fixes)
        }
        Err(e) => {
            warn!(advisor = advisor.name(), kind = %dataset.kind(), "advisory fix suggestions skipped: {}", e);
            req.errors
        }
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Validate one dataset against the full bundle.
///
/// Total over its input: always returns a complete result. Advisory failures
/// only cost enrichment, never surface as issues.
pub async fn validate(
    dataset: Dataset<'_>,
    bundle: &DataBundle,
    advisor: &dyn Advisor,
) -> ValidationResult {
    let local = local_findings(&dataset, bundle);
    let local_confidence = local.confidence();

    let (merged, advisory_confidence) = merge_assessment(&dataset, local, advisor).await;
    let confidence = advisory_confidence.map_or(local_confidence, |c| local_confidence.min(c));

    let Findings { errors, warnings, .. } = merged;
    let errors = if errors.is_empty() {
        errors
    } else {
        request_fixes(&dataset, errors, advisor).await
    };

    let result = ValidationResult::from_parts(errors, warnings, confidence, dataset.len());
    info!(
        kind = %dataset.kind(),
        rows = result.summary.total_rows,
        errors = result.summary.total_errors,
        warnings = result.summary.total_warnings,
        confidence = result.confidence,
        "validation pass complete"
    );
    result
}

/// Validate the bundle's own dataset of `kind`
pub async fn validate_kind(
    kind: EntityKind,
    bundle: &DataBundle,
    advisor: &dyn Advisor,
) -> ValidationResult {
    validate(bundle.dataset(kind), bundle, advisor).await
}

// ============================================================================
// TESTS
// ============================================================================
