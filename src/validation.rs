// ✅ Validation Result - issues, confidence, summary
//
// Findings are built stage by stage as immutable values and concatenated in
// stage order; the final ValidationResult is derived from them once.

use serde::{Deserialize, Serialize};

/// Starting confidence of every pass
pub const BASE_CONFIDENCE: i64 = 100;

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 1-based row; 0 means dataset-level
    pub row: usize,
    /// Empty when the issue is not tied to a column
    pub column: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(row: usize, column: &str, message: impl Into<String>) -> Self {
        ValidationIssue {
            row,
            column: column.to_string(),
            message: message.into(),
            severity: Severity::Error,
            suggestion: None,
        }
    }

    pub fn warning(row: usize, column: &str, message: impl Into<String>) -> Self {
        ValidationIssue {
            row,
            column: column.to_string(),
            message: message.into(),
            severity: Severity::Warning,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_dataset_level(&self) -> bool {
        self.row == 0
    }
}

// ============================================================================
// FINDINGS (per-stage accumulation)
// ============================================================================

/// Issues and confidence penalty produced by one stage (or a fold of stages)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub penalty: i64,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(mut self, issue: ValidationIssue, penalty: i64) -> Self {
        self.errors.push(issue);
        self.penalty += penalty;
        self
    }

    pub fn warning(mut self, issue: ValidationIssue, penalty: i64) -> Self {
        self.warnings.push(issue);
        self.penalty += penalty;
        self
    }

    /// Concatenate `later` after `self`, preserving emission order
    pub fn then(mut self, later: Findings) -> Self {
        self.errors.extend(later.errors);
        self.warnings.extend(later.warnings);
        self.penalty += later.penalty;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn confidence(&self) -> i64 {
        BASE_CONFIDENCE - self.penalty
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    /// totalRows minus error count; rows with several errors are counted once per
    /// error, so this can undercount and even go negative
    pub valid_rows: i64,
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Not floored at zero
    pub confidence: i64,
    pub summary: ValidationSummary,
}

impl ValidationResult {
    pub fn from_parts(
        errors: Vec<ValidationIssue>,
        warnings: Vec<ValidationIssue>,
        confidence: i64,
        total_rows: usize,
    ) -> Self {
        let summary = ValidationSummary {
            total_errors: errors.len(),
            total_warnings: warnings.len(),
            valid_rows: total_rows as i64 - errors.len() as i64,
            total_rows,
        };

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            confidence,
            summary,
        }
    }

    /// Result for a dataset nobody has looked at yet
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), BASE_CONFIDENCE, 0)
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Confidence: {}, Errors: {}, Warnings: {}, Valid rows: {}/{}",
            self.confidence,
            self.summary.total_errors,
            self.summary.total_warnings,
            self.summary.valid_rows,
            self.summary.total_rows
        )
    }

    pub fn issues_for_row(&self, row: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |issue| issue.row == row)
    }
}

// ============================================================================
// TESTS
// ============================================================================
