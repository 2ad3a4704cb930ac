// Data Alchemist - Core Library
// Validation and consistency scoring for client / worker / task datasets.
// Exposes all modules for use in CLI, API server, and tests

pub mod advisory;       // Advisory oracle seam + response parsing
pub mod cross_entity;   // Concurrency + phase capacity feasibility
pub mod engine;         // Pipeline: schema → rows → cross-entity → advisory
pub mod entities;       // Client / Worker / Task rows and dataset views
pub mod loader;         // CSV / JSON ingestion adapter
pub mod report;         // Bundle report for the export gate
pub mod row_validator;  // Per-row checks
pub mod rules;          // Business rules + priorities (pass-through)
pub mod schema;         // Required column gate
pub mod validation;     // Issues, findings, ValidationResult

// Re-export commonly used types
pub use advisory::{
    parse_assessment, parse_fixes, Advisor, AdvisorConfig, AdvisoryError, Assessment, AssessmentRequest,
    FixRequest, FixSuggestion, HttpAdvisor, NoAdvisor, StaticAdvisor,
};
pub use cross_entity::{CrossEntityChecker, PhaseLoad};
pub use engine::{attach_fixes, local_findings, validate, validate_kind};
pub use entities::{
    Attributes, Client, DataBundle, Dataset, EntityKind, FieldShape, Record, Task, Worker,
};
pub use loader::{load_bundle, load_rows};
pub use report::{validate_bundle, validate_selected, BundleReport, DatasetReport};
pub use row_validator::RowValidator;
pub use rules::{AllocationConfig, BusinessRule, PrioritySettings};
pub use schema::SchemaValidator;
pub use validation::{Findings, Severity, ValidationIssue, ValidationResult, ValidationSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
