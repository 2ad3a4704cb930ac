//! Advisory oracle seam.
//!
//! The engine can consult an external service for a holistic assessment of a
//! dataset and for suggested fixes. The service is optional and best-effort:
//! every failure mode (not configured, transport error, bad status, unusable
//! response) is an [`AdvisoryError`] that the engine absorbs.
//!
//! Oracles return raw response text; parsing lives here so that every adapter
//! gets the same leniency (code fences stripped, malformed entries dropped).

use crate::entities::EntityKind;
use crate::validation::{Severity, ValidationIssue};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory oracle is not configured")]
    NotConfigured,

    #[error("advisory request failed: {0}")]
    Transport(String),

    #[error("advisory oracle returned status {0}")]
    Status(u16),

    #[error("advisory response unusable: {0}")]
    Malformed(String),
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Holistic validation request: the full row set of one dataset
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRequest {
    pub kind: EntityKind,
    pub rows: Value,
}

/// Fix-suggestion request: rows plus the errors collected so far
#[derive(Debug, Clone, Serialize)]
pub struct FixRequest {
    pub kind: EntityKind,
    pub rows: Value,
    pub errors: Vec<ValidationIssue>,
}

// ============================================================================
// ORACLE TRAIT
// ============================================================================

/// Pluggable advisory oracle.
#[async_trait::async_trait]
pub trait Advisor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw response text for a holistic assessment
    async fn assess(&self, req: &AssessmentRequest) -> Result<String, AdvisoryError>;

    /// Raw response text listing suggested fixes
    async fn suggest_fixes(&self, req: &FixRequest) -> Result<String, AdvisoryError>;
}

/// No oracle configured; every call fails with `NotConfigured`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

#[async_trait::async_trait]
impl Advisor for NoAdvisor {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn assess(&self, _req: &AssessmentRequest) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::NotConfigured)
    }

    async fn suggest_fixes(&self, _req: &FixRequest) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::NotConfigured)
    }
}

/// Replays canned responses in order. An exhausted queue behaves like an
/// unconfigured oracle.
#[derive(Debug, Default)]
pub struct StaticAdvisor {
    assessments: Mutex<VecDeque<String>>,
    fixes: Mutex<VecDeque<String>>,
}

impl StaticAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assessment(self, text: impl Into<String>) -> Self {
        if let Ok(mut queue) = self.assessments.lock() {
            queue.push_back(text.into());
        }
        self
    }

    pub fn with_fixes(self, text: impl Into<String>) -> Self {
        if let Ok(mut queue) = self.fixes.lock() {
            queue.push_back(text.into());
        }
        self
    }

    fn next(queue: &Mutex<VecDeque<String>>) -> Result<String, AdvisoryError> {
        queue
            .lock()
            .map_err(|_| AdvisoryError::Transport("canned response queue poisoned".to_string()))?
            .pop_front()
            .ok_or(AdvisoryError::NotConfigured)
    }
}

#[async_trait::async_trait]
impl Advisor for StaticAdvisor {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn assess(&self, _req: &AssessmentRequest) -> Result<String, AdvisoryError> {
        Self::next(&self.assessments)
    }

    async fn suggest_fixes(&self, _req: &FixRequest) -> Result<String, AdvisoryError> {
        Self::next(&self.fixes)
    }
}

/// HTTP-backed oracle.
///
/// POSTs the request as JSON to `{base_url}/validate` and
/// `{base_url}/suggest-fixes` and hands back the body text.
#[derive(Debug, Clone)]
pub struct HttpAdvisor {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAdvisor {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AdvisoryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<String, AdvisoryError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Advisor for HttpAdvisor {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn assess(&self, req: &AssessmentRequest) -> Result<String, AdvisoryError> {
        self.post("validate", req).await
    }

    async fn suggest_fixes(&self, req: &FixRequest) -> Result<String, AdvisoryError> {
        self.post("suggest-fixes", req).await
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// How the binaries pick an oracle: an endpoint URL enables HTTP, none disables
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub url: Option<String>,
    /// Applied by the HTTP adapter only; the engine itself never times out
    pub timeout: Duration,
}

impl AdvisorConfig {
    pub fn new(url: Option<String>, timeout_secs: u64) -> Self {
        AdvisorConfig {
            url: url.filter(|u| !u.trim().is_empty()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Advisor>, AdvisoryError> {
        match &self.url {
            Some(url) => Ok(Box::new(HttpAdvisor::new(url.clone(), self.timeout)?)),
            None => {
                tracing::warn!("no advisory oracle configured; advisory checks are disabled");
                Ok(Box::new(NoAdvisor))
            }
        }
    }
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

/// Usable part of a holistic assessment
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// `None` when the oracle gave no usable score
    pub confidence: Option<i64>,
}

/// One suggested replacement value
#[derive(Debug, Clone, PartialEq)]
pub struct FixSuggestion {
    pub row: usize,
    pub column: String,
    pub suggestion: String,
}

/// Drop a surrounding ```json ... ``` fence if the oracle added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn parse_json(text: &str) -> Result<Value, AdvisoryError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| AdvisoryError::Malformed(e.to_string()))
}

fn parse_row(value: &Value) -> Option<usize> {
    let row = value.as_f64()?;
    if row.is_finite() && row >= 0.0 && row.fract() == 0.0 {
        Some(row as usize)
    } else {
        None
    }
}

/// Entries that lack a message or a sane row are dropped
fn parse_issue(value: &Value, severity: Severity) -> Option<ValidationIssue> {
    let message = value.get("message")?.as_str()?.to_string();
    let row = value.get("row").map_or(Some(0), parse_row)?;
    let column = value
        .get("column")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let suggestion = value
        .get("suggestion")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ValidationIssue {
        row,
        column,
        message,
        severity,
        suggestion,
    })
}

fn parse_issue_list(root: &Value, key: &str, severity: Severity) -> Vec<ValidationIssue> {
    root.get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| parse_issue(entry, severity))
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a holistic assessment. Only a non-object root is fatal; missing or
/// misshapen parts are discarded. Issues take the severity of the list they
/// arrived in.
pub fn parse_assessment(text: &str) -> Result<Assessment, AdvisoryError> {
    let root = parse_json(text)?;
    if !root.is_object() {
        return Err(AdvisoryError::Malformed("assessment is not a JSON object".to_string()));
    }

    Ok(Assessment {
        errors: parse_issue_list(&root, "errors", Severity::Error),
        warnings: parse_issue_list(&root, "warnings", Severity::Warning),
        confidence: root
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .map(|c| c.round() as i64),
    })
}

fn parse_fix(value: &Value) -> Option<FixSuggestion> {
    let row = parse_row(value.get("row")?)?;
    let column = value.get("column")?.as_str()?.to_string();
    let suggestion = match value.get("suggestion")? {
        Value::String(text) => text.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };

    Some(FixSuggestion {
        row,
        column,
        suggestion,
    })
}

/// Parse a fix list. The root must be an array; unusable entries are dropped.
pub fn parse_fixes(text: &str) -> Result<Vec<FixSuggestion>, AdvisoryError> {
    let root = parse_json(text)?;
    let entries = root
        .as_array()
        .ok_or_else(|| AdvisoryError::Malformed("fix list is not a JSON array".to_string()))?;

    Ok(entries.iter().filter_map(parse_fix).collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn assessment_request() -> AssessmentRequest {
        AssessmentRequest {
            kind: EntityKind::Tasks,
            rows: json!([{"TaskID": "T1"}]),
        }
    }

    #[test]
    fn test_parse_assessment_full() {
        let text = r#"{
            "errors": [{"row": 1, "column": "Duration", "message": "too long", "severity": "warning"}],
            "warnings": [{"row": 2, "column": "Category", "message": "odd category"}],
            "confidence": 72
        }"#;

        let assessment = parse_assessment(text).unwrap();

        assert_eq!(assessment.errors.len(), 1);
        assert_eq!(assessment.errors[0].severity, Severity::Error);
        assert_eq!(assessment.warnings[0].severity, Severity::Warning);
        assert_eq!(assessment.warnings[0].row, 2);
        assert_eq!(assessment.confidence, Some(72));
    }

    #[test]
    fn test_parse_assessment_strips_fence_and_drops_bad_entries() {
        let text = "```json\n{\"errors\": [{\"row\": -1, \"message\": \"x\"}, {\"row\": 3}, {\"message\": \"dataset wide\"}], \"warnings\": \"nope\"}\n```";

        let assessment = parse_assessment(text).unwrap();

        assert_eq!(assessment.errors.len(), 1);
        assert_eq!(assessment.errors[0].row, 0);
        assert_eq!(assessment.errors[0].column, "");
        assert!(assessment.warnings.is_empty());
        assert_eq!(assessment.confidence, None);
    }

    #[test]
    fn test_parse_assessment_rejects_non_object() {
        assert!(matches!(parse_assessment("[1, 2]"), Err(AdvisoryError::Malformed(_))));
        assert!(matches!(parse_assessment("I could not validate this"), Err(AdvisoryError::Malformed(_))));
        assert!(matches!(parse_assessment(""), Err(AdvisoryError::Malformed(_))));
    }

    #[test]
    fn test_parse_fixes() {
        let text = r#"[
            {"row": 1, "column": "PriorityLevel", "suggestion": 3},
            {"row": 2, "column": "GroupTag", "suggestion": "GroupB"},
            {"row": 2, "suggestion": "no column"},
            {"row": "x", "column": "Duration", "suggestion": "1"}
        ]"#;

        let fixes = parse_fixes(text).unwrap();

        assert_eq!(
            fixes,
            vec![
                FixSuggestion { row: 1, column: "PriorityLevel".to_string(), suggestion: "3".to_string() },
                FixSuggestion { row: 2, column: "GroupTag".to_string(), suggestion: "GroupB".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_fixes_rejects_object_root() {
        assert!(parse_fixes(r#"{"row": 1}"#).is_err());
    }

    #[test]
    fn test_config_picks_adapter() {
        assert_eq!(AdvisorConfig::new(None, 30).build().unwrap().name(), "none");
        assert_eq!(AdvisorConfig::new(Some("  ".to_string()), 30).build().unwrap().name(), "none");
        let http = AdvisorConfig::new(Some("http://localhost:9".to_string()), 1);
        assert_eq!(http.build().unwrap().name(), "http");
    }

    #[tokio::test]
    async fn test_no_advisor_is_not_configured() {
        let result = NoAdvisor.assess(&assessment_request()).await;
        assert!(matches!(result, Err(AdvisoryError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_static_advisor_replays_then_runs_dry() {
        let advisor = StaticAdvisor::new().with_assessment("{\"confidence\": 90}");
        let req = assessment_request();

        assert_eq!(advisor.assess(&req).await.unwrap(), "{\"confidence\": 90}");
        assert!(matches!(advisor.assess(&req).await, Err(AdvisoryError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_http_advisor_posts_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/validate").json_body_partial(r#"{"kind": "tasks"}"#);
                then.status(200).body(r#"{"errors": [], "confidence": 88}"#);
            })
            .await;

        let advisor = HttpAdvisor::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let text = advisor.assess(&assessment_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(parse_assessment(&text).unwrap().confidence, Some(88));
    }

    #[tokio::test]
    async fn test_http_advisor_maps_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/suggest-fixes");
                then.status(503);
            })
            .await;

        let advisor = HttpAdvisor::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let req = FixRequest {
            kind: EntityKind::Clients,
            rows: json!([]),
            errors: vec![],
        };

        assert!(matches!(advisor.suggest_fixes(&req).await, Err(AdvisoryError::Status(503))));
    }
}
