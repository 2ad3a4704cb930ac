// 🏷️ Allocation Rules - Rules as Data
// Business rules and priority weights for the downstream allocator.
// The validation engine carries these through; it never interprets them.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    /// Rule ID for tracking
    pub id: String,

    /// Rule family, e.g. "coRun", "slotRestriction", "loadLimit"
    #[serde(rename = "type")]
    pub rule_type: String,

    #[serde(default)]
    pub description: String,

    /// Rule body, opaque to this crate
    #[serde(default)]
    pub rule: serde_json::Value,
}

// ============================================================================
// PRIORITY SETTINGS
// ============================================================================

/// Relative weights (percent) the allocator gives each objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrioritySettings {
    pub client_priority_weight: u32,
    pub skill_match_weight: u32,
    pub workload_balance_weight: u32,
    pub deadline_weight: u32,
    pub cost_optimization_weight: u32,
}

impl Default for PrioritySettings {
    fn default() -> Self {
        PrioritySettings {
            client_priority_weight: 30,
            skill_match_weight: 25,
            workload_balance_weight: 20,
            deadline_weight: 15,
            cost_optimization_weight: 10,
        }
    }
}

impl PrioritySettings {
    pub fn total_weight(&self) -> u32 {
        self.client_priority_weight
            + self.skill_match_weight
            + self.workload_balance_weight
            + self.deadline_weight
            + self.cost_optimization_weight
    }
}

// ============================================================================
// ALLOCATION CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub rules: Vec<BusinessRule>,
    pub priorities: PrioritySettings,
}

impl AllocationConfig {
    /// Load rules and priorities from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse rules JSON")
    }
}

// ============================================================================
// TESTS
// ============================================================================
