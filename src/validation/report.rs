//! Structured validation results

use serde::Serialize;
use std::fmt;

/// One failing constraint on one focus node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub focus_node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// SHACL constraint component, e.g. `sh:MinCountConstraintComponent`
    pub constraint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

/// All violations found for one validation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    pub conforms: bool,
    pub violations: Vec<Violation>,
}

impl ViolationReport {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self {
            conforms: violations.is_empty(),
            violations,
        }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Machine-readable form handed back to callers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} constraint violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "; {}: {}", v.focus_node, v.message)?;
        }
        Ok(())
    }
}
