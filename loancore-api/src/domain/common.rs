use serde::{Deserialize, Serialize};

/// Result of a boundary-level validation pass (HTTP DTO -> domain value
/// object). The calculator never sees raw strings; everything
/// that reaches `loancore-logic`'s validation module collapses to this
/// shape before the calculator runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataValidationResult {
    pub is_valid: bool,
    pub validation_errors: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Pagination envelope shared by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
