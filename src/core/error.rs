use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the calculation core and the credit workflow.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TaxError {
    /// Malformed value object input (currency, rate range, negative base, codes).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Arithmetic between amounts of different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// A declared tax value falls outside the tolerance of the recomputed value.
    #[error("declared tax value {declared} does not match expected {expected}")]
    ValueMismatch { declared: Decimal, expected: Decimal },

    /// Usage precondition of a higher-level operation failed.
    #[error("business rule violated: {0}")]
    BusinessRule(String),

    /// Required classification data is missing or malformed.
    #[error("structural error: {0}")]
    Structural(String),

    /// An aggregate's components do not reconcile.
    #[error("inconsistent aggregate: {0}")]
    Inconsistent(String),

    /// Failure reported by an external store.
    #[error("repository error: {0}")]
    Repository(String),

    /// Rate tables or transition schedule are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A batch item failed; the whole batch is rejected.
    #[error("item {item_id}: {source}")]
    BatchItem {
        item_id: String,
        #[source]
        source: Box<TaxError>,
    },
}

/// Coarse classification used by callers to map errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something unusable (4xx-equivalent).
    Input,
    /// Something outside the core failed (5xx-equivalent).
    Infrastructure,
}

impl TaxError {
    /// Which side of the boundary is responsible for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Repository(_) | Self::Configuration(_) | Self::Inconsistent(_) => {
                ErrorCategory::Infrastructure
            }
            Self::BatchItem { source, .. } => source.category(),
            _ => ErrorCategory::Input,
        }
    }

    pub(crate) fn currency_mismatch(left: impl ToString, right: impl ToString) -> Self {
        Self::CurrencyMismatch {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

/// A single structural problem with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dot-separated path to the offending field (e.g. "items[2].cfop").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collapse collected field errors into one structural error.
pub(crate) fn structural_from(errors: &[FieldError]) -> TaxError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    TaxError::Structural(msg)
}
