//! Local input checks.
//!
//! These run before any request is built. A failure here never reaches the
//! remote API.
//!
//! # Example
//!
//! ```
//! use braintrust_provider_core::validation::{validate_filter_values, validate_limit};
//!
//! assert!(validate_filter_values("ids", &["e-1".to_string()]).is_ok());
//! assert!(validate_filter_values("ids", &["e-1".to_string(), " ".to_string()]).is_err());
//! assert!(validate_limit("limit", 0, 1..=1000).is_err());
//! ```

use std::ops::RangeInclusive;

use crate::error::ProviderError;
use crate::tristate::TriState;

/// Borrow a value that must be known at apply time.
pub fn require_known<'a, T>(field: &str, value: &'a TriState<T>) -> Result<&'a T, ProviderError> {
    match value {
        TriState::Known(v) => Ok(v),
        TriState::Null => Err(ProviderError::validation(field, "is required")),
        TriState::Unknown => Err(ProviderError::validation(
            field,
            "must be known at apply time",
        )),
    }
}

/// Reject two attributes that may not be set together.
///
/// `Unknown` counts as set: it was written in configuration.
pub fn ensure_exclusive<A, B>(
    first: &'static str,
    a: &TriState<A>,
    second: &'static str,
    b: &TriState<B>,
) -> Result<(), ProviderError> {
    if !a.is_null() && !b.is_null() {
        return Err(ProviderError::ConflictingInput { first, second });
    }
    Ok(())
}

/// Reject multi-valued filters with blank entries.
pub fn validate_filter_values(field: &str, values: &[String]) -> Result<(), ProviderError> {
    match values.iter().position(|v| v.trim().is_empty()) {
        Some(index) => Err(ProviderError::validation(
            format!("{}.{}", field, index),
            "filter entries must not be blank",
        )),
        None => Ok(()),
    }
}

/// Reject numeric bounds outside `range`.
pub fn validate_limit(
    field: &str,
    value: i64,
    range: RangeInclusive<i64>,
) -> Result<(), ProviderError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ProviderError::validation(
            field,
            format!(
                "must be between {} and {}, got {}",
                range.start(),
                range.end(),
                value
            ),
        ))
    }
}
