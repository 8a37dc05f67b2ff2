//! Error types for the provider core.

use thiserror::Error;

use crate::client::{ApiError, EntityKind};
use crate::diagnostic::Diagnostic;

/// Errors raised by reconcilers, lookups and resource adapters.
///
/// Everything except [`ProviderError::Api`] is detected locally, before or
/// instead of a network call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A lookup matched nothing.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Kind of entity that was looked up.
        kind: EntityKind,
        /// The name or id that matched nothing.
        key: String,
    },

    /// A name lookup matched more than one live entity.
    #[error("multiple {kind}s named '{name}' found")]
    Ambiguous {
        /// Kind of entity that was looked up.
        kind: EntityKind,
        /// The name shared by the matches.
        name: String,
    },

    /// Two mutually exclusive identification modes were both supplied.
    #[error("conflicting input: '{first}' and '{second}' cannot both be set")]
    ConflictingInput {
        /// First attribute name.
        first: &'static str,
        /// Second attribute name.
        second: &'static str,
    },

    /// A structural precondition on the input failed.
    #[error("invalid value for '{field}': {message}")]
    Validation {
        /// Attribute path of the offending value.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The provider configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The REST client failed. Passed through unmodified.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Build a [`ProviderError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the error means the entity does not exist, whether
    /// detected by a lookup or reported by the API.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Render the error as a diagnostic for the form layer.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string());
        match self {
            Self::Ambiguous { .. } => diagnostic.with_detail(
                "Supply an explicit id instead of a name, or narrow the search filter \
                 so only one entity matches.",
            ),
            Self::ConflictingInput { first, second } => diagnostic
                .with_detail(format!("Set either '{}' or '{}', not both.", first, second))
                .with_attribute(*second),
            Self::Validation { field, .. } => diagnostic.with_attribute(field.clone()),
            Self::NotFound { .. }
            | Self::Configuration(_)
            | Self::Api(_)
            | Self::Serialization(_) => diagnostic,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}
