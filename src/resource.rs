//! Lifecycle traits implemented by resource and data-source adapters.
//!
//! An adapter receives typed models from the form layer, composes the
//! reconcilers with its REST client, and hands typed models back. The form
//! layer drives the calls; adapters hold no state between them.

use crate::error::ProviderError;

/// A managed resource.
///
/// # Example
///
/// ```ignore
/// use braintrust_provider_core::{Provider, Resource};
///
/// let projects = provider.projects();
/// let state = projects.create(&config, config.clone()).await?;
/// let refreshed = projects.read(state).await?;
/// ```
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// The tri-state model exchanged with the form layer.
    type Model: Clone + Send + Sync + 'static;

    /// The resource type name, e.g. `braintrust_project`.
    const TYPE_NAME: &'static str;

    /// Create the remote entity.
    ///
    /// `config` is what the user wrote; `plan` is the planned value with
    /// computed attributes still `Unknown`. The returned state holds no
    /// `Unknown` values.
    async fn create(
        &self,
        config: &Self::Model,
        plan: Self::Model,
    ) -> Result<Self::Model, ProviderError>;

    /// Refresh state from the remote entity.
    ///
    /// Returns `Ok(None)` when the entity no longer exists, including when
    /// it is soft-deleted; the caller drops it from state.
    async fn read(&self, state: Self::Model) -> Result<Option<Self::Model>, ProviderError>;

    /// Apply planned changes to an existing entity.
    async fn update(
        &self,
        config: &Self::Model,
        plan: Self::Model,
        prior: Self::Model,
    ) -> Result<Self::Model, ProviderError>;

    /// Delete the remote entity. Deleting something already gone succeeds.
    async fn delete(&self, state: Self::Model) -> Result<(), ProviderError>;

    /// Build the state for an existing entity given only its id.
    async fn import(&self, id: &str) -> Result<Self::Model, ProviderError>;
}

/// A read-only data source.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// The tri-state model exchanged with the form layer.
    type Model: Clone + Send + Sync + 'static;

    /// The data source type name, e.g. `braintrust_project`.
    const TYPE_NAME: &'static str;

    /// Resolve the configuration into a fully populated model.
    async fn read(&self, config: Self::Model) -> Result<Self::Model, ProviderError>;
}
