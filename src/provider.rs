//! Provider wiring.
//!
//! A [`Provider`] owns the resolved configuration and one shared REST client,
//! and hands out adapters that borrow both.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::config::{ProviderConfig, ResolvedConfig};
use crate::data_sources::{ExperimentDataSource, ExperimentsDataSource, ProjectDataSource};
use crate::diagnostic::Diagnostic;
use crate::error::ProviderError;
use crate::resource::{DataSource, Resource};
use crate::resources::{
    DatasetResource, ExperimentResource, GroupResource, ProjectResource, RoleResource,
};

/// Type names exposed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

/// The configured provider.
pub struct Provider<C: ApiClient> {
    client: Arc<C>,
    config: ResolvedConfig,
}

impl<C: ApiClient> Provider<C> {
    /// Wrap a client with already resolved configuration.
    pub fn new(client: C, config: ResolvedConfig) -> Self {
        Self::with_shared_client(Arc::new(client), config)
    }

    /// Like [`Provider::new`] for a client that is already shared.
    pub fn with_shared_client(client: Arc<C>, config: ResolvedConfig) -> Self {
        Self { client, config }
    }

    /// Parse and resolve the provider block, then wrap the client.
    pub fn configure(client: C, block: serde_json::Value) -> Result<Self, ProviderError> {
        let config = ProviderConfig::from_value(block)?.resolve()?;
        info!(api_url = %config.api_url, "Provider configured");
        Ok(Self::new(client, config))
    }

    /// Check a provider block without keeping the result.
    pub fn validate_config(block: serde_json::Value) -> Vec<Diagnostic> {
        match ProviderConfig::from_value(block).and_then(ProviderConfig::resolve) {
            Ok(_) => vec![],
            Err(err) => vec![err.into()],
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The shared client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Resource and data source type names.
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: vec![
                ProjectResource::<C>::TYPE_NAME.to_string(),
                ExperimentResource::<C>::TYPE_NAME.to_string(),
                DatasetResource::<C>::TYPE_NAME.to_string(),
                GroupResource::<C>::TYPE_NAME.to_string(),
                RoleResource::<C>::TYPE_NAME.to_string(),
            ],
            data_sources: vec![
                ProjectDataSource::<C>::TYPE_NAME.to_string(),
                ExperimentDataSource::<C>::TYPE_NAME.to_string(),
                ExperimentsDataSource::<C>::TYPE_NAME.to_string(),
            ],
        }
    }

    /// `braintrust_project` resource.
    pub fn projects(&self) -> ProjectResource<C> {
        ProjectResource::new(self.client.clone(), self.config.org_name.clone())
    }

    /// `braintrust_experiment` resource.
    pub fn experiments(&self) -> ExperimentResource<C> {
        ExperimentResource::new(self.client.clone())
    }

    /// `braintrust_dataset` resource.
    pub fn datasets(&self) -> DatasetResource<C> {
        DatasetResource::new(self.client.clone())
    }

    /// `braintrust_group` resource.
    pub fn groups(&self) -> GroupResource<C> {
        GroupResource::new(self.client.clone(), self.config.org_name.clone())
    }

    /// `braintrust_role` resource.
    pub fn roles(&self) -> RoleResource<C> {
        RoleResource::new(self.client.clone(), self.config.org_name.clone())
    }

    /// `braintrust_project` data source.
    pub fn project_lookup(&self) -> ProjectDataSource<C> {
        ProjectDataSource::new(self.client.clone(), self.config.org_name.clone())
    }

    /// `braintrust_experiment` data source.
    pub fn experiment_lookup(&self) -> ExperimentDataSource<C> {
        ExperimentDataSource::new(self.client.clone())
    }

    /// `braintrust_experiments` data source.
    pub fn experiment_list(&self) -> ExperimentsDataSource<C> {
        ExperimentsDataSource::new(self.client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::resources::{GroupModel, ProjectModel};
    use crate::testing::{assert_error_contains, assert_no_errors, InMemoryApi, Method};
    use crate::tristate::TriState;
    use serde_json::json;

    fn provider() -> Provider<InMemoryApi> {
        Provider::configure(
            InMemoryApi::new(),
            json!({"api_key": "sk-test", "org_name": "acme"}),
        )
        .unwrap()
    }

    #[test]
    fn test_metadata_lists_every_type() {
        let metadata = provider().metadata();
        assert_eq!(metadata.resources.len(), 5);
        assert!(metadata.resources.contains(&"braintrust_role".to_string()));
        assert_eq!(
            metadata.data_sources,
            vec![
                "braintrust_project",
                "braintrust_experiment",
                "braintrust_experiments"
            ]
        );
    }

    #[test]
    fn test_validate_config() {
        assert_no_errors(&Provider::<InMemoryApi>::validate_config(json!({
            "api_key": "sk-test"
        })));

        let diagnostics = Provider::<InMemoryApi>::validate_config(json!({
            "api_key": "sk-test",
            "api_url": "ftp://example.com"
        }));
        assert_error_contains(&diagnostics, "api_url");

        let diagnostics = Provider::<InMemoryApi>::validate_config(json!({"token": "x"}));
        assert_error_contains(&diagnostics, "serialization error");
    }

    #[tokio::test]
    async fn test_adapters_share_client_and_org() {
        let provider = provider();
        assert_eq!(provider.config().org_name.as_deref(), Some("acme"));

        let project = provider
            .projects()
            .create(&ProjectModel::named("billing"), ProjectModel::named("billing"))
            .await
            .unwrap();
        let group = provider
            .groups()
            .create(&GroupModel::named("eng"), GroupModel::named("eng"))
            .await
            .unwrap();
        assert!(project.id.is_known() && group.id.is_known());

        let create = provider.client().last(Method::Create).await.unwrap();
        assert_eq!(create.kind, EntityKind::Group);
        assert_eq!(create.body.unwrap()["org_name"], "acme");
        assert_eq!(provider.client().requests().await.len(), 2);

        let found = provider
            .project_lookup()
            .read(crate::data_sources::ProjectDataModel {
                name: TriState::Known("billing".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.id, project.id);
    }
}
