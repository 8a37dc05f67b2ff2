//! `braintrust_dataset` resource.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource::Resource;
use crate::resources::{deleted, existing, imported};
use crate::scalar::{known_only, reconcile_scalar, reconcile_scalar_on_read};
use crate::tristate::TriState;
use crate::types::{CreateDataset, Dataset, Metadata, PatchDataset};
use crate::validation::require_known;

/// State and configuration of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetModel {
    /// Computed id.
    pub id: TriState<String>,
    /// Owning project.
    pub project_id: TriState<String>,
    /// Dataset name, unique within the project.
    pub name: TriState<String>,
    /// Free-text description. Cleared with an empty string.
    pub description: TriState<String>,
    /// Free-form metadata. Cleared with an empty object.
    pub metadata: TriState<Metadata>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl DatasetModel {
    /// A configuration with only the required attributes set.
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project_id: TriState::Known(project_id.into()),
            name: TriState::Known(name.into()),
            ..Default::default()
        }
    }
}

impl From<Dataset> for DatasetModel {
    fn from(dataset: Dataset) -> Self {
        Self {
            id: TriState::Known(dataset.id),
            project_id: TriState::Known(dataset.project_id),
            name: TriState::Known(dataset.name),
            description: reconcile_scalar_on_read(dataset.description),
            metadata: reconcile_scalar_on_read(dataset.metadata),
            created: dataset.created.into(),
        }
    }
}

/// Adapter for datasets.
pub struct DatasetResource<C: ApiClient> {
    client: Arc<C>,
}

impl<C: ApiClient> DatasetResource<C> {
    /// Create the adapter.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> Resource for DatasetResource<C> {
    type Model = DatasetModel;

    const TYPE_NAME: &'static str = "braintrust_dataset";

    #[instrument(skip_all, name = "dataset.create")]
    async fn create(
        &self,
        _config: &DatasetModel,
        plan: DatasetModel,
    ) -> Result<DatasetModel, ProviderError> {
        let body = CreateDataset {
            project_id: require_known("project_id", &plan.project_id)?.clone(),
            name: require_known("name", &plan.name)?.clone(),
            description: known_only(&plan.description),
            metadata: known_only(&plan.metadata),
        };
        debug!(resource_type = Self::TYPE_NAME, name = %body.name, "Create called");

        let dataset: Dataset = self.client.create::<Dataset>(&body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %dataset.id, "Create completed successfully");
        Ok(dataset.into())
    }

    #[instrument(skip_all, name = "dataset.read")]
    async fn read(&self, state: DatasetModel) -> Result<Option<DatasetModel>, ProviderError> {
        let id = require_known("id", &state.id)?;
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Read called");

        let result = self.client.get::<Dataset>(id).await;
        Ok(existing(Self::TYPE_NAME, id, result)?.map(DatasetModel::from))
    }

    #[instrument(skip_all, name = "dataset.update")]
    async fn update(
        &self,
        _config: &DatasetModel,
        plan: DatasetModel,
        prior: DatasetModel,
    ) -> Result<DatasetModel, ProviderError> {
        let id = require_known("id", &prior.id)?;
        let body = PatchDataset {
            name: known_only(&plan.name),
            description: reconcile_scalar(&plan.description),
            metadata: reconcile_scalar(&plan.metadata),
        };
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Update called");

        let dataset: Dataset = self.client.patch::<Dataset>(id, &body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Update completed successfully");
        Ok(dataset.into())
    }

    #[instrument(skip_all, name = "dataset.delete")]
    async fn delete(&self, state: DatasetModel) -> Result<(), ProviderError> {
        let id = require_known("id", &state.id)?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Delete called");
        deleted(Self::TYPE_NAME, id, self.client.delete::<Dataset>(id).await)
    }

    async fn import(&self, id: &str) -> Result<DatasetModel, ProviderError> {
        Ok(imported(id, self.client.get::<Dataset>(id).await)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::testing::{assert_persistable, InMemoryApi, Method, ResourceTester};
    use serde_json::json;

    fn tester(api: &Arc<InMemoryApi>) -> ResourceTester<DatasetResource<InMemoryApi>> {
        ResourceTester::new(DatasetResource::new(api.clone()))
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let api = Arc::new(InMemoryApi::new());
        let mut initial = DatasetModel::new("p-1", "golden");
        initial.description = TriState::Known("curated".to_string());

        let mut updated = initial.clone();
        updated.description = TriState::Null;
        updated.metadata = TriState::Known(
            json!({"source": "prod"}).as_object().cloned().unwrap_or_default(),
        );

        let state = tester(&api).lifecycle_crud(initial, updated).await.unwrap();
        assert_persistable(&state);
        assert!(state.description.is_null());
        assert_eq!(state.metadata.as_known().unwrap()["source"], "prod");

        let patch = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(patch["description"], "");
        assert_eq!(patch["metadata"], json!({"source": "prod"}));
    }

    #[tokio::test]
    async fn test_unknown_fields_are_left_alone() {
        let api = Arc::new(InMemoryApi::new());
        let id = api
            .insert(
                EntityKind::Dataset,
                json!({"project_id": "p-1", "name": "golden", "description": "keep"}),
            )
            .await;
        let prior = tester(&api).resource().import(&id).await.unwrap();

        let mut plan = prior.clone();
        plan.name = TriState::Known("renamed".to_string());
        plan.description = TriState::Unknown;
        plan.metadata = TriState::Unknown;

        let state = tester(&api).update(&plan.clone(), plan, prior).await.unwrap();
        assert_eq!(state.description, TriState::Known("keep".to_string()));

        let patch = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(patch, json!({"name": "renamed"}));
    }

    #[tokio::test]
    async fn test_create_requires_project() {
        let api = Arc::new(InMemoryApi::new());
        let mut config = DatasetModel::new("p-1", "golden");
        config.project_id = TriState::Unknown;

        let err = tester(&api)
            .create(&config, config.clone())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("project_id"));
        assert!(api.requests().await.is_empty());
    }
}
