//! `braintrust_experiments` data source: list the experiments of a project.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{ApiClient, ListFilter};
use crate::error::ProviderError;
use crate::lookup::Named;
use crate::resource::DataSource;
use crate::scalar::reconcile_scalar_on_read;
use crate::tristate::TriState;
use crate::types::Experiment;
use crate::validation::{require_known, validate_filter_values, validate_limit};

/// Largest accepted `limit`.
pub const MAX_LIMIT: i64 = 1000;

/// One listed experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Experiment id.
    pub id: String,
    /// Experiment name.
    pub name: String,
    /// Owning project.
    pub project_id: String,
    /// Description, if any.
    #[serde(default)]
    pub description: TriState<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: TriState<String>,
}

impl From<Experiment> for ExperimentSummary {
    fn from(experiment: Experiment) -> Self {
        Self {
            id: experiment.id,
            name: experiment.name,
            project_id: experiment.project_id,
            description: reconcile_scalar_on_read(experiment.description),
            created: experiment.created.into(),
        }
    }
}

/// Filters and result of the experiment listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentsDataModel {
    /// Project whose experiments are listed. Required.
    pub project_id: TriState<String>,
    /// Only return these experiment ids.
    pub ids: TriState<Vec<String>>,
    /// Maximum number of experiments to request.
    pub limit: TriState<i64>,
    /// Computed result.
    pub experiments: TriState<Vec<ExperimentSummary>>,
}

impl ExperimentsDataModel {
    /// List every experiment of `project_id`.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: TriState::Known(project_id.into()),
            ..Default::default()
        }
    }

    fn filter(&self) -> Result<ListFilter, ProviderError> {
        let project_id = require_known("project_id", &self.project_id)?;
        let mut filter = ListFilter::new().with_project_id(project_id.clone());

        match &self.ids {
            TriState::Known(ids) => {
                validate_filter_values("ids", ids)?;
                filter = filter.with_ids(ids.clone());
            },
            TriState::Unknown => {
                return Err(ProviderError::validation(
                    "ids",
                    "must be known before the lookup runs",
                ));
            },
            TriState::Null => {},
        }

        match self.limit {
            TriState::Known(limit) => {
                validate_limit("limit", limit, 1..=MAX_LIMIT)?;
                filter = filter.with_limit(limit as u32);
            },
            TriState::Unknown => {
                return Err(ProviderError::validation(
                    "limit",
                    "must be known before the lookup runs",
                ));
            },
            TriState::Null => {},
        }

        Ok(filter)
    }
}

/// Lists the experiments of a project, dropping soft-deleted ones.
pub struct ExperimentsDataSource<C: ApiClient> {
    client: Arc<C>,
}

impl<C: ApiClient> ExperimentsDataSource<C> {
    /// Create the data source.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> DataSource for ExperimentsDataSource<C> {
    type Model = ExperimentsDataModel;

    const TYPE_NAME: &'static str = "braintrust_experiments";

    #[instrument(skip_all, name = "experiments.list")]
    async fn read(
        &self,
        config: ExperimentsDataModel,
    ) -> Result<ExperimentsDataModel, ProviderError> {
        let filter = config.filter()?;
        debug!(data_source = Self::TYPE_NAME, ?filter, "Read called");

        let listed: Vec<Experiment> = self.client.list::<Experiment>(&filter).await?;
        let experiments: Vec<ExperimentSummary> = listed
            .into_iter()
            .filter(|experiment| !experiment.is_deleted())
            .map(ExperimentSummary::from)
            .collect();
        debug!(data_source = Self::TYPE_NAME, count = experiments.len(), "Read completed");

        Ok(ExperimentsDataModel {
            experiments: TriState::Known(experiments),
            ..config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::testing::{InMemoryApi, Method};
    use serde_json::json;

    async fn seed(api: &InMemoryApi) -> Vec<String> {
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            ids.push(
                api.insert(
                    EntityKind::Experiment,
                    json!({"project_id": "p-1", "name": name}),
                )
                .await,
            );
        }
        api.insert(
            EntityKind::Experiment,
            json!({"project_id": "p-2", "name": "other"}),
        )
        .await;
        ids
    }

    fn names(model: &ExperimentsDataModel) -> Vec<String> {
        model
            .experiments
            .as_known()
            .map(|list| list.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_lists_live_experiments_of_project() {
        let api = Arc::new(InMemoryApi::new());
        let ids = seed(&api).await;
        api.soft_delete(EntityKind::Experiment, &ids[1]).await;

        let result = ExperimentsDataSource::new(api.clone())
            .read(ExperimentsDataModel::for_project("p-1"))
            .await
            .unwrap();
        assert_eq!(names(&result), vec!["a", "c"]);
        assert_eq!(result.project_id, TriState::Known("p-1".to_string()));
    }

    #[tokio::test]
    async fn test_ids_and_limit_are_forwarded() {
        let api = Arc::new(InMemoryApi::new());
        let ids = seed(&api).await;

        let mut config = ExperimentsDataModel::for_project("p-1");
        config.ids = TriState::Known(vec![ids[0].clone(), ids[2].clone()]);
        config.limit = TriState::Known(1);

        let result = ExperimentsDataSource::new(api.clone()).read(config).await.unwrap();
        assert_eq!(names(&result), vec!["a"]);

        let list = api.last(Method::List).await.unwrap().body.unwrap();
        assert_eq!(list["limit"], 1);
        assert_eq!(list["ids"], json!([ids[0], ids[2]]));
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_locally() {
        let api = Arc::new(InMemoryApi::new());
        let mut config = ExperimentsDataModel::for_project("p-1");
        config.ids = TriState::Known(vec!["experiment-1".to_string(), "".to_string()]);

        let err = ExperimentsDataSource::new(api.clone())
            .read(config)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation { ref field, .. } if field == "ids.1"));
        assert!(api.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_limit_bounds() {
        let api = Arc::new(InMemoryApi::new());
        for limit in [0, MAX_LIMIT + 1, -5] {
            let mut config = ExperimentsDataModel::for_project("p-1");
            config.limit = TriState::Known(limit);
            let err = ExperimentsDataSource::new(api.clone())
                .read(config)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("limit"));
        }

        let mut config = ExperimentsDataModel::for_project("p-1");
        config.limit = TriState::Known(MAX_LIMIT);
        assert!(ExperimentsDataSource::new(api.clone()).read(config).await.is_ok());
    }

    #[tokio::test]
    async fn test_project_is_required() {
        let api = Arc::new(InMemoryApi::new());
        let err = ExperimentsDataSource::new(api)
            .read(ExperimentsDataModel::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, ProviderError::Validation { ref field, .. } if field == "project_id")
        );
    }
}
