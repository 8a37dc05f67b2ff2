//! `braintrust_experiment` data source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{ApiClient, ListFilter};
use crate::data_sources::find;
use crate::error::ProviderError;
use crate::lookup::{resolve_identifier, Identifier};
use crate::membership::{self, MembershipSet};
use crate::resource::DataSource;
use crate::scalar::reconcile_scalar_on_read;
use crate::tristate::TriState;
use crate::types::{Experiment, Metadata, RepoInfo};
use crate::validation::require_known;

/// Lookup input and result for a single experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentDataModel {
    /// Experiment id. Set this or `name`.
    pub id: TriState<String>,
    /// Exact experiment name. Requires `project_id`.
    pub name: TriState<String>,
    /// Project to search in. On an id lookup a known value must match the
    /// experiment's project.
    pub project_id: TriState<String>,
    /// Description; `null` when empty.
    pub description: TriState<String>,
    /// Source-control details.
    pub repo_info: TriState<RepoInfo>,
    /// Experiment to compare against by default.
    pub base_exp_id: TriState<String>,
    /// Dataset the experiment ran on.
    pub dataset_id: TriState<String>,
    /// Whether the experiment is visible outside the organization.
    pub public: TriState<bool>,
    /// Free-form metadata.
    pub metadata: TriState<Metadata>,
    /// Tags.
    pub tags: TriState<MembershipSet>,
    /// Creation timestamp.
    pub created: TriState<String>,
}

impl From<Experiment> for ExperimentDataModel {
    fn from(experiment: Experiment) -> Self {
        Self {
            id: TriState::Known(experiment.id),
            name: TriState::Known(experiment.name),
            project_id: TriState::Known(experiment.project_id),
            description: reconcile_scalar_on_read(experiment.description),
            repo_info: experiment.repo_info.into(),
            base_exp_id: reconcile_scalar_on_read(experiment.base_exp_id),
            dataset_id: reconcile_scalar_on_read(experiment.dataset_id),
            public: TriState::Known(experiment.public),
            metadata: reconcile_scalar_on_read(experiment.metadata),
            tags: membership::lift_on_read(experiment.tags, &TriState::Null),
            created: experiment.created.into(),
        }
    }
}

/// Looks up an experiment by id, or by name within a project.
pub struct ExperimentDataSource<C: ApiClient> {
    client: Arc<C>,
}

impl<C: ApiClient> ExperimentDataSource<C> {
    /// Create the data source.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> DataSource for ExperimentDataSource<C> {
    type Model = ExperimentDataModel;

    const TYPE_NAME: &'static str = "braintrust_experiment";

    #[instrument(skip_all, name = "experiment.lookup")]
    async fn read(
        &self,
        config: ExperimentDataModel,
    ) -> Result<ExperimentDataModel, ProviderError> {
        let identifier = resolve_identifier(&config.id, &config.name)?;
        debug!(data_source = Self::TYPE_NAME, ?identifier, "Read called");

        let mut scope = ListFilter::new();
        if let Identifier::Name(_) = identifier {
            let project_id = require_known("project_id", &config.project_id)?;
            scope = scope.with_project_id(project_id.clone());
        }

        let experiment: Experiment = find(self.client.as_ref(), identifier, scope).await?;
        if let TriState::Known(project_id) = &config.project_id {
            if *project_id != experiment.project_id {
                return Err(ProviderError::validation(
                    "project_id",
                    format!(
                        "experiment '{}' belongs to project '{}'",
                        experiment.id, experiment.project_id
                    ),
                ));
            }
        }
        Ok(experiment.into())
    }
}
