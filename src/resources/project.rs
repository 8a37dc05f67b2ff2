//! `braintrust_project` resource.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::resource::Resource;
use crate::resources::{deleted, existing, imported};
use crate::scalar::known_only;
use crate::tristate::TriState;
use crate::types::{CreateProject, PatchProject, Project};
use crate::validation::require_known;

/// State and configuration of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectModel {
    /// Computed id.
    pub id: TriState<String>,
    /// Project name.
    pub name: TriState<String>,
    /// Organization to create the project in. Not returned by the API.
    pub org_name: TriState<String>,
    /// Computed organization id.
    pub org_id: TriState<String>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl ProjectModel {
    /// A configuration with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: TriState::Known(name.into()),
            ..Default::default()
        }
    }

    fn from_response(project: Project, org_name: &TriState<String>) -> Self {
        Self {
            id: TriState::Known(project.id),
            name: TriState::Known(project.name),
            org_name: org_name.clone().or_null(),
            org_id: project.org_id.into(),
            created: project.created.into(),
        }
    }
}

/// Adapter for projects.
pub struct ProjectResource<C: ApiClient> {
    client: Arc<C>,
    default_org_name: Option<String>,
}

impl<C: ApiClient> ProjectResource<C> {
    /// Create the adapter. `default_org_name` comes from provider configuration.
    pub fn new(client: Arc<C>, default_org_name: Option<String>) -> Self {
        Self {
            client,
            default_org_name,
        }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> Resource for ProjectResource<C> {
    type Model = ProjectModel;

    const TYPE_NAME: &'static str = "braintrust_project";

    #[instrument(skip_all, name = "project.create")]
    async fn create(
        &self,
        _config: &ProjectModel,
        plan: ProjectModel,
    ) -> Result<ProjectModel, ProviderError> {
        let body = CreateProject {
            name: require_known("name", &plan.name)?.clone(),
            org_name: known_only(&plan.org_name).or_else(|| self.default_org_name.clone()),
        };
        debug!(resource_type = Self::TYPE_NAME, name = %body.name, "Create called");

        let project: Project = self.client.create::<Project>(&body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %project.id, "Create completed successfully");
        Ok(ProjectModel::from_response(project, &plan.org_name))
    }

    #[instrument(skip_all, name = "project.read")]
    async fn read(&self, state: ProjectModel) -> Result<Option<ProjectModel>, ProviderError> {
        let id = require_known("id", &state.id)?;
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Read called");

        let result = self.client.get::<Project>(id).await;
        Ok(existing(Self::TYPE_NAME, id, result)?
            .map(|project| ProjectModel::from_response(project, &state.org_name)))
    }

    #[instrument(skip_all, name = "project.update")]
    async fn update(
        &self,
        _config: &ProjectModel,
        plan: ProjectModel,
        prior: ProjectModel,
    ) -> Result<ProjectModel, ProviderError> {
        let id = require_known("id", &prior.id)?;
        let body = PatchProject {
            name: known_only(&plan.name),
        };
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Update called");

        let project: Project = self.client.patch::<Project>(id, &body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Update completed successfully");
        Ok(ProjectModel::from_response(project, &plan.org_name))
    }

    #[instrument(skip_all, name = "project.delete")]
    async fn delete(&self, state: ProjectModel) -> Result<(), ProviderError> {
        let id = require_known("id", &state.id)?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Delete called");
        deleted(
            Self::TYPE_NAME,
            id,
            self.client.delete::<Project>(id).await,
        )
    }

    async fn import(&self, id: &str) -> Result<ProjectModel, ProviderError> {
        let project = imported(id, self.client.get::<Project>(id).await)?;
        Ok(ProjectModel::from_response(project, &TriState::Null))
    }
}
