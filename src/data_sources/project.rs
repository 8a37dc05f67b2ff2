//! `braintrust_project` data source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{ApiClient, ListFilter};
use crate::data_sources::find;
use crate::error::ProviderError;
use crate::lookup::resolve_identifier;
use crate::resource::DataSource;
use crate::tristate::TriState;
use crate::types::Project;

/// Lookup input and result for a single project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDataModel {
    /// Project id. Set this or `name`.
    pub id: TriState<String>,
    /// Exact project name. Set this or `id`.
    pub name: TriState<String>,
    /// Computed organization id.
    pub org_id: TriState<String>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl From<Project> for ProjectDataModel {
    fn from(project: Project) -> Self {
        Self {
            id: TriState::Known(project.id),
            name: TriState::Known(project.name),
            org_id: project.org_id.into(),
            created: project.created.into(),
        }
    }
}

/// Looks up a project by id or name.
pub struct ProjectDataSource<C: ApiClient> {
    client: Arc<C>,
    org_name: Option<String>,
}

impl<C: ApiClient> ProjectDataSource<C> {
    /// Create the data source. Name lookups are scoped to `org_name` when set.
    pub fn new(client: Arc<C>, org_name: Option<String>) -> Self {
        Self { client, org_name }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> DataSource for ProjectDataSource<C> {
    type Model = ProjectDataModel;

    const TYPE_NAME: &'static str = "braintrust_project";

    #[instrument(skip_all, name = "project.lookup")]
    async fn read(&self, config: ProjectDataModel) -> Result<ProjectDataModel, ProviderError> {
        let identifier = resolve_identifier(&config.id, &config.name)?;
        debug!(data_source = Self::TYPE_NAME, ?identifier, "Read called");

        let scope = ListFilter::new().with_org_name(self.org_name.clone());
        let project: Project = find(self.client.as_ref(), identifier, scope).await?;
        Ok(project.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::testing::InMemoryApi;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn by_name(name: &str) -> ProjectDataModel {
        ProjectDataModel {
            name: TriState::Known(name.to_string()),
            ..Default::default()
        }
    }

    fn source(api: &Arc<InMemoryApi>) -> ProjectDataSource<InMemoryApi> {
        ProjectDataSource::new(api.clone(), None)
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let api = Arc::new(InMemoryApi::new());
        let id = api
            .insert(EntityKind::Project, json!({"name": "billing", "org_id": "o-1"}))
            .await;
        api.insert(EntityKind::Project, json!({"name": "billing-v2"})).await;

        let found = assert_ok!(source(&api).read(by_name("billing")).await);
        assert_eq!(found.id, TriState::Known(id));
        assert_eq!(found.org_id, TriState::Known("o-1".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_names_are_ambiguous() {
        let api = Arc::new(InMemoryApi::new());
        api.insert(EntityKind::Project, json!({"id": "a", "name": "x"})).await;
        api.insert(EntityKind::Project, json!({"id": "b", "name": "x"})).await;

        let err = assert_err!(source(&api).read(by_name("x")).await);
        assert!(matches!(err, ProviderError::Ambiguous { ref name, .. } if name == "x"));
        assert!(err.to_diagnostic().detail.unwrap_or_default().contains("explicit id"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let api = Arc::new(InMemoryApi::new());
        let err = assert_err!(source(&api).read(by_name("x")).await);
        assert!(matches!(err, ProviderError::NotFound { ref key, .. } if key == "x"));
    }

    #[tokio::test]
    async fn test_soft_deleted_duplicate_is_ignored() {
        let api = Arc::new(InMemoryApi::new());
        let old = api.insert(EntityKind::Project, json!({"name": "x"})).await;
        let live = api.insert(EntityKind::Project, json!({"name": "x"})).await;
        api.soft_delete(EntityKind::Project, &old).await;

        let found = assert_ok!(source(&api).read(by_name("x")).await);
        assert_eq!(found.id, TriState::Known(live));
    }

    #[tokio::test]
    async fn test_soft_deleted_id_is_not_found() {
        let api = Arc::new(InMemoryApi::new());
        let id = api.insert(EntityKind::Project, json!({"name": "x"})).await;
        api.soft_delete(EntityKind::Project, &id).await;

        let config = ProjectDataModel {
            id: TriState::Known(id),
            ..Default::default()
        };
        let err = assert_err!(source(&api).read(config).await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_id_and_name_conflict() {
        let api = Arc::new(InMemoryApi::new());
        let mut config = by_name("x");
        config.id = TriState::Known("project-1".to_string());

        let err = assert_err!(source(&api).read(config).await);
        assert!(matches!(err, ProviderError::ConflictingInput { .. }));
        assert!(api.requests().await.is_empty());
    }
}
