//! `braintrust_experiment` resource.
//!
//! The most involved adapter: `description` and `metadata` are cleared with
//! empty values, `tags` is replaced wholesale, and `repo_info` goes through
//! the composite reconciler so that a write response which leaves it out
//! does not wipe what is stored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::ApiClient;
use crate::composite;
use crate::error::ProviderError;
use crate::membership::{self, MembershipSet};
use crate::resource::Resource;
use crate::resources::{deleted, existing, imported};
use crate::scalar::{known_only, reconcile_scalar, reconcile_scalar_on_read};
use crate::tristate::TriState;
use crate::types::{CreateExperiment, Experiment, Metadata, PatchExperiment, RepoInfo};
use crate::validation::require_known;

/// State and configuration of an experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentModel {
    /// Computed id.
    pub id: TriState<String>,
    /// Owning project.
    pub project_id: TriState<String>,
    /// Experiment name, unique within the project.
    pub name: TriState<String>,
    /// Free-text description. Cleared with an empty string.
    pub description: TriState<String>,
    /// Source-control details, written as one unit.
    pub repo_info: TriState<RepoInfo>,
    /// Experiment to compare against by default.
    pub base_exp_id: TriState<String>,
    /// Dataset the experiment ran on.
    pub dataset_id: TriState<String>,
    /// Whether the experiment is visible outside the organization.
    pub public: TriState<bool>,
    /// Free-form metadata. Cleared with an empty object.
    pub metadata: TriState<Metadata>,
    /// Tags, replaced as a whole on update.
    pub tags: TriState<MembershipSet>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl ExperimentModel {
    /// A configuration with only the required attributes set.
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project_id: TriState::Known(project_id.into()),
            name: TriState::Known(name.into()),
            ..Default::default()
        }
    }

    /// Lift a response. `prior` supplies values the response cannot
    /// distinguish on its own (an explicit empty tag set).
    pub(crate) fn from_response(experiment: Experiment, prior: &ExperimentModel) -> Self {
        Self {
            id: TriState::Known(experiment.id),
            project_id: TriState::Known(experiment.project_id),
            name: TriState::Known(experiment.name),
            description: reconcile_scalar_on_read(experiment.description),
            repo_info: composite::lift_on_read(experiment.repo_info),
            base_exp_id: reconcile_scalar_on_read(experiment.base_exp_id),
            dataset_id: reconcile_scalar_on_read(experiment.dataset_id),
            public: TriState::Known(experiment.public),
            metadata: reconcile_scalar_on_read(experiment.metadata),
            tags: membership::lift_on_read(experiment.tags, &prior.tags),
            created: experiment.created.into(),
        }
    }
}

/// Adapter for experiments.
pub struct ExperimentResource<C: ApiClient> {
    client: Arc<C>,
}

impl<C: ApiClient> ExperimentResource<C> {
    /// Create the adapter.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> Resource for ExperimentResource<C> {
    type Model = ExperimentModel;

    const TYPE_NAME: &'static str = "braintrust_experiment";

    #[instrument(skip_all, name = "experiment.create")]
    async fn create(
        &self,
        config: &ExperimentModel,
        plan: ExperimentModel,
    ) -> Result<ExperimentModel, ProviderError> {
        let body = CreateExperiment {
            project_id: require_known("project_id", &plan.project_id)?.clone(),
            name: require_known("name", &plan.name)?.clone(),
            description: known_only(&plan.description),
            repo_info: composite::build_update_payload(&plan.repo_info),
            base_exp_id: known_only(&plan.base_exp_id),
            dataset_id: known_only(&plan.dataset_id),
            public: known_only(&plan.public),
            metadata: known_only(&plan.metadata),
            tags: plan.tags.as_known().map(MembershipSet::to_sorted_vec),
            ensure_new: true,
        };
        debug!(resource_type = Self::TYPE_NAME, name = %body.name, "Create called");

        let experiment: Experiment = self.client.create::<Experiment>(&body).await?;
        info!(
            resource_type = Self::TYPE_NAME,
            id = %experiment.id,
            "Create completed successfully"
        );

        let echoed = experiment.repo_info.clone();
        let mut state = ExperimentModel::from_response(experiment, &plan);
        state.repo_info = composite::reconcile_after_write(
            !config.repo_info.is_null(),
            &plan.repo_info,
            echoed,
            &TriState::Null,
        )
        .or_null();
        Ok(state)
    }

    #[instrument(skip_all, name = "experiment.read")]
    async fn read(&self, state: ExperimentModel) -> Result<Option<ExperimentModel>, ProviderError> {
        let id = require_known("id", &state.id)?;
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Read called");

        let result = self.client.get::<Experiment>(id).await;
        Ok(existing(Self::TYPE_NAME, id, result)?
            .map(|experiment| ExperimentModel::from_response(experiment, &state)))
    }

    #[instrument(skip_all, name = "experiment.update")]
    async fn update(
        &self,
        config: &ExperimentModel,
        plan: ExperimentModel,
        prior: ExperimentModel,
    ) -> Result<ExperimentModel, ProviderError> {
        let id = require_known("id", &prior.id)?;
        let body = PatchExperiment {
            name: known_only(&plan.name),
            description: reconcile_scalar(&plan.description),
            repo_info: composite::build_update_payload(&plan.repo_info),
            base_exp_id: reconcile_scalar(&plan.base_exp_id),
            dataset_id: reconcile_scalar(&plan.dataset_id),
            public: known_only(&plan.public),
            metadata: reconcile_scalar(&plan.metadata),
            tags: membership::replacement(&plan.tags),
        };
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Update called");

        let experiment: Experiment = self.client.patch::<Experiment>(id, &body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Update completed successfully");

        let echoed = experiment.repo_info.clone();
        let mut state = ExperimentModel::from_response(experiment, &plan);
        state.repo_info = composite::reconcile_after_write(
            !config.repo_info.is_null(),
            &plan.repo_info,
            echoed,
            &prior.repo_info,
        )
        .or_null();
        Ok(state)
    }

    #[instrument(skip_all, name = "experiment.delete")]
    async fn delete(&self, state: ExperimentModel) -> Result<(), ProviderError> {
        let id = require_known("id", &state.id)?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Delete called");
        deleted(
            Self::TYPE_NAME,
            id,
            self.client.delete::<Experiment>(id).await,
        )
    }

    async fn import(&self, id: &str) -> Result<ExperimentModel, ProviderError> {
        let experiment = imported(id, self.client.get::<Experiment>(id).await)?;
        Ok(ExperimentModel::from_response(
            experiment,
            &ExperimentModel::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::testing::{assert_persistable, InMemoryApi, Method, ResourceTester};
    use serde_json::json;

    fn repo(commit: &str) -> RepoInfo {
        RepoInfo {
            commit: Some(commit.to_string()),
            branch: Some("main".to_string()),
            dirty: Some(false),
            ..Default::default()
        }
    }

    fn tester(api: &Arc<InMemoryApi>) -> ResourceTester<ExperimentResource<InMemoryApi>> {
        ResourceTester::new(ExperimentResource::new(api.clone()))
    }

    async fn seeded(api: &Arc<InMemoryApi>, extra: serde_json::Value) -> ExperimentModel {
        let mut object = json!({"project_id": "p-1", "name": "baseline"});
        if let (Some(obj), Some(extra)) = (object.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        let id = api.insert(EntityKind::Experiment, object).await;
        tester(api).resource().import(&id).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_sends_only_known_fields() {
        let api = Arc::new(InMemoryApi::new());
        let mut config = ExperimentModel::new("p-1", "baseline");
        config.description = TriState::Known("first run".to_string());
        config.tags = TriState::Known(["b", "a", "a"].into_iter().collect());
        config.public = TriState::Unknown;

        let state = tester(&api).lifecycle_create(config).await.unwrap();
        assert_persistable(&state);
        assert_eq!(state.public, TriState::Known(false));
        assert!(state.repo_info.is_null());

        let body = api.last(Method::Create).await.unwrap().body.unwrap();
        assert_eq!(
            body,
            json!({
                "project_id": "p-1",
                "name": "baseline",
                "description": "first run",
                "tags": ["a", "b"],
                "ensure_new": true
            })
        );
    }

    #[tokio::test]
    async fn test_update_null_clears_and_unknown_omits() {
        let api = Arc::new(InMemoryApi::new());
        let prior = seeded(
            &api,
            json!({"description": "old", "metadata": {"team": "evals"}}),
        )
        .await;

        let mut plan = prior.clone();
        plan.description = TriState::Null;
        plan.metadata = TriState::Unknown;
        plan.tags = TriState::Unknown;

        let state = tester(&api)
            .update(&plan.clone(), plan, prior)
            .await
            .unwrap();

        let body = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(body["description"], "");
        assert!(body.get("metadata").is_none());
        assert!(body.get("tags").is_none());

        assert!(state.description.is_null());
        assert_eq!(
            state.metadata,
            TriState::Known(json!({"team": "evals"}).as_object().unwrap().clone())
        );
    }

    #[tokio::test]
    async fn test_null_metadata_sends_empty_object() {
        let api = Arc::new(InMemoryApi::new());
        let prior = seeded(&api, json!({"metadata": {"team": "evals"}})).await;

        let mut plan = prior.clone();
        plan.metadata = TriState::Null;
        let state = tester(&api)
            .update(&plan.clone(), plan, prior)
            .await
            .unwrap();

        let body = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(body["metadata"], json!({}));
        assert!(state.metadata.is_null());
    }

    #[tokio::test]
    async fn test_null_links_are_cleared() {
        let api = Arc::new(InMemoryApi::new());
        let prior = seeded(&api, json!({"base_exp_id": "e-0", "dataset_id": "d-0"})).await;
        assert_eq!(prior.base_exp_id, TriState::Known("e-0".to_string()));

        let mut config = prior.clone();
        config.base_exp_id = TriState::Null;
        config.dataset_id = TriState::Unknown;
        let state = tester(&api).lifecycle_update(prior, config).await.unwrap();

        let body = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(body["base_exp_id"], "");
        assert!(body.get("dataset_id").is_none());
        assert!(state.base_exp_id.is_null());
        assert_eq!(state.dataset_id, TriState::Known("d-0".to_string()));
    }

    #[tokio::test]
    async fn test_repo_info_absent_from_config_keeps_prior() {
        let api = Arc::new(InMemoryApi::new());
        let mut prior = seeded(&api, json!({"repo_info": repo("server")})).await;
        prior.repo_info = TriState::Known(repo("stored"));

        let mut config = prior.clone();
        config.repo_info = TriState::Null;
        let mut plan = config.clone();
        plan.repo_info = TriState::Unknown;

        let state = tester(&api).update(&config, plan, prior).await.unwrap();
        assert_eq!(state.repo_info, TriState::Known(repo("stored")));

        let body = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert!(body.get("repo_info").is_none());
    }

    #[tokio::test]
    async fn test_repo_info_not_echoed_after_unknown_keeps_prior() {
        let api = Arc::new(InMemoryApi::new());
        api.omit_in_write_responses(EntityKind::Experiment, "repo_info")
            .await;
        let mut prior = seeded(&api, json!({})).await;
        prior.repo_info = TriState::Known(repo("stored"));

        let mut plan = prior.clone();
        plan.repo_info = TriState::Unknown;

        let state = tester(&api).update(&plan.clone(), plan, prior).await.unwrap();
        assert_eq!(state.repo_info, TriState::Known(repo("stored")));
    }

    #[tokio::test]
    async fn test_repo_info_known_is_sent_and_echo_adopted() {
        let api = Arc::new(InMemoryApi::new());
        let prior = seeded(&api, json!({})).await;

        let mut plan = prior.clone();
        plan.repo_info = TriState::Known(repo("abc"));

        let state = tester(&api).update(&plan.clone(), plan, prior).await.unwrap();
        assert_eq!(state.repo_info, TriState::Known(repo("abc")));

        let body = api.last(Method::Patch).await.unwrap().body.unwrap();
        assert_eq!(body["repo_info"]["commit"], "abc");
    }

    #[tokio::test]
    async fn test_repo_info_known_but_not_echoed_becomes_null() {
        let api = Arc::new(InMemoryApi::new());
        api.omit_in_write_responses(EntityKind::Experiment, "repo_info")
            .await;
        let mut prior = seeded(&api, json!({})).await;
        prior.repo_info = TriState::Known(repo("stored"));

        let mut plan = prior.clone();
        plan.repo_info = TriState::Known(repo("new"));

        let state = tester(&api).update(&plan.clone(), plan, prior).await.unwrap();
        assert!(state.repo_info.is_null());
    }

    #[tokio::test]
    async fn test_create_ignores_server_repo_info_when_unconfigured() {
        let api = Arc::new(InMemoryApi::new());
        let config = ExperimentModel::new("p-1", "baseline");
        let mut plan = config.clone();
        plan.repo_info = TriState::Unknown;

        let state = tester(&api).create(&config, plan).await.unwrap();
        assert!(state.repo_info.is_null());
        assert_persistable(&state);
    }

    #[tokio::test]
    async fn test_explicit_empty_tags_survive_read() {
        let api = Arc::new(InMemoryApi::new());
        let mut config = ExperimentModel::new("p-1", "baseline");
        config.tags = TriState::Known(MembershipSet::new());

        let state = tester(&api).lifecycle_create(config).await.unwrap();
        assert_eq!(state.tags, TriState::Known(MembershipSet::new()));
    }

    #[tokio::test]
    async fn test_read_gone() {
        let api = Arc::new(InMemoryApi::new());
        let state = seeded(&api, json!({})).await;
        let id = state.id.as_known().unwrap().clone();
        api.purge(EntityKind::Experiment, &id).await;

        assert!(tester(&api).resource().read(state).await.unwrap().is_none());
    }
}
