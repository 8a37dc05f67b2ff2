//! `braintrust_group` resource.
//!
//! Membership is sent whole on create and as add/remove lists on update,
//! diffed against the prior state's sets.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::membership::{self, MembershipSet};
use crate::resource::Resource;
use crate::resources::{deleted, existing, imported};
use crate::scalar::{known_only, reconcile_scalar, reconcile_scalar_on_read};
use crate::tristate::TriState;
use crate::types::{CreateGroup, Group, PatchGroup};
use crate::validation::require_known;

/// State and configuration of a permission group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    /// Computed id.
    pub id: TriState<String>,
    /// Group name.
    pub name: TriState<String>,
    /// Free-text description. Cleared with an empty string.
    pub description: TriState<String>,
    /// Organization to create the group in. Not returned by the API.
    pub org_name: TriState<String>,
    /// Computed organization id.
    pub org_id: TriState<String>,
    /// User ids that belong to the group.
    pub member_users: TriState<MembershipSet>,
    /// Group ids whose members inherit this group.
    pub member_groups: TriState<MembershipSet>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl GroupModel {
    /// A configuration with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: TriState::Known(name.into()),
            ..Default::default()
        }
    }

    fn from_response(group: Group, prior: &GroupModel) -> Self {
        Self {
            id: TriState::Known(group.id),
            name: TriState::Known(group.name),
            description: reconcile_scalar_on_read(group.description),
            org_name: prior.org_name.clone().or_null(),
            org_id: group.org_id.into(),
            member_users: membership::lift_on_read(group.member_users, &prior.member_users),
            member_groups: membership::lift_on_read(group.member_groups, &prior.member_groups),
            created: group.created.into(),
        }
    }
}

/// Adapter for permission groups.
pub struct GroupResource<C: ApiClient> {
    client: Arc<C>,
    default_org_name: Option<String>,
}

impl<C: ApiClient> GroupResource<C> {
    /// Create the adapter. `default_org_name` comes from provider configuration.
    pub fn new(client: Arc<C>, default_org_name: Option<String>) -> Self {
        Self {
            client,
            default_org_name,
        }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> Resource for GroupResource<C> {
    type Model = GroupModel;

    const TYPE_NAME: &'static str = "braintrust_group";

    #[instrument(skip_all, name = "group.create")]
    async fn create(
        &self,
        _config: &GroupModel,
        plan: GroupModel,
    ) -> Result<GroupModel, ProviderError> {
        let body = CreateGroup {
            name: require_known("name", &plan.name)?.clone(),
            description: known_only(&plan.description),
            member_users: membership::replacement(&plan.member_users),
            member_groups: membership::replacement(&plan.member_groups),
            org_name: known_only(&plan.org_name).or_else(|| self.default_org_name.clone()),
        };
        debug!(resource_type = Self::TYPE_NAME, name = %body.name, "Create called");

        let group: Group = self.client.create::<Group>(&body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %group.id, "Create completed successfully");
        Ok(GroupModel::from_response(group, &plan))
    }

    #[instrument(skip_all, name = "group.read")]
    async fn read(&self, state: GroupModel) -> Result<Option<GroupModel>, ProviderError> {
        let id = require_known("id", &state.id)?;
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Read called");

        let result = self.client.get::<Group>(id).await;
        Ok(existing(Self::TYPE_NAME, id, result)?
            .map(|group| GroupModel::from_response(group, &state)))
    }

    #[instrument(skip_all, name = "group.update")]
    async fn update(
        &self,
        _config: &GroupModel,
        plan: GroupModel,
        prior: GroupModel,
    ) -> Result<GroupModel, ProviderError> {
        let id = require_known("id", &prior.id)?;
        let (add_member_users, remove_member_users) =
            membership::diff_from_state(&prior.member_users, &plan.member_users).into_payload();
        let (add_member_groups, remove_member_groups) =
            membership::diff_from_state(&prior.member_groups, &plan.member_groups).into_payload();

        let body = PatchGroup {
            name: known_only(&plan.name),
            description: reconcile_scalar(&plan.description),
            add_member_users,
            remove_member_users,
            add_member_groups,
            remove_member_groups,
        };
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Update called");

        let group: Group = self.client.patch::<Group>(id, &body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Update completed successfully");
        Ok(GroupModel::from_response(group, &plan))
    }

    #[instrument(skip_all, name = "group.delete")]
    async fn delete(&self, state: GroupModel) -> Result<(), ProviderError> {
        let id = require_known("id", &state.id)?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Delete called");
        deleted(Self::TYPE_NAME, id, self.client.delete::<Group>(id).await)
    }

    async fn import(&self, id: &str) -> Result<GroupModel, ProviderError> {
        let group = imported(id, self.client.get::<Group>(id).await)?;
        Ok(GroupModel::from_response(group, &GroupModel::default()))
    }
}
