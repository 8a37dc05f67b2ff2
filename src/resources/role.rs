//! `braintrust_role` resource.

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
use crate::types::{CreateRole, PatchRole, Role};
use crate::validation::require_known;

/// State and configuration of a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    /// Computed id.
    pub id: TriState<String>,
    /// Role name.
    pub name: TriState<String>,
    /// Free-text description. Cleared with an empty string.
    pub description: TriState<String>,
    /// Not returned by the API.
    pub org_name: TriState<String>,
    /// Computed organization id.
    pub org_id: TriState<String>,
    /// Permission names granted directly, e.g. `read` or `update`.
    pub member_permissions: TriState<MembershipSet>,
    /// Role ids whose permissions this role inherits.
    pub member_roles: TriState<MembershipSet>,
    /// Computed creation timestamp.
    pub created: TriState<String>,
}

impl RoleModel {
    /// A configuration with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: TriState::Known(name.into()),
            ..Default::default()
        }
    }

    fn from_response(role: Role, prior: &RoleModel) -> Self {
        Self {
            id: TriState::Known(role.id),
            name: TriState::Known(role.name),
            description: reconcile_scalar_on_read(role.description),
            org_name: prior.org_name.clone().or_null(),
            org_id: role.org_id.into(),
            member_permissions: membership::lift_on_read(
                role.member_permissions,
                &prior.member_permissions,
            ),
            member_roles: membership::lift_on_read(role.member_roles, &prior.member_roles),
            created: role.created.into(),
        }
    }
}

/// Adapter for roles.
pub struct RoleResource<C: ApiClient> {
    client: Arc<C>,
    default_org_name: Option<String>,
}

impl<C: ApiClient> RoleResource<C> {
    /// Create the adapter. `default_org_name` comes from provider configuration.
    pub fn new(client: Arc<C>, default_org_name: Option<String>) -> Self {
        Self {
            client,
            default_org_name,
        }
    }
}

#[async_trait::async_trait]
impl<C: ApiClient> Resource for RoleResource<C> {
    type Model = RoleModel;

    const TYPE_NAME: &'static str = "braintrust_role";

    #[instrument(skip_all, name = "role.create")]
    async fn create(
        &self,
        _config: &RoleModel,
        plan: RoleModel,
    ) -> Result<RoleModel, ProviderError> {
        let body = CreateRole {
            name: require_known("name", &plan.name)?.clone(),
            description: known_only(&plan.description),
            member_permissions: membership::replacement(&plan.member_permissions),
            member_roles: membership::replacement(&plan.member_roles),
            org_name: known_only(&plan.org_name).or_else(|| self.default_org_name.clone()),
        };
        debug!(resource_type = Self::TYPE_NAME, name = %body.name, "Create called");

        let role: Role = self.client.create::<Role>(&body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %role.id, "Create completed successfully");
        Ok(RoleModel::from_response(role, &plan))
    }

    #[instrument(skip_all, name = "role.read")]
    async fn read(&self, state: RoleModel) -> Result<Option<RoleModel>, ProviderError> {
        let id = require_known("id", &state.id)?;
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Read called");

        let result = self.client.get::<Role>(id).await;
        Ok(existing(Self::TYPE_NAME, id, result)?
            .map(|role| RoleModel::from_response(role, &state)))
    }

    #[instrument(skip_all, name = "role.update")]
    async fn update(
        &self,
        _config: &RoleModel,
        plan: RoleModel,
        prior: RoleModel,
    ) -> Result<RoleModel, ProviderError> {
        let id = require_known("id", &prior.id)?;
        let (add_member_permissions, remove_member_permissions) =
            membership::diff_from_state(&prior.member_permissions, &plan.member_permissions)
                .into_payload();
        let (add_member_roles, remove_member_roles) =
            membership::diff_from_state(&prior.member_roles, &plan.member_roles).into_payload();

        let body = PatchRole {
            name: known_only(&plan.name),
            description: reconcile_scalar(&plan.description),
            add_member_permissions,
            remove_member_permissions,
            add_member_roles,
            remove_member_roles,
        };
        debug!(resource_type = Self::TYPE_NAME, id = %id, "Update called");

        let role: Role = self.client.patch::<Role>(id, &body).await?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Update completed successfully");
        Ok(RoleModel::from_response(role, &plan))
    }

    #[instrument(skip_all, name = "role.delete")]
    async fn delete(&self, state: RoleModel) -> Result<(), ProviderError> {
        let id = require_known("id", &state.id)?;
        info!(resource_type = Self::TYPE_NAME, id = %id, "Delete called");
        deleted(Self::TYPE_NAME, id, self.client.delete::<Role>(id).await)
    }

    async fn import(&self, id: &str) -> Result<RoleModel, ProviderError> {
        let role = imported(id, self.client.get::<Role>(id).await)?;
        Ok(RoleModel::from_response(role, &RoleModel::default()))
    }
}
