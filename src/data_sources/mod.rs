//! Read-only data sources.
//!
//! Single-entity data sources accept an explicit `id` or an exact `name`.
//! An id lookup that lands on a soft-deleted entity is an error, and a name
//! lookup must match exactly one live entity.

pub mod experiment;
pub mod experiments;
pub mod project;

pub use experiment::{ExperimentDataModel, ExperimentDataSource};
pub use experiments::{ExperimentSummary, ExperimentsDataModel, ExperimentsDataSource};
pub use project::{ProjectDataModel, ProjectDataSource};

use tracing::debug;

use crate::client::{ApiClient, Entity, ListFilter};
use crate::error::ProviderError;
use crate::lookup::{select_unique, Identifier, Named};
use crate::resources::imported;

/// Fetch one live entity by id, or by name within `scope`.
pub(crate) async fn find<C, E>(
    client: &C,
    identifier: Identifier,
    scope: ListFilter,
) -> Result<E, ProviderError>
where
    C: ApiClient,
    E: Entity + Named,
{
    match identifier {
        Identifier::Id(id) => {
            debug!(kind = %E::KIND, id = %id, "Looking up by id");
            imported(&id, client.get::<E>(&id).await)
        },
        Identifier::Name(name) => {
            let candidates = client.list::<E>(&scope.with_name(name.clone())).await?;
            select_unique(E::KIND, candidates, &name)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::testing::{InMemoryApi, Method};
    use crate::types::Project;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_by_name_sends_exact_filter() {
        let api = InMemoryApi::new();
        api.insert(EntityKind::Project, json!({"name": "billing"})).await;
        api.insert(EntityKind::Project, json!({"name": "Billing"})).await;

        let scope = ListFilter::new().with_org_name(Some("acme".to_string()));
        let found: Project = find(&api, Identifier::Name("billing".to_string()), scope)
            .await
            .unwrap();
        assert_eq!(found.name, "billing");

        let list = api.last(Method::List).await.unwrap();
        assert_eq!(list.body.unwrap(), json!({"name": "billing", "org_name": "acme"}));
    }

    #[tokio::test]
    async fn test_find_by_id_skips_list() {
        let api = InMemoryApi::new();
        let id = api.insert(EntityKind::Project, json!({"name": "billing"})).await;

        let found: Project = find(&api, Identifier::Id(id.clone()), ListFilter::new())
            .await
            .unwrap();
        assert_eq!(found.id, id);
        assert!(api.last(Method::List).await.is_none());
    }
}
