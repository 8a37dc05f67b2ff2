//! Resource adapters.
//!
//! Each adapter maps one entity's tri-state model onto the REST client using
//! the shared reconcilers. The policies common to all of them live here:
//! a read that finds the entity missing or soft-deleted drops it from state,
//! and a delete that finds it missing succeeds.

pub mod dataset;
pub mod experiment;
pub mod group;
pub mod project;
pub mod role;

pub use dataset::{DatasetModel, DatasetResource};
pub use experiment::{ExperimentModel, ExperimentResource};
pub use group::{GroupModel, GroupResource};
pub use project::{ProjectModel, ProjectResource};
pub use role::{RoleModel, RoleResource};

use tracing::warn;

use crate::client::{ApiError, Entity};
use crate::error::ProviderError;
use crate::lookup::Named;

/// Turn a `get` result into "still exists" or "gone".
pub(crate) fn existing<E: Entity + Named>(
    resource_type: &str,
    id: &str,
    result: Result<E, ApiError>,
) -> Result<Option<E>, ProviderError> {
    match result {
        Ok(entity) if entity.is_deleted() => {
            warn!(resource_type, id, "Entity is soft-deleted, removing from state");
            Ok(None)
        },
        Ok(entity) => Ok(Some(entity)),
        Err(err) if err.is_not_found() => {
            warn!(resource_type, id, "Entity not found, removing from state");
            Ok(None)
        },
        Err(err) => Err(err.into()),
    }
}

/// Treat "not found" on delete as success.
pub(crate) fn deleted(
    resource_type: &str,
    id: &str,
    result: Result<(), ApiError>,
) -> Result<(), ProviderError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_not_found() => {
            warn!(resource_type, id, "Entity already gone, treating delete as done");
            Ok(())
        },
        Err(err) => Err(err.into()),
    }
}

/// Fetch for import: anything but a live entity is an error.
pub(crate) fn imported<E: Entity + Named>(
    id: &str,
    result: Result<E, ApiError>,
) -> Result<E, ProviderError> {
    match result {
        Ok(entity) if !entity.is_deleted() => Ok(entity),
        Ok(_) => Err(ProviderError::NotFound {
            kind: E::KIND,
            key: id.to_string(),
        }),
        Err(err) if err.is_not_found() => Err(ProviderError::NotFound {
            kind: E::KIND,
            key: id.to_string(),
        }),
        Err(err) => Err(err.into()),
    }
}
