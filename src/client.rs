//! The REST client seam.
//!
//! Transport, authentication and retries live behind [`ApiClient`]; the
//! adapters in this crate only build plain request bodies, await one call,
//! and lift the plain response back into tri-state models. Request bodies
//! have no notion of null or unknown: a field is either present with a value
//! or omitted.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of entity the remote API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A project.
    Project,
    /// An experiment inside a project.
    Experiment,
    /// A dataset inside a project.
    Dataset,
    /// A permission group.
    Group,
    /// A role.
    Role,
}

impl EntityKind {
    /// Lowercase name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Experiment => "experiment",
            Self::Dataset => "dataset",
            Self::Group => "group",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by an [`ApiClient`].
///
/// The adapters never retry or rewrite these; they reach the caller as
/// [`ProviderError::Api`](crate::ProviderError::Api).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The addressed entity does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Identifier that was requested.
        id: String,
    },

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Returns `true` when the remote reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 404,
            Self::Transport(_) => false,
        }
    }
}

/// A REST entity with typed create and patch bodies.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Which collection this entity lives in.
    const KIND: EntityKind;
    /// Body sent on create.
    type Create: Serialize + Send + Sync;
    /// Body sent on partial update.
    type Patch: Serialize + Send + Sync;

    /// Server-assigned identifier.
    fn id(&self) -> &str;
}

/// Filters accepted by list endpoints.
///
/// Cursor pagination is the client's concern; `limit` only caps the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Exact name match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Restrict to these identifiers.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ids: Vec<String>,
    /// Restrict to one project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Restrict to one organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    /// Maximum number of results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListFilter {
    /// An empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match entities with exactly this name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match only these identifiers.
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = ids;
        self
    }

    /// Match entities inside this project.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Match entities inside this organization.
    pub fn with_org_name(mut self, org_name: Option<String>) -> Self {
        self.org_name = org_name;
        self
    }

    /// Cap the number of results.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The injected REST client.
///
/// Each adapter holds one client for its lifetime and issues exactly the
/// calls its lifecycle step needs.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync + 'static {
    /// `POST` a new entity.
    async fn create<E: Entity>(&self, body: &E::Create) -> Result<E, ApiError>;

    /// `GET` one entity by id.
    async fn get<E: Entity>(&self, id: &str) -> Result<E, ApiError>;

    /// `PATCH` an entity. Omitted body fields are left unchanged.
    async fn patch<E: Entity>(&self, id: &str, body: &E::Patch) -> Result<E, ApiError>;

    /// `DELETE` an entity.
    async fn delete<E: Entity>(&self, id: &str) -> Result<(), ApiError>;

    /// List entities matching a filter.
    async fn list<E: Entity>(&self, filter: &ListFilter) -> Result<Vec<E>, ApiError>;
}
