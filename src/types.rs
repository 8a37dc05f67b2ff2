//! Plain REST request and response bodies.
//!
//! These mirror the remote API's JSON. Optional request fields are omitted
//! when `None`; response fields the API may leave out are `Option` with
//! `#[serde(default)]`. Nothing here knows about null versus unknown.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{Entity, EntityKind};
use crate::lookup::Named;

/// Free-form metadata object attached to experiments and datasets.
pub type Metadata = Map<String, Value>;

/// Source-control details recorded with an experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// SHA of the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Name of the branch the experiment ran on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Name of the tag on the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Whether the working tree had uncommitted changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirty: Option<bool>,
    /// Author of the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Author email of the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    /// Message of the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Timestamp of the most recent commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_time: Option<String>,
    /// Diff against the most recent commit when `dirty` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_diff: Option<String>,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// `POST /v1/project` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// `PATCH /v1/project/{id}` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    type Create = CreateProject;
    type Patch = PatchProject;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Experiment
// ---------------------------------------------------------------------------

/// An experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub repo_info: Option<RepoInfo>,
    #[serde(default)]
    pub base_exp_id: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// `POST /v1/experiment` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateExperiment {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_info: Option<RepoInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_exp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Fail instead of returning an existing experiment with the same name.
    pub ensure_new: bool,
}

/// `PATCH /v1/experiment/{id}` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchExperiment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_info: Option<RepoInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_exp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Entity for Experiment {
    const KIND: EntityKind = EntityKind::Experiment;
    type Create = CreateExperiment;
    type Patch = PatchExperiment;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Experiment {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// A dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// `POST /v1/dataset` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDataset {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// `PATCH /v1/dataset/{id}` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Entity for Dataset {
    const KIND: EntityKind = EntityKind::Dataset;
    type Create = CreateDataset;
    type Patch = PatchDataset;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Dataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A permission group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_users: Option<Vec<String>>,
    #[serde(default)]
    pub member_groups: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// `POST /v1/group` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// `PATCH /v1/group/{id}` body. Membership changes are incremental.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_groups: Option<Vec<String>>,
}

impl Entity for Group {
    const KIND: EntityKind = EntityKind::Group;
    type Create = CreateGroup;
    type Patch = PatchGroup;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_permissions: Option<Vec<String>>,
    #[serde(default)]
    pub member_roles: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// `POST /v1/role` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRole {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// `PATCH /v1/role/{id}` body. Membership changes are incremental.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_member_roles: Option<Vec<String>>,
}

impl Entity for Role {
    const KIND: EntityKind = EntityKind::Role;
    type Create = CreateRole;
    type Patch = PatchRole;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Role {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
