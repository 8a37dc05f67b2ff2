//! Testing utilities for adapters.
//!
//! [`InMemoryApi`] is a stateful stand-in for the remote API that implements
//! [`ApiClient`]. It soft-deletes, applies `add_*` / `remove_*` patch keys as
//! set operations, records every request body, and can be told to drop
//! fields from write responses or to fail the next call.
//!
//! [`ResourceTester`] drives a [`Resource`] through its lifecycle the way the
//! form layer would.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use braintrust_provider_core::testing::{InMemoryApi, ResourceTester};
//! use braintrust_provider_core::resources::project::{ProjectModel, ProjectResource};
//!
//! #[tokio::test]
//! async fn test_create_project() {
//!     let api = Arc::new(InMemoryApi::new());
//!     let tester = ResourceTester::new(ProjectResource::new(api.clone(), None));
//!
//!     let state = tester.lifecycle_create(ProjectModel::named("billing")).await.unwrap();
//!     assert!(state.id.is_known());
//! }
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::client::{ApiClient, ApiError, Entity, EntityKind, ListFilter};
use crate::diagnostic::Diagnostic;
use crate::error::ProviderError;
use crate::resource::Resource;

/// Timestamp stamped on every created object.
pub const FIXED_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// The operation a recorded request performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `POST` a new entity.
    Create,
    /// `GET` one entity.
    Get,
    /// `PATCH` an entity.
    Patch,
    /// `DELETE` an entity.
    Delete,
    /// List entities.
    List,
}

/// A request received by [`InMemoryApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// What was done.
    pub method: Method,
    /// Which collection.
    pub kind: EntityKind,
    /// Target id for get/patch/delete.
    pub id: Option<String>,
    /// JSON body for create/patch, or the filter for list.
    pub body: Option<Value>,
}

#[derive(Default)]
struct Store {
    objects: HashMap<EntityKind, Vec<Map<String, Value>>>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    omitted: HashMap<EntityKind, HashSet<String>>,
    failures: VecDeque<ApiError>,
}

impl Store {
    fn record(&mut self, method: Method, kind: EntityKind, id: Option<&str>, body: Option<Value>) {
        self.requests.push(RecordedRequest {
            method,
            kind,
            id: id.map(str::to_string),
            body,
        });
    }

    fn find_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Map<String, Value>> {
        self.objects
            .get_mut(&kind)?
            .iter_mut()
            .find(|obj| obj.get("id").and_then(Value::as_str) == Some(id))
    }

    fn find_live_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Map<String, Value>> {
        self.find_mut(kind, id).filter(|obj| !is_deleted(obj))
    }

    fn write_response(&self, kind: EntityKind, obj: &Map<String, Value>) -> Map<String, Value> {
        let mut response = obj.clone();
        if let Some(fields) = self.omitted.get(&kind) {
            response.retain(|key, _| !fields.contains(key));
        }
        response
    }
}

fn is_deleted(obj: &Map<String, Value>) -> bool {
    obj.get("deleted_at").is_some_and(|v| !v.is_null())
}

fn not_found(kind: EntityKind, id: &str) -> ApiError {
    ApiError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn to_object<T: Serialize>(body: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::Status {
            status: 400,
            message: format!("expected a JSON object body, got {}", other),
        }),
        Err(e) => Err(ApiError::Status {
            status: 400,
            message: e.to_string(),
        }),
    }
}

fn decode<E: Entity>(obj: Map<String, Value>) -> Result<E, ApiError> {
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| ApiError::Transport(format!("undecodable response: {}", e)))
}

fn apply_patch(obj: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if let Some(field) = key.strip_prefix("add_") {
            let members = list_field(obj, field);
            for item in value.as_array().into_iter().flatten() {
                if !members.contains(item) {
                    members.push(item.clone());
                }
            }
        } else if let Some(field) = key.strip_prefix("remove_") {
            let members = list_field(obj, field);
            let removed = value.as_array().cloned().unwrap_or_default();
            members.retain(|item| !removed.contains(item));
        } else {
            obj.insert(key, value);
        }
    }
}

fn list_field<'a>(obj: &'a mut Map<String, Value>, field: &str) -> &'a mut Vec<Value> {
    let slot = obj.entry(field.to_string()).or_insert_with(|| Value::Array(vec![]));
    if !slot.is_array() {
        *slot = Value::Array(vec![]);
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just set to an array"),
    }
}

fn matches_filter(obj: &Map<String, Value>, filter: &ListFilter) -> bool {
    let field_is = |key: &str, expected: &Option<String>| match expected {
        Some(expected) => obj.get(key).and_then(Value::as_str) == Some(expected.as_str()),
        None => true,
    };
    let id_allowed = filter.ids.is_empty()
        || obj
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| filter.ids.iter().any(|wanted| wanted == id));

    field_is("name", &filter.name) && field_is("project_id", &filter.project_id) && id_allowed
}

/// A stateful fake of the remote API.
#[derive(Default)]
pub struct InMemoryApi {
    store: Mutex<Store>,
}

impl InMemoryApi {
    /// An empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the request log. Returns its id.
    ///
    /// An `id` is generated when the object does not carry one.
    pub async fn insert(&self, kind: EntityKind, object: Value) -> String {
        let mut store = self.store.lock().await;
        let mut obj = match object {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                store.next_id += 1;
                let id = format!("{}-{}", kind.as_str(), store.next_id);
                obj.insert("id".to_string(), Value::String(id.clone()));
                id
            },
        };
        store.objects.entry(kind).or_default().push(obj);
        id
    }

    /// Mark an object deleted out of band.
    pub async fn soft_delete(&self, kind: EntityKind, id: &str) {
        let mut store = self.store.lock().await;
        if let Some(obj) = store.find_mut(kind, id) {
            obj.insert(
                "deleted_at".to_string(),
                Value::String(FIXED_TIMESTAMP.to_string()),
            );
        }
    }

    /// Remove an object entirely, as if it never existed.
    pub async fn purge(&self, kind: EntityKind, id: &str) {
        let mut store = self.store.lock().await;
        if let Some(objects) = store.objects.get_mut(&kind) {
            objects.retain(|obj| obj.get("id").and_then(Value::as_str) != Some(id));
        }
    }

    /// Drop `field` from create and patch responses for `kind`.
    ///
    /// The value is still stored and returned by `get`.
    pub async fn omit_in_write_responses(&self, kind: EntityKind, field: &str) {
        let mut store = self.store.lock().await;
        store
            .omitted
            .entry(kind)
            .or_default()
            .insert(field.to_string());
    }

    /// Make the next call fail with `err`.
    pub async fn fail_next(&self, err: ApiError) {
        self.store.lock().await.failures.push_back(err);
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.store.lock().await.requests.clone()
    }

    /// The most recent request with the given method.
    pub async fn last(&self, method: Method) -> Option<RecordedRequest> {
        self.store
            .lock()
            .await
            .requests
            .iter()
            .rev()
            .find(|r| r.method == method)
            .cloned()
    }
}

#[async_trait::async_trait]
impl ApiClient for InMemoryApi {
    async fn create<E: Entity>(&self, body: &E::Create) -> Result<E, ApiError> {
        let mut store = self.store.lock().await;
        let mut obj = to_object(body)?;
        store.record(Method::Create, E::KIND, None, Some(Value::Object(obj.clone())));
        if let Some(err) = store.failures.pop_front() {
            return Err(err);
        }

        store.next_id += 1;
        let id = format!("{}-{}", E::KIND.as_str(), store.next_id);
        obj.insert("id".to_string(), Value::String(id));
        obj.insert(
            "created".to_string(),
            Value::String(FIXED_TIMESTAMP.to_string()),
        );

        let response = store.write_response(E::KIND, &obj);
        store.objects.entry(E::KIND).or_default().push(obj);
        decode(response)
    }

    async fn get<E: Entity>(&self, id: &str) -> Result<E, ApiError> {
        let mut store = self.store.lock().await;
        store.record(Method::Get, E::KIND, Some(id), None);
        if let Some(err) = store.failures.pop_front() {
            return Err(err);
        }

        let obj = store
            .find_mut(E::KIND, id)
            .ok_or_else(|| not_found(E::KIND, id))?
            .clone();
        decode(obj)
    }

    async fn patch<E: Entity>(&self, id: &str, body: &E::Patch) -> Result<E, ApiError> {
        let mut store = self.store.lock().await;
        let patch = to_object(body)?;
        store.record(Method::Patch, E::KIND, Some(id), Some(Value::Object(patch.clone())));
        if let Some(err) = store.failures.pop_front() {
            return Err(err);
        }

        let obj = store
            .find_live_mut(E::KIND, id)
            .ok_or_else(|| not_found(E::KIND, id))?;
        apply_patch(obj, patch);
        let obj = obj.clone();
        decode(store.write_response(E::KIND, &obj))
    }

    async fn delete<E: Entity>(&self, id: &str) -> Result<(), ApiError> {
        let mut store = self.store.lock().await;
        store.record(Method::Delete, E::KIND, Some(id), None);
        if let Some(err) = store.failures.pop_front() {
            return Err(err);
        }

        let obj = store
            .find_live_mut(E::KIND, id)
            .ok_or_else(|| not_found(E::KIND, id))?;
        obj.insert(
            "deleted_at".to_string(),
            Value::String(FIXED_TIMESTAMP.to_string()),
        );
        Ok(())
    }

    async fn list<E: Entity>(&self, filter: &ListFilter) -> Result<Vec<E>, ApiError> {
        let mut store = self.store.lock().await;
        let body = serde_json::to_value(filter).ok();
        store.record(Method::List, E::KIND, None, body);
        if let Some(err) = store.failures.pop_front() {
            return Err(err);
        }

        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        store
            .objects
            .get(&E::KIND)
            .into_iter()
            .flatten()
            .filter(|obj| matches_filter(obj, filter))
            .take(limit)
            .map(|obj| decode(obj.clone()))
            .collect()
    }
}

// =========================================================================
// Lifecycle harness
// =========================================================================

/// Drives a [`Resource`] through plan/apply-style sequences.
///
/// Plans are taken verbatim from configuration; computed attributes are
/// whatever the configuration left as `Null`.
pub struct ResourceTester<R: Resource> {
    resource: R,
}

impl<R: Resource> ResourceTester<R> {
    /// Wrap a resource.
    pub fn new(resource: R) -> Self {
        Self { resource }
    }

    /// The wrapped resource.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Create with explicit config and plan.
    pub async fn create(&self, config: &R::Model, plan: R::Model) -> Result<R::Model, TestError> {
        Ok(self.resource.create(config, plan).await?)
    }

    /// Read, failing if the entity is gone.
    pub async fn read(&self, state: R::Model) -> Result<R::Model, TestError> {
        self.resource
            .read(state)
            .await?
            .ok_or(TestError::Vanished(R::TYPE_NAME))
    }

    /// Update with explicit config, plan and prior state.
    pub async fn update(
        &self,
        config: &R::Model,
        plan: R::Model,
        prior: R::Model,
    ) -> Result<R::Model, TestError> {
        Ok(self.resource.update(config, plan, prior).await?)
    }

    /// Delete.
    pub async fn delete(&self, state: R::Model) -> Result<(), TestError> {
        Ok(self.resource.delete(state).await?)
    }

    /// Create from configuration, then read back.
    pub async fn lifecycle_create(&self, config: R::Model) -> Result<R::Model, TestError> {
        let created = self.create(&config, config.clone()).await?;
        self.read(created).await
    }

    /// Update from configuration, then read back.
    pub async fn lifecycle_update(
        &self,
        prior: R::Model,
        config: R::Model,
    ) -> Result<R::Model, TestError> {
        let updated = self.update(&config, config.clone(), prior).await?;
        self.read(updated).await
    }

    /// Create, update, then delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        initial: R::Model,
        updated: R::Model,
    ) -> Result<R::Model, TestError> {
        let created = self.lifecycle_create(initial).await?;
        let state = self.lifecycle_update(created, updated).await?;
        self.delete(state.clone()).await?;
        Ok(state)
    }
}

/// Error type for harness operations.
#[derive(Debug)]
pub enum TestError {
    /// The adapter returned an error.
    Provider(ProviderError),
    /// Read reported the resource gone when it was expected to exist.
    Vanished(&'static str),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
            TestError::Vanished(resource_type) => {
                write!(f, "{} disappeared from the remote API", resource_type)
            },
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a state can be persisted, i.e. holds no `Unknown` values.
///
/// # Panics
///
/// Panics if serialization fails.
pub fn assert_persistable<M: Serialize>(state: &M) {
    if let Err(e) = serde_json::to_value(state) {
        panic!("Expected a fully resolved state, but serialization failed: {}", e);
    }
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
