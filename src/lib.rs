//! Braintrust Provider Core
//!
//! Tri-state reconciliation for a Terraform-style provider over the Braintrust
//! REST API: projects, experiments, datasets, permission groups and roles.
//!
//! # Overview
//!
//! Every configurable attribute reaches the provider as a [`TriState`]: a known
//! value, an explicit null, or a value that is still unknown at plan time. The
//! crate turns those into REST payloads and turns responses back into state
//! without drift:
//!
//! - **Scalar reconciler** ([`scalar`]): `Null` clears with an empty value,
//!   `Unknown` leaves the field out of the request
//! - **Membership reconciler** ([`membership`]): set diffs into add/remove lists
//! - **Composite reconciler** ([`composite`]): nested objects that are written
//!   whole and must survive responses that omit them
//! - **Name lookup** ([`lookup`]): exactly one live match or a typed error
//! - **Adapters** ([`resources`], [`data_sources`]): one per entity, driven
//!   through the [`Resource`] and [`DataSource`] traits
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use braintrust_provider_core::{
//!     Provider, Resource, TriState,
//!     resources::GroupModel,
//! };
//!
//! let provider = Provider::configure(client, serde_json::json!({ "org_name": "acme" }))?;
//! let groups = provider.groups();
//!
//! let mut config = GroupModel::named("eng");
//! config.member_users = TriState::Known(["u1", "u2"].into_iter().collect());
//! let state = groups.create(&config, config.clone()).await?;
//! ```
//!
//! # Logging
//!
//! Install a subscriber once at process start; output goes to stderr:
//!
//! ```ignore
//! braintrust_provider_core::init_logging();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod composite;
pub mod config;
pub mod data_sources;
pub mod diagnostic;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod membership;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod scalar;
pub mod testing;
pub mod tristate;
pub mod validation;

#[allow(missing_docs)]
pub mod types;

// Re-export main types at crate root
pub use client::{ApiClient, ApiError, Entity, EntityKind, ListFilter};
pub use config::{ProviderConfig, ResolvedConfig};
pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use membership::MembershipSet;
pub use provider::{Provider, ProviderMetadata};
pub use resource::{DataSource, Resource};
pub use tristate::TriState;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
