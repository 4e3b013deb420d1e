//! Core types shared across the SOAR MCP crates.
//!
//! - [`config`]: YAML + environment configuration for the server.
//! - [`catalog`]: declarative action descriptors, one table per integration.
//! - [`model`]: the request envelope sent to the SOAR action endpoint and
//!   the normalized tool result.
//! - [`scope`]: permitted scope set and target/scope resolution.
//! - [`backend`]: async traits for the remote collaborators.
//! - [`case`]: case management requests (cases, alerts, entities).
//! - [`naming`]: tool and argument name derivation.

pub mod backend;
pub mod case;
pub mod catalog;
pub mod config;
pub mod model;
pub mod naming;
pub mod scope;

pub use backend::{ActionEndpoint, InstanceDirectory, ScopeSource, SoarApi};
pub use case::{ApiCall, CasePriority, EntitySearch, Method};
pub use catalog::{ActionDescriptor, CatalogError, IntegrationCatalog, Marketplace, ParameterKind, ParameterSpec};
pub use config::{ConfigError, McpConfig, SoarApiConfig, SoarConfig, Transport};
pub use model::{
    ActionProperties, ActionRequest, Failure, InstanceList, InstanceRecord, TargetEntity,
    ToolResult,
};
pub use scope::{PermittedScopes, ScopeSelection, DEFAULT_SCOPE};
