//! Target scope resolution.
//!
//! An action runs either against an explicit list of target entities or
//! against a predefined scope ("All entities", ...). Explicit entities always
//! win; the scope is only consulted (and validated) when no entities are given.

use crate::model::{Failure, TargetEntity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scope used when the caller does not pass one.
pub const DEFAULT_SCOPE: &str = "All entities";

/// The set of scope names the SOAR platform accepts.
///
/// Fetched once at startup and handed to the executor; never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermittedScopes(BTreeSet<String>);

impl PermittedScopes {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scopes.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted, comma separated list used in validation messages.
    pub fn allowed_values(&self) -> String {
        self.0.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl<S: Into<String>> FromIterator<S> for PermittedScopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Outcome of scope resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSelection {
    /// Run against these entities; the scope argument is ignored.
    Entities(Vec<TargetEntity>),
    /// Run against a validated predefined scope.
    Predefined(String),
}

impl ScopeSelection {
    pub fn is_predefined(&self) -> bool {
        matches!(self, ScopeSelection::Predefined(_))
    }
}

/// Pick between explicit targets and the predefined scope.
///
/// Non-empty `target_entities` are used verbatim. Otherwise `scope` must be a
/// member of `permitted`, or the invocation fails before any network call.
pub fn resolve_scope(
    target_entities: Vec<TargetEntity>,
    scope: &str,
    permitted: &PermittedScopes,
) -> Result<ScopeSelection, Failure> {
    if !target_entities.is_empty() {
        return Ok(ScopeSelection::Entities(target_entities));
    }

    if !permitted.contains(scope) {
        return Err(Failure::new(format!(
            "Invalid scope '{}'. Allowed values are: {}",
            scope,
            permitted.allowed_values()
        )));
    }

    Ok(ScopeSelection::Predefined(scope.to_string()))
}
