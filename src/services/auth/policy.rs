//! Endpoint access policies and their evaluation.
//!
//! Policies are attached when routes are registered and never change at runtime.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::services::auth::identity::ResolvedIdentity;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MANAGER: &str = "Manager";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EndpointPolicy {
    /// No identity required.
    Public,
    /// Any bound identity.
    #[default]
    AuthenticatedOnly,
    /// Bound identity whose token role is in the set (exact, case-sensitive match).
    AuthenticatedWithRoles(BTreeSet<String>),
}

impl EndpointPolicy {
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AuthenticatedWithRoles(roles.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::AuthenticatedOnly => "authenticated",
            Self::AuthenticatedWithRoles(_) => "roles",
        }
    }

    pub fn allowed_roles(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::AuthenticatedWithRoles(roles) => Some(roles),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
}

/// Decide whether `identity` may reach an endpoint guarded by `policy`.
///
/// Authentication is checked before roles, so a missing identity is never `Forbidden`.
pub fn authorize(
    policy: &EndpointPolicy,
    identity: Option<&ResolvedIdentity>,
) -> Result<(), AuthzError> {
    if matches!(policy, EndpointPolicy::Public) {
        return Ok(());
    }

    let identity = identity.ok_or(AuthzError::Unauthenticated)?;

    if let Some(allowed) = policy.allowed_roles() {
        let permitted = identity
            .role
            .as_deref()
            .filter(|role| !role.is_empty())
            .is_some_and(|role| allowed.contains(role));
        if !permitted {
            return Err(AuthzError::Forbidden);
        }
    }

    Ok(())
}

pub(crate) static DEFAULT_POLICY: EndpointPolicy = EndpointPolicy::AuthenticatedOnly;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("route policy for '{0}' declared twice")]
pub struct DuplicateRoute(pub String);

/// Route path → declared policy, built while registering routes.
///
/// The guard reads policies from here, so a path has exactly one policy for all its methods.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicies {
    routes: BTreeMap<String, EndpointPolicy>,
}

impl RoutePolicies {
    pub fn declare(
        &mut self,
        path: impl Into<String>,
        policy: EndpointPolicy,
    ) -> Result<(), DuplicateRoute> {
        match self.routes.entry(path.into()) {
            Entry::Occupied(existing) => Err(DuplicateRoute(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(policy);
                Ok(())
            }
        }
    }

    /// Declared policy for `path`; undeclared paths require authentication.
    pub fn policy_for(&self, path: &str) -> &EndpointPolicy {
        self.routes.get(path).unwrap_or(&DEFAULT_POLICY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointPolicy)> {
        self.routes.iter().map(|(path, policy)| (path.as_str(), policy))
    }
}
