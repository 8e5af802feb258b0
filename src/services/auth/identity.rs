use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::repos::user_repo::{self, PgUserStore, UserRecord};
use crate::services::auth::claims::ClaimSet;

/// Read-only view of the user store needed by the resolver.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn lookup_user(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
impl UserLookup for PgUserStore {
    async fn lookup_user(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        user_repo::get(self.pool(), id).await
    }
}

/// Identity attached to one request after a token was verified and the user found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub subject_id: i64,
    /// Role carried by the token. Used by the guard as-is; `user.role` is the stored one.
    pub role: Option<String>,
    pub user: UserRecord,
}

/// Request-scoped binding state.
///
/// Inserted into request extensions by the binder, read by the guard and handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestIdentity {
    #[default]
    Unbound,
    Bound(ResolvedIdentity),
}

impl RequestIdentity {
    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        match self {
            Self::Bound(identity) => Some(identity),
            Self::Unbound => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("subject claim is missing or not an integer")]
    MalformedClaims,
    #[error("user {id} not found")]
    UserNotFound { id: i64 },
    #[error("user {id} is inactive")]
    InactiveUser { id: i64 },
    #[error("user lookup failed: {0}")]
    LookupFailed(#[from] RepoError),
    #[error("user lookup timed out")]
    LookupTimedOut,
}

#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserLookup>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserLookup>, lookup_timeout: Duration) -> Self {
        Self {
            users,
            lookup_timeout,
        }
    }

    /// Turn verified claims into a [`ResolvedIdentity`] with one read against the user store.
    ///
    /// The lookup is bounded by `lookup_timeout`; dropping the returned future
    /// (request aborted) drops the lookup with it.
    pub async fn resolve(&self, claims: &ClaimSet) -> Result<ResolvedIdentity, ResolverError> {
        let subject_id = claims
            .subject()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or(ResolverError::MalformedClaims)?;

        let user = tokio::time::timeout(self.lookup_timeout, self.users.lookup_user(subject_id))
            .await
            .map_err(|_| ResolverError::LookupTimedOut)??
            .ok_or(ResolverError::UserNotFound { id: subject_id })?;

        if !user.is_active {
            return Err(ResolverError::InactiveUser { id: subject_id });
        }

        Ok(ResolvedIdentity {
            subject_id,
            role: claims
                .role()
                .filter(|role| !role.is_empty())
                .map(str::to_owned),
            user,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that counts lookups.
    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        pub users: HashMap<i64, UserRecord>,
        pub lookups: AtomicUsize,
        pub delay: Option<Duration>,
        pub fail: bool,
    }

    impl MemoryUsers {
        pub(crate) fn with(users: impl IntoIterator<Item = UserRecord>) -> Self {
            Self {
                users: users.into_iter().map(|u| (u.id, u)).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl UserLookup for MemoryUsers {
        async fn lookup_user(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
            }
            Ok(self.users.get(&id).cloned())
        }
    }

    pub(crate) fn user(id: i64, role: &str, is_active: bool) -> UserRecord {
        UserRecord {
            id,
            user_name: format!("user-{id}"),
            role: role.to_string(),
            is_active,
        }
    }

    fn claims(value: Value) -> ClaimSet {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        ClaimSet::new(map)
    }

    fn resolver_for(users: MemoryUsers) -> (IdentityResolver, Arc<MemoryUsers>) {
        let users = Arc::new(users);
        (
            IdentityResolver::new(users.clone(), Duration::from_millis(200)),
            users,
        )
    }

    #[tokio::test]
    async fn resolves_user_and_keeps_token_role() {
        let (resolver, users) = resolver_for(MemoryUsers::with([user(7, "Cashier", true)]));

        let identity = resolver
            .resolve(&claims(json!({ "nameid": "7", "role": "Admin" })))
            .await
            .unwrap();

        assert_eq!(identity.subject_id, 7);
        assert_eq!(identity.role.as_deref(), Some("Admin"));
        assert_eq!(identity.user.role, "Cashier");
        assert_eq!(users.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_numeric_subject_is_malformed_without_lookup() {
        let (resolver, users) = resolver_for(MemoryUsers::with([user(7, "Admin", true)]));

        for value in [json!({ "nameid": "seven" }), json!({ "role": "Admin" }), json!({ "nameid": true })] {
            let err = resolver.resolve(&claims(value)).await.unwrap_err();
            assert!(matches!(err, ResolverError::MalformedClaims));
        }
        assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_and_inactive_users_do_not_resolve() {
        let (resolver, _) = resolver_for(MemoryUsers::with([user(2, "Admin", false)]));

        let err = resolver.resolve(&claims(json!({ "nameid": 1 }))).await.unwrap_err();
        assert!(matches!(err, ResolverError::UserNotFound { id: 1 }));

        let err = resolver.resolve(&claims(json!({ "nameid": 2 }))).await.unwrap_err();
        assert!(matches!(err, ResolverError::InactiveUser { id: 2 }));
    }

    #[tokio::test]
    async fn backend_failure_and_timeout_are_reported() {
        let (resolver, _) = resolver_for(MemoryUsers {
            fail: true,
            ..MemoryUsers::with([user(1, "Admin", true)])
        });
        let err = resolver.resolve(&claims(json!({ "nameid": 1 }))).await.unwrap_err();
        assert!(matches!(err, ResolverError::LookupFailed(_)));

        let (resolver, _) = resolver_for(MemoryUsers {
            delay: Some(Duration::from_secs(5)),
            ..MemoryUsers::with([user(1, "Admin", true)])
        });
        let err = resolver.resolve(&claims(json!({ "nameid": 1 }))).await.unwrap_err();
        assert!(matches!(err, ResolverError::LookupTimedOut));
    }

    #[tokio::test]
    async fn empty_role_is_absent() {
        let (resolver, _) = resolver_for(MemoryUsers::with([user(3, "Admin", true)]));
        let identity = resolver
            .resolve(&claims(json!({ "nameid": "3", "role": "" })))
            .await
            .unwrap();
        assert_eq!(identity.role, None);
    }
}
