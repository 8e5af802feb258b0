use serde::Serialize;

use crate::services::auth::ResolvedIdentity;

/// Summary of the caller's identity.
///
/// `role` is what the token claims, `current_role` is what the user store says now.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub user_name: String,
    pub role: Option<String>,
    pub current_role: String,
}

impl From<ResolvedIdentity> for MeResponse {
    fn from(identity: ResolvedIdentity) -> Self {
        Self {
            id: identity.subject_id,
            user_name: identity.user.user_name,
            role: identity.role,
            current_role: identity.user.role,
        }
    }
}
