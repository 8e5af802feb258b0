use serde::Serialize;

use crate::services::auth::EndpointPolicy;

#[derive(Debug, Serialize)]
pub struct RoutePolicyEntry {
    pub path: String,
    pub policy: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl RoutePolicyEntry {
    pub fn new(path: &str, policy: &EndpointPolicy) -> Self {
        Self {
            path: path.to_string(),
            policy: policy.kind(),
            roles: policy
                .allowed_roles()
                .map(|roles| roles.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}
