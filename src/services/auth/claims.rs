//! Verified claim set and the claim-name compatibility shim.
//!
//! Tokens in the wild carry the subject and role under either the short JWT
//! names or the long URI forms. Both are read; the first key present wins.
//! Don't add more aliases here, the pair is slated for consolidation.

use serde_json::{Map, Value};

pub const SUBJECT_CLAIM_KEYS: [&str; 2] = [
    "nameid",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
];

pub const ROLE_CLAIM_KEYS: [&str; 2] = [
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];

/// Claims of a token whose signature and expiry have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Raw subject claim. Accepts a JSON string or integer.
    pub fn subject(&self) -> Option<String> {
        match first_present(&self.claims, &SUBJECT_CLAIM_KEYS)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<&str> {
        first_present(&self.claims, &ROLE_CLAIM_KEYS)?.as_str()
    }
}

fn first_present<'a>(claims: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| claims.get(*key))
}
