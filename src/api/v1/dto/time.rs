use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::extractors::UtcInstant;

#[derive(Debug, Deserialize)]
pub struct TimeQuery {
    pub at: Option<UtcInstant>,
}

#[derive(Debug, Serialize)]
pub struct TimeResponse {
    pub server_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<UtcInstant>,
}
