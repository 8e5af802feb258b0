/*
 * Responsibility
 * - リクエストの日時パラメータを UTC の絶対時刻に正規化する
 *   - offset 付き (Z / +09:00 など) → UTC に変換
 *   - offset 無し → すでに UTC とみなす (変換しない)
 * - Query / Json の DTO フィールドとして使う
 */
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date/time: {0:?}")]
pub struct InvalidInstant(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UtcInstant(pub DateTime<Utc>);

impl UtcInstant {
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl FromStr for UtcInstant {
    type Err = InvalidInstant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Ok(Self(dt.with_timezone(&Utc)));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(naive.and_utc()));
            }
        }
        if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(Self(midnight.and_utc()));
        }

        Err(InvalidInstant(raw.to_string()))
    }
}

impl<'de> Deserialize<'de> for UtcInstant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for UtcInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
