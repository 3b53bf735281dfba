// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(with = "crate::timestamp::wire")]
    pub expire_at: DateTime<Utc>,
}

impl Poll {
    /// Expiries are minute-granular, so a poll stays open through its
    /// expiry minute.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at < crate::timestamp::truncate_to_minute(now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub poll_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(with = "crate::timestamp::wire")]
    pub created_at: DateTime<Utc>,
    pub choice_id: Uuid,
}

/// Vote count of a single choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChoiceTally {
    pub title: String,
    pub votes: i64,
}

/// Winner of a poll; `result` is `None` until the first vote is cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(with = "crate::timestamp::wire")]
    pub expire_at: DateTime<Utc>,
    pub result: Option<ChoiceTally>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub expire_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChoiceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poll_id: Option<String>,
}
