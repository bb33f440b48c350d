use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Processor bound on page size for list endpoints.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Anything the processor hands out with its own identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub refunded: bool,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub created: i64,
    // Remaining processor fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Charge {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

impl Identified for Charge {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub charge: Option<String>,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Refund {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

impl Identified for Refund {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One page of a list endpoint, most recent record first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl<T: Identified> List<T> {
    /// Cursor for the following page, if the processor reported one.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.has_more {
            return None;
        }
        self.data.last().map(|record| record.id())
    }
}

/// Form body of the create-charge call. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub source: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub starting_after: Option<String>,
}

impl ListParams {
    /// Empty cursors and the legacy `"0"` both mean "start from the newest".
    pub fn new(limit: u32, cursor: Option<&str>) -> Self {
        let starting_after = cursor
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "0")
            .map(str::to_string);

        Self {
            limit,
            starting_after,
        }
    }

    pub fn is_valid(&self) -> bool {
        (1..=MAX_LIST_LIMIT).contains(&self.limit)
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(cursor) = &self.starting_after {
            query.push(("starting_after", cursor.clone()));
        }
        query
    }
}
