use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{RingColor, RingSize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A community discussion post as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "user")]
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub replies: u32,
}

impl Post {
    /// 相對時間，例如 "2 hours ago"
    pub fn relative_age(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.created_at);
        let plural = |n: i64, unit: &str| {
            if n == 1 {
                format!("1 {} ago", unit)
            } else {
                format!("{} {}s ago", n, unit)
            }
        };

        if elapsed.num_minutes() < 1 {
            "just now".to_string()
        } else if elapsed.num_hours() < 1 {
            plural(elapsed.num_minutes(), "minute")
        } else if elapsed.num_days() < 1 {
            plural(elapsed.num_hours(), "hour")
        } else {
            plural(elapsed.num_days(), "day")
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityCounters {
    pub active_members: u64,
    pub topics_created: u64,
    pub posts_this_week: u64,
}

/// Everything one successful load produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityContent {
    pub posts: Vec<Post>,
    pub counters: CommunityCounters,
}

/// Local purchase-panel selection. Size starts unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseSelection {
    pub color: RingColor,
    pub size: Option<RingSize>,
}

impl PurchaseSelection {
    pub fn new(color: RingColor) -> Self {
        Self { color, size: None }
    }

    pub fn with_size(mut self, size: RingSize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Body sent to the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub amount: u64,
    pub color: RingColor,
    pub size: RingSize,
}

/// Handed to the third-party checkout overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(rename = "id")]
    pub order_id: String,
    pub amount: u64,
}
