use crate::domain::catalog::Rgb;
use crate::domain::model::{OrderReceipt, OrderRequest, Post};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Read access to the community data service.
#[async_trait]
pub trait CommunityService: Send + Sync {
    /// True when the endpoint URL and access key are both present.
    /// Checked before any request is made.
    fn is_configured(&self) -> bool;

    async fn probe(&self) -> Result<()>;
    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>>;
    async fn count_members(&self) -> Result<u64>;
    async fn count_topics(&self) -> Result<u64>;
    async fn count_posts_since(&self, since: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait NetworkStatus: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Non-blocking timed suspension. Dropping the future cancels it.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt>;
}

/// Full-viewport 2D drawing target.
pub trait Surface {
    fn resize(&mut self, width: f64, height: f64);
    fn clear(&mut self);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64);
}
