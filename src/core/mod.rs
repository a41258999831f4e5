pub mod checkout;
pub mod community;
pub mod particles;
pub mod ring;
pub mod vitals;

pub use crate::domain::model::{CommunityContent, CommunityCounters, Post};
pub use crate::domain::ports::{CommunityService, Delay, NetworkStatus, OrderGateway, Surface};
pub use crate::utils::error::Result;
