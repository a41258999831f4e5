pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{
    frame_loop::FrameLoop,
    orders::HttpOrderGateway,
    rest::RestCommunityService,
    runtime::{HostReachability, TokioDelay},
    surface::DrawList,
};
pub use config::SiteConfig;
pub use crate::core::{
    checkout::Checkout,
    community::{CommunityLoader, LoadError, LoadSnapshot, LoadStatus, LoaderSettings},
    particles::{AnimatedBackground, Viewport},
    ring::RingViewer,
    vitals::VitalsSimulator,
};
pub use domain::catalog::{RingColor, RingSize};
pub use utils::error::{Result, SiteError};
