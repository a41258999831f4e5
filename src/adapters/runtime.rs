use crate::domain::ports::{Delay, NetworkStatus};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Delay backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Treats the network as available when the service host resolves.
#[derive(Debug, Clone)]
pub struct HostReachability {
    target: Option<(String, u16)>,
    timeout: Duration,
}

impl HostReachability {
    pub fn for_url(url: Option<&str>) -> Self {
        let target = url.and_then(|raw| Url::parse(raw).ok()).and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some((host, port))
        });
        Self {
            target,
            timeout: Duration::from_secs(3),
        }
    }
}

#[async_trait]
impl NetworkStatus for HostReachability {
    async fn is_online(&self) -> bool {
        // 沒有可解析的目標時交給 probe 判斷
        let Some((host, port)) = &self.target else {
            return true;
        };

        match tokio::time::timeout(self.timeout, tokio::net::lookup_host((host.as_str(), *port))).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                tracing::debug!("Host lookup for {} failed: {}", host, e);
                false
            }
            Err(_) => {
                tracing::debug!("Host lookup for {} timed out", host);
                false
            }
        }
    }
}
