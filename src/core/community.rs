//! Community panel loader.
//!
//! Loads recent discussions and three counters from the community service and
//! publishes the result as [`LoadSnapshot`]s over a `watch` channel.
//!
//! A load session runs as one spawned task:
//!
//! 1. configuration check (`NotConfigured`, never retried)
//! 2. connectivity check (`Offline`, never retried)
//! 3. probe request, classified into schema / authorization / generic
//!    failures (never retried) or a transient failure
//! 4. posts and counters fetched concurrently; any failure is transient
//!
//! Transient failures are retried up to [`MAX_RETRIES`] times with a fixed
//! delay. While waiting the snapshot stays `Loading` with `last_error` and
//! `retry_count` filled in; `Errored` is only published for terminal outcomes.
//!
//! Every session carries the generation it was started with. Teardown and
//! [`CommunityLoader::retry`] bump the generation, so a completion from an
//! older session can never touch the published state.

use crate::domain::model::{CommunityContent, CommunityCounters, Post};
use crate::domain::ports::{CommunityService, Delay, NetworkStatus};
use crate::utils::error::SiteError;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);
pub const DEFAULT_POST_LIMIT: usize = 5;
/// Rolling window for the "posts this week" counter.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("community service is not configured")]
    NotConfigured,

    #[error("network is offline")]
    Offline,

    #[error("community tables are missing")]
    SchemaMissing,

    #[error("community service rejected the access key")]
    Unauthorized,

    #[error("connection to the community service failed: {detail}")]
    ConnectionFailed { detail: String },

    #[error("loading community content failed: {detail}")]
    TransientFetchFailure { detail: String },

    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl LoadError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, LoadError::TransientFetchFailure { .. })
    }

    /// Copy shown in the community panel.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoadError::NotConfigured => "Community features are not configured yet.",
            LoadError::Offline => "You appear to be offline. Check your connection and try again.",
            LoadError::SchemaMissing => {
                "The community is still being set up. Please check back soon."
            }
            LoadError::Unauthorized => "Access to the community service was denied.",
            LoadError::ConnectionFailed { .. } => "Unable to connect to the community service.",
            LoadError::TransientFetchFailure { .. } => "Having trouble loading discussions. Retrying...",
            LoadError::RetriesExhausted { .. } => {
                "Unable to load community content. Please try again later."
            }
        }
    }

    /// Maps a failed probe to its cause.
    pub fn classify_probe(error: &SiteError) -> Self {
        let status = error.http_status();
        let code = match error {
            SiteError::ServiceStatusError { code, .. } => code.as_deref().unwrap_or_default(),
            _ => "",
        };

        if matches!(code, "42P01" | "PGRST205") || status == Some(404) {
            LoadError::SchemaMissing
        } else if matches!(status, Some(401 | 403)) || code.starts_with("PGRST30") {
            LoadError::Unauthorized
        } else if let Some(status) = status.filter(|s| is_transient_status(*s)) {
            LoadError::TransientFetchFailure {
                detail: format!("probe returned HTTP {}", status),
            }
        } else {
            match error {
                SiteError::ApiError(e) if e.is_timeout() || e.is_connect() => {
                    LoadError::TransientFetchFailure {
                        detail: e.to_string(),
                    }
                }
                SiteError::ServiceStatusError { message, .. } => LoadError::ConnectionFailed {
                    detail: message.clone(),
                },
                other => LoadError::ConnectionFailed {
                    detail: other.to_string(),
                },
            }
        }
    }

    pub fn from_fetch(error: &SiteError) -> Self {
        LoadError::TransientFetchFailure {
            detail: error.to_string(),
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadSnapshot {
    pub status: LoadStatus,
    pub posts: Vec<Post>,
    pub counters: CommunityCounters,
    pub retry_count: u32,
    pub last_error: Option<LoadError>,
}

impl LoadSnapshot {
    /// Ready or Errored. Neither changes again without a manual retry.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, LoadStatus::Ready | LoadStatus::Errored)
    }

    /// The panel shows the "no discussions yet" placeholder instead of a list.
    pub fn has_no_discussions(&self) -> bool {
        self.status == LoadStatus::Ready && self.posts.is_empty()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self.status {
            LoadStatus::Errored => self.last_error.as_ref().map(LoadError::user_message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSettings {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub post_limit: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            post_limit: DEFAULT_POST_LIMIT,
        }
    }
}

struct Lifecycle {
    generation: u64,
    mounted: bool,
}

struct Shared {
    lifecycle: Mutex<Lifecycle>,
    snapshot: watch::Sender<LoadSnapshot>,
    changes: AtomicU64,
}

impl Shared {
    fn lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `update` only if the session that produced it is still current.
    fn apply<F: FnOnce(&mut LoadSnapshot)>(&self, generation: u64, update: F) -> bool {
        let lifecycle = self.lifecycle();
        if !lifecycle.mounted || lifecycle.generation != generation {
            tracing::debug!(
                "Dropping stale community update from generation {} (current {})",
                generation,
                lifecycle.generation
            );
            return false;
        }

        self.snapshot.send_modify(update);
        self.changes.fetch_add(1, Ordering::SeqCst);
        true
    }
}

pub struct CommunityLoader<S: CommunityService + 'static> {
    service: Arc<S>,
    network: Arc<dyn NetworkStatus>,
    delay: Arc<dyn Delay>,
    settings: LoaderSettings,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl<S: CommunityService + 'static> CommunityLoader<S> {
    pub fn new(
        service: Arc<S>,
        network: Arc<dyn NetworkStatus>,
        delay: Arc<dyn Delay>,
        settings: LoaderSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(LoadSnapshot::default());
        Self {
            service,
            network,
            delay,
            settings,
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(Lifecycle {
                    generation: 0,
                    mounted: false,
                }),
                snapshot,
                changes: AtomicU64::new(0),
            }),
            task: None,
        }
    }

    pub fn settings(&self) -> LoaderSettings {
        self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> LoadSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Number of state updates applied so far.
    pub fn state_changes(&self) -> u64 {
        self.shared.changes.load(Ordering::SeqCst)
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.lifecycle().mounted
    }

    /// Starts the first load. Must be called inside a Tokio runtime.
    pub fn mount(&mut self) -> bool {
        if self.is_mounted() {
            return false;
        }
        tracing::info!("🌐 Mounting community loader");
        self.start_session();
        true
    }

    /// Manual retry from an `Errored` state. Resets the retry counter.
    pub fn retry(&mut self) -> bool {
        if !self.is_mounted() || self.shared.snapshot.borrow().status != LoadStatus::Errored {
            return false;
        }
        tracing::info!("🔄 Manual retry of community content");
        self.start_session();
        true
    }

    /// Cancels the running session, including a pending retry delay. Results
    /// of requests already in flight are discarded.
    pub fn teardown(&mut self) {
        {
            let mut lifecycle = self.shared.lifecycle();
            if !lifecycle.mounted {
                return;
            }
            lifecycle.mounted = false;
            lifecycle.generation += 1;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!("Community loader torn down");
    }

    fn start_session(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let generation = {
            let mut lifecycle = self.shared.lifecycle();
            lifecycle.mounted = true;
            lifecycle.generation += 1;
            lifecycle.generation
        };

        self.shared.apply(generation, |snapshot| {
            snapshot.status = LoadStatus::Loading;
            snapshot.retry_count = 0;
            snapshot.last_error = None;
        });

        let session = Session {
            service: Arc::clone(&self.service),
            network: Arc::clone(&self.network),
            delay: Arc::clone(&self.delay),
            settings: self.settings,
            shared: Arc::clone(&self.shared),
            generation,
        };
        self.task = Some(tokio::spawn(session.run()));
    }
}

impl<S: CommunityService + 'static> Drop for CommunityLoader<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Session<S: CommunityService> {
    service: Arc<S>,
    network: Arc<dyn NetworkStatus>,
    delay: Arc<dyn Delay>,
    settings: LoaderSettings,
    shared: Arc<Shared>,
    generation: u64,
}

impl<S: CommunityService> Session<S> {
    async fn run(self) {
        if !self.service.is_configured() {
            tracing::warn!("⚠️ Community service URL or key missing");
            self.fail(LoadError::NotConfigured, 0);
            return;
        }

        let mut retry_count = 0;
        loop {
            if !self.network.is_online().await {
                tracing::warn!("⚠️ Network offline, not contacting community service");
                self.fail(LoadError::Offline, retry_count);
                return;
            }

            match self.attempt().await {
                Ok(content) => {
                    tracing::info!(
                        "✅ Community content loaded: {} posts, {} members (retries: {})",
                        content.posts.len(),
                        content.counters.active_members,
                        retry_count
                    );
                    self.shared.apply(self.generation, |snapshot| {
                        snapshot.status = LoadStatus::Ready;
                        snapshot.posts = content.posts;
                        snapshot.counters = content.counters;
                        snapshot.retry_count = retry_count;
                        snapshot.last_error = None;
                    });
                    return;
                }
                Err(error) if !error.is_retriable() => {
                    tracing::error!("❌ Community service unavailable: {}", error);
                    self.fail(error, retry_count);
                    return;
                }
                Err(error) => {
                    if retry_count >= self.settings.max_retries {
                        tracing::error!(
                            "❌ Community content failed after {} attempts: {}",
                            retry_count + 1,
                            error
                        );
                        self.fail(
                            LoadError::RetriesExhausted {
                                attempts: retry_count + 1,
                            },
                            retry_count,
                        );
                        return;
                    }

                    retry_count += 1;
                    tracing::warn!(
                        "⚠️ {} (retry {}/{} in {:?})",
                        error,
                        retry_count,
                        self.settings.max_retries,
                        self.settings.retry_delay
                    );
                    let current = self.shared.apply(self.generation, |snapshot| {
                        snapshot.status = LoadStatus::Loading;
                        snapshot.retry_count = retry_count;
                        snapshot.last_error = Some(error);
                    });
                    if !current {
                        return;
                    }
                    self.delay.wait(self.settings.retry_delay).await;
                }
            }
        }
    }

    async fn attempt(&self) -> Result<CommunityContent, LoadError> {
        self.service
            .probe()
            .await
            .map_err(|e| LoadError::classify_probe(&e))?;

        let since = Utc::now() - chrono::Duration::days(RECENT_WINDOW_DAYS);
        let (posts, active_members, topics_created, posts_this_week) = tokio::try_join!(
            self.service.recent_posts(self.settings.post_limit),
            self.service.count_members(),
            self.service.count_topics(),
            self.service.count_posts_since(since),
        )
        .map_err(|e| LoadError::from_fetch(&e))?;

        Ok(CommunityContent {
            posts,
            counters: CommunityCounters {
                active_members,
                topics_created,
                posts_this_week,
            },
        })
    }

    fn fail(&self, error: LoadError, retry_count: u32) {
        self.shared.apply(self.generation, |snapshot| {
            snapshot.status = LoadStatus::Errored;
            snapshot.retry_count = retry_count;
            snapshot.last_error = Some(error);
        });
    }
}
