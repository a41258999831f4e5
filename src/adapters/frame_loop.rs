use crate::core::particles::AnimatedBackground;
use crate::domain::ports::Surface;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Drives an [`AnimatedBackground`] at a fixed frame rate.
pub struct FrameLoop<S: Surface + Send + 'static> {
    background: Arc<Mutex<AnimatedBackground<S>>>,
    handle: Option<JoinHandle<()>>,
}

impl<S: Surface + Send + 'static> FrameLoop<S> {
    pub fn start(background: Arc<Mutex<AnimatedBackground<S>>>, frame_rate: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)));
        let driven = Arc::clone(&background);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let drawn = driven.lock().unwrap_or_else(PoisonError::into_inner).frame();
                if !drawn {
                    break;
                }
            }
        });

        Self {
            background,
            handle: Some(handle),
        }
    }

    /// Cancels the pending frame and releases the background.
    pub fn stop(mut self) {
        self.cancel();
        self.background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .teardown();
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<S: Surface + Send + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
