use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

pub const HEART_RATE_INTERVAL: Duration = Duration::from_secs(2);
pub const STRESS_INTERVAL: Duration = Duration::from_secs(5);
pub const INITIAL_HEART_RATE: u8 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StressLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl StressLevel {
    const ALL: [StressLevel; 3] = [StressLevel::Low, StressLevel::Medium, StressLevel::High];
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StressLevel::Low => "LOW",
            StressLevel::Medium => "MEDIUM",
            StressLevel::High => "HIGH",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VitalsReading {
    pub heart_rate: u8,
    pub stress: StressLevel,
    /// Number of timer-driven updates so far.
    pub updates: u64,
}

impl Default for VitalsReading {
    fn default() -> Self {
        Self {
            heart_rate: INITIAL_HEART_RATE,
            stress: StressLevel::Low,
            updates: 0,
        }
    }
}

/// Mock readings for the ring display. Both timers are owned here and
/// aborted on [`stop`](Self::stop) or drop.
pub struct VitalsSimulator {
    readings: Arc<watch::Sender<VitalsReading>>,
    timers: Vec<JoinHandle<()>>,
}

impl VitalsSimulator {
    pub fn start() -> Self {
        Self::start_with_seed(rand::random())
    }

    pub fn start_with_seed(seed: u64) -> Self {
        let (sender, _) = watch::channel(VitalsReading::default());
        let readings = Arc::new(sender);

        let heart_rate = {
            let readings = Arc::clone(&readings);
            let mut rng = StdRng::seed_from_u64(seed);
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + HEART_RATE_INTERVAL, HEART_RATE_INTERVAL);
                loop {
                    ticker.tick().await;
                    let bpm = rng.gen_range(65..=74);
                    readings.send_modify(|reading| {
                        reading.heart_rate = bpm;
                        reading.updates += 1;
                    });
                }
            })
        };

        let stress = {
            let readings = Arc::clone(&readings);
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + STRESS_INTERVAL, STRESS_INTERVAL);
                loop {
                    ticker.tick().await;
                    let level = StressLevel::ALL[rng.gen_range(0..StressLevel::ALL.len())];
                    readings.send_modify(|reading| {
                        reading.stress = level;
                        reading.updates += 1;
                    });
                }
            })
        };

        tracing::debug!("Vitals simulator started");
        Self {
            readings,
            timers: vec![heart_rate, stress],
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<VitalsReading> {
        self.readings.subscribe()
    }

    pub fn current(&self) -> VitalsReading {
        *self.readings.borrow()
    }

    pub fn is_running(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn stop(&mut self) {
        if self.timers.is_empty() {
            return;
        }
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        tracing::debug!("Vitals simulator stopped");
    }
}

impl Drop for VitalsSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}
