//! Background refresh scheduler.
//!
//! On every tick the scheduler stamps one cycle timestamp and spawns one
//! fetch task per configured source. It never waits for those tasks, so a
//! slow source from one tick may still be in flight when the next tick
//! starts. An optional semaphore caps how many fetches run at once.
//!
//! Under a cap a source is never queued twice, and a capped fetch that
//! outlives one refresh interval is abandoned so its permit goes back to
//! the pool. Without that, one hung upstream could hold every permit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::datetime::cycle_timestamp_now;
use crate::feed::fetcher::FeedFetcher;

/// Periodically refreshes every configured source.
pub struct RefreshScheduler {
    fetcher: Arc<FeedFetcher>,
    sources: Arc<[String]>,
    refresh_interval: Duration,
    timezone: String,
    limiter: Option<Arc<Semaphore>>,
    /// One flag per source, set while a capped fetch is queued or running.
    in_flight: Arc<[AtomicBool]>,
}

/// Clears a source's in-flight flag when the fetch task finishes.
struct InFlightGuard {
    flags: Arc<[AtomicBool]>,
    index: usize,
}

impl InFlightGuard {
    fn claim(flags: &Arc<[AtomicBool]>, index: usize) -> Option<Self> {
        flags[index]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flags: Arc::clone(flags),
                index,
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flags[self.index].store(false, Ordering::Release);
    }
}

impl RefreshScheduler {
    /// Create a scheduler. `refresh_interval` must be non-zero.
    pub fn new(
        fetcher: Arc<FeedFetcher>,
        sources: Arc<[String]>,
        refresh_interval: Duration,
        timezone: impl Into<String>,
    ) -> Self {
        let in_flight = sources.iter().map(|_| AtomicBool::new(false)).collect();
        Self {
            fetcher,
            in_flight,
            sources,
            refresh_interval,
            timezone: timezone.into(),
            limiter: None,
        }
    }

    /// Cap the number of fetches in flight across all ticks (0 = unbounded).
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.limiter = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    /// Run the tick loop forever. The first tick fires immediately.
    pub async fn run(self) {
        info!(
            sources = self.sources.len(),
            "Refresh scheduler started (interval: {} seconds)",
            self.refresh_interval.as_secs()
        );

        let mut timer = interval(self.refresh_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            self.tick();
        }
    }

    /// Launch one fetch task per source, all sharing one cycle timestamp.
    ///
    /// With a fetch cap, sources whose previous fetch is still queued or
    /// running are skipped for this tick. The returned handles are not
    /// needed for normal operation; the scheduler itself drops them.
    pub fn tick(&self) -> Vec<JoinHandle<()>> {
        let cycle: Arc<str> = cycle_timestamp_now(&self.timezone).into();
        debug!(cycle = %cycle, "Refreshing {} feed(s)", self.sources.len());

        let mut handles = Vec::with_capacity(self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let source = source.clone();
            let cycle = Arc::clone(&cycle);

            let Some(limiter) = self.limiter.clone() else {
                handles.push(tokio::spawn(async move {
                    fetcher.refresh(&source, &cycle).await;
                }));
                continue;
            };

            let Some(guard) = InFlightGuard::claim(&self.in_flight, index) else {
                debug!(source = %source, "Previous fetch still in flight, skipping");
                continue;
            };
            let deadline = self.refresh_interval;
            handles.push(tokio::spawn(async move {
                let _guard = guard;
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return;
                };
                if timeout(deadline, fetcher.refresh(&source, &cycle))
                    .await
                    .is_err()
                {
                    warn!(
                        source = %source,
                        "Fetch abandoned after {} seconds",
                        deadline.as_secs()
                    );
                }
            }));
        }
        handles
    }

    /// Spawn the scheduler as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
