use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Gap the bot leaves after each role or channel call so Discord doesn't rate limit us.
pub(crate) const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(300);

/// Single-slot executor for Discord calls.
///
/// Only one call runs at a time, and the slot is held for `gap` after the call finishes. A single
/// pacer is shared by every command invocation, so concurrent commands take turns call by call
/// (the slot is a FIFO mutex) instead of each burning through the rate limit on its own.
pub(crate) struct Pacer {
    gap: Duration,
    slot: Mutex<()>,
}

impl Pacer {
    pub(crate) fn new(gap: Duration) -> Self {
        Self {
            gap,
            slot: Mutex::new(()),
        }
    }

    pub(crate) fn gap(&self) -> Duration {
        self.gap
    }

    /// Runs `call` once the slot is free, then waits out the gap whether it succeeded or not.
    pub(crate) async fn run<F: Future>(&self, call: F) -> F::Output {
        let _slot = self.slot.lock().await;
        let output = call.await;
        sleep(self.gap).await;
        output
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn waits_after_every_call() {
        let pacer = Pacer::default();
        let start = Instant::now();

        for i in 0..3 {
            assert_eq!(pacer.run(async { i * 2 }).await, i * 2);
        }

        assert!(start.elapsed() >= DEFAULT_PACING_DELAY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shared_pacer_spaces_out_concurrent_callers() {
        let pacer = Arc::new(Pacer::new(Duration::from_millis(100)));
        let starts = Arc::new(std::sync::Mutex::new(Vec::new()));

        let batch = |pacer: Arc<Pacer>, starts: Arc<std::sync::Mutex<Vec<Instant>>>| async move {
            for _ in 0..3 {
                pacer
                    .run(async { starts.lock().unwrap().push(Instant::now()) })
                    .await;
            }
        };

        tokio::join!(
            batch(pacer.clone(), starts.clone()),
            batch(pacer.clone(), starts.clone())
        );

        let starts = starts
            .lock()
            .unwrap()
            .iter()
            .copied()
            .sorted()
            .collect_vec();
        assert_eq!(starts.len(), 6);
        for (earlier, later) in starts.iter().tuple_windows() {
            assert!(*later - *earlier >= pacer.gap());
        }
    }
}
