//! Inter-call delay enforcement for the subtitle-search API.
//!
//! A plain delay floor, not a token bucket: every call to the search API
//! (search or download) waits until at least `min_delay` has passed since
//! the previous call, regardless of whether that call succeeded. A
//! rate-limit response pushes the next slot further out by the backoff.

use tokio::time::{sleep_until, Duration, Instant};

/// Serializes calls to the search API with a minimum spacing.
#[derive(Debug)]
pub struct CallGate {
    min_delay: Duration,
    backoff: Duration,
    next_allowed: Option<Instant>,
}

impl CallGate {
    pub fn new(min_delay: Duration, backoff: Duration) -> Self {
        Self {
            min_delay,
            backoff,
            next_allowed: None,
        }
    }

    /// Wait until the next call slot, then reserve the slot after it.
    ///
    /// The first call never waits.
    pub async fn acquire(&mut self) {
        if let Some(next) = self.next_allowed {
            sleep_until(next).await;
        }
        self.next_allowed = Some(Instant::now() + self.min_delay);
    }

    /// Push the next slot out after a rate-limit response.
    ///
    /// Uses the server-suggested wait when it exceeds the configured
    /// backoff; the extra delay is on top of the normal floor.
    pub fn penalize(&mut self, retry_after: Option<Duration>) {
        let extra = retry_after
            .filter(|suggested| *suggested > self.backoff)
            .unwrap_or(self.backoff);
        self.next_allowed = Some(Instant::now() + self.min_delay + extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_does_not_wait() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        let before = Instant::now();
        gate.acquire().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        let start = Instant::now();
        gate.acquire().await;
        gate.acquire().await;
        gate.acquire().await;

        // Two full delays between three calls.
        assert!(Instant::now() - start >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_delay_does_not_wait_again() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        gate.acquire().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let before = Instant::now();
        gate.acquire().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_penalty_extends_wait() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        gate.acquire().await;
        gate.penalize(None);

        let before = Instant::now();
        gate.acquire().await;
        // Floor plus backoff.
        assert!(Instant::now() - before >= Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_penalty_honors_longer_server_hint() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        gate.acquire().await;
        gate.penalize(Some(Duration::from_secs(30)));

        let before = Instant::now();
        gate.acquire().await;
        assert!(Instant::now() - before >= Duration::from_secs(32));
    }

    #[tokio::test(start_paused = true)]
    async fn test_penalty_ignores_shorter_server_hint() {
        let mut gate = CallGate::new(Duration::from_secs(2), Duration::from_secs(10));

        gate.acquire().await;
        gate.penalize(Some(Duration::from_secs(1)));

        let before = Instant::now();
        gate.acquire().await;
        assert!(Instant::now() - before >= Duration::from_secs(12));
    }
}
