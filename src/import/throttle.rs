use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum spacing between the starts of consecutive requests.
///
/// The first call never waits, so no delay follows the last request.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last: None,
        }
    }

    /// Wait until the next request may start
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}
