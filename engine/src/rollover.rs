//! Daily rollover scheduling.
//!
//! One background task per host: sleep until the next civil midnight, roll
//! the host over, yield, recompute. A wake-up that lands late (the machine
//! slept through the boundary) still rolls over once and then re-aligns to
//! the following midnight. A wake-up that lands early, while the civil date
//! is still the one the timer was armed on, just sleeps again.

use std::sync::Arc;

use futures_util::future::{AbortHandle, Abortable};
use tokio::task::JoinHandle;
use tracing::debug;

use quartet_puzzle::PuzzleFeed;

use crate::host::GameHost;

/// Owner of the rollover task. Dropping it cancels the timer.
#[derive(Debug)]
pub struct RolloverHandle {
    abort: AbortHandle,
    task: JoinHandle<()>,
}

impl RolloverHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RolloverHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

impl<F: PuzzleFeed> GameHost<F> {
    /// Start rolling this host over at every civil midnight.
    /// Must be called from within a tokio runtime.
    pub fn spawn_rollover(self: &Arc<Self>) -> RolloverHandle {
        let host = Arc::clone(self);
        let (abort, registration) = AbortHandle::new_pair();

        let schedule = async move {
            let mut armed_on = host.clock().today();
            loop {
                let delay = host.clock().until_next_midnight();
                debug!(delay_ms = delay.as_millis(), "Next rollover scheduled");
                tokio::time::sleep(delay).await;

                // The timer runs on the monotonic clock; the civil date may not
                // have moved yet if the wall clock was stepped back meanwhile.
                let today = host.clock().today();
                if today <= armed_on {
                    debug!(day = %today, "Woke before the civil boundary, re-arming");
                    continue;
                }
                armed_on = today;

                // Failures are logged by the host; the board stays empty
                // until the next boundary or an explicit retry.
                let _ = host.rollover().await;
                tokio::task::yield_now().await;
            }
        };

        let task = tokio::spawn(async move {
            let _ = Abortable::new(schedule, registration).await;
            debug!("Rollover task stopped");
        });

        RolloverHandle { abort, task }
    }
}
