//! Per-gesture frame ticker

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use tracing::trace;

/// A running frame loop. The task ticks until the shared flag is cleared
/// (by [`FrameLoop::stop`] or drop); there is no other cancellation.
pub(crate) struct FrameLoop {
    active: Arc<AtomicBool>,
}

impl FrameLoop {
    /// Spawn a ticker sending `tick()` every `interval` on the current runtime
    pub(crate) fn start<T, M>(interval: Duration, ticks: UnboundedSender<T>, tick: M) -> Self
    where
        T: Send + 'static,
        M: Fn() -> T + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if ticks.send(tick()).is_err() {
                    break;
                }
            }
            trace!("FrameLoop: stopped");
        });
        Self { active }
    }

    pub(crate) fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
