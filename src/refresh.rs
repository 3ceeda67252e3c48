//! Periodic Refresh
//!
//! Keeps the dashboard current without user action: one load as soon as
//! the loop starts, another every period, and one more whenever
//! [`RefreshHandle::refresh_now`] is called.

use crate::controller::DashboardController;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default polling period of the dashboard
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Polls the dashboard on a fixed period
pub struct RefreshController {
    dashboard: Arc<DashboardController>,
    period: Duration,
}

impl RefreshController {
    pub fn new(dashboard: Arc<DashboardController>) -> Self {
        Self {
            dashboard,
            period: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Polling period; zero is bumped to one millisecond
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the refresh loop on the current runtime
    pub fn start(self) -> RefreshHandle {
        let trigger = Arc::new(Notify::new());
        let loop_trigger = trigger.clone();
        let dashboard = self.dashboard;
        let period = self.period;

        tracing::info!("Dashboard refresh every {:?}", period);

        let task = tokio::spawn(async move {
            // The first tick completes immediately
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tracing::debug!("Scheduled dashboard refresh");
                    }
                    _ = loop_trigger.notified() => {
                        tracing::debug!("Manual dashboard refresh");
                    }
                }

                // Errors already sit in the banner; keep polling
                if let Err(e) = dashboard.load().await {
                    tracing::debug!("Refresh failed: {}", e);
                }
            }
        });

        RefreshHandle {
            trigger,
            task: Some(task),
        }
    }
}

/// Handle to a running refresh loop; dropping it stops the loop
pub struct RefreshHandle {
    trigger: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Request an immediate reload in addition to the periodic ones
    pub fn refresh_now(&self) {
        self.trigger.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Cancel the timer and any in-flight reload, waiting for the loop to end
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::info!("Dashboard refresh stopped");
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
