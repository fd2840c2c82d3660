use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::host::HostBridge;

/// Keeps the host re-querying while a run is in flight.
///
/// The host has no push channel, so progress only becomes visible when the host
/// asks for rows again. Ticks every `interval` until [`stop`](Self::stop).
pub struct RefreshPump {
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RefreshPump {
    pub fn start(host: Arc<dyn HostBridge>, interval: Duration) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let query = format!("{} ", host.action_keyword());
            let mut tick = interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                tracing::trace!(target: "speedprobe.refresh", "forcing re-query");
                host.change_query(&query, true);
            }
        });

        Self { active, handle }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.active.store(false, Ordering::Release);
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingHost {
        queries: Mutex<Vec<(String, bool)>>,
    }

    impl HostBridge for CountingHost {
        fn action_keyword(&self) -> String {
            "st".to_string()
        }

        fn change_query(&self, query: &str, requery: bool) {
            self.queries.lock().unwrap().push((query.to_string(), requery));
        }

        fn show_msg(&self, _title: &str) {}

        fn open_url(&self, _url: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_fixed_interval_until_stopped() {
        let host = Arc::new(CountingHost::default());
        let pump = RefreshPump::start(host.clone(), Duration::from_millis(300));
        assert!(pump.is_active());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(host.queries.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(850)).await;
        let seen = host.queries.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|(q, requery)| q == "st " && *requery));

        pump.stop();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(host.queries.lock().unwrap().len(), 3);
    }
}
