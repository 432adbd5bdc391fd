//! Background refresh loop.
//!
//! Updates immediately on start, then once per period until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, instrument, warn};

use currencier_types::{CurrencyRepository, CurrencySource};

use crate::service::CurrencierService;
use crate::shutdown::Shutdown;

/// Periodically refreshes stored rates from the source.
pub struct RefreshScheduler<S: CurrencySource, R: CurrencyRepository> {
    service: Arc<CurrencierService<S, R>>,
    period: Duration,
}

impl<S: CurrencySource, R: CurrencyRepository> RefreshScheduler<S, R> {
    /// Creates a scheduler; a zero period is raised to one millisecond.
    pub fn new(service: Arc<CurrencierService<S, R>>, period: Duration) -> Self {
        Self {
            service,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs until `shutdown` fires.
    ///
    /// Shutdown is checked before every wait and raced against both the tick
    /// and an in-flight update; an interrupted update is dropped, which aborts
    /// the fetch or rolls back the store transaction. Ticks missed during a
    /// slow update are skipped rather than queued.
    #[instrument(skip_all, fields(period = ?self.period))]
    pub async fn run(self, mut shutdown: Shutdown) {
        info!("Starting currency refresh every {:?}", self.period);

        // The first tick completes immediately.
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    warn!("Shutdown during refresh, update abandoned");
                    break;
                }
                _ = self.refresh() => {}
            }
        }

        info!("Stopped currency refresh");
    }

    async fn refresh(&self) {
        match self.service.update_currencies().await {
            Ok(count) => info!("Refreshed {} currencies", count),
            Err(e) => warn!("Can't update currencies in repo: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::service_tests::tests::{Feed, MemoryRepo, MockSource, usd};
    use crate::shutdown::shutdown_channel;

    type TestService = CurrencierService<MockSource, MemoryRepo>;

    fn service(source: MockSource) -> Arc<TestService> {
        Arc::new(CurrencierService::new(source, MemoryRepo::new()))
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_first_update_runs_immediately() {
        let service = service(MockSource::new(Feed::Snapshot(vec![usd(90.5)])));
        let (trigger, shutdown) = shutdown_channel();
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_secs(3600));

        let handle = tokio::spawn(scheduler.run(shutdown));
        wait_until(|| service.repo().set_all_calls() == 1).await;

        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();

        assert_eq!(service.source().loads(), 1);
        assert!(service.repo().get("USD").is_some());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_updates() {
        let service = service(MockSource::new(Feed::Snapshot(vec![usd(90.5)])));
        let (trigger, shutdown) = shutdown_channel();
        trigger.trigger();

        RefreshScheduler::new(service.clone(), Duration::from_millis(10))
            .run(shutdown)
            .await;

        assert_eq!(service.source().loads(), 0);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let service = service(MockSource::new(Feed::Unreachable));
        let (trigger, shutdown) = shutdown_channel();
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_millis(20));

        let handle = tokio::spawn(scheduler.run(shutdown));
        wait_until(|| service.source().loads() >= 3).await;

        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert_eq!(service.repo().set_all_calls(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_during_wait_starts_no_new_cycle() {
        let service = service(MockSource::new(Feed::Snapshot(vec![usd(90.5)])));
        let (trigger, shutdown) = shutdown_channel();
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_millis(300));

        let handle = tokio::spawn(scheduler.run(shutdown));
        wait_until(|| service.source().loads() == 1).await;

        trigger.trigger();
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("scheduler waited for the next tick")
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(service.source().loads(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_in_flight_update() {
        let source = MockSource::new(Feed::Snapshot(vec![usd(90.5)]))
            .with_delay(Duration::from_secs(3600));
        let service = service(source);
        let (trigger, shutdown) = shutdown_channel();
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_secs(3600));

        let handle = tokio::spawn(scheduler.run(shutdown));
        wait_until(|| service.source().loads() == 1).await;

        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("in-flight update blocked shutdown")
            .unwrap();
        assert_eq!(service.repo().set_all_calls(), 0);
    }
}
