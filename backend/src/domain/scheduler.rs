//! Periodic driver for the reclaim and notification passes.
//!
//! One tokio task owns the whole cycle: the tick body is awaited inside the
//! loop, so a slow pass delays the next tick instead of overlapping it.
//! Shutdown is a watch channel; `stop` flips it and awaits the task so the
//! in-flight tick finishes cleanly.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::dispatch::NotificationDispatcher;
use crate::domain::ports::{PushTransport, RequestStore, WorkerDirectory};
use crate::domain::reclaim::LockReclaimer;
use crate::domain::targeting::TargetingEngine;

/// Default pause between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
/// Default cap on shifts notified per tick.
pub const DEFAULT_BATCH_LIMIT: i64 = 20;

/// Tick cadence and batch bounds.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub batch_limit: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

/// Background coordinator running the reclaim sweep and the targeting +
/// dispatch pass on a fixed interval.
pub struct Scheduler<S, D, P: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    reclaimer: LockReclaimer<S>,
    targeting: TargetingEngine<D>,
    dispatcher: NotificationDispatcher<S, P>,
    config: SchedulerConfig,
}

/// Handle to a started scheduler; dropping it without `stop` leaves the
/// task running until the runtime shuts down.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the current tick to finish.
    pub async fn stop(self) {
        // Receiver end lives in the task; send only fails once it is gone.
        let _ = self.shutdown.send(true);
        if let Err(error) = self.task.await {
            error!(%error, "scheduler task panicked");
        }
    }
}

impl<S, D, P> Scheduler<S, D, P>
where
    S: RequestStore + 'static,
    D: WorkerDirectory + 'static,
    P: PushTransport + ?Sized + 'static,
{
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        reclaimer: LockReclaimer<S>,
        targeting: TargetingEngine<D>,
        dispatcher: NotificationDispatcher<S, P>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            clock,
            reclaimer,
            targeting,
            dispatcher,
            config,
        }
    }

    /// Spawn the tick loop. The first tick runs after one full interval.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut stopped) = watch::channel(false);
        let interval = self.config.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Consume the immediate first tick so the cadence starts one
            // interval after startup.
            ticker.tick().await;
            info!(interval_secs = interval.as_secs(), "scheduler started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    _ = stopped.changed() => {
                        info!("scheduler stopping");
                        break;
                    }
                }
            }
        });
        SchedulerHandle { shutdown, task }
    }

    /// One full pass: reclaim expired locks, then target and dispatch each
    /// open future shift. Failures are contained per shift.
    pub async fn tick(&self) {
        let sweep = self.reclaimer.sweep().await;
        if sweep.examined > 0 {
            info!(
                examined = sweep.examined,
                reclaimed = sweep.reclaimed,
                "lock sweep finished"
            );
        }

        let now = self.clock.utc();
        let shifts = match self
            .store
            .open_future_shifts(now, self.config.batch_limit)
            .await
        {
            Ok(shifts) => shifts,
            Err(error) => {
                warn!(%error, "open shift listing failed; skipping notification pass");
                return;
            }
        };

        for shift in shifts {
            let candidates = match self.targeting.candidates_for(&shift).await {
                Ok(candidates) => candidates,
                Err(error) => {
                    warn!(shift_id = shift.id, %error, "targeting failed; skipping shift");
                    continue;
                }
            };
            if let Err(error) = self
                .dispatcher
                .dispatch(shift.id, &shift.service_label, &candidates)
                .await
            {
                warn!(shift_id = shift.id, %error, "dispatch failed; skipping shift");
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
