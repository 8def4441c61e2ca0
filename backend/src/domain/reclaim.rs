//! Reclaims shift locks whose holders went silent.
//!
//! A lock is a soft claim: the holder has the lock TTL to accept before the
//! shift returns to the open pool. The sweep lists candidates first, then
//! reclaims each shift in its own transaction so one poisoned row cannot
//! wedge the rest, and so a lock refreshed between the listing and the
//! per-shift re-check under the row lock is left alone.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::RequestStore;

/// Default grace period before a lock is considered abandoned.
pub const DEFAULT_LOCK_TTL_MINUTES: i64 = 10;

/// Outcome of one reclaim sweep, for the scheduler's tick log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Shifts whose lock looked expired when the sweep started.
    pub examined: usize,
    /// Shifts actually returned to the open pool.
    pub reclaimed: usize,
}

/// Periodic reaper for expired shift locks.
pub struct LockReclaimer<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<S> LockReclaimer<S>
where
    S: RequestStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Release every lock older than the TTL.
    ///
    /// Listing and reclaiming are separate transactions; each reclaim
    /// re-verifies the lock age under the row lock, so a shift accepted or
    /// re-locked in between is skipped. Individual failures are logged and
    /// the sweep moves on.
    pub async fn sweep(&self) -> SweepReport {
        let cutoff = self.clock.utc() - self.ttl;
        let expired = match self.store.expired_locks(cutoff).await {
            Ok(ids) => ids,
            Err(error) => {
                warn!(%error, "expired-lock listing failed; skipping sweep");
                return SweepReport::default();
            }
        };

        let mut report = SweepReport {
            examined: expired.len(),
            reclaimed: 0,
        };
        for shift_id in expired {
            match self.store.reclaim(shift_id, cutoff).await {
                Ok(true) => {
                    info!(shift_id, "reclaimed expired lock");
                    report.reclaimed += 1;
                }
                Ok(false) => {
                    // Refreshed or resolved since the listing.
                }
                Err(error) => {
                    warn!(shift_id, %error, "reclaim failed; continuing sweep");
                }
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "reclaim_tests.rs"]
mod reclaim_tests;
