use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::MockClock;
use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockRequestStore, RequestStoreError};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0)
        .single()
        .expect("valid time")
}

fn clock() -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(fixed_now);
    Arc::new(clock)
}

fn reclaimer(store: MockRequestStore) -> LockReclaimer<MockRequestStore> {
    LockReclaimer::new(
        Arc::new(store),
        clock(),
        Duration::minutes(DEFAULT_LOCK_TTL_MINUTES),
    )
}

#[rstest]
#[tokio::test]
async fn sweep_uses_a_ttl_cutoff_and_reclaims_each_shift() {
    let cutoff = fixed_now() - Duration::minutes(DEFAULT_LOCK_TTL_MINUTES);
    let mut store = MockRequestStore::new();
    store
        .expect_expired_locks()
        .with(eq(cutoff))
        .times(1)
        .returning(|_| Ok(vec![1, 2]));
    store
        .expect_reclaim()
        .with(eq(1_i64), eq(cutoff))
        .times(1)
        .returning(|_, _| Ok(true));
    store
        .expect_reclaim()
        .with(eq(2_i64), eq(cutoff))
        .times(1)
        .returning(|_, _| Ok(true));

    let report = reclaimer(store).sweep().await;
    assert_eq!(
        report,
        SweepReport {
            examined: 2,
            reclaimed: 2
        }
    );
}

#[rstest]
#[tokio::test]
async fn refreshed_locks_are_skipped_without_counting() {
    let mut store = MockRequestStore::new();
    store
        .expect_expired_locks()
        .returning(|_| Ok(vec![7]));
    // The holder re-locked between the listing and the row lock.
    store.expect_reclaim().returning(|_, _| Ok(false));

    let report = reclaimer(store).sweep().await;
    assert_eq!(
        report,
        SweepReport {
            examined: 1,
            reclaimed: 0
        }
    );
}

#[rstest]
#[tokio::test]
async fn one_failing_shift_does_not_abort_the_sweep() {
    let mut store = MockRequestStore::new();
    store
        .expect_expired_locks()
        .returning(|_| Ok(vec![1, 2, 3]));
    store
        .expect_reclaim()
        .with(eq(1_i64), mockall::predicate::always())
        .returning(|_, _| Err(RequestStoreError::query("deadlock detected")));
    store
        .expect_reclaim()
        .with(eq(2_i64), mockall::predicate::always())
        .returning(|_, _| Ok(true));
    store
        .expect_reclaim()
        .with(eq(3_i64), mockall::predicate::always())
        .returning(|_, _| Ok(true));

    let report = reclaimer(store).sweep().await;
    assert_eq!(
        report,
        SweepReport {
            examined: 3,
            reclaimed: 2
        }
    );
}

#[rstest]
#[tokio::test]
async fn listing_failure_yields_an_empty_report() {
    let mut store = MockRequestStore::new();
    store
        .expect_expired_locks()
        .returning(|_| Err(RequestStoreError::connection("pool exhausted")));
    store.expect_reclaim().never();

    let report = reclaimer(store).sweep().await;
    assert_eq!(report, SweepReport::default());
}
