//! PostgreSQL-backed `RequestStore` implementation using Diesel.
//!
//! The concurrency contract lives here: every transition and reclaim runs
//! in one transaction and fetches the shift row `FOR UPDATE` before looking
//! at it, so concurrent commands on the same shift serialise on the row
//! lock and the pure planner always sees a stable snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::assignment::{TransitionCommand, TransitionPlan, plan};
use crate::domain::geo::Coordinates;
use crate::domain::ports::{NotificationReceiptRecord, RequestStore, RequestStoreError};
use crate::domain::shift::{
    OpenShiftProfile, ShiftBoard, ShiftId, ShiftRequest, ShiftStatus, WorkerId,
};
use crate::domain::view::ViewStatus;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{
    NewNotificationReceiptRow, NewRefusalReasonRow, ShiftAssignmentUpdate, ShiftRequestRow,
    ShiftWorkerViewRow,
};
use super::pool::DbPool;
use super::schema::{
    notification_receipts, refusal_reasons, services, shift_requests, shift_worker_views,
};

/// Service catalogue kind marking company/bulk services.
const BULK_SERVICE_KIND: i32 = 8;

/// Diesel-backed implementation of the [`RequestStore`] port.
#[derive(Clone)]
pub struct DieselRequestStore {
    pool: DbPool,
}

impl DieselRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        RequestStoreError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RequestStoreError::connection))
    }
}

/// Error carried through a transaction body: either a domain outcome that
/// must abort the transaction, or a raw Diesel failure mapped afterwards.
enum TxError {
    Store(RequestStoreError),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl TxError {
    fn resolve(self) -> RequestStoreError {
        match self {
            Self::Store(error) => error,
            Self::Diesel(error) => {
                map_diesel_error(error, RequestStoreError::query, RequestStoreError::connection)
            }
        }
    }
}

/// Fetch one shift row under an exclusive row lock.
async fn fetch_for_update(
    conn: &mut AsyncPgConnection,
    shift_id: ShiftId,
) -> Result<Option<ShiftRequestRow>, diesel::result::Error> {
    shift_requests::table
        .find(shift_id)
        .for_update()
        .select(ShiftRequestRow::as_select())
        .first(conn)
        .await
        .optional()
}

fn rows_to_shifts(rows: Vec<ShiftRequestRow>) -> Result<Vec<ShiftRequest>, RequestStoreError> {
    rows.into_iter().map(ShiftRequestRow::into_domain).collect()
}

/// The `available` half of a worker's board: Open future shifts the worker
/// was targeted for, plus their own live lock. Being targeted means holding
/// a non-Refused view row, so workers the dispatcher never reached do not
/// see the shift at all.
fn available_shifts_query<'a>(
    worker: &'a str,
    now: DateTime<Utc>,
) -> shift_requests::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<ShiftRequestRow, Pg>>> {
    let visible = shift_worker_views::table
        .filter(shift_worker_views::worker.eq(worker))
        .filter(shift_worker_views::status.ne(ViewStatus::Refused.code()))
        .select(shift_worker_views::shift_id);
    shift_requests::table
        .filter(
            shift_requests::status
                .eq(ShiftStatus::Open.code())
                .and(shift_requests::scheduled_at.gt(now))
                .and(shift_requests::id.eq_any(visible))
                .or(shift_requests::status
                    .eq(ShiftStatus::Locked.code())
                    .and(shift_requests::assigned_worker.eq(worker))),
        )
        .order(shift_requests::scheduled_at.asc())
        .select(ShiftRequestRow::as_select())
        .into_boxed()
}

#[async_trait]
impl RequestStore for DieselRequestStore {
    async fn transition(
        &self,
        shift_id: ShiftId,
        command: TransitionCommand,
        now: DateTime<Utc>,
    ) -> Result<TransitionPlan, RequestStoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<TransitionPlan, TxError, _>(|conn| {
            async move {
                let row = fetch_for_update(conn, shift_id)
                    .await?
                    .ok_or_else(|| TxError::Store(RequestStoreError::not_found(shift_id)))?;
                let shift = row.into_domain().map_err(TxError::Store)?;
                let plan = plan(&shift, &command, now)
                    .map_err(|rejection| TxError::Store(RequestStoreError::Rejected(rejection)))?;

                if let Some(change) = &plan.shift_change {
                    diesel::update(shift_requests::table.find(shift_id))
                        .set(ShiftAssignmentUpdate {
                            status: change.status.code(),
                            assigned_worker: change.assigned_worker.as_deref(),
                            locked_at: change.locked_at,
                        })
                        .execute(conn)
                        .await?;
                }
                if let Some(view_status) = plan.view_status {
                    diesel::insert_into(shift_worker_views::table)
                        .values(ShiftWorkerViewRow {
                            worker: &command.worker,
                            shift_id,
                            status: view_status.code(),
                            notified: false,
                            mailed: false,
                            updated_at: now,
                        })
                        .on_conflict((shift_worker_views::worker, shift_worker_views::shift_id))
                        .do_update()
                        .set((
                            shift_worker_views::status.eq(view_status.code()),
                            shift_worker_views::updated_at.eq(now),
                        ))
                        .execute(conn)
                        .await?;
                }
                if let Some(reason) = &plan.refusal_reason {
                    diesel::insert_into(refusal_reasons::table)
                        .values(NewRefusalReasonRow {
                            worker: &command.worker,
                            shift_id,
                            reason_code: reason.code,
                            note: reason.note.as_deref(),
                            created_at: now,
                        })
                        .execute(conn)
                        .await?;
                }
                Ok(plan)
            }
            .scope_boxed()
        })
        .await
        .map_err(TxError::resolve)
    }

    async fn shift_board(
        &self,
        worker: WorkerId,
        now: DateTime<Utc>,
    ) -> Result<ShiftBoard, RequestStoreError> {
        let mut conn = self.conn().await?;
        let (available_rows, mine_rows) = conn
            .transaction::<(Vec<ShiftRequestRow>, Vec<ShiftRequestRow>), diesel::result::Error, _>(
                |conn| {
                    let worker = worker.clone();
                    async move {
                        let available = available_shifts_query(worker.as_str(), now)
                            .load(conn)
                            .await?;
                        let mine = shift_requests::table
                            .filter(shift_requests::status.eq(ShiftStatus::Assigned.code()))
                            .filter(shift_requests::assigned_worker.eq(worker.as_str()))
                            .filter(shift_requests::scheduled_at.gt(now))
                            .order(shift_requests::scheduled_at.asc())
                            .select(ShiftRequestRow::as_select())
                            .load(conn)
                            .await?;
                        Ok((available, mine))
                    }
                    .scope_boxed()
                },
            )
            .await
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })?;
        Ok(ShiftBoard {
            available: rows_to_shifts(available_rows)?,
            mine: rows_to_shifts(mine_rows)?,
        })
    }

    async fn expired_locks(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ShiftId>, RequestStoreError> {
        let mut conn = self.conn().await?;
        shift_requests::table
            .filter(shift_requests::status.eq(ShiftStatus::Locked.code()))
            .filter(shift_requests::locked_at.lt(cutoff))
            .select(shift_requests::id)
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })
    }

    async fn reclaim(
        &self,
        shift_id: ShiftId,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, RequestStoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<bool, diesel::result::Error, _>(|conn| {
            async move {
                let Some(row) = fetch_for_update(conn, shift_id).await? else {
                    return Ok(false);
                };
                // Re-verify under the row lock: the holder may have accepted
                // or re-locked since the listing.
                let still_expired = row.status == ShiftStatus::Locked.code()
                    && row.locked_at.is_some_and(|at| at < cutoff);
                if !still_expired {
                    return Ok(false);
                }

                diesel::update(shift_requests::table.find(shift_id))
                    .set(ShiftAssignmentUpdate {
                        status: ShiftStatus::Open.code(),
                        assigned_worker: None,
                        locked_at: None,
                    })
                    .execute(conn)
                    .await?;
                // The silent holder's Viewing row goes back to Proposed so
                // the shift reappears on their board.
                diesel::update(
                    shift_worker_views::table
                        .filter(shift_worker_views::shift_id.eq(shift_id))
                        .filter(shift_worker_views::status.eq(ViewStatus::Viewing.code())),
                )
                .set((
                    shift_worker_views::status.eq(ViewStatus::Proposed.code()),
                    shift_worker_views::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| {
            map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
        })
    }

    async fn open_future_shifts(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OpenShiftProfile>, RequestStoreError> {
        let mut conn = self.conn().await?;
        let rows: Vec<(i64, i32, String, i32, DateTime<Utc>, Option<f64>, Option<f64>)> =
            shift_requests::table
                .inner_join(services::table)
                .filter(shift_requests::status.eq(ShiftStatus::Open.code()))
                .filter(shift_requests::scheduled_at.gt(now))
                .order(shift_requests::scheduled_at.asc())
                .limit(limit)
                .select((
                    shift_requests::id,
                    shift_requests::service_id,
                    services::description,
                    services::kind,
                    shift_requests::scheduled_at,
                    shift_requests::latitude,
                    shift_requests::longitude,
                ))
                .load(&mut conn)
                .await
                .map_err(|err| {
                    map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
                })?;

        Ok(rows
            .into_iter()
            .map(
                |(id, service_id, description, kind, scheduled_at, latitude, longitude)| {
                    let coordinates = match (latitude, longitude) {
                        (Some(latitude), Some(longitude)) => Some(Coordinates {
                            latitude,
                            longitude,
                        }),
                        _ => None,
                    };
                    let service_label = if description.is_empty() {
                        "New shift available".to_owned()
                    } else {
                        description
                    };
                    OpenShiftProfile {
                        id,
                        service_id,
                        service_label,
                        bulk_service: kind == BULK_SERVICE_KIND,
                        scheduled_at,
                        coordinates,
                    }
                },
            )
            .collect())
    }

    async fn notified_workers(
        &self,
        shift_id: ShiftId,
    ) -> Result<Vec<WorkerId>, RequestStoreError> {
        let mut conn = self.conn().await?;
        notification_receipts::table
            .filter(notification_receipts::shift_id.eq(shift_id))
            .select(notification_receipts::worker)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })
    }

    async fn viewed_workers(&self, shift_id: ShiftId) -> Result<Vec<WorkerId>, RequestStoreError> {
        let mut conn = self.conn().await?;
        shift_worker_views::table
            .filter(shift_worker_views::shift_id.eq(shift_id))
            .select(shift_worker_views::worker)
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })
    }

    async fn insert_receipts(
        &self,
        records: Vec<NotificationReceiptRecord>,
    ) -> Result<(), RequestStoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let rows: Vec<NewNotificationReceiptRow<'_>> = records
            .iter()
            .map(|record| NewNotificationReceiptRow {
                worker: &record.worker,
                shift_id: record.shift_id,
                title: &record.title,
                body: &record.body,
                sent: true,
            })
            .collect();
        diesel::insert_into(notification_receipts::table)
            .values(rows)
            .on_conflict((notification_receipts::worker, notification_receipts::shift_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })
    }

    async fn insert_proposed_views(
        &self,
        shift_id: ShiftId,
        workers: Vec<WorkerId>,
    ) -> Result<usize, RequestStoreError> {
        if workers.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn().await?;
        let now = Utc::now();
        let rows: Vec<ShiftWorkerViewRow<'_>> = workers
            .iter()
            .map(|worker| ShiftWorkerViewRow {
                worker,
                shift_id,
                status: ViewStatus::Proposed.code(),
                notified: true,
                mailed: false,
                updated_at: now,
            })
            .collect();
        diesel::insert_into(shift_worker_views::table)
            .values(rows)
            .on_conflict((shift_worker_views::worker, shift_worker_views::shift_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(err, RequestStoreError::query, RequestStoreError::connection)
            })
    }
}

#[cfg(test)]
mod tests {
    //! The board query is assembled by a named constructor so its
    //! visibility rule can be checked without a live database.

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn board_availability_requires_a_non_refused_view_row() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 4, 15, 0, 0)
            .single()
            .expect("valid time");
        let sql = diesel::debug_query::<Pg, _>(&available_shifts_query("w1", now)).to_string();

        // Untargeted workers (no view row) must not match: visibility is
        // membership in the worker's non-Refused views, not absence from
        // their refusals.
        assert!(
            sql.contains(r#""shift_requests"."id" IN (SELECT "shift_worker_views"."shift_id""#),
            "{sql}"
        );
        assert!(sql.contains(r#""shift_worker_views"."status" != "#), "{sql}");
        assert!(!sql.contains("NOT IN"), "{sql}");
    }

    #[test]
    fn board_availability_keeps_the_workers_own_lock_visible() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 4, 15, 0, 0)
            .single()
            .expect("valid time");
        let sql = diesel::debug_query::<Pg, _>(&available_shifts_query("w1", now)).to_string();
        assert!(sql.contains(r#""shift_requests"."assigned_worker" = "#), "{sql}");
    }
}
