//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Decoding a row into a domain type happens here, so malformed
//! persisted codes fail loudly in one place.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::geo::Coordinates;
use crate::domain::ports::RequestStoreError;
use crate::domain::shift::{ShiftRequest, ShiftStatus};

use super::schema::{notification_receipts, refusal_reasons, shift_requests, shift_worker_views};

/// Row struct for reading from the shift_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shift_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShiftRequestRow {
    pub id: i64,
    pub service_id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub price: f64,
    pub city: String,
    pub address: String,
    pub contact_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: i16,
    pub assigned_worker: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl ShiftRequestRow {
    /// Decode into the domain entity, rejecting unknown status codes and
    /// rows whose assignment fields disagree with their status.
    pub(crate) fn into_domain(self) -> Result<ShiftRequest, RequestStoreError> {
        let status = ShiftStatus::from_code(self.status).ok_or_else(|| {
            RequestStoreError::query(format!("shift {} has unknown status {}", self.id, self.status))
        })?;
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        let shift = ShiftRequest {
            id: self.id,
            service_id: self.service_id,
            scheduled_at: self.scheduled_at,
            price: self.price,
            city: self.city,
            address: self.address,
            contact_name: self.contact_name,
            phone: self.phone,
            notes: self.notes,
            coordinates,
            status,
            assigned_worker: self.assigned_worker,
            locked_at: self.locked_at,
        };
        if !shift.assignment_fields_consistent() {
            return Err(RequestStoreError::query(format!(
                "shift {} assignment fields disagree with status {}",
                shift.id,
                shift.status.code()
            )));
        }
        Ok(shift)
    }
}

/// Changeset applying a planned shift transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = shift_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ShiftAssignmentUpdate<'a> {
    pub status: i16,
    pub assigned_worker: Option<&'a str>,
    pub locked_at: Option<DateTime<Utc>>,
}

/// Insertable/upsert struct for the caller's view row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shift_worker_views)]
pub(crate) struct ShiftWorkerViewRow<'a> {
    pub worker: &'a str,
    pub shift_id: i64,
    pub status: i16,
    pub notified: bool,
    pub mailed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for push-delivery receipts. `sent_at` comes from the
/// column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_receipts)]
pub(crate) struct NewNotificationReceiptRow<'a> {
    pub worker: &'a str,
    pub shift_id: i64,
    pub title: &'a str,
    pub body: &'a str,
    pub sent: bool,
}

/// Insertable struct for refusal analytics.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = refusal_reasons)]
pub(crate) struct NewRefusalReasonRow<'a> {
    pub worker: &'a str,
    pub shift_id: i64,
    pub reason_code: i16,
    pub note: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> ShiftRequestRow {
        ShiftRequestRow {
            id: 7,
            service_id: 3,
            scheduled_at: Utc.with_ymd_and_hms(2026, 3, 4, 18, 0, 0)
                .single()
                .expect("valid time"),
            price: 120.0,
            city: "Bologna".to_owned(),
            address: "Via Indipendenza 1".to_owned(),
            contact_name: "Dr. Rossi".to_owned(),
            phone: "+39 051 000000".to_owned(),
            notes: None,
            latitude: Some(44.49),
            longitude: Some(11.34),
            status: 1,
            assigned_worker: None,
            locked_at: None,
        }
    }

    #[test]
    fn open_row_decodes() {
        let shift = row().into_domain().expect("valid row");
        assert_eq!(shift.status, ShiftStatus::Open);
        assert!(shift.coordinates.is_some());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = 4;
        let error = bad.into_domain().expect_err("code 4 is unused");
        assert!(error.to_string().contains("unknown status"));
    }

    #[test]
    fn inconsistent_assignment_fields_are_rejected() {
        let mut bad = row();
        bad.status = 3; // Locked but no holder recorded
        let error = bad.into_domain().expect_err("missing holder");
        assert!(error.to_string().contains("disagree"));
    }

    #[test]
    fn half_missing_coordinates_decode_as_none() {
        let mut partial = row();
        partial.longitude = None;
        let shift = partial.into_domain().expect("valid row");
        assert!(shift.coordinates.is_none());
    }
}
