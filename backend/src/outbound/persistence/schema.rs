//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Shift requests published by pharmacies.
    ///
    /// `status` holds the lifecycle code (Open=1, Assigned=2, Locked=3,
    /// Completed=5). `assigned_worker` and `locked_at` are both set while a
    /// shift is Locked or Assigned and both null otherwise.
    shift_requests (id) {
        id -> BigInt,
        service_id -> Integer,
        scheduled_at -> Timestamptz,
        price -> Float8,
        city -> Text,
        address -> Text,
        contact_name -> Text,
        phone -> Text,
        notes -> Nullable<Text>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        status -> SmallInt,
        assigned_worker -> Nullable<Text>,
        locked_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Service catalogue. `kind` 8 marks company/bulk services that skip
    /// the per-worker capability filter.
    services (id) {
        id -> Integer,
        description -> Text,
        detailed_description -> Nullable<Text>,
        kind -> Integer,
    }
}

diesel::table! {
    /// Per-worker relationship to a shift (Proposed=1, Accepted=2,
    /// Viewing=3, Refused=4, Completed=5). Refused rows are permanent.
    shift_worker_views (worker, shift_id) {
        worker -> Text,
        shift_id -> BigInt,
        status -> SmallInt,
        notified -> Bool,
        mailed -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable push-delivery audit rows; `(worker, shift_id)` is unique
    /// and drives the exactly-once push dedup.
    notification_receipts (id) {
        id -> BigInt,
        worker -> Text,
        shift_id -> BigInt,
        title -> Text,
        body -> Text,
        sent -> Bool,
        sent_at -> Timestamptz,
    }
}

diesel::table! {
    /// Refusal analytics; never read by the state machine.
    refusal_reasons (id) {
        id -> BigInt,
        worker -> Text,
        shift_id -> BigInt,
        reason_code -> SmallInt,
        note -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Worker directory (read-only here; owned by the profile subsystem).
    workers (id) {
        id -> Text,
        role -> SmallInt,
        registration_status -> SmallInt,
        availability -> Nullable<Text>,
        max_distance -> Nullable<Float8>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        device_token -> Nullable<Text>,
    }
}

diesel::table! {
    /// Per-worker service opt-ins.
    worker_services (worker, service_id) {
        worker -> Text,
        service_id -> Integer,
        selected -> Bool,
    }
}

diesel::joinable!(shift_requests -> services (service_id));
diesel::joinable!(shift_worker_views -> shift_requests (shift_id));
diesel::joinable!(notification_receipts -> shift_requests (shift_id));
diesel::joinable!(refusal_reasons -> shift_requests (shift_id));
diesel::joinable!(worker_services -> workers (worker));

diesel::allow_tables_to_appear_in_same_query!(
    shift_requests,
    services,
    shift_worker_views,
    notification_receipts,
    refusal_reasons,
    workers,
    worker_services,
);
