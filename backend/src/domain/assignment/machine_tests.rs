//! Transition planner behaviour, including the mutual-exclusion and
//! idempotent re-lock properties.

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::shift::{ShiftRequest, ShiftStatus};
use crate::domain::view::ViewStatus;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 14, 30, 0)
        .single()
        .expect("valid time")
}

#[fixture]
fn open_shift() -> ShiftRequest {
    ShiftRequest {
        id: 42,
        service_id: 3,
        scheduled_at: Utc
            .with_ymd_and_hms(2026, 3, 4, 15, 0, 0)
            .single()
            .expect("valid time"),
        price: 95.0,
        city: "Bologna".to_owned(),
        address: "Via Zamboni 33".to_owned(),
        contact_name: "Ward B".to_owned(),
        phone: "+39051123456".to_owned(),
        notes: None,
        coordinates: None,
        status: ShiftStatus::Open,
        assigned_worker: None,
        locked_at: None,
    }
}

fn locked_by(mut shift: ShiftRequest, worker: &str) -> ShiftRequest {
    shift.status = ShiftStatus::Locked;
    shift.assigned_worker = Some(worker.to_owned());
    shift.locked_at = Some(now());
    shift
}

fn assigned_to(mut shift: ShiftRequest, worker: &str) -> ShiftRequest {
    shift.status = ShiftStatus::Assigned;
    shift.assigned_worker = Some(worker.to_owned());
    shift.locked_at = Some(now());
    shift
}

fn command(worker: &str, action: AssignmentAction) -> TransitionCommand {
    TransitionCommand {
        worker: worker.to_owned(),
        action,
    }
}

#[rstest]
fn lock_claims_an_open_shift(open_shift: ShiftRequest) {
    let plan = plan(&open_shift, &command("w1", AssignmentAction::Lock), now())
        .expect("open shift is lockable");

    let change = plan.shift_change.expect("lock writes the shift row");
    assert_eq!(change.status, ShiftStatus::Locked);
    assert_eq!(change.assigned_worker.as_deref(), Some("w1"));
    assert_eq!(change.locked_at, Some(now()));
    assert_eq!(plan.view_status, Some(ViewStatus::Viewing));
}

#[rstest]
fn relock_by_the_holder_is_a_success_noop(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w1");
    let plan = plan(&shift, &command("w1", AssignmentAction::Lock), now())
        .expect("re-lock by the holder succeeds");

    assert_eq!(plan.shift_change, None);
    assert_eq!(plan.view_status, None);
}

#[rstest]
fn lock_on_a_foreign_lock_is_already_taken(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w1");
    let rejection =
        plan(&shift, &command("w2", AssignmentAction::Lock), now()).expect_err("w2 lost the race");
    assert_eq!(rejection, TransitionRejection::AlreadyTaken);
}

#[rstest]
#[case::assigned(ShiftStatus::Assigned)]
#[case::completed(ShiftStatus::Completed)]
fn lock_on_a_resolved_shift_is_already_taken(
    open_shift: ShiftRequest,
    #[case] status: ShiftStatus,
) {
    let mut shift = assigned_to(open_shift, "w1");
    shift.status = status;
    let rejection = plan(&shift, &command("w2", AssignmentAction::Lock), now())
        .expect_err("resolved shifts are not lockable");
    assert_eq!(rejection, TransitionRejection::AlreadyTaken);
}

#[rstest]
fn accept_promotes_the_callers_lock(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w1");
    let plan = plan(&shift, &command("w1", AssignmentAction::Accept), now())
        .expect("holder may accept");

    let change = plan.shift_change.expect("accept writes the shift row");
    assert_eq!(change.status, ShiftStatus::Assigned);
    assert_eq!(change.assigned_worker.as_deref(), Some("w1"));
    assert_eq!(plan.view_status, Some(ViewStatus::Accepted));
}

#[rstest]
fn accept_after_expiry_reopen_is_lock_lost(open_shift: ShiftRequest) {
    let rejection = plan(&open_shift, &command("w1", AssignmentAction::Accept), now())
        .expect_err("no lock to accept");
    assert_eq!(rejection, TransitionRejection::LockLost);
}

#[rstest]
fn accept_of_a_foreign_lock_is_lock_lost(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w2");
    let rejection = plan(&shift, &command("w1", AssignmentAction::Accept), now())
        .expect_err("lock belongs to w2");
    assert_eq!(rejection, TransitionRejection::LockLost);
}

#[rstest]
fn refuse_by_the_holder_releases_the_shift(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w1");
    let reason = RefusalReason {
        code: 2,
        note: Some("too far".to_owned()),
    };
    let plan = plan(
        &shift,
        &command(
            "w1",
            AssignmentAction::Refuse {
                reason: Some(reason.clone()),
            },
        ),
        now(),
    )
    .expect("refuse always succeeds");

    let change = plan.shift_change.expect("holder refuse reopens the shift");
    assert_eq!(change.status, ShiftStatus::Open);
    assert_eq!(change.assigned_worker, None);
    assert_eq!(change.locked_at, None);
    assert_eq!(plan.view_status, Some(ViewStatus::Refused));
    assert_eq!(plan.refusal_reason, Some(reason));
}

#[rstest]
fn refuse_without_the_lock_only_marks_the_view(open_shift: ShiftRequest) {
    let plan = plan(
        &open_shift,
        &command("w1", AssignmentAction::Refuse { reason: None }),
        now(),
    )
    .expect("broad refuse succeeds without a lock");

    assert_eq!(plan.shift_change, None);
    assert_eq!(plan.view_status, Some(ViewStatus::Refused));
}

#[rstest]
fn refuse_of_a_foreign_lock_leaves_the_lock_alone(open_shift: ShiftRequest) {
    let shift = locked_by(open_shift, "w2");
    let plan = plan(
        &shift,
        &command("w1", AssignmentAction::Refuse { reason: None }),
        now(),
    )
    .expect("broad refuse succeeds");

    assert_eq!(plan.shift_change, None, "w2's lock must survive w1's refuse");
    assert_eq!(plan.view_status, Some(ViewStatus::Refused));
}

#[rstest]
fn complete_closes_the_callers_assignment(open_shift: ShiftRequest) {
    let shift = assigned_to(open_shift, "w1");
    let plan = plan(&shift, &command("w1", AssignmentAction::Complete), now())
        .expect("assignee may complete");

    let change = plan.shift_change.expect("complete writes the shift row");
    assert_eq!(change.status, ShiftStatus::Completed);
    assert_eq!(change.assigned_worker, None);
    assert_eq!(change.locked_at, None);
    assert_eq!(plan.view_status, Some(ViewStatus::Completed));
}

#[rstest]
#[case::still_locked(ShiftStatus::Locked)]
#[case::already_completed(ShiftStatus::Completed)]
fn complete_requires_an_assignment(open_shift: ShiftRequest, #[case] status: ShiftStatus) {
    let mut shift = assigned_to(open_shift, "w1");
    shift.status = status;
    if status == ShiftStatus::Completed {
        shift.assigned_worker = None;
        shift.locked_at = None;
    }
    let rejection = plan(&shift, &command("w1", AssignmentAction::Complete), now())
        .expect_err("only Assigned shifts complete");
    assert_eq!(rejection, TransitionRejection::NotAssignedToCaller);
}

#[rstest]
fn complete_by_a_stranger_is_rejected(open_shift: ShiftRequest) {
    let shift = assigned_to(open_shift, "w1");
    let rejection = plan(&shift, &command("w2", AssignmentAction::Complete), now())
        .expect_err("w2 is not the assignee");
    assert_eq!(rejection, TransitionRejection::NotAssignedToCaller);
}

/// Race resolution: both workers saw the shift Open, but the row lock admits
/// them one at a time. The second planner run sees the winner's snapshot.
#[rstest]
fn second_concurrent_lock_observes_the_winner(open_shift: ShiftRequest) {
    let first = plan(&open_shift, &command("wA", AssignmentAction::Lock), now())
        .expect("first locker wins");
    let change = first.shift_change.expect("winner writes the row");

    let mut after_first = open_shift;
    after_first.status = change.status;
    after_first.assigned_worker = change.assigned_worker;
    after_first.locked_at = change.locked_at;

    let rejection = plan(&after_first, &command("wB", AssignmentAction::Lock), now())
        .expect_err("second locker conflicts");
    assert_eq!(rejection, TransitionRejection::AlreadyTaken);
    assert_eq!(after_first.assigned_worker.as_deref(), Some("wA"));
}

#[rstest]
fn every_admitted_change_keeps_the_assignment_invariant(open_shift: ShiftRequest) {
    let scenarios: Vec<(ShiftRequest, TransitionCommand)> = vec![
        (open_shift.clone(), command("w1", AssignmentAction::Lock)),
        (
            locked_by(open_shift.clone(), "w1"),
            command("w1", AssignmentAction::Accept),
        ),
        (
            locked_by(open_shift.clone(), "w1"),
            command("w1", AssignmentAction::Refuse { reason: None }),
        ),
        (
            assigned_to(open_shift.clone(), "w1"),
            command("w1", AssignmentAction::Complete),
        ),
    ];

    for (mut shift, cmd) in scenarios {
        let plan = plan(&shift, &cmd, now()).expect("scenario is admitted");
        if let Some(change) = plan.shift_change {
            shift.status = change.status;
            shift.assigned_worker = change.assigned_worker;
            shift.locked_at = change.locked_at;
        }
        assert!(
            shift.assignment_fields_consistent(),
            "invariant broken after {cmd:?}"
        );
    }
}
