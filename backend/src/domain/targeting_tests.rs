use std::sync::Arc;

use chrono::{Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::geo::Coordinates;
use crate::domain::ports::MockWorkerDirectory;

#[fixture]
fn shift() -> OpenShiftProfile {
    OpenShiftProfile {
        id: 42,
        service_id: 3,
        service_label: "Evening cover".to_owned(),
        bulk_service: false,
        scheduled_at: Utc.with_ymd_and_hms(2026, 3, 4, 18, 0, 0)
            .single()
            .expect("valid time"),
        coordinates: Some(Coordinates {
            latitude: 44.49,
            longitude: 11.34,
        }),
    }
}

#[rstest]
#[tokio::test]
async fn query_carries_the_shift_fields_and_local_token(shift: OpenShiftProfile) {
    let expected_token = AvailabilityToken::for_local_time(
        shift.scheduled_at.with_timezone(&Local).naive_local(),
    );
    let expected_coordinates = shift.coordinates.expect("fixture has coordinates");

    let mut directory = MockWorkerDirectory::new();
    directory
        .expect_find_candidates()
        .withf(move |query| {
            query.token == expected_token
                && query.coordinates == expected_coordinates
                && query.service_id == 3
                && !query.bulk_service
        })
        .times(1)
        .returning(|_| {
            Ok(vec![CandidateWorker {
                id: "w1".to_owned(),
                device_token: None,
            }])
        });

    let engine = TargetingEngine::new(Arc::new(directory));
    let candidates = engine.candidates_for(&shift).await.expect("lookup succeeds");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "w1");
}

#[rstest]
#[tokio::test]
async fn bulk_services_pass_the_flag_through(mut shift: OpenShiftProfile) {
    shift.bulk_service = true;

    let mut directory = MockWorkerDirectory::new();
    directory
        .expect_find_candidates()
        .withf(|query| query.bulk_service)
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let engine = TargetingEngine::new(Arc::new(directory));
    engine.candidates_for(&shift).await.expect("lookup succeeds");
}

#[rstest]
#[tokio::test]
async fn shifts_without_coordinates_target_nobody(mut shift: OpenShiftProfile) {
    shift.coordinates = None;

    let mut directory = MockWorkerDirectory::new();
    directory.expect_find_candidates().never();

    let engine = TargetingEngine::new(Arc::new(directory));
    let candidates = engine.candidates_for(&shift).await.expect("lookup succeeds");
    assert!(candidates.is_empty());
}
