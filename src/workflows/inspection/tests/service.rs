use super::common::*;
use std::sync::Arc;

use crate::workflows::inspection::catalog::{ConditionRating, VehicleAspect};
use crate::workflows::inspection::domain::{ComplianceStatus, SessionId, SessionStatus};
use crate::workflows::inspection::risk::RiskInputs;
use crate::workflows::inspection::service::{InspectionService, InspectionServiceError};
use crate::workflows::inspection::session::SessionError;

#[test]
fn begin_inspection_requires_an_active_vehicle() {
    let (service, _) = build_service_with(MemoryFleet::empty(), MemoryStandards::default());

    let error = service
        .begin_inspection(driver(), org())
        .expect_err("empty fleet rejected");

    assert!(matches!(error, InspectionServiceError::NoVehicleAvailable));
}

#[test]
fn begin_inspection_opens_a_draft_session() {
    let (service, _) = build_service();

    let session_id = service
        .begin_inspection(driver(), org())
        .expect("fleet has a bus");

    let session = service.session(&session_id).expect("session exists");
    assert_eq!(session.status, SessionStatus::Draft);
    assert_eq!(session.driver, driver());
    assert_eq!(session.organization, org());
}

#[test]
fn unknown_session_reports_not_found() {
    let (service, _) = build_service();
    let missing = SessionId("insp-999999".to_string());

    let error = service
        .set_mileage(&missing, 1000)
        .expect_err("unknown session");

    assert!(matches!(
        error,
        InspectionServiceError::SessionNotFound(id) if id == missing
    ));
}

#[test]
fn submit_persists_session_and_score_together() {
    let (service, store) = build_service();
    let session_id = service.begin_inspection(driver(), org()).expect("begins");
    fill_session(&service, &session_id);
    service
        .set_observation(&session_id, VehicleAspect::Brakes, ConditionRating::Poor, None)
        .expect("observation settable");

    let score = service
        .submit_inspection(&session_id, eval_date())
        .expect("complete session submits");

    assert_eq!(score.score, 85);
    assert_eq!(score.status, ComplianceStatus::Warning);

    let submissions = store.submissions.lock().expect("mutex");
    assert_eq!(submissions.len(), 1);
    let (persisted_session, persisted_score) = &submissions[0];
    assert_eq!(persisted_session.id, session_id);
    assert_eq!(persisted_session.status, SessionStatus::Submitted);
    assert_eq!(persisted_score, &score);
}

#[test]
fn submit_uses_the_organizations_standards() {
    let standards = MemoryStandards {
        standards: vec![standard(
            "std-brakes",
            Some(org()),
            "mechanical",
            "brakes",
            25,
            Some("FMCSA 393.40"),
        )],
    };
    let (service, _) = build_service_with(MemoryFleet::with_bus(), standards);
    let session_id = service.begin_inspection(driver(), org()).expect("begins");
    fill_session(&service, &session_id);
    service
        .set_observation(
            &session_id,
            VehicleAspect::Brakes,
            ConditionRating::Defective,
            None,
        )
        .expect("observation settable");

    let score = service
        .submit_inspection(&session_id, eval_date())
        .expect("submits");

    assert_eq!(score.score, 75);
    assert_eq!(
        score.regulatory_notes,
        vec!["Brakes condition is poor - FMCSA 393.40".to_string()]
    );
}

#[test]
fn incomplete_submission_persists_nothing() {
    let (service, store) = build_service();
    let session_id = service.begin_inspection(driver(), org()).expect("begins");
    service
        .select_vehicle(&session_id, bus().id)
        .expect("vehicle selectable");
    // Mileage, fuel, and every observation still missing.

    let error = service
        .submit_inspection(&session_id, eval_date())
        .expect_err("incomplete");

    assert!(matches!(
        error,
        InspectionServiceError::Session(SessionError::Incomplete(_))
    ));
    assert!(store.submissions.lock().expect("mutex").is_empty());

    let session = service.session(&session_id).expect("session kept");
    assert_eq!(session.status, SessionStatus::InProgress);
}

#[test]
fn failed_persistence_keeps_submission_retryable() {
    let store = Arc::new(FlakyStore::failing(1));
    let service = InspectionService::new(
        Arc::new(MemoryFleet::with_bus()),
        Arc::new(MemoryStandards::default()),
        store.clone(),
    );
    let session_id = service.begin_inspection(driver(), org()).expect("begins");
    fill_session(&service, &session_id);

    let error = service
        .submit_inspection(&session_id, eval_date())
        .expect_err("first persist fails");
    assert!(matches!(error, InspectionServiceError::Persistence(_)));

    // The session stays frozen; nothing reached the store yet.
    let session = service.session(&session_id).expect("session kept");
    assert_eq!(session.status, SessionStatus::Submitted);
    assert!(store.inner.submissions.lock().expect("mutex").is_empty());

    // Retrying re-runs the pure engine and lands the identical pair.
    let score = service
        .submit_inspection(&session_id, eval_date())
        .expect("retry succeeds");
    let submissions = store.inner.submissions.lock().expect("mutex");
    assert_eq!(submissions.len(), 1);
    assert_eq!(&submissions[0].1, &score);
}

#[test]
fn abandon_drops_unsubmitted_sessions_only() {
    let (service, store) = build_service();
    let session_id = service.begin_inspection(driver(), org()).expect("begins");

    assert!(service.abandon(&session_id));
    assert!(service.session(&session_id).is_none());
    assert!(store.submissions.lock().expect("mutex").is_empty());

    let submitted_id = service.begin_inspection(driver(), org()).expect("begins");
    fill_session(&service, &submitted_id);
    service
        .submit_inspection(&submitted_id, eval_date())
        .expect("submits");

    assert!(!service.abandon(&submitted_id));
    assert!(service.session(&submitted_id).is_some());
}

#[test]
fn compute_driver_risk_upserts_the_daily_record() {
    let (service, store) = build_service();

    let first = service
        .compute_driver_risk(
            driver(),
            org(),
            eval_date(),
            RiskInputs {
                vehicle_check_score: 90,
                safety_score: 90,
                documentation_score: 90,
                incident_count: 0,
            },
        )
        .expect("aggregates");
    assert_eq!(first.overall_score, 90);

    // A later computation for the same day fully replaces the first.
    let second = service
        .compute_driver_risk(
            driver(),
            org(),
            eval_date(),
            RiskInputs {
                vehicle_check_score: 60,
                safety_score: 60,
                documentation_score: 60,
                incident_count: 1,
            },
        )
        .expect("aggregates");
    assert_eq!(second.overall_score, 55);

    let scores = store.driver_scores.lock().expect("mutex");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0], second);
}
