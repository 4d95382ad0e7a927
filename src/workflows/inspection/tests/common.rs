use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::inspection::catalog::{ConditionRating, VehicleAspect};
use crate::workflows::inspection::domain::{
    ComplianceScoreResult, ConditionObservation, DriverComplianceScore, DriverId,
    InspectionSession, OrganizationId, SessionId, Vehicle, VehicleId,
};
use crate::workflows::inspection::repository::{
    DirectoryError, InspectionStore, PersistenceError, StandardsError, StandardsStore,
    VehicleDirectory,
};
use crate::workflows::inspection::service::InspectionService;
use crate::workflows::inspection::standards::{
    ComplianceStandard, StandardSeverity, StandardsRegistry,
};

pub(super) fn org() -> OrganizationId {
    OrganizationId("org-001".to_string())
}

pub(super) fn driver() -> DriverId {
    DriverId("drv-042".to_string())
}

pub(super) fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date")
}

pub(super) fn bus() -> Vehicle {
    Vehicle {
        id: VehicleId("veh-101".to_string()),
        number: "101".to_string(),
        plate: "TRN-4821".to_string(),
        make: "Blue Bird".to_string(),
        model: "Vision".to_string(),
    }
}

pub(super) fn standard(
    id: &str,
    organization: Option<OrganizationId>,
    category: &str,
    requirement: &str,
    points: u8,
    regulation_ref: Option<&str>,
) -> ComplianceStandard {
    ComplianceStandard {
        id: id.to_string(),
        organization,
        category: category.to_string(),
        requirement: requirement.to_string(),
        severity: StandardSeverity::High,
        points_deduction: points,
        mandatory: true,
        regulation_ref: regulation_ref.map(str::to_string),
    }
}

/// One matching standard per primary aspect, all worth `points`.
pub(super) fn standards_for_all_primary(points: u8) -> Vec<ComplianceStandard> {
    VehicleAspect::primary()
        .into_iter()
        .enumerate()
        .map(|(index, aspect)| {
            standard(
                &format!("std-{index}"),
                None,
                aspect.category(),
                aspect.key(),
                points,
                Some("49 CFR 396.11"),
            )
        })
        .collect()
}

pub(super) fn registry(standards: Vec<ComplianceStandard>) -> StandardsRegistry {
    StandardsRegistry::new(&org(), standards)
}

pub(super) fn empty_registry() -> StandardsRegistry {
    registry(Vec::new())
}

pub(super) fn observation(
    aspect: VehicleAspect,
    rating: ConditionRating,
) -> (VehicleAspect, ConditionObservation) {
    (
        aspect,
        ConditionObservation {
            aspect,
            rating,
            note: None,
        },
    )
}

/// All six primary aspects at the given rating.
pub(super) fn uniform_observations(
    rating: ConditionRating,
) -> BTreeMap<VehicleAspect, ConditionObservation> {
    VehicleAspect::primary()
        .into_iter()
        .map(|aspect| observation(aspect, rating))
        .collect()
}

/// All good, then override the listed aspects.
pub(super) fn observations_with(
    overrides: &[(VehicleAspect, ConditionRating)],
) -> BTreeMap<VehicleAspect, ConditionObservation> {
    let mut map = uniform_observations(ConditionRating::Good);
    for (aspect, rating) in overrides {
        map.insert(*aspect, observation(*aspect, *rating).1);
    }
    map
}

/// Fully populated in-progress session ready to submit.
pub(super) fn complete_session() -> InspectionSession {
    let mut session = InspectionSession::begin(
        SessionId("insp-test".to_string()),
        driver(),
        org(),
    );
    session
        .select_vehicle(bus().id)
        .expect("draft accepts vehicle");
    session.set_mileage(52_300).expect("in progress");
    session.set_fuel_level(70).expect("in progress");
    for aspect in VehicleAspect::primary() {
        session
            .set_observation(aspect, ConditionRating::Good, None)
            .expect("in progress");
    }
    session
}

#[derive(Clone)]
pub(super) struct MemoryFleet {
    pub(super) vehicles: Vec<Vehicle>,
}

impl MemoryFleet {
    pub(super) fn with_bus() -> Self {
        Self {
            vehicles: vec![bus()],
        }
    }

    pub(super) fn empty() -> Self {
        Self {
            vehicles: Vec::new(),
        }
    }
}

impl VehicleDirectory for MemoryFleet {
    fn active_vehicles(
        &self,
        _organization: &OrganizationId,
    ) -> Result<Vec<Vehicle>, DirectoryError> {
        Ok(self.vehicles.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStandards {
    pub(super) standards: Vec<ComplianceStandard>,
}

impl StandardsStore for MemoryStandards {
    fn standards(
        &self,
        _organization: &OrganizationId,
    ) -> Result<Vec<ComplianceStandard>, StandardsError> {
        Ok(self.standards.clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) submissions: Mutex<Vec<(InspectionSession, ComplianceScoreResult)>>,
    pub(super) driver_scores: Mutex<Vec<DriverComplianceScore>>,
}

impl InspectionStore for MemoryStore {
    fn save_submission(
        &self,
        session: &InspectionSession,
        score: &ComplianceScoreResult,
    ) -> Result<(), PersistenceError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        guard.push((session.clone(), score.clone()));
        Ok(())
    }

    fn upsert_driver_score(&self, score: &DriverComplianceScore) -> Result<(), PersistenceError> {
        let mut guard = self.driver_scores.lock().expect("score mutex poisoned");
        guard.retain(|existing| {
            !(existing.driver == score.driver && existing.score_date == score.score_date)
        });
        guard.push(score.clone());
        Ok(())
    }
}

/// Store that rejects the first `failures` submissions, then delegates to an
/// inner `MemoryStore`. Exercises the retry-after-persistence-failure path.
pub(super) struct FlakyStore {
    remaining_failures: AtomicU32,
    pub(super) inner: MemoryStore,
}

impl FlakyStore {
    pub(super) fn failing(failures: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
            inner: MemoryStore::default(),
        }
    }
}

impl InspectionStore for FlakyStore {
    fn save_submission(
        &self,
        session: &InspectionSession,
        score: &ComplianceScoreResult,
    ) -> Result<(), PersistenceError> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PersistenceError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        self.inner.save_submission(session, score)
    }

    fn upsert_driver_score(&self, score: &DriverComplianceScore) -> Result<(), PersistenceError> {
        self.inner.upsert_driver_score(score)
    }
}

pub(super) fn build_service() -> (
    InspectionService<MemoryFleet, MemoryStandards, MemoryStore>,
    Arc<MemoryStore>,
) {
    build_service_with(MemoryFleet::with_bus(), MemoryStandards::default())
}

pub(super) fn build_service_with(
    fleet: MemoryFleet,
    standards: MemoryStandards,
) -> (
    InspectionService<MemoryFleet, MemoryStandards, MemoryStore>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let service = InspectionService::new(Arc::new(fleet), Arc::new(standards), store.clone());
    (service, store)
}

/// Drive a service-held session to the ready-to-submit state.
pub(super) fn fill_session<P: InspectionStore + 'static>(
    service: &InspectionService<MemoryFleet, MemoryStandards, P>,
    session_id: &SessionId,
) {
    service
        .select_vehicle(session_id, bus().id)
        .expect("vehicle selectable");
    service
        .set_mileage(session_id, 52_300)
        .expect("mileage settable");
    service
        .set_fuel_level(session_id, 70)
        .expect("fuel settable");
    for aspect in VehicleAspect::primary() {
        service
            .set_observation(session_id, aspect, ConditionRating::Good, None)
            .expect("observation settable");
    }
}
