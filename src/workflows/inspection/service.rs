use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{info, warn};

use super::catalog::{ConditionRating, VehicleAspect};
use super::domain::{
    ComplianceScoreResult, DriverComplianceScore, DriverId, InspectionSession,
    MaintenancePriority, OrganizationId, SessionId, SessionStatus, VehicleId,
};
use super::repository::{
    DirectoryError, InspectionStore, PersistenceError, StandardsError, StandardsStore,
    VehicleDirectory,
};
use super::risk::{self, RiskInputs};
use super::session::SessionError;
use super::standards::StandardsRegistry;

/// Facade composing the fleet directory, standards store, and persistence
/// boundary around the session state machine and scoring engine.
///
/// Sessions live in-process under a single-owner model: one driver holds one
/// in-progress session, field writes overwrite, and nothing reaches the
/// store until submission.
pub struct InspectionService<D, S, P> {
    vehicles: Arc<D>,
    standards: Arc<S>,
    store: Arc<P>,
    sessions: Mutex<HashMap<SessionId, InspectionSession>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("insp-{id:06}"))
}

impl<D, S, P> InspectionService<D, S, P>
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    pub fn new(vehicles: Arc<D>, standards: Arc<S>, store: Arc<P>) -> Self {
        Self {
            vehicles,
            standards,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a draft session. Rejected when the fleet has no active vehicles;
    /// the caller can retry after the fleet changes.
    pub fn begin_inspection(
        &self,
        driver: DriverId,
        organization: OrganizationId,
    ) -> Result<SessionId, InspectionServiceError> {
        let fleet = self.vehicles.active_vehicles(&organization)?;
        if fleet.is_empty() {
            return Err(InspectionServiceError::NoVehicleAvailable);
        }

        let id = next_session_id();
        let session = InspectionSession::begin(id.clone(), driver, organization);

        let mut sessions = self.sessions.lock().expect("session map poisoned");
        sessions.insert(id.clone(), session);

        info!(session = %id.0, "inspection session opened");
        Ok(id)
    }

    fn with_session<T>(
        &self,
        id: &SessionId,
        apply: impl FnOnce(&mut InspectionSession) -> Result<T, SessionError>,
    ) -> Result<T, InspectionServiceError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| InspectionServiceError::SessionNotFound(id.clone()))?;
        apply(session).map_err(InspectionServiceError::Session)
    }

    pub fn select_vehicle(
        &self,
        id: &SessionId,
        vehicle: VehicleId,
    ) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.select_vehicle(vehicle))
    }

    pub fn set_observation(
        &self,
        id: &SessionId,
        aspect: VehicleAspect,
        rating: ConditionRating,
        note: Option<String>,
    ) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.set_observation(aspect, rating, note))
    }

    pub fn set_mileage(&self, id: &SessionId, mileage: u32) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.set_mileage(mileage))
    }

    pub fn set_fuel_level(
        &self,
        id: &SessionId,
        percent: u8,
    ) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.set_fuel_level(percent))
    }

    pub fn report_issue(
        &self,
        id: &SessionId,
        issue: impl Into<String>,
    ) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.report_issue(issue))
    }

    pub fn set_maintenance(
        &self,
        id: &SessionId,
        requires: bool,
        priority: MaintenancePriority,
    ) -> Result<(), InspectionServiceError> {
        self.with_session(id, |session| session.set_maintenance(requires, priority))
    }

    /// Drop an unsubmitted session with no side effects.
    pub fn abandon(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        match sessions.get(id) {
            Some(session) if session.status != SessionStatus::Submitted => {
                sessions.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Validate, freeze, score, and persist the session with its score as
    /// one unit. If persistence fails the session stays submitted and this
    /// call is safely retryable, since scoring is pure.
    pub fn submit_inspection(
        &self,
        id: &SessionId,
        evaluation_date: NaiveDate,
    ) -> Result<ComplianceScoreResult, InspectionServiceError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| InspectionServiceError::SessionNotFound(id.clone()))?;

        let fetched = self.standards.standards(&session.organization)?;
        let registry = StandardsRegistry::new(&session.organization, fetched);

        // A session left submitted by an earlier failed persist is re-scored
        // rather than rejected, so the caller can retry until the store
        // accepts the pair.
        let score = if session.status == SessionStatus::Submitted {
            session.score_frozen(&registry, evaluation_date)
        } else {
            session
                .submit(&registry, evaluation_date)
                .map_err(InspectionServiceError::Session)?
        };

        if let Err(err) = self.store.save_submission(session, &score) {
            warn!(session = %id.0, error = %err, "submission persisted neither session nor score; retry");
            return Err(InspectionServiceError::Persistence(err));
        }

        info!(
            session = %id.0,
            score = score.score,
            status = score.status.label(),
            "inspection submitted"
        );
        Ok(score)
    }

    /// Read-only view of a session, for status endpoints and tests.
    pub fn session(&self, id: &SessionId) -> Option<InspectionSession> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        sessions.get(id).cloned()
    }

    /// Aggregate one day's component scores and upsert the rollup record.
    pub fn compute_driver_risk(
        &self,
        driver: DriverId,
        organization: OrganizationId,
        score_date: NaiveDate,
        inputs: RiskInputs,
    ) -> Result<DriverComplianceScore, InspectionServiceError> {
        let record = risk::aggregate(driver, organization, score_date, inputs);
        self.store.upsert_driver_score(&record)?;
        Ok(record)
    }
}

/// Error raised by the inspection service facade.
#[derive(Debug, thiserror::Error)]
pub enum InspectionServiceError {
    #[error("no active vehicle available for inspection")]
    NoVehicleAvailable,
    #[error("inspection session '{}' not found", .0 .0)]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Session(SessionError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Standards(#[from] StandardsError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
