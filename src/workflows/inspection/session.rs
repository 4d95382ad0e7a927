use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::catalog::{ConditionRating, VehicleAspect};
use super::domain::{
    ComplianceScoreResult, ConditionObservation, DriverId, InspectionSession, MaintenancePriority,
    OrganizationId, SessionId, SessionStatus, VehicleId,
};
use super::scoring;
use super::standards::StandardsRegistry;

/// Fields that gate submission. Reported back verbatim so the driver sees
/// exactly which steps are outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Vehicle,
    Mileage,
    FuelLevel,
    Aspect(VehicleAspect),
}

impl MissingField {
    pub fn describe(self) -> String {
        match self {
            MissingField::Vehicle => "vehicle selection".to_string(),
            MissingField::Mileage => "mileage".to_string(),
            MissingField::FuelLevel => "fuel level".to_string(),
            MissingField::Aspect(aspect) => format!("{} condition", aspect.label()),
        }
    }
}

/// Errors raised by session mutators and submission.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is submitted and read-only")]
    AlreadySubmitted,
    #[error("a vehicle must be selected before recording observations")]
    VehicleNotSelected,
    #[error("submission blocked; missing: {}", describe_missing(.0))]
    Incomplete(Vec<MissingField>),
    #[error("unknown vehicle aspect '{0}'")]
    UnknownAspect(String),
    #[error("invalid fuel level {0}; expected a percentage 0-100")]
    InvalidFuelLevel(u8),
}

fn describe_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|field| field.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

impl InspectionSession {
    /// Open a fresh draft owned by `driver`. No fleet lookup happens here;
    /// the service enforces the active-vehicle precondition.
    pub fn begin(id: SessionId, driver: DriverId, organization: OrganizationId) -> Self {
        Self {
            id,
            driver,
            organization,
            vehicle: None,
            status: SessionStatus::Draft,
            observations: BTreeMap::new(),
            mileage: None,
            fuel_level: None,
            issues_reported: Vec::new(),
            requires_maintenance: false,
            maintenance_priority: MaintenancePriority::Low,
        }
    }

    fn guard_mutable(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
            SessionStatus::Draft | SessionStatus::InProgress => Ok(()),
        }
    }

    fn guard_in_progress(&self) -> Result<(), SessionError> {
        self.guard_mutable()?;
        match self.status {
            SessionStatus::Draft => Err(SessionError::VehicleNotSelected),
            _ => Ok(()),
        }
    }

    /// `Draft -> InProgress`. Re-selecting while in progress just swaps the
    /// vehicle; the rest of the session is untouched.
    pub fn select_vehicle(&mut self, vehicle: VehicleId) -> Result<(), SessionError> {
        self.guard_mutable()?;
        self.vehicle = Some(vehicle);
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Upsert one aspect's condition. Steps may be revisited any number of
    /// times before submission.
    pub fn set_observation(
        &mut self,
        aspect: VehicleAspect,
        rating: ConditionRating,
        note: Option<String>,
    ) -> Result<(), SessionError> {
        self.guard_in_progress()?;
        self.observations.insert(
            aspect,
            ConditionObservation {
                aspect,
                rating,
                note,
            },
        );
        Ok(())
    }

    pub fn set_mileage(&mut self, mileage: u32) -> Result<(), SessionError> {
        self.guard_in_progress()?;
        self.mileage = Some(mileage);
        Ok(())
    }

    pub fn set_fuel_level(&mut self, percent: u8) -> Result<(), SessionError> {
        self.guard_in_progress()?;
        if percent > 100 {
            return Err(SessionError::InvalidFuelLevel(percent));
        }
        self.fuel_level = Some(percent);
        Ok(())
    }

    /// Append a free-text issue. Duplicates are kept; each one deducts at
    /// scoring time.
    pub fn report_issue(&mut self, issue: impl Into<String>) -> Result<(), SessionError> {
        self.guard_in_progress()?;
        self.issues_reported.push(issue.into());
        Ok(())
    }

    pub fn set_maintenance(
        &mut self,
        requires: bool,
        priority: MaintenancePriority,
    ) -> Result<(), SessionError> {
        self.guard_in_progress()?;
        self.requires_maintenance = requires;
        self.maintenance_priority = priority;
        Ok(())
    }

    /// Everything still blocking submission, in a stable display order:
    /// vehicle, mileage, fuel, then unset primary aspects in catalog order.
    /// Fluids and safety equipment are optional at submission time.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();

        if self.vehicle.is_none() {
            missing.push(MissingField::Vehicle);
        }
        if self.mileage.is_none() {
            missing.push(MissingField::Mileage);
        }
        if self.fuel_level.is_none() {
            missing.push(MissingField::FuelLevel);
        }
        for aspect in VehicleAspect::primary() {
            if !self.observations.contains_key(&aspect) {
                missing.push(MissingField::Aspect(aspect));
            }
        }

        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// `InProgress -> Submitted` (terminal), then score the frozen
    /// observation set. Validation failures leave the session untouched;
    /// a corrected inspection is a new session, never a mutation of an old
    /// submitted one.
    pub fn submit(
        &mut self,
        registry: &StandardsRegistry,
        evaluation_date: NaiveDate,
    ) -> Result<ComplianceScoreResult, SessionError> {
        self.guard_mutable()?;

        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SessionError::Incomplete(missing));
        }

        self.status = SessionStatus::Submitted;
        Ok(self.score_frozen(registry, evaluation_date))
    }

    /// Re-run the engine over an already-frozen observation set, e.g. when a
    /// persistence failure forces the caller to retry a submission. Scoring
    /// is pure, so identical inputs reproduce the identical result.
    pub fn score_frozen(
        &self,
        registry: &StandardsRegistry,
        evaluation_date: NaiveDate,
    ) -> ComplianceScoreResult {
        scoring::score(
            &self.observations,
            &self.issues_reported,
            registry,
            evaluation_date,
        )
    }
}
