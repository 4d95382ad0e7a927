use super::domain::{
    ComplianceScoreResult, DriverComplianceScore, InspectionSession, OrganizationId, Vehicle,
};
use super::standards::ComplianceStandard;

/// Fleet lookup consumed when a driver begins an inspection.
pub trait VehicleDirectory: Send + Sync {
    fn active_vehicles(&self, organization: &OrganizationId)
        -> Result<Vec<Vehicle>, DirectoryError>;
}

/// Source of truth for compliance standards. Fetched fresh on every scoring
/// call; the registry built from the result lives only for that call.
pub trait StandardsStore: Send + Sync {
    fn standards(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<ComplianceStandard>, StandardsError>;
}

/// Persistence boundary for submitted inspections and driver rollups.
pub trait InspectionStore: Send + Sync {
    /// Commit a submitted session and its score as one atomic unit. A reader
    /// must never observe one without the other.
    fn save_submission(
        &self,
        session: &InspectionSession,
        score: &ComplianceScoreResult,
    ) -> Result<(), PersistenceError>;

    /// Upsert keyed on (driver, score_date); a later write for the same day
    /// fully replaces the earlier record.
    fn upsert_driver_score(&self, score: &DriverComplianceScore) -> Result<(), PersistenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("vehicle directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("standards store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    #[error("write conflict: {0}")]
    Conflict(String),
}
