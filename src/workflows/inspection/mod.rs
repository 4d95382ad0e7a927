//! Vehicle inspection sessions, compliance scoring, and driver risk rollups.
//!
//! The scoring engine is a pure function over a frozen observation set plus
//! the organization's compliance standards; everything stateful lives in the
//! session state machine and the service facade around the collaborator
//! traits.

pub mod catalog;
pub mod domain;
pub mod repository;
pub mod risk;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod session;
pub mod standards;
pub mod standards_import;

#[cfg(test)]
mod tests;

pub use catalog::{ConditionRating, VehicleAspect};
pub use domain::{
    ComplianceScoreResult, ComplianceStatus, ConditionObservation, DriverComplianceScore,
    DriverId, InspectionSession, MaintenancePriority, OrganizationId, SessionId, SessionStatus,
    Vehicle, VehicleId,
};
pub use repository::{
    DirectoryError, InspectionStore, PersistenceError, StandardsError, StandardsStore,
    VehicleDirectory,
};
pub use risk::RiskInputs;
pub use router::inspection_router;
pub use service::{InspectionService, InspectionServiceError};
pub use session::{MissingField, SessionError};
pub use standards::{ComplianceStandard, StandardSeverity, StandardsRegistry};
pub use standards_import::{StandardsCsvImporter, StandardsImportError};
