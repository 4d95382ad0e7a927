use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{ConditionRating, VehicleAspect};

/// Identifier wrapper for inspection sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Fleet directory entry for vehicle selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub number: String,
    pub plate: String,
    pub make: String,
    pub model: String,
}

/// One recorded condition per inspectable aspect. Frozen once the owning
/// session is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionObservation {
    pub aspect: VehicleAspect,
    pub rating: ConditionRating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Submitted,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Aggregate for one driver's walkaround check. Owned by the driver who
/// created it until submission, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionSession {
    pub id: SessionId,
    pub driver: DriverId,
    pub organization: OrganizationId,
    pub vehicle: Option<VehicleId>,
    pub status: SessionStatus,
    pub observations: BTreeMap<VehicleAspect, ConditionObservation>,
    pub mileage: Option<u32>,
    /// Fuel level as a percentage of tank capacity.
    pub fuel_level: Option<u8>,
    pub issues_reported: Vec<String>,
    pub requires_maintenance: bool,
    pub maintenance_priority: MaintenancePriority,
}

/// Canonical four-band classification shared by inspection scoring and driver
/// risk. Display surfaces rename bands; no fifth category exists internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    NonCompliant,
    Critical,
}

impl ComplianceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::NonCompliant => "non_compliant",
            ComplianceStatus::Critical => "critical",
        }
    }

    /// Driver-risk naming for the same numeric bands.
    pub const fn risk_label(self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "low",
            ComplianceStatus::Warning => "medium",
            ComplianceStatus::NonCompliant => "high",
            ComplianceStatus::Critical => "critical",
        }
    }
}

/// Output of the scoring engine. Never edited, only recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceScoreResult {
    pub score: u8,
    pub status: ComplianceStatus,
    pub regulatory_notes: Vec<String>,
    pub next_due: NaiveDate,
}

/// Daily per-driver rollup persisted by the risk aggregator, keyed on
/// (driver, score_date) with last-write-wins upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverComplianceScore {
    pub driver: DriverId,
    pub organization: OrganizationId,
    pub score_date: NaiveDate,
    pub overall_score: u8,
    pub vehicle_check_score: u8,
    pub safety_score: u8,
    pub documentation_score: u8,
    pub incident_count: u32,
    pub risk_level: ComplianceStatus,
    pub notes: String,
}

impl DriverComplianceScore {
    pub fn risk_level_label(&self) -> &'static str {
        self.risk_level.risk_label()
    }
}
