use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ComplianceStatus, DriverComplianceScore, DriverId, OrganizationId};
use super::scoring;

/// Points removed from the overall score per tracked incident.
pub const INCIDENT_PENALTY: i32 = 5;

/// Component scores fed into the daily driver rollup. Safety,
/// documentation, and incident counts are tracked by other subsystems and
/// arrive here already computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub vehicle_check_score: u8,
    pub safety_score: u8,
    pub documentation_score: u8,
    pub incident_count: u32,
}

/// Roll one day's component scores into a `DriverComplianceScore`.
///
/// Overall = mean of the three components minus a fixed penalty per
/// incident, clamped to 0..=100. The risk level reuses the inspection
/// engine's bands; only the label changes at the record boundary.
pub fn aggregate(
    driver: DriverId,
    organization: OrganizationId,
    score_date: NaiveDate,
    inputs: RiskInputs,
) -> DriverComplianceScore {
    let component_sum = i32::from(inputs.vehicle_check_score)
        + i32::from(inputs.safety_score)
        + i32::from(inputs.documentation_score);
    let mean = component_sum / 3;

    let penalty = INCIDENT_PENALTY.saturating_mul(inputs.incident_count.min(100) as i32);
    let overall = (mean - penalty).clamp(0, 100) as u8;

    let risk_level = scoring::classify(overall);
    let notes = summarize(overall, risk_level, inputs);

    DriverComplianceScore {
        driver,
        organization,
        score_date,
        overall_score: overall,
        vehicle_check_score: inputs.vehicle_check_score,
        safety_score: inputs.safety_score,
        documentation_score: inputs.documentation_score,
        incident_count: inputs.incident_count,
        risk_level,
        notes,
    }
}

fn summarize(overall: u8, risk_level: ComplianceStatus, inputs: RiskInputs) -> String {
    format!(
        "overall {} ({} risk): vehicle check {}, safety {}, documentation {}, {} incident(s)",
        overall,
        risk_level.risk_label(),
        inputs.vehicle_check_score,
        inputs.safety_score,
        inputs.documentation_score,
        inputs.incident_count
    )
}
