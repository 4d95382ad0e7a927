use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use super::catalog::{ConditionRating, VehicleAspect};
use super::domain::{ComplianceScoreResult, ComplianceStatus, ConditionObservation};
use super::standards::StandardsRegistry;

/// Deduction applied when a violation has no matching standard.
pub const DEFAULT_VIOLATION_DEDUCTION: i32 = 15;
/// Deduction for an advisory `fair` rating. No standards lookup is made.
pub const FAIR_DEDUCTION: i32 = 5;
/// Deduction per reported free-text issue; duplicates each count.
pub const REPORTED_ISSUE_DEDUCTION: i32 = 10;

const STARTING_SCORE: i32 = 100;

/// Convert a frozen observation set into a compliance score.
///
/// Pure and deterministic: identical inputs (including `evaluation_date`)
/// produce identical output. The running total is signed and only clamped
/// once at the end, so heavy deductions keep accumulating through zero.
pub fn score(
    observations: &BTreeMap<VehicleAspect, ConditionObservation>,
    issues_reported: &[String],
    registry: &StandardsRegistry,
    evaluation_date: NaiveDate,
) -> ComplianceScoreResult {
    let mut total = STARTING_SCORE;
    let mut notes = Vec::new();

    for aspect in VehicleAspect::primary() {
        let Some(observation) = observations.get(&aspect) else {
            continue;
        };

        match observation.rating {
            ConditionRating::Good => {}
            ConditionRating::Fair => {
                total -= FAIR_DEDUCTION;
                notes.push(format!(
                    "{} condition is fair - monitor closely",
                    aspect.label()
                ));
            }
            ConditionRating::Poor | ConditionRating::Defective => {
                match registry.lookup(aspect) {
                    Some(standard) => {
                        total -= i32::from(standard.points_deduction);
                        let reference = standard
                            .regulation_ref
                            .as_deref()
                            .unwrap_or("Compliance violation");
                        notes.push(format!(
                            "{} condition is poor - {}",
                            aspect.label(),
                            reference
                        ));
                    }
                    None => {
                        total -= DEFAULT_VIOLATION_DEDUCTION;
                        notes.push(format!(
                            "{} condition is poor - requires immediate attention",
                            aspect.label()
                        ));
                    }
                }
            }
        }
    }

    for issue in issues_reported {
        total -= REPORTED_ISSUE_DEDUCTION;
        notes.push(format!("Reported issue: {issue}"));
    }

    let score = total.clamp(0, STARTING_SCORE) as u8;
    let status = classify(score);

    ComplianceScoreResult {
        score,
        status,
        regulatory_notes: notes,
        next_due: evaluation_date + Duration::days(reinspection_offset_days(status)),
    }
}

/// Non-overlapping bands, inclusive on the lower bound.
pub fn classify(score: u8) -> ComplianceStatus {
    match score {
        90..=u8::MAX => ComplianceStatus::Compliant,
        70..=89 => ComplianceStatus::Warning,
        50..=69 => ComplianceStatus::NonCompliant,
        _ => ComplianceStatus::Critical,
    }
}

/// Days until the next inspection is due, keyed to the resulting status.
pub const fn reinspection_offset_days(status: ComplianceStatus) -> i64 {
    match status {
        ComplianceStatus::Critical => 1,
        ComplianceStatus::NonCompliant => 3,
        ComplianceStatus::Warning => 7,
        ComplianceStatus::Compliant => 30,
    }
}
