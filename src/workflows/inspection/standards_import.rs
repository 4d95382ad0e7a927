use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::domain::OrganizationId;
use super::standards::{ComplianceStandard, StandardSeverity};

#[derive(Debug)]
pub enum StandardsImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for StandardsImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StandardsImportError::Io(err) => {
                write!(f, "failed to read standards export: {}", err)
            }
            StandardsImportError::Csv(err) => write!(f, "invalid standards CSV data: {}", err),
            StandardsImportError::InvalidRow { line, reason } => {
                write!(f, "rejected standards row {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for StandardsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StandardsImportError::Io(err) => Some(err),
            StandardsImportError::Csv(err) => Some(err),
            StandardsImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for StandardsImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for StandardsImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct StandardRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Requirement")]
    requirement: String,
    #[serde(rename = "Severity")]
    severity: String,
    #[serde(rename = "Points Deduction")]
    points_deduction: String,
    #[serde(rename = "Mandatory", default, deserialize_with = "empty_string_as_none")]
    mandatory: Option<String>,
    #[serde(
        rename = "Regulation Reference",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    regulation_ref: Option<String>,
    #[serde(
        rename = "Organization",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    organization: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("true") | Some("yes") | Some("1")
    )
}

/// Importer for the admin console's standards CSV export. A blank
/// `Organization` column marks a global default.
pub struct StandardsCsvImporter;

impl StandardsCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<ComplianceStandard>, StandardsImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(
        reader: impl Read,
    ) -> Result<Vec<ComplianceStandard>, StandardsImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut standards = Vec::new();

        for (index, result) in csv_reader.deserialize::<StandardRow>().enumerate() {
            let row = result?;
            // Header occupies line 1.
            let line = index as u64 + 2;
            standards.push(Self::standard_from_row(row, line, standards.len())?);
        }

        Ok(standards)
    }

    fn standard_from_row(
        row: StandardRow,
        line: u64,
        ordinal: usize,
    ) -> Result<ComplianceStandard, StandardsImportError> {
        if row.category.trim().is_empty() {
            return Err(StandardsImportError::InvalidRow {
                line,
                reason: "category must not be empty".to_string(),
            });
        }
        if row.requirement.trim().is_empty() {
            return Err(StandardsImportError::InvalidRow {
                line,
                reason: "requirement must not be empty".to_string(),
            });
        }

        let severity = StandardSeverity::from_key(&row.severity).ok_or_else(|| {
            StandardsImportError::InvalidRow {
                line,
                reason: format!("unknown severity '{}'", row.severity),
            }
        })?;

        let points_deduction = row
            .points_deduction
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|points| *points > 0)
            .ok_or_else(|| StandardsImportError::InvalidRow {
                line,
                reason: format!(
                    "points deduction '{}' must be a positive integer",
                    row.points_deduction
                ),
            })?;

        Ok(ComplianceStandard {
            id: format!("std-{:04}", ordinal + 1),
            organization: row.organization.map(OrganizationId),
            category: row.category.trim().to_ascii_lowercase(),
            requirement: row.requirement.trim().to_string(),
            severity,
            points_deduction,
            mandatory: parse_bool(row.mandatory.as_deref()),
            regulation_ref: row.regulation_ref,
        })
    }
}
