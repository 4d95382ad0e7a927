use serde::{Deserialize, Serialize};

use super::catalog::VehicleAspect;
use super::domain::OrganizationId;

/// Severity assigned by administrators when authoring a standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StandardSeverity {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Administrator-authored deduction rule. Read-only to the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceStandard {
    pub id: String,
    /// `None` marks a global default applying to every organization.
    pub organization: Option<OrganizationId>,
    pub category: String,
    pub requirement: String,
    pub severity: StandardSeverity,
    pub points_deduction: u8,
    pub mandatory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulation_ref: Option<String>,
}

impl ComplianceStandard {
    /// Fuzzy match policy: category equality plus a case-insensitive
    /// substring match in either direction between the requirement name and
    /// the aspect key. Deliberately loose so admins can write "brake pads"
    /// or "tires" and still hit the right aspect.
    fn matches(&self, aspect: VehicleAspect) -> bool {
        if !self.category.eq_ignore_ascii_case(aspect.category()) {
            return false;
        }

        let requirement = self.requirement.to_ascii_lowercase();
        let key = aspect.key();
        requirement.contains(key) || key.contains(requirement.trim())
    }
}

/// View over the standards fetched for one scoring call. Org-scoped entries
/// take precedence over global defaults; within a scope the first match in
/// list order wins, so ambiguity is resolved by ordering rather than error.
#[derive(Debug, Clone, Default)]
pub struct StandardsRegistry {
    scoped: Vec<ComplianceStandard>,
    global: Vec<ComplianceStandard>,
}

impl StandardsRegistry {
    pub fn new(organization: &OrganizationId, standards: Vec<ComplianceStandard>) -> Self {
        let mut scoped = Vec::new();
        let mut global = Vec::new();

        for standard in standards {
            match &standard.organization {
                Some(owner) if owner == organization => scoped.push(standard),
                Some(_) => {}
                None => global.push(standard),
            }
        }

        Self { scoped, global }
    }

    pub fn lookup(&self, aspect: VehicleAspect) -> Option<&ComplianceStandard> {
        self.scoped
            .iter()
            .find(|standard| standard.matches(aspect))
            .or_else(|| self.global.iter().find(|standard| standard.matches(aspect)))
    }

    pub fn is_empty(&self) -> bool {
        self.scoped.is_empty() && self.global.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scoped.len() + self.global.len()
    }
}
