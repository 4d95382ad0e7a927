use serde::{Deserialize, Serialize};

/// Inspectable vehicle aspects captured during a walkaround check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleAspect {
    Engine,
    Brakes,
    Tires,
    Lights,
    Interior,
    Exterior,
    Fluids,
    SafetyEquipment,
}

impl VehicleAspect {
    /// The six aspects that block submission and feed the scoring engine,
    /// in the order deductions are applied.
    pub const fn primary() -> [Self; 6] {
        [
            Self::Engine,
            Self::Brakes,
            Self::Tires,
            Self::Lights,
            Self::Interior,
            Self::Exterior,
        ]
    }

    pub const fn all() -> [Self; 8] {
        [
            Self::Engine,
            Self::Brakes,
            Self::Tires,
            Self::Lights,
            Self::Interior,
            Self::Exterior,
            Self::Fluids,
            Self::SafetyEquipment,
        ]
    }

    pub const fn is_primary(self) -> bool {
        !matches!(self, Self::Fluids | Self::SafetyEquipment)
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Brakes => "brakes",
            Self::Tires => "tires",
            Self::Lights => "lights",
            Self::Interior => "interior",
            Self::Exterior => "exterior",
            Self::Fluids => "fluids",
            Self::SafetyEquipment => "safety_equipment",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::Brakes => "Brakes",
            Self::Tires => "Tires",
            Self::Lights => "Lights",
            Self::Interior => "Interior",
            Self::Exterior => "Exterior",
            Self::Fluids => "Fluids",
            Self::SafetyEquipment => "Safety equipment",
        }
    }

    /// Standards are authored per category, not per aspect.
    pub const fn category(self) -> &'static str {
        match self {
            Self::Engine | Self::Brakes | Self::Fluids => "mechanical",
            Self::Tires | Self::Lights | Self::SafetyEquipment => "safety",
            Self::Interior | Self::Exterior => "visual",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|aspect| aspect.key() == key.trim().to_ascii_lowercase())
    }
}

/// Condition scale recorded per aspect. `Fair` is advisory; `Poor` and
/// `Defective` are violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionRating {
    Good,
    Fair,
    Poor,
    Defective,
}

impl ConditionRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Defective => "defective",
        }
    }

    pub const fn is_violation(self) -> bool {
        matches!(self, Self::Poor | Self::Defective)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            "defective" => Some(Self::Defective),
            _ => None,
        }
    }
}
