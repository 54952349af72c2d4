//! Qualitative status of a temperature value.
//!
//! Every profile defines two closed bands, `normal ⊆ warning`. A value inside the normal
//! band is [`Status::Normal`], inside the warning band but outside normal is
//! [`Status::Warning`], and anything else (including non-finite values) is
//! [`Status::Critical`]. The three outcomes therefore partition the real line.

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Status {
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Status::Normal)
    }
}

/// Closed interval `[min, max]` in Celsius.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn encloses(&self, other: &Band) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThresholdProfile {
    /// General laboratory room.
    #[default]
    Standard,
    ColdStorage,
    Incubator,
    Freezer,
    Refrigerator,
    Custom {
        normal_min: f64,
        normal_max: f64,
        warning_min: f64,
        warning_max: f64,
    },
}

impl ThresholdProfile {
    /// Returns the `(normal, warning)` bands.
    pub fn bands(&self) -> (Band, Band) {
        match *self {
            ThresholdProfile::Standard => (Band::new(18.0, 26.0), Band::new(15.0, 30.0)),
            ThresholdProfile::ColdStorage => (Band::new(2.0, 6.0), Band::new(0.0, 8.0)),
            ThresholdProfile::Incubator => (Band::new(36.0, 38.0), Band::new(35.0, 39.0)),
            ThresholdProfile::Freezer => (Band::new(-25.0, -15.0), Band::new(-30.0, -10.0)),
            ThresholdProfile::Refrigerator => (Band::new(2.0, 8.0), Band::new(0.0, 10.0)),
            ThresholdProfile::Custom {
                normal_min,
                normal_max,
                warning_min,
                warning_max,
            } => (
                Band::new(normal_min, normal_max),
                Band::new(warning_min, warning_max),
            ),
        }
    }

    /// Guesses a profile from a display name.
    ///
    /// Only used for entities without an explicit profile. Renaming such an entity can
    /// change how its readings are classified.
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("freezer") {
            ThresholdProfile::Freezer
        } else if ["refrigerator", "fridge", "kulkas"]
            .iter()
            .any(|hint| name.contains(hint))
        {
            ThresholdProfile::Refrigerator
        } else if name.contains("cold") {
            ThresholdProfile::ColdStorage
        } else if name.contains("incubator") || name.contains("inkubator") {
            ThresholdProfile::Incubator
        } else {
            ThresholdProfile::Standard
        }
    }

    /// Bands must be finite, ordered, and the warning band must enclose the normal band.
    pub fn is_well_formed(&self) -> bool {
        let (normal, warning) = self.bands();

        [normal.min, normal.max, warning.min, warning.max]
            .iter()
            .all(|bound| bound.is_finite())
            && normal.min <= normal.max
            && warning.encloses(&normal)
    }

    pub fn classify(&self, value: f64) -> Status {
        let (normal, warning) = self.bands();

        if normal.contains(value) {
            Status::Normal
        } else if warning.contains(value) {
            Status::Warning
        } else {
            Status::Critical
        }
    }
}

/// Classifies `value` for an entity, preferring its explicit profile over its name.
pub fn classify(value: f64, profile: Option<ThresholdProfile>, name: &str) -> Status {
    profile
        .unwrap_or_else(|| ThresholdProfile::infer_from_name(name))
        .classify(value)
}
