//! Field validation shared by the capture form and the server.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{
    CreateEquipmentRequest, CreateInspectionRequest, CreateRoomRequest,
    CreateTemperatureReadingRequest, UpdateEquipmentRequest, UpdateInspectionRequest,
    UpdateRoomRequest, UpdateTemperatureReadingRequest,
};
use crate::status::ThresholdProfile;

pub const TEMPERATURE_MIN: f64 = -50.0;
pub const TEMPERATURE_MAX: f64 = 100.0;
pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Validation = Result<(), Vec<FieldError>>;

pub fn check_temperature(value: f64) -> Result<(), FieldError> {
    if !value.is_finite() {
        return Err(FieldError::new("temperature", "temperature must be a number"));
    }
    if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&value) {
        return Err(FieldError::new(
            "temperature",
            format!("temperature must be between {TEMPERATURE_MIN} and {TEMPERATURE_MAX} °C"),
        ));
    }

    Ok(())
}

pub fn check_humidity(value: f64) -> Result<(), FieldError> {
    if !value.is_finite() {
        return Err(FieldError::new("humidity", "humidity must be a number"));
    }
    if !(HUMIDITY_MIN..=HUMIDITY_MAX).contains(&value) {
        return Err(FieldError::new(
            "humidity",
            format!("humidity must be between {HUMIDITY_MIN} and {HUMIDITY_MAX} %"),
        ));
    }

    Ok(())
}

fn check_humidity_field(humidity: Option<f64>, allowed: bool) -> Option<FieldError> {
    match humidity {
        Some(_) if !allowed => Some(FieldError::new(
            "humidity",
            "humidity is not recorded for this entity",
        )),
        Some(value) => check_humidity(value).err(),
        None => None,
    }
}

/// Manual timestamps are stored at whole-second precision, so a fractional one could
/// not be returned exactly.
fn check_manual_time(field: &str, value: Option<OffsetDateTime>) -> Option<FieldError> {
    value
        .filter(|value| value.nanosecond() != 0)
        .map(|_| FieldError::new(field, format!("{field} must be given in whole seconds")))
}

fn check_required_text(field: &str, value: &str) -> Option<FieldError> {
    value
        .trim()
        .is_empty()
        .then(|| FieldError::new(field, format!("{field} must not be empty")))
}

fn check_profile(profile: Option<&ThresholdProfile>) -> Option<FieldError> {
    match profile {
        Some(profile) if !profile.is_well_formed() => Some(FieldError::new(
            "threshold_profile",
            "warning band must enclose an ordered normal band",
        )),
        _ => None,
    }
}

fn collect(errors: impl IntoIterator<Item = Option<FieldError>>) -> Validation {
    let errors: Vec<FieldError> = errors.into_iter().flatten().collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl CreateTemperatureReadingRequest {
    /// `humidity_allowed` is true for rooms and false for equipment.
    pub fn validate(&self, humidity_allowed: bool) -> Validation {
        collect([
            check_temperature(self.temperature).err(),
            check_humidity_field(self.humidity, humidity_allowed),
            check_manual_time("recorded_at", self.recorded_at),
        ])
    }
}

impl UpdateTemperatureReadingRequest {
    pub fn validate(&self, humidity_allowed: bool) -> Validation {
        collect([
            self.temperature.and_then(|value| check_temperature(value).err()),
            check_humidity_field(self.humidity, humidity_allowed),
            check_manual_time("recorded_at", self.recorded_at),
        ])
    }
}

impl CreateInspectionRequest {
    pub fn validate(&self) -> Validation {
        collect([check_manual_time("inspected_at", self.inspected_at)])
    }
}

impl UpdateInspectionRequest {
    pub fn validate(&self) -> Validation {
        collect([check_manual_time("inspected_at", self.inspected_at)])
    }
}

impl CreateRoomRequest {
    pub fn validate(&self) -> Validation {
        collect([
            check_required_text("name", &self.name),
            check_required_text("barcode", &self.barcode),
            check_profile(self.threshold_profile.as_ref()),
        ])
    }
}

impl UpdateRoomRequest {
    pub fn validate(&self) -> Validation {
        collect([
            self.name.as_deref().and_then(|name| check_required_text("name", name)),
            self.barcode
                .as_deref()
                .and_then(|barcode| check_required_text("barcode", barcode)),
            check_profile(self.threshold_profile.as_ref()),
        ])
    }
}

impl CreateEquipmentRequest {
    pub fn validate(&self) -> Validation {
        collect([
            check_required_text("name", &self.name),
            check_required_text("barcode", &self.barcode),
            check_profile(self.threshold_profile.as_ref()),
        ])
    }
}

impl UpdateEquipmentRequest {
    pub fn validate(&self) -> Validation {
        collect([
            self.name.as_deref().and_then(|name| check_required_text("name", name)),
            self.barcode
                .as_deref()
                .and_then(|barcode| check_required_text("barcode", barcode)),
            check_profile(self.threshold_profile.as_ref()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn reading(temperature: f64, humidity: Option<f64>) -> CreateTemperatureReadingRequest {
        CreateTemperatureReadingRequest {
            temperature,
            humidity,
            recorded_at: None,
        }
    }

    #[test]
    fn test_temperature_range() {
        assert!(reading(-50.0, None).validate(true).is_ok());
        assert!(reading(100.0, None).validate(true).is_ok());

        let errors = reading(-50.5, None).validate(true).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "temperature");

        assert!(reading(150.0, None).validate(true).is_err());
        assert!(reading(f64::NAN, None).validate(true).is_err());
    }

    #[test]
    fn test_humidity_reported_per_field() {
        let errors = reading(500.0, Some(120.0)).validate(true).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["temperature", "humidity"]);

        assert!(reading(21.0, Some(0.0)).validate(true).is_ok());
        assert!(reading(21.0, Some(-1.0)).validate(true).is_err());
    }

    #[test]
    fn test_humidity_rejected_for_equipment() {
        let errors = reading(4.0, Some(40.0)).validate(false).unwrap_err();
        assert_eq!(errors[0].field, "humidity");
        assert!(reading(4.0, None).validate(false).is_ok());
    }

    #[test]
    fn test_manual_time_must_be_whole_seconds() {
        let request = CreateTemperatureReadingRequest {
            recorded_at: Some(datetime!(2024-05-01 10:30:15.250 UTC)),
            ..reading(21.0, None)
        };
        let errors = request.validate(true).unwrap_err();
        assert_eq!(errors[0].field, "recorded_at");

        let request = CreateTemperatureReadingRequest {
            recorded_at: Some(datetime!(2024-05-01 17:30:15 +07:00)),
            ..reading(21.0, None)
        };
        assert!(request.validate(true).is_ok());

        let update = UpdateInspectionRequest {
            inspected_at: Some(datetime!(2024-05-01 10:30:15.000001 UTC)),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err()[0].field, "inspected_at");
    }

    #[test]
    fn test_room_request_requires_name_and_barcode() {
        let request = CreateRoomRequest {
            name: " ".to_string(),
            location: String::new(),
            barcode: String::new(),
            threshold_profile: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_malformed_custom_profile_rejected() {
        let request = UpdateEquipmentRequest {
            threshold_profile: Some(ThresholdProfile::Custom {
                normal_min: 8.0,
                normal_max: 2.0,
                warning_min: 0.0,
                warning_max: 10.0,
            }),
            ..Default::default()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].field, "threshold_profile");
    }
}
