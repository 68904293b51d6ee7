//! Soil and weather samples
//!
//! `SampleForm` is what arrives from a form: every field optional, numbers
//! possibly still text. `SampleForm::parse` turns it into a `SoilWeatherSample`
//! for the active `FormVariant`, and `SoilWeatherSample::validate` enforces
//! the numeric constraints on an already-typed sample.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Fields
// ============================================================================

/// Every field a sample can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleField {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
    SoilType,
}

impl SampleField {
    pub const ALL: [SampleField; 8] = [
        SampleField::Nitrogen,
        SampleField::Phosphorus,
        SampleField::Potassium,
        SampleField::Temperature,
        SampleField::Humidity,
        SampleField::Ph,
        SampleField::Rainfall,
        SampleField::SoilType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SampleField::Nitrogen => "nitrogen",
            SampleField::Phosphorus => "phosphorus",
            SampleField::Potassium => "potassium",
            SampleField::Temperature => "temperature",
            SampleField::Humidity => "humidity",
            SampleField::Ph => "ph",
            SampleField::Rainfall => "rainfall",
            SampleField::SoilType => "soil_type",
        }
    }

    /// Form label shown on the recommend page
    pub fn label(self) -> &'static str {
        match self {
            SampleField::Nitrogen => "Nitrogen (N)",
            SampleField::Phosphorus => "Phosphorus (P)",
            SampleField::Potassium => "Potassium (K)",
            SampleField::Temperature => "Temperature (°C)",
            SampleField::Humidity => "Humidity (%)",
            SampleField::Ph => "Soil pH Level",
            SampleField::Rainfall => "Rainfall (mm)",
            SampleField::SoilType => "Soil Type",
        }
    }

    /// Inclusive lower bound and optional upper bound for numeric fields
    pub fn bounds(self) -> Option<(f64, Option<f64>)> {
        match self {
            SampleField::Nitrogen
            | SampleField::Phosphorus
            | SampleField::Potassium
            | SampleField::Rainfall => Some((0.0, None)),
            SampleField::Humidity => Some((0.0, Some(100.0))),
            SampleField::Ph => Some((0.0, Some(14.0))),
            SampleField::Temperature | SampleField::SoilType => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        self != SampleField::SoilType
    }
}

impl fmt::Display for SampleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "soilType" => Ok(SampleField::SoilType),
            name => SampleField::ALL
                .into_iter()
                .find(|f| f.as_str() == name)
                .ok_or_else(|| format!("unknown sample field '{}'", name)),
        }
    }
}

// ============================================================================
// Soil
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Sandy,
    Loamy,
    Clay,
    Silt,
    Peaty,
    Chalky,
}

impl SoilType {
    pub const ALL: [SoilType; 6] = [
        SoilType::Sandy,
        SoilType::Loamy,
        SoilType::Clay,
        SoilType::Silt,
        SoilType::Peaty,
        SoilType::Chalky,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SoilType::Sandy => "sandy",
            SoilType::Loamy => "loamy",
            SoilType::Clay => "clay",
            SoilType::Silt => "silt",
            SoilType::Peaty => "peaty",
            SoilType::Chalky => "chalky",
        }
    }
}

impl FromStr for SoilType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SoilType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown soil type '{}'", s))
    }
}

/// Soil description: measured nutrients, or a soil type in their place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SoilProfile {
    Nutrients {
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
    },
    Texture {
        soil_type: SoilType,
    },
}

/// Which fields a deployment's form asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
    #[default]
    Nutrients,
    SoilType,
}

impl FormVariant {
    /// Required fields in form order
    pub fn fields(self) -> &'static [SampleField] {
        match self {
            FormVariant::Nutrients => &[
                SampleField::Ph,
                SampleField::Nitrogen,
                SampleField::Phosphorus,
                SampleField::Potassium,
                SampleField::Temperature,
                SampleField::Humidity,
                SampleField::Rainfall,
            ],
            FormVariant::SoilType => &[
                SampleField::Ph,
                SampleField::SoilType,
                SampleField::Temperature,
                SampleField::Humidity,
                SampleField::Rainfall,
            ],
        }
    }
}

impl FromStr for FormVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nutrients" | "npk" => Ok(FormVariant::Nutrients),
            "soil_type" | "soiltype" => Ok(FormVariant::SoilType),
            other => Err(format!("unknown form variant '{}'", other)),
        }
    }
}

// ============================================================================
// Sample
// ============================================================================

/// One validated set of soil/weather measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilWeatherSample {
    #[serde(flatten)]
    pub soil: SoilProfile,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl SoilWeatherSample {
    #[allow(clippy::too_many_arguments)]
    pub fn with_nutrients(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            soil: SoilProfile::Nutrients {
                nitrogen,
                phosphorus,
                potassium,
            },
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    pub fn with_soil_type(
        soil_type: SoilType,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            soil: SoilProfile::Texture { soil_type },
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    pub fn variant(&self) -> FormVariant {
        match self.soil {
            SoilProfile::Nutrients { .. } => FormVariant::Nutrients,
            SoilProfile::Texture { .. } => FormVariant::SoilType,
        }
    }

    /// Numeric value of a field, `None` when this sample does not carry it
    pub fn value(&self, field: SampleField) -> Option<f64> {
        match (field, self.soil) {
            (SampleField::Nitrogen, SoilProfile::Nutrients { nitrogen, .. }) => Some(nitrogen),
            (SampleField::Phosphorus, SoilProfile::Nutrients { phosphorus, .. }) => {
                Some(phosphorus)
            }
            (SampleField::Potassium, SoilProfile::Nutrients { potassium, .. }) => Some(potassium),
            (SampleField::Temperature, _) => Some(self.temperature),
            (SampleField::Humidity, _) => Some(self.humidity),
            (SampleField::Ph, _) => Some(self.ph),
            (SampleField::Rainfall, _) => Some(self.rainfall),
            _ => None,
        }
    }

    pub fn soil_type(&self) -> Option<SoilType> {
        match self.soil {
            SoilProfile::Texture { soil_type } => Some(soil_type),
            SoilProfile::Nutrients { .. } => None,
        }
    }

    /// Check every numeric field is finite and inside its bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        for &field in self.variant().fields() {
            if let Some(value) = self.value(field) {
                check_value(field, value)?;
            }
        }
        Ok(())
    }

    /// `validate`, after checking the sample carries every field `variant` requires
    pub fn validate_for(&self, variant: FormVariant) -> Result<(), ValidationError> {
        for &field in variant.fields() {
            let present = match field {
                SampleField::SoilType => self.soil_type().is_some(),
                numeric => self.value(numeric).is_some(),
            };
            if !present {
                return Err(ValidationError::Missing { field });
            }
        }
        self.validate()
    }
}

fn check_value(field: SampleField, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            input: value.to_string(),
        });
    }

    match field.bounds() {
        Some((min, Some(max))) if value < min || value > max => {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
        Some((min, None)) if value < min => Err(ValidationError::Negative { field, value }),
        _ => Ok(()),
    }
}

// ============================================================================
// Raw form input
// ============================================================================

/// A single form value: a JSON number or the text typed into an input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldInput {
    fn from(value: f64) -> Self {
        FieldInput::Number(value)
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

/// Unvalidated form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleForm {
    pub nitrogen: Option<FieldInput>,
    pub phosphorus: Option<FieldInput>,
    pub potassium: Option<FieldInput>,
    pub temperature: Option<FieldInput>,
    pub humidity: Option<FieldInput>,
    pub ph: Option<FieldInput>,
    pub rainfall: Option<FieldInput>,
    #[serde(alias = "soilType")]
    pub soil_type: Option<String>,
}

impl SampleForm {
    /// Form pre-filled from an existing sample
    pub fn from_sample(sample: &SoilWeatherSample) -> Self {
        let num = |field| sample.value(field).map(FieldInput::Number);
        Self {
            nitrogen: num(SampleField::Nitrogen),
            phosphorus: num(SampleField::Phosphorus),
            potassium: num(SampleField::Potassium),
            temperature: num(SampleField::Temperature),
            humidity: num(SampleField::Humidity),
            ph: num(SampleField::Ph),
            rainfall: num(SampleField::Rainfall),
            soil_type: sample.soil_type().map(|t| t.as_str().to_string()),
        }
    }

    fn input(&self, field: SampleField) -> Option<&FieldInput> {
        match field {
            SampleField::Nitrogen => self.nitrogen.as_ref(),
            SampleField::Phosphorus => self.phosphorus.as_ref(),
            SampleField::Potassium => self.potassium.as_ref(),
            SampleField::Temperature => self.temperature.as_ref(),
            SampleField::Humidity => self.humidity.as_ref(),
            SampleField::Ph => self.ph.as_ref(),
            SampleField::Rainfall => self.rainfall.as_ref(),
            SampleField::SoilType => None,
        }
    }

    fn number(&self, field: SampleField) -> Result<f64, ValidationError> {
        let value = match self.input(field) {
            None => return Err(ValidationError::Missing { field }),
            Some(FieldInput::Number(n)) => *n,
            Some(FieldInput::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ValidationError::Missing { field });
                }
                match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => {
                        return Err(ValidationError::NotANumber {
                            field,
                            input: text.to_string(),
                        })
                    }
                }
            }
        };
        check_value(field, value)?;
        Ok(value)
    }

    fn soil(&self) -> Result<SoilType, ValidationError> {
        let field = SampleField::SoilType;
        match self.soil_type.as_deref().map(str::trim) {
            None | Some("") => Err(ValidationError::Missing { field }),
            Some(text) => text.parse().map_err(|_| ValidationError::UnknownSoilType {
                field,
                input: text.to_string(),
            }),
        }
    }

    /// Parse and validate the fields `variant` requires, in form order.
    /// Reports the first offending field.
    pub fn parse(&self, variant: FormVariant) -> Result<SoilWeatherSample, ValidationError> {
        for &field in variant.fields() {
            if field.is_numeric() {
                self.number(field)?;
            } else {
                self.soil()?;
            }
        }

        let temperature = self.number(SampleField::Temperature)?;
        let humidity = self.number(SampleField::Humidity)?;
        let ph = self.number(SampleField::Ph)?;
        let rainfall = self.number(SampleField::Rainfall)?;

        let sample = match variant {
            FormVariant::Nutrients => SoilWeatherSample::with_nutrients(
                self.number(SampleField::Nitrogen)?,
                self.number(SampleField::Phosphorus)?,
                self.number(SampleField::Potassium)?,
                temperature,
                humidity,
                ph,
                rainfall,
            ),
            FormVariant::SoilType => {
                let soil_type = self.soil()?;
                SoilWeatherSample::with_soil_type(soil_type, temperature, humidity, ph, rainfall)
            }
        };

        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_form() -> SampleForm {
        SampleForm {
            nitrogen: Some("90".into()),
            phosphorus: Some("42".into()),
            potassium: Some("43".into()),
            temperature: Some("20.8".into()),
            humidity: Some("82".into()),
            ph: Some("6.5".into()),
            rainfall: Some("202.9".into()),
            soil_type: None,
        }
    }

    #[test]
    fn test_parse_text_inputs() {
        let sample = example_form().parse(FormVariant::Nutrients).unwrap();
        assert_eq!(
            sample,
            SoilWeatherSample::with_nutrients(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9)
        );
    }

    #[test]
    fn test_ph_above_range_rejected() {
        let mut form = example_form();
        form.ph = Some(15.0.into());

        let err = form.parse(FormVariant::Nutrients).unwrap_err();
        assert_eq!(err.field(), SampleField::Ph);
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_ph_bounds_inclusive() {
        for ph in [0.0, 14.0] {
            let mut form = example_form();
            form.ph = Some(ph.into());
            assert!(form.parse(FormVariant::Nutrients).is_ok(), "ph {} should pass", ph);
        }
    }

    #[test]
    fn test_blank_field_is_missing() {
        let mut form = example_form();
        form.rainfall = Some("   ".into());

        let err = form.parse(FormVariant::Nutrients).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Missing {
                field: SampleField::Rainfall,
            }
        );
    }

    #[test]
    fn test_unparseable_and_non_finite_text() {
        let mut form = example_form();
        form.humidity = Some("eighty".into());
        assert!(matches!(
            form.parse(FormVariant::Nutrients),
            Err(ValidationError::NotANumber { field: SampleField::Humidity, .. })
        ));

        form.humidity = Some("inf".into());
        assert!(matches!(
            form.parse(FormVariant::Nutrients),
            Err(ValidationError::NotANumber { field: SampleField::Humidity, .. })
        ));

        // Overflows to infinity; the error echoes what was typed
        let mut form = example_form();
        form.ph = Some(" 1e400 ".into());
        assert_eq!(
            form.parse(FormVariant::Nutrients).unwrap_err(),
            ValidationError::NotANumber {
                field: SampleField::Ph,
                input: "1e400".to_string(),
            }
        );
    }

    #[test]
    fn test_humidity_bounds() {
        let mut form = example_form();
        form.humidity = Some("100".into());
        assert!(form.parse(FormVariant::Nutrients).is_ok());

        form.humidity = Some(100.5.into());
        assert_eq!(
            form.parse(FormVariant::Nutrients).unwrap_err(),
            ValidationError::OutOfRange {
                field: SampleField::Humidity,
                value: 100.5,
                min: 0.0,
                max: 100.0,
            }
        );

        let sample = SoilWeatherSample::with_nutrients(90.0, 42.0, 43.0, 20.8, 100.5, 6.5, 202.9);
        assert_eq!(sample.validate().unwrap_err().field(), SampleField::Humidity);
    }

    #[test]
    fn test_negative_nutrient_rejected() {
        let mut form = example_form();
        form.potassium = Some((-1.0).into());
        assert_eq!(
            form.parse(FormVariant::Nutrients).unwrap_err(),
            ValidationError::Negative {
                field: SampleField::Potassium,
                value: -1.0,
            }
        );
    }

    #[test]
    fn test_soil_type_variant() {
        let form = SampleForm {
            soil_type: Some("Loamy".to_string()),
            nitrogen: None,
            phosphorus: None,
            potassium: None,
            ..example_form()
        };

        let sample = form.parse(FormVariant::SoilType).unwrap();
        assert_eq!(sample.soil_type(), Some(SoilType::Loamy));
        assert_eq!(sample.value(SampleField::Nitrogen), None);

        // Nutrients variant still needs N/P/K
        assert_eq!(
            form.parse(FormVariant::Nutrients).unwrap_err(),
            ValidationError::Missing { field: SampleField::Nitrogen }
        );
    }

    #[test]
    fn test_unknown_soil_type() {
        let form = SampleForm {
            soil_type: Some("gravel".to_string()),
            ..example_form()
        };
        assert!(matches!(
            form.parse(FormVariant::SoilType),
            Err(ValidationError::UnknownSoilType { .. })
        ));
    }

    #[test]
    fn test_typed_sample_validate() {
        let mut sample =
            SoilWeatherSample::with_nutrients(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9);
        assert!(sample.validate().is_ok());

        sample.ph = -0.1;
        assert_eq!(sample.validate().unwrap_err().field(), SampleField::Ph);

        sample.ph = 7.0;
        sample.temperature = f64::NAN;
        assert_eq!(sample.validate().unwrap_err().field(), SampleField::Temperature);
    }

    #[test]
    fn test_validate_for_other_variant() {
        let sample = SoilWeatherSample::with_soil_type(SoilType::Clay, 20.0, 50.0, 7.0, 100.0);
        assert!(sample.validate_for(FormVariant::SoilType).is_ok());
        assert_eq!(
            sample.validate_for(FormVariant::Nutrients).unwrap_err(),
            ValidationError::Missing { field: SampleField::Nitrogen }
        );
    }

    #[test]
    fn test_form_deserializes_mixed_json() {
        let form: SampleForm = serde_json::from_str(
            r#"{"ph": "6.5", "nitrogen": 90, "soilType": "clay"}"#,
        )
        .unwrap();
        assert_eq!(form.ph, Some(FieldInput::Text("6.5".to_string())));
        assert_eq!(form.nitrogen, Some(FieldInput::Number(90.0)));
        assert_eq!(form.soil_type.as_deref(), Some("clay"));
        assert_eq!(form.rainfall, None);
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = SoilWeatherSample::with_soil_type(SoilType::Peaty, 18.0, 60.0, 5.5, 90.0);
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["soil_type"], "peaty");
        assert_eq!(json["ph"], 5.5);

        let back: SoilWeatherSample = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("soilType".parse::<SampleField>().unwrap(), SampleField::SoilType);
        assert_eq!("temperature".parse::<SampleField>().unwrap(), SampleField::Temperature);
        assert!("temp".parse::<SampleField>().is_err());
    }
}
