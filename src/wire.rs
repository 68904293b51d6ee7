//! Remote wire format
//!
//! The inference service names its fields however its owner chose to (e.g.
//! `temp` instead of `temperature`). `WireFieldMap` holds that translation as
//! configuration; `to_wire` and `from_wire` are exact inverses under one map.

use crate::error::RequestError;
use crate::recommendation::Prediction;
use crate::sample::{SampleField, SoilProfile, SoilWeatherSample};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireMapError {
    #[error("wire name for {0} is empty")]
    EmptyName(SampleField),

    #[error("{0}")]
    UnknownField(String),

    #[error("wire name '{name}' used for both {first} and {second}")]
    Duplicate {
        name: String,
        first: SampleField,
        second: SampleField,
    },

    #[error("malformed mapping entry '{0}' (expected field=wire_name)")]
    Malformed(String),
}

/// Internal field → wire name, one entry per `SampleField`
#[derive(Debug, Clone, PartialEq)]
pub struct WireFieldMap {
    names: HashMap<SampleField, String>,
}

impl Default for WireFieldMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl WireFieldMap {
    /// Wire names equal to the internal names
    pub fn identity() -> Self {
        let names = SampleField::ALL
            .into_iter()
            .map(|f| (f, f.as_str().to_string()))
            .collect();
        Self { names }
    }

    /// Identity map with some names replaced. Rejects empty and colliding names.
    pub fn with_overrides<I>(overrides: I) -> Result<Self, WireMapError>
    where
        I: IntoIterator<Item = (SampleField, String)>,
    {
        let mut map = Self::identity();
        for (field, name) in overrides {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(WireMapError::EmptyName(field));
            }
            map.names.insert(field, name);
        }
        map.check_distinct()?;
        Ok(map)
    }

    fn check_distinct(&self) -> Result<(), WireMapError> {
        let mut seen: HashMap<&str, SampleField> = HashMap::new();
        for field in SampleField::ALL {
            let name = self.wire_name(field);
            if let Some(first) = seen.insert(name, field) {
                return Err(WireMapError::Duplicate {
                    name: name.to_string(),
                    first,
                    second: field,
                });
            }
        }
        Ok(())
    }

    /// Parse `"temperature=temp, ph=soil_ph"`. An empty string is the identity map.
    pub fn parse(text: &str) -> Result<Self, WireMapError> {
        let mut overrides = Vec::new();
        for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (field, name) = entry
                .split_once('=')
                .ok_or_else(|| WireMapError::Malformed(entry.to_string()))?;
            let field: SampleField = field.parse().map_err(WireMapError::UnknownField)?;
            overrides.push((field, name.to_string()));
        }
        Self::with_overrides(overrides)
    }

    pub fn wire_name(&self, field: SampleField) -> &str {
        self.names
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.as_str())
    }

    /// Overridden entries only, for logging the active mapping
    pub fn overrides(&self) -> Vec<(SampleField, &str)> {
        SampleField::ALL
            .into_iter()
            .map(|f| (f, self.wire_name(f)))
            .filter(|(f, name)| f.as_str() != *name)
            .collect()
    }
}

// ============================================================================
// Sample <-> wire object
// ============================================================================

/// Request body for the remote service
pub fn to_wire(sample: &SoilWeatherSample, map: &WireFieldMap) -> Map<String, Value> {
    let mut body = Map::new();
    for field in SampleField::ALL {
        if let Some(value) = sample.value(field) {
            body.insert(map.wire_name(field).to_string(), Value::from(value));
        }
    }
    if let Some(soil_type) = sample.soil_type() {
        body.insert(
            map.wire_name(SampleField::SoilType).to_string(),
            Value::from(soil_type.as_str()),
        );
    }
    body
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("wire object is missing '{0}'")]
    Missing(String),

    #[error("wire field '{0}' is not a number")]
    NotANumber(String),

    #[error("wire field '{0}' is not a known soil type")]
    UnknownSoilType(String),
}

/// Read a sample back out of a wire object. Soil type wins over N/P/K when
/// both are present.
pub fn from_wire(
    body: &Map<String, Value>,
    map: &WireFieldMap,
) -> Result<SoilWeatherSample, WireError> {
    let number = |field: SampleField| -> Result<f64, WireError> {
        let name = map.wire_name(field);
        body.get(name)
            .ok_or_else(|| WireError::Missing(name.to_string()))?
            .as_f64()
            .ok_or_else(|| WireError::NotANumber(name.to_string()))
    };

    let soil_key = map.wire_name(SampleField::SoilType);
    let soil = match body.get(soil_key) {
        Some(value) => {
            let soil_type = value
                .as_str()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| WireError::UnknownSoilType(soil_key.to_string()))?;
            SoilProfile::Texture { soil_type }
        }
        None => SoilProfile::Nutrients {
            nitrogen: number(SampleField::Nitrogen)?,
            phosphorus: number(SampleField::Phosphorus)?,
            potassium: number(SampleField::Potassium)?,
        },
    };

    Ok(SoilWeatherSample {
        soil,
        temperature: number(SampleField::Temperature)?,
        humidity: number(SampleField::Humidity)?,
        ph: number(SampleField::Ph)?,
        rainfall: number(SampleField::Rainfall)?,
    })
}

// ============================================================================
// Response normalization
// ============================================================================

/// Normalize a remote response into a `Prediction`.
///
/// An `error` field that is present and truthy wins over everything else,
/// then a non-2xx status, then the `crop`/`score` shape check.
pub fn parse_response(status: u16, body: &[u8]) -> Result<Prediction, RequestError> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) if !success => return Err(RequestError::Status(status)),
        Err(e) => return Err(RequestError::Malformed(e.to_string())),
    };

    if let Some(message) = error_indicator(&value) {
        return Err(RequestError::Service(message));
    }
    if !success {
        return Err(RequestError::Status(status));
    }

    let obj = value
        .as_object()
        .ok_or_else(|| RequestError::Malformed("expected a JSON object".to_string()))?;

    let crop = obj
        .get("crop")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| RequestError::Malformed("missing or empty 'crop'".to_string()))?;

    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .ok_or_else(|| RequestError::Malformed("missing numeric 'score'".to_string()))?;

    if !(0.0..=100.0).contains(&score) {
        tracing::warn!("Remote score {} for '{}' is outside 0-100", score, crop);
    }

    Ok(Prediction {
        crop: crop.to_string(),
        score,
    })
}

fn error_indicator(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("error flag set".to_string()),
        Value::Object(o) => Some(
            o.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(o.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}
