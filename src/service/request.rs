//! Prediction request schema and validation.
//!
//! Requests carry one integer field per encoded feature. Field names follow the encoded
//! column names with spaces optionally written as underscores; see [`normalize_name`].

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One request field and its inclusive range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub min: i64,
    pub max: i64,
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec { name, min: 0, max: 1 }
}

pub const REQUEST_FIELDS: [FieldSpec; 15] = [
    FieldSpec {
        name: "Household_Size",
        min: 1,
        max: 20,
    },
    flag("Appliance_Type_Air Conditioning"),
    flag("Appliance_Type_Dishwasher"),
    flag("Appliance_Type_Microwave"),
    flag("Appliance_Type_Washing_Machine"),
    flag("Appliance_Type_Fridge"),
    flag("Appliance_Type_TV"),
    flag("Appliance_Type_Computer"),
    flag("Appliance_Type_Oven"),
    flag("Appliance_Type_Heater"),
    flag("Appliance_Type_Lights"),
    flag("Season_Fall"),
    flag("Season_Spring"),
    flag("Season_Summer"),
    flag("Season_Winter"),
];

/// Canonical form used to match request fields against encoded feature names: spaces and
/// underscores are interchangeable.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "_")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field that failed validation, in schema order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// A validated prediction request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictionRequest {
    values: BTreeMap<String, i64>,
}

impl PredictionRequest {
    /// Validates a JSON body against [`REQUEST_FIELDS`]. Unknown fields are ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let object = body
            .as_object()
            .ok_or_else(|| ValidationErrors::single("body", "expected a JSON object"))?;
        Self::from_map(object)
    }

    fn from_map(object: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut values = BTreeMap::new();
        let mut errors = Vec::new();
        for def in &REQUEST_FIELDS {
            match object.get(def.name).map(|v| validate_field(def, v)) {
                Some(Ok(value)) => {
                    values.insert(normalize_name(def.name), value);
                }
                Some(Err(message)) => errors.push(FieldError {
                    field: def.name.to_string(),
                    message,
                }),
                None => errors.push(FieldError {
                    field: def.name.to_string(),
                    message: "field required".to_string(),
                }),
            }
        }
        if errors.is_empty() {
            Ok(Self { values })
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Value of a request field by its schema name.
    pub fn get(&self, field: &str) -> Option<i64> {
        self.values.get(&normalize_name(field)).copied()
    }

    /// Value for an encoded feature name such as `Appliance Type_Washing Machine`.
    pub fn feature_value(&self, feature_name: &str) -> Option<f64> {
        self.get(feature_name).map(|v| v as f64)
    }
}

fn validate_field(def: &FieldSpec, value: &Value) -> Result<i64, String> {
    let n = match value {
        Value::Number(n) => n,
        other => return Err(format!("value is not a valid integer, got {other}")),
    };
    let int = match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => i,
        (None, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
        _ => return Err(format!("value is not a valid integer, got {n}")),
    };
    if int < def.min || int > def.max {
        return Err(format!(
            "ensure this value is between {} and {}, got {int}",
            def.min, def.max
        ));
    }
    Ok(int)
}
