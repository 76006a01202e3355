use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::features::normalize_fraction;

pub const DEFAULT_LTV_PCT: f64 = 75.0;
pub const DEFAULT_RATE_PCT: f64 = 7.5;
pub const DEFAULT_TERM_MONTHS: u32 = 36;
pub const DEFAULT_CREDIT_SCORE: f64 = 720.0;
/// Stored as a fraction; callers may also send 90.
pub const DEFAULT_OCCUPANCY: f64 = 0.90;
pub const DEFAULT_PROPERTY_AGE_YEARS: f64 = 15.0;
pub const DEFAULT_LOCATION_SCORE: f64 = 70.0;

/// Loosely-typed deal attributes as received from the underwriting workflow.
///
/// No key is required and unknown keys are carried along untouched; typed
/// access goes through [`DealTerms::resolve`], which applies the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealRecord(Map<String, Value>);

impl DealRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document, rejecting anything that is not an object.
    pub fn from_json(raw: &str) -> Result<Self, DealInputError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DealInputError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DealInputError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric attribute. `null` and blank strings count as absent; numeric
    /// strings are accepted.
    pub fn number(&self, key: &str) -> Result<Option<f64>, DealInputError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| DealInputError::invalid(key, "is not representable as a number")),
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(Some(value)),
                    _ => Err(DealInputError::invalid(
                        key,
                        format!("expected a number, found \"{raw}\""),
                    )),
                }
            }
            Some(other) => Err(DealInputError::invalid(
                key,
                format!("expected a number, found {}", json_kind(other)),
            )),
        }
    }

    pub fn text(&self, key: &str) -> Result<Option<&str>, DealInputError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(DealInputError::invalid(
                key,
                format!("expected a string, found {}", json_kind(other)),
            )),
        }
    }
}

impl From<Map<String, Value>> for DealRecord {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Collateral classes understood by the engine, with their model encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Multifamily,
    Retail,
    Office,
    Industrial,
    /// Manufactured-housing park.
    Mhp,
    MixedUse,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 7] = [
        PropertyType::Multifamily,
        PropertyType::Retail,
        PropertyType::Office,
        PropertyType::Industrial,
        PropertyType::Mhp,
        PropertyType::MixedUse,
        PropertyType::Land,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "multifamily" => Some(Self::Multifamily),
            "retail" => Some(Self::Retail),
            "office" => Some(Self::Office),
            "industrial" => Some(Self::Industrial),
            "mhp" => Some(Self::Mhp),
            "mixed_use" => Some(Self::MixedUse),
            "land" => Some(Self::Land),
            _ => None,
        }
    }

    /// Integer code used in the extended feature layout.
    pub fn code(self) -> u8 {
        match self {
            Self::Multifamily => 1,
            Self::Retail => 2,
            Self::Office => 3,
            Self::Industrial => 4,
            Self::Mhp => 5,
            Self::MixedUse => 6,
            Self::Land => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Multifamily => "Multifamily",
            Self::Retail => "Retail",
            Self::Office => "Office",
            Self::Industrial => "Industrial",
            Self::Mhp => "Manufactured Housing",
            Self::MixedUse => "Mixed Use",
            Self::Land => "Land",
        }
    }

    pub fn is_higher_risk(self) -> bool {
        matches!(self, Self::Land | Self::MixedUse)
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        Self::Multifamily
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deal attributes with every default applied and LTV/occupancy normalized
/// to fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealTerms {
    pub loan_amount: f64,
    pub ltv: f64,
    /// Annual rate, percent.
    pub rate: f64,
    pub term_months: u32,
    pub property_type: PropertyType,
    pub borrower_credit_score: f64,
    pub occupancy: f64,
    pub property_age: f64,
    pub location_score: f64,
}

impl Default for DealTerms {
    fn default() -> Self {
        Self {
            loan_amount: 0.0,
            ltv: normalize_fraction(DEFAULT_LTV_PCT),
            rate: DEFAULT_RATE_PCT,
            term_months: DEFAULT_TERM_MONTHS,
            property_type: PropertyType::default(),
            borrower_credit_score: DEFAULT_CREDIT_SCORE,
            occupancy: DEFAULT_OCCUPANCY,
            property_age: DEFAULT_PROPERTY_AGE_YEARS,
            location_score: DEFAULT_LOCATION_SCORE,
        }
    }
}

impl DealTerms {
    pub fn resolve(record: &DealRecord) -> Result<Self, DealInputError> {
        let defaults = Self::default();

        let term_months = match record.number("requested_term_months")? {
            Some(months) if months < 0.0 => {
                return Err(DealInputError::invalid(
                    "requested_term_months",
                    "must not be negative",
                ))
            }
            Some(months) => months.trunc().min(u32::MAX as f64) as u32,
            None => defaults.term_months,
        };

        let property_type = record
            .text("asset_type")?
            .and_then(PropertyType::parse)
            .unwrap_or_default();

        Ok(Self {
            loan_amount: record.number("loan_amount")?.unwrap_or(defaults.loan_amount),
            ltv: record
                .number("requested_ltv")?
                .map(normalize_fraction)
                .unwrap_or(defaults.ltv),
            rate: record
                .number("requested_rate")?
                .unwrap_or(defaults.rate),
            term_months,
            property_type,
            borrower_credit_score: record
                .number("borrower_credit_score")?
                .unwrap_or(defaults.borrower_credit_score),
            occupancy: record
                .number("occupancy_rate")?
                .map(normalize_fraction)
                .unwrap_or(defaults.occupancy),
            property_age: record
                .number("property_age")?
                .unwrap_or(defaults.property_age),
            location_score: record
                .number("location_score")?
                .unwrap_or(defaults.location_score),
        })
    }
}

/// Boundary failure: the caller sent something that cannot be read as a deal.
#[derive(Debug, thiserror::Error)]
pub enum DealInputError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("deal record must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("field `{field}` {reason}")]
    InvalidField { field: String, reason: String },
}

impl DealInputError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Short category used as the `error` key of boundary responses.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "Invalid JSON input",
            Self::NotAnObject { .. } | Self::InvalidField { .. } => "Invalid deal record",
        }
    }
}
