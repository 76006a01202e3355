//! Training-set preparation for the external model trainer.
//!
//! Historical loans arrive as CSV with loosely named columns. Rows are turned
//! into the extended feature layout with the same derivation the engine uses
//! at inference time, so a model fitted on the output can be served as-is.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::deal::{
    DealTerms, PropertyType, DEFAULT_CREDIT_SCORE, DEFAULT_LOCATION_SCORE, DEFAULT_LTV_PCT,
    DEFAULT_OCCUPANCY, DEFAULT_PROPERTY_AGE_YEARS, DEFAULT_RATE_PCT, DEFAULT_TERM_MONTHS,
};
use super::features::{normalize_fraction, DealFeatures, FeatureLayout, SuppliedMetrics};
use super::model::StandardScaler;

const LABEL_COLUMNS: [&str; 3] = ["default", "defaulted", "outcome"];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("no label column found; expected one of `default`, `defaulted`, `outcome`")]
    MissingLabel,
    #[error("row {row}: label `{value}` is not 0/1 or true/false")]
    InvalidLabel { row: usize, value: String },
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("dataset has no rows")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct LoanRow {
    #[serde(default, alias = "requested_ltv")]
    ltv: Option<f64>,
    #[serde(default)]
    loan_amount: Option<f64>,
    #[serde(default, alias = "requested_rate")]
    rate: Option<f64>,
    #[serde(default, alias = "requested_term_months")]
    term_months: Option<f64>,
    #[serde(default, alias = "property_type")]
    asset_type: Option<String>,
    #[serde(default, alias = "borrower_credit_score")]
    credit_score: Option<f64>,
    #[serde(default, alias = "occupancy_rate")]
    occupancy: Option<f64>,
    #[serde(default)]
    location_score: Option<f64>,
    #[serde(default)]
    property_age: Option<f64>,
    #[serde(default)]
    noi: Option<f64>,
    #[serde(default)]
    dscr: Option<f64>,
    #[serde(default)]
    cap_rate: Option<f64>,
    #[serde(default, rename = "default")]
    default_flag: Option<String>,
    #[serde(default)]
    defaulted: Option<String>,
    #[serde(default)]
    outcome: Option<String>,
}

impl LoanRow {
    fn label(&self, column: &str, row: usize) -> Result<u8, DatasetError> {
        let raw = match column {
            "default" => self.default_flag.as_deref(),
            "defaulted" => self.defaulted.as_deref(),
            _ => self.outcome.as_deref(),
        }
        .unwrap_or_default()
        .trim();

        if column == "outcome" {
            return Ok(u8::from(raw.eq_ignore_ascii_case("default")));
        }

        match raw.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" => Ok(1),
            "0" | "0.0" | "false" => Ok(0),
            _ => Err(DatasetError::InvalidLabel {
                row,
                value: raw.to_string(),
            }),
        }
    }

    fn inputs(&self) -> [Option<f64>; INPUT_COLUMNS] {
        [
            self.ltv,
            self.loan_amount,
            self.rate,
            self.term_months,
            self.credit_score,
            self.occupancy,
            self.location_score,
            self.property_age,
        ]
        .map(|value| value.filter(|value| value.is_finite()))
    }
}

const INPUT_COLUMNS: usize = 8;

/// Fallback for a column with no usable value in any row.
const INPUT_DEFAULTS: [f64; INPUT_COLUMNS] = [
    DEFAULT_LTV_PCT,
    0.0,
    DEFAULT_RATE_PCT,
    DEFAULT_TERM_MONTHS as f64,
    DEFAULT_CREDIT_SCORE,
    DEFAULT_OCCUPANCY,
    DEFAULT_LOCATION_SCORE,
    DEFAULT_PROPERTY_AGE_YEARS,
];

/// Feature matrix in the extended layout plus binary default labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout::Extended
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn default_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let defaults: usize = self.labels.iter().map(|label| usize::from(*label)).sum();
        defaults as f64 / self.labels.len() as f64
    }

    pub fn fit_scaler(&self) -> Option<StandardScaler> {
        StandardScaler::fit(&self.features)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            samples: self.len(),
            defaults: self.labels.iter().filter(|label| **label == 1).count(),
            default_rate: self.default_rate(),
            feature_names: self.layout().names().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub samples: usize,
    pub defaults: usize,
    pub default_rate: f64,
    pub feature_names: Vec<&'static str>,
}

pub fn load_training_set(path: &Path) -> Result<TrainingSet, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = read_training_set(file)?;
    info!(
        path = %path.display(),
        samples = set.len(),
        default_rate = set.default_rate(),
        "prepared training set"
    );
    Ok(set)
}

pub fn read_training_set<R: Read>(reader: R) -> Result<TrainingSet, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let label_column = LABEL_COLUMNS
        .into_iter()
        .find(|column| headers.iter().any(|header| header == *column))
        .ok_or(DatasetError::MissingLabel)?;

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<LoanRow>() {
        rows.push(record?);
    }
    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    let medians = column_medians(&rows);
    let mut features = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        // 1-based, counting the header line.
        let line = index + 2;
        labels.push(row.label(label_column, line)?);

        let inputs = row.inputs();
        let value = |column: usize| inputs[column].unwrap_or(medians[column]);

        let term = value(3);
        if term < 0.0 {
            return Err(DatasetError::InvalidRow {
                row: line,
                reason: format!("term_months {term} is negative"),
            });
        }

        let terms = DealTerms {
            ltv: normalize_fraction(value(0)),
            loan_amount: value(1),
            rate: value(2),
            term_months: term.trunc().min(u32::MAX as f64) as u32,
            property_type: row
                .asset_type
                .as_deref()
                .and_then(PropertyType::parse)
                .unwrap_or_default(),
            borrower_credit_score: value(4),
            occupancy: normalize_fraction(value(5)),
            location_score: value(6),
            property_age: value(7),
        };
        let supplied = SuppliedMetrics {
            noi: row.noi.filter(|value| value.is_finite()),
            dscr: row.dscr.filter(|value| value.is_finite()),
            cap_rate: row.cap_rate.filter(|value| value.is_finite()),
        };

        features.push(DealFeatures::derive_with(&terms, supplied).vector(FeatureLayout::Extended));
    }

    Ok(TrainingSet { features, labels })
}

fn column_medians(rows: &[LoanRow]) -> [f64; INPUT_COLUMNS] {
    let mut columns: [Vec<f64>; INPUT_COLUMNS] = Default::default();
    for row in rows {
        for (column, value) in columns.iter_mut().zip(row.inputs()) {
            if let Some(value) = value {
                column.push(value);
            }
        }
    }

    let mut medians = INPUT_DEFAULTS;
    for (median, column) in medians.iter_mut().zip(columns.iter_mut()) {
        if let Some(value) = median_of(column) {
            *median = value;
        }
    }
    medians
}

fn median_of(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
