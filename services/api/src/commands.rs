use crate::infra::{print_json, read_deal_input};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use underwrite_risk::config::AppConfig;
use underwrite_risk::error::AppError;
use underwrite_risk::telemetry;
use underwrite_risk::underwriting::{
    load_training_set, run_stress_test, DatasetSummary, DealInputError, DealRecord, DealTerms,
    RiskEngine, RiskResult, StandardScaler, StressReport, StressScenario,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DealArgs {
    /// Deal record as a JSON object. Read from stdin when omitted.
    pub(crate) deal: Option<String>,
    /// Read the deal record from a file instead
    #[arg(long, conflicts_with = "deal")]
    pub(crate) file: Option<PathBuf>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StressArgs {
    #[command(flatten)]
    pub(crate) deal: DealArgs,
    /// JSON array of scenarios; the default set runs when omitted
    #[arg(long)]
    pub(crate) scenarios: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ModelArgs {
    /// Artifact to inspect instead of the configured one
    #[arg(long)]
    pub(crate) path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DatasetArgs {
    /// CSV file of historical loans with a default/defaulted/outcome column
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Include the standard scaler fitted on the prepared features
    #[arg(long)]
    pub(crate) scaler: bool,
}

#[derive(Debug, Serialize)]
struct DatasetReport {
    #[serde(flatten)]
    summary: DatasetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    scaler: Option<StandardScaler>,
}

pub(crate) fn run_score(args: DealArgs) -> Result<(), AppError> {
    let engine = engine_for(args.model_path)?;
    let raw = read_deal_input(args.deal, args.file.as_deref())?;
    let result = score_document(&engine, &raw)?;
    print_json(&result, args.pretty)
}

pub(crate) fn run_stress(args: StressArgs) -> Result<(), AppError> {
    let StressArgs { deal, scenarios } = args;
    let engine = engine_for(deal.model_path)?;
    let raw = read_deal_input(deal.deal, deal.file.as_deref())?;
    let scenarios = match scenarios {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    let report = stress_document(&engine, &raw, scenarios.as_deref())?;
    print_json(&report, deal.pretty)
}

pub(crate) fn run_model_inspect(args: ModelArgs) -> Result<(), AppError> {
    let engine = engine_for(args.path)?;
    print_json(&engine.status(), true)
}

pub(crate) fn run_dataset_summary(args: DatasetArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let set = load_training_set(&args.data)?;
    let report = DatasetReport {
        summary: set.summary(),
        scaler: if args.scaler { set.fit_scaler() } else { None },
    };
    print_json(&report, true)
}

fn engine_for(model_path: Option<PathBuf>) -> Result<RiskEngine, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(RiskEngine::from_path(
        model_path.unwrap_or(config.model.artifact_path),
    ))
}

pub(crate) fn score_document(engine: &RiskEngine, raw: &str) -> Result<RiskResult, AppError> {
    let record = DealRecord::from_json(raw)?;
    Ok(engine.assess(&record)?)
}

pub(crate) fn stress_document(
    engine: &RiskEngine,
    raw: &str,
    scenarios: Option<&str>,
) -> Result<StressReport, AppError> {
    let terms = DealTerms::resolve(&DealRecord::from_json(raw)?)?;
    let scenarios = match scenarios {
        Some(list) => {
            serde_json::from_str::<Vec<StressScenario>>(list).map_err(DealInputError::from)?
        }
        None => StressScenario::defaults(),
    };
    Ok(run_stress_test(engine, &terms, &scenarios)?)
}
