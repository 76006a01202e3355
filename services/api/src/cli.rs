use crate::commands::{
    run_dataset_summary, run_model_inspect, run_score, run_stress, DatasetArgs, DealArgs,
    ModelArgs, StressArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use underwrite_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Underwriting Risk Engine",
    about = "Score commercial real-estate loans for default risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one deal record and print the risk assessment as JSON
    Score(DealArgs),
    /// Re-score a deal under adverse scenarios
    Stress(StressArgs),
    /// Inspect the persisted classifier artifact
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
    /// Work with historical loan datasets used for training
    Dataset {
        #[command(subcommand)]
        command: DatasetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Report whether the artifact loads and which version would be served
    Inspect(ModelArgs),
}

#[derive(Subcommand, Debug)]
enum DatasetCommand {
    /// Prepare a CSV dataset and summarize samples and default rate
    Summary(DatasetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Stress(args) => run_stress(args),
        Command::Model {
            command: ModelCommand::Inspect(args),
        } => run_model_inspect(args),
        Command::Dataset {
            command: DatasetCommand::Summary(args),
        } => run_dataset_summary(args),
    }
}
