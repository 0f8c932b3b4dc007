use crate::report::{
    run_readiness_report, run_references_lookup, run_rules_report, ReadinessArgs,
    ReferencesArgs, RulesArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use drivetuning::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "DriveTuning Legality",
    about = "Serve or query the DriveTuning legality core from the command line",
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
    /// List regional enforcement rules for a federal state
    Rules(RulesArgs),
    /// Resolve the legal citations behind a rule identifier
    References(ReferencesArgs),
    /// Compute TÜV readiness for a JSON list of modifications
    Readiness(ReadinessArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rules(args) => run_rules_report(args),
        Command::References(args) => run_references_lookup(args),
        Command::Readiness(args) => run_readiness_report(args),
    }
}
