use crate::demo::{
    run_demo, run_position, run_turnover_report, DemoArgs, PositionArgs, TurnoverReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rental_ops::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rental-ops",
    about = "Checkout/check-in timelines and cleaning windows for rental turnovers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the turnover API (default command)
    Serve(ServeArgs),
    /// Turnover dashboard tools that run against CSV exports
    #[command(subcommand)]
    Turnover(TurnoverCommand),
    /// Print the dashboard for a bundled sample day
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TurnoverCommand {
    /// Build the checkout timeline for one day
    Report(TurnoverReportArgs),
    /// Place clock times on the 00:00-24:00 timeline axis
    Position(PositionArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    #[arg(long)]
    pub(crate) host: Option<String>,
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the snapshot from this apartment export (overrides TURNOVER_APARTMENTS_CSV)
    #[arg(long, requires = "reservations")]
    pub(crate) apartments: Option<PathBuf>,
    /// Seed the snapshot from this reservation export (overrides TURNOVER_RESERVATIONS_CSV)
    #[arg(long, requires = "apartments")]
    pub(crate) reservations: Option<PathBuf>,
    #[arg(long)]
    pub(crate) cleanings: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let command = Cli::parse()
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Turnover(TurnoverCommand::Report(args)) => run_turnover_report(args),
        Command::Turnover(TurnoverCommand::Position(args)) => run_position(args),
        Command::Demo(args) => run_demo(args),
    }
}
