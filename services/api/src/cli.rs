use crate::demo::{run_dashboard, run_demo, run_export, DashboardArgs, DemoArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ventas300::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Ventas300",
    about = "Run the Ventas300 appraisal brokerage API or inspect its records from the command line",
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
    /// Print dashboard totals and commissions per appraiser
    Dashboard(DashboardArgs),
    /// Walk a request from registration to commission against an in-memory store
    Demo(DemoArgs),
    /// Write the commission report as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Keep records as JSON files in this directory
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Start without loading the sample dataset
    #[arg(long)]
    pub(crate) no_seed: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dashboard(args) => run_dashboard(args),
        Command::Demo(args) => run_demo(args),
        Command::Export(args) => run_export(args),
    }
}
