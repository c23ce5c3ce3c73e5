use crate::demo::{
    run_dashboard, run_demo, run_export, run_team, DashboardArgs, DemoArgs, ExportArgs, TeamArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use competency::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Competency Dashboard",
    about = "Serve and inspect competency assessments from the command line",
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
    /// Print one person's competency vector, growth areas and next due date
    Dashboard(DashboardArgs),
    /// Print team averages with an optional member drill-down
    Team(TeamArgs),
    /// Export assessment history as CSV
    Export(ExportArgs),
    /// Run an end-to-end demo over a generated sample snapshot
    Demo(DemoArgs),
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
        Command::Dashboard(args) => run_dashboard(args),
        Command::Team(args) => run_team(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}
