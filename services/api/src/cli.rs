use crate::demo::{run_analytics, run_search, AnalyticsArgs, SearchArgs, TrendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hirehub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HireHub search and analytics",
    about = "Serve or exercise the recruiting search and analytics core from the command line",
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
    /// Run a universal search against the demo data or a JSON fixture file
    Search(SearchArgs),
    /// Print dashboard, trend or top-stats analytics
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum AnalyticsCommand {
    /// Overview totals, growth, recent activity and hiring performance
    Dashboard(AnalyticsArgs),
    /// Bucketed counts for one metric over the period
    Trends(TrendArgs),
    /// Most common skills, locations, companies and job types
    Top(AnalyticsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON array of tagged records to serve instead of the demo data
    #[arg(long)]
    pub(crate) fixtures: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Search(args) => run_search(args).await,
        Command::Analytics { command } => run_analytics(command).await,
    }
}
