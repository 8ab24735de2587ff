use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use finsys::core::log::init_logging;
use finsys::core::views::DateRange;
use finsys::{AppCommand, CurrencyCommand, SyncCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the currency roster and the latest USD rates
    Dashboard,
    /// Manage the currencies tracked by the crawler
    #[command(subcommand)]
    Currencies(CurrencyArgs),
    /// Explore exchange-rate history for an active currency
    Rates {
        /// Currency code, defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
        /// Date range: 1M, 3M, 6M, 1Y or ALL
        #[arg(long, default_value_t = DateRange::default())]
        range: DateRange,
        /// Table page, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Explore NAV history for a fund
    Funds {
        /// Fund id, defaults to the first fund
        #[arg(long)]
        fund: Option<String>,
        /// Table page, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// List the available funds instead
        #[arg(long)]
        list: bool,
    },
    /// Trigger a crawler sync job
    #[command(subcommand)]
    Sync(SyncArgs),
}

#[derive(Subcommand)]
enum CurrencyArgs {
    /// List target currencies
    List,
    /// Flip the active flag of one or more currencies
    Toggle {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SyncArgs {
    /// Backfill exchange rates for a year
    Exchange {
        /// Year to sync, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Refresh fund NAV history
    Fund,
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Dashboard => AppCommand::Dashboard,
            Commands::Currencies(CurrencyArgs::List) => {
                AppCommand::Currencies(CurrencyCommand::List)
            }
            Commands::Currencies(CurrencyArgs::Toggle { codes }) => {
                AppCommand::Currencies(CurrencyCommand::Toggle { codes })
            }
            Commands::Rates {
                currency,
                range,
                page,
            } => AppCommand::Rates {
                currency,
                range,
                page,
            },
            Commands::Funds { fund, page, list } => AppCommand::Funds { fund, page, list },
            Commands::Sync(SyncArgs::Exchange { year }) => {
                AppCommand::Sync(SyncCommand::Exchange { year })
            }
            Commands::Sync(SyncArgs::Fund) => AppCommand::Sync(SyncCommand::Fund),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => finsys::cli::setup::setup(),
        Some(cmd) => finsys::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
