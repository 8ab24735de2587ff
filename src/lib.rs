pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::sync::{FIRST_SYNC_YEAR, SyncJob, current_year, exchange_year_options};
use crate::core::views::DateRange;
use crate::core::Repository;
use crate::providers::postgrest::PostgrestStore;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyCommand {
    List,
    Toggle { codes: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncCommand {
    Exchange { year: Option<i32> },
    Fund,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Dashboard,
    Currencies(CurrencyCommand),
    Rates {
        currency: Option<String>,
        range: DateRange,
        page: usize,
    },
    Funds {
        fund: Option<String>,
        page: usize,
        list: bool,
    },
    Sync(SyncCommand),
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

fn connect(config: &AppConfig) -> Result<Repository> {
    config.validate()?;
    let store = PostgrestStore::new(&config.store.url, &config.store.anon_key)?;
    Ok(Repository::new(Arc::new(store)))
}

fn sync_job(command: SyncCommand) -> Result<SyncJob> {
    match command {
        SyncCommand::Fund => Ok(SyncJob::Fund),
        SyncCommand::Exchange { year } => {
            let latest = current_year();
            let year = year.unwrap_or(latest);
            if !exchange_year_options(latest).contains(&year) {
                bail!("Sync year must be between {FIRST_SYNC_YEAR} and {latest}, got {year}");
            }
            Ok(SyncJob::Exchange { year })
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finsys starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Dashboard => cli::dashboard::run(connect(&config)?).await,
        AppCommand::Currencies(CurrencyCommand::List) => {
            cli::currencies::list(connect(&config)?).await
        }
        AppCommand::Currencies(CurrencyCommand::Toggle { codes }) => {
            cli::currencies::toggle(connect(&config)?, &codes).await
        }
        AppCommand::Rates {
            currency,
            range,
            page,
        } => {
            cli::rates::run(
                connect(&config)?,
                &config.default_currency,
                currency.as_deref(),
                range,
                page,
            )
            .await
        }
        AppCommand::Funds { fund, page, list } => {
            cli::funds::run(connect(&config)?, fund.as_deref(), page, list).await
        }
        AppCommand::Sync(command) => {
            let job = sync_job(command)?;
            cli::sync::run(&config.sync.base_url, job).await
        }
    }
}
