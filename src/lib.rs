pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::chat::ChatRelay;
use crate::core::config::{API_KEY_ENV, AppConfig, AssistantConfig};
use crate::core::ledger::{EntryInput, Ledger};
use crate::core::period::Period;
use crate::providers::GeminiProvider;
use crate::store::{BusinessRepository, DiskRepository};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Dashboard,
    Chart { business: String, period: Period },
    Business(BusinessAction),
    Entry(EntryAction),
    Export {
        business: Option<String>,
        output: Option<PathBuf>,
    },
    Ask {
        question: String,
        budgets: Option<String>,
    },
    Serve,
}

pub enum BusinessAction {
    Add { name: String },
    Remove { business: String },
    List,
}

pub enum EntryAction {
    Add {
        business: String,
        input: EntryInput,
    },
    Edit {
        business: String,
        entry_id: String,
        input: EntryInput,
    },
    Delete {
        business: String,
        entry_id: String,
    },
    List {
        business: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    if let AppCommand::Serve = command {
        let relay = build_relay(&config.assistant)?;
        return cli::serve::run(Arc::new(relay), &config.server).await;
    }

    let repo = DiskRepository::open(&config.storage_path()?)?;
    execute(command, &config, &repo).await
}

/// Runs a command against an already opened repository.
pub async fn execute(
    command: AppCommand,
    config: &AppConfig,
    repo: &dyn BusinessRepository,
) -> Result<()> {
    let currency = config.currency.as_str();
    let today = Local::now().date_naive();

    match command {
        AppCommand::Dashboard => {
            cli::dashboard::run(&repo.load(), currency, today);
            Ok(())
        }
        AppCommand::Chart { business, period } => {
            let ledger = Ledger::new(repo.load());
            let business = ledger
                .find(&business)
                .with_context(|| format!("Business not found: {business}"))?;
            cli::chart::run(business, period, currency, today);
            Ok(())
        }
        AppCommand::Business(action) => match action {
            BusinessAction::Add { name } => cli::business::add(repo, &name),
            BusinessAction::Remove { business } => cli::business::remove(repo, &business),
            BusinessAction::List => cli::business::list(repo),
        },
        AppCommand::Entry(action) => match action {
            EntryAction::Add { business, input } => {
                cli::entry::add(repo, &business, &input, currency)
            }
            EntryAction::Edit {
                business,
                entry_id,
                input,
            } => cli::entry::edit(repo, &business, &entry_id, &input, currency),
            EntryAction::Delete { business, entry_id } => {
                cli::entry::delete(repo, &business, &entry_id)
            }
            EntryAction::List { business } => cli::entry::list(repo, &business, currency),
        },
        AppCommand::Export { business, output } => {
            cli::export::run(repo, business.as_deref(), output.as_deref()).map(|_| ())
        }
        AppCommand::Ask { question, budgets } => {
            let relay = build_relay(&config.assistant)?;
            cli::ask::run(&relay, &repo.load(), &question, budgets, currency).await
        }
        AppCommand::Serve => {
            let relay = build_relay(&config.assistant)?;
            cli::serve::run(Arc::new(relay), &config.server).await
        }
    }
}

/// Builds the relay over the configured model. Fails without an API key.
pub fn build_relay(assistant: &AssistantConfig) -> Result<ChatRelay> {
    let api_key = assistant.resolve_api_key().with_context(|| {
        format!("No API key configured: set assistant.api_key or {API_KEY_ENV}")
    })?;
    let provider = GeminiProvider::new(&assistant.base_url, &assistant.model, &api_key)?;
    info!("Using model {} at {}", assistant.model, assistant.base_url);
    Ok(ChatRelay::new(Arc::new(provider), assistant.name.clone()))
}
