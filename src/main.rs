use anyhow::Result;
use bizdash::core::ledger::EntryInput;
use bizdash::core::log::init_logging;
use bizdash::core::period::Period;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

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
    /// Display net worth, trend, profit margin and the monthly overview
    Dashboard,
    /// Display one business bucketed by period with a running total
    Chart {
        /// Business id or name
        business: String,
        /// Bucket size: day, week, month or year
        #[arg(short, long, default_value_t = Period::Month)]
        period: Period,
    },
    /// Manage businesses
    #[command(subcommand)]
    Business(BusinessCommands),
    /// Manage the entries of a business
    #[command(subcommand)]
    Entry(EntryCommands),
    /// Export businesses as JSON
    Export {
        /// Export only this business (id or name)
        #[arg(short, long)]
        business: Option<String>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ask the financial assistant a question
    Ask {
        question: String,
        /// Free-text description of budgets and goals
        #[arg(long)]
        budgets: Option<String>,
    },
    /// Run the assistant relay server
    Serve,
}

#[derive(Subcommand)]
enum BusinessCommands {
    /// Register a new business
    Add { name: String },
    /// Remove a business and all of its entries
    Remove { business: String },
    /// List businesses
    List,
}

#[derive(Subcommand)]
enum EntryCommands {
    /// Log a revenue or expense entry
    Add {
        business: String,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Rewrite an existing entry
    Edit {
        business: String,
        entry_id: String,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Delete an entry
    Delete { business: String, entry_id: String },
    /// List entries, newest first
    List { business: String },
}

#[derive(Args)]
struct EntryArgs {
    /// Entry date (YYYY-MM-DD)
    #[arg(short, long)]
    date: String,
    /// Amount; the sign is taken from --expense
    #[arg(short, long, allow_hyphen_values = true)]
    amount: f64,
    /// Record as an expense
    #[arg(short, long)]
    expense: bool,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    channel: Option<String>,
}

impl From<EntryArgs> for EntryInput {
    fn from(args: EntryArgs) -> Self {
        EntryInput {
            date: args.date,
            amount: args.amount,
            is_expense: args.expense,
            description: args.description,
            channel: args.channel,
        }
    }
}

impl From<Commands> for bizdash::AppCommand {
    fn from(cmd: Commands) -> bizdash::AppCommand {
        use bizdash::{AppCommand, BusinessAction, EntryAction};
        match cmd {
            Commands::Dashboard => AppCommand::Dashboard,
            Commands::Chart { business, period } => AppCommand::Chart { business, period },
            Commands::Business(action) => AppCommand::Business(match action {
                BusinessCommands::Add { name } => BusinessAction::Add { name },
                BusinessCommands::Remove { business } => BusinessAction::Remove { business },
                BusinessCommands::List => BusinessAction::List,
            }),
            Commands::Entry(action) => AppCommand::Entry(match action {
                EntryCommands::Add { business, entry } => EntryAction::Add {
                    business,
                    input: entry.into(),
                },
                EntryCommands::Edit {
                    business,
                    entry_id,
                    entry,
                } => EntryAction::Edit {
                    business,
                    entry_id,
                    input: entry.into(),
                },
                EntryCommands::Delete { business, entry_id } => {
                    EntryAction::Delete { business, entry_id }
                }
                EntryCommands::List { business } => EntryAction::List { business },
            }),
            Commands::Export { business, output } => AppCommand::Export { business, output },
            Commands::Ask { question, budgets } => AppCommand::Ask { question, budgets },
            Commands::Serve => AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, matches!(cli.command, Some(Commands::Serve)));

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => bizdash::cli::setup::setup_at_path(path),
            None => bizdash::cli::setup::setup(),
        },
        Some(cmd) => bizdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
