//! Campus console CLI
//!
//! Drives the searchable select and the Excel import flow against a live
//! backend, mostly for smoke testing a deployment.
//!
//! # Usage
//!
//! ```bash
//! # Search students, then commit the second hit
//! campus-cli search students "jane" --pick 1
//!
//! # Resolve the label of a stored id
//! campus-cli search students --value 42
//!
//! # Import a spreadsheet, download a template
//! campus-cli import salaries salaires_mars.xlsx
//! campus-cli template expenses --dir ./templates
//!
//! # Filtered export and listing
//! campus-cli export expenses --out depenses.xlsx --from 2024-01-01 --min 1000
//! campus-cli list balances --search "MAT-0"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;

use campus_console::api::{
    outstanding_balances, ApiClient, ImportTarget, RemoteOptionSource, ResourceBackend,
};
use campus_console::models::{Expense, Salary, TuitionPayment};
use campus_console::search::ControllerState;
use campus_console::{
    telemetry, ConsoleConfig, Filterable, ImportFile, ImportOrchestrator, ImportOutcome,
    ImportResult, ListFilter, OptionId, PointerTarget, ResultTone, SearchableSelect,
};

/// Upper bound on waiting for a debounced search to settle
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(version)]
#[command(about = "Search, import and export against the campus admin backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to CAMPUS_CONSOLE_CONFIG or config/console.yaml)
    #[arg(long, short, global = true, env = "CAMPUS_CONSOLE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a configured option source
    Search {
        /// Source name from the `sources` section
        source: String,

        /// Query text (empty lists the default options)
        #[arg(default_value = "")]
        query: String,

        /// Existing value whose label should be resolved first
        #[arg(long)]
        value: Option<String>,

        /// Commit the n-th option (0-based) after searching
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Upload an Excel file to a resource's import endpoint
    Import {
        /// students, tuition_payments, salaries or expenses
        target: ImportTarget,

        file: PathBuf,
    },

    /// Download a resource's import template
    Template {
        target: ImportTarget,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Export a filtered finance list as a spreadsheet
    Export {
        target: ImportTarget,

        #[arg(long, short)]
        out: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print a filtered finance list with its total
    List {
        #[arg(value_enum)]
        list: ListKind,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListKind {
    Payments,
    Salaries,
    Expenses,
    Balances,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Free-text search
    #[arg(long)]
    search: Option<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long)]
    min: Option<Decimal>,

    #[arg(long)]
    max: Option<Decimal>,

    /// Restrict to the current academic year
    #[arg(long)]
    current_year: bool,
}

impl From<FilterArgs> for ListFilter {
    fn from(args: FilterArgs) -> Self {
        ListFilter {
            search: args.search.unwrap_or_default(),
            start: args.from,
            end: args.to,
            min_amount: args.min,
            max_amount: args.max,
            current_year_only: args.current_year,
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing("campus_console=info");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::load()?,
    };
    let client = Arc::new(ApiClient::new(&config.api)?);

    match cli.command {
        Commands::Search {
            source,
            query,
            value,
            pick,
        } => cmd_search(&config, client, &source, query, value, pick).await,
        Commands::Import { target, file } => cmd_import(&config, client, target, file).await,
        Commands::Template { target, dir } => cmd_template(&config, client, target, dir).await,
        Commands::Export {
            target,
            out,
            filter,
        } => cmd_export(client, target, out, filter.into()).await,
        Commands::List { list, filter } => cmd_list(client, list, filter.into()).await,
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn cmd_search(
    config: &ConsoleConfig,
    client: Arc<ApiClient>,
    source: &str,
    query: String,
    value: Option<String>,
    pick: Option<usize>,
) -> Result<()> {
    let provider = RemoteOptionSource::new(client, config.source(source)?.clone());
    let initial = value.as_deref().map(OptionId::parse);
    let mut select =
        SearchableSelect::mount(Arc::new(provider), config.search.settings(), initial.clone());

    if initial.is_some() {
        select.label_resolved().await;
        println!("{} {}", "Current:".bold(), select.display_label());
    }

    select.click(PointerTarget::Trigger);
    if !query.is_empty() {
        select.type_query(query);
    }
    wait_settled(&select).await?;

    let options = select.session().options;
    if options.is_empty() {
        println!("{}", "No results".yellow());
    }
    for (idx, option) in options.iter().enumerate() {
        let marker = if select.is_committed(option) { "*" } else { " " };
        match &option.sub_label {
            Some(sub) => println!("{marker} [{idx}] {} {}", option.label, sub.dimmed()),
            None => println!("{marker} [{idx}] {}", option.label),
        }
    }

    if let Some(idx) = pick {
        if idx >= options.len() {
            bail!("--pick {idx} is out of range ({} options)", options.len());
        }
        select.click(PointerTarget::Option(idx));
        let id = select
            .value()
            .map(|id| id.to_string())
            .unwrap_or_default();
        println!(
            "{} {} ({})",
            "Selected:".green().bold(),
            select.display_label(),
            id
        );
    }
    Ok(())
}

/// Wait until the debounce timer has fired and the latest fetch has landed
async fn wait_settled(select: &SearchableSelect) -> Result<()> {
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        while matches!(
            select.controller().state(),
            ControllerState::DebouncePending | ControllerState::Fetching
        ) {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .map_err(|_| anyhow!("search did not complete within {SETTLE_TIMEOUT:?}"))
}

async fn cmd_import(
    config: &ConsoleConfig,
    client: Arc<ApiClient>,
    target: ImportTarget,
    file: PathBuf,
) -> Result<()> {
    let profile = config.import.profile(target);
    println!("{}", profile.title.bold());
    if let Some(columns) = &profile.required_columns {
        println!("Required columns: {}", columns.dimmed());
    }

    let backend = Arc::new(ResourceBackend::new(client, target));
    let refresh = Arc::new(move || {
        println!("{} {} list refreshed", "↻".cyan(), target);
    });
    let mut orchestrator =
        ImportOrchestrator::new(backend, refresh, profile).with_limits(config.import.limits());

    let picked = ImportFile::read(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    orchestrator.select_file(picked)?;

    match orchestrator.run_import().await {
        ImportOutcome::Invalid(message) => bail!(message),
        ImportOutcome::Completed(result) => {
            print_result(&result);
            Ok(())
        }
        ImportOutcome::Failed { message, partial } => {
            if let Some(result) = &partial {
                print_result(result);
            }
            bail!(message)
        }
    }
}

fn print_result(result: &ImportResult) {
    let headline = format!("{} row(s) imported", result.success_count);
    match result.tone() {
        ResultTone::Success => println!("{} {}", "OK".green().bold(), headline),
        ResultTone::Partial => {
            println!("{} {}", "PARTIAL".yellow().bold(), headline);
            for error in &result.errors {
                println!("  - {}", error.red());
            }
        }
    }
}

async fn cmd_template(
    config: &ConsoleConfig,
    client: Arc<ApiClient>,
    target: ImportTarget,
    dir: PathBuf,
) -> Result<()> {
    let backend = Arc::new(ResourceBackend::new(client, target));
    let orchestrator =
        ImportOrchestrator::new(backend, Arc::new(|| {}), config.import.profile(target));

    match orchestrator.download_template(&dir).await {
        Some(path) => {
            println!("{} saved {}", "OK".green(), path.display());
            Ok(())
        }
        None => bail!("template download failed (see log)"),
    }
}

async fn cmd_export(
    client: Arc<ApiClient>,
    target: ImportTarget,
    out: PathBuf,
    filter: ListFilter,
) -> Result<()> {
    let bytes = ResourceBackend::new(client, target).export(&filter).await?;
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "{} exported {} ({} bytes)",
        "OK".green(),
        out.display(),
        bytes.len()
    );
    Ok(())
}

async fn cmd_list(client: Arc<ApiClient>, list: ListKind, filter: ListFilter) -> Result<()> {
    match list {
        ListKind::Payments => {
            let page = ResourceBackend::new(client, ImportTarget::TuitionPayments)
                .list::<TuitionPayment>(&filter)
                .await?;
            print_filtered(&filter, &page.results, |p| {
                format!(
                    "{} {}",
                    p.student_name.as_deref().unwrap_or("-"),
                    p.payment_date.map(|d| d.to_string()).unwrap_or_default()
                )
            });
        }
        ListKind::Salaries => {
            let page = ResourceBackend::new(client, ImportTarget::Salaries)
                .list::<Salary>(&filter)
                .await?;
            print_filtered(&filter, &page.results, |s| {
                format!("{} {:02}/{} {}", s.employee_name, s.month, s.year, s.status)
            });
        }
        ListKind::Expenses => {
            let page = ResourceBackend::new(client, ImportTarget::Expenses)
                .list::<Expense>(&filter)
                .await?;
            print_filtered(&filter, &page.results, |e| {
                format!("{} {} {}", e.date, e.category, e.description)
            });
        }
        ListKind::Balances => {
            let page = outstanding_balances(&client, &filter).await?;
            print_filtered(&filter, &page.results, |b| {
                format!("{} {}", b.student_matricule, b.student_name)
            });
        }
    }
    Ok(())
}

fn print_filtered<T: Filterable>(filter: &ListFilter, items: &[T], describe: impl Fn(&T) -> String) {
    let filtered = filter.apply(items);
    for &item in filtered.items() {
        println!("{:>14}  {}", item.amount().to_string().cyan(), describe(item));
    }
    println!(
        "{} {} of {} record(s), total {}",
        "Σ".bold(),
        filtered.len(),
        items.len(),
        filtered.total().to_string().bold()
    );
}
