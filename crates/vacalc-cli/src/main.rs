use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use vacalc_core::{
    format_currency, to_fixed, CalculationResult, Calculator, ClaimFile, ConditionCatalog,
    DependencyStatus, PrintableReport, RatedCondition, RoundedRating, Summary, VacalcConfig,
};
use vacalc_runtime::MemoizedCalculator;

mod telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "vacalc",
    about = "Estimate a VA combined disability rating and monthly compensation",
    version
)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the condition catalog (YAML or JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Override the compensation table (YAML or JSON)
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the combined rating for a claim file
    Calculate(CalculateArgs),
    /// Show the result of a claim under every dependency status
    Compare(ClaimArgs),
    /// Calculate many claim files, reusing results for identical claims
    Batch(BatchArgs),
    /// List the condition catalog
    Catalog(CatalogArgs),
    /// Print the compensation table
    Rates(RatesArgs),
}

#[derive(Args, Debug)]
struct ClaimArgs {
    /// Claim file (YAML or JSON)
    claim: PathBuf,
}

#[derive(Args, Debug)]
struct CalculateArgs {
    /// Claim file (YAML or JSON)
    claim: PathBuf,
    /// Override the claim's dependency status (e.g. veteran-with-spouse)
    #[arg(long)]
    status: Option<DependencyStatus>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Generation date printed on reports (defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Claim files (YAML or JSON)
    #[arg(required = true)]
    claims: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Case-insensitive text to match against names, categories and descriptions
    #[arg(long)]
    search: Option<String>,
    /// Only conditions that can be claimed per side
    #[arg(long)]
    bilateral: bool,
}

#[derive(Args, Debug)]
struct RatesArgs {
    /// Show a single rating row
    #[arg(long)]
    rating: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Report,
}

#[derive(Debug, Serialize)]
struct CalculationOutput<'a> {
    dependency_status: DependencyStatus,
    conditions: &'a [RatedCondition],
    result: &'a CalculationResult,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    telemetry::init(&telemetry::effective_level(&config.log_level, cli.verbose))?;

    match cli.command {
        Command::Calculate(args) => run_calculate(&config, args),
        Command::Compare(args) => run_compare(&config, &args.claim),
        Command::Batch(args) => run_batch(&config, &args.claims),
        Command::Catalog(args) => run_catalog(&config, args),
        Command::Rates(args) => run_rates(&config, args.rating),
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<VacalcConfig> {
    let mut config = match &cli.config {
        Some(path) => VacalcConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => VacalcConfig::default(),
    };

    if let Some(path) = &cli.catalog {
        config.catalog_path = Some(path.clone());
    }
    if let Some(path) = &cli.rates {
        config.rates_path = Some(path.clone());
    }

    Ok(config)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn read_claim(path: &Path, config: &VacalcConfig) -> Result<ClaimFile> {
    let mut file = ClaimFile::from_file(path)
        .with_context(|| format!("failed to read claim {}", path.display()))?;
    file.dependency_status.get_or_insert(config.default_status);
    Ok(file)
}

fn load_catalog(config: &VacalcConfig) -> Result<Arc<ConditionCatalog>> {
    config.load_catalog().context("failed to load condition catalog")
}

fn load_calculator(config: &VacalcConfig) -> Result<Calculator> {
    let rates = config.load_rates().context("failed to load compensation table")?;
    Ok(Calculator::new(rates))
}

fn run_calculate(config: &VacalcConfig, args: CalculateArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let calculator = load_calculator(config)?;

    let mut claim = read_claim(&args.claim, config)?
        .into_claim(&catalog)
        .with_context(|| format!("invalid claim {}", args.claim.display()))?;
    if let Some(status) = args.status {
        claim.set_status(status);
    }

    info!(
        claim = %args.claim.display(),
        conditions = claim.len(),
        status = %claim.status(),
        "calculating"
    );
    let result = calculator.calculate(claim.conditions(), claim.status());
    let effective = calculator.rates().effective;

    match args.format {
        OutputFormat::Text => {
            let summary = Summary {
                result: &result,
                effective,
            };
            print!("{summary}");
        }
        OutputFormat::Json => {
            let output = CalculationOutput {
                dependency_status: claim.status(),
                conditions: claim.conditions(),
                result: &result,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Report => {
            let report = PrintableReport {
                conditions: claim.conditions(),
                result: &result,
                status: claim.status(),
                effective,
                generated_on: args.date.unwrap_or_else(|| Local::now().date_naive()),
            };
            print!("{report}");
        }
    }

    Ok(())
}

fn run_compare(config: &VacalcConfig, path: &Path) -> Result<()> {
    let catalog = load_catalog(config)?;
    let calculator = load_calculator(config)?;
    let claim = read_claim(path, config)?
        .into_claim(&catalog)
        .with_context(|| format!("invalid claim {}", path.display()))?;

    let rows = calculator.compare_statuses(claim.conditions());
    if let Some((_, first)) = rows.first() {
        println!(
            "Combined body rating {}% rounds to {}",
            to_fixed(first.combined_body_rating, 1),
            first.final_rounded_rating
        );
    }
    println!();
    println!("{:<40}{:>16}", "Dependency status", "Monthly");
    for (status, result) in &rows {
        println!(
            "{:<40}{:>16}",
            status.label(),
            format_currency(result.monthly_compensation)
        );
    }

    Ok(())
}

fn run_batch(config: &VacalcConfig, paths: &[PathBuf]) -> Result<()> {
    let catalog = load_catalog(config)?;
    let calculator =
        MemoizedCalculator::from_config(config).context("failed to load compensation table")?;

    let mut failures = 0usize;
    for path in paths {
        let outcome = read_claim(path, config).and_then(|file| {
            file.into_claim(&catalog)
                .with_context(|| format!("invalid claim {}", path.display()))
        });

        match outcome {
            Ok(claim) => {
                let result = calculator.calculate(claim.conditions(), claim.status());
                println!(
                    "{}: {} ({}%), {} per month, {}",
                    path.display(),
                    result.final_rounded_rating,
                    to_fixed(result.combined_body_rating, 1),
                    format_currency(result.monthly_compensation),
                    claim.status().label()
                );
            }
            Err(err) => {
                failures += 1;
                println!("{}: error: {err:#}", path.display());
            }
        }
    }

    let stats = calculator.stats();
    println!();
    println!("cache: {} hits, {} misses", stats.hits, stats.misses);

    if failures > 0 {
        bail!("{failures} of {} claims failed", paths.len());
    }
    Ok(())
}

fn run_catalog(config: &VacalcConfig, args: CatalogArgs) -> Result<()> {
    let catalog = load_catalog(config)?;

    let entries = match &args.search {
        Some(query) => catalog.search(query),
        None => catalog.sorted(),
    };

    let mut shown = 0usize;
    for entry in entries
        .into_iter()
        .filter(|entry| !args.bilateral || entry.can_be_bilateral)
    {
        let ratings: Vec<String> = entry.ratings.iter().map(|r| format!("{r}%")).collect();
        let side = if entry.can_be_bilateral { " [L/R]" } else { "" };
        println!("{}{side}", entry.name);
        println!("    {}", ratings.join(", "));
        if let Some(category) = &entry.category {
            println!("    {category}");
        }
        shown += 1;
    }

    if shown == 0 {
        println!("No matching conditions.");
    }
    Ok(())
}

fn run_rates(config: &VacalcConfig, rating: Option<u8>) -> Result<()> {
    let table = config.load_rates().context("failed to load compensation table")?;

    let only = match rating {
        Some(value) => match RoundedRating::new(value) {
            Some(rounded) => Some(rounded),
            None => bail!("rating must be one of 0, 10, ..., 100 (got {value})"),
        },
        None => None,
    };

    println!(
        "Compensation rates effective {}",
        table.effective.format("%B %-d, %Y")
    );
    if let Some(source) = &table.source {
        println!("Source: {source}");
    }

    for rounded in RoundedRating::all().filter(|r| only.map_or(true, |o| o == *r)) {
        println!();
        println!("{rounded}");
        for status in DependencyStatus::ALL {
            println!(
                "  {:<40}{:>14}",
                status.label(),
                format_currency(table.lookup(rounded, status))
            );
        }
    }

    Ok(())
}
