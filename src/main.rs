//! patients-grid - Main Entry Point
//!
//! Terminal browser for the patients list endpoint.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use patients_grid::connection::{ClientConfig, EnvToken, SessionRole, SessionToken, TokenSource};
use patients_grid::constants::{GLOBAL_FILTER_FIELD, PAYMENTS_PAGE_SIZE};
use patients_grid::domain::{MatchMode, RawFilter, SortOrder};
use patients_grid::features::patients::PatientTableController;
use patients_grid::pagination::CursorTracker;
use patients_grid::services::runtime::block_on;
use patients_grid::services::{PatientService, PatientsApi};
use patients_grid::state::{LazyLoadEvent, LoadOutcome, PatientTableState, TableSnapshot};
use patients_grid::utils::format::{PATIENT_COLUMNS, format_cell, truncate};

const CELL_WIDTH: usize = 22;

#[derive(Parser)]
#[command(name = "patients-grid")]
#[command(about = "Browse patient records page by page")]
#[command(version)]
struct Cli {
    /// API base URL (overrides config file)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients, walking pages forward
    List {
        /// Rows per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Global search term
        #[arg(long)]
        search: Option<String>,

        /// Column filter, `field=value` or `field.matchMode=value`
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, RawFilter)>,

        /// Sort, `field` or `field:asc|desc`
        #[arg(long, value_parser = parse_sort)]
        sort: Option<(String, SortOrder)>,

        /// Number of pages to fetch
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        pages: u64,
    },

    /// Show one patient and their payments
    Show {
        /// Patient id (PK)
        id: String,

        /// Number of payment pages to fetch
        #[arg(long, default_value = "1")]
        payment_pages: usize,
    },

    /// Show the role carried by the access token
    Whoami,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("loading client config")?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    tracing::info!("Using {} ({})", config.base_url, config.environment);

    let tokens = SessionToken::new();
    if let Some(token) = EnvToken.access_token() {
        tokens.set(token);
    }

    match cli.command {
        Commands::List {
            page_size,
            search,
            filters,
            sort,
            pages,
        } => {
            let page_size = match page_size {
                Some(n) => NonZeroUsize::new(n).context("--page-size must be positive")?,
                None => config.page_size(),
            };
            let mut event = LazyLoadEvent::page(0, page_size.get());
            if let Some(term) = search {
                event = event.with_filter(GLOBAL_FILTER_FIELD, RawFilter::text(term));
            }
            for (field, filter) in filters {
                event = event.with_filter(field, filter);
            }
            if let Some((field, order)) = sort {
                event = event.with_sort(field, order);
            }

            let service = PatientService::new(config, tokens)?;
            block_on(list(service, page_size, event, pages))
        }
        Commands::Show { id, payment_pages } => {
            let service = PatientService::new(config, tokens)?;
            block_on(show(service, &id, payment_pages))
        }
        Commands::Whoami => {
            let Some(token) = tokens.access_token() else {
                bail!("no access token; set PATIENTS_ACCESS_TOKEN");
            };
            let role = SessionRole::from_token(&token)?;
            println!("{role:?}");
            Ok(())
        }
    }
}

async fn list(
    service: PatientService,
    page_size: NonZeroUsize,
    event: LazyLoadEvent,
    pages: u64,
) -> anyhow::Result<()> {
    let controller =
        PatientTableController::new(Arc::new(service), PatientTableState::new(page_size));

    let mut outcome = Some(controller.load(&event).await?);
    for fetched in 1..=pages {
        match outcome {
            Some(LoadOutcome::Loaded { .. }) => print_page(&controller.snapshot()),
            Some(LoadOutcome::Failed { error, .. }) => {
                println!("No records found matching your criteria. ({error})");
                break;
            }
            Some(LoadOutcome::Stale { .. }) | None => break,
        }
        if fetched == pages {
            break;
        }
        outcome = controller.load_next().await?;
    }
    Ok(())
}

async fn show(service: PatientService, id: &str, payment_pages: usize) -> anyhow::Result<()> {
    let patient = service.patient(id).await?;
    for column in &PATIENT_COLUMNS {
        println!("{:>16}: {}", column.header, format_cell(&patient, column));
    }

    let page_size = NonZeroUsize::new(PAYMENTS_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN);
    let mut tracker = CursorTracker::new();
    let mut cursor = tracker.request(0)?;
    for page in 0..payment_pages {
        let payments = service
            .patient_payments(id, page_size, cursor.as_ref())
            .await?;
        tracker.on_page_loaded(page, payments.next_cursor())?;
        for item in &payments.items {
            println!("{item}");
        }
        if !tracker.has_next() {
            break;
        }
        cursor = tracker.next_page()?;
    }
    Ok(())
}

fn print_page(snapshot: &TableSnapshot) {
    println!("-- page {} --", snapshot.page + 1);
    let header: Vec<String> = PATIENT_COLUMNS
        .iter()
        .map(|c| format!("{:<CELL_WIDTH$}", c.header))
        .collect();
    println!("{}", header.join(" "));

    if snapshot.rows.is_empty() {
        println!("No records found matching your criteria.");
    }
    for patient in &snapshot.rows {
        let cells: Vec<String> = PATIENT_COLUMNS
            .iter()
            .map(|c| format!("{:<CELL_WIDTH$}", truncate(&format_cell(patient, c), CELL_WIDTH)))
            .collect();
        println!("{}", cells.join(" "));
    }
    println!("{}", snapshot.summary());
}

fn parse_filter(arg: &str) -> Result<(String, RawFilter), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got `{arg}`"))?;
    let (field, mode) = match key.split_once('.') {
        Some((field, mode)) => (field, mode.parse::<MatchMode>().map_err(|e| e.to_string())?),
        None => (key, MatchMode::Equals),
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{arg}`"));
    }
    Ok((field.to_string(), RawFilter::predicate(value, mode)))
}

fn parse_sort(arg: &str) -> Result<(String, SortOrder), String> {
    let (field, order) = match arg.split_once(':') {
        Some((field, order)) => (field, order.parse::<SortOrder>().map_err(|e| e.to_string())?),
        None => (arg, SortOrder::Asc),
    };
    Ok((field.trim().to_string(), order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_args() {
        let (field, filter) = parse_filter("gender=Female").expect("parse");
        assert_eq!(field, "gender");
        assert_eq!(filter, RawFilter::predicate("Female", MatchMode::Equals));

        let (field, filter) = parse_filter("name.startsWith=ad").expect("parse");
        assert_eq!(field, "name");
        assert_eq!(filter, RawFilter::predicate("ad", MatchMode::StartsWith));

        assert!(parse_filter("name").is_err());
        assert!(parse_filter("name.fuzzy=x").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn sort_args() {
        assert_eq!(parse_sort("dob:desc").expect("parse"), ("dob".to_string(), SortOrder::Desc));
        assert_eq!(parse_sort("name").expect("parse"), ("name".to_string(), SortOrder::Asc));
        assert!(parse_sort("name:sideways").is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "patients-grid",
            "list",
            "--filter",
            "gender=Female",
            "--sort",
            "name:asc",
            "--pages",
            "2",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Commands::List { pages: 2, .. }));
    }

    #[test]
    fn zero_pages_is_rejected() {
        let parsed = Cli::try_parse_from(["patients-grid", "list", "--pages", "0"]);
        assert!(parsed.is_err());
    }
}
