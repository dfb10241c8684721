// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use anyhow::{bail, Context, Result};
use award_core::calendar::AvailabilityCalendar;
use award_core::config::SearchConfig;
use award_core::export;
use award_core::file_source::{FileAvailabilityProvider, FileDetailFetcher};
use award_core::itinerary::{sort_itineraries, SearchOutcome};
use award_core::model::FlightOption;
use award_core::pipeline::{SearchPipeline, SearchReport, SearchRequest};
use award_core::provider::{AvailabilityProvider, DetailFetcher};
use award_core::remote::{HttpAvailabilityProvider, HttpDetailFetcher, PartnerClient};
use award_core::route::StopoverSpec;
use award_core::selection::{FlightPick, Selection, SelectionValidator, SuppressionSet};
use award_core::window::DateRange;
use award_policy::{Cabin, PolicyStore, TrustPolicy};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding availability.json and trips.json
    #[arg(long, env = "AWARD_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the partner availability API
    #[arg(long, env = "AWARD_API_BASE", global = true)]
    api_base: Option<String>,

    /// API key for the partner availability API
    #[arg(long, env = "AWARD_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Trust policy file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Search tunables file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for itineraries along a route, e.g. SFO-NRT-BKK
    Search {
        #[arg(long)]
        route: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Stopover as AIRPORT:DAYS, e.g. NRT:2
        #[arg(long)]
        stopover: Option<StopoverSpec>,
        /// Pick a flight as FLIGHT or FLIGHT@YYYY-MM-DDTHH:MM; repeat once per segment
        #[arg(long = "pick")]
        picks: Vec<FlightPick>,
        /// Only show flights with seats in this cabin (economy, premium, business, first)
        #[arg(long)]
        cabin: Option<Cabin>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show reconciled direct availability per date
    Calendar {
        #[arg(long)]
        route: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Inspect or reset the trust policy
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Print the active policy as JSON
    Show,
    /// Overwrite the policy file with the built-in defaults
    Reset,
    /// Validate a policy JSON file and make it the active policy
    Import { file: PathBuf },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

struct Sources {
    provider: Box<dyn AvailabilityProvider>,
    fetcher: Box<dyn DetailFetcher>,
}

fn open_sources(cli: &Cli) -> Result<Sources> {
    if let Some(dir) = &cli.data_dir {
        log::info!("Using file sources — dir={}", dir.display());
        return Ok(Sources {
            provider: Box::new(FileAvailabilityProvider::new(dir)),
            fetcher: Box::new(FileDetailFetcher::new(dir)),
        });
    }
    if let Some(base) = &cli.api_base {
        let client = PartnerClient::new(base, cli.api_key.as_deref().unwrap_or(""))?;
        return Ok(Sources {
            provider: Box::new(HttpAvailabilityProvider::new(client.clone())),
            fetcher: Box::new(HttpDetailFetcher::new(client)),
        });
    }
    bail!("No availability source. Please specify --data-dir or --api-base.")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let mut store = match &cli.policy {
        Some(path) => PolicyStore::at_path(path.clone()),
        None => PolicyStore::new(),
    };

    match &cli.command {
        Commands::Policy { action } => match action {
            PolicyAction::Show => {
                println!("# {}", store.config_path().display());
                println!("{}", serde_json::to_string_pretty(store.policy.as_ref())?);
            }
            PolicyAction::Reset => {
                store.reset_defaults()?;
                println!("Trust policy reset: {}", store.config_path().display());
            }
            PolicyAction::Import { file } => {
                let content = std::fs::read_to_string(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let policy: TrustPolicy = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", file.display()))?;
                policy.validate()?;
                store.update_policy(policy);
                store.save()?;
                log::info!(
                    "Imported trust policy — from={} to={}",
                    file.display(),
                    store.config_path().display()
                );
                println!("Trust policy imported: {}", store.config_path().display());
            }
        },
        Commands::Calendar { route, from, to } => {
            let sources = open_sources(&cli)?;
            let pipeline = SearchPipeline::new(
                sources.provider.as_ref(),
                sources.fetcher.as_ref(),
                store.policy.as_ref(),
            );
            let request = SearchRequest::new(route, DateRange::new(*from, *to)?);
            for calendar in pipeline.calendars(&request)? {
                print_calendar(&calendar);
            }
        }
        Commands::Search {
            route,
            from,
            to,
            stopover,
            picks,
            cabin,
            format,
        } => {
            let config_path = cli
                .config
                .clone()
                .unwrap_or_else(SearchConfig::default_path);
            let config = SearchConfig::load(&config_path)?;
            let sources = open_sources(&cli)?;
            let pipeline = SearchPipeline::new(
                sources.provider.as_ref(),
                sources.fetcher.as_ref(),
                store.policy.as_ref(),
            )
            .with_config(config);

            let mut request = SearchRequest::new(route, DateRange::new(*from, *to)?);
            if let Some(s) = stopover {
                request = request.with_stopover(s.clone());
            }
            let mut report = pipeline.run(&request)?;
            if let Some(cabin) = cabin {
                report.restrict_to_cabin(*cabin);
            }
            if let SearchOutcome::Itineraries { itineraries, .. } = &mut report.outcome {
                sort_itineraries(itineraries);
            }

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                Format::Csv => {
                    let stdout = std::io::stdout();
                    match &report.outcome {
                        SearchOutcome::Itineraries { itineraries, .. } => {
                            export::itineraries_to_csv(stdout.lock(), itineraries)?
                        }
                        SearchOutcome::Flattened(segments) => {
                            export::options_to_csv(stdout.lock(), segments)?
                        }
                    }
                }
                Format::Text => print_report(&report, picks),
            }
        }
    }

    Ok(())
}

fn print_calendar(calendar: &AvailabilityCalendar) {
    println!(
        "Segment {}: {}-{}",
        calendar.segment_index + 1,
        calendar.origin,
        calendar.destination
    );
    if calendar.days.is_empty() {
        println!("  no availability");
        return;
    }
    for (date, record) in &calendar.days {
        let cabins: Vec<String> = Cabin::ALL
            .iter()
            .filter(|c| record.is_direct(**c))
            .map(|c| format!("{} {}", c.code(), record.airlines(*c).join("/")))
            .collect();
        println!("  {}  {}", date, cabins.join("  "));
    }
}

fn print_flight(prefix: &str, f: &FlightOption) {
    println!(
        "{}{:<8} {} {} -> {} {}  [{}] {}",
        prefix,
        f.flight_number,
        f.origin,
        f.departs_at.format("%Y-%m-%d %H:%M"),
        f.destination,
        f.arrives_at.format("%Y-%m-%d %H:%M"),
        f.cabins,
        f.aircraft
    );
}

fn print_report(report: &SearchReport, picks: &[FlightPick]) {
    for segment in &report.segments {
        if !segment.failed_sources.is_empty() {
            println!(
                "Segment {}: no detail from {}",
                segment.index + 1,
                segment.failed_sources.join(", ")
            );
        }
    }

    match &report.outcome {
        SearchOutcome::Flattened(segments) => {
            println!("No connecting itinerary on {}; all options:", report.route);
            for (index, options) in segments.iter().enumerate() {
                println!("Segment {}:", index + 1);
                if options.is_empty() {
                    println!("  no availability");
                }
                for option in options {
                    print_flight("  ", option);
                }
            }
        }
        SearchOutcome::Itineraries {
            itineraries,
            truncated,
        } => {
            let displayed: Vec<FlightOption> = report.options().into_iter().flatten().collect();
            let mut selection = Selection::new();
            for pick in picks {
                match pick.resolve(&displayed) {
                    Ok(option) => selection.select(option.segment_index, option.key()),
                    Err(e) => println!("{}", e),
                }
            }

            let validator = SelectionValidator::new(itineraries);
            let mut suppression = SuppressionSet::default();
            validator.apply(&selection, &displayed, &mut suppression);

            let combos = validator.valid_combos(&selection);
            println!(
                "{} itineraries on {}{}",
                combos.len(),
                report.route,
                if *truncated { " (truncated)" } else { "" }
            );
            for (n, itinerary) in combos.iter().enumerate() {
                println!(
                    "#{} total {}h{:02}m",
                    n + 1,
                    itinerary.elapsed_minutes() / 60,
                    itinerary.elapsed_minutes() % 60
                );
                for flight in &itinerary.flights {
                    print_flight("  ", flight);
                }
            }
            if !suppression.hidden().is_empty() {
                println!("Hidden by selection:");
                for flight in displayed.iter().filter(|f| suppression.is_hidden(&f.key())) {
                    print_flight("  ", flight);
                }
            }
        }
    }
}
