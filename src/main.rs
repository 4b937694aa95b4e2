//! CLI interface for flight-explorer

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use flight_explorer::config::{load_config, AppConfig};
use flight_explorer::itinerary::{format_duration, outbound_duration_minutes, outbound_stops, stops_label};
use flight_explorer::{
    search_flights, Action, CabinClass, FilterConfig, FlightOffer, SearchForm, SessionState, SortOption, StopFilter,
};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "flight-explorer")]
#[command(about = "Search, filter and compare flight offers from Amadeus")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights
    Search {
        /// Origin airport code (3 letters)
        #[arg(short, long)]
        from: String,
        /// Destination airport code (3 letters)
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(short, long)]
        return_date: Option<NaiveDate>,
        /// Number of adults
        #[arg(long, default_value = "1")]
        adults: u32,
        /// Number of children
        #[arg(long, default_value = "0")]
        children: u32,
        /// Travel class requested from the provider (economy, premium-economy, business, first)
        #[arg(long)]
        class: Option<String>,
        /// Stop buckets to show (comma-separated: nonstop, one-stop, two-plus)
        #[arg(long)]
        stops: Option<String>,
        /// Maximum total price
        #[arg(long)]
        max_price: Option<f64>,
        /// Airlines to show (comma-separated carrier codes)
        #[arg(long)]
        airlines: Option<String>,
        /// Cabin classes to show (comma-separated)
        #[arg(long)]
        cabins: Option<String>,
        /// Sort order (cheapest, fastest, best)
        #[arg(long, default_value = "cheapest")]
        sort: String,
        /// Show details for the offer with this id
        #[arg(long)]
        details: Option<String>,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Initialize logging to a daily rolling JSON file under `logs/`
fn init_logging() -> Result<()> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "flight-explorer.log");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .json(),
        )
        .try_init()?;

    debug!("Logging initialized");
    Ok(())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_stops(value: &str) -> Result<StopFilter> {
    let mut stops = StopFilter { nonstop: false, one_stop: false, two_plus: false };
    for bucket in split_list(value) {
        match bucket.to_lowercase().as_str() {
            "nonstop" | "0" => stops.nonstop = true,
            "one-stop" | "1" => stops.one_stop = true,
            "two-plus" | "2+" => stops.two_plus = true,
            other => anyhow::bail!("Invalid stop bucket: {}", other),
        }
    }
    Ok(stops)
}

fn build_filters(
    base: &FilterConfig,
    stops: Option<&str>,
    max_price: Option<f64>,
    airlines: Option<&str>,
    cabins: Option<&str>,
) -> Result<FilterConfig> {
    let mut filters = base.clone();
    if let Some(stops) = stops {
        filters.stops = parse_stops(stops)?;
    }
    if let Some(max_price) = max_price {
        filters.max_price = max_price;
    }
    if let Some(airlines) = airlines {
        filters.airlines = split_list(airlines).map(str::to_uppercase).collect();
    }
    if let Some(cabins) = cabins {
        filters.cabin_classes = split_list(cabins)
            .map(str::parse::<CabinClass>)
            .collect::<Result<_, _>>()?;
    }
    Ok(filters)
}

fn print_details(offer: &FlightOffer, destination: &str) {
    println!("\nFlight details: {} ({} {:.0})", offer.id, offer.currency, offer.price);
    println!(
        "Outbound: {}, total flight time {}",
        stops_label(outbound_stops(offer, destination)),
        format_duration(outbound_duration_minutes(offer, destination))
    );
    for segment in &offer.segments {
        println!(
            "  {}{} {} {} -> {} {} ({})",
            segment.carrier_code,
            segment.flight_number,
            segment.departure_airport,
            segment.departure_time,
            segment.arrival_airport,
            segment.arrival_time,
            format_duration(flight_explorer::parse_iso_duration_minutes(&segment.duration)),
        );
    }
    if let Some(cabin) = offer.cabin_class {
        println!("Cabin: {}", cabin);
    }
    if let Some(bags) = offer.baggage_allowance.filter(|b| b.checked_bags > 0) {
        println!("Baggage: {} checked, {} carry-on", bags.checked_bags, bags.carry_on_bags);
    }
    for line in offer.fare_breakdown() {
        println!("  {:?} x{}: {} {:.0}", line.traveler_type, line.count, line.currency, line.unit_price);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    }
    .apply_env();

    match cli.command {
        Commands::Search {
            from,
            to,
            date,
            return_date,
            adults,
            children,
            class,
            stops,
            max_price,
            airlines,
            cabins,
            sort,
            details,
            output,
        } => {
            let form = SearchForm {
                from,
                to,
                departure_date: Some(date),
                return_date,
                adults,
                children,
                travel_class: class.as_deref().map(str::parse::<CabinClass>).transpose()?,
            };
            let sort = sort.parse::<SortOption>()?;

            let state = SessionState::new(&config.session);
            let filters = build_filters(
                &state.filters,
                stops.as_deref(),
                max_price,
                airlines.as_deref(),
                cabins.as_deref(),
            )?;
            let state = state
                .reduce(Action::FormChanged(form))
                .reduce(Action::FiltersChanged(filters))
                .reduce(Action::SortChanged(sort));

            let (state, request) = state.begin_search(&config.search);
            let Some((seq, params)) = request else {
                if let Some(notice) = &state.notice {
                    eprintln!("{}", notice.message);
                }
                std::process::exit(2);
            };

            println!("Searching for flights...");
            info!(seq, "Submitting flight search");
            let destination = params.destination_location_code.clone();
            let state = match search_flights(&config.amadeus, &params).await {
                Ok(offers) => state.reduce(Action::SearchSucceeded { seq, destination, offers }),
                Err(e) => {
                    error!(error = %e, "Flight search failed");
                    state.reduce(Action::SearchFailed { seq, message: e.to_string() })
                }
            };

            let visible = state.visible_offers();
            let json = serde_json::to_string_pretty(&visible)?;
            if let Some(output_file) = output {
                fs::write(&output_file, &json)?;
                println!("Results saved to {}", output_file);
            } else {
                println!("{}", json);
            }

            println!("\nSummary:");
            println!("Found {} flights, showing {}", state.all_offers.len(), visible.len());
            println!("Airlines: {}", state.airline_options().join(", "));
            if let Some(first) = visible.first() {
                println!(
                    "Top {} flight: {} - {} {:.0}, {}, {}",
                    state.sort,
                    first.airline,
                    first.currency,
                    first.price,
                    stops_label(outbound_stops(first, &state.destination)),
                    format_duration(outbound_duration_minutes(first, &state.destination)),
                );
            }
            if let Some(notice) = &state.notice {
                eprintln!("[{:?}] {}", notice.kind, notice.message);
            }

            let trend = state.price_trend();
            if !trend.is_empty() {
                println!("\nPrice trend:");
                for point in &trend {
                    match point.observed() {
                        Some(price) => println!("  {}  {:.0}", point.date, price),
                        None => println!("  {}  -", point.date),
                    }
                }
            }

            if let Some(id) = details {
                let state = state.reduce(Action::OpenDetails(id.clone()));
                if state.detail_loading {
                    tokio::time::sleep(state.detail_delay()).await;
                }
                let state = state.reduce(Action::DetailsReady(id.clone()));
                match state.active_offer() {
                    Some(offer) => print_details(offer, &state.destination),
                    None => eprintln!("No offer with id {}", id),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "flight-explorer",
            "search",
            "--from", "LHE",
            "--to", "MUC",
            "--date", "2024-06-01",
            "--return-date", "2024-06-10",
            "--sort", "best",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli { command: Commands::Search { from, to, date, return_date, .. }, .. }) = cli {
            assert_eq!(from, "LHE");
            assert_eq!(to, "MUC");
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
            assert_eq!(return_date, NaiveDate::from_ymd_opt(2024, 6, 10));
        }
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let cli = Cli::try_parse_from([
            "flight-explorer", "search", "--from", "LHE", "--to", "MUC", "--date", "June 1st",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_build_filters() {
        let filters = build_filters(
            &FilterConfig::default(),
            Some("nonstop, two-plus"),
            Some(900.0),
            Some("ek,lh"),
            Some("economy,business"),
        )
        .unwrap();

        assert_eq!(filters.stops, StopFilter { nonstop: true, one_stop: false, two_plus: true });
        assert_eq!(filters.max_price, 900.0);
        assert!(filters.airlines.contains("EK") && filters.airlines.contains("LH"));
        assert_eq!(filters.cabin_classes.len(), 2);

        assert!(build_filters(&FilterConfig::default(), Some("three"), None, None, None).is_err());
    }
}
