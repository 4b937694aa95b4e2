//! # Flight Explorer Library
//!
//! Searches flight offers through the Amadeus self-service API and turns the
//! raw offers into something a user can browse: filtered by stops, price,
//! airline and cabin, sorted by price or duration, and bucketed into a
//! per-day price trend.

pub mod client;
pub mod config;
pub mod filter;
pub mod itinerary;
pub mod session;
pub mod sort;
pub mod trend;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use client::{AmadeusClient, FlightOfferParser};
pub use config::{AmadeusConfig, AppConfig, SearchDefaults, SessionConfig};
pub use filter::{apply_filters, FilterConfig, StopFilter};
pub use itinerary::{outbound_duration_minutes, outbound_stops, parse_iso_duration_minutes};
pub use session::{Action, Notice, NoticeKind, SessionState, TravelDates};
pub use sort::{sort_offers, SortOption};
pub use trend::{price_trend, PriceTrendPoint};
pub use validation::{validate, SearchForm};

/// Error types for the flights library
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing Amadeus credentials. Set AMADEUS_CLIENT_ID and AMADEUS_CLIENT_SECRET.")]
    MissingCredentials,

    #[error("Amadeus auth error: {status} – {body}")]
    AuthError { status: u16, body: String },

    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl FlightError {
    /// Which banner an error belongs in: input problems the user can fix,
    /// or problems on the provider side.
    pub fn kind(&self) -> NoticeKind {
        match self {
            FlightError::InvalidInput(_) => NoticeKind::User,
            _ => NoticeKind::Api,
        }
    }
}

/// Cabin class of a fare
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Value used on the wire by the provider
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::PremiumEconomy => "PREMIUM_ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::First => "FIRST",
        }
    }
}

impl FromStr for CabinClass {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" => Ok(CabinClass::Economy),
            "premium-economy" | "premium_economy" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            _ => Err(FlightError::InvalidInput(format!("Invalid cabin class: {}", s))),
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CabinClass::Economy => "Economy",
            CabinClass::PremiumEconomy => "Premium economy",
            CabinClass::Business => "Business",
            CabinClass::First => "First",
        };
        f.write_str(label)
    }
}

/// Traveler category of a per-traveler price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelerType {
    Adult,
    Child,
    Senior,
    HeldInfant,
    SeatedInfant,
    Young,
}

impl TravelerType {
    /// Lenient mapping from the provider's code; unknown codes count as adults.
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "CHILD" => TravelerType::Child,
            "SENIOR" => TravelerType::Senior,
            "HELD_INFANT" => TravelerType::HeldInfant,
            "SEATED_INFANT" => TravelerType::SeatedInfant,
            "YOUNG" => TravelerType::Young,
            _ => TravelerType::Adult,
        }
    }
}

/// One flown leg of an offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: String,  // ISO-8601 local time, e.g. 2024-06-01T10:15:00
    pub arrival_time: String,
    pub duration: String,        // ISO-8601 duration, e.g. PT2H30M
    pub number_of_stops: u32,
    pub carrier_code: String,
    pub flight_number: String,
}

/// Price paid by one traveler of an offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerPricing {
    pub traveler_type: TravelerType,
    pub price: f64,
    pub currency: String,
    pub included_checked_bags: Option<u32>,
}

/// Bags included in the fare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaggageAllowance {
    pub checked_bags: u32,
    pub carry_on_bags: u32,
}

/// One priced itinerary returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: String,
    pub price: f64,
    pub currency: String,
    pub airline: String,                 // carrier of the first segment
    pub segments: Vec<FlightSegment>,    // in flight order, outbound then return
    pub traveler_pricings: Option<Vec<TravelerPricing>>,
    pub cabin_class: Option<CabinClass>,
    pub baggage_allowance: Option<BaggageAllowance>,
}

/// Per-traveler-type line of a price breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareLine {
    pub traveler_type: TravelerType,
    pub count: usize,
    pub unit_price: f64,
    pub currency: String,
}

impl FlightOffer {
    /// Adult and child fares grouped for display, priced by the first
    /// traveler of each type.
    pub fn fare_breakdown(&self) -> Vec<FareLine> {
        let Some(pricings) = self.traveler_pricings.as_deref() else {
            return Vec::new();
        };

        [TravelerType::Adult, TravelerType::Child]
            .into_iter()
            .filter_map(|traveler_type| {
                let mut matching = pricings.iter().filter(|tp| tp.traveler_type == traveler_type);
                let first = matching.next()?;
                Some(FareLine {
                    traveler_type,
                    count: 1 + matching.count(),
                    unit_price: first.price,
                    currency: first.currency.clone(),
                })
            })
            .collect()
    }
}

/// Parameters of one flight-offers search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,         // YYYY-MM-DD
    pub return_date: Option<String>,    // YYYY-MM-DD
    pub adults: u32,
    pub children: Option<u32>,
    pub travel_class: Option<CabinClass>,
    pub currency_code: Option<String>,
    pub max: Option<u32>,
}

/// Main public API function: authenticate and fetch normalized offers
pub async fn search_flights(
    config: &AmadeusConfig,
    params: &SearchParams,
) -> Result<Vec<FlightOffer>, FlightError> {
    let client = AmadeusClient::new(config.clone())?;
    client.search_flights(params).await
}
