//! Ordering strategies for the offer list

use crate::itinerary::outbound_duration_minutes;
use crate::{FlightError, FlightOffer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weight of one flown minute in the blended score
const MINUTE_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    Cheapest,
    Fastest,
    /// Price plus half a currency unit per outbound minute
    #[default]
    Best,
}

impl FromStr for SortOption {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cheapest" => Ok(SortOption::Cheapest),
            "fastest" => Ok(SortOption::Fastest),
            "best" => Ok(SortOption::Best),
            _ => Err(FlightError::InvalidInput(format!("Invalid sort option: {}", s))),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOption::Cheapest => "cheapest",
            SortOption::Fastest => "fastest",
            SortOption::Best => "best",
        };
        f.write_str(name)
    }
}

pub fn blended_score(offer: &FlightOffer, destination: &str) -> f64 {
    offer.price + f64::from(outbound_duration_minutes(offer, destination)) * MINUTE_WEIGHT
}

/// Sorted copy of `offers`; equal keys keep their input order.
/// Prices use `f64::total_cmp`, so a NaN sorts after every amount.
pub fn sort_offers(offers: &[FlightOffer], option: SortOption, destination: &str) -> Vec<FlightOffer> {
    let mut sorted = offers.to_vec();

    match option {
        SortOption::Cheapest => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::Fastest => sorted.sort_by_key(|offer| outbound_duration_minutes(offer, destination)),
        SortOption::Best => sorted.sort_by(|a, b| {
            blended_score(a, destination).total_cmp(&blended_score(b, destination))
        }),
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlightSegment;

    fn offer(id: &str, price: f64, duration: &str) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            price,
            currency: "USD".to_string(),
            airline: "EK".to_string(),
            segments: vec![FlightSegment {
                departure_airport: "LHE".to_string(),
                arrival_airport: "DXB".to_string(),
                departure_time: "2024-06-01T08:00:00".to_string(),
                arrival_time: "2024-06-01T11:00:00".to_string(),
                duration: duration.to_string(),
                number_of_stops: 0,
                carrier_code: "EK".to_string(),
                flight_number: "623".to_string(),
            }],
            traveler_pricings: None,
            cabin_class: None,
            baggage_allowance: None,
        }
    }

    fn ids(offers: &[FlightOffer]) -> Vec<&str> {
        offers.iter().map(|o| o.id.as_str()).collect()
    }

    fn sample() -> Vec<FlightOffer> {
        vec![
            offer("slow-cheap", 300.0, "PT10H"),   // best score 600
            offer("fast-dear", 520.0, "PT2H"),     // best score 580
            offer("middle", 400.0, "PT5H"),        // best score 550
            offer("tie-cheap", 300.0, "PT6H"),     // best score 480
        ]
    }

    #[test]
    fn test_cheapest_is_non_decreasing_and_stable() {
        let sorted = sort_offers(&sample(), SortOption::Cheapest, "DXB");
        assert_eq!(ids(&sorted), vec!["slow-cheap", "tie-cheap", "middle", "fast-dear"]);
        assert!(sorted.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[test]
    fn test_nan_price_sorts_last() {
        let offers = vec![
            offer("dear", 800.0, "PT2H"),
            offer("broken", f64::NAN, "PT1H"),
            offer("cheap", 200.0, "PT3H"),
            offer("free", 0.0, "PT4H"),
        ];

        let cheapest = sort_offers(&offers, SortOption::Cheapest, "DXB");
        assert_eq!(ids(&cheapest), vec!["free", "cheap", "dear", "broken"]);
        let priced: Vec<f64> = cheapest.iter().map(|o| o.price).filter(|p| !p.is_nan()).collect();
        assert!(priced.windows(2).all(|w| w[0] <= w[1]));

        let best = sort_offers(&offers, SortOption::Best, "DXB");
        assert_eq!(best.last().map(|o| o.id.as_str()), Some("broken"));
    }

    #[test]
    fn test_fastest() {
        let sorted = sort_offers(&sample(), SortOption::Fastest, "DXB");
        assert_eq!(ids(&sorted), vec!["fast-dear", "middle", "tie-cheap", "slow-cheap"]);
    }

    #[test]
    fn test_best_blends_price_and_duration() {
        let sorted = sort_offers(&sample(), SortOption::Best, "DXB");
        assert_eq!(ids(&sorted), vec!["tie-cheap", "middle", "fast-dear", "slow-cheap"]);
    }

    #[test]
    fn test_best_ties_keep_input_order() {
        let offers = vec![offer("first", 100.0, "PT1H"), offer("second", 90.0, "PT1H20M")];
        let sorted = sort_offers(&offers, SortOption::Best, "DXB");
        assert_eq!(ids(&sorted), vec!["first", "second"]);
    }

    #[test]
    fn test_input_untouched() {
        let offers = sample();
        let _ = sort_offers(&offers, SortOption::Cheapest, "DXB");
        assert_eq!(ids(&offers), vec!["slow-cheap", "fast-dear", "middle", "tie-cheap"]);
    }

    #[test]
    fn test_sort_option_parsing() {
        assert_eq!("cheapest".parse::<SortOption>().unwrap(), SortOption::Cheapest);
        assert_eq!("Fastest".parse::<SortOption>().unwrap(), SortOption::Fastest);
        assert_eq!("best".parse::<SortOption>().unwrap(), SortOption::Best);
        assert!("random".parse::<SortOption>().is_err());
        assert_eq!(SortOption::default(), SortOption::Best);
        assert_eq!(SortOption::Fastest.to_string(), "fastest");
    }
}
