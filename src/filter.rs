//! Filtering of flight offers by stops, price, airline and cabin class

use crate::itinerary::outbound_stops;
use crate::{CabinClass, FlightOffer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_MAX_PRICE: f64 = 2000.0;

/// Stop-count buckets, each toggled independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopFilter {
    pub nonstop: bool,
    pub one_stop: bool,
    pub two_plus: bool,
}

impl Default for StopFilter {
    fn default() -> Self {
        Self {
            nonstop: true,
            one_stop: true,
            two_plus: true,
        }
    }
}

impl StopFilter {
    pub fn any_enabled(&self) -> bool {
        self.nonstop || self.one_stop || self.two_plus
    }

    /// With no bucket enabled every stop count passes.
    pub fn matches(&self, stops: u32) -> bool {
        if !self.any_enabled() {
            return true;
        }
        (self.nonstop && stops == 0) || (self.one_stop && stops == 1) || (self.two_plus && stops >= 2)
    }
}

/// Active filter criteria for a search session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub stops: StopFilter,
    pub max_price: f64,
    pub airlines: BTreeSet<String>,          // empty = all airlines
    pub cabin_classes: BTreeSet<CabinClass>, // empty = all cabins
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            stops: StopFilter::default(),
            max_price: DEFAULT_MAX_PRICE,
            airlines: BTreeSet::new(),
            cabin_classes: BTreeSet::new(),
        }
    }
}

impl FilterConfig {
    pub fn with_max_price(max_price: f64) -> Self {
        Self {
            max_price,
            ..Self::default()
        }
    }

    pub fn matches(&self, offer: &FlightOffer, destination: &str) -> bool {
        if offer.price > self.max_price {
            return false;
        }

        if !self.stops.matches(outbound_stops(offer, destination)) {
            return false;
        }

        if !self.airlines.is_empty() && !self.airlines.contains(&offer.airline) {
            return false;
        }

        if !self.cabin_classes.is_empty() {
            match offer.cabin_class {
                Some(cabin) if self.cabin_classes.contains(&cabin) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Offers passing every active criterion, in their original order
pub fn apply_filters(offers: &[FlightOffer], config: &FilterConfig, destination: &str) -> Vec<FlightOffer> {
    if offers.is_empty() {
        return Vec::new();
    }

    offers
        .iter()
        .filter(|offer| config.matches(offer, destination))
        .cloned()
        .collect()
}

/// Distinct primary airlines across the offers, sorted
pub fn airline_options(offers: &[FlightOffer]) -> Vec<String> {
    offers
        .iter()
        .filter(|offer| !offer.airline.is_empty())
        .map(|offer| offer.airline.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

pub fn price_range(offers: &[FlightOffer]) -> Option<PriceRange> {
    if offers.is_empty() {
        return None;
    }

    let prices = offers.iter().map(|offer| offer.price);
    let min = prices.clone().fold(f64::INFINITY, f64::min);
    let max = prices.clone().fold(f64::NEG_INFINITY, f64::max);
    let avg = prices.sum::<f64>() / offers.len() as f64;

    Some(PriceRange { min, max, avg })
}

/// Upper bound for the price slider: at least 2000, rounded up to the
/// next thousand above both the current ceiling and the dearest offer.
pub fn price_slider_max(offers: &[FlightOffer], max_price: f64) -> f64 {
    let highest = price_range(offers).map_or(max_price, |range| range.max.max(max_price));
    DEFAULT_MAX_PRICE.max((highest / 1000.0).ceil() * 1000.0)
}

/// New price ceiling, rounded up to the next hundred, when the dearest
/// offer of a fresh result set would otherwise be hidden.
pub fn auto_adjusted_max_price(offers: &[FlightOffer], max_price: f64) -> Option<f64> {
    let range = price_range(offers)?;
    (range.max > max_price).then(|| (range.max / 100.0).ceil() * 100.0)
}
