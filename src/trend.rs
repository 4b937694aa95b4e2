//! Per-day minimum price series for the price graph

use crate::FlightOffer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum price seen on one calendar day.
///
/// A price of `0.0` means no offer departed that day; the chart renders it
/// as a gap. Use [`PriceTrendPoint::observed`] instead of comparing with zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendPoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PriceTrendPoint {
    pub fn observed(&self) -> Option<f64> {
        (self.price > 0.0).then_some(self.price)
    }
}

/// Day key of an offer: first 10 characters of its first departure timestamp
fn departure_day(offer: &FlightOffer) -> Option<&str> {
    let first = offer.segments.first()?;
    if first.departure_time.is_empty() {
        return None;
    }
    first.departure_time.get(..10)
}

/// One point per day from `departure` to `return_date` (or `departure`)
/// inclusive, ascending.
pub fn price_trend(
    offers: &[FlightOffer],
    departure: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
) -> Vec<PriceTrendPoint> {
    let Some(start) = departure else {
        return Vec::new();
    };
    if offers.is_empty() {
        return Vec::new();
    }
    let end = return_date.unwrap_or(start);

    let mut cheapest_by_day: HashMap<&str, f64> = HashMap::new();
    for offer in offers {
        let Some(day) = departure_day(offer) else {
            continue;
        };
        cheapest_by_day
            .entry(day)
            .and_modify(|price| *price = price.min(offer.price))
            .or_insert(offer.price);
    }

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            PriceTrendPoint {
                date,
                price: cheapest_by_day.get(key.as_str()).copied().unwrap_or(0.0),
            }
        })
        .collect()
}
