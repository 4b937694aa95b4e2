//! Search form checks performed before any request leaves the process

use crate::config::SearchDefaults;
use crate::{CabinClass, FlightError, SearchParams};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_PASSENGERS: u32 = 9;

/// Raw search form as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchForm {
    pub from: String,
    pub to: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub travel_class: Option<CabinClass>,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            departure_date: None,
            return_date: None,
            adults: 1,
            children: 0,
            travel_class: None,
        }
    }
}

impl SearchForm {
    /// Destination code as sent to the provider
    pub fn destination(&self) -> String {
        self.to.trim().to_uppercase()
    }

    pub fn total_passengers(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

fn is_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Check a form and build the request for it.
///
/// Every failure is a [`FlightError::InvalidInput`] carrying a message meant
/// for the user.
pub fn validate(form: &SearchForm, defaults: &SearchDefaults) -> Result<SearchParams, FlightError> {
    let from = form.from.trim();
    let to = form.to.trim();

    if !from.is_empty() && !is_airport_code(from) {
        return Err(FlightError::InvalidInput(
            "Origin airport code must be exactly 3 letters (e.g., LHE, FRA)".to_string(),
        ));
    }

    if !to.is_empty() && !is_airport_code(to) {
        return Err(FlightError::InvalidInput(
            "Destination airport code must be exactly 3 letters (e.g., LHE, FRA)".to_string(),
        ));
    }

    let departure = match form.departure_date {
        Some(date) if !from.is_empty() && !to.is_empty() => date,
        _ => {
            return Err(FlightError::InvalidInput(
                "Please enter origin, destination and departure date.".to_string(),
            ))
        }
    };

    if let Some(return_date) = form.return_date {
        if return_date < departure {
            return Err(FlightError::InvalidInput(
                "Return date must be after departure date.".to_string(),
            ));
        }
    }

    if form.adults == 0 {
        return Err(FlightError::InvalidInput(
            "At least one adult passenger is required.".to_string(),
        ));
    }

    let total = form.total_passengers();
    if total > MAX_PASSENGERS {
        return Err(FlightError::InvalidInput(format!(
            "Maximum {} passengers allowed (currently {}). Please reduce the number of adults or children.",
            MAX_PASSENGERS, total
        )));
    }

    Ok(SearchParams {
        origin_location_code: from.to_uppercase(),
        destination_location_code: to.to_uppercase(),
        departure_date: departure.format("%Y-%m-%d").to_string(),
        return_date: form.return_date.map(|d| d.format("%Y-%m-%d").to_string()),
        adults: form.adults,
        children: (form.children > 0).then_some(form.children),
        travel_class: form.travel_class,
        currency_code: Some(defaults.currency_code.clone()),
        max: Some(defaults.max_results),
    })
}
