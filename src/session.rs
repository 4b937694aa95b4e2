//! Search session state
//!
//! [`SessionState`] is a plain value. Every change goes through
//! [`SessionState::reduce`], which consumes the old state and returns the
//! new one. Timers (notice expiry, the detail-view delay) live with the
//! caller, which dispatches [`Action::DismissNotice`] and
//! [`Action::DetailsReady`] when they fire. A `DetailsReady` for an offer
//! that is no longer open is ignored.

use crate::config::{SearchDefaults, SessionConfig};
use crate::filter::{self, apply_filters, FilterConfig};
use crate::sort::{sort_offers, SortOption};
use crate::trend::{price_trend, PriceTrendPoint};
use crate::validation::{validate, SearchForm};
use crate::{FlightError, FlightOffer, SearchParams};
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Something the user can correct: input, or filters that hide everything
    User,
    /// Provider failure or an empty provider result
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn user(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::User, message: message.into() }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Api, message: message.into() }
    }
}

impl From<&FlightError> for Notice {
    fn from(err: &FlightError) -> Self {
        Self { kind: err.kind(), message: err.to_string() }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    FormChanged(SearchForm),
    /// Validated search submitted; `seq` identifies it
    SearchStarted { seq: u64 },
    SearchRejected(String),
    SearchSucceeded { seq: u64, destination: String, offers: Vec<FlightOffer> },
    SearchFailed { seq: u64, message: String },
    FiltersChanged(FilterConfig),
    SortChanged(SortOption),
    OpenDetails(String),
    /// Detail-view delay elapsed for the offer with this id
    DetailsReady(String),
    CloseDetails,
    DismissNotice,
}

/// Travel dates a search was submitted with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TravelDates {
    pub departure: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
}

impl TravelDates {
    fn of(form: &SearchForm) -> Self {
        Self { departure: form.departure_date, return_date: form.return_date }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub form: SearchForm,
    /// Every offer of the last completed search
    pub all_offers: Vec<FlightOffer>,
    /// `all_offers` after filtering, in provider order
    pub offers: Vec<FlightOffer>,
    /// Destination the current offers were searched for
    pub destination: String,
    /// Dates the current offers were searched for
    pub dates: TravelDates,
    pub filters: FilterConfig,
    pub sort: SortOption,
    pub loading: bool,
    pub notice: Option<Notice>,
    pub active_offer: Option<String>,
    pub detail_loading: bool,
    search_seq: u64,
    pending_dates: TravelDates,
    detail_delay: Duration,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            form: SearchForm::default(),
            all_offers: Vec::new(),
            offers: Vec::new(),
            destination: String::new(),
            dates: TravelDates::default(),
            filters: FilterConfig::with_max_price(config.default_max_price),
            sort: SortOption::Cheapest,
            loading: false,
            notice: None,
            active_offer: None,
            detail_loading: false,
            search_seq: 0,
            pending_dates: TravelDates::default(),
            detail_delay: config.detail_delay(),
        }
    }

    /// Sequence number of the most recently started search
    pub fn search_seq(&self) -> u64 {
        self.search_seq
    }

    /// Validate the form and, when it is usable, start a search.
    ///
    /// Returns the new state plus the request to send and its sequence
    /// number. A rejected form leaves the current results in place.
    pub fn begin_search(self, defaults: &SearchDefaults) -> (Self, Option<(u64, SearchParams)>) {
        match validate(&self.form, defaults) {
            Ok(params) => {
                let seq = self.search_seq + 1;
                (self.reduce(Action::SearchStarted { seq }), Some((seq, params)))
            }
            Err(err) => (self.reduce(Action::SearchRejected(err.to_string())), None),
        }
    }

    /// Apply one transition
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::FormChanged(form) => Self { form, ..self },
            Action::SearchStarted { seq } => {
                debug!(seq, "Search started");
                Self {
                    search_seq: seq,
                    pending_dates: TravelDates::of(&self.form),
                    loading: true,
                    notice: None,
                    active_offer: None,
                    detail_loading: false,
                    ..self
                }
            }
            Action::SearchRejected(message) => Self {
                notice: Some(Notice::user(message)),
                ..self
            },
            Action::SearchSucceeded { seq, destination, offers } => {
                if seq != self.search_seq {
                    warn!(seq, current = self.search_seq, "Ignoring stale search response");
                    return self;
                }
                self.with_results(destination, offers)
            }
            Action::SearchFailed { seq, message } => {
                if seq != self.search_seq {
                    warn!(seq, current = self.search_seq, "Ignoring stale search failure");
                    return self;
                }
                Self {
                    loading: false,
                    offers: Vec::new(),
                    notice: Some(Notice::api(message)),
                    ..self
                }
            }
            Action::FiltersChanged(filters) => {
                let offers = apply_filters(&self.all_offers, &filters, &self.destination);
                debug!(visible = offers.len(), "Filters changed");
                Self { filters, offers, ..self }
            }
            Action::SortChanged(sort) => Self { sort, ..self },
            Action::OpenDetails(id) => {
                let detail_loading = !self.detail_delay.is_zero();
                Self {
                    active_offer: Some(id),
                    detail_loading,
                    ..self
                }
            }
            Action::DetailsReady(id) => {
                if self.active_offer.as_deref() != Some(id.as_str()) {
                    debug!(offer = %id, "Ignoring detail view for an offer that is no longer open");
                    return self;
                }
                Self { detail_loading: false, ..self }
            }
            Action::CloseDetails => Self {
                active_offer: None,
                detail_loading: false,
                ..self
            },
            Action::DismissNotice => Self { notice: None, ..self },
        }
    }

    fn with_results(self, destination: String, results: Vec<FlightOffer>) -> Self {
        let range = filter::price_range(&results);
        info!(
            received = results.len(),
            min_price = range.map(|r| r.min),
            max_price = range.map(|r| r.max),
            avg_price = range.map(|r| r.avg),
            max_price_filter = self.filters.max_price,
            "Received flight offers"
        );

        let mut filters = self.filters.clone();
        if let Some(adjusted) = filter::auto_adjusted_max_price(&results, filters.max_price) {
            info!(max_price = adjusted, "Raised max price filter to show all results");
            filters.max_price = adjusted;
        }

        let offers = apply_filters(&results, &filters, &destination);
        debug!(visible = offers.len(), "Applied filters to new results");

        let notice = if results.is_empty() {
            Some(Notice::api(no_results_message(&self.form)))
        } else if offers.is_empty() {
            Some(Notice::user(format!(
                "Found {} flights, but all were filtered out by your filters. Try adjusting stops or airline filters.",
                results.len()
            )))
        } else {
            None
        };

        Self {
            all_offers: results,
            offers,
            destination,
            dates: self.pending_dates,
            filters,
            loading: false,
            notice,
            ..self
        }
    }

    /// Filtered offers in the selected order
    pub fn visible_offers(&self) -> Vec<FlightOffer> {
        sort_offers(&self.offers, self.sort, &self.destination)
    }

    pub fn price_trend(&self) -> Vec<PriceTrendPoint> {
        price_trend(&self.offers, self.dates.departure, self.dates.return_date)
    }

    pub fn airline_options(&self) -> Vec<String> {
        filter::airline_options(&self.all_offers)
    }

    pub fn price_slider_max(&self) -> f64 {
        filter::price_slider_max(&self.all_offers, self.filters.max_price)
    }

    pub fn active_offer(&self) -> Option<&FlightOffer> {
        let id = self.active_offer.as_deref()?;
        self.all_offers.iter().find(|offer| offer.id == id)
    }

    pub fn detail_delay(&self) -> Duration {
        self.detail_delay
    }
}

fn no_results_message(form: &SearchForm) -> String {
    format!(
        "No flights found for {} adult{} and {} child{}. Try adjusting your search criteria or reducing the number of passengers.",
        form.adults,
        if form.adults == 1 { "" } else { "s" },
        form.children,
        if form.children == 1 { "" } else { "ren" },
    )
}
