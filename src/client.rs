//! HTTP client and response normalizer for the Amadeus flight-offers API

use crate::config::AmadeusConfig;
use crate::{
    BaggageAllowance, CabinClass, FlightError, FlightOffer, FlightSegment, SearchParams,
    TravelerPricing, TravelerType,
};
use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Main client for making requests to Amadeus
pub struct AmadeusClient {
    http_client: Client,
    config: AmadeusConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl AmadeusClient {
    /// Create a new client
    pub fn new(config: AmadeusConfig) -> Result<Self, FlightError> {
        debug!("Creating new Amadeus client");
        let http_client = Client::builder()
            .user_agent(concat!("flight-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client, config })
    }

    /// Exchange the client credentials for a bearer token
    #[instrument(level = "debug", skip(self))]
    pub async fn access_token(&self) -> Result<String, FlightError> {
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id.as_deref(), self.config.client_secret.as_deref())
        else {
            error!("Amadeus credentials are not configured");
            return Err(FlightError::MissingCredentials);
        };

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .http_client
            .post(&self.config.auth_url)
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Amadeus auth request failed");
            return Err(FlightError::AuthError {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        debug!("Obtained Amadeus access token");
        Ok(token.access_token)
    }

    /// Search flight offers and normalize them
    #[instrument(level = "info", skip(self, params), fields(
        origin = %params.origin_location_code,
        destination = %params.destination_location_code,
        departure = %params.departure_date,
    ))]
    pub async fn search_flights(&self, params: &SearchParams) -> Result<Vec<FlightOffer>, FlightError> {
        let token = self.access_token().await?;

        let query = build_query(params);
        info!(url = %self.config.offers_url, "Making flight-offers request to Amadeus");

        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&self.config.offers_url)
            .query(&query)
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        let request_duration = start_time.elapsed();

        info!(
            status = %status,
            duration_ms = request_duration.as_millis(),
            "HTTP request completed"
        );

        let body = response.text().await?;
        if !status.is_success() {
            let message = FlightOfferParser::error_message(status, &body);
            error!(status = %status, error = %message, "Amadeus flight search failed");
            return Err(FlightError::ApiError(message));
        }

        let offers = FlightOfferParser::new().parse_response(&body)?;
        info!(
            offers_found = offers.len(),
            adults = params.adults,
            children = params.children.unwrap_or(0),
            "Flight offers normalized"
        );
        Ok(offers)
    }
}

fn build_query(params: &SearchParams) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("originLocationCode", params.origin_location_code.clone()),
        ("destinationLocationCode", params.destination_location_code.clone()),
        ("departureDate", params.departure_date.clone()),
    ];
    if let Some(return_date) = &params.return_date {
        query.push(("returnDate", return_date.clone()));
    }
    query.push(("adults", params.adults.to_string()));
    if let Some(children) = params.children.filter(|c| *c > 0) {
        query.push(("children", children.to_string()));
    }
    if let Some(class) = params.travel_class {
        query.push(("travelClass", class.as_api_str().to_string()));
    }
    if let Some(currency) = &params.currency_code {
        query.push(("currencyCode", currency.clone()));
    }
    if let Some(max) = params.max {
        query.push(("max", max.to_string()));
    }
    query
}

// Raw provider payload. Every field is optional: the normalizer fills gaps
// with defaults instead of rejecting the offer.

#[derive(Debug, Default, Deserialize)]
struct RawResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawOffer {
    id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    price: Option<RawPrice>,
    #[serde(deserialize_with = "lenient_list")]
    itineraries: Vec<RawItinerary>,
    #[serde(deserialize_with = "lenient")]
    traveler_pricings: Option<Vec<RawTravelerPricing>>,
    #[serde(deserialize_with = "lenient")]
    class: Option<RawClass>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPrice {
    grand_total: Option<Value>,
    total: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItinerary {
    #[serde(deserialize_with = "lenient_list")]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSegment {
    #[serde(deserialize_with = "lenient")]
    departure: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient")]
    arrival: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient")]
    duration: Option<String>,
    #[serde(deserialize_with = "lenient")]
    number_of_stops: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    carrier_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    number: Option<String>,
    #[serde(deserialize_with = "lenient")]
    cabin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEndpoint {
    #[serde(deserialize_with = "lenient")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTravelerPricing {
    #[serde(deserialize_with = "lenient")]
    traveler_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    price: Option<RawPrice>,
    #[serde(deserialize_with = "lenient_list")]
    fare_details_by_segment: Vec<RawFareDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFareDetails {
    #[serde(deserialize_with = "lenient")]
    cabin: Option<String>,
    #[serde(deserialize_with = "lenient")]
    included_checked_bags: Option<RawBags>,
}

/// A field of the wrong shape becomes `None` instead of failing its offer.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the well-formed elements of a list; anything but an array is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBags {
    Count(u32),
    Detailed { quantity: Option<u32> },
}

impl RawBags {
    fn quantity(&self) -> u32 {
        match self {
            RawBags::Count(n) => *n,
            RawBags::Detailed { quantity } => quantity.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawClass {
    One(String),
    Many(Vec<String>),
}

impl RawClass {
    fn first(&self) -> Option<&str> {
        match self {
            RawClass::One(s) => Some(s),
            RawClass::Many(v) => v.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApiError {
    code: Option<i64>,
    title: Option<String>,
    detail: Option<String>,
    source: Option<RawErrorSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawErrorSource {
    pointer: Option<String>,
    parameter: Option<String>,
    example: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawErrorBody {
    errors: Option<Vec<RawApiError>>,
    error_description: Option<String>,
}

/// Converts Amadeus payloads into [`FlightOffer`]s and readable errors
#[derive(Debug, Default, Clone, Copy)]
pub struct FlightOfferParser;

impl FlightOfferParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a successful flight-offers response body.
    ///
    /// A body without a `data` array yields no offers; provider warnings in
    /// `errors` are logged and otherwise ignored.
    pub fn parse_response(&self, body: &str) -> Result<Vec<FlightOffer>, FlightError> {
        let response: RawResponse = serde_json::from_str(body)?;

        if !response.errors.is_empty() {
            warn!(errors = ?response.errors, "Amadeus returned errors alongside data");
        }

        let Some(Value::Array(items)) = response.data else {
            info!("No flight data in response");
            return Ok(Vec::new());
        };

        let mut offers = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<RawOffer>(item) {
                Ok(raw) => offers.push(self.normalize_offer(raw)),
                Err(e) => warn!(error = %e, "Skipping malformed flight offer"),
            }
        }

        debug!(offers = offers.len(), "Normalized flight offers");
        Ok(offers)
    }

    fn normalize_offer(&self, raw: RawOffer) -> FlightOffer {
        let segments: Vec<FlightSegment> = raw
            .itineraries
            .iter()
            .flat_map(|itinerary| itinerary.segments.iter())
            .map(normalize_segment)
            .collect();

        let currency = raw
            .price
            .as_ref()
            .and_then(|p| p.currency.clone())
            .unwrap_or_else(|| "USD".to_string());

        let price = raw
            .price
            .as_ref()
            .and_then(|p| p.grand_total.as_ref())
            .map_or(0.0, value_as_f64);

        let traveler_pricings = raw.traveler_pricings.as_ref().map(|pricings| {
            pricings
                .iter()
                .map(|tp| normalize_traveler_pricing(tp, raw.price.as_ref()))
                .collect()
        });

        let first_pricing = raw.traveler_pricings.as_ref().and_then(|p| p.first());
        let first_fare = first_pricing.and_then(|tp| tp.fare_details_by_segment.first());

        let cabin_class = first_fare
            .and_then(|fare| known_cabin(fare.cabin.as_deref()))
            .or_else(|| known_cabin(raw.class.as_ref().and_then(RawClass::first)))
            .or_else(|| {
                let first_segment = raw.itineraries.first()?.segments.first()?;
                known_cabin(first_segment.cabin.as_deref())
            });

        let checked_bags = first_fare
            .and_then(|fare| fare.included_checked_bags.as_ref())
            .map_or(0, RawBags::quantity);
        let baggage_allowance = (checked_bags > 0 || first_pricing.is_some()).then_some(BaggageAllowance {
            checked_bags,
            carry_on_bags: 1,
        });

        let airline = segments
            .first()
            .map(|seg| seg.carrier_code.clone())
            .unwrap_or_else(|| "Unknown airline".to_string());

        FlightOffer {
            id: raw.id.as_ref().map(value_as_string).unwrap_or_default(),
            price,
            currency,
            airline,
            segments,
            traveler_pricings,
            cabin_class,
            baggage_allowance,
        }
    }

    /// Readable message for a failed flight-offers response
    pub fn error_message(status: StatusCode, body: &str) -> String {
        let fallback = format!(
            "Amadeus flight search error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string();

        let parsed: RawErrorBody = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(_) => {
                let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
                return if body.chars().count() > ERROR_BODY_PREVIEW_CHARS {
                    format!("{} – {}...", fallback, preview)
                } else {
                    format!("{} – {}", fallback, body)
                };
            }
        };

        if let Some(errors) = parsed.errors {
            return errors.iter().map(friendly_error).collect::<Vec<_>>().join(". ");
        }

        parsed.error_description.unwrap_or(fallback)
    }
}

fn friendly_error(err: &RawApiError) -> String {
    let field = err
        .source
        .as_ref()
        .and_then(|s| s.pointer.as_deref().or(s.parameter.as_deref()))
        .map(|f| f.trim_start_matches('/'))
        .unwrap_or("");
    let detail_or = |default: &str| {
        err.detail
            .clone()
            .or_else(|| err.title.clone())
            .unwrap_or_else(|| default.to_string())
    };

    match err.code {
        Some(477) if matches!(field, "originLocationCode" | "destinationLocationCode") => {
            let example = err
                .source
                .as_ref()
                .and_then(|s| s.example.as_deref())
                .unwrap_or("LHE");
            format!("Invalid airport code. Please use a 3-letter IATA code (e.g., {})", example)
        }
        Some(477) if matches!(field, "departureDate" | "returnDate") => {
            "Invalid date format. Please select a valid date.".to_string()
        }
        Some(477) => detail_or("Invalid format"),
        Some(492) => "Invalid date. Please select a valid departure date.".to_string(),
        Some(493) => "Return date must be after departure date.".to_string(),
        _ => detail_or("An error occurred"),
    }
}

fn normalize_segment(raw: &RawSegment) -> FlightSegment {
    let endpoint = |e: &Option<RawEndpoint>| {
        let code = e.as_ref().and_then(|e| e.iata_code.clone()).unwrap_or_default();
        let at = e.as_ref().and_then(|e| e.at.clone()).unwrap_or_default();
        (code, at)
    };
    let (departure_airport, departure_time) = endpoint(&raw.departure);
    let (arrival_airport, arrival_time) = endpoint(&raw.arrival);

    FlightSegment {
        departure_airport,
        arrival_airport,
        departure_time,
        arrival_time,
        duration: raw.duration.clone().unwrap_or_default(),
        number_of_stops: raw.number_of_stops.unwrap_or(0),
        carrier_code: raw.carrier_code.clone().unwrap_or_default(),
        flight_number: raw.number.clone().unwrap_or_default(),
    }
}

fn normalize_traveler_pricing(raw: &RawTravelerPricing, offer_price: Option<&RawPrice>) -> TravelerPricing {
    let currency = raw
        .price
        .as_ref()
        .and_then(|p| p.currency.clone())
        .or_else(|| offer_price.and_then(|p| p.currency.clone()))
        .unwrap_or_else(|| "USD".to_string());

    TravelerPricing {
        traveler_type: raw
            .traveler_type
            .as_deref()
            .map_or(TravelerType::Adult, TravelerType::from_api_str),
        price: raw
            .price
            .as_ref()
            .and_then(|p| p.total.as_ref())
            .map_or(0.0, value_as_f64),
        currency,
        included_checked_bags: raw
            .fare_details_by_segment
            .first()
            .and_then(|fare| fare.included_checked_bags.as_ref())
            .map(RawBags::quantity),
    }
}

fn known_cabin(code: Option<&str>) -> Option<CabinClass> {
    match code? {
        "ECONOMY" => Some(CabinClass::Economy),
        "PREMIUM_ECONOMY" => Some(CabinClass::PremiumEconomy),
        "BUSINESS" => Some(CabinClass::Business),
        "FIRST" => Some(CabinClass::First),
        _ => None,
    }
}

/// Amadeus sends amounts as decimal strings; accept plain numbers too.
/// Anything that is not a finite, non-negative amount counts as 0.
fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite() && *amount >= 0.0)
    .unwrap_or(0.0)
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "meta": { "count": 2 },
        "data": [
            {
                "type": "flight-offer",
                "id": "1",
                "price": { "currency": "EUR", "total": "612.40", "grandTotal": "612.40" },
                "itineraries": [
                    { "duration": "PT9H30M", "segments": [
                        { "departure": { "iataCode": "LHE", "at": "2024-06-01T03:10:00" },
                          "arrival": { "iataCode": "DXB", "at": "2024-06-01T05:40:00" },
                          "carrierCode": "EK", "number": "623", "duration": "PT3H30M", "numberOfStops": 0 },
                        { "departure": { "iataCode": "DXB", "at": "2024-06-01T08:30:00" },
                          "arrival": { "iataCode": "MUC", "at": "2024-06-01T12:40:00" },
                          "carrierCode": "EK", "number": "51", "duration": "PT6H10M" }
                    ]},
                    { "segments": [
                        { "departure": { "iataCode": "MUC", "at": "2024-06-10T15:00:00" },
                          "arrival": { "iataCode": "LHE", "at": "2024-06-11T04:00:00" },
                          "carrierCode": "EK", "number": "52", "duration": "PT10H" }
                    ]}
                ],
                "travelerPricings": [
                    { "travelerType": "ADULT", "price": { "currency": "EUR", "total": "400.00" },
                      "fareDetailsBySegment": [ { "cabin": "ECONOMY", "includedCheckedBags": { "quantity": 2 } } ] },
                    { "travelerType": "CHILD", "price": { "total": "212.40" },
                      "fareDetailsBySegment": [ { "cabin": "ECONOMY", "includedCheckedBags": 1 } ] }
                ]
            },
            {
                "id": 2,
                "price": { "grandTotal": 99.5 },
                "class": ["BUSINESS"],
                "itineraries": []
            }
        ],
        "dictionaries": {}
    }"#;

    #[test]
    fn test_parse_response() {
        let offers = FlightOfferParser::new().parse_response(RESPONSE).unwrap();
        assert_eq!(offers.len(), 2);

        let first = &offers[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.price, 612.40);
        assert_eq!(first.currency, "EUR");
        assert_eq!(first.airline, "EK");
        assert_eq!(first.segments.len(), 3);
        assert_eq!(first.segments[1].arrival_airport, "MUC");
        assert_eq!(first.segments[2].departure_time, "2024-06-10T15:00:00");
        assert_eq!(first.cabin_class, Some(CabinClass::Economy));
        assert_eq!(
            first.baggage_allowance,
            Some(BaggageAllowance { checked_bags: 2, carry_on_bags: 1 })
        );

        let pricings = first.traveler_pricings.as_ref().unwrap();
        assert_eq!(pricings[0].traveler_type, TravelerType::Adult);
        assert_eq!(pricings[0].price, 400.0);
        assert_eq!(pricings[0].included_checked_bags, Some(2));
        assert_eq!(pricings[1].traveler_type, TravelerType::Child);
        assert_eq!(pricings[1].currency, "EUR");
        assert_eq!(pricings[1].included_checked_bags, Some(1));
    }

    #[test]
    fn test_parse_sparse_offer() {
        let offers = FlightOfferParser::new().parse_response(RESPONSE).unwrap();
        let sparse = &offers[1];
        assert_eq!(sparse.id, "2");
        assert_eq!(sparse.price, 99.5);
        assert_eq!(sparse.currency, "USD");
        assert_eq!(sparse.airline, "Unknown airline");
        assert!(sparse.segments.is_empty());
        assert_eq!(sparse.cabin_class, Some(CabinClass::Business));
        assert!(sparse.traveler_pricings.is_none());
        assert!(sparse.baggage_allowance.is_none());
    }

    #[test]
    fn test_missing_data_is_empty() {
        let parser = FlightOfferParser::new();
        assert!(parser.parse_response(r#"{"meta": {}}"#).unwrap().is_empty());
        assert!(parser.parse_response(r#"{"data": {"oops": 1}}"#).unwrap().is_empty());
        assert!(parser.parse_response("not json").is_err());
    }

    #[test]
    fn test_unknown_cabin_is_dropped() {
        let body = r#"{"data": [{"id": "9", "class": "COACH",
            "itineraries": [{"segments": [{"carrierCode": "LH", "cabin": "FIRST"}]}]}]}"#;
        let offers = FlightOfferParser::new().parse_response(body).unwrap();
        assert_eq!(offers[0].cabin_class, Some(CabinClass::First));
    }

    #[test]
    fn test_non_finite_amounts_become_zero() {
        let body = r#"{"data": [
            {"id": "nan", "price": {"grandTotal": "NaN"}},
            {"id": "inf", "price": {"grandTotal": "inf", "total": "-inf"}},
            {"id": "neg", "price": {"grandTotal": "-12.50"}},
            {"id": "ok", "price": {"grandTotal": 310.5},
             "travelerPricings": [{"travelerType": "ADULT", "price": {"total": "NaN"}}]}
        ]}"#;
        let offers = FlightOfferParser::new().parse_response(body).unwrap();

        let prices: Vec<f64> = offers.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![0.0, 0.0, 0.0, 310.5]);
        let pricings = offers[3].traveler_pricings.as_ref().unwrap();
        assert_eq!(pricings[0].price, 0.0);
    }

    #[test]
    fn test_mistyped_fields_keep_the_offer() {
        let body = r#"{"data": [
            {"id": "1", "price": {"grandTotal": "250.00", "currency": 978},
             "itineraries": [{"segments": [
                {"departure": {"iataCode": "LHE", "at": "2024-06-01T03:10:00"},
                 "arrival": {"iataCode": "MUC", "at": "2024-06-01T12:40:00"},
                 "carrierCode": "PK", "number": 791, "duration": "PT9H30M", "numberOfStops": "0"}
             ]}],
             "travelerPricings": [{"travelerType": "ADULT", "price": {"total": "250.00"},
                "fareDetailsBySegment": [{"cabin": "ECONOMY", "includedCheckedBags": {"quantity": -1}}]}]},
            {"id": "2", "price": {"grandTotal": "300.00"},
             "itineraries": [{"segments": [{"carrierCode": "LH", "numberOfStops": 1}, "garbage"]}, 7]}
        ]}"#;
        let offers = FlightOfferParser::new().parse_response(body).unwrap();
        assert_eq!(offers.len(), 2);

        let first = &offers[0];
        assert_eq!(first.price, 250.0);
        assert_eq!(first.currency, "USD");
        assert_eq!(first.segments.len(), 1);
        assert_eq!(first.segments[0].number_of_stops, 0);
        assert_eq!(first.segments[0].carrier_code, "PK");
        assert_eq!(first.segments[0].duration, "PT9H30M");
        assert_eq!(first.cabin_class, Some(CabinClass::Economy));
        assert_eq!(first.baggage_allowance.map(|b| b.checked_bags), Some(0));
        assert_eq!(first.traveler_pricings.as_ref().unwrap()[0].included_checked_bags, None);

        let second = &offers[1];
        assert_eq!(second.segments.len(), 1);
        assert_eq!(second.segments[0].number_of_stops, 1);
        assert_eq!(second.airline, "LH");
    }

    #[test]
    fn test_friendly_error_messages() {
        let body = r#"{"errors": [
            {"code": 477, "title": "INVALID FORMAT", "source": {"parameter": "originLocationCode", "example": "PAR"}},
            {"code": 493, "title": "BAD DATE"},
            {"code": 38189, "detail": "Internal error"}
        ]}"#;
        let message = FlightOfferParser::error_message(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            message,
            "Invalid airport code. Please use a 3-letter IATA code (e.g., PAR). \
             Return date must be after departure date. Internal error"
        );
    }

    #[test]
    fn test_error_description_and_raw_bodies() {
        let message = FlightOfferParser::error_message(
            StatusCode::UNAUTHORIZED,
            r#"{"error_description": "Access token expired"}"#,
        );
        assert_eq!(message, "Access token expired");

        let message = FlightOfferParser::error_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(message, "Amadeus flight search error: 502 Bad Gateway – upstream down");

        let long_body = "x".repeat(300);
        let message = FlightOfferParser::error_message(StatusCode::BAD_GATEWAY, &long_body);
        assert!(message.ends_with("..."));
        assert_eq!(message.matches('x').count(), 200);
    }

    #[test]
    fn test_query_parameters() {
        let params = SearchParams {
            origin_location_code: "LHE".to_string(),
            destination_location_code: "MUC".to_string(),
            departure_date: "2024-06-01".to_string(),
            return_date: None,
            adults: 2,
            children: Some(0),
            travel_class: Some(CabinClass::PremiumEconomy),
            currency_code: Some("USD".to_string()),
            max: Some(20),
        };
        let query = build_query(&params);
        let keys: Vec<&str> = query.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["originLocationCode", "destinationLocationCode", "departureDate", "adults", "travelClass", "currencyCode", "max"]
        );
        assert!(query.contains(&("travelClass", "PREMIUM_ECONOMY".to_string())));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client = AmadeusClient::new(AmadeusConfig::default()).unwrap();
        let params = SearchParams {
            origin_location_code: "LHE".to_string(),
            destination_location_code: "MUC".to_string(),
            departure_date: "2024-06-01".to_string(),
            return_date: None,
            adults: 1,
            children: None,
            travel_class: None,
            currency_code: None,
            max: None,
        };
        let result = client.search_flights(&params).await;
        assert!(matches!(result, Err(FlightError::MissingCredentials)));
    }
}
