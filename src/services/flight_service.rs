use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Flight facts used to pre-fill the pickup time on the flight step.
/// Strictly non-critical: every failure here returns `None` and the wizard
/// carries on with whatever the customer typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightStatus {
    pub flight_number: String,
    pub airline: Option<String>,
    pub status: Option<String>,
    pub scheduled_arrival: Option<String>,
    pub estimated_arrival: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AviationstackResponse {
    data: Vec<AviationstackFlight>,
}

#[derive(Debug, Deserialize)]
struct AviationstackFlight {
    flight_status: Option<String>,
    airline: Option<AviationstackAirline>,
    flight: Option<AviationstackFlightIdent>,
    arrival: Option<AviationstackArrival>,
}

#[derive(Debug, Deserialize)]
struct AviationstackAirline {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AviationstackFlightIdent {
    iata: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AviationstackArrival {
    scheduled: Option<String>,
    estimated: Option<String>,
}

pub struct FlightService {
    http_client: reqwest::Client,
    config: AppConfig,
}

impl FlightService {
    pub fn new(config: AppConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            config,
        }
    }

    pub async fn lookup(&self, flight_number: &str) -> Option<FlightStatus> {
        if !self.config.flight_lookup_enabled() {
            log::debug!("Flight lookup disabled, skipping {}", flight_number);
            return None;
        }
        let api_key = self.config.flight_api_key.as_deref()?;

        let url = format!(
            "https://api.aviationstack.com/v1/flights?access_key={}&flight_iata={}",
            api_key, flight_number
        );

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Flight lookup failed for {}: {}", flight_number, e);
                return None;
            }
        };

        let parsed: AviationstackResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Flight lookup parse failed for {}: {}", flight_number, e);
                return None;
            }
        };

        let flight = parsed.data.into_iter().next()?;

        Some(FlightStatus {
            flight_number: flight
                .flight
                .and_then(|f| f.iata)
                .unwrap_or_else(|| flight_number.to_string()),
            airline: flight.airline.and_then(|a| a.name),
            status: flight.flight_status,
            scheduled_arrival: flight.arrival.as_ref().and_then(|a| a.scheduled.clone()),
            estimated_arrival: flight.arrival.as_ref().and_then(|a| a.estimated.clone()),
        })
    }
}
