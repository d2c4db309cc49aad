use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::calendar::month_bounds;
use crate::config::Config;
use crate::error::{MotorpoolError, Result};
use crate::reservation::{NewReservation, Reservation};

#[derive(Clone)]
pub struct ReservationClient {
    client: Client,
    config: Config,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    success: bool,
    #[serde(default)]
    data: Vec<Reservation>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReservationResponse {
    success: bool,
    data: Option<Reservation>,
    message: Option<String>,
}

impl ReservationClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.api.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Fetch car reservations between two dates (inclusive).
    pub async fn fetch_calendar(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<Reservation>> {
        let url = format!("{}/api/reservation_calendar", self.config.api.base_url);

        debug!("Fetching reservations {} to {}", date_from, date_to);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("date_from", date_from.format("%Y-%m-%d").to_string()),
                ("date_to", format!("{}T23:59:59", date_to.format("%Y-%m-%d"))),
                ("type", "car".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MotorpoolError::Api(format!(
                "Failed to fetch calendar: {}",
                response.status()
            )));
        }

        let body: CalendarResponse = response.json().await?;
        if !body.success {
            return Err(MotorpoolError::Api(
                body.message
                    .unwrap_or_else(|| "Calendar fetch rejected".to_string()),
            ));
        }

        Ok(body.data)
    }

    /// Fetch a display month, padded by seven days on each side so the
    /// leading and trailing grid cells have occupancy too.
    pub async fn fetch_month(&self, year: i32, month: u32) -> Result<Vec<Reservation>> {
        let (first, last) = month_bounds(year, month);
        self.fetch_calendar(first - Duration::days(7), last + Duration::days(7))
            .await
    }

    /// Submit a reservation. A server-side rejection (including a slot taken
    /// between fetch and submit) comes back as an `Api` error carrying the
    /// server's message verbatim.
    pub async fn create_reservation(&self, request: &NewReservation) -> Result<Reservation> {
        let url = format!("{}/api/reservation_create", self.config.api.base_url);

        debug!(
            "Submitting reservation: car {} at {} for {}h",
            request.target, request.time, request.session
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ReservationResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("status {}", status));
            return Err(MotorpoolError::Api(message));
        }

        let body: ReservationResponse = response.json().await?;
        if !body.success {
            return Err(MotorpoolError::Api(
                body.message
                    .unwrap_or_else(|| "Reservation rejected".to_string()),
            ));
        }

        body.data
            .ok_or_else(|| MotorpoolError::Api("No reservation in response".to_string()))
    }

    pub async fn get_reservation(&self, id: u64) -> Result<Reservation> {
        let url = format!("{}/api/reservations/{}", self.config.api.base_url, id);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(MotorpoolError::Api(format!(
                "Failed to fetch reservation {}: {}",
                id,
                response.status()
            )));
        }

        let body: ReservationResponse = response.json().await?;
        if !body.success {
            return Err(MotorpoolError::Api(
                body.message
                    .unwrap_or_else(|| format!("Reservation {} not found", id)),
            ));
        }

        body.data
            .ok_or_else(|| MotorpoolError::Api("No reservation in response".to_string()))
    }

    pub async fn cancel_reservation(&self, id: u64) -> Result<()> {
        let url = format!("{}/api/reservations/{}", self.config.api.base_url, id);

        debug!("Cancelling reservation {}", id);

        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(MotorpoolError::Api(format!(
                "Failed to cancel reservation {}: {}",
                id,
                response.status()
            )));
        }

        let body: ReservationResponse = response.json().await?;
        if !body.success {
            return Err(MotorpoolError::Api(
                body.message
                    .unwrap_or_else(|| format!("Cancel of {} rejected", id)),
            ));
        }

        Ok(())
    }
}
