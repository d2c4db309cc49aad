use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MotorpoolError, Result};
use crate::slots;

/// The cars live in a fixed civil timezone (KST). Every naive timestamp is
/// interpreted here, and every outgoing timestamp is rendered here,
/// regardless of the host machine's local offset.
pub const FLEET_UTC_OFFSET_HOURS: i32 = 9;

pub fn fleet_offset() -> FixedOffset {
    FixedOffset::east_opt(FLEET_UTC_OFFSET_HOURS * 3600).expect("+09:00 is a valid offset")
}

/// One of the two interchangeable pool cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CarId {
    One,
    Two,
}

impl CarId {
    pub const ALL: [CarId; 2] = [CarId::One, CarId::Two];

    pub fn number(self) -> u32 {
        match self {
            CarId::One => 1,
            CarId::Two => 2,
        }
    }

    pub fn from_number(n: u32) -> Option<CarId> {
        match n {
            1 => Some(CarId::One),
            2 => Some(CarId::Two),
            _ => None,
        }
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car {}", self.number())
    }
}

/// A reservation row as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub target: u32,
    pub emailaddress: String,
    pub time: String,
    pub session: u32,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Reservation {
    pub fn is_car(&self) -> bool {
        self.kind == "car"
    }

    /// Start instant in the fleet timezone, or `None` for an unparseable row.
    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_reservation_time(&self.time).map(|dt| dt.with_timezone(&fleet_offset()))
    }
}

/// Parse a backend timestamp. Explicit offsets (including `Z`) are honoured
/// as written; naive timestamps, with either `T` or a space between date and
/// time, are taken to be fleet civil time.
pub fn parse_reservation_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    let normalized = raw.replacen(' ', "T", 1);
    let naive = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M"))
        .ok()?;

    naive.and_local_timezone(fleet_offset()).single()
}

/// Body for `POST /api/reservation_create`. `id` and `created_at` are
/// server-generated and therefore absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: u32,
    pub emailaddress: String,
    pub time: String,
    pub session: u32,
    pub reason: String,
}

impl NewReservation {
    /// Build a car-reservation request from a finalized slot selection.
    ///
    /// The start hour and the whole run must fall inside the bookable day;
    /// a violation is a typed error rather than a silent bad request.
    pub fn for_slots(
        date: NaiveDate,
        car: CarId,
        start_hour: u32,
        sessions: u32,
        email: &str,
        reason: &str,
    ) -> Result<Self> {
        if !slots::is_bookable(start_hour) {
            return Err(MotorpoolError::Slot(format!(
                "{} is outside the bookable day ({}-{})",
                slots::hour_label(start_hour),
                slots::hour_label(slots::FIRST_HOUR),
                slots::hour_label(slots::LAST_HOUR),
            )));
        }
        if sessions == 0 {
            return Err(MotorpoolError::Slot(
                "a reservation must cover at least one hour".to_string(),
            ));
        }
        if !slots::is_bookable(start_hour + sessions - 1) {
            return Err(MotorpoolError::Slot(format!(
                "a {}-hour run from {} ends past {}",
                sessions,
                slots::hour_label(start_hour),
                slots::hour_label(slots::LAST_HOUR + 1),
            )));
        }

        let naive = date
            .and_hms_opt(start_hour, 0, 0)
            .expect("bookable hours are valid times of day");
        let start = naive
            .and_local_timezone(fleet_offset())
            .single()
            .expect("fixed offsets map local times uniquely");

        Ok(Self {
            kind: "car".to_string(),
            target: car.number(),
            emailaddress: email.to_string(),
            time: start.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            session: sessions,
            reason: reason.to_string(),
        })
    }
}
