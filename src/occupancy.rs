use chrono::{NaiveDate, Timelike};
use std::collections::BTreeSet;
use tracing::debug;

use crate::reservation::{CarId, Reservation};

/// Occupied start hours for both cars on one calendar day.
///
/// Always rebuilt wholesale from the latest reservation snapshot; never
/// patched incrementally. The local occupancy view is a responsiveness hint,
/// the server remains the authority on conflicts at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOccupancy {
    car1: BTreeSet<u32>,
    car2: BTreeSet<u32>,
}

impl DayOccupancy {
    /// Index `car`-type reservations whose fleet-local date matches `date`.
    /// Each reservation occupies the hours `[start, start + session)`.
    pub fn build(reservations: &[Reservation], date: NaiveDate) -> Self {
        let mut occupancy = Self::default();

        for res in reservations.iter().filter(|r| r.is_car()) {
            let Some(car) = CarId::from_number(res.target) else {
                continue;
            };
            let Some(start) = res.start_time() else {
                debug!(
                    "Skipping reservation {} with unparseable time '{}'",
                    res.id, res.time
                );
                continue;
            };
            if start.date_naive() != date {
                continue;
            }

            let hours = occupancy.hours_mut(car);
            for hour in start.hour()..start.hour() + res.session {
                hours.insert(hour);
            }
        }

        occupancy
    }

    pub fn for_car(&self, car: CarId) -> &BTreeSet<u32> {
        match car {
            CarId::One => &self.car1,
            CarId::Two => &self.car2,
        }
    }

    pub fn is_occupied(&self, car: CarId, hour: u32) -> bool {
        self.for_car(car).contains(&hour)
    }

    /// Number of occupied hours, the allocator's load measure.
    pub fn count(&self, car: CarId) -> usize {
        self.for_car(car).len()
    }

    fn hours_mut(&mut self, car: CarId) -> &mut BTreeSet<u32> {
        match car {
            CarId::One => &mut self.car1,
            CarId::Two => &mut self.car2,
        }
    }
}
