use clap::ValueEnum;
use std::collections::BTreeSet;

use crate::occupancy::DayOccupancy;
use crate::reservation::CarId;

/// The bookable day runs 09:00 through 17:00, nine one-hour slots.
pub const FIRST_HOUR: u32 = 9;
pub const LAST_HOUR: u32 = 17;
pub const DAY_HOURS: [u32; 9] = [9, 10, 11, 12, 13, 14, 15, 16, 17];

/// The morning and afternoon presets skip the lunch hour; it stays bookable
/// by hand and is part of the all-day block.
pub const LUNCH_HOUR: u32 = 12;

pub fn is_bookable(hour: u32) -> bool {
    (FIRST_HOUR..=LAST_HOUR).contains(&hour)
}

/// Slot label as the backend and the booking UI spell it, e.g. `"09:00"`.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Parse a `"HH:00"` label back to its hour. Minutes other than `00` are
/// rejected; slots are whole hours.
pub fn parse_hour_label(label: &str) -> Option<u32> {
    let (hour, minute) = label.split_once(':')?;
    if minute != "00" {
        return None;
    }
    hour.parse().ok()
}

/// Render occupied hours as inclusive-start, exclusive-end ranges,
/// e.g. `{9, 10, 14}` becomes `"09:00-11:00, 14:00-15:00"`.
pub fn format_hour_runs(hours: &BTreeSet<u32>) -> String {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &hour in hours {
        match runs.last_mut() {
            Some((_, end)) if *end == hour => *end = hour + 1,
            _ => runs.push((hour, hour + 1)),
        }
    }
    runs.iter()
        .map(|(start, end)| format!("{}-{}", hour_label(*start), hour_label(*end)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A common booking pattern, expanded to a fixed slot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Morning,
    Afternoon,
    #[value(name = "allday")]
    AllDay,
}

impl Preset {
    pub fn hours(self) -> &'static [u32] {
        match self {
            Preset::Morning => &[9, 10, 11],
            Preset::Afternoon => &[13, 14, 15, 16, 17],
            Preset::AllDay => &DAY_HOURS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Morning => "morning",
            Preset::Afternoon => "afternoon",
            Preset::AllDay => "allday",
        }
    }
}

/// Pick the car to host a preset block, or `None` when neither fits.
///
/// When both cars are free for the whole block, the one already carrying
/// more reservations takes it, leaving the quieter car open for ad hoc
/// single-slot bookings. A tie goes to car 1.
pub fn choose_car(preset: Preset, occupancy: &DayOccupancy) -> Option<CarId> {
    let eligible =
        |car: CarId| preset.hours().iter().all(|&h| !occupancy.is_occupied(car, h));

    match (eligible(CarId::One), eligible(CarId::Two)) {
        (true, true) => {
            if occupancy.count(CarId::One) >= occupancy.count(CarId::Two) {
                Some(CarId::One)
            } else {
                Some(CarId::Two)
            }
        }
        (true, false) => Some(CarId::One),
        (false, true) => Some(CarId::Two),
        (false, false) => None,
    }
}
