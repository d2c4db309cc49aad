use crate::occupancy::DayOccupancy;
use crate::reservation::CarId;
use crate::slots::{self, Preset};

/// The in-progress slot selection for one booking session.
///
/// Modelled as a tagged union so that illegal combinations (a preset tag
/// without a car, slots spread over both cars) cannot exist. Created empty
/// when the booking flow opens, discarded on submit or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Single {
        car: CarId,
        hour: u32,
    },
    Range {
        car: CarId,
        hours: Vec<u32>,
        preset: Option<Preset>,
    },
}

/// What a slot click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Occupied or out-of-range slot; nothing changed.
    Ignored,
    /// Selection restarted at the clicked slot.
    Selected,
    /// The anchor and the clicked slot closed into a contiguous free range.
    RangeSelected,
    /// The range crossed an occupied slot; only the clicked slot was kept.
    RangeRejected,
}

impl Selection {
    /// Apply one click on `hour` of `car`. Two-click semantics: a first
    /// click anchors a single slot, a second click on the same car closes
    /// the inclusive range between them (order-independent); any further
    /// click restarts. Switching cars restarts. A manual click always drops
    /// an active preset tag.
    pub fn click(&mut self, car: CarId, hour: u32, occupancy: &DayOccupancy) -> ClickOutcome {
        if !slots::is_bookable(hour) || occupancy.is_occupied(car, hour) {
            return ClickOutcome::Ignored;
        }

        match *self {
            Selection::Single {
                car: anchor_car,
                hour: anchor,
            } if anchor_car == car && anchor != hour => {
                let (lo, hi) = if anchor < hour { (anchor, hour) } else { (hour, anchor) };
                if (lo..=hi).any(|h| occupancy.is_occupied(car, h)) {
                    *self = Selection::Single { car, hour };
                    ClickOutcome::RangeRejected
                } else {
                    *self = Selection::Range {
                        car,
                        hours: (lo..=hi).collect(),
                        preset: None,
                    };
                    ClickOutcome::RangeSelected
                }
            }
            _ => {
                *self = Selection::Single { car, hour };
                ClickOutcome::Selected
            }
        }
    }

    /// Run the allocator for `preset` and take its slot list. On success
    /// returns the chosen car (reapplying the same preset is idempotent);
    /// when neither car can host the block the selection is cleared and
    /// `None` is returned.
    pub fn apply_preset(&mut self, preset: Preset, occupancy: &DayOccupancy) -> Option<CarId> {
        match slots::choose_car(preset, occupancy) {
            Some(car) => {
                *self = Selection::Range {
                    car,
                    hours: preset.hours().to_vec(),
                    preset: Some(preset),
                };
                Some(car)
            }
            None => {
                *self = Selection::Empty;
                None
            }
        }
    }

    /// Cancel / modal close: drop everything.
    pub fn clear(&mut self) {
        *self = Selection::Empty;
    }

    pub fn car(&self) -> Option<CarId> {
        match self {
            Selection::Empty => None,
            Selection::Single { car, .. } | Selection::Range { car, .. } => Some(*car),
        }
    }

    pub fn selected_hours(&self) -> Vec<u32> {
        match self {
            Selection::Empty => Vec::new(),
            Selection::Single { hour, .. } => vec![*hour],
            Selection::Range { hours, .. } => hours.clone(),
        }
    }

    pub fn preset(&self) -> Option<Preset> {
        match self {
            Selection::Range { preset, .. } => *preset,
            _ => None,
        }
    }

    /// Collapse to `(car, start hour, session count)` for the request
    /// builder; `None` while nothing is selected.
    pub fn finalize(&self) -> Option<(CarId, u32, u32)> {
        match self {
            Selection::Empty => None,
            Selection::Single { car, hour } => Some((*car, *hour, 1)),
            Selection::Range { car, hours, .. } => {
                Some((*car, hours[0], hours.len() as u32))
            }
        }
    }
}
