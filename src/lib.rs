pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod occupancy;
pub mod reservation;
pub mod selection;
pub mod slots;
pub mod watch;
