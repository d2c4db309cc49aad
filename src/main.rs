use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use motorpool::api::ReservationClient;
use motorpool::calendar::build_month_grid;
use motorpool::config::Config;
use motorpool::error::{MotorpoolError, Result};
use motorpool::occupancy::DayOccupancy;
use motorpool::reservation::{CarId, NewReservation};
use motorpool::selection::{ClickOutcome, Selection};
use motorpool::slots::{self, Preset};
use motorpool::watch;

#[derive(Parser)]
#[command(name = "motorpool")]
#[command(about = "Book the shared pool cars from the command line")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month calendar with week numbers and car occupancy
    Month {
        /// Year to show (default: current)
        #[arg(short, long)]
        year: Option<i32>,
        /// Month to show, 1-12 (default: current)
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Show the hourly slot table for one day
    Day {
        /// Date, e.g. 2025-08-07
        date: NaiveDate,
    },
    /// Book a contiguous run of hourly slots on one car
    Book {
        /// Date, e.g. 2025-08-07
        date: NaiveDate,
        /// First slot, e.g. 13:00
        start: String,
        /// Last slot of the range (inclusive); defaults to a single hour
        #[arg(short, long)]
        until: Option<String>,
        /// Car number (1 or 2)
        #[arg(long)]
        car: u32,
        /// Reason recorded with the reservation (default from config)
        #[arg(long)]
        reason: Option<String>,
    },
    /// Book a named block, letting the allocator pick the car
    Preset {
        /// Date, e.g. 2025-08-07
        date: NaiveDate,
        /// morning, afternoon or allday
        preset: Preset,
        /// Reason recorded with the reservation (default from config)
        #[arg(long)]
        reason: Option<String>,
    },
    /// Cancel a reservation by id
    Cancel {
        /// Reservation id
        id: u64,
    },
    /// Poll the calendar and log reservation changes
    Watch {
        /// Year to watch (default: current)
        #[arg(short, long)]
        year: Option<i32>,
        /// Month to watch, 1-12 (default: current)
        #[arg(short, long)]
        month: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("motorpool=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let client = ReservationClient::new(&config);

    match cli.command {
        Commands::Month { year, month } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            if !(1..=12).contains(&month) {
                return Err(MotorpoolError::Config(format!("Invalid month: {}", month)));
            }

            let reservations = client.fetch_month(year, month).await?;
            let grid = build_month_grid(year, month, today);

            println!("\n{}-{:02}\n", year, month);
            println!("{:<5} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}", "Week", "Su", "Mo", "Tu", "We", "Th", "Fr", "Sa");
            for week in grid.chunks(7) {
                print!("W{:<4}", week[0].week_number);
                for cell in week {
                    let marker = if cell.is_today { "*" } else { "" };
                    if cell.in_month {
                        print!(" {:>4}", format!("{}{}", cell.day, marker));
                    } else {
                        print!(" {:>4}", format!("({})", cell.day));
                    }
                }
                println!();
            }

            println!();
            for cell in grid.iter().filter(|c| c.in_month) {
                let occupancy = DayOccupancy::build(&reservations, cell.date);
                for car in CarId::ALL {
                    let hours = occupancy.for_car(car);
                    if !hours.is_empty() {
                        println!(
                            "{}  {}: {}",
                            cell.date.format("%a %d %b"),
                            car,
                            slots::format_hour_runs(hours)
                        );
                    }
                }
            }
        }
        Commands::Day { date } => {
            let reservations = client.fetch_calendar(date, date).await?;
            let occupancy = DayOccupancy::build(&reservations, date);

            println!("\n{}\n", date.format("%A %d %B %Y"));
            println!("{:<8} {:<10} {:<10}", "Slot", "Car 1", "Car 2");
            println!("{}", "-".repeat(28));
            for hour in slots::DAY_HOURS {
                let status = |car| {
                    if occupancy.is_occupied(car, hour) {
                        "booked"
                    } else {
                        "free"
                    }
                };
                println!(
                    "{:<8} {:<10} {:<10}",
                    slots::hour_label(hour),
                    status(CarId::One),
                    status(CarId::Two)
                );
            }
        }
        Commands::Book {
            date,
            start,
            until,
            car,
            reason,
        } => {
            let car = CarId::from_number(car)
                .ok_or_else(|| MotorpoolError::Slot(format!("No such car: {}", car)))?;
            let start_hour = slots::parse_hour_label(&start)
                .ok_or_else(|| MotorpoolError::Slot(format!("Invalid slot '{}'", start)))?;

            let reservations = client.fetch_calendar(date, date).await?;
            let occupancy = DayOccupancy::build(&reservations, date);

            let mut selection = Selection::default();
            if selection.click(car, start_hour, &occupancy) == ClickOutcome::Ignored {
                return Err(MotorpoolError::Slot(format!(
                    "{} on {} is not available on {}",
                    start, car, date
                )));
            }

            if let Some(until) = until {
                let end_hour = slots::parse_hour_label(&until)
                    .ok_or_else(|| MotorpoolError::Slot(format!("Invalid slot '{}'", until)))?;
                match selection.click(car, end_hour, &occupancy) {
                    ClickOutcome::RangeSelected => {}
                    ClickOutcome::Ignored => {
                        return Err(MotorpoolError::Slot(format!(
                            "{} on {} is not available on {}",
                            until, car, date
                        )));
                    }
                    ClickOutcome::RangeRejected => {
                        return Err(MotorpoolError::Slot(format!(
                            "{}-{} on {} crosses an already booked slot",
                            start, until, car
                        )));
                    }
                    // until == start: already a single-slot selection
                    ClickOutcome::Selected => {}
                }
            }

            submit(&client, &config, &selection, date, reason).await?;
        }
        Commands::Preset {
            date,
            preset,
            reason,
        } => {
            let reservations = client.fetch_calendar(date, date).await?;
            let occupancy = DayOccupancy::build(&reservations, date);

            let mut selection = Selection::default();
            match selection.apply_preset(preset, &occupancy) {
                Some(chosen) => {
                    info!("Allocator picked {} for the {} block", chosen, preset.name());
                }
                None => {
                    return Err(MotorpoolError::Slot(format!(
                        "No car available for the {} block on {}",
                        preset.name(),
                        date
                    )));
                }
            }

            submit(&client, &config, &selection, date, reason).await?;
        }
        Commands::Cancel { id } => {
            client.cancel_reservation(id).await?;
            info!("Cancelled reservation {}", id);
        }
        Commands::Watch { year, month } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            if !(1..=12).contains(&month) {
                return Err(MotorpoolError::Config(format!("Invalid month: {}", month)));
            }
            watch::run_watch(&config, &client, year, month).await?;
        }
    }

    Ok(())
}

async fn submit(
    client: &ReservationClient,
    config: &Config,
    selection: &Selection,
    date: NaiveDate,
    reason: Option<String>,
) -> Result<()> {
    let (car, start_hour, sessions) = selection
        .finalize()
        .ok_or_else(|| MotorpoolError::Slot("Nothing selected".to_string()))?;

    let reason = reason.as_deref().unwrap_or(&config.booking.reason);
    let request = NewReservation::for_slots(
        date,
        car,
        start_hour,
        sessions,
        &config.booking.email,
        reason,
    )?;

    let created = client.create_reservation(&request).await?;
    info!(
        "Booked {} on {} {}-{} ({}h), reservation id {}",
        car,
        date,
        slots::hour_label(start_hour),
        slots::hour_label(start_hour + sessions),
        sessions,
        created.id
    );

    Ok(())
}
