use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{error, info};

use crate::api::ReservationClient;
use crate::config::Config;
use crate::error::Result;
use crate::reservation::Reservation;

/// Poll the calendar for one month and log reservation changes.
///
/// A failed fetch is logged and swallowed; the previous snapshot stays in
/// place until the next poll succeeds.
pub async fn run_watch(
    config: &Config,
    client: &ReservationClient,
    year: i32,
    month: u32,
) -> Result<()> {
    let mut snapshot: Option<Vec<Reservation>> = None;

    loop {
        match client.fetch_month(year, month).await {
            Ok(current) => {
                match &snapshot {
                    None => info!(
                        "Watching {}-{:02}: {} reservations, polling every {}s",
                        year,
                        month,
                        current.len(),
                        config.watch.poll_secs
                    ),
                    Some(previous) => log_changes(previous, &current),
                }
                snapshot = Some(current);
            }
            Err(e) => {
                error!("Reservation refresh failed, keeping last snapshot: {}", e);
            }
        }

        sleep(std::time::Duration::from_secs(config.watch.poll_secs)).await;
    }
}

fn log_changes(previous: &[Reservation], current: &[Reservation]) {
    let previous_ids: HashSet<u64> = previous.iter().map(|r| r.id).collect();
    let current_ids: HashSet<u64> = current.iter().map(|r| r.id).collect();

    for res in current.iter().filter(|r| !previous_ids.contains(&r.id)) {
        info!(
            "New reservation {}: car {} at {} for {}h ({})",
            res.id, res.target, res.time, res.session, res.reason
        );
    }

    for res in previous.iter().filter(|r| !current_ids.contains(&r.id)) {
        info!(
            "Reservation {} removed: car {} at {}",
            res.id, res.target, res.time
        );
    }
}
