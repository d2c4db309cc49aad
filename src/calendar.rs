use chrono::{Datelike, Duration, NaiveDate};

/// One cell of the 6x7 month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub week_number: u32,
}

/// The grid always covers six full weeks.
pub const GRID_CELLS: usize = 42;

/// Thursday-rule week number, counted from Sunday-started weeks.
///
/// Each date is shifted forward to the Thursday of its own week, and week 1
/// of that Thursday's year is the week containing the year's first Thursday.
/// Not the same as `chrono::IsoWeek`: ISO weeks start on Monday, so the two
/// disagree on Sundays.
pub fn week_number(date: NaiveDate) -> u32 {
    let thursday = date + Duration::days(days_to_thursday(date));

    let jan1 = NaiveDate::from_ymd_opt(thursday.year(), 1, 1)
        .expect("January 1st is a valid date for any year");
    let first_thursday = jan1 + Duration::days(days_to_thursday(jan1));

    ((thursday - first_thursday).num_days() / 7 + 1) as u32
}

fn days_to_thursday(date: NaiveDate) -> i64 {
    ((4 + 7 - date.weekday().num_days_from_sunday()) % 7) as i64
}

/// Build the 42-cell grid for a month (1-based), starting at the Sunday
/// on/before the 1st. Cells outside the month are included with
/// `in_month = false`; `is_today` matches `today` by calendar date only.
pub fn build_month_grid(year: i32, month: u32, today: NaiveDate) -> Vec<DayCell> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("month must be in 1..=12");
    let grid_start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);

    (0..GRID_CELLS as i64)
        .map(|i| {
            let date = grid_start + Duration::days(i);
            DayCell {
                date,
                day: date.day(),
                in_month: date.month() == month && date.year() == year,
                is_today: date == today,
                week_number: week_number(date),
            }
        })
        .collect()
}

/// First and last calendar day of a month (1-based).
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("month must be in 1..=12");
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("month must be in 1..=12");
    (first, next_first - Duration::days(1))
}
