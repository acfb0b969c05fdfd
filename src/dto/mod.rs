use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

pub mod admin;
pub mod health;
pub mod player;
pub mod session;
pub mod validation;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_WITH_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| "invalid-date".into())
}

fn format_time(time: Time) -> String {
    time.format(TIME_FORMAT)
        .unwrap_or_else(|_| "invalid-time".into())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, DATE_FORMAT)
}

/// Parse a `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time(value: &str) -> Result<Time, time::error::Parse> {
    Time::parse(value, TIME_FORMAT).or_else(|_| Time::parse(value, TIME_WITH_SECONDS_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn dates_and_times_use_wire_formats() {
        assert_eq!(format_date(date!(2025 - 07 - 10)), "2025-07-10");
        assert_eq!(format_time(time!(19:05)), "19:05");
        assert_eq!(parse_date("2025-07-10").unwrap(), date!(2025 - 07 - 10));
        assert_eq!(parse_time("19:05").unwrap(), time!(19:05));
        assert_eq!(parse_time("19:05:30").unwrap(), time!(19:05:30));
        assert!(parse_date("10/07/2025").is_err());
        assert!(parse_time("7pm").is_err());
    }
}
