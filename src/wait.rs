//! Delayed start: sleep until a wall-clock time given on the command line.
//!
//! Accepted forms are `MM:DD:YY:HH:MM:SS`, `HH:MM:SS` (today) or a plain
//! number of seconds. Anything else pauses for [`FALLBACK_PAUSE`].

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

pub const FALLBACK_PAUSE: Duration = Duration::from_secs(30);

const DATE_TIME_FORMAT: &str = "%m:%d:%y:%H:%M:%S";
const DATE_FORMAT: &str = "%m:%d:%y";

pub fn parse_start_time(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let input = input.trim();
    match input.split(':').count() {
        1 => {
            let seconds: i64 = input.parse().ok()?;
            now.checked_add_signed(chrono::Duration::try_seconds(seconds)?)
        }
        3 => {
            let full = format!("{}:{}", now.format(DATE_FORMAT), input);
            NaiveDateTime::parse_from_str(&full, DATE_TIME_FORMAT).ok()
        }
        _ => NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT).ok(),
    }
}

pub fn delay_until(input: &str, now: NaiveDateTime) -> Duration {
    match parse_start_time(input, now) {
        Some(target) if target > now => (target - now).to_std().unwrap_or(FALLBACK_PAUSE),
        Some(target) => {
            warn!(
                "Start time {} is not in the future, pausing {}s instead",
                target,
                FALLBACK_PAUSE.as_secs()
            );
            FALLBACK_PAUSE
        }
        None => {
            warn!(
                "Cannot parse start time {:?}, pausing {}s instead",
                input,
                FALLBACK_PAUSE.as_secs()
            );
            FALLBACK_PAUSE
        }
    }
}

pub async fn wait_until(input: &str) {
    let delay = delay_until(input, Local::now().naive_local());
    info!("Pausing {:.1}s before starting", delay.as_secs_f64());
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn seconds_from_now() {
        assert_eq!(delay_until("120", now()), Duration::from_secs(120));
        assert_eq!(delay_until(" 20 ", now()), Duration::from_secs(20));
    }

    #[test]
    fn time_of_day_uses_today() {
        assert_eq!(
            parse_start_time("23:59:00", now()),
            NaiveDate::from_ymd_opt(2020, 1, 15)
                .unwrap()
                .and_hms_opt(23, 59, 0)
        );
        assert_eq!(
            delay_until("13:00:30", now()),
            Duration::from_secs(3600 + 30)
        );
    }

    #[test]
    fn full_date_time() {
        assert_eq!(
            parse_start_time("01:16:20:08:00:00", now()),
            NaiveDate::from_ymd_opt(2020, 1, 16)
                .unwrap()
                .and_hms_opt(8, 0, 0)
        );
    }

    #[test]
    fn past_or_malformed_falls_back() {
        assert_eq!(delay_until("11:00:00", now()), FALLBACK_PAUSE);
        assert_eq!(delay_until("-5", now()), FALLBACK_PAUSE);
        assert_eq!(delay_until("0", now()), FALLBACK_PAUSE);
        assert_eq!(delay_until("noon", now()), FALLBACK_PAUSE);
        assert_eq!(delay_until("12:00", now()), FALLBACK_PAUSE);
    }
}
