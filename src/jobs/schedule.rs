//! Daily wall-clock schedules.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use tokio::task::JoinHandle;

use crate::{debug, log};

/// A time of day, in local time, at which a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAt {
    hour: u32,
    minute: u32,
}

impl DailyAt {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse `"HH:MM"` (24-hour).
    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        Self::new(h.parse().ok()?, m.parse().ok()?)
    }

    /// First occurrence strictly after `now`.
    ///
    /// Days where the time does not exist (DST gap) are skipped.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();

        for _ in 0..4 {
            if let Some(naive) = date.and_hms_opt(self.hour, self.minute, 0)
                && let Some(at) = tz.from_local_datetime(&naive).earliest()
                && at > *now
            {
                return at;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        now.clone() + chrono::Duration::days(1)
    }

    /// Time to wait from now until the next local occurrence.
    pub fn until_next(&self) -> Duration {
        let now = Local::now();
        (self.next_after(&now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl FromStr for DailyAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid time `{s}`"))
    }
}

impl fmt::Display for DailyAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Run `job` every day at `at` on the current tokio runtime.
///
/// The job runs on a blocking thread; failures are logged and the schedule
/// continues.
pub fn spawn_daily<F>(name: &'static str, at: DailyAt, job: F) -> JoinHandle<()>
where
    F: Fn() -> Result<()> + Send + Sync + 'static,
{
    let job = Arc::new(job);
    tokio::spawn(async move {
        loop {
            let wait = at.until_next();
            debug!("schedule"; "{} next run in {}s", name, wait.as_secs());
            tokio::time::sleep(wait).await;

            let job = Arc::clone(&job);
            match tokio::task::spawn_blocking(move || job()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log!("schedule"; "{} failed: {:#}", name, e),
                Err(e) => log!("schedule"; "{} panicked: {}", name, e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(DailyAt::parse("04:00"), DailyAt::new(4, 0));
        assert_eq!(DailyAt::parse("4:30"), DailyAt::new(4, 30));
        assert_eq!(DailyAt::parse(" 23:59 "), DailyAt::new(23, 59));
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["", "24:00", "12:60", "noon", "12", "12:5", "123:00", "-1:00"] {
            assert!(DailyAt::parse(s).is_none(), "{s}");
        }
        assert!("25:00".parse::<DailyAt>().is_err());
    }

    #[test]
    fn test_display_roundtrips_format() {
        assert_eq!(DailyAt::parse("4:05").unwrap().to_string(), "04:05");
    }

    #[test]
    fn test_next_later_today() {
        let at = DailyAt::parse("05:00").unwrap();
        assert_eq!(at.next_after(&utc(2026, 3, 1, 4, 30)), utc(2026, 3, 1, 5, 0));
    }

    #[test]
    fn test_next_is_tomorrow_once_passed() {
        let at = DailyAt::parse("04:00").unwrap();
        assert_eq!(at.next_after(&utc(2026, 3, 1, 4, 0)), utc(2026, 3, 2, 4, 0));
        assert_eq!(at.next_after(&utc(2026, 12, 31, 23, 0)), utc(2027, 1, 1, 4, 0));
    }

    #[test]
    fn test_until_next_within_a_day() {
        let wait = DailyAt::parse("04:00").unwrap().until_next();
        assert!(wait <= Duration::from_secs(25 * 3600));
    }
}
