//! Business-date resolution.
//!
//! All aggregates are bucketed by the calendar date in the fixed operating
//! timezone, not by UTC date. Timestamps are stored in UTC and converted on the
//! way out; the business date is computed once at write time and stored as a
//! plain `YYYY-MM-DD` string so date-filtered queries stay trivial.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Current instant in the operating timezone.
#[must_use]
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Today's business date in the operating timezone.
#[must_use]
pub fn business_date(tz: Tz) -> NaiveDate {
    now_in(tz).date_naive()
}

/// Today's business date as the stored `YYYY-MM-DD` string.
#[must_use]
pub fn business_date_string(tz: Tz) -> String {
    business_date(tz).format("%Y-%m-%d").to_string()
}

/// Formats a stored UTC timestamp as a local wall-clock time, e.g. `04:15 PM`.
#[must_use]
pub fn format_local_time(timestamp: DateTime<Utc>, tz: Tz) -> String {
    timestamp.with_timezone(&tz).format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_business_date_string_shape() {
        let s = business_date_string(chrono_tz::Africa::Accra);
        assert_eq!(s.len(), 10);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[7..8], "-");
    }

    #[test]
    fn test_business_date_tracks_operating_timezone_not_utc() {
        // 23:30 UTC on Jan 1 is already Jan 2 in Auckland but still Jan 1 in Accra.
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 23, 30, 0).unwrap();
        let accra = instant.with_timezone(&chrono_tz::Africa::Accra).date_naive();
        let auckland = instant
            .with_timezone(&chrono_tz::Pacific::Auckland)
            .date_naive();
        assert_eq!(accra, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(auckland, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn test_format_local_time_twelve_hour_clock() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 15, 16, 5, 0).unwrap();
        // Accra is UTC+0 year-round.
        assert_eq!(format_local_time(instant, chrono_tz::Africa::Accra), "04:05 PM");
    }
}
