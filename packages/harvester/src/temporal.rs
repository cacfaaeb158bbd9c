//! Date, time and duration normalization.
//!
//! Both documents carry civil dates as `day.month.year` with unpadded
//! components, times as `HH:MM:SS` and durations as `H:MM:SS`. Nothing here
//! ever fails: text that does not fit the expected shape normalizes to `0`,
//! which callers treat as "unknown".

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};

use crate::config::CATALOG_TIME_ZONE;

/// Time assumed when an entry carries a date but no time.
const MIDNIGHT: &str = "00:00:00";

/// Convert a catalog date and time into epoch seconds.
///
/// `date` is `day.month.year` (e.g. `1.1.2000` or `01.01.2000`), `time` is
/// `HH:MM:SS` or empty for midnight. The pair is read as civil time in the
/// catalog's time zone. Day, month and time components outside their usual
/// range roll over. Returns `0` when either part is malformed.
///
/// # Examples
/// ```
/// use mediathek_harvester::temporal::parse_timestamp;
///
/// assert_eq!(parse_timestamp("1.1.2000", "10:00:00"), 946_717_200);
/// assert_eq!(parse_timestamp("1.1.2000", ""), parse_timestamp("1.1.2000", "00:00:00"));
/// assert_eq!(parse_timestamp("2000-01-01", "10:00:00"), 0);
/// ```
#[must_use]
pub fn parse_timestamp(date: &str, time: &str) -> i64 {
    let time = if time.is_empty() { MIDNIGHT } else { time };

    let (Some(date), Some(offset)) = (parse_civil_date(date), parse_civil_time(time)) else {
        return 0;
    };

    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(offset))
        .and_then(resolve_local)
        .unwrap_or(0)
}

/// Convert an `H:MM:SS` duration into seconds.
///
/// Anything that does not split into exactly three colon-separated parts
/// yields `0`. Each part is coerced leniently with [`coerce_int`].
///
/// # Examples
/// ```
/// use mediathek_harvester::temporal::parse_duration;
///
/// assert_eq!(parse_duration("1:02:03"), 3723);
/// assert_eq!(parse_duration(""), 0);
/// assert_eq!(parse_duration("12:30"), 0);
/// ```
#[must_use]
pub fn parse_duration(duration: &str) -> i64 {
    let parts: Vec<&str> = duration.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return 0;
    };

    coerce_int(hours)
        .saturating_mul(3600)
        .saturating_add(coerce_int(minutes).saturating_mul(60))
        .saturating_add(coerce_int(seconds))
}

/// Leniently coerce text to an integer.
///
/// Leading whitespace is skipped, an optional sign is honoured and the
/// longest run of ASCII digits is used. Text without leading digits is `0`.
///
/// # Examples
/// ```
/// use mediathek_harvester::temporal::coerce_int;
///
/// assert_eq!(coerce_int(" 42\n"), 42);
/// assert_eq!(coerce_int("-7"), -7);
/// assert_eq!(coerce_int("3rd"), 3);
/// assert_eq!(coerce_int("abc"), 0);
/// ```
#[must_use]
pub fn coerce_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative {
        -value
    } else {
        value
    }
}

/// Parse `day.month.year`.
///
/// Out-of-range day and month values roll over into the neighbouring
/// month or year (`30.2.2020` is `1.3.2020`, `0.1.2020` is `31.12.2019`).
fn parse_civil_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('.');
    let day = numeric_component(parts.next()?, 2)?;
    let month = numeric_component(parts.next()?, 2)?;
    let year = numeric_component(parts.next()?, 4)?;
    if parts.next().is_some() {
        return None;
    }

    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;
    first.checked_add_signed(Duration::days(i64::from(day) - 1))
}

/// Parse `HH:MM:SS` into an offset from midnight.
///
/// Components are not range checked, so `25:00:00` lands on the next day.
fn parse_civil_time(text: &str) -> Option<Duration> {
    let mut parts = text.split(':');
    let hour = numeric_component(parts.next()?, 2)?;
    let minute = numeric_component(parts.next()?, 2)?;
    let second = numeric_component(parts.next()?, 2)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Duration::seconds(
        i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second),
    ))
}

/// A run of 1..=`max_digits` ASCII digits and nothing else.
fn numeric_component(text: &str, max_digits: usize) -> Option<u32> {
    if text.is_empty() || text.len() > max_digits || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Map a civil date-time in the catalog zone to epoch seconds.
///
/// Ambiguous times (clocks going back) take the earlier instant; times in a
/// gap (clocks going forward) are moved forward by an hour.
fn resolve_local(naive: NaiveDateTime) -> Option<i64> {
    CATALOG_TIME_ZONE
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            CATALOG_TIME_ZONE
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.timestamp())
}
