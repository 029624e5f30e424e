//! BigQuery canonical date/time literal grammar

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").unwrap());

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{1,2}):([0-9]{1,2})(?:\.([0-9]{1,6}))?$").unwrap());

static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4}-[0-9]{1,2}-[0-9]{1,2})[Tt ]([0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}(?:\.[0-9]{1,6})?)(?:\s?(?:Z|z|UTC|[+-][0-9]{1,2}(?::[0-9]{2})?))?$",
    )
    .unwrap()
});

/// `YYYY-[M]M-[D]D` naming a real calendar day
pub fn is_bq_date(value: &str) -> bool {
    let Some(caps) = DATE_REGEX.captures(value) else {
        return false;
    };
    let year = caps[1].parse::<i32>().ok();
    let month = caps[2].parse::<u32>().ok();
    let day = caps[3].parse::<u32>().ok();
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => false,
    }
}

/// `[H]H:[M]M:[S]S[.ffffff]` naming a valid wall-clock time
pub fn is_bq_time(value: &str) -> bool {
    let Some(caps) = TIME_REGEX.captures(value) else {
        return false;
    };
    let hour = caps[1].parse::<u32>().ok();
    let minute = caps[2].parse::<u32>().ok();
    let second = caps[3].parse::<u32>().ok();
    match (hour, minute, second) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s).is_some(),
        _ => false,
    }
}

/// A canonical date and time joined by `T` or a space, with an optional zone suffix
pub fn is_bq_timestamp(value: &str) -> bool {
    let Some(caps) = TIMESTAMP_REGEX.captures(value) else {
        return false;
    };
    is_bq_date(&caps[1]) && is_bq_time(&caps[2])
}
