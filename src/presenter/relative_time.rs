//! Human-readable post age ("3 hours ago").
//!
//! Each unit is rounded and then checked against a cutoff before moving to
//! the next larger unit, so 44 minutes reads "44 minutes ago" and 45 minutes
//! already reads "an hour ago". Months and years use average lengths.

use chrono::{DateTime, Utc};

const SECS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 30.436_875;
const DAYS_PER_YEAR: f64 = 365.242_5;

/// How long before `now` the instant `then` was.
///
/// Instants in the future (clock skew between client and service) read as
/// "a few seconds ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_milliseconds().max(0) as f64 / 1000.0;

    if seconds.round() <= 44.0 {
        return "a few seconds ago".to_string();
    }
    if seconds.round() <= 89.0 {
        return "a minute ago".to_string();
    }

    let minutes = (seconds / 60.0).round();
    if minutes <= 44.0 {
        return ago(minutes, "a minute", "minutes");
    }
    if minutes <= 89.0 {
        return "an hour ago".to_string();
    }

    let hours = (seconds / 3600.0).round();
    if hours <= 21.0 {
        return ago(hours, "an hour", "hours");
    }
    if hours <= 35.0 {
        return "a day ago".to_string();
    }

    let days = seconds / SECS_PER_DAY;
    if days.round() <= 25.0 {
        return ago(days.round(), "a day", "days");
    }
    if days.round() <= 45.0 {
        return "a month ago".to_string();
    }

    let months = (days / DAYS_PER_MONTH).round();
    if months <= 10.0 {
        return ago(months, "a month", "months");
    }
    if months <= 17.0 {
        return "a year ago".to_string();
    }

    ago((days / DAYS_PER_YEAR).round(), "a year", "years")
}

fn ago(count: f64, one: &str, unit: &str) -> String {
    if count <= 1.0 {
        format!("{one} ago")
    } else {
        format!("{} {unit} ago", count as u64)
    }
}
