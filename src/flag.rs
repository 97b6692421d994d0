// src/flag.rs
use chrono::{DateTime, Duration, Utc};

/// One live feature flag, enriched from both API endpoints.
///
/// `None` timestamps mean "never": never modified, never requested.
/// For threshold comparisons an unset timestamp counts as infinitely
/// old, so it satisfies any "more than X ago" predicate.
#[derive(Debug, Clone)]
pub struct Flag {
    pub key: String,
    pub maintainer_email: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_requested: Option<DateTime<Utc>>,
    pub temporary: bool,
}

impl Flag {
    pub fn creation_date_more_than(&self, now: DateTime<Utc>, value: Duration) -> bool {
        more_than(now, self.creation_date, value)
    }

    pub fn last_modified_more_than(&self, now: DateTime<Utc>, value: Duration) -> bool {
        more_than(now, self.last_modified, value)
    }

    pub fn last_requested_more_than(&self, now: DateTime<Utc>, value: Duration) -> bool {
        more_than(now, self.last_requested, value)
    }

    pub fn creation_date_ago(&self, now: DateTime<Utc>) -> String {
        ago_or_never(now, self.creation_date)
    }

    pub fn last_modified_ago(&self, now: DateTime<Utc>) -> String {
        ago_or_never(now, self.last_modified)
    }

    pub fn last_requested_ago(&self, now: DateTime<Utc>) -> String {
        ago_or_never(now, self.last_requested)
    }

    /// "inactive" when the flag was last requested more than `threshold`
    /// ago, or never requested at all. Otherwise "inuse".
    pub fn status(&self, now: DateTime<Utc>, threshold: Duration) -> &'static str {
        if self.last_requested_more_than(now, threshold) {
            "inactive"
        } else {
            "inuse"
        }
    }

    pub fn lifecycle(&self) -> &'static str {
        if self.temporary {
            "temporary"
        } else {
            "permanent"
        }
    }
}

/// True when `timestamp` is unset or lies strictly more than `value` in
/// the past. An elapsed time exactly equal to `value` is not "more than".
pub fn more_than(now: DateTime<Utc>, timestamp: Option<DateTime<Utc>>, value: Duration) -> bool {
    match timestamp {
        None => true,
        Some(ts) => now.signed_duration_since(ts) > value,
    }
}

fn ago_or_never(now: DateTime<Utc>, timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        None => "never".to_string(),
        Some(ts) => format_ago(now.signed_duration_since(ts)),
    }
}

/// Format an elapsed duration with its largest applicable unit,
/// e.g. "1.1 years ago" or "42 seconds ago".
pub fn format_ago(elapsed: Duration) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;
    const MONTH: f64 = 30.0 * DAY;
    const YEAR: f64 = 365.0 * DAY;

    let secs = elapsed.num_milliseconds() as f64 / 1000.0;
    if secs > YEAR {
        format!("{:.1} years ago", secs / YEAR)
    } else if secs > MONTH {
        format!("{:.1} months ago", secs / MONTH)
    } else if secs > DAY {
        format!("{:.1} days ago", secs / DAY)
    } else if secs > HOUR {
        format!("{:.1} hours ago", secs / HOUR)
    } else if secs > MINUTE {
        format!("{:.1} minutes ago", secs / MINUTE)
    } else {
        format!("{:.0} seconds ago", secs)
    }
}
