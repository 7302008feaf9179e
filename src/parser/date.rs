use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Units a relative-date token can carry, ordered so that longer spellings
/// win: "mo" must be tried before "m", "yr" before nothing in particular.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Now,
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

static RELATIVE_PATTERNS: Lazy<Vec<(Regex, Unit)>> = Lazy::new(|| {
    // The regex crate has no lookahead, so ambiguous prefixes are resolved
    // by match order: months before minutes, years before everything that
    // could swallow a bare digit.
    vec![
        (Regex::new(r"^just\s*now").expect("regex"), Unit::Now),
        (
            Regex::new(r"^(\d+)\s*y(?:rs?|ears?)?\b").expect("regex"),
            Unit::Years,
        ),
        (
            Regex::new(r"^(\d+)\s*mo(?:s|nths?)?\b").expect("regex"),
            Unit::Months,
        ),
        (
            Regex::new(r"^(\d+)\s*w(?:ks?|eeks?)?\b").expect("regex"),
            Unit::Weeks,
        ),
        (
            Regex::new(r"^(\d+)\s*d(?:ays?)?\b").expect("regex"),
            Unit::Days,
        ),
        (
            Regex::new(r"^(\d+)\s*h(?:rs?|ours?)?\b").expect("regex"),
            Unit::Hours,
        ),
        (
            Regex::new(r"^(\d+)\s*m(?:ins?|inutes?)?\b").expect("regex"),
            Unit::Minutes,
        ),
        (
            Regex::new(r"^(\d+)\s*s(?:ecs?|econds?)?\b").expect("regex"),
            Unit::Seconds,
        ),
    ]
});

/// Absolute formats the site occasionally shows instead of a relative token.
const ABSOLUTE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%b %d, %Y", "%d %b %Y", "%m-%d-%Y"];

/// Resolve the site's relative date text ("2h", "3d", "1w", "2h •") into an
/// absolute date, using `captured_at` as the reference point.
///
/// Unrecognized input falls back to the capture date rather than failing:
/// a bad date must never abort a parse.
pub fn resolve_relative_date(text: &str, captured_at: DateTime<Utc>) -> NaiveDate {
    let today = captured_at.date_naive();

    // Strip the bullet/dot separators the site appends ("2d • edited").
    let cleaned = text
        .split(['•', '·'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return today;
    }

    let lowered = cleaned.to_lowercase();

    for (re, unit) in RELATIVE_PATTERNS.iter() {
        let Some(caps) = re.captures(&lowered) else {
            continue;
        };
        let n: i64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let resolved = match unit {
            Unit::Now | Unit::Seconds | Unit::Minutes => captured_at,
            Unit::Hours => captured_at - Duration::hours(n),
            Unit::Days => captured_at - Duration::days(n),
            Unit::Weeks => captured_at - Duration::weeks(n),
            Unit::Months => captured_at - Duration::days(n * 30),
            Unit::Years => captured_at - Duration::days(n * 365),
        };
        return resolved.date_naive();
    }

    // Maybe it already looks like a calendar date.
    for fmt in ABSOLUTE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return date;
        }
    }

    warn!("could not resolve date text {:?}, using capture date", text);
    today
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn capture_time() -> DateTime<Utc> {
        // Midday so small hour offsets stay on the same date.
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_minutes_resolve_to_capture_date() {
        assert_eq!(
            resolve_relative_date("5m", capture_time()),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn test_hours_same_day() {
        assert_eq!(
            resolve_relative_date("3h", capture_time()),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn test_hours_cross_midnight() {
        assert_eq!(
            resolve_relative_date("13h", capture_time()),
            date(2024, 6, 14)
        );
    }

    #[test]
    fn test_days() {
        assert_eq!(
            resolve_relative_date("2d", capture_time()),
            date(2024, 6, 13)
        );
    }

    #[test]
    fn test_weeks() {
        assert_eq!(
            resolve_relative_date("1w", capture_time()),
            date(2024, 6, 8)
        );
    }

    #[test]
    fn test_months_are_thirty_days() {
        assert_eq!(
            resolve_relative_date("4mo", capture_time()),
            date(2024, 6, 15) - Duration::days(120)
        );
    }

    #[test]
    fn test_years_are_365_days() {
        assert_eq!(
            resolve_relative_date("1y", capture_time()),
            date(2023, 6, 16)
        );
    }

    #[test]
    fn test_year_spelled_out() {
        assert_eq!(
            resolve_relative_date("1yr", capture_time()),
            date(2023, 6, 16)
        );
    }

    #[test]
    fn test_bullet_separator_stripped() {
        assert_eq!(
            resolve_relative_date("2d •", capture_time()),
            date(2024, 6, 13)
        );
        assert_eq!(
            resolve_relative_date("3d · edited", capture_time()),
            date(2024, 6, 12)
        );
    }

    #[test]
    fn test_just_now() {
        assert_eq!(
            resolve_relative_date("just now", capture_time()),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn test_months_not_mistaken_for_minutes() {
        // "1mo" must subtract a month, not resolve to the capture date.
        assert_eq!(
            resolve_relative_date("1mo", capture_time()),
            date(2024, 6, 15) - Duration::days(30)
        );
    }

    #[test]
    fn test_absolute_date_passes_through() {
        assert_eq!(
            resolve_relative_date("2023-11-02", capture_time()),
            date(2023, 11, 2)
        );
        assert_eq!(
            resolve_relative_date("Feb 10, 2024", capture_time()),
            date(2024, 2, 10)
        );
    }

    #[test]
    fn test_empty_falls_back_to_capture_date() {
        assert_eq!(
            resolve_relative_date("", capture_time()),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn test_unrecognized_falls_back_to_capture_date() {
        assert_eq!(
            resolve_relative_date("invalid date", capture_time()),
            date(2024, 6, 15)
        );
    }
}
