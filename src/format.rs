use chrono::{DateTime, Duration, Utc};

/// Time since `created_at`; a timestamp ahead of `now` counts as just posted.
fn age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - created_at).max(Duration::zero())
}

fn plural(n: i64, unit: &str) -> String {
    format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
}

/// Card timestamp: "5 minutes ago", "3 hours ago", "2 days ago", then "Mar 1, 2025".
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = age(created_at, now);
    let hours = elapsed.num_hours();
    if hours < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if hours / 24 < 7 {
        plural(hours / 24, "day")
    } else {
        created_at.format("%b %-d, %Y").to_string()
    }
}

/// Comment timestamp: "5m", "3h", "2d", then "Mar 1".
pub fn compact_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = age(created_at, now);
    let hours = elapsed.num_hours();
    if hours < 1 {
        format!("{}m", elapsed.num_minutes())
    } else if hours < 24 {
        format!("{hours}h")
    } else if hours / 24 < 7 {
        format!("{}d", hours / 24)
    } else {
        created_at.format("%b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn relative_buckets() {
        let n = now();
        assert_eq!(relative_time(n, n), "0 minutes ago");
        assert_eq!(relative_time(n - Duration::minutes(1), n), "1 minute ago");
        assert_eq!(relative_time(n - Duration::minutes(59), n), "59 minutes ago");
        assert_eq!(relative_time(n - Duration::hours(1), n), "1 hour ago");
        assert_eq!(relative_time(n - Duration::hours(23), n), "23 hours ago");
        assert_eq!(relative_time(n - Duration::days(6), n), "6 days ago");
        assert_eq!(relative_time(n - Duration::days(19), n), "Mar 1, 2025");
    }

    #[test]
    fn compact_buckets() {
        let n = now();
        assert_eq!(compact_time(n - Duration::minutes(5), n), "5m");
        assert_eq!(compact_time(n - Duration::hours(3), n), "3h");
        assert_eq!(compact_time(n - Duration::days(2), n), "2d");
        assert_eq!(compact_time(n - Duration::days(19), n), "Mar 1");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let n = now();
        assert_eq!(relative_time(n + Duration::minutes(3), n), "0 minutes ago");
        assert_eq!(compact_time(n + Duration::hours(2), n), "0m");
    }
}
