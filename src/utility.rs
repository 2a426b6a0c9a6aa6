//! Timestamp helpers shared by the time and log layers

use chrono::{TimeZone, Utc};

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.mmm` (UTC)
pub fn timestamp_to_ordinary_time(timestamp: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp).single() {
        Some(time) => time.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinary_time() {
        assert_eq!(timestamp_to_ordinary_time(0), "1970-01-01T00:00:00.000");
        assert_eq!(
            timestamp_to_ordinary_time(1_700_000_000_123),
            "2023-11-14T22:13:20.123"
        );
    }

    #[test]
    fn test_now_is_recent() {
        assert!(now_millis() > 1_700_000_000_000);
    }
}
