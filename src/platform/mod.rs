//! Platform abstraction layer
//!
//! Handles browser/native differences for wall-clock time.

use time::OffsetDateTime;

/// Current wall-clock time in UTC
#[cfg(not(target_arch = "wasm32"))]
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Current wall-clock time in UTC (from `Date.now()`)
#[cfg(target_arch = "wasm32")]
pub fn now_utc() -> OffsetDateTime {
    let millis = js_sys::Date::now();
    let nanos = (millis * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_after_2020() {
        assert!(now_utc().year() >= 2020);
    }
}
