//! ISO-8601 duration parsing and the minimum-length policy.
//!
//! The YouTube Data API reports `contentDetails.duration` as an ISO-8601
//! duration such as `PT1H2M3S` or `P1DT5M`.

use crate::error::{Result, StemningError};

/// Videos shorter than this are skipped by default.
pub const MIN_DURATION_SECONDS: u32 = 60;

/// Parse an ISO-8601 duration (`P[nW][nD][T[nH][nM][nS]]`) into seconds.
///
/// Years and months are rejected since they have no fixed length.
pub fn parse_iso8601_duration(input: &str) -> Result<f64> {
    let invalid = || StemningError::InvalidDuration(input.to_string());

    let body = input.trim().strip_prefix('P').ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let mut total = 0.0;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for ch in body.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(if ch == ',' { '.' } else { ch });
            continue;
        }

        if ch == 'T' {
            if in_time || !number.is_empty() {
                return Err(invalid());
            }
            in_time = true;
            continue;
        }

        let value: f64 = number.parse().map_err(|_| invalid())?;
        number.clear();

        let unit = match (in_time, ch) {
            (false, 'W') => 7.0 * 86_400.0,
            (false, 'D') => 86_400.0,
            (true, 'H') => 3_600.0,
            (true, 'M') => 60.0,
            (true, 'S') => 1.0,
            _ => return Err(invalid()),
        };

        total += value * unit;
        saw_component = true;
    }

    // Trailing digits without a designator, or "PT" with nothing after it.
    if !number.is_empty() || !saw_component {
        return Err(invalid());
    }

    Ok(total)
}

/// Whether a video of the given ISO-8601 duration is long enough to keep.
pub fn passes_min_duration(duration: &str, min_seconds: u32) -> Result<bool> {
    let seconds = parse_iso8601_duration(duration)?;
    Ok(seconds >= f64::from(min_seconds))
}
