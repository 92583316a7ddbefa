//! FHIR `date` / `dateTime` parsing.
//!
//! FHIR allows partial dates (`2021`, `2021-05`), full dates and date-times with or without
//! fractional seconds. Servers are not consistent about the offset format either
//! (`+00:00` vs `+0000`). Everything is normalised to UTC; partial values resolve to the
//! start of the period they name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a FHIR `date` or `dateTime` string into a UTC instant.
///
/// Returns `None` when the value matches none of the accepted shapes.
pub fn parse_fhir_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // OpenMRS REST style: 2021-05-19T09:49:42.000+0000
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    let date = match value.len() {
        4 => NaiveDate::parse_from_str(&format!("{value}-01-01"), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
    }?;

    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
