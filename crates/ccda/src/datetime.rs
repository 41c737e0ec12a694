//! Temporal formatting.
//!
//! FHIR carries ISO-8601 `date`/`dateTime` strings; CDA wants compact timestamps. Date-only
//! values keep their precision (`YYYY`, `YYYYMM`, `YYYYMMDD`). Values with a time part are
//! normalised to UTC and rendered as `yyyyMMddHHmmss+0000` with fractional seconds dropped.
//!
//! Values that do not parse produce no timestamp; the surrounding bound is left out.

use crate::types::{CcdaEffectiveTime, CcdaTimeStamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fhir::Period;

const CCDA_DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Convert a FHIR `date` or `dateTime` to a CDA timestamp.
pub fn map_fhir_to_ccda_date_time(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.contains('T') {
        return map_partial_date(value);
    }

    let utc = parse_date_time(value)?;
    Some(format!("{}+0000", utc.format(CCDA_DATE_TIME_FORMAT)))
}

/// Convert a FHIR `date` or `dateTime` to a CDA date, dropping any time of day.
pub fn map_fhir_to_ccda_date(value: &str) -> Option<String> {
    let value = value.trim();
    let date = value.split_once('T').map_or(value, |(date, _)| date);
    map_partial_date(date)
}

fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.with_timezone(&Utc));
    }

    // FHIR requires an offset when a time is present, but producers routinely omit it.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn map_partial_date(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let full = match value.len() {
        4 => format!("{value}-01-01"),
        7 => format!("{value}-01"),
        10 => value.to_string(),
        _ => return None,
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()?;

    Some(digits)
}

fn timestamp(value: Option<&str>, format: fn(&str) -> Option<String>) -> Option<CcdaTimeStamp> {
    value.and_then(format).map(CcdaTimeStamp::value)
}

/// Map a point in time or a period to an `effectiveTime`.
///
/// A period with at least one readable bound wins over the point and becomes a `low`/`high`
/// interval with each unreadable or absent bound omitted. Returns `None` when there is nothing
/// to render.
pub fn map_effective_time(
    point: Option<&str>,
    period: Option<&Period>,
) -> Option<Vec<CcdaEffectiveTime>> {
    if let Some(period) = period.filter(|p| !p.is_empty()) {
        let low = timestamp(period.start.as_deref(), map_fhir_to_ccda_date_time);
        let high = timestamp(period.end.as_deref(), map_fhir_to_ccda_date_time);
        if low.is_some() || high.is_some() {
            return Some(vec![CcdaEffectiveTime::interval(low, high)]);
        }
    }

    let value = point.and_then(map_fhir_to_ccda_date_time)?;
    Some(vec![CcdaEffectiveTime::at(value)])
}

/// Map a point in time to a date-precision `effectiveTime`.
pub fn map_effective_date(point: Option<&str>) -> Option<Vec<CcdaEffectiveTime>> {
    let value = point.and_then(map_fhir_to_ccda_date)?;
    Some(vec![CcdaEffectiveTime::at(value)])
}

/// Map a start/end pair to a `low`/`high` interval.
///
/// Returns `None` when both are absent. Otherwise a missing or unreadable bound is omitted, or
/// rendered as `nullFlavor="NI"` when `use_null_flavor` is set. Without null flavors, an
/// interval whose bounds are both unreadable is `None`.
pub fn map_effective_period(
    start: Option<&str>,
    end: Option<&str>,
    use_null_flavor: bool,
) -> Option<Vec<CcdaEffectiveTime>> {
    if start.is_none() && end.is_none() {
        return None;
    }

    let bound = |value: Option<&str>| {
        timestamp(value, map_fhir_to_ccda_date_time)
            .or_else(|| use_null_flavor.then(CcdaTimeStamp::no_information))
    };

    let low = bound(start);
    let high = bound(end);
    if low.is_none() && high.is_none() {
        return None;
    }

    Some(vec![CcdaEffectiveTime::interval(low, high)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_date_times_render_with_fixed_offset() {
        assert_eq!(
            map_fhir_to_ccda_date_time("2024-01-01T10:00:00Z").as_deref(),
            Some("20240101100000+0000")
        );
        assert_eq!(
            map_fhir_to_ccda_date_time("2024-01-01T11:00:00.123Z").as_deref(),
            Some("20240101110000+0000")
        );
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        assert_eq!(
            map_fhir_to_ccda_date_time("2024-01-01T23:30:00-05:00").as_deref(),
            Some("20240102043000+0000")
        );
    }

    #[test]
    fn missing_offset_is_read_as_utc() {
        assert_eq!(
            map_fhir_to_ccda_date_time("2024-03-05T08:15:30").as_deref(),
            Some("20240305081530+0000")
        );
    }

    #[test]
    fn date_only_values_keep_precision() {
        assert_eq!(map_fhir_to_ccda_date_time("2023-12-25").as_deref(), Some("20231225"));
        assert_eq!(map_fhir_to_ccda_date_time("2023-12").as_deref(), Some("202312"));
        assert_eq!(map_fhir_to_ccda_date_time("2023").as_deref(), Some("2023"));
    }

    #[test]
    fn date_mapping_drops_time_of_day() {
        assert_eq!(
            map_fhir_to_ccda_date("2024-01-01T10:00:00Z").as_deref(),
            Some("20240101")
        );
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(map_fhir_to_ccda_date_time("yesterday").is_none());
        assert!(map_fhir_to_ccda_date_time("2023-13-40").is_none());
        assert!(map_fhir_to_ccda_date_time("2024-01-01Tnoon").is_none());
    }

    #[test]
    fn period_becomes_interval() {
        let period = Period {
            start: Some("2024-01-01T10:00:00Z".into()),
            end: Some("2024-01-01T11:00:00Z".into()),
        };
        let effective = map_effective_time(None, Some(&period)).expect("effective time");

        let low = effective[0].low.as_ref().expect("low");
        let high = effective[0].high.as_ref().expect("high");
        assert_eq!(low.value.as_deref(), Some("20240101100000+0000"));
        assert_eq!(high.value.as_deref(), Some("20240101110000+0000"));
        assert!(effective[0].value.is_none());
    }

    #[test]
    fn open_period_omits_missing_bound() {
        let period = Period {
            start: Some("2024-01-01T10:00:00Z".into()),
            end: None,
        };
        let effective = map_effective_time(None, Some(&period)).expect("effective time");
        assert!(effective[0].high.is_none());
    }

    #[test]
    fn empty_period_falls_back_to_point() {
        let effective =
            map_effective_time(Some("2024-02-02"), Some(&Period::default())).expect("point");
        assert_eq!(effective[0].value.as_deref(), Some("20240202"));

        assert!(map_effective_time(None, Some(&Period::default())).is_none());
        assert!(map_effective_time(None, None).is_none());
    }

    #[test]
    fn effective_period_with_and_without_null_flavor() {
        assert!(map_effective_period(None, None, true).is_none());

        let plain = map_effective_period(Some("2023-12-25"), None, false).expect("period");
        assert_eq!(plain[0].low.as_ref().and_then(|t| t.value.as_deref()), Some("20231225"));
        assert!(plain[0].high.is_none());

        let flavored = map_effective_period(Some("2023-12-25"), None, true).expect("period");
        assert_eq!(flavored[0].high, Some(CcdaTimeStamp::no_information()));
    }

    #[test]
    fn unreadable_period_renders_nothing() {
        let period = Period {
            start: Some("garbage".into()),
            end: Some("2024-13-01T00:00:00Z".into()),
        };

        assert!(map_effective_time(None, Some(&period)).is_none());
        let point = map_effective_time(Some("2024-02-02"), Some(&period)).expect("point");
        assert_eq!(point[0].value.as_deref(), Some("20240202"));

        assert!(map_effective_period(Some("garbage"), Some("later"), false).is_none());
        let flavored = map_effective_period(Some("garbage"), None, true).expect("period");
        assert_eq!(flavored[0].low, Some(CcdaTimeStamp::no_information()));
    }
}
