//! Windowed analysis computations
//!
//! Pure functions over a normalized price series. The moving-average
//! policy for insufficient or misaligned data lives here and nowhere
//! else:
//!
//! - too little history for the requested window → empty output, not an
//!   error,
//! - a start date that is not a trading day in the series → fail fast
//!   with [`Error::StartDateNotFound`].

use chrono::NaiveDate;
use common::{Error, PriceSeries, Result, SeriesPoint};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Validated parameters of one SMA request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Window length in trading observations, >= 1
    pub period: usize,
}

impl SmaParams {
    /// Parse and validate from a request's string parameter map.
    ///
    /// Fails with [`Error::InvalidRequest`] on anything missing or
    /// malformed, so the caller rejects before any side effect.
    pub fn from_parameters(parameters: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> Result<&str> {
            parameters
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| Error::invalid_request(format!("missing parameter '{key}'")))
        };

        let start_date: NaiveDate = get("startDate")?
            .parse()
            .map_err(|_| Error::invalid_request("malformed 'startDate'"))?;
        let end_date: NaiveDate = get("endDate")?
            .parse()
            .map_err(|_| Error::invalid_request("malformed 'endDate'"))?;
        let period: usize = get("period")?
            .parse()
            .map_err(|_| Error::invalid_request("malformed 'period'"))?;

        if period == 0 {
            return Err(Error::invalid_request("'period' must be >= 1"));
        }
        if end_date < start_date {
            return Err(Error::invalid_request("'endDate' precedes 'startDate'"));
        }

        Ok(Self {
            start_date,
            end_date,
            period,
        })
    }

    /// Start of the fetch window: the requested start padded backward by
    /// `floor(period / 5) * 7` calendar days, compensating for weekends
    /// and holidays ahead of the requested start.
    pub fn padded_fetch_start(&self) -> NaiveDate {
        let pad_days = (self.period as i64 / 5) * 7;
        self.start_date - chrono::Duration::days(pad_days)
    }

    /// Minimum number of observations required before the window math runs
    fn required_len(&self) -> usize {
        let range_days = (self.end_date - self.start_date).num_days() as usize;
        self.period + range_days
    }
}

/// Compute the simple moving average series.
///
/// `series` must be normalized (ascending, deduplicated by date) and
/// already padded to cover `period` observations before the start date.
/// Output is ascending, one point per trading day from `start_date` to
/// the last available date <= `end_date`. Plain `f64` division, no
/// rounding.
pub fn compute_sma(series: &PriceSeries, params: &SmaParams) -> Result<Vec<SeriesPoint>> {
    if series.is_empty() || series.len() < params.required_len() {
        warn!(
            symbol = %series.symbol,
            available = series.len(),
            required = params.required_len(),
            "insufficient history for SMA window; returning empty result"
        );
        return Ok(Vec::new());
    }

    let start_index = series
        .index_of(params.start_date)
        .ok_or(Error::StartDateNotFound(params.start_date))?;

    if start_index + 1 < params.period {
        // Window would reach before the padded history. Same policy as
        // the length check: an empty result, not an error.
        warn!(
            symbol = %series.symbol,
            start_index,
            period = params.period,
            "not enough observations before start date; returning empty result"
        );
        return Ok(Vec::new());
    }

    let mut points = Vec::new();
    for i in start_index..series.len() {
        let current = &series.points[i];
        if current.date > params.end_date {
            break;
        }
        let window = &series.points[i + 1 - params.period..=i];
        let sum: f64 = window.iter().map(|p| p.close).sum();
        let value = sum / params.period as f64;
        points.push(SeriesPoint::at_start_of_day(current.date, value));
    }

    debug!(
        symbol = %series.symbol,
        points = points.len(),
        start = %params.start_date,
        end = %params.end_date,
        "SMA computed"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::{PricePoint, Symbol};

    fn params(start: &str, end: &str, period: usize) -> SmaParams {
        SmaParams {
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            period,
        }
    }

    fn point(date: NaiveDate, close: f64) -> PricePoint {
        PricePoint {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    /// Consecutive calendar days ending at `last`, oldest first
    fn daily_series(symbol: &str, last: &str, closes: &[f64]) -> PriceSeries {
        let last: NaiveDate = last.parse().unwrap();
        let points = closes
            .iter()
            .rev()
            .enumerate()
            .map(|(back, close)| point(last - chrono::Duration::days(back as i64), *close))
            .rev()
            .collect();
        PriceSeries::new(Symbol::new(symbol), points)
    }

    #[test]
    fn test_params_from_map() {
        let mut map = HashMap::new();
        map.insert("startDate".to_string(), "2024-01-08".to_string());
        map.insert("endDate".to_string(), "2024-01-12".to_string());
        map.insert("period".to_string(), "5".to_string());

        let params = SmaParams::from_parameters(&map).unwrap();
        assert_eq!(params.period, 5);
        assert_eq!(params.start_date.to_string(), "2024-01-08");
    }

    #[test]
    fn test_params_reject_missing_and_malformed() {
        let mut map = HashMap::new();
        map.insert("startDate".to_string(), "2024-01-08".to_string());
        assert_matches!(
            SmaParams::from_parameters(&map),
            Err(Error::InvalidRequest(_))
        );

        map.insert("endDate".to_string(), "2024-01-12".to_string());
        map.insert("period".to_string(), "zero".to_string());
        assert_matches!(
            SmaParams::from_parameters(&map),
            Err(Error::InvalidRequest(_))
        );

        map.insert("period".to_string(), "0".to_string());
        assert_matches!(
            SmaParams::from_parameters(&map),
            Err(Error::InvalidRequest(_))
        );
    }

    #[test]
    fn test_padded_fetch_start() {
        // period 5 -> one week of padding
        let p = params("2024-01-08", "2024-01-12", 5);
        assert_eq!(p.padded_fetch_start().to_string(), "2024-01-01");
        // period < 5 -> no padding
        let p = params("2024-01-08", "2024-01-12", 3);
        assert_eq!(p.padded_fetch_start().to_string(), "2024-01-08");
        // period 12 -> two weeks
        let p = params("2024-01-15", "2024-01-19", 12);
        assert_eq!(p.padded_fetch_start().to_string(), "2024-01-01");
    }

    #[test]
    fn test_constant_series_yields_constant_sma() {
        let series = daily_series("ABC", "2024-01-12", &[100.0; 20]);
        let p = params("2024-01-08", "2024-01-12", 5);

        let points = compute_sma(&series, &p).unwrap();

        assert_eq!(points.len(), 5);
        for point in &points {
            assert!((point.value - 100.0).abs() < f64::EPSILON);
        }
        assert_eq!(
            points[0].timestamp,
            "2024-01-08".parse::<NaiveDate>().unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_averages_trailing_closes() {
        // closes 1..=10 ending 2024-01-10; SMA(3) at the 10th is (8+9+10)/3
        let closes: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let series = daily_series("ABC", "2024-01-10", &closes);
        let p = params("2024-01-10", "2024-01-10", 3);

        let points = compute_sma(&series, &p).unwrap();

        assert_eq!(points.len(), 1);
        assert!((points[0].value - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_history_is_empty_not_error() {
        let series = daily_series("ABC", "2024-01-12", &[100.0; 6]);
        // needs 5 + 4 = 9 observations, only 6 available
        let p = params("2024-01-08", "2024-01-12", 5);

        assert_eq!(compute_sma(&series, &p).unwrap(), Vec::new());
    }

    #[test]
    fn test_empty_series_is_empty_result() {
        let series = PriceSeries::empty(Symbol::new("ABC"));
        let p = params("2024-01-08", "2024-01-12", 5);
        assert_eq!(compute_sma(&series, &p).unwrap(), Vec::new());
    }

    #[test]
    fn test_missing_start_date_fails_fast() {
        // 2024-01-06 is absent from a series that skips it
        let mut series = daily_series("ABC", "2024-01-12", &[100.0; 20]);
        series.points.retain(|pt| pt.date.to_string() != "2024-01-06");
        let p = params("2024-01-06", "2024-01-12", 2);

        assert_matches!(
            compute_sma(&series, &p),
            Err(Error::StartDateNotFound(date)) if date.to_string() == "2024-01-06"
        );
    }

    #[test]
    fn test_output_stops_at_end_date() {
        // series runs past the requested end; output must not
        let series = daily_series("ABC", "2024-01-20", &[100.0; 30]);
        let p = params("2024-01-08", "2024-01-12", 5);

        let points = compute_sma(&series, &p).unwrap();

        assert_eq!(points.len(), 5);
        let last = points.last().unwrap();
        assert_eq!(
            last.timestamp.date(),
            "2024-01-12".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_zero_prices_average_to_zero() {
        let series = daily_series("ABC", "2024-01-12", &[0.0; 20]);
        let p = params("2024-01-08", "2024-01-12", 5);

        let points = compute_sma(&series, &p).unwrap();
        assert!(points.iter().all(|pt| pt.value == 0.0));
    }
}
