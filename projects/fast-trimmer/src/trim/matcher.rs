use crate::trim::coords::CoordinateLog;
use geo::EuclideanDistance;
use geo_types::Point as GeoPoint;
use thiserror::Error;

/// A query position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar point with x = lon, y = lat. No geodesic correction is applied.
    fn to_geo(self) -> GeoPoint<f64> {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Matched [start, end) range in seconds. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("no valid trim window for the requested coordinates")]
    InvalidWindow,
}

/// Timestamp of the row nearest to `point`.
///
/// Returns `None` for an empty log and `Some(None)` when the nearest row has no
/// timestamp. Ties resolve to the earliest row.
pub fn nearest_timestamp(log: &CoordinateLog, point: LatLon) -> Option<Option<f64>> {
    let query = point.to_geo();
    let mut best: Option<(f64, Option<f64>)> = None;

    for record in log.records() {
        let dist = GeoPoint::new(record.lon, record.lat).euclidean_distance(&query);
        match best {
            Some((best_dist, _)) if dist >= best_dist => {}
            _ => best = Some((dist, record.timestamp_sec)),
        }
    }

    best.map(|(_, ts)| ts)
}

/// Resolve a start/end coordinate pair to a time window within the log.
pub fn match_window(
    log: &CoordinateLog,
    start: LatLon,
    end: LatLon,
) -> Result<TrimWindow, MatchError> {
    let start_ts = nearest_timestamp(log, start)
        .flatten()
        .filter(|t| t.is_finite())
        .ok_or(MatchError::InvalidWindow)?;
    let end_ts = nearest_timestamp(log, end)
        .flatten()
        .filter(|t| t.is_finite())
        .ok_or(MatchError::InvalidWindow)?;

    if start_ts >= end_ts {
        return Err(MatchError::InvalidWindow);
    }

    Ok(TrimWindow {
        start: start_ts,
        end: end_ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(rows: &[(Option<f64>, Option<f64>, Option<f64>)]) -> CoordinateLog {
        CoordinateLog::from_rows(rows.iter().copied())
    }

    fn survey_log() -> CoordinateLog {
        log(&[
            (Some(26.350), Some(76.248), Some(10.0)),
            (Some(26.351), Some(76.249), Some(20.0)),
        ])
    }

    #[test]
    fn test_two_row_survey_window() {
        let window = match_window(
            &survey_log(),
            LatLon::new(26.350, 76.248),
            LatLon::new(26.351, 76.249),
        )
        .unwrap();

        assert_eq!(window, TrimWindow { start: 10.0, end: 20.0 });
        assert_eq!(window.duration(), 10.0);
    }

    #[test]
    fn test_exact_point_returns_its_own_timestamp() {
        let rows: Vec<_> = (0..50)
            .map(|i| {
                let i = i as f64;
                (
                    Some(26.3 + i * 0.0003),
                    Some(76.2 + i * 0.0002),
                    Some(i * 2.5),
                )
            })
            .collect();
        let log = log(&rows);

        for (lat, lon, ts) in &rows {
            let found = nearest_timestamp(&log, LatLon::new(lat.unwrap(), lon.unwrap()));
            assert_eq!(found, Some(*ts));
        }
    }

    #[test]
    fn test_nearest_row_wins() {
        let found = nearest_timestamp(&survey_log(), LatLon::new(26.3508, 76.2488));
        assert_eq!(found, Some(Some(20.0)));
    }

    #[test]
    fn test_ties_pick_first_row() {
        let log = log(&[
            (Some(1.0), Some(0.0), Some(5.0)),
            (Some(-1.0), Some(0.0), Some(6.0)),
        ]);
        assert_eq!(nearest_timestamp(&log, LatLon::new(0.0, 0.0)), Some(Some(5.0)));
    }

    #[test]
    fn test_inverted_window_is_invalid() {
        let result = match_window(
            &survey_log(),
            LatLon::new(26.351, 76.249),
            LatLon::new(26.350, 76.248),
        );
        assert_eq!(result, Err(MatchError::InvalidWindow));
    }

    #[test]
    fn test_equal_timestamps_are_invalid() {
        let result = match_window(
            &survey_log(),
            LatLon::new(26.350, 76.248),
            LatLon::new(26.3501, 76.2481),
        );
        assert_eq!(result, Err(MatchError::InvalidWindow));
    }

    #[test]
    fn test_empty_and_all_null_logs_are_invalid() {
        let start = LatLon::new(26.350, 76.248);
        let end = LatLon::new(26.351, 76.249);

        assert_eq!(
            match_window(&CoordinateLog::default(), start, end),
            Err(MatchError::InvalidWindow)
        );

        let nulls = log(&[(None, None, Some(1.0)), (Some(26.0), None, Some(2.0))]);
        assert!(nulls.is_empty());
        assert_eq!(match_window(&nulls, start, end), Err(MatchError::InvalidWindow));
    }

    #[test]
    fn test_missing_matched_timestamp_is_invalid() {
        let log = log(&[
            (Some(26.350), Some(76.248), None),
            (Some(26.351), Some(76.249), Some(20.0)),
        ]);
        let result = match_window(
            &log,
            LatLon::new(26.350, 76.248),
            LatLon::new(26.351, 76.249),
        );
        assert_eq!(result, Err(MatchError::InvalidWindow));
    }
}
