// Coordinate log: per-source table associating GPS position with elapsed time
//
// Read fresh for every trim request. Rows missing latitude or longitude are
// dropped on load so the matcher only ever sees complete positions.

use std::path::Path;
use thiserror::Error;

pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const TIMESTAMP_COLUMN: &str = "timestamp_sec";

/// Cell values treated as missing, matched case-insensitively. Mirrors the
/// default NA strings of common dataframe tooling.
const MISSING_MARKERS: [&str; 15] = [
    "", "na", "n/a", "#na", "#n/a", "#n/a n/a", "<na>", "nan", "-nan", "1.#ind", "-1.#ind",
    "1.#qnan", "-1.#qnan", "null", "none",
];

#[derive(Debug, Error)]
pub enum CoordinateLogError {
    #[error("failed to read coordinate log: {0}")]
    Csv(#[from] csv::Error),
    #[error("coordinate log is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("invalid value {value:?} in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// One row of the log. `timestamp_sec` stays optional: a row with a position
/// but no time can still be the nearest match, which then invalidates the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRecord {
    pub lat: f64,
    pub lon: f64,
    pub timestamp_sec: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CoordinateLog {
    records: Vec<CoordinateRecord>,
}

impl CoordinateLog {
    /// Build a log from raw rows, discarding any without both lat and lon.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<f64>, Option<f64>, Option<f64>)>,
    {
        let records = rows
            .into_iter()
            .filter_map(|(lat, lon, timestamp_sec)| match (lat, lon) {
                (Some(lat), Some(lon)) => Some(CoordinateRecord {
                    lat,
                    lon,
                    timestamp_sec,
                }),
                _ => None,
            })
            .collect();

        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, CoordinateLogError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    #[cfg(test)]
    pub fn from_csv_str(content: &str) -> Result<Self, CoordinateLogError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
    ) -> Result<Self, CoordinateLogError> {
        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(CoordinateLogError::MissingColumn(name))
        };
        let lat_idx = column(LAT_COLUMN)?;
        let lon_idx = column(LON_COLUMN)?;
        let ts_idx = column(TIMESTAMP_COLUMN)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let lat = parse_cell(record.get(lat_idx), line, LAT_COLUMN)?;
            let lon = parse_cell(record.get(lon_idx), line, LON_COLUMN)?;
            let ts = parse_cell(record.get(ts_idx), line, TIMESTAMP_COLUMN)?;
            rows.push((lat, lon, ts));
        }

        Ok(Self::from_rows(rows))
    }

    pub fn records(&self) -> &[CoordinateRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn parse_cell(
    cell: Option<&str>,
    line: u64,
    column: &'static str,
) -> Result<Option<f64>, CoordinateLogError> {
    let raw = match cell {
        Some(raw) => raw.trim(),
        None => return Ok(None),
    };

    if MISSING_MARKERS
        .iter()
        .any(|marker| raw.eq_ignore_ascii_case(marker))
    {
        return Ok(None);
    }

    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| CoordinateLogError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        })
}
