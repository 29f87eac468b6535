pub mod coords;
pub mod matcher;

use crate::video::ExecError;
use coords::{CoordinateLog, CoordinateLogError};
use matcher::{match_window, LatLon, MatchError, TrimWindow};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can end a single trim request.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("Invalid source video name")]
    UnknownSource,
    #[error("Invalid coordinate values")]
    InvalidCoordinates,
    #[error("Invalid coordinates or timestamps")]
    NoMatch(#[from] MatchError),
    #[error("Error reading coordinate log {}: {source}", .path.display())]
    CoordinateLog {
        path: PathBuf,
        #[source]
        source: CoordinateLogError,
    },
    #[error("Video processing timed out")]
    Timeout,
    #[error("FFmpeg error: {0}")]
    Encoder(String),
    #[error("Source video not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("Server error: {0}")]
    Internal(String),
}

impl From<ExecError> for TrimError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Timeout(_) => TrimError::Timeout,
            ExecError::SourceMissing(path) => TrimError::SourceMissing(path),
            ExecError::Failed { status, stderr } if stderr.is_empty() => {
                TrimError::Encoder(format!("encoder {} with no output", status))
            }
            ExecError::Failed { stderr, .. } => TrimError::Encoder(stderr),
            ExecError::Spawn(e) => TrimError::Encoder(e.to_string()),
            ExecError::Io(e) => TrimError::Internal(e.to_string()),
        }
    }
}

/// Read the coordinate log at `path` and resolve the trim window for the pair.
pub fn locate_window(path: &Path, start: LatLon, end: LatLon) -> Result<TrimWindow, TrimError> {
    let log = CoordinateLog::load(path).map_err(|source| TrimError::CoordinateLog {
        path: path.to_path_buf(),
        source,
    })?;

    if log.is_empty() {
        tracing::warn!("No complete coordinate rows in {}", path.display());
    } else {
        tracing::debug!(
            "Loaded {} coordinate rows from {}",
            log.len(),
            path.display()
        );
    }

    Ok(match_window(&log, start, end)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locate_window_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coordinates.csv");
        fs::write(
            &path,
            "lat,lon,timestamp_sec\n26.350,76.248,10\n26.351,76.249,20\n",
        )
        .unwrap();

        let window = locate_window(
            &path,
            LatLon::new(26.350, 76.248),
            LatLon::new(26.351, 76.249),
        )
        .unwrap();
        assert_eq!(window.start, 10.0);
        assert_eq!(window.end, 20.0);
    }

    #[test]
    fn test_silent_encoder_failure_reports_exit_status() {
        let silent = TrimError::from(ExecError::Failed {
            status: "signal: 9 (SIGKILL)".to_string(),
            stderr: String::new(),
        });
        assert_eq!(
            silent.to_string(),
            "FFmpeg error: encoder signal: 9 (SIGKILL) with no output"
        );

        let noisy = TrimError::from(ExecError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        });
        assert_eq!(noisy.to_string(), "FFmpeg error: moov atom not found");
    }

    #[test]
    fn test_locate_window_distinguishes_io_from_no_match() {
        let dir = tempfile::tempdir().unwrap();

        let missing = locate_window(
            &dir.path().join("absent.csv"),
            LatLon::new(0.0, 0.0),
            LatLon::new(1.0, 1.0),
        );
        assert!(matches!(missing, Err(TrimError::CoordinateLog { .. })));

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "lat,lon,timestamp_sec\n").unwrap();
        let no_match = locate_window(&empty, LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0));
        assert!(matches!(no_match, Err(TrimError::NoMatch(_))));
    }
}
