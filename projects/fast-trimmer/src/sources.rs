use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A named video and the coordinate log recorded alongside it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct VideoSource {
    pub video_file: PathBuf,
    pub coordinates_file: PathBuf,
}

#[derive(Serialize, Debug, Clone)]
pub struct SourceStatus {
    pub name: String,
    pub video_available: bool,
}

/// Fixed set of trim sources, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, VideoSource>,
}

impl SourceRegistry {
    /// The survey's two camera runs.
    pub fn builtin(video_root: &Path) -> Self {
        let sources = [
            ("L2", "L2.mp4", "coordinates.csv"),
            ("R2", "R2.mp4", "coordinates2.csv"),
        ]
        .into_iter()
        .map(|(name, video, coords)| {
            (
                name.to_string(),
                VideoSource {
                    video_file: video.into(),
                    coordinates_file: coords.into(),
                },
            )
        })
        .collect();

        Self::from_map(sources, video_root)
    }

    /// Load sources from a JSON object of `name -> {video_file, coordinates_file}`.
    /// Unknown fields are ignored; relative paths resolve against `video_root`.
    pub fn load(path: &Path, video_root: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file {:?}", path))?;
        let sources: BTreeMap<String, VideoSource> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid sources file {:?}", path))?;

        if sources.is_empty() {
            anyhow::bail!("Sources file {:?} defines no sources", path);
        }

        Ok(Self::from_map(sources, video_root))
    }

    fn from_map(sources: BTreeMap<String, VideoSource>, video_root: &Path) -> Self {
        let sources = sources
            .into_iter()
            .map(|(name, source)| {
                let resolved = VideoSource {
                    video_file: video_root.join(source.video_file),
                    coordinates_file: video_root.join(source.coordinates_file),
                };
                (name, resolved)
            })
            .collect();
        Self { sources }
    }

    pub fn get(&self, name: &str) -> Option<&VideoSource> {
        self.sources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn status(&self) -> Vec<SourceStatus> {
        self.sources
            .iter()
            .map(|(name, source)| SourceStatus {
                name: name.clone(),
                video_available: source.video_file.is_file(),
            })
            .collect()
    }

    /// Log the configured sources, warning about any whose files are absent.
    pub fn report(&self) {
        for (name, source) in &self.sources {
            if !source.video_file.is_file() {
                warn!("Source {}: video {:?} not found", name, source.video_file);
            }
            if !source.coordinates_file.is_file() {
                warn!(
                    "Source {}: coordinate log {:?} not found",
                    name, source.coordinates_file
                );
            }
        }
        info!(
            "Configured sources: {}",
            self.names().collect::<Vec<_>>().join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources_resolve_against_root() {
        let registry = SourceRegistry::builtin(Path::new("/data/survey"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["L2", "R2"]);
        assert_eq!(
            registry.get("R2"),
            Some(&VideoSource {
                video_file: PathBuf::from("/data/survey/R2.mp4"),
                coordinates_file: PathBuf::from("/data/survey/coordinates2.csv"),
            })
        );
        assert!(registry.get("L3").is_none());
    }

    #[test]
    fn test_load_from_json_ignores_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"{
                "L2": {"video_file": "L2.mp4", "coordinates_file": "coordinates.csv", "gdrive_id": "abc"},
                "NH52": {"video_file": "/abs/nh52.mp4", "coordinates_file": "nh52.csv"}
            }"#,
        )
        .unwrap();

        let registry = SourceRegistry::load(&path, dir.path()).unwrap();
        assert_eq!(registry.get("L2").unwrap().video_file, dir.path().join("L2.mp4"));
        assert_eq!(
            registry.get("NH52").unwrap().video_file,
            PathBuf::from("/abs/nh52.mp4")
        );
    }

    #[test]
    fn test_load_rejects_empty_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "{}").unwrap();
        assert!(SourceRegistry::load(&empty, dir.path()).is_err());

        let malformed = dir.path().join("bad.json");
        fs::write(&malformed, r#"{"L2": {"video_file": "L2.mp4"}}"#).unwrap();
        assert!(SourceRegistry::load(&malformed, dir.path()).is_err());
    }

    #[test]
    fn test_status_reports_video_presence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("L2.mp4"), b"video").unwrap();

        let status = SourceRegistry::builtin(dir.path()).status();
        assert_eq!(status.len(), 2);
        assert!(status[0].video_available);
        assert!(!status[1].video_available);
    }
}
