pub mod api;
pub mod error;
pub mod server;
pub mod trimmed;

use crate::sources::SourceRegistry;
use crate::store::OutputStore;
use crate::video::TrimExecutor;
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub sources: SourceRegistry,
    pub store: OutputStore,
    pub executor: Arc<dyn TrimExecutor>,
    pub public_url: PublicUrl,
}

/// How links to produced videos are built.
#[derive(Debug, Clone, Default)]
pub struct PublicUrl {
    /// Use https with the request host (TLS is terminated in front of us).
    pub https: bool,
    /// Fixed base replacing scheme and host entirely.
    pub base_url: Option<String>,
}

impl PublicUrl {
    pub fn video_url(&self, host: &str, filename: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                let scheme = if self.https { "https" } else { "http" };
                format!("{}://{}", scheme, host)
            }
        };
        format!("{}/video/{}", base, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_url_follows_request_host() {
        let url = PublicUrl::default().video_url("16.171.150.111:8000", "abc.mp4");
        assert_eq!(url, "http://16.171.150.111:8000/video/abc.mp4");
    }

    #[test]
    fn test_video_url_https_flag() {
        let public = PublicUrl {
            https: true,
            base_url: None,
        };
        assert_eq!(
            public.video_url("trim.example.org", "abc.mp4"),
            "https://trim.example.org/video/abc.mp4"
        );
    }

    #[test]
    fn test_video_url_fixed_base() {
        let public = PublicUrl {
            https: false,
            base_url: Some("https://cdn.example.org/trimmer/".to_string()),
        };
        assert_eq!(
            public.video_url("10.0.0.5:8000", "abc.mp4"),
            "https://cdn.example.org/trimmer/video/abc.mp4"
        );
    }
}
