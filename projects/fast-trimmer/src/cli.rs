use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::video::TrimmerConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "FAST_TRIMMER_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(long, env = "FAST_TRIMMER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory that relative source paths resolve against
    #[arg(long, env = "FAST_TRIMMER_VIDEO_ROOT", default_value = ".")]
    pub video_root: PathBuf,

    /// Directory trimmed videos are written to and served from
    #[arg(long, env = "FAST_TRIMMER_OUTPUT_ROOT", default_value = "trimmed_videos")]
    pub output_root: PathBuf,

    /// JSON file mapping source names to video and coordinate log paths.
    /// The built-in L2/R2 sources are used when omitted.
    #[arg(long, env = "FAST_TRIMMER_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Encoder binary
    #[arg(long, env = "FAST_TRIMMER_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Wall-clock limit for a single encode, in seconds
    #[arg(long, env = "FAST_TRIMMER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Niceness applied to each encoder process
    #[arg(long, env = "FAST_TRIMMER_NICENESS", default_value_t = 10,
          value_parser = clap::value_parser!(i32).range(0..=19))]
    pub niceness: i32,

    /// x264 preset
    #[arg(long, env = "FAST_TRIMMER_PRESET", default_value = "ultrafast")]
    pub preset: String,

    /// x264 constant rate factor
    #[arg(long, env = "FAST_TRIMMER_CRF", default_value_t = 28,
          value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// Advertise https URLs (set when fronted by a TLS-terminating proxy)
    #[arg(long, env = "FAST_TRIMMER_PUBLIC_HTTPS")]
    pub public_https: bool,

    /// Base URL for returned video links, overriding the request host
    #[arg(long, env = "FAST_TRIMMER_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn trimmer_config(&self) -> TrimmerConfig {
        TrimmerConfig {
            ffmpeg_path: self.ffmpeg.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            niceness: self.niceness,
            preset: self.preset.clone(),
            crf: self.crf,
        }
    }
}
