use super::{ExecError, TrimExecutor};
use crate::trim::matcher::TrimWindow;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TrimmerConfig {
    pub ffmpeg_path: PathBuf,
    pub timeout: Duration,
    /// Niceness applied to each encoder process (Unix only).
    pub niceness: i32,
    pub preset: String,
    pub crf: u8,
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(30),
            niceness: 10,
            preset: "ultrafast".to_string(),
            crf: 28,
        }
    }
}

/// Re-encodes the trim window with an external `ffmpeg`, one process per call.
pub struct FfmpegTrimmer {
    config: TrimmerConfig,
}

impl FfmpegTrimmer {
    pub fn new(config: TrimmerConfig) -> Self {
        Self { config }
    }

    /// Input-side seek followed by a duration, so the output starts at a
    /// keyframe and `+faststart` puts the index up front for web playback.
    pub fn build_args(&self, source: &Path, window: TrimWindow, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-loglevel",
            "error",
            "-y",
            "-ss",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(window.start.to_string().into());
        args.push("-i".into());
        args.push(source.as_os_str().to_owned());
        args.push("-t".into());
        args.push(window.duration().to_string().into());
        args.extend(
            [
                "-c:v",
                "libx264",
                "-preset",
                self.config.preset.as_str(),
                "-crf",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(self.config.crf.to_string().into());
        args.extend(
            ["-movflags", "+faststart", "-f", "mp4"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl TrimExecutor for FfmpegTrimmer {
    async fn trim(
        &self,
        source: &Path,
        window: TrimWindow,
        output: &Path,
    ) -> Result<(), ExecError> {
        if !source.is_file() {
            return Err(ExecError::SourceMissing(source.to_path_buf()));
        }

        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(self.build_args(source, window, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        lower_priority(&mut cmd, self.config.niceness);

        let started = Instant::now();
        let child = cmd.spawn().map_err(ExecError::Spawn)?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let result = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!(
                    "Encoder exceeded {:?} trimming {} ({:.2}s..{:.2}s), killed",
                    self.config.timeout,
                    source.display(),
                    window.start,
                    window.end
                );
                Err(ExecError::Timeout(self.config.timeout))
            }
            Ok(Err(e)) => Err(ExecError::Io(e)),
            Ok(Ok(out)) if !out.status.success() => Err(ExecError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
            Ok(Ok(_)) => {
                info!(
                    "Trimmed {} [{:.2}s, {:.2}s) -> {} in {:.2}s",
                    source.display(),
                    window.start,
                    window.end,
                    output.display(),
                    started.elapsed().as_secs_f64()
                );
                Ok(())
            }
        };

        if result.is_err() {
            // Partial output from a failed encode is never served.
            let _ = tokio::fs::remove_file(output).await;
        }

        result
    }
}

#[cfg(unix)]
fn lower_priority(cmd: &mut Command, niceness: i32) {
    // SAFETY: the closure only calls setpriority, which is async-signal-safe.
    unsafe {
        cmd.pre_exec(move || {
            // Best effort: an already lower priority is left as is.
            libc::setpriority(libc::PRIO_PROCESS, 0, niceness);
            Ok(())
        });
    }
}
