use crate::error::{Result, SubcardsError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Grabs a single still frame from a video.
#[async_trait]
pub trait FrameCapturer: Send + Sync {
    async fn capture(&self, video: &Path, timestamp: Duration, output: &Path) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Frame capture through the `ffmpeg` command-line tool.
pub struct FfmpegCapturer {
    program: String,
}

impl FfmpegCapturer {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }

    /// Use a different executable name or path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for FfmpegCapturer {
    fn default() -> Self {
        Self::new()
    }
}

fn file_label(output: &Path) -> String {
    output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string())
}

#[async_trait]
impl FrameCapturer for FfmpegCapturer {
    async fn capture(&self, video: &Path, timestamp: Duration, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let seek = format!("{:.3}", timestamp.as_secs_f64());
        debug!("Capturing frame at {}s into {}", seek, output.display());

        // -ss before -i seeks on keyframes first, which is much faster on long videos
        let status = Command::new(&self.program)
            .args(["-y", "-ss"])
            .arg(&seek)
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1", "-q:v", "2"])
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                SubcardsError::Capture(format!(
                    "{} not found when extracting {}: {e}",
                    self.program,
                    file_label(output)
                ))
            })?;

        if !status.success() {
            return Err(SubcardsError::Capture(format!(
                "{} failed when extracting {}",
                self.program,
                file_label(output)
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
