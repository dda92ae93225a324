pub mod capture;

pub use capture::{FfmpegCapturer, FrameCapturer};

use crate::error::{Result, SubcardsError};
use std::process::Command;
use tracing::debug;

/// Check that an external program runs, e.g. `ffmpeg -version`.
pub fn check_tool(program: &str, version_arg: &str, install_hint: &str) -> Result<()> {
    let output = Command::new(program)
        .arg(version_arg)
        .output()
        .map_err(|e| {
            SubcardsError::MissingDependency(format!(
                "{program} not found. {install_hint}. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(SubcardsError::MissingDependency(format!(
            "{program} check failed"
        )));
    }

    debug!("{} is available", program);
    Ok(())
}

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    check_tool(
        "ffmpeg",
        "-version",
        "Install it with: brew install ffmpeg (macOS) or apt install ffmpeg (Linux)",
    )
}
