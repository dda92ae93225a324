use super::{choose_best_subtitle, list_candidates, newest, MediaFetcher};
use crate::error::{Result, SubcardsError};
use crate::media::check_tool;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov"];

/// Fetcher driving the `yt-dlp` command-line tool.
pub struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }

    /// Use a different executable name or path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Fail early if the executable cannot be run.
    pub fn check(&self) -> Result<()> {
        check_tool(
            &self.program,
            "--version",
            "Install it with: pip install yt-dlp (or your package manager)",
        )
    }

    fn output_template(out_dir: &Path) -> PathBuf {
        out_dir.join("%(title)s.%(ext)s")
    }

    async fn run(&self, args: Vec<String>, what: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                SubcardsError::MissingDependency(format!("{} not found: {e}", self.program))
            })?;

        if !status.success() {
            return Err(SubcardsError::Fetch(format!(
                "{} failed while downloading {}",
                self.program, what
            )));
        }
        Ok(())
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch_subtitles(
        &self,
        url: &str,
        out_dir: &Path,
        languages: &str,
        preferred_lang: &str,
    ) -> Result<PathBuf> {
        info!(
            "[yt-dlp] Downloading subtitles ({}) to {}",
            languages,
            out_dir.display()
        );
        tokio::fs::create_dir_all(out_dir).await?;

        let template = Self::output_template(out_dir);
        let args = vec![
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            languages.to_string(),
            "--sub-format".to_string(),
            "srt".to_string(),
            "--convert-subs".to_string(),
            "srt".to_string(),
            "--windows-filenames".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            url.to_string(),
        ];
        self.run(args, "subtitles").await?;

        let candidates = list_candidates(out_dir, &["srt"])?;
        let best = choose_best_subtitle(&candidates, preferred_lang).ok_or_else(|| {
            SubcardsError::Fetch(
                "No .srt subtitles were downloaded. Check language availability with yt-dlp --list-subs."
                    .to_string(),
            )
        })?;

        info!("[yt-dlp] Found subtitles: {}", best.path.display());
        Ok(best.path.clone())
    }

    async fn fetch_video(&self, url: &str, out_dir: &Path) -> Result<PathBuf> {
        info!("[yt-dlp] Downloading video to {}", out_dir.display());
        tokio::fs::create_dir_all(out_dir).await?;

        let template = Self::output_template(out_dir);
        let args = vec![
            "-f".to_string(),
            "bv*+ba/b".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--windows-filenames".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            url.to_string(),
        ];
        self.run(args, "the video").await?;

        let candidates = list_candidates(out_dir, VIDEO_EXTENSIONS)?;
        let chosen = newest(&candidates).ok_or_else(|| {
            SubcardsError::Fetch(
                "Video download completed but no output video file was found.".to_string(),
            )
        })?;

        info!("[yt-dlp] Video saved: {}", chosen.path.display());
        Ok(chosen.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new().with_program("subcards-no-such-ytdlp");

        assert!(matches!(
            fetcher.check(),
            Err(SubcardsError::MissingDependency(_))
        ));

        let result = fetcher
            .fetch_subtitles("https://youtu.be/dQw4w9WgXcQ", dir.path(), "es", "es")
            .await;
        assert!(matches!(result, Err(SubcardsError::MissingDependency(_))));
    }

    #[tokio::test]
    async fn test_no_subtitles_found_is_fetch_error() {
        // `true` exits successfully without writing anything
        if std::process::Command::new("true").status().is_err() {
            eprintln!("Skipping test: `true` not available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new().with_program("true");

        let result = fetcher
            .fetch_subtitles("https://youtu.be/dQw4w9WgXcQ", dir.path(), "es", "es")
            .await;
        assert!(matches!(result, Err(SubcardsError::Fetch(_))));

        let result = fetcher
            .fetch_video("https://youtu.be/dQw4w9WgXcQ", dir.path())
            .await;
        assert!(matches!(result, Err(SubcardsError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_picks_existing_subtitle_after_download() {
        if std::process::Command::new("true").status().is_err() {
            eprintln!("Skipping test: `true` not available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Clip.en.srt"), "").unwrap();
        std::fs::write(dir.path().join("Clip.es.srt"), "").unwrap();
        let fetcher = YtDlpFetcher::new().with_program("true");

        let path = fetcher
            .fetch_subtitles("https://youtu.be/dQw4w9WgXcQ", dir.path(), "es,en", "es")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("Clip.es.srt"));
    }
}
