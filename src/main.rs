use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use subcards::config::{Config, TranslatorKind};
use subcards::deck::sanitize_title;
use subcards::fetch::{base_title, is_url, MediaFetcher, YtDlpFetcher};
use subcards::media::{check_ffmpeg, FfmpegCapturer};
use subcards::subtitle::NoiseRules;
use subcards::translate::create_translator;
use subcards::{build_deck_with_cancel, print_summary, DeckConfig};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "subcards")]
#[command(version, about = "Convert subtitles into flashcard CSV decks")]
#[command(
    long_about = "Convert an SRT subtitle file (or a video URL) into a CSV ready for flashcard import, \
pairing each line with its translation and, optionally, a screenshot from the matching video."
)]
struct Cli {
    /// Input .srt file or a video URL
    input: Option<String>,

    /// Output .csv file (defaults to input name with .csv extension)
    output: Option<PathBuf>,

    /// Video file to take a screenshot from for every card
    #[arg(long)]
    video: Option<PathBuf>,

    /// Directory for screenshots (default: images/ next to the CSV)
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Video URL to download subtitles from with yt-dlp
    #[arg(long)]
    yt_url: Option<String>,

    /// Comma-separated subtitle language codes to request
    #[arg(long)]
    yt_sub_langs: Option<String>,

    /// Single subtitle language code (alias for --yt-sub-langs)
    #[arg(long)]
    lang: Option<String>,

    /// Directory for yt-dlp downloads (default: output directory or a temp dir)
    #[arg(long)]
    yt_out_dir: Option<PathBuf>,

    /// Also download the video for screenshots when --video is not given
    #[arg(long)]
    yt_download_video: bool,

    /// Translation backend: google, gemini
    #[arg(short, long)]
    translator: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

/// Directory containing `path`, `.` for bare file names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Download directory that must go away even on a forced exit.
type ScratchDir = Arc<Mutex<Option<PathBuf>>>;

fn remember_scratch(scratch: &Mutex<Option<PathBuf>>, dir: &Path) {
    match scratch.lock() {
        Ok(mut guard) => *guard = Some(dir.to_path_buf()),
        Err(poisoned) => *poisoned.into_inner() = Some(dir.to_path_buf()),
    }
}

/// `process::exit` skips destructors, so the temp dir is removed by hand.
fn remove_scratch(scratch: &Mutex<Option<PathBuf>>) {
    let dir = match scratch.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(dir) = dir {
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            eprintln!("Failed to remove {}: {}", dir.display(), e);
        }
    }
}

fn install_cancel_handler(scratch: ScratchDir) -> Result<Arc<AtomicBool>> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::Relaxed) {
            // Second Ctrl+C: stop waiting for the current request
            remove_scratch(&scratch);
            std::process::exit(130);
        }
        eprintln!("\nCancelling after the current card (press Ctrl+C again to quit now)...");
    })
    .context("Failed to install Ctrl+C handler")?;
    Ok(cancelled)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;

    let translator_kind: TranslatorKind = match cli.translator.as_deref() {
        Some(name) => name.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.translator,
    };
    config
        .validate(translator_kind)
        .context("Configuration validation failed")?;

    // A URL in the input position is the same as --yt-url
    let (input, yt_url) = match cli.input {
        Some(value) if is_url(&value) => (None, Some(value)),
        other => (other.map(PathBuf::from), cli.yt_url),
    };

    // Check external tools before doing any work
    if cli.video.is_some() || (yt_url.is_some() && cli.yt_download_video) {
        check_ffmpeg()?;
    }

    let scratch: ScratchDir = Arc::new(Mutex::new(None));
    let cancelled = install_cancel_handler(scratch.clone())?;

    let mut output = cli.output;
    let mut video = cli.video;
    let mut _temp_dir: Option<TempDir> = None;

    let input = match (input, yt_url.as_deref()) {
        (Some(path), _) => path,
        (None, Some(url)) => {
            let fetcher = YtDlpFetcher::new();
            fetcher.check()?;

            let out_dir = match (&cli.yt_out_dir, &output) {
                (Some(dir), _) => dir.clone(),
                (None, Some(out)) => parent_dir(out),
                (None, None) => {
                    let temp = TempDir::new().context("Failed to create temp directory")?;
                    let path = temp.path().to_path_buf();
                    debug!("Using temp directory: {:?}", path);
                    remember_scratch(&scratch, &path);
                    _temp_dir = Some(temp);
                    path
                }
            };

            let languages = cli
                .lang
                .clone()
                .or(cli.yt_sub_langs.clone())
                .unwrap_or_else(|| config.subtitle_languages.clone());
            let subtitles = fetcher
                .fetch_subtitles(url, &out_dir, &languages, &config.source_language)
                .await?;

            if output.is_none() {
                let title = sanitize_title(&base_title(&subtitles, url));
                output = Some(std::env::current_dir()?.join(format!("{title}.csv")));
            }

            if cli.yt_download_video && video.is_none() {
                video = Some(fetcher.fetch_video(url, &out_dir).await?);
            }

            subtitles
        }
        (None, None) => anyhow::bail!("You must provide an input .srt file or a URL."),
    };

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output = output.unwrap_or_else(|| derive_output_path(&input));
    let image_prefix = yt_url.as_deref().map(|url| base_title(&input, url));
    if video.is_none() && cli.media_dir.is_some() {
        warn!("--media-dir has no effect without a video");
    }

    info!("Input:      {}", input.display());
    info!("Output:     {}", output.display());
    info!("Translator: {}", translator_kind);
    info!(
        "Languages:  {} -> {}",
        config.source_language, config.target_language
    );
    if let Some(ref video) = video {
        info!("Video:      {}", video.display());
    }

    let deck_config = DeckConfig {
        source_language: config.source_language.clone(),
        target_language: config.target_language.clone(),
        video,
        media_dir: cli.media_dir,
        image_prefix,
        noise_rules: NoiseRules::for_language(&config.source_language),
        show_progress: true,
    };

    let translator = create_translator(translator_kind, &config)?;
    let capturer = FfmpegCapturer::new();

    let result = build_deck_with_cancel(
        &input,
        &output,
        translator.as_ref(),
        &capturer,
        &deck_config,
        cancelled,
    )
    .await
    .context("Failed to build deck")?;

    print_summary(&result);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("/path/to/episode.es.srt")),
            PathBuf::from("/path/to/episode.es.csv")
        );
        assert_eq!(
            derive_output_path(Path::new("clip.srt")),
            PathBuf::from("clip.csv")
        );
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("/out/deck.csv")), PathBuf::from("/out"));
        assert_eq!(parent_dir(Path::new("deck.csv")), PathBuf::from("."));
    }

    #[test]
    fn test_remove_scratch_deletes_registered_dir() {
        let root = TempDir::new().unwrap();
        let downloads = root.path().join("downloads");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join("video.es.srt"), "1\n").unwrap();

        let scratch: ScratchDir = Arc::new(Mutex::new(None));
        remember_scratch(&scratch, &downloads);
        remove_scratch(&scratch);

        assert!(!downloads.exists());
        assert!(scratch.lock().unwrap().is_none());
    }

    #[test]
    fn test_remove_scratch_without_dir_is_noop() {
        let scratch: ScratchDir = Arc::new(Mutex::new(None));
        remove_scratch(&scratch);
        assert!(scratch.lock().unwrap().is_none());
    }

    #[test]
    fn test_cli_parses_url_flow() {
        let cli = Cli::parse_from([
            "subcards",
            "https://youtu.be/dQw4w9WgXcQ",
            "--lang",
            "es",
            "--yt-download-video",
        ]);
        assert_eq!(cli.input.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(cli.lang.as_deref(), Some("es"));
        assert!(cli.yt_download_video);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_cli_parses_local_flow() {
        let cli = Cli::parse_from([
            "subcards",
            "ep1.srt",
            "ep1.csv",
            "--video",
            "ep1.mp4",
            "--media-dir",
            "media",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("ep1.csv")));
        assert_eq!(cli.video, Some(PathBuf::from("ep1.mp4")));
        assert_eq!(cli.media_dir, Some(PathBuf::from("media")));
    }
}
