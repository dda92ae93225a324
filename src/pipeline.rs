use crate::deck::{header, plan_cards, sanitize_title, write_cards, Card};
use crate::error::{Result, SubcardsError};
use crate::media::FrameCapturer;
use crate::subtitle::{dedup_segments, filter_noise, parse_srt, NoiseRules, Segment};
use crate::translate::Translator;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cards ({eta}) {msg}";

/// Configuration for one deck-building run.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Subtitle language code.
    pub source_language: String,
    /// Translation language code.
    pub target_language: String,
    /// Video to take screenshots from. Enables the image column.
    pub video: Option<PathBuf>,
    /// Where screenshots go; defaults to `images/` beside the CSV.
    pub media_dir: Option<PathBuf>,
    /// Image file name prefix; defaults to the subtitle file stem.
    pub image_prefix: Option<String>,
    /// What to drop as noise.
    pub noise_rules: NoiseRules,
    /// Show progress bars.
    pub show_progress: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            source_language: "es".to_string(),
            target_language: "en".to_string(),
            video: None,
            media_dir: None,
            image_prefix: None,
            noise_rules: NoiseRules::spanish(),
            show_progress: true,
        }
    }
}

/// Statistics from a deck-building run.
#[derive(Debug, Clone)]
pub struct DeckStats {
    /// Total time taken for the run.
    pub total_time: Duration,
    /// Segments produced by the parser.
    pub parsed_segments: usize,
    /// Segments dropped as interjections, names, etc.
    pub noise_removed: usize,
    /// Segments dropped as repeated text.
    pub duplicates_removed: usize,
    /// Cards written.
    pub cards: usize,
    /// Screenshots captured.
    pub images: usize,
}

/// Result of a deck-building run.
#[derive(Debug)]
pub struct DeckResult {
    /// Path to the CSV file.
    pub output_path: PathBuf,
    /// Directory holding the screenshots, when captured.
    pub media_dir: Option<PathBuf>,
    /// Cards in deck order.
    pub cards: Vec<Card>,
    pub stats: DeckStats,
}

/// Segments that will become cards, with what was removed on the way.
#[derive(Debug, Clone)]
pub struct Selection {
    pub segments: Vec<Segment>,
    pub noise_removed: usize,
    pub duplicates_removed: usize,
}

/// Filter out noise and, when no screenshots are taken, repeated lines.
///
/// With screenshots, a repeated line at a different moment still yields a
/// distinct picture, so repeats are kept.
pub fn select_segments(segments: Vec<Segment>, rules: &NoiseRules, with_images: bool) -> Selection {
    let before = segments.len();
    let segments = filter_noise(segments, rules);
    let noise_removed = before - segments.len();
    info!(
        "Filtering trivial/name-only lines: kept {} (removed {})",
        segments.len(),
        noise_removed
    );

    if with_images {
        return Selection {
            segments,
            noise_removed,
            duplicates_removed: 0,
        };
    }

    let before = segments.len();
    let segments = dedup_segments(segments);
    let duplicates_removed = before - segments.len();
    info!(
        "Removing duplicate lines: kept {} (removed {})",
        segments.len(),
        duplicates_removed
    );

    Selection {
        segments,
        noise_removed,
        duplicates_removed,
    }
}

/// Default screenshot directory: `images/` next to the CSV.
pub fn default_media_dir(output: &Path) -> PathBuf {
    output
        .parent()
        .map(|p| p.join("images"))
        .unwrap_or_else(|| PathBuf::from("images"))
}

fn image_prefix(input: &Path, config: &DeckConfig) -> String {
    let raw = config.image_prefix.clone().unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let prefix = sanitize_title(&raw);
    if prefix.is_empty() {
        "card".to_string()
    } else {
        prefix
    }
}

fn check_cancelled(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(SubcardsError::Cancelled);
    }
    Ok(())
}

/// Build a flashcard deck from a subtitle file.
///
/// This is the main entry point. It:
/// 1. Parses the subtitle blocks
/// 2. Drops noise (and repeats, when not capturing screenshots)
/// 3. Translates each line and, with a video, captures a frame at its midpoint
/// 4. Writes the CSV
///
/// Cards are processed one at a time in subtitle order. Any translation or
/// capture failure aborts the run before the CSV is written.
pub async fn build_deck(
    input: &Path,
    output: &Path,
    translator: &dyn Translator,
    capturer: &dyn FrameCapturer,
    config: &DeckConfig,
) -> Result<DeckResult> {
    let cancelled = Arc::new(AtomicBool::new(false));
    build_deck_with_cancel(input, output, translator, capturer, config, cancelled).await
}

/// Build a deck with cancellation support.
pub async fn build_deck_with_cancel(
    input: &Path,
    output: &Path,
    translator: &dyn Translator,
    capturer: &dyn FrameCapturer,
    config: &DeckConfig,
    cancelled: Arc<AtomicBool>,
) -> Result<DeckResult> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(SubcardsError::FileNotFound(input.display().to_string()));
    }
    if let Some(video) = &config.video {
        if !video.exists() {
            return Err(SubcardsError::FileNotFound(video.display().to_string()));
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Parse
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/3: Reading subtitles from {}", input.display());
    let content = tokio::fs::read_to_string(input).await?;
    let segments = parse_srt(&content);
    let parsed_segments = segments.len();
    info!("Parsed {} blocks", parsed_segments);

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Select
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 2/3: Selecting lines");
    let with_images = config.video.is_some();
    let selection = select_segments(segments, &config.noise_rules, with_images);

    let media_dir = if with_images {
        let dir = config
            .media_dir
            .clone()
            .unwrap_or_else(|| default_media_dir(output));
        tokio::fs::create_dir_all(&dir).await?;
        Some(dir)
    } else {
        None
    };

    let prefix = image_prefix(input, config);
    let plans = plan_cards(selection.segments, with_images.then_some(prefix.as_str()));

    check_cancelled(&cancelled)?;

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Translate and capture
    // ═══════════════════════════════════════════════════════════════════════
    let total = plans.len();
    if with_images {
        info!(
            "Stage 3/3: Translating and extracting screenshots for {} lines with {}",
            total,
            translator.name()
        );
    } else {
        info!("Stage 3/3: Translating {} lines with {}", total, translator.name());
    }

    let progress_bar = if config.show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut cards: Vec<Card> = Vec::with_capacity(total);
    let mut images = 0;

    for plan in plans {
        check_cancelled(&cancelled)?;

        let translated = translator
            .translate(
                &plan.segment.text,
                &config.source_language,
                &config.target_language,
            )
            .await?;
        debug!(
            "Card {}/{} (block {}): {:?} -> {:?}",
            plan.position, total, plan.segment.sequence_id, plan.segment.text, translated
        );

        if let (Some(shot), Some(video), Some(dir)) = (&plan.shot, &config.video, &media_dir) {
            capturer
                .capture(video, shot.timestamp, &dir.join(&shot.file_name))
                .await?;
            images += 1;
        }

        cards.push(plan.into_card(translated));

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Translation complete");
    }

    let columns = header(&config.source_language, &config.target_language, with_images);
    write_cards(output, &columns, &cards)?;
    info!("Wrote {} cards to {}", cards.len(), output.display());

    let stats = DeckStats {
        total_time: start_time.elapsed(),
        parsed_segments,
        noise_removed: selection.noise_removed,
        duplicates_removed: selection.duplicates_removed,
        cards: cards.len(),
        images,
    };

    Ok(DeckResult {
        output_path: output.to_path_buf(),
        media_dir,
        cards,
        stats,
    })
}

/// Print a summary of the run.
pub fn print_summary(result: &DeckResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                        Deck Complete                          ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", result.output_path.display());
    if let Some(ref dir) = result.media_dir {
        println!("  Images:     {} ({} files)", dir.display(), result.stats.images);
    }
    println!("  Cards:      {}", result.stats.cards);
    println!();
    println!("  Lines:");
    println!("    Parsed:      {}", result.stats.parsed_segments);
    println!("    Noise:       {}", result.stats.noise_removed);
    println!("    Duplicates:  {}", result.stats.duplicates_removed);
    println!(
        "    Total time:  {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    if result.media_dir.is_some() {
        println!();
        println!("  Keep the CSV and the images together when importing.");
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::TimeSpan;

    fn seg(id: u64, text: &str) -> Segment {
        let start = Duration::from_secs(id);
        Segment::new(id, TimeSpan::new(start, start + Duration::from_secs(1)), text)
    }

    #[test]
    fn test_progress_template_shows_message() {
        assert!(PROGRESS_TEMPLATE.contains("{msg}"));
        assert!(ProgressStyle::default_bar().template(PROGRESS_TEMPLATE).is_ok());
    }

    #[test]
    fn test_deck_config_default() {
        let config = DeckConfig::default();
        assert_eq!(config.source_language, "es");
        assert_eq!(config.target_language, "en");
        assert!(config.video.is_none());
        assert!(config.show_progress);
    }

    #[test]
    fn test_select_segments_dedups_without_images() {
        let segments = vec![
            seg(1, "Buenos días."),
            seg(2, "Ah."),
            seg(3, "Buenos días."),
            seg(4, "¿Qué hora es?"),
        ];
        let selection = select_segments(segments, &NoiseRules::spanish(), false);
        let ids: Vec<u64> = selection.segments.iter().map(|s| s.sequence_id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(selection.noise_removed, 1);
        assert_eq!(selection.duplicates_removed, 1);
    }

    #[test]
    fn test_select_segments_keeps_repeats_with_images() {
        let segments = vec![seg(1, "Buenos días."), seg(2, "Buenos días.")];
        let selection = select_segments(segments, &NoiseRules::spanish(), true);
        assert_eq!(selection.segments.len(), 2);
        assert_eq!(selection.duplicates_removed, 0);
    }

    #[test]
    fn test_default_media_dir() {
        assert_eq!(
            default_media_dir(Path::new("/decks/ep1.csv")),
            PathBuf::from("/decks/images")
        );
        assert_eq!(default_media_dir(Path::new("ep1.csv")), PathBuf::from("images"));
    }

    #[test]
    fn test_image_prefix() {
        let mut config = DeckConfig::default();
        assert_eq!(image_prefix(Path::new("/subs/ep1.es.srt"), &config), "ep1.es");

        config.image_prefix = Some("Show: Pilot [abc]".to_string());
        assert_eq!(image_prefix(Path::new("x.srt"), &config), "Show- Pilot [abc]");
    }
}
