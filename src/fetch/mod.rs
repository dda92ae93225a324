//! Acquisition of subtitles and videos from a hosting service, plus the
//! naming helpers used to turn a downloaded file into a deck title.

pub mod ytdlp;

pub use ytdlp::YtDlpFetcher;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

/// Downloads subtitle tracks and videos into a local directory.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch subtitles for `url` and return the best matching `.srt` file.
    ///
    /// `languages` is the comma-separated list to request; files tagged with
    /// `preferred_lang` win over other variants.
    async fn fetch_subtitles(
        &self,
        url: &str,
        out_dir: &Path,
        languages: &str,
        preferred_lang: &str,
    ) -> Result<PathBuf>;

    /// Fetch the video for `url` and return the downloaded file.
    async fn fetch_video(&self, url: &str, out_dir: &Path) -> Result<PathBuf>;
}

/// A downloaded file with its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Files in `dir` whose extension is one of `extensions` (case-insensitive).
pub fn list_candidates(dir: &Path, extensions: &[&str]) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        if !matches || !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        candidates.push(Candidate { path, modified });
    }
    Ok(candidates)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pick the subtitle file to use.
///
/// Ranking: tagged with exactly `lang` (e.g. `Title.es.srt`, `Title.es-419.srt`)
/// first, then manual over auto-generated tracks, then the newest file.
pub fn choose_best_subtitle<'a>(candidates: &'a [Candidate], lang: &str) -> Option<&'a Candidate> {
    let tagged = Regex::new(&format!(r"\.{}([\._\-].*)?\.srt$", regex::escape(lang))).ok();

    candidates.iter().min_by_key(|c| {
        let name = file_name(&c.path);
        let lang_rank = match &tagged {
            Some(re) if re.is_match(&name) => 0,
            _ => 1,
        };
        let auto_rank = usize::from(name.to_lowercase().contains("auto"));
        (lang_rank, auto_rank, Reverse(c.modified))
    })
}

/// Most recently modified candidate.
pub fn newest(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().max_by_key(|c| c.modified)
}

pub fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn language_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<title>.+?)\.(?P<lang>[A-Za-z]{2,3}(?:-[A-Za-z0-9]{2,4})?)$")
            .expect("language suffix regex is valid")
    })
}

/// `My Video.es.srt` -> `My Video`.
pub fn derive_title(subtitle_path: &Path) -> String {
    let stem = subtitle_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match language_suffix_regex().captures(&stem) {
        Some(caps) => caps["title"].to_string(),
        None => stem,
    }
}

fn youtube_id_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"[?&]v=([A-Za-z0-9_-]{11})",
            r"youtu\.be/([A-Za-z0-9_-]{11})",
            r"/shorts/([A-Za-z0-9_-]{11})",
            r"/embed/([A-Za-z0-9_-]{11})",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("youtube id regex is valid"))
        .collect()
    })
}

/// The 11-character video id from common YouTube URL forms.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    youtube_id_regexes()
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Title used for the default CSV name and image prefix: `Title [id]`.
pub fn base_title(subtitle_path: &Path, url: &str) -> String {
    let title = derive_title(subtitle_path);
    match extract_youtube_id(url) {
        Some(id) => format!("{title} [{id}]"),
        None => title,
    }
}
