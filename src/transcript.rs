//! Transcript retrieval for a video reference.
//!
//! A [`TranscriptProvider`] maps a video id to plain transcript text. The
//! shipped [`DirectoryTranscriptProvider`] reads caption files saved next to
//! each other in one directory, named after the video id:
//!
//! - `<id>.txt` - one caption segment per line
//! - `<id>.srt` - SubRip captions
//! - `<id>.pdf` - line-numbered PDF transcript
//!
//! Caption segments are kept one per line, so captions without punctuation
//! still split into separate sentences.

use crate::error::TranscriptError;
use crate::transcriptparser::{parse_pdf_transcript, transcript_text, PageSettings};
use once_cell::sync::Lazy;
use pdf::file::File;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

static VIDEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("Invalid video id regex pattern"));

// watch?v=ID, youtu.be/ID, /embed/ID, /shorts/ID, /v/ID, /live/ID
static VIDEO_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:[?&]v=|youtu\.be/|/embed/|/shorts/|/v/|/live/)([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
    )
    .expect("Invalid video URL regex pattern")
});

static SRT_TIMECODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2}[,.]\d{3}\s+-->\s+\d{2}:\d{2}:\d{2}[,.]\d{3}")
        .expect("Invalid timecode regex pattern")
});

static SRT_BLOCK_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Invalid block separator regex pattern"));

static MARKUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>|\{\\[^}]*\}").expect("Invalid markup regex pattern"));

/// Transcript text together with the video it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub video_id: String,
    pub text: String,
}

/// Source of transcript text for a video.
pub trait TranscriptProvider {
    /// Returns the full transcript text of the video.
    fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError>;
}

/// Extracts the 11-character video id from a URL or a bare id.
pub fn extract_video_id(reference: &str) -> Result<String, TranscriptError> {
    let reference = reference.trim();

    if VIDEO_ID_PATTERN.is_match(reference) {
        return Ok(reference.to_string());
    }

    VIDEO_URL_PATTERN
        .captures(reference)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| TranscriptError::InvalidVideoReference(reference.to_string()))
}

/// Resolves a video reference and fetches its transcript.
pub fn fetch_for_reference<P>(provider: &P, reference: &str) -> Result<Transcript, TranscriptError>
where
    P: TranscriptProvider + ?Sized,
{
    let video_id = extract_video_id(reference)?;
    let text = provider.fetch_transcript(&video_id)?;
    info!(video_id = %video_id, chars = text.len(), "Transcript extracted");
    Ok(Transcript { video_id, text })
}

/// Joins caption segments one per line, dropping blank ones.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts the caption text of each SubRip block.
///
/// The index and timecode lines are dropped, as is inline markup such as
/// `<i>` or `{\an8}`. Blocks without text are skipped.
pub fn parse_srt_captions(content: &str) -> Vec<String> {
    let content = content.replace("\r\n", "\n");
    let mut captions = Vec::new();

    for block in SRT_BLOCK_SEPARATOR.split(content.trim_start_matches('\u{feff}')) {
        let text_lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .skip_while(|line| line.parse::<u32>().is_ok())
            .filter(|line| !SRT_TIMECODE_PATTERN.is_match(line))
            .collect();

        let joined = text_lines.join(" ");
        let caption = MARKUP_PATTERN
            .replace_all(&joined, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !caption.is_empty() {
            captions.push(caption);
        }
    }

    captions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranscriptFormat {
    PlainText,
    SubRip,
    Pdf,
}

impl TranscriptFormat {
    const ALL: [TranscriptFormat; 3] = [
        TranscriptFormat::PlainText,
        TranscriptFormat::SubRip,
        TranscriptFormat::Pdf,
    ];

    fn extension(self) -> &'static str {
        match self {
            TranscriptFormat::PlainText => "txt",
            TranscriptFormat::SubRip => "srt",
            TranscriptFormat::Pdf => "pdf",
        }
    }
}

/// Reads transcripts saved as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTranscriptProvider {
    dir: PathBuf,
    page_settings: PageSettings,
}

impl DirectoryTranscriptProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            page_settings: PageSettings::default(),
        }
    }

    /// Overrides the page geometry used for PDF transcripts.
    pub fn with_page_settings(mut self, page_settings: PageSettings) -> Self {
        self.page_settings = page_settings;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, video_id: &str) -> Option<(PathBuf, TranscriptFormat)> {
        TranscriptFormat::ALL.into_iter().find_map(|format| {
            let path = self
                .dir
                .join(format!("{}.{}", video_id, format.extension()));
            path.is_file().then_some((path, format))
        })
    }

    fn read(&self, path: &Path, format: TranscriptFormat) -> Result<String, TranscriptError> {
        match format {
            TranscriptFormat::PlainText => {
                let content = fs::read_to_string(path)?;
                Ok(join_segments(content.lines()))
            }
            TranscriptFormat::SubRip => {
                let content = fs::read_to_string(path)?;
                let captions = parse_srt_captions(&content);
                Ok(join_segments(captions.iter().map(String::as_str)))
            }
            TranscriptFormat::Pdf => {
                let pdf = File::<Vec<u8>>::open(path)
                    .map_err(|e| TranscriptError::Pdf(e.to_string()))?;
                let lines = parse_pdf_transcript(&pdf, &self.page_settings)
                    .map_err(|e| TranscriptError::Pdf(format!("{:#}", e)))?;
                Ok(transcript_text(&lines))
            }
        }
    }
}

impl TranscriptProvider for DirectoryTranscriptProvider {
    fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        // The id becomes a file name, so it must not carry path separators
        if !VIDEO_ID_PATTERN.is_match(video_id) {
            return Err(TranscriptError::InvalidVideoReference(video_id.to_string()));
        }

        let (path, format) = self
            .locate(video_id)
            .ok_or_else(|| TranscriptError::NotFound(video_id.to_string()))?;
        debug!(path = %path.display(), ?format, "Reading transcript file");

        let text = self.read(&path, format)?;
        if text.trim().is_empty() {
            return Err(TranscriptError::NoCaptions(video_id.to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VIDEO_ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_extract_video_id_from_urls() {
        let references = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "youtube.com/v/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ];

        for reference in references {
            assert_eq!(extract_video_id(reference).unwrap(), VIDEO_ID, "{}", reference);
        }
    }

    #[test]
    fn test_extract_video_id_rejects_invalid() {
        for reference in ["", "not a url", "https://example.com/page", "dQw4w9WgXc"] {
            assert!(matches!(
                extract_video_id(reference),
                Err(TranscriptError::InvalidVideoReference(_))
            ));
        }
    }

    #[test]
    fn test_join_segments() {
        assert_eq!(
            join_segments(["hello there", "  ", " general kenobi "]),
            "hello there\ngeneral kenobi"
        );
    }

    #[test]
    fn test_parse_srt_captions() {
        let content = "1\r\n00:00:00,000 --> 00:00:02,500\r\n<i>The cat sat</i>\r\non the mat.\r\n\r\n\
                       2\r\n00:00:02,500 --> 00:00:04,000\r\n{\\an8}The dog chased the cat.\r\n\r\n\
                       3\r\n00:00:04,000 --> 00:00:05,000\r\n\r\n";

        let captions = parse_srt_captions(content);

        assert_eq!(
            captions,
            vec!["The cat sat on the mat.", "The dog chased the cat."]
        );
    }

    #[test]
    fn test_directory_provider_reads_text() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(format!("{}.txt", VIDEO_ID)),
            "The cat sat\non the mat.\n\n",
        )
        .unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        let text = provider.fetch_transcript(VIDEO_ID).unwrap();

        assert_eq!(text, "The cat sat\non the mat.");
    }

    #[test]
    fn test_directory_provider_prefers_text_over_srt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("{}.txt", VIDEO_ID)), "from text").unwrap();
        fs::write(
            dir.path().join(format!("{}.srt", VIDEO_ID)),
            "1\n00:00:00,000 --> 00:00:01,000\nfrom captions\n",
        )
        .unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        assert_eq!(provider.fetch_transcript(VIDEO_ID).unwrap(), "from text");
    }

    #[test]
    fn test_directory_provider_reads_srt() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(format!("{}.srt", VIDEO_ID)),
            "1\n00:00:00,000 --> 00:00:01,000\nThe dog\n\n2\n00:00:01,000 --> 00:00:02,000\nchased the cat.\n",
        )
        .unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        let transcript =
            fetch_for_reference(&provider, &format!("https://youtu.be/{}", VIDEO_ID)).unwrap();

        assert_eq!(transcript.video_id, VIDEO_ID);
        assert_eq!(transcript.text, "The dog\nchased the cat.");
    }

    #[test]
    fn test_directory_provider_reports_malformed_pdf() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("{}.pdf", VIDEO_ID)), "not a pdf at all").unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_transcript(VIDEO_ID),
            Err(TranscriptError::Pdf(_))
        ));
    }

    #[test]
    fn test_directory_provider_prefers_srt_over_pdf() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("{}.pdf", VIDEO_ID)), "not a pdf at all").unwrap();
        fs::write(
            dir.path().join(format!("{}.srt", VIDEO_ID)),
            "1\n00:00:00,000 --> 00:00:01,000\nfrom captions\n",
        )
        .unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        assert_eq!(provider.fetch_transcript(VIDEO_ID).unwrap(), "from captions");
    }

    #[test]
    fn test_directory_provider_not_found() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryTranscriptProvider::new(dir.path());

        assert!(matches!(
            provider.fetch_transcript(VIDEO_ID),
            Err(TranscriptError::NotFound(id)) if id == VIDEO_ID
        ));
    }

    #[test]
    fn test_directory_provider_no_captions() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(format!("{}.srt", VIDEO_ID)),
            "1\n00:00:00,000 --> 00:00:01,000\n\n",
        )
        .unwrap();

        let provider = DirectoryTranscriptProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_transcript(VIDEO_ID),
            Err(TranscriptError::NoCaptions(_))
        ));
    }

    #[test]
    fn test_directory_provider_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryTranscriptProvider::new(dir.path());

        assert!(matches!(
            provider.fetch_transcript("../../secret"),
            Err(TranscriptError::InvalidVideoReference(_))
        ));
    }
}
