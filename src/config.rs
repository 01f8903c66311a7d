//! Defaults and directory resolution.
//!
//! Transcripts are looked up in one directory, chosen in this order:
//! 1. `--transcripts-dir` on the command line
//! 2. `$TRANSCRIPT_MCQ_DIR` environment variable
//! 3. `transcripts/` under the platform data directory

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Questions generated per transcript unless asked otherwise
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Environment variable for a custom transcript directory
pub const TRANSCRIPT_DIR_ENV: &str = "TRANSCRIPT_MCQ_DIR";

const TRANSCRIPTS_SUBDIR: &str = "transcripts";

/// Returns the transcript directory, honoring `$TRANSCRIPT_MCQ_DIR`.
///
/// - Linux: `~/.local/share/transcript-mcq/transcripts/`
/// - macOS: `~/Library/Application Support/dev.transcript-mcq.transcript-mcq/transcripts/`
pub fn transcripts_dir(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_transcripts_dir(custom_dir, std::env::var(TRANSCRIPT_DIR_ENV).ok())
}

fn resolve_transcripts_dir(
    custom_dir: Option<&PathBuf>,
    env_dir: Option<String>,
) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.clone());
    }

    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    ProjectDirs::from("dev", "transcript-mcq", "transcript-mcq")
        .map(|dirs| dirs.data_dir().join(TRANSCRIPTS_SUBDIR))
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}
