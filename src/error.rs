//! Error types for transcript retrieval.

use thiserror::Error;

/// Errors that can occur while turning a video reference into transcript text.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The reference is neither a video id nor a recognizable video URL
    #[error("Invalid video reference: {0}")]
    InvalidVideoReference(String),
    /// No transcript exists for the video
    #[error("Transcript not found for video {0}")]
    NotFound(String),
    /// A transcript exists but carries no spoken text
    #[error("No captions available for video {0}")]
    NoCaptions(String),
    /// Remote provider could not be reached
    #[error("Network error: {0}")]
    Network(String),
    /// Failed to read a transcript file
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse a PDF transcript
    #[error("Failed to parse PDF transcript: {0}")]
    Pdf(String),
}
