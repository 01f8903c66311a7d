//! # transcript_mcq
//!
//! Generates multiple-choice questions from video transcripts.
//!
//! A transcript is fetched for a video reference, split into sentences, and
//! each sampled sentence with enough nouns becomes one question: its most
//! frequent noun is blanked out and offered alongside three other nouns from
//! the same sentence.
//!
//! ## Modules
//!
//! - [`mcq`] - Question generation
//! - [`annotator`] - Sentence segmentation and part-of-speech tagging
//! - [`transcript`] - Transcript providers and video id extraction
//! - [`transcriptparser`] - Line extraction from PDF transcripts
//! - [`render`] - Terminal and JSON output
//! - [`config`] - Defaults and directory resolution
//! - [`error`] - Error types

pub mod annotator;
pub mod config;
pub mod error;
pub mod mcq;
pub mod render;
pub mod transcript;
pub mod transcriptparser;

pub use annotator::{Annotator, RuleBasedAnnotator};
pub use error::TranscriptError;
pub use mcq::{generate, generate_with_policy, DistractorPolicy, McqItem};
pub use transcript::{DirectoryTranscriptProvider, Transcript, TranscriptProvider};
