//! Command-line quiz generator for video transcripts.
//!
//! # Usage
//!
//! ```bash
//! # Five questions from a saved transcript
//! transcript_mcq "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
//!
//! # Ten reproducible questions as JSON, with named entities
//! transcript_mcq dQw4w9WgXcQ -n 10 --seed 42 --json --entities
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use transcript_mcq::config::{self, DEFAULT_QUESTION_COUNT};
use transcript_mcq::render;
use transcript_mcq::transcript::fetch_for_reference;
use transcript_mcq::{
    generate_with_policy, Annotator, DirectoryTranscriptProvider, DistractorPolicy,
    RuleBasedAnnotator,
};

/// Generate multiple-choice questions from a video transcript.
#[derive(Parser)]
#[command(name = "transcript_mcq", version, about)]
struct Cli {
    /// Video URL or 11-character video id
    video: String,

    /// Number of sentences to sample for questions
    #[arg(short = 'n', long, default_value_t = DEFAULT_QUESTION_COUNT)]
    count: usize,

    /// Seed for reproducible questions
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding <video id>.txt/.srt/.pdf transcripts
    #[arg(long)]
    transcripts_dir: Option<PathBuf>,

    /// Only use sentences with three distinct distractor nouns
    #[arg(long)]
    distinct_distractors: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Also list named entities found in the transcript
    #[arg(long)]
    entities: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let dir = config::transcripts_dir(cli.transcripts_dir.as_ref())
        .context("Failed to resolve transcript directory")?;
    let provider = DirectoryTranscriptProvider::new(dir);
    debug!(dir = %provider.dir().display(), "Using transcript directory");

    let transcript = match fetch_for_reference(&provider, &cli.video) {
        Ok(transcript) => transcript,
        Err(err) => {
            eprintln!("Error extracting transcript: {}", err);
            std::process::exit(1);
        }
    };

    // Built once, read-only from here on
    let annotator = RuleBasedAnnotator::new();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let policy = if cli.distinct_distractors {
        DistractorPolicy::RequireDistinct
    } else {
        DistractorPolicy::AllowRepeats
    };

    let items = generate_with_policy(&annotator, &transcript.text, cli.count, policy, &mut rng);
    info!(questions = items.len(), "Generated questions");

    let entities = cli
        .entities
        .then(|| annotator.named_entities(&transcript.text));

    if cli.json {
        println!(
            "{}",
            render::format_json(&transcript.video_id, &items, entities.as_deref())
        );
    } else {
        println!("{}", render::format_human(&items));
        if let Some(entities) = &entities {
            println!("\n{}", render::format_entities(entities));
        }
    }

    Ok(())
}
