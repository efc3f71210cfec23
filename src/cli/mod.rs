//! CLI interface for scorewave

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Render MIDI scores through an additive synthesizer
#[derive(Parser)]
#[command(name = "scorewave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a MIDI file to a WAV file
    Render {
        /// Standard MIDI File to render
        score: PathBuf,

        /// Patch file (.yaml, or the plain-text parameter format)
        #[arg(short, long, default_value = "patch.yaml")]
        patch: PathBuf,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for detune phase randomization (random if omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum number of notes to keep
        #[arg(long, default_value_t = scorewave::midi::MAX_NOTES)]
        max_notes: usize,
    },

    /// Decode a MIDI file and list its notes
    Inspect {
        /// Standard MIDI File to decode
        score: PathBuf,

        /// Maximum number of notes to keep
        #[arg(long, default_value_t = scorewave::midi::MAX_NOTES)]
        max_notes: usize,
    },

    /// Validate a patch file
    Check {
        /// Patch file path
        #[arg(short, long, default_value = "patch.yaml")]
        patch: PathBuf,
    },

    /// Generate an example patch file
    Init,
}
