//! Scorewave - render MIDI scores to WAV

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use scorewave::config;
use scorewave::engine::{self, Engine};
use scorewave::midi::Decoder;
use scorewave::SynthConfig;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            score,
            patch,
            output,
            seed,
            max_notes,
        } => {
            println!("Loading score from {:?}...", score);
            let decoded = Decoder::with_capacity(max_notes)
                .decode_file(&score)
                .with_context(|| format!("failed to read score {:?}", score))?;
            if decoded.is_truncated() {
                log::warn!(
                    "note limit of {} reached, {} notes dropped",
                    max_notes,
                    decoded.dropped
                );
            }

            println!("Loading patch from {:?}...", patch);
            let patch_config = config::load_config(&patch)
                .with_context(|| format!("failed to load patch {:?}", patch))?;

            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_os_rng(),
            };
            let synth = SynthConfig::from_patch(&patch_config, &mut rng)?;
            let sample_rate = synth.sample_rate;
            let engine = Engine::new(synth);

            println!(
                "Rendering {} notes ({:.2}s) through {} oscillators...",
                decoded.notes.len(),
                decoded.latest_moment(),
                engine.config().oscillators.len()
            );
            let buffer = engine
                .render(&decoded.notes)
                .context("failed to render score")?;

            println!("Writing {} samples to {:?}...", buffer.len(), output);
            engine::write_wav(&output, &buffer, sample_rate)
                .with_context(|| format!("failed to write {:?}", output))?;

            println!("Done");
        }

        Commands::Inspect { score, max_notes } => {
            let decoded = Decoder::with_capacity(max_notes)
                .decode_file(&score)
                .with_context(|| format!("failed to read score {:?}", score))?;

            println!("{:?}", score);
            println!("  Format: {}", decoded.format);
            println!("  Tracks: {}", decoded.tracks);
            println!("  Division: {} ticks per quarter note", decoded.division);
            println!("  Length: {:.3}s", decoded.latest_moment());
            println!("  Notes: {}", decoded.notes.len());
            if decoded.is_truncated() {
                println!("  Dropped: {} (limit {})", decoded.dropped, max_notes);
            }
            for note in &decoded.notes {
                println!(
                    "    pitch {:3}  velocity {:3}  start {:9.4}s  duration {:8.4}s",
                    note.pitch, note.velocity, note.start_time, note.duration
                );
            }
        }

        Commands::Check { patch } => {
            println!("Checking patch at {:?}...", patch);

            match config::load_config(&patch) {
                Ok(cfg) => {
                    println!("Patch is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Master gain: {}", cfg.master.gain);
                    println!("  Global transpose: {}", cfg.master.transpose);
                    println!(
                        "  Envelope: A {}s  D {}s  S {}  R {}s",
                        cfg.envelope.attack,
                        cfg.envelope.decay,
                        cfg.envelope.sustain,
                        cfg.envelope.release
                    );
                    println!("  Oscillators: {}", cfg.oscillators.len());
                    for (i, osc) in cfg.oscillators.iter().enumerate() {
                        println!(
                            "    {}. {} gain {} transpose {:+} ({} detune voices over {} st)",
                            i + 1,
                            osc.waveform,
                            osc.gain,
                            osc.transpose,
                            osc.detune_voices,
                            osc.detune_amount
                        );
                    }
                }
                Err(e) => {
                    println!("Patch is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_patch = include_str!("../patch.example.yaml");

            let path = "patch.yaml";
            if std::path::Path::new(path).exists() {
                println!("patch.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_patch)?;
                println!("Created patch.yaml with example patch.");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
