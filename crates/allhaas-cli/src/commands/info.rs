//! Effect settings and WAV file metadata.

use super::Topology;
use allhaas_core::{MAX_STAGES, TdfAllpass, note_to_freq_hz};
use allhaas_effects::params::{CUTOFF_LEFT, CUTOFF_RIGHT, DISTANCE, FEEDBACK};
use allhaas_effects::{FADE_LENGTH_MS, HaasEffectCrossfaded, ParamRange};
use allhaas_io::{WavFormat, read_wav_info};
use clap::Args;
use std::path::Path;

/// Display effect settings, or information about a WAV file.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to a WAV file; omit to describe the effect itself
    pub file: Option<std::path::PathBuf>,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    match &args.file {
        Some(path) => file_info(path),
        None => {
            effect_info();
            Ok(())
        }
    }
}

fn effect_info() {
    println!("Topologies:");
    for topology in Topology::ALL {
        let feedback = if topology.uses_resonance() {
            "feedback sets Q"
        } else {
            "feedback ignored"
        };
        println!("  {:<12} {feedback}", topology.name());
    }

    println!("\nMax stages:  {MAX_STAGES} per channel");
    println!("Fade length: {FADE_LENGTH_MS} ms");
    for rate in [44100.0, 48000.0, 96000.0] {
        let haas: HaasEffectCrossfaded<TdfAllpass> = HaasEffectCrossfaded::new(rate, 1);
        println!("  {:>6} Hz: {} samples", rate, haas.fade_len());
    }

    println!("\nParameters:");
    for range in [&DISTANCE, &CUTOFF_LEFT, &CUTOFF_RIGHT, &FEEDBACK] {
        print_range(range);
    }

    println!("\nDefault cutoffs:");
    for (label, note) in [("L/M", CUTOFF_LEFT.default), ("R/S", CUTOFF_RIGHT.default)] {
        println!(
            "  {label}  {:>5.1} ({:<3}) = {:.2} Hz",
            note,
            note_name(note),
            note_to_freq_hz(note)
        );
    }
}

fn print_range(range: &ParamRange) {
    println!(
        "  {:<12} {:>6.1} .. {:<6.1} default {:<6.1} {}",
        range.name, range.min, range.max, range.default, range.unit
    );
}

fn file_info(path: &Path) -> anyhow::Result<()> {
    let info = read_wav_info(path)?;

    let format_str = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", path.display());
    println!("Format:      {} {}-bit", format_str, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    Ok(())
}

/// Scientific pitch name of the nearest MIDI note (60 = C4).
fn note_name(note: f64) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let n = note.round() as i64;
    let octave = n.div_euclid(12) - 1;
    format!("{}{octave}", NAMES[n.rem_euclid(12) as usize])
}
