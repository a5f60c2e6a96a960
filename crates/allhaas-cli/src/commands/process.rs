//! File-based effect processing command.

use super::{Curve, Topology, create_effect};
use crate::scope::ScopePoller;
use allhaas_core::PeakSamplePublisher;
use allhaas_effects::params::{CUTOFF_LEFT, CUTOFF_RIGHT, DISTANCE, FEEDBACK};
use allhaas_effects::{HaasParams, StereoConfig, StereoRouting};
use allhaas_io::{StereoSamples, WavSpec, read_wav_stereo, write_wav_stereo};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono input is duplicated to both channels)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (always stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Left cutoff as a MIDI pitch
    #[arg(long, default_value_t = CUTOFF_LEFT.default)]
    cutoff_left: f64,

    /// Right cutoff as a MIDI pitch
    #[arg(long, default_value_t = CUTOFF_RIGHT.default)]
    cutoff_right: f64,

    /// Left feedback (Q)
    #[arg(long, default_value_t = FEEDBACK.default)]
    feedback_left: f64,

    /// Right feedback (Q)
    #[arg(long, default_value_t = FEEDBACK.default)]
    feedback_right: f64,

    /// Left distance (number of all-pass stages)
    #[arg(long, default_value_t = DISTANCE.default)]
    distance_left: f64,

    /// Right distance (number of all-pass stages)
    #[arg(long, default_value_t = DISTANCE.default)]
    distance_right: f64,

    /// Time in seconds at which the `--to-*` settings take over
    #[arg(long, value_name = "SECONDS")]
    switch_at: Option<f64>,

    /// Left cutoff after the switch
    #[arg(long)]
    to_cutoff_left: Option<f64>,

    /// Right cutoff after the switch
    #[arg(long)]
    to_cutoff_right: Option<f64>,

    /// Left feedback after the switch
    #[arg(long)]
    to_feedback_left: Option<f64>,

    /// Right feedback after the switch
    #[arg(long)]
    to_feedback_right: Option<f64>,

    /// Left distance after the switch
    #[arg(long)]
    to_distance_left: Option<f64>,

    /// Right distance after the switch
    #[arg(long)]
    to_distance_right: Option<f64>,

    /// All-pass stage topology
    #[arg(long, value_enum, default_value_t = Topology::Tdf2)]
    topology: Topology,

    /// Crossfade curve between filter banks
    #[arg(long, value_enum, default_value_t = Curve::Linear)]
    curve: Curve,

    /// Apply parameter changes immediately instead of crossfading
    #[arg(long)]
    no_crossfade: bool,

    /// Process mid/side instead of left/right
    #[arg(long)]
    mid_side: bool,

    /// Fold the output to mono
    #[arg(long)]
    mono: bool,

    /// Poll block peaks from a background thread (logged at debug level)
    #[arg(long)]
    scope: bool,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

impl ProcessArgs {
    fn initial_params(&self) -> HaasParams {
        HaasParams::from_controls(
            [self.cutoff_left, self.cutoff_right],
            [self.feedback_left, self.feedback_right],
            [self.distance_left, self.distance_right],
        )
    }

    fn switched_params(&self) -> HaasParams {
        HaasParams::from_controls(
            [
                self.to_cutoff_left.unwrap_or(self.cutoff_left),
                self.to_cutoff_right.unwrap_or(self.cutoff_right),
            ],
            [
                self.to_feedback_left.unwrap_or(self.feedback_left),
                self.to_feedback_right.unwrap_or(self.feedback_right),
            ],
            [
                self.to_distance_left.unwrap_or(self.distance_left),
                self.to_distance_right.unwrap_or(self.distance_right),
            ],
        )
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth {} (use 16, 24 or 32)", args.bit_depth);
    }

    println!("Reading {}...", args.input.display());
    let (mut samples, spec) = read_wav_stereo(&args.input)?;
    let sample_rate = f64::from(spec.sample_rate);

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        samples.len(),
        spec.channels,
        spec.sample_rate,
        samples.len() as f64 / sample_rate
    );

    let initial = args.initial_params();
    let switch = match args.switch_at {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            Some(((seconds * sample_rate) as usize, args.switched_params()))
        }
        Some(seconds) => anyhow::bail!("Invalid switch time: {seconds}"),
        None => None,
    };

    let routing = StereoRouting {
        config: if args.mid_side {
            StereoConfig::MidSide
        } else {
            StereoConfig::LeftRight
        },
        mono: args.mono,
    };
    let mut effect = create_effect(
        args.topology,
        !args.no_crossfade,
        args.curve,
        sample_rate,
        args.block_size,
    );

    println!(
        "Processing with {} ({}), L {} stage(s) at pitch {:.1}, R {} stage(s) at pitch {:.1}...",
        args.topology.name(),
        if args.no_crossfade {
            "immediate"
        } else {
            "crossfaded"
        },
        initial.stages_left,
        initial.cutoff_left,
        initial.stages_right,
        initial.cutoff_right,
    );
    if !args.topology.uses_resonance() {
        tracing::info!(topology = args.topology.name(), "feedback is ignored by this topology");
    }
    if let Some((at, params)) = &switch {
        tracing::info!(sample = at, ?params, "parameter switch scheduled");
    }

    let input_rms = samples.rms();
    let input_peak = samples.peak();

    let publisher = Arc::new(PeakSamplePublisher::new());
    let scope = if args.scope {
        Some(ScopePoller::spawn(Arc::clone(&publisher))?)
    } else {
        None
    };

    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let total = samples.len();
    let block_size = args.block_size;
    let (left, right) = samples.channels_mut();
    for (i, (l, r)) in left
        .chunks_mut(block_size)
        .zip(right.chunks_mut(block_size))
        .enumerate()
    {
        let start = i * block_size;
        let params = match &switch {
            Some((at, switched)) if start >= *at => switched,
            _ => &initial,
        };
        routing.apply(l, r, |l, r| effect.process(l, r, params));
        publisher.publish(l, r);
        pb.set_position((start + block_size).min(total) as u64);
    }

    pb.finish_with_message("done");

    if let Some(scope) = scope {
        let frames = scope.finish();
        tracing::info!(frames, "scope stopped");
    }

    print_stats(input_rms, input_peak, &samples);

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &samples, out_spec)?;
    println!("Done!");

    Ok(())
}

fn print_stats(input_rms: [f32; 2], input_peak: [f32; 2], output: &StereoSamples) {
    let output_rms = output.rms();
    let output_peak = output.peak();

    println!("\nStats:");
    for (label, ch) in [("L", 0), ("R", 1)] {
        println!(
            "  {label} Input:  RMS {:.1} dB, Peak {:.1} dB",
            linear_to_db(input_rms[ch]),
            linear_to_db(input_peak[ch])
        );
        println!(
            "  {label} Output: RMS {:.1} dB, Peak {:.1} dB",
            linear_to_db(output_rms[ch]),
            linear_to_db(output_peak[ch])
        );
    }
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
