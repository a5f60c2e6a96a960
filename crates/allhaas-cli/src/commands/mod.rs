//! CLI command implementations.

pub mod info;
pub mod process;

use allhaas_core::{
    AllpassUnit, DirectFormAllpass, DirectFormQAllpass, FadeCurve, FirstOrderAllpass, TdfAllpass,
};
use allhaas_effects::{HaasEffect, HaasEffectCrossfaded, HaasParams, StereoEffect};
use clap::ValueEnum;

/// All-pass stage topology selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Topology {
    /// One-pole all-pass, no resonance control
    FirstOrder,
    /// Second-order, transposed direct form II
    Tdf2,
    /// Second-order, direct form I, bandwidth tied to cutoff
    Df1,
    /// Second-order, direct form I, with Q
    Df1Q,
}

impl Topology {
    /// Every topology, in display order.
    pub const ALL: [Topology; 4] = [
        Topology::FirstOrder,
        Topology::Tdf2,
        Topology::Df1,
        Topology::Df1Q,
    ];

    /// Display name, as reported by the stage type.
    pub fn name(self) -> &'static str {
        match self {
            Topology::FirstOrder => FirstOrderAllpass::NAME,
            Topology::Tdf2 => TdfAllpass::NAME,
            Topology::Df1 => DirectFormAllpass::NAME,
            Topology::Df1Q => DirectFormQAllpass::NAME,
        }
    }

    /// Whether the feedback controls have any effect.
    pub fn uses_resonance(self) -> bool {
        match self {
            Topology::FirstOrder => FirstOrderAllpass::USES_RESONANCE,
            Topology::Tdf2 => TdfAllpass::USES_RESONANCE,
            Topology::Df1 => DirectFormAllpass::USES_RESONANCE,
            Topology::Df1Q => DirectFormQAllpass::USES_RESONANCE,
        }
    }
}

/// Crossfade curve selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Curve {
    /// Gains sum to one
    Linear,
    /// Powers sum to one
    EqualPower,
}

impl From<Curve> for FadeCurve {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::Linear => FadeCurve::Linear,
            Curve::EqualPower => FadeCurve::EqualPower,
        }
    }
}

/// Boxed effect for a topology, crossfaded unless `crossfade` is false.
pub fn create_effect(
    topology: Topology,
    crossfade: bool,
    curve: Curve,
    sample_rate: f64,
    max_block_size: usize,
) -> Box<dyn StereoEffect<Params = HaasParams>> {
    match topology {
        Topology::FirstOrder => {
            boxed::<FirstOrderAllpass>(crossfade, curve, sample_rate, max_block_size)
        }
        Topology::Tdf2 => boxed::<TdfAllpass>(crossfade, curve, sample_rate, max_block_size),
        Topology::Df1 => boxed::<DirectFormAllpass>(crossfade, curve, sample_rate, max_block_size),
        Topology::Df1Q => {
            boxed::<DirectFormQAllpass>(crossfade, curve, sample_rate, max_block_size)
        }
    }
}

fn boxed<A: AllpassUnit + 'static>(
    crossfade: bool,
    curve: Curve,
    sample_rate: f64,
    max_block_size: usize,
) -> Box<dyn StereoEffect<Params = HaasParams>> {
    if crossfade {
        Box::new(HaasEffectCrossfaded::<A>::with_curve(
            sample_rate,
            max_block_size,
            curve.into(),
        ))
    } else {
        let mut effect = HaasEffect::<A>::new(sample_rate);
        effect.prepare(sample_rate, max_block_size);
        Box::new(effect)
    }
}
