//! AllHaas Core - all-pass building blocks for the Haas/distance effect
//!
//! This crate holds the real-time pieces of the effect: filter stages,
//! their cascades, the crossfade envelope used to swap filter banks, and
//! the peak publisher feeding the XY scope. Nothing in a `process` path
//! allocates, locks or blocks.
//!
//! # Filters
//!
//! - [`AllpassUnit`] - Capability trait shared by every topology
//! - [`FirstOrderAllpass`] - One-pole all-pass
//! - [`TdfAllpass`] - Second-order, transposed direct form II, with Q
//! - [`DirectFormAllpass`] - Second-order, direct form I, bandwidth tied to cutoff
//! - [`DirectFormQAllpass`] - Second-order, direct form I, with Q
//!
//! # Cascades
//!
//! - [`StereoAllpassPair`] - Matched stage per channel
//! - [`AllpassCascade`] - Up to [`MAX_STAGES`] identical stages in series
//! - [`StereoAllpassCascade`] - Independent cascade per channel
//!
//! # Plumbing
//!
//! - [`CrossfadeMixer`] - Sample-exact crossfade envelopes and mixing buses
//! - [`PeakSamplePublisher`] - Lock-free per-block peak pair
//! - [`note_to_freq_hz`] - Pitch to frequency
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! allhaas-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use allhaas_core::{Channel, SlopeSettings, StereoAllpassCascade, TdfAllpass};
//!
//! let mut filters: StereoAllpassCascade<TdfAllpass, 16> = StereoAllpassCascade::new();
//! filters.update_parameters(
//!     SlopeSettings { freq_hz: 130.8, resonance: 0.1, stages: 4 },
//!     SlopeSettings { freq_hz: 587.3, resonance: 0.1, stages: 9 },
//!     48000.0,
//! );
//!
//! let mut left = [0.0f32; 64];
//! left[0] = 1.0;
//! filters.process_block(Channel::Left, &mut left);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod cascade;
pub mod crossfade;
pub mod math;
pub mod peak;

// Re-export main types at crate root
pub use allpass::{
    AllpassUnit, BiquadCoefficients, DirectFormAllpass, DirectFormQAllpass, FirstOrderAllpass,
    TdfAllpass, allpass_fixed_bandwidth_coefficients, allpass_q_coefficients,
    first_order_coefficient,
};
pub use cascade::{
    AllpassCascade, Channel, MAX_STAGES, SlopeSettings, StereoAllpassCascade, StereoAllpassPair,
};
pub use crossfade::{CrossfadeMixer, FadeCurve, add_weighted, copy_weighted};
pub use math::{
    MASTER_TUNE_HZ, NOTES_PER_OCTAVE, REFERENCE_PITCH, flush_denormal, note_to_freq_hz,
    note_to_freq_hz_with, nyquist,
};
pub use peak::PeakSamplePublisher;
