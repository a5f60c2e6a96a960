//! AllHaas Effects - stereo distance effect built on all-pass cascades
//!
//! Two processors share one per-block interface, [`StereoEffect`]:
//!
//! - [`HaasEffect`] - One stereo cascade, reconfigured in place
//! - [`HaasEffectCrossfaded`] - Two cascades, parameter changes crossfaded
//!   over [`FADE_LENGTH_MS`]
//!
//! Both take the six-value [`HaasParams`] per block. Parameter ranges for
//! hosts live in [`params`]; mid/side and mono routing in [`routing`].
//!
//! ## Example
//!
//! ```rust
//! use allhaas_effects::{HaasEffectCrossfaded, HaasParams, StereoEffect};
//!
//! let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(48000.0, 512);
//! let params = HaasParams { stages_left: 8, stages_right: 24, ..HaasParams::default() };
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! left[0] = 1.0;
//! right[0] = 1.0;
//! haas.process(&mut left, &mut right, &params);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod haas;
pub mod haas_crossfaded;
pub mod params;
pub mod routing;

// Re-export main types at crate root
pub use haas::HaasEffect;
pub use haas_crossfaded::{FADE_LENGTH_MS, HaasEffectCrossfaded};
pub use params::{HaasParams, ParamRange};
pub use routing::{StereoConfig, StereoRouting};

/// Block-based stereo processor driven by a per-block parameter set.
///
/// The trait is object-safe, so hosts can pick an implementation at
/// runtime (`Box<dyn StereoEffect<Params = HaasParams>>`).
pub trait StereoEffect {
    /// Parameter set consumed once per block.
    type Params;

    /// Set the stream format.
    ///
    /// Must run before the first [`process`](Self::process) and whenever the
    /// sample rate or maximum block size changes. Clears cached parameters
    /// and all filter state. The only call that may allocate.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize);

    /// Process a block in place.
    ///
    /// The block length is `min(left.len(), right.len())`. A zero-length
    /// block does nothing.
    fn process(&mut self, left: &mut [f32], right: &mut [f32], params: &Self::Params);

    /// Zero all filter history. Cached parameters and coefficients are kept.
    fn reset(&mut self);
}
