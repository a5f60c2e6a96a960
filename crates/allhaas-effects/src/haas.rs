//! Haas effect on a single stereo cascade.

use allhaas_core::{AllpassUnit, Channel, MAX_STAGES, StereoAllpassCascade, TdfAllpass};

use crate::{HaasParams, StereoEffect};

/// Distance effect: an independent all-pass cascade per channel.
///
/// Parameters are compared against the last set seen; coefficients are
/// derived only when something changed. The comparison is a performance
/// guard, recomputing identical coefficients would change nothing.
///
/// Coefficients are replaced on the live filters, so large parameter jumps
/// can click. [`HaasEffectCrossfaded`](crate::HaasEffectCrossfaded) avoids
/// that at twice the cost during a fade.
///
/// # Example
///
/// ```rust
/// use allhaas_effects::{HaasEffect, HaasParams, StereoEffect};
///
/// let mut haas: HaasEffect = HaasEffect::new(48000.0);
/// let mut left = [0.5f32; 64];
/// let mut right = [0.5f32; 64];
/// haas.process(&mut left, &mut right, &HaasParams::default());
/// haas.process(&mut left, &mut right, &HaasParams::default());
/// assert_eq!(haas.reconfigurations(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HaasEffect<A: AllpassUnit = TdfAllpass, const N: usize = MAX_STAGES> {
    filters: StereoAllpassCascade<A, N>,
    /// Last applied parameters; `None` until the first block
    cached: Option<HaasParams>,
    sample_rate: f64,
    reconfigurations: u64,
}

impl<A: AllpassUnit, const N: usize> HaasEffect<A, N> {
    /// Create an effect for the given sample rate.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            filters: StereoAllpassCascade::new(),
            cached: None,
            sample_rate,
            reconfigurations: 0,
        }
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of times coefficients have been derived.
    pub fn reconfigurations(&self) -> u64 {
        self.reconfigurations
    }

    /// Parameters currently applied to the filters.
    pub fn current_params(&self) -> Option<HaasParams> {
        self.cached
    }

    /// The stereo cascade.
    pub fn filters(&self) -> &StereoAllpassCascade<A, N> {
        &self.filters
    }

    fn configure(&mut self, params: &HaasParams) {
        let [left, right] = params.slopes();
        self.filters.update_parameters(left, right, self.sample_rate);
        self.cached = Some(*params);
        self.reconfigurations += 1;
    }
}

impl<A: AllpassUnit, const N: usize> StereoEffect for HaasEffect<A, N> {
    type Params = HaasParams;

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.cached = None;
        self.filters.reset();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            max_block_size,
            topology = A::NAME,
            capacity = N,
            "haas effect prepared"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = max_block_size;
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32], params: &HaasParams) {
        let len = left.len().min(right.len());
        if len == 0 {
            return;
        }
        if self.cached.as_ref() != Some(params) {
            self.configure(params);
        }
        self.filters.process_block(Channel::Left, &mut left[..len]);
        self.filters.process_block(Channel::Right, &mut right[..len]);
    }

    fn reset(&mut self) {
        self.filters.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allhaas_core::FirstOrderAllpass;

    fn impulse(len: usize) -> Vec<f32> {
        let mut buf = vec![0.0; len];
        buf[0] = 1.0;
        buf
    }

    #[test]
    fn first_block_configures() {
        let mut haas: HaasEffect = HaasEffect::new(48000.0);
        assert_eq!(haas.current_params(), None);
        let (mut l, mut r) = (impulse(32), impulse(32));
        haas.process(&mut l, &mut r, &HaasParams::default());
        assert_eq!(haas.reconfigurations(), 1);
        assert_eq!(haas.current_params(), Some(HaasParams::default()));
        assert_eq!(haas.filters().slope(Channel::Left).stage_count(), 1);
    }

    #[test]
    fn identical_params_skip_derivation() {
        let mut haas: HaasEffect = HaasEffect::new(48000.0);
        let params = HaasParams {
            stages_left: 6,
            ..HaasParams::default()
        };
        let mut buf = [0.1f32; 16];
        let mut buf_r = [0.1f32; 16];
        for _ in 0..5 {
            haas.process(&mut buf, &mut buf_r, &params);
        }
        assert_eq!(haas.reconfigurations(), 1);

        let changed = HaasParams {
            feedback_right: 2.0,
            ..params
        };
        haas.process(&mut buf, &mut buf_r, &changed);
        assert_eq!(haas.reconfigurations(), 2);
    }

    #[test]
    fn zero_length_block_is_noop() {
        let mut haas: HaasEffect = HaasEffect::new(48000.0);
        haas.process(&mut [], &mut [], &HaasParams::default());
        assert_eq!(haas.reconfigurations(), 0);
        assert_eq!(haas.current_params(), None);
    }

    #[test]
    fn prepare_forces_reconfiguration() {
        let mut haas: HaasEffect = HaasEffect::new(48000.0);
        let params = HaasParams::default();
        let (mut l, mut r) = (impulse(8), impulse(8));
        haas.process(&mut l, &mut r, &params);
        haas.prepare(44100.0, 256);
        assert_eq!(haas.sample_rate(), 44100.0);
        assert_eq!(haas.current_params(), None);
        haas.process(&mut l, &mut r, &params);
        assert_eq!(haas.reconfigurations(), 2);
    }

    #[test]
    fn reset_then_same_params_matches_fresh() {
        let params = HaasParams {
            cutoff_left: 60.0,
            stages_left: 4,
            stages_right: 9,
            ..HaasParams::default()
        };
        let mut used: HaasEffect<FirstOrderAllpass, 16> = HaasEffect::new(48000.0);
        let mut noise_l = [0.7f32; 128];
        let mut noise_r = [-0.2f32; 128];
        used.process(&mut noise_l, &mut noise_r, &params);
        used.reset();

        let mut fresh: HaasEffect<FirstOrderAllpass, 16> = HaasEffect::new(48000.0);
        let (mut a_l, mut a_r) = (impulse(64), impulse(64));
        let (mut b_l, mut b_r) = (impulse(64), impulse(64));
        used.process(&mut a_l, &mut a_r, &params);
        fresh.process(&mut b_l, &mut b_r, &params);
        assert_eq!(a_l, b_l);
        assert_eq!(a_r, b_r);
        assert_eq!(used.reconfigurations(), 1);
    }

    #[test]
    fn mismatched_lengths_use_common_prefix() {
        let mut haas: HaasEffect = HaasEffect::new(48000.0);
        let mut l = [1.0f32; 8];
        let mut r = [1.0f32; 4];
        haas.process(&mut l, &mut r, &HaasParams::default());
        assert_eq!(&l[4..], &[1.0; 4]);
    }
}
