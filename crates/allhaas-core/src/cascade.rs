//! Cascades ("slopes") of identical all-pass stages and their stereo pairings.
//!
//! The distance control is cascade depth, not per-stage detuning: every
//! active stage in a slope carries the same coefficients. They are derived
//! once on stage 0 and copied to the rest, so reconfiguring a 64-stage slope
//! costs one `tan` instead of sixty-four.

use crate::allpass::{AllpassUnit, TdfAllpass};

/// Compile-time stage capacity of an [`AllpassCascade`].
pub const MAX_STAGES: usize = 64;

/// Stereo channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Left (or mid, when the host runs M/S)
    Left,
    /// Right (or side)
    Right,
}

impl Channel {
    /// Both channels in buffer order.
    pub const BOTH: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Array index of the channel.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Settings for one channel of a [`StereoAllpassCascade`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeSettings {
    /// Cutoff in Hz
    pub freq_hz: f64,
    /// Resonance / Q in Hz-equivalent units
    pub resonance: f64,
    /// Number of active stages
    pub stages: usize,
}

// ============================================================================
// StereoAllpassPair
// ============================================================================

/// Two stages with matched coefficients, one per channel.
#[derive(Debug, Clone, Default)]
pub struct StereoAllpassPair<A: AllpassUnit = TdfAllpass> {
    filters: [A; 2],
}

impl<A: AllpassUnit> StereoAllpassPair<A> {
    /// Create a pair of unconfigured stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero both channels' history.
    pub fn reset(&mut self) {
        for f in &mut self.filters {
            f.reset();
        }
    }

    /// Copy coefficients channel-for-channel from another pair.
    pub fn copy_coefficients_from(&mut self, other: &Self) {
        self.filters[0].copy_coefficients_from(&other.filters[0]);
        self.filters[1].copy_coefficients_from(&other.filters[1]);
    }

    /// Derive coefficients on the left stage and mirror them to the right.
    pub fn update_parameters(&mut self, freq_hz: f64, resonance: f64, sample_rate: f64) {
        let [left, right] = &mut self.filters;
        left.update_parameters(freq_hz, resonance, sample_rate);
        right.copy_coefficients_from(left);
    }

    /// Process one sample on one channel.
    #[inline]
    pub fn process(&mut self, input: f64, channel: Channel) -> f64 {
        self.filters[channel.index()].process(input)
    }

    /// Stage for a channel.
    pub fn filter(&self, channel: Channel) -> &A {
        &self.filters[channel.index()]
    }
}

// ============================================================================
// AllpassCascade
// ============================================================================

/// Fixed-capacity series of identical all-pass stages on one channel.
///
/// Capacity `N` is a compile-time constant; the number of stages that
/// actually run is set per [`update_parameters`](Self::update_parameters)
/// call and clamped to `[0, N]`. Zero stages is an exact passthrough.
///
/// # Example
///
/// ```rust
/// use allhaas_core::{AllpassCascade, TdfAllpass};
///
/// let mut slope: AllpassCascade<TdfAllpass, 16> = AllpassCascade::new();
/// slope.update_parameters(800.0, 0.5, 48000.0, 8);
/// let y = slope.process(1.0);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct AllpassCascade<A: AllpassUnit = TdfAllpass, const N: usize = MAX_STAGES> {
    stages: [A; N],
    active: usize,
}

impl<A: AllpassUnit, const N: usize> AllpassCascade<A, N> {
    /// Create a cascade with no active stages.
    pub fn new() -> Self {
        Self {
            stages: core::array::from_fn(|_| A::default()),
            active: 0,
        }
    }

    /// Stage capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of stages that run per sample.
    pub fn stage_count(&self) -> usize {
        self.active
    }

    /// Stage at `index`, active or not.
    pub fn stage(&self, index: usize) -> Option<&A> {
        self.stages.get(index)
    }

    /// Zero every stage's history. Coefficients and stage count are kept.
    ///
    /// Inactive stages are cleared too, so a later increase of the stage
    /// count never resurrects stale history.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Configure the slope.
    ///
    /// Coefficients are derived once on stage 0 and copied to stages
    /// `1..stage_count`.
    pub fn update_parameters(
        &mut self,
        freq_hz: f64,
        resonance: f64,
        sample_rate: f64,
        stage_count: usize,
    ) {
        self.active = stage_count.min(N);
        let Some((first, rest)) = self.stages.split_first_mut() else {
            return;
        };
        first.update_parameters(freq_hz, resonance, sample_rate);
        for stage in rest.iter_mut().take(self.active.saturating_sub(1)) {
            stage.copy_coefficients_from(first);
        }
    }

    /// Take stage 0's coefficients from another cascade and replicate them
    /// over `stage_count` stages without re-deriving.
    pub fn copy_from(&mut self, other: &Self, stage_count: usize) {
        self.active = stage_count.min(N);
        let Some(source) = other.stages.first() else {
            return;
        };
        for stage in self.stages.iter_mut().take(self.active.max(1)) {
            stage.copy_coefficients_from(source);
        }
    }

    /// Run one sample through all active stages in series.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.stages[..self.active]
            .iter_mut()
            .fold(input, |acc, stage| stage.process(acc))
    }
}

impl<A: AllpassUnit, const N: usize> Default for AllpassCascade<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// StereoAllpassCascade
// ============================================================================

/// One independent [`AllpassCascade`] per channel.
///
/// Left and right each get their own cutoff, resonance and depth; the
/// asymmetry between them is what places the source in the stereo field.
#[derive(Debug, Clone, Default)]
pub struct StereoAllpassCascade<A: AllpassUnit = TdfAllpass, const N: usize = MAX_STAGES> {
    slopes: [AllpassCascade<A, N>; 2],
}

impl<A: AllpassUnit, const N: usize> StereoAllpassCascade<A, N> {
    /// Create a stereo cascade with no active stages.
    pub fn new() -> Self {
        Self {
            slopes: [AllpassCascade::new(), AllpassCascade::new()],
        }
    }

    /// Zero both slopes' history.
    pub fn reset(&mut self) {
        for slope in &mut self.slopes {
            slope.reset();
        }
    }

    /// Configure both channels independently.
    pub fn update_parameters(&mut self, left: SlopeSettings, right: SlopeSettings, sample_rate: f64) {
        for (slope, s) in self.slopes.iter_mut().zip([left, right]) {
            slope.update_parameters(s.freq_hz, s.resonance, sample_rate, s.stages);
        }
    }

    /// Process one sample on one channel.
    #[inline]
    pub fn process(&mut self, input: f64, channel: Channel) -> f64 {
        self.slopes[channel.index()].process(input)
    }

    /// Filter a channel buffer in place.
    pub fn process_block(&mut self, channel: Channel, buffer: &mut [f32]) {
        let slope = &mut self.slopes[channel.index()];
        for sample in buffer.iter_mut() {
            *sample = slope.process(f64::from(*sample)) as f32;
        }
    }

    /// Filter `input` into `output` for one channel.
    ///
    /// Processes `min(input.len(), output.len())` samples.
    pub fn process_block_into(&mut self, channel: Channel, input: &[f32], output: &mut [f32]) {
        let slope = &mut self.slopes[channel.index()];
        for (out, &inp) in output.iter_mut().zip(input) {
            *out = slope.process(f64::from(inp)) as f32;
        }
    }

    /// Slope for a channel.
    pub fn slope(&self, channel: Channel) -> &AllpassCascade<A, N> {
        &self.slopes[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allpass::{DirectFormAllpass, FirstOrderAllpass};

    const SR: f64 = 48000.0;

    #[test]
    fn zero_stages_is_passthrough() {
        let mut slope: AllpassCascade<TdfAllpass, 8> = AllpassCascade::new();
        slope.update_parameters(1000.0, 0.7, SR, 0);
        assert_eq!(slope.stage_count(), 0);
        for n in 0..256 {
            let x = libm::sin(n as f64 * 0.1);
            assert_eq!(slope.process(x), x);
        }
    }

    #[test]
    fn stage_count_is_clamped() {
        let mut slope: AllpassCascade<FirstOrderAllpass, 4> = AllpassCascade::new();
        slope.update_parameters(1000.0, 0.0, SR, 100);
        assert_eq!(slope.stage_count(), 4);
        assert_eq!(slope.capacity(), 4);
    }

    #[test]
    fn coefficients_replicated_to_active_stages() {
        let mut slope: AllpassCascade<TdfAllpass, 16> = AllpassCascade::new();
        slope.update_parameters(1234.0, 2.5, SR, 10);
        let reference = slope.stage(0).map(AllpassUnit::coefficients);
        for i in 0..10 {
            assert_eq!(slope.stage(i).map(AllpassUnit::coefficients), reference, "stage {i}");
        }
        // Inactive stages are left alone
        assert_ne!(slope.stage(10).map(AllpassUnit::coefficients), reference);
    }

    #[test]
    fn cascade_equals_manual_series() {
        let mut slope: AllpassCascade<DirectFormAllpass, 8> = AllpassCascade::new();
        slope.update_parameters(500.0, 0.0, SR, 3);

        let mut manual = [DirectFormAllpass::default(); 3];
        for stage in &mut manual {
            stage.update_parameters(500.0, 0.0, SR);
        }

        for n in 0..200 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let expected = manual.iter_mut().fold(x, |acc, s| s.process(acc));
            assert_eq!(slope.process(x), expected);
        }
    }

    #[test]
    fn copy_from_replicates_without_deriving() {
        let mut source: AllpassCascade<TdfAllpass, 8> = AllpassCascade::new();
        source.update_parameters(900.0, 1.0, SR, 1);

        let mut target: AllpassCascade<TdfAllpass, 8> = AllpassCascade::new();
        target.copy_from(&source, 5);
        assert_eq!(target.stage_count(), 5);
        let reference = source.stage(0).map(AllpassUnit::coefficients);
        for i in 0..5 {
            assert_eq!(target.stage(i).map(AllpassUnit::coefficients), reference);
        }
    }

    #[test]
    fn reset_clears_inactive_stages_too() {
        let mut slope: AllpassCascade<TdfAllpass, 4> = AllpassCascade::new();
        slope.update_parameters(1000.0, 0.5, SR, 4);
        for _ in 0..32 {
            slope.process(0.7);
        }
        slope.update_parameters(1000.0, 0.5, SR, 1);
        slope.reset();
        for i in 0..4 {
            assert_eq!(slope.stage(i).map(TdfAllpass::state), Some((0.0, 0.0)));
        }
    }

    #[test]
    fn stereo_channels_are_independent() {
        let mut cascade: StereoAllpassCascade<TdfAllpass, 8> = StereoAllpassCascade::new();
        cascade.update_parameters(
            SlopeSettings { freq_hz: 300.0, resonance: 0.5, stages: 2 },
            SlopeSettings { freq_hz: 3000.0, resonance: 2.0, stages: 6 },
            SR,
        );
        assert_eq!(cascade.slope(Channel::Left).stage_count(), 2);
        assert_eq!(cascade.slope(Channel::Right).stage_count(), 6);

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        left[0] = 1.0;
        right[0] = 1.0;
        cascade.process_block(Channel::Left, &mut left);
        cascade.process_block(Channel::Right, &mut right);
        assert_ne!(left, right);

        // Processing the right channel did not advance the left slope
        let mut fresh: StereoAllpassCascade<TdfAllpass, 8> = StereoAllpassCascade::new();
        fresh.update_parameters(
            SlopeSettings { freq_hz: 300.0, resonance: 0.5, stages: 2 },
            SlopeSettings { freq_hz: 1.0, resonance: 1.0, stages: 0 },
            SR,
        );
        let mut again = [0.0f32; 64];
        again[0] = 1.0;
        fresh.process_block(Channel::Left, &mut again);
        assert_eq!(left, again);
    }

    #[test]
    fn block_into_matches_in_place() {
        let settings = SlopeSettings { freq_hz: 1500.0, resonance: 0.8, stages: 4 };
        let mut a: StereoAllpassCascade<TdfAllpass, 8> = StereoAllpassCascade::new();
        let mut b = a.clone();
        a.update_parameters(settings, settings, SR);
        b.update_parameters(settings, settings, SR);

        let input: Vec<f32> = (0..128).map(|n| (n as f32 * 0.2).sin()).collect();
        let mut in_place = input.clone();
        let mut out = vec![0.0f32; 128];
        a.process_block(Channel::Right, &mut in_place);
        b.process_block_into(Channel::Right, &input, &mut out);
        assert_eq!(in_place, out);
    }

    #[test]
    fn pair_mirrors_coefficients() {
        let mut pair: StereoAllpassPair<TdfAllpass> = StereoAllpassPair::new();
        pair.update_parameters(2000.0, 0.3, SR);
        assert_eq!(
            pair.filter(Channel::Left).coefficients(),
            pair.filter(Channel::Right).coefficients()
        );

        let l = pair.process(1.0, Channel::Left);
        let r = pair.process(1.0, Channel::Right);
        assert_eq!(l, r);

        pair.reset();
        assert_eq!(pair.filter(Channel::Left).state(), (0.0, 0.0));

        let mut other: StereoAllpassPair<TdfAllpass> = StereoAllpassPair::new();
        other.copy_coefficients_from(&pair);
        assert_eq!(
            other.filter(Channel::Right).coefficients(),
            pair.filter(Channel::Right).coefficients()
        );
    }
}
