//! Haas effect with click-free parameter changes.
//!
//! Replacing all-pass coefficients under a running filter leaves its state
//! computed for the old transfer function, and the output jumps. Here a
//! change goes to a second, silent filter bank instead, and the output
//! crossfades from the old bank to the new one.
//!
//! ```text
//!            params differ, no fade running
//!   Idle ───────────────────────────────────▶ Fading
//!    ▲                                          │ params differ: dropped
//!    └───────────── envelope complete ◀─────────┘
//! ```

use allhaas_core::{
    AllpassUnit, Channel, CrossfadeMixer, FadeCurve, MAX_STAGES, StereoAllpassCascade, TdfAllpass,
};

use crate::{HaasParams, StereoEffect};

/// Crossfade duration between filter banks.
pub const FADE_LENGTH_MS: f32 = 40.0;

/// Distance effect with two filter banks and a crossfade between them.
///
/// While idle only the active bank runs. When the parameters change and no
/// fade is running, the spare bank is configured, cleared to silence, and
/// faded in while the active bank fades out. Changes arriving during a fade
/// are dropped; since the cache still holds the old parameters, the same
/// change is picked up again on the first block after the fade ends.
///
/// # Example
///
/// ```rust
/// use allhaas_effects::{HaasEffectCrossfaded, HaasParams, StereoEffect};
///
/// let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(48000.0, 256);
/// let mut left = [0.25f32; 256];
/// let mut right = [0.25f32; 256];
///
/// haas.process(&mut left, &mut right, &HaasParams::default());
/// assert!(!haas.is_fading()); // first configuration has nothing to fade from
///
/// let farther = HaasParams { stages_left: 12, ..HaasParams::default() };
/// haas.process(&mut left, &mut right, &farther);
/// assert!(haas.is_fading());
/// ```
#[derive(Debug, Clone)]
pub struct HaasEffectCrossfaded<A: AllpassUnit = TdfAllpass, const N: usize = MAX_STAGES> {
    tracks: [StereoAllpassCascade<A, N>; 2],
    mixer: CrossfadeMixer<2>,
    /// Parameters of the active (or incoming) bank; `None` until the first block
    cached: Option<HaasParams>,
    sample_rate: f64,
    reconfigurations: u64,
    dropped_changes: u64,
}

impl<A: AllpassUnit, const N: usize> HaasEffectCrossfaded<A, N> {
    /// Create and prepare an effect with a linear crossfade.
    pub fn new(sample_rate: f64, max_block_size: usize) -> Self {
        Self::with_curve(sample_rate, max_block_size, FadeCurve::Linear)
    }

    /// Create and prepare an effect with a specific crossfade curve.
    pub fn with_curve(sample_rate: f64, max_block_size: usize, curve: FadeCurve) -> Self {
        let mut effect = Self {
            tracks: [StereoAllpassCascade::new(), StereoAllpassCascade::new()],
            mixer: CrossfadeMixer::with_curve(curve),
            cached: None,
            sample_rate,
            reconfigurations: 0,
            dropped_changes: 0,
        };
        effect.prepare(sample_rate, max_block_size);
        effect
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Whether a crossfade is in progress.
    pub fn is_fading(&self) -> bool {
        self.mixer.still_fading()
    }

    /// Index of the bank that is (or is becoming) audible.
    pub fn active_track(&self) -> usize {
        self.mixer.active_index()
    }

    /// A filter bank by index (0 or 1).
    pub fn track(&self, index: usize) -> Option<&StereoAllpassCascade<A, N>> {
        self.tracks.get(index)
    }

    /// Number of times a bank has been configured.
    pub fn reconfigurations(&self) -> u64 {
        self.reconfigurations
    }

    /// Number of blocks whose parameter change was dropped because a fade
    /// was running.
    pub fn dropped_changes(&self) -> u64 {
        self.dropped_changes
    }

    /// Parameters of the active (or incoming) bank.
    pub fn current_params(&self) -> Option<HaasParams> {
        self.cached
    }

    /// Fade length in samples at the current sample rate.
    pub fn fade_len(&self) -> u32 {
        self.mixer.fade_len()
    }

    /// Configure the spare bank, clear it and start fading towards it.
    fn start_fade(&mut self, params: &HaasParams) {
        let track = self.mixer.init();
        let [left, right] = params.slopes();
        let bank = &mut self.tracks[track];
        bank.update_parameters(left, right, self.sample_rate);
        bank.reset();
        self.cached = Some(*params);
        self.reconfigurations += 1;
    }
}

impl<A: AllpassUnit, const N: usize> StereoEffect for HaasEffectCrossfaded<A, N> {
    type Params = HaasParams;

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.cached = None;
        for bank in &mut self.tracks {
            bank.reset();
        }
        self.mixer.prepare(sample_rate as f32, FADE_LENGTH_MS, max_block_size);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            max_block_size,
            topology = A::NAME,
            capacity = N,
            fade_len = self.mixer.fade_len(),
            "crossfaded haas effect prepared"
        );
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32], params: &HaasParams) {
        let len = left.len().min(right.len());
        if len == 0 {
            return;
        }
        let (left, right) = (&mut left[..len], &mut right[..len]);

        if self.cached.as_ref() != Some(params) {
            if self.mixer.still_fading() {
                self.dropped_changes += 1;
            } else {
                self.start_fade(params);
            }
        }

        if self.mixer.still_fading() {
            let tracks = &mut self.tracks;
            self.mixer.render(left, right, |track, in_l, in_r, out_l, out_r| {
                let bank = &mut tracks[track];
                bank.process_block_into(Channel::Left, in_l, out_l);
                bank.process_block_into(Channel::Right, in_r, out_r);
            });
        } else {
            let bank = &mut self.tracks[self.mixer.active_index()];
            bank.process_block(Channel::Left, left);
            bank.process_block(Channel::Right, right);
        }
    }

    fn reset(&mut self) {
        for bank in &mut self.tracks {
            bank.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn near() -> HaasParams {
        HaasParams {
            stages_left: 2,
            stages_right: 2,
            ..HaasParams::default()
        }
    }

    fn far() -> HaasParams {
        HaasParams {
            stages_left: 24,
            stages_right: 3,
            cutoff_right: 70.0,
            ..HaasParams::default()
        }
    }

    fn run(haas: &mut HaasEffectCrossfaded, params: &HaasParams, len: usize) {
        let mut l = vec![0.3f32; len];
        let mut r = vec![-0.3f32; len];
        haas.process(&mut l, &mut r, params);
    }

    #[test]
    fn fade_length_is_forty_ms() {
        let haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 128);
        assert_eq!(haas.fade_len(), 1920);
    }

    #[test]
    fn first_block_configures_without_fade() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 128);
        run(&mut haas, &near(), 128);
        assert_eq!(haas.reconfigurations(), 1);
        assert!(!haas.is_fading());
        assert_eq!(haas.current_params(), Some(near()));
    }

    #[test]
    fn change_starts_fade_on_spare_bank() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 128);
        run(&mut haas, &near(), 128);
        let first = haas.active_track();

        run(&mut haas, &far(), 128);
        assert!(haas.is_fading());
        assert_ne!(haas.active_track(), first);
        let depth = |track: usize| {
            haas.track(track)
                .map(|t| t.slope(Channel::Left).stage_count())
        };
        assert_eq!(depth(haas.active_track()), Some(24));
        assert_eq!(depth(first), Some(2));
    }

    #[test]
    fn changes_during_fade_are_dropped_then_retried() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 128);
        run(&mut haas, &near(), 128);
        run(&mut haas, &far(), 128);
        let spare = 1 - haas.active_track();

        let third = HaasParams {
            cutoff_left: 30.0,
            ..far()
        };
        run(&mut haas, &third, 128);
        assert_eq!(haas.current_params(), Some(far()));
        assert_eq!(haas.reconfigurations(), 2);
        assert_eq!(haas.dropped_changes(), 1);
        // The outgoing bank keeps its settings until the fade ends
        let spare_stages = haas.track(spare).map(|t| t.slope(Channel::Left).stage_count());
        assert_eq!(spare_stages, Some(2));

        // Drain the rest of the 1920-sample fade
        let mut blocks = 0;
        while haas.is_fading() {
            run(&mut haas, &third, 128);
            blocks += 1;
        }
        assert_eq!(blocks, 13); // 15 blocks of 128 cover 1920 samples
        assert_eq!(haas.reconfigurations(), 2);

        run(&mut haas, &third, 128);
        assert_eq!(haas.current_params(), Some(third));
        assert_eq!(haas.reconfigurations(), 3);
        assert!(haas.is_fading());
    }

    #[test]
    fn idle_blocks_touch_only_the_active_bank() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 64);
        run(&mut haas, &near(), 64);
        run(&mut haas, &far(), 64);
        while haas.is_fading() {
            run(&mut haas, &far(), 64);
        }
        let spare = 1 - haas.active_track();
        let before = haas.track(spare).cloned();

        let mut l = [0.9f32; 64];
        let mut r = [0.9f32; 64];
        haas.process(&mut l, &mut r, &far());

        let after = haas.track(spare).cloned();
        let history = |t: Option<StereoAllpassCascade>| {
            t.and_then(|t| t.slope(Channel::Left).stage(0).map(|s| s.state()))
        };
        assert_eq!(history(before), history(after));
    }

    #[test]
    fn zero_length_block_is_noop() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 64);
        run(&mut haas, &near(), 64);
        run(&mut haas, &far(), 0);
        assert_eq!(haas.reconfigurations(), 1);
        assert!(!haas.is_fading());
    }

    #[test]
    fn prepare_clears_cache_and_fade() {
        let mut haas: HaasEffectCrossfaded = HaasEffectCrossfaded::new(SR, 64);
        run(&mut haas, &near(), 64);
        run(&mut haas, &far(), 64);
        haas.prepare(44100.0, 64);
        assert!(!haas.is_fading());
        assert_eq!(haas.current_params(), None);
        assert_eq!(haas.fade_len(), 1764);

        run(&mut haas, &far(), 64);
        assert!(!haas.is_fading());
        assert_eq!(haas.reconfigurations(), 3);
    }
}
