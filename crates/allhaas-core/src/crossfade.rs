//! Multi-track crossfade envelope and mixing buses.
//!
//! [`CrossfadeMixer`] drives the gain envelopes used when one filter bank
//! hands over to another. Each track carries an integer position in
//! `0..=fade_len`; gains are computed from that position, so a fade lasts
//! exactly `fade_len` samples no matter how the host slices blocks, and
//! the rising and falling gains of a linear fade always sum to one.
//!
//! Scratch buffers are allocated once in [`prepare`](CrossfadeMixer::prepare)
//! and reused on every block.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::FRAC_PI_2;

use libm::sinf;

/// Shape of the crossfade gain curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    /// `g = t`. Rising and falling gains sum to exactly one.
    #[default]
    Linear,
    /// `g = sin(t·π/2)`. Rising and falling gains have constant power.
    EqualPower,
}

impl FadeCurve {
    #[inline]
    fn gain(self, t: f32) -> f32 {
        match self {
            FadeCurve::Linear => t,
            FadeCurve::EqualPower => sinf(t * FRAC_PI_2),
        }
    }
}

/// Envelope state of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TrackEnvelope {
    /// Silent and not rendered
    #[default]
    Off,
    /// Ramping up; position counts from 0 towards `fade_len`
    Rising(u32),
    /// Ramping down; position counts from its start towards 0
    Falling(u32),
    /// Fully audible
    Full,
}

/// Crossfade envelope generator with per-track gain synthesis and
/// stereo mixing buses.
///
/// # Example
///
/// ```rust
/// use allhaas_core::CrossfadeMixer;
///
/// let mut mixer: CrossfadeMixer = CrossfadeMixer::new();
/// mixer.prepare(48000.0, 40.0, 512);
/// let first = mixer.init();
/// assert!(!mixer.still_fading()); // nothing to fade against yet
///
/// let second = mixer.init();
/// assert_ne!(first, second);
/// assert!(mixer.still_fading());
/// ```
#[derive(Debug, Clone)]
pub struct CrossfadeMixer<const TRACKS: usize = 2> {
    envelopes: [TrackEnvelope; TRACKS],
    active: usize,
    fade_len: u32,
    curve: FadeCurve,
    max_block: usize,
    sum_l: Vec<f32>,
    sum_r: Vec<f32>,
    track_l: Vec<f32>,
    track_r: Vec<f32>,
    gains: Vec<f32>,
}

impl<const TRACKS: usize> CrossfadeMixer<TRACKS> {
    /// Create an unprepared mixer with every track off.
    ///
    /// [`prepare`](Self::prepare) must run before any rendering.
    pub fn new() -> Self {
        Self {
            envelopes: [TrackEnvelope::Off; TRACKS],
            active: TRACKS.saturating_sub(1),
            fade_len: 1,
            curve: FadeCurve::Linear,
            max_block: 0,
            sum_l: Vec::new(),
            sum_r: Vec::new(),
            track_l: Vec::new(),
            track_r: Vec::new(),
            gains: Vec::new(),
        }
    }

    /// Create a mixer with a specific gain curve.
    pub fn with_curve(curve: FadeCurve) -> Self {
        Self {
            curve,
            ..Self::new()
        }
    }

    /// Size buffers and fade length, and turn every track off.
    ///
    /// This is the only method that allocates.
    pub fn prepare(&mut self, sample_rate: f32, fade_ms: f32, max_block_size: usize) {
        let samples = (fade_ms * 0.001 * sample_rate).round();
        self.fade_len = if samples.is_finite() && samples >= 1.0 {
            samples as u32
        } else {
            1
        };
        self.max_block = max_block_size.max(1);
        for buf in [
            &mut self.sum_l,
            &mut self.sum_r,
            &mut self.track_l,
            &mut self.track_r,
            &mut self.gains,
        ] {
            *buf = vec![0.0; self.max_block];
        }
        self.envelopes = [TrackEnvelope::Off; TRACKS];
        self.active = TRACKS.saturating_sub(1);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            fade_len = self.fade_len,
            max_block = self.max_block,
            "crossfade mixer prepared"
        );
    }

    /// Fade length in samples.
    pub fn fade_len(&self) -> u32 {
        self.fade_len
    }

    /// Gain curve in use.
    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    /// Index of the track that is (or is becoming) the audible one.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Start a fade towards the next track and return its index.
    ///
    /// Every other audible track starts falling from its current gain.
    /// When nothing is audible yet there is nothing to fade against, so the
    /// new track starts at full gain and no fade is in progress afterwards.
    pub fn init(&mut self) -> usize {
        if TRACKS == 0 {
            return 0;
        }
        let any_audible = self.envelopes.iter().any(|e| *e != TrackEnvelope::Off);
        self.active = (self.active + 1) % TRACKS;

        for (i, env) in self.envelopes.iter_mut().enumerate() {
            if i == self.active {
                *env = if any_audible {
                    TrackEnvelope::Rising(0)
                } else {
                    TrackEnvelope::Full
                };
            } else {
                *env = match *env {
                    TrackEnvelope::Full => TrackEnvelope::Falling(self.fade_len),
                    TrackEnvelope::Rising(pos) | TrackEnvelope::Falling(pos) if pos > 0 => {
                        TrackEnvelope::Falling(pos)
                    }
                    _ => TrackEnvelope::Off,
                };
            }
        }
        self.active
    }

    /// Whether any track is still ramping.
    pub fn still_fading(&self) -> bool {
        self.envelopes
            .iter()
            .any(|e| matches!(e, TrackEnvelope::Rising(_) | TrackEnvelope::Falling(_)))
    }

    /// Whether a track contributes to the output.
    pub fn is_enabled(&self, track: usize) -> bool {
        self.envelopes
            .get(track)
            .is_some_and(|e| *e != TrackEnvelope::Off)
    }

    /// Fill `gains` with the next per-sample gains of a track and advance
    /// its envelope by `gains.len()` samples.
    pub fn synthesize_gain_values(&mut self, track: usize, gains: &mut [f32]) {
        let fade_len = self.fade_len;
        let curve = self.curve;
        let Some(env) = self.envelopes.get_mut(track) else {
            gains.fill(0.0);
            return;
        };
        for g in gains.iter_mut() {
            *g = match *env {
                TrackEnvelope::Off => 0.0,
                TrackEnvelope::Full => 1.0,
                TrackEnvelope::Rising(pos) => {
                    let gain = curve.gain(pos as f32 / fade_len as f32);
                    *env = if pos + 1 >= fade_len {
                        TrackEnvelope::Full
                    } else {
                        TrackEnvelope::Rising(pos + 1)
                    };
                    gain
                }
                TrackEnvelope::Falling(pos) => {
                    let gain = curve.gain(pos as f32 / fade_len as f32);
                    *env = if pos <= 1 {
                        TrackEnvelope::Off
                    } else {
                        TrackEnvelope::Falling(pos - 1)
                    };
                    gain
                }
            };
        }
    }

    /// Render every enabled track and sum the gain-weighted results back
    /// into `left`/`right`.
    ///
    /// `render_track(track, in_l, in_r, out_l, out_r)` must fill the output
    /// slices with that track's processed signal. Blocks longer than the
    /// prepared maximum are split internally.
    pub fn render<F>(&mut self, left: &mut [f32], right: &mut [f32], mut render_track: F)
    where
        F: FnMut(usize, &[f32], &[f32], &mut [f32], &mut [f32]),
    {
        let len = left.len().min(right.len());
        if len == 0 || self.max_block == 0 {
            return;
        }
        let mut offset = 0;
        while offset < len {
            let n = (len - offset).min(self.max_block);
            let in_l = &mut left[offset..offset + n];
            let in_r = &mut right[offset..offset + n];
            self.render_chunk(in_l, in_r, &mut render_track);
            offset += n;
        }
    }

    fn render_chunk<F>(&mut self, left: &mut [f32], right: &mut [f32], render_track: &mut F)
    where
        F: FnMut(usize, &[f32], &[f32], &mut [f32], &mut [f32]),
    {
        let n = left.len();
        let mut first = true;
        for track in 0..TRACKS {
            if !self.is_enabled(track) {
                continue;
            }
            let mut gains = core::mem::take(&mut self.gains);
            self.synthesize_gain_values(track, &mut gains[..n]);
            self.gains = gains;

            render_track(
                track,
                left,
                right,
                &mut self.track_l[..n],
                &mut self.track_r[..n],
            );

            if first {
                copy_weighted(&mut self.sum_l[..n], &self.track_l[..n], &self.gains[..n]);
                copy_weighted(&mut self.sum_r[..n], &self.track_r[..n], &self.gains[..n]);
                first = false;
            } else {
                add_weighted(&mut self.sum_l[..n], &self.track_l[..n], &self.gains[..n]);
                add_weighted(&mut self.sum_r[..n], &self.track_r[..n], &self.gains[..n]);
            }
        }

        if first {
            left.fill(0.0);
            right.fill(0.0);
        } else {
            left.copy_from_slice(&self.sum_l[..n]);
            right.copy_from_slice(&self.sum_r[..n]);
        }
    }
}

impl<const TRACKS: usize> Default for CrossfadeMixer<TRACKS> {
    fn default() -> Self {
        Self::new()
    }
}

/// `dst[i] = src[i] * gains[i]`
#[inline]
pub fn copy_weighted(dst: &mut [f32], src: &[f32], gains: &[f32]) {
    for ((d, &s), &g) in dst.iter_mut().zip(src).zip(gains) {
        *d = s * g;
    }
}

/// `dst[i] += src[i] * gains[i]`
#[inline]
pub fn add_weighted(dst: &mut [f32], src: &[f32], gains: &[f32]) {
    for ((d, &s), &g) in dst.iter_mut().zip(src).zip(gains) {
        *d += s * g;
    }
}
