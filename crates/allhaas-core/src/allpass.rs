//! All-pass filter stages.
//!
//! Every stage here passes all frequencies at unity magnitude and only
//! shifts phase. Stacking identical stages deepens the phase shift without
//! colouring the spectrum, which is what the Haas/distance effect is built on.
//!
//! Four interchangeable topologies implement [`AllpassUnit`]:
//!
//! | Type | Order | Structure | Resonance |
//! |------|-------|-----------|-----------|
//! | [`FirstOrderAllpass`] | 1 | one-pole, single state register | ignored |
//! | [`TdfAllpass`] | 2 | transposed direct form II | Q |
//! | [`DirectFormAllpass`] | 2 | direct form I, bandwidth tied to cutoff | ignored |
//! | [`DirectFormQAllpass`] | 2 | direct form I | Q |
//!
//! All coefficient derivations use the bilinear-transform prewarp
//! `k = tan(π·f/fs)`. A cutoff at or beyond Nyquist (or a degenerate
//! denominator anywhere in the derivation) yields the topology's neutral
//! coefficient set instead of a non-finite value; an IIR stage fed one
//! NaN never recovers.

use core::f64::consts::{FRAC_PI_2, PI};

use libm::{cos, tan};

use crate::flush_denormal;

/// Capability set shared by all all-pass topologies.
///
/// A cascade is generic over exactly one implementor, so every stage in a
/// cascade uses the same recursion.
pub trait AllpassUnit: Default {
    /// Coefficient set derived by [`update_parameters`](Self::update_parameters).
    type Coefficients: Copy + PartialEq + core::fmt::Debug;

    /// Short display name of the topology.
    const NAME: &'static str;

    /// Whether [`update_parameters`](Self::update_parameters) reads the
    /// resonance argument.
    const USES_RESONANCE: bool;

    /// Zero the filter history. Coefficients are left untouched.
    fn reset(&mut self);

    /// Copy only the coefficient set from another stage.
    fn copy_coefficients_from(&mut self, other: &Self);

    /// Derive coefficients for a cutoff (Hz), resonance (Q, Hz-equivalent
    /// units) and sample rate (Hz).
    fn update_parameters(&mut self, freq_hz: f64, resonance: f64, sample_rate: f64);

    /// Advance the filter by one sample.
    fn process(&mut self, input: f64) -> f64;

    /// Current coefficient set.
    fn coefficients(&self) -> Self::Coefficients;
}

/// Bilinear prewarp `tan(π·f/fs)`.
///
/// Returns `None` when the normalized cutoff is not strictly inside
/// `(0, fs/2)`; this also covers NaN inputs and a zero or negative
/// sample rate.
#[inline]
fn prewarp(freq_hz: f64, sample_rate: f64) -> Option<f64> {
    let omega = PI * freq_hz / sample_rate;
    if !omega.is_finite() || omega <= 0.0 || omega >= FRAC_PI_2 {
        return None;
    }
    let k = tan(omega);
    k.is_finite().then_some(k)
}

/// Division that refuses a zero denominator or a non-finite result.
#[inline]
fn checked_ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

// ============================================================================
// First order
// ============================================================================

/// First-order all-pass coefficient `g = (k - 1) / (k + 1)`.
///
/// Falls back to [`FirstOrderAllpass::NEUTRAL_COEFF`] for cutoffs outside
/// `(0, fs/2)`.
pub fn first_order_coefficient(freq_hz: f64, sample_rate: f64) -> f64 {
    prewarp(freq_hz, sample_rate)
        .and_then(|k| checked_ratio(k - 1.0, k + 1.0))
        .unwrap_or(FirstOrderAllpass::NEUTRAL_COEFF)
}

/// First-order all-pass with a single state register.
///
/// ```text
/// y[n] = s + g * x[n]
/// s    = x[n] - g * y[n]
/// ```
///
/// Transfer function `H(z) = (g + z^-1) / (1 + g z^-1)`. The phase passes
/// through -90 degrees at the cutoff.
///
/// # Example
///
/// ```rust
/// use allhaas_core::{AllpassUnit, FirstOrderAllpass};
///
/// let mut ap = FirstOrderAllpass::default();
/// ap.update_parameters(1000.0, 0.0, 48000.0);
/// let out = ap.process(1.0);
/// assert_eq!(out, ap.coefficients());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FirstOrderAllpass {
    g: f64,
    s: f64,
}

impl FirstOrderAllpass {
    /// Neutral coefficient. With `g = 1` the pole and zero cancel and the
    /// stage is the identity, the limit the coefficient approaches as the
    /// cutoff nears Nyquist.
    pub const NEUTRAL_COEFF: f64 = 1.0;

    /// Current state register.
    pub fn state(&self) -> f64 {
        self.s
    }
}

impl Default for FirstOrderAllpass {
    fn default() -> Self {
        Self {
            g: Self::NEUTRAL_COEFF,
            s: 0.0,
        }
    }
}

impl AllpassUnit for FirstOrderAllpass {
    type Coefficients = f64;

    const NAME: &'static str = "first-order";
    const USES_RESONANCE: bool = false;

    fn reset(&mut self) {
        self.s = 0.0;
    }

    fn copy_coefficients_from(&mut self, other: &Self) {
        self.g = other.g;
    }

    fn update_parameters(&mut self, freq_hz: f64, _resonance: f64, sample_rate: f64) {
        self.g = first_order_coefficient(freq_hz, sample_rate);
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let y = self.s + self.g * input;
        self.s = flush_denormal(input - self.g * y);
        y
    }

    fn coefficients(&self) -> f64 {
        self.g
    }
}

// ============================================================================
// Second order coefficients
// ============================================================================

/// Second-order all-pass coefficients.
///
/// ```text
///          a0 + a1 z^-1 + a2 z^-2
/// H(z) = --------------------------
///          1 + b1 z^-1 + b2 z^-2
/// ```
///
/// For an all-pass the numerator mirrors the denominator: `a2 = 1`,
/// `b1 = a1`, `b2 = a0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward, current input
    pub a0: f64,
    /// Feedforward, one sample back
    pub a1: f64,
    /// Feedforward, two samples back
    pub a2: f64,
    /// Feedback, one sample back
    pub b1: f64,
    /// Feedback, two samples back
    pub b2: f64,
}

impl BiquadCoefficients {
    /// `y[n] = x[n]`. Used as the neutral fallback and the power-on state.
    pub const PASSTHROUGH: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };

    fn mirrored(a0: f64, a1: f64) -> Self {
        Self {
            a0,
            a1,
            a2: 1.0,
            b1: a1,
            b2: a0,
        }
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Second-order all-pass with explicit Q.
///
/// ```text
/// k    = tan(π f / fs)
/// norm = 1 / (1 + k/q + k²)
/// a0   = (1 - k/q + k²) * norm
/// a1   = 2 (k² - 1) * norm
/// ```
///
/// Returns [`BiquadCoefficients::PASSTHROUGH`] for a cutoff outside
/// `(0, fs/2)` or a Q that is not strictly positive.
pub fn allpass_q_coefficients(freq_hz: f64, q: f64, sample_rate: f64) -> BiquadCoefficients {
    try_allpass_q(freq_hz, q, sample_rate).unwrap_or(BiquadCoefficients::PASSTHROUGH)
}

fn try_allpass_q(freq_hz: f64, q: f64, sample_rate: f64) -> Option<BiquadCoefficients> {
    if q.is_nan() || q <= 0.0 {
        return None;
    }
    let k = prewarp(freq_hz, sample_rate)?;
    let kq = checked_ratio(k, q)?;
    let kk = k * k;
    let norm = checked_ratio(1.0, 1.0 + kq + kk)?;
    let a0 = (1.0 - kq + kk) * norm;
    let a1 = 2.0 * (kk - 1.0) * norm;
    (a0.is_finite() && a1.is_finite()).then(|| BiquadCoefficients::mirrored(a0, a1))
}

/// Second-order all-pass whose bandwidth follows the cutoff.
///
/// ```text
/// c  = (tan(π f / fs) - 1) / (tan(π f / fs) + 1)
/// d  = -cos(π f / fs)
/// a0 = -c
/// a1 = d (1 - c)
/// ```
///
/// Returns [`BiquadCoefficients::PASSTHROUGH`] for a cutoff outside
/// `(0, fs/2)`.
pub fn allpass_fixed_bandwidth_coefficients(freq_hz: f64, sample_rate: f64) -> BiquadCoefficients {
    try_allpass_fixed_bandwidth(freq_hz, sample_rate).unwrap_or(BiquadCoefficients::PASSTHROUGH)
}

fn try_allpass_fixed_bandwidth(freq_hz: f64, sample_rate: f64) -> Option<BiquadCoefficients> {
    let k = prewarp(freq_hz, sample_rate)?;
    let c = checked_ratio(k - 1.0, k + 1.0)?;
    let d = -cos(PI * freq_hz / sample_rate);
    Some(BiquadCoefficients::mirrored(-c, d * (1.0 - c)))
}

// ============================================================================
// Transposed direct form II
// ============================================================================

/// Second-order all-pass in transposed direct form II.
///
/// ```text
/// y  = a0 x + z1
/// z1 = a1 x - b1 y + z2
/// z2 = a2 x - b2 y
/// ```
///
/// Two state registers, five multiplies. The default topology for the
/// Haas cascades.
#[derive(Debug, Clone, Copy, Default)]
pub struct TdfAllpass {
    coeffs: BiquadCoefficients,
    z1: f64,
    z2: f64,
}

impl TdfAllpass {
    /// Current state registers `(z1, z2)`.
    pub fn state(&self) -> (f64, f64) {
        (self.z1, self.z2)
    }
}

impl AllpassUnit for TdfAllpass {
    type Coefficients = BiquadCoefficients;

    const NAME: &'static str = "tdf2";
    const USES_RESONANCE: bool = true;

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    fn copy_coefficients_from(&mut self, other: &Self) {
        self.coeffs = other.coeffs;
    }

    fn update_parameters(&mut self, freq_hz: f64, resonance: f64, sample_rate: f64) {
        self.coeffs = allpass_q_coefficients(freq_hz, resonance, sample_rate);
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let y = c.a0 * input + self.z1;
        self.z1 = flush_denormal(c.a1 * input - c.b1 * y + self.z2);
        self.z2 = flush_denormal(c.a2 * input - c.b2 * y);
        y
    }

    fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }
}

// ============================================================================
// Direct form I
// ============================================================================

/// Input/output history shared by the direct form I stages.
#[derive(Debug, Clone, Copy, Default)]
struct DirectFormHistory {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl DirectFormHistory {
    #[inline]
    fn process(&mut self, c: &BiquadCoefficients, x0: f64) -> f64 {
        let y = c.a0 * x0 + c.a1 * self.x1 + c.a2 * self.x2 - c.b1 * self.y1 - c.b2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = flush_denormal(y);
        y
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn as_array(&self) -> [f64; 4] {
        [self.x1, self.x2, self.y1, self.y2]
    }
}

/// Second-order all-pass in direct form I with bandwidth tied to the cutoff.
///
/// ```text
/// y[n] = a0 x[n] + a1 x[n-1] + a2 x[n-2] - b1 y[n-1] - b2 y[n-2]
/// ```
///
/// The resonance argument is ignored; see
/// [`allpass_fixed_bandwidth_coefficients`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFormAllpass {
    coeffs: BiquadCoefficients,
    history: DirectFormHistory,
}

impl DirectFormAllpass {
    /// History `[x1, x2, y1, y2]`.
    pub fn history(&self) -> [f64; 4] {
        self.history.as_array()
    }
}

impl AllpassUnit for DirectFormAllpass {
    type Coefficients = BiquadCoefficients;

    const NAME: &'static str = "df1";
    const USES_RESONANCE: bool = false;

    fn reset(&mut self) {
        self.history.clear();
    }

    fn copy_coefficients_from(&mut self, other: &Self) {
        self.coeffs = other.coeffs;
    }

    fn update_parameters(&mut self, freq_hz: f64, _resonance: f64, sample_rate: f64) {
        self.coeffs = allpass_fixed_bandwidth_coefficients(freq_hz, sample_rate);
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        self.history.process(&self.coeffs, input)
    }

    fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }
}

/// Second-order all-pass in direct form I with explicit Q.
///
/// Same coefficients as [`TdfAllpass`], four history registers instead of
/// two. Cheaper to modulate badly, friendlier to fixed point.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFormQAllpass {
    coeffs: BiquadCoefficients,
    history: DirectFormHistory,
}

impl DirectFormQAllpass {
    /// History `[x1, x2, y1, y2]`.
    pub fn history(&self) -> [f64; 4] {
        self.history.as_array()
    }
}

impl AllpassUnit for DirectFormQAllpass {
    type Coefficients = BiquadCoefficients;

    const NAME: &'static str = "df1-q";
    const USES_RESONANCE: bool = true;

    fn reset(&mut self) {
        self.history.clear();
    }

    fn copy_coefficients_from(&mut self, other: &Self) {
        self.coeffs = other.coeffs;
    }

    fn update_parameters(&mut self, freq_hz: f64, resonance: f64, sample_rate: f64) {
        self.coeffs = allpass_q_coefficients(freq_hz, resonance, sample_rate);
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        self.history.process(&self.coeffs, input)
    }

    fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }
}
