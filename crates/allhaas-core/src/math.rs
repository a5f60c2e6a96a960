//! Pitch and numeric helpers shared by the filter stages.
//!
//! - [`note_to_freq_hz`] - Equal-tempered pitch (MIDI note) to Hz
//! - [`flush_denormal`] - Subnormal guard for recursive filter state
//! - [`nyquist`] - Half the sample rate

use libm::pow;

/// Reference pitch for [`note_to_freq_hz`] (A4 as a MIDI note number).
pub const REFERENCE_PITCH: f64 = 69.0;

/// Number of equal divisions per octave.
pub const NOTES_PER_OCTAVE: f64 = 12.0;

/// Tuning reference in Hz for [`REFERENCE_PITCH`].
pub const MASTER_TUNE_HZ: f64 = 440.0;

/// Convert a pitch in note units to a frequency in Hz.
///
/// Uses the standard 12-EDO mapping anchored at A4 = 440 Hz:
///
/// ```text
/// f = 440 * 2^((note - 69) / 12)
/// ```
///
/// Fractional notes are valid and map continuously.
///
/// # Example
/// ```rust
/// use allhaas_core::note_to_freq_hz;
///
/// assert!((note_to_freq_hz(69.0) - 440.0).abs() < 1e-9);
/// assert!((note_to_freq_hz(81.0) - 880.0).abs() < 1e-9);
/// ```
#[inline]
pub fn note_to_freq_hz(note: f64) -> f64 {
    note_to_freq_hz_with(note, REFERENCE_PITCH, NOTES_PER_OCTAVE, MASTER_TUNE_HZ)
}

/// Convert a pitch to Hz with an explicit reference pitch, octave division
/// and tuning reference.
#[inline]
pub fn note_to_freq_hz_with(note: f64, reference_pitch: f64, divisions: f64, tune_hz: f64) -> f64 {
    tune_hz * pow(2.0, (note - reference_pitch) / divisions)
}

/// Flush tiny values to zero.
///
/// Recursive filters decaying towards silence eventually produce subnormal
/// floats, which are very slow on most CPUs. Anything below `1e-20` is
/// inaudible and replaced by an exact zero.
#[inline]
pub fn flush_denormal(x: f64) -> f64 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Nyquist frequency for a sample rate.
#[inline]
pub fn nyquist(sample_rate: f64) -> f64 {
    sample_rate * 0.5
}
