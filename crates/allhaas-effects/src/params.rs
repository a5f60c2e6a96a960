//! Haas parameter tuple and host-side parameter ranges.
//!
//! [`HaasParams`] is what the effects consume once per block. The DSP never
//! validates it; hosts clamp raw control values with [`HaasParams::clamped`]
//! (or build it from fractional controls with [`HaasParams::from_controls`])
//! before handing it over.

use allhaas_core::{MAX_STAGES, SlopeSettings, note_to_freq_hz};

/// Range and default of one host control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Full name for display.
    pub name: &'static str,
    /// Unit suffix for display.
    pub unit: &'static str,
    /// Minimum allowed value.
    pub min: f64,
    /// Maximum allowed value.
    pub max: f64,
    /// Value on initialization.
    pub default: f64,
}

impl ParamRange {
    /// Clamp a value into range. NaN maps to the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Cascade depth. Stepped, one stage per unit.
pub const DISTANCE: ParamRange = ParamRange {
    name: "Distance",
    unit: "stages",
    min: 1.0,
    max: MAX_STAGES as f64,
    default: 1.0,
};

/// Left (or mid) cutoff as a MIDI note number.
pub const CUTOFF_LEFT: ParamRange = ParamRange {
    name: "Cutoff L/M",
    unit: "note",
    min: 12.0,
    max: 127.0,
    default: 48.0,
};

/// Right (or side) cutoff as a MIDI note number.
pub const CUTOFF_RIGHT: ParamRange = ParamRange {
    default: 62.0,
    name: "Cutoff R/S",
    ..CUTOFF_LEFT
};

/// Resonance of each stage, in Hz-equivalent units.
pub const FEEDBACK: ParamRange = ParamRange {
    name: "Feedback",
    unit: "Hz",
    min: 0.1,
    max: 20.0,
    default: 0.1,
};

/// The six per-block parameters of the Haas effects.
///
/// Cutoffs are MIDI note numbers (converted to Hz by the effect); feedback
/// is the per-stage resonance; stages is the cascade depth per channel.
///
/// # Example
///
/// ```rust
/// use allhaas_effects::HaasParams;
///
/// let params = HaasParams {
///     stages_left: 500,
///     feedback_right: -3.0,
///     ..HaasParams::default()
/// }
/// .clamped();
/// assert_eq!(params.stages_left, allhaas_core::MAX_STAGES);
/// assert_eq!(params.feedback_right, 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaasParams {
    /// Left/mid cutoff (MIDI note)
    pub cutoff_left: f64,
    /// Right/side cutoff (MIDI note)
    pub cutoff_right: f64,
    /// Left/mid resonance (Hz-equivalent)
    pub feedback_left: f64,
    /// Right/side resonance (Hz-equivalent)
    pub feedback_right: f64,
    /// Left/mid cascade depth
    pub stages_left: usize,
    /// Right/side cascade depth
    pub stages_right: usize,
}

impl Default for HaasParams {
    fn default() -> Self {
        Self {
            cutoff_left: CUTOFF_LEFT.default,
            cutoff_right: CUTOFF_RIGHT.default,
            feedback_left: FEEDBACK.default,
            feedback_right: FEEDBACK.default,
            stages_left: DISTANCE.default as usize,
            stages_right: DISTANCE.default as usize,
        }
    }
}

impl HaasParams {
    /// Build parameters from raw host controls.
    ///
    /// Distance controls may be fractional; they are clamped and rounded to
    /// the nearest stage count.
    pub fn from_controls(cutoff: [f64; 2], feedback: [f64; 2], distance: [f64; 2]) -> Self {
        Self {
            cutoff_left: cutoff[0],
            cutoff_right: cutoff[1],
            feedback_left: feedback[0],
            feedback_right: feedback[1],
            stages_left: stages_from_distance(distance[0]),
            stages_right: stages_from_distance(distance[1]),
        }
        .clamped()
    }

    /// Clamp every field into its host range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let stages = |n: usize| n.clamp(DISTANCE.min as usize, DISTANCE.max as usize);
        Self {
            cutoff_left: CUTOFF_LEFT.clamp(self.cutoff_left),
            cutoff_right: CUTOFF_RIGHT.clamp(self.cutoff_right),
            feedback_left: FEEDBACK.clamp(self.feedback_left),
            feedback_right: FEEDBACK.clamp(self.feedback_right),
            stages_left: stages(self.stages_left),
            stages_right: stages(self.stages_right),
        }
    }

    /// Per-channel cascade settings, cutoffs converted from pitch to Hz.
    pub fn slopes(&self) -> [SlopeSettings; 2] {
        [
            SlopeSettings {
                freq_hz: note_to_freq_hz(self.cutoff_left),
                resonance: self.feedback_left,
                stages: self.stages_left,
            },
            SlopeSettings {
                freq_hz: note_to_freq_hz(self.cutoff_right),
                resonance: self.feedback_right,
                stages: self.stages_right,
            },
        ]
    }
}

/// Round a distance control to a stage count inside [`DISTANCE`].
pub fn stages_from_distance(distance: f64) -> usize {
    libm::round(DISTANCE.clamp(distance)) as usize
}
