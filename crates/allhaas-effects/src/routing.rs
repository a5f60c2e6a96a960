//! Host-side stereo routing around the Haas core.
//!
//! In mid/side mode the host encodes the pair before the effect and decodes
//! it afterwards, so the "left" cascade shapes the mid signal and the
//! "right" cascade shapes the side signal. The mono fold runs last.

/// Channel interpretation of the buffers handed to the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StereoConfig {
    /// Plain left/right
    #[default]
    LeftRight,
    /// Mid/side
    MidSide,
}

/// Routing applied around one effect invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoRouting {
    /// How the effect sees the two channels.
    pub config: StereoConfig,
    /// Fold the output to mono.
    pub mono: bool,
}

impl StereoRouting {
    /// Run `effect` on the pair with this routing applied around it.
    ///
    /// ```rust
    /// use allhaas_effects::{StereoConfig, StereoRouting};
    ///
    /// let routing = StereoRouting { config: StereoConfig::MidSide, mono: false };
    /// let mut left = [1.0f32, 0.5];
    /// let mut right = [0.0f32, 0.5];
    /// routing.apply(&mut left, &mut right, |_, _| {});
    /// assert_eq!(left, [1.0, 0.5]);
    /// assert_eq!(right, [0.0, 0.5]);
    /// ```
    pub fn apply<F>(&self, left: &mut [f32], right: &mut [f32], effect: F)
    where
        F: FnOnce(&mut [f32], &mut [f32]),
    {
        let mid_side = self.config == StereoConfig::MidSide;
        if mid_side {
            encode_mid_side(left, right);
        }
        effect(left, right);
        if mid_side {
            decode_mid_side(left, right);
        }
        if self.mono {
            fold_mono(left, right);
        }
    }
}

/// `m = (l + r) / 2`, `s = (l - r) / 2`, in place.
pub fn encode_mid_side(left: &mut [f32], right: &mut [f32]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) * 0.5;
        let side = (*l - *r) * 0.5;
        *l = mid;
        *r = side;
    }
}

/// `l = m + s`, `r = m - s`, in place.
pub fn decode_mid_side(mid: &mut [f32], side: &mut [f32]) {
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let left = *m + *s;
        let right = *m - *s;
        *m = left;
        *s = right;
    }
}

/// Replace both channels with their average.
pub fn fold_mono(left: &mut [f32], right: &mut [f32]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) * 0.5;
        *l = mid;
        *r = mid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_splits_mid_and_side() {
        let mut l = [1.0f32, 0.0, 0.5];
        let mut r = [1.0f32, 1.0, -0.5];
        encode_mid_side(&mut l, &mut r);
        assert_eq!(l, [1.0, 0.5, 0.0]);
        assert_eq!(r, [0.0, -0.5, 0.5]);
    }

    #[test]
    fn decode_inverts_encode() {
        let mut l = [0.25f32, -0.75, 0.5];
        let mut r = [0.5f32, 0.25, -1.0];
        encode_mid_side(&mut l, &mut r);
        decode_mid_side(&mut l, &mut r);
        assert_eq!(l, [0.25, -0.75, 0.5]);
        assert_eq!(r, [0.5, 0.25, -1.0]);
    }

    #[test]
    fn effect_sees_mid_side() {
        let routing = StereoRouting {
            config: StereoConfig::MidSide,
            mono: false,
        };
        let mut l = [1.0f32];
        let mut r = [0.0f32];
        routing.apply(&mut l, &mut r, |m, s| {
            assert_eq!(m, [0.5]);
            assert_eq!(s, [0.5]);
            // Silence the side channel
            s.fill(0.0);
        });
        assert_eq!(l, [0.5]);
        assert_eq!(r, [0.5]);
    }

    #[test]
    fn mono_fold_runs_after_effect() {
        let routing = StereoRouting {
            config: StereoConfig::LeftRight,
            mono: true,
        };
        let mut l = [1.0f32, 0.0];
        let mut r = [0.0f32, 0.0];
        routing.apply(&mut l, &mut r, |_, r| r[1] = 1.0);
        assert_eq!(l, [0.5, 0.5]);
        assert_eq!(r, l);
    }

    #[test]
    fn default_is_transparent() {
        let mut l = [0.3f32];
        let mut r = [-0.7f32];
        StereoRouting::default().apply(&mut l, &mut r, |_, _| {});
        assert_eq!((l, r), ([0.3], [-0.7]));
    }
}
