//! Lock-free peak sample pair for XY scope displays.
//!
//! The audio thread publishes the loudest stereo sample pair of each block;
//! a display thread polls it at its own rate. The two coordinates are
//! stored independently, so a reader may see `x` from one block and `y`
//! from the next. For a scope trace that is an acceptable approximation.

use core::sync::atomic::{AtomicU32, Ordering};

/// Per-block peak stereo sample pair, shared between threads.
///
/// `f32` values are stored as bit patterns in [`AtomicU32`]s. Writers and
/// readers take `&self`, so the publisher can live in an `Arc`.
///
/// # Example
///
/// ```rust
/// use allhaas_core::PeakSamplePublisher;
///
/// let scope = PeakSamplePublisher::new();
/// scope.publish(&[0.1, -0.9, 0.2], &[0.0, 0.3, 0.4]);
/// assert_eq!(scope.load(), (-0.9, 0.3));
/// ```
#[derive(Debug, Default)]
pub struct PeakSamplePublisher {
    x: AtomicU32,
    y: AtomicU32,
}

impl PeakSamplePublisher {
    /// Create a publisher holding `(0.0, 0.0)`.
    pub const fn new() -> Self {
        Self {
            x: AtomicU32::new(0),
            y: AtomicU32::new(0),
        }
    }

    /// Scan a block and publish the sample pair at the loudest index.
    ///
    /// Each channel's peak is the sample of largest squared magnitude
    /// (first occurrence wins). Whichever channel peaks higher picks the
    /// index; both channels' samples at that index are published. Ties go
    /// to the right channel. An empty block publishes nothing.
    pub fn publish(&self, left: &[f32], right: &[f32]) {
        let len = left.len().min(right.len());
        if len == 0 {
            return;
        }
        let (left, right) = (&left[..len], &right[..len]);

        let (i_l, peak_l) = loudest(left);
        let (i_r, peak_r) = loudest(right);
        let idx = if peak_l > peak_r { i_l } else { i_r };

        self.x.store(left[idx].to_bits(), Ordering::Relaxed);
        self.y.store(right[idx].to_bits(), Ordering::Relaxed);
    }

    /// Most recent left-channel coordinate.
    #[inline]
    pub fn x(&self) -> f32 {
        f32::from_bits(self.x.load(Ordering::Relaxed))
    }

    /// Most recent right-channel coordinate.
    #[inline]
    pub fn y(&self) -> f32 {
        f32::from_bits(self.y.load(Ordering::Relaxed))
    }

    /// Both coordinates, loaded independently.
    #[inline]
    pub fn load(&self) -> (f32, f32) {
        (self.x(), self.y())
    }
}

/// Index and squared magnitude of the loudest sample. `samples` must not
/// be empty.
fn loudest(samples: &[f32]) -> (usize, f32) {
    let mut idx = 0;
    let mut max = samples[0] * samples[0];
    for (i, &s) in samples.iter().enumerate().skip(1) {
        let sq = s * s;
        if max < sq {
            max = sq;
            idx = i;
        }
    }
    (idx, max)
}
