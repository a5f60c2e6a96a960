//! Owned stereo buffers for file-level processing.

use crate::{Error, Result};

/// A pair of equal-length channel buffers.
///
/// # Example
///
/// ```rust
/// use allhaas_io::StereoSamples;
///
/// let samples = StereoSamples::new(vec![1.0; 1024], vec![0.5; 1024]).unwrap();
/// assert_eq!(samples.len(), 1024);
/// assert_eq!(samples.peak(), [1.0, 0.5]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StereoSamples {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Pair two channels. Fails if their lengths differ.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(Self { left, right })
    }

    /// Duplicate a mono buffer to both channels.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            left: mono.clone(),
            right: mono,
        }
    }

    /// Split interleaved frames of `channels` samples each.
    ///
    /// Mono frames are duplicated; frames wider than two channels keep the
    /// first two. A trailing partial frame is dropped.
    pub fn from_frames(interleaved: &[f32], channels: usize) -> Self {
        match channels {
            0 => Self::default(),
            1 => Self::from_mono(interleaved.to_vec()),
            _ => {
                let frames = interleaved.len() / channels;
                let mut left = Vec::with_capacity(frames);
                let mut right = Vec::with_capacity(frames);
                for frame in interleaved.chunks_exact(channels) {
                    left.push(frame[0]);
                    right.push(frame[1]);
                }
                Self { left, right }
            }
        }
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Interleave as `L, R, L, R, ...`.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.left.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            interleaved.push(*l);
            interleaved.push(*r);
        }
        interleaved
    }

    /// Both channels as mutable slices, for in-place processing.
    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.left, &mut self.right)
    }

    /// Absolute peak per channel.
    pub fn peak(&self) -> [f32; 2] {
        let peak = |ch: &[f32]| ch.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        [peak(&self.left), peak(&self.right)]
    }

    /// RMS level per channel. Zero for empty buffers.
    pub fn rms(&self) -> [f32; 2] {
        let rms = |ch: &[f32]| {
            if ch.is_empty() {
                return 0.0;
            }
            let sum: f64 = ch.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
            (sum / ch.len() as f64).sqrt() as f32
        };
        [rms(&self.left), rms(&self.right)]
    }
}
