//! Stereo WAV I/O for allhaas.
//!
//! - [`read_wav_stereo`] / [`write_wav_stereo`] load and save
//!   [`StereoSamples`]; mono files are duplicated to both channels
//! - [`read_wav_info`] reads the header only
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use allhaas_io::{read_wav_stereo, write_wav_stereo};
//!
//! let (mut samples, spec) = read_wav_stereo("input.wav")?;
//! // ... process samples.left / samples.right in place ...
//! write_wav_stereo("output.wav", &samples, spec)?;
//! ```

mod stereo;
mod wav;

pub use stereo::StereoSamples;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav_info, read_wav_stereo, write_wav_stereo};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Left and right channels have different lengths.
    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelMismatch {
        /// Left channel length
        left: usize,
        /// Right channel length
        right: usize,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
