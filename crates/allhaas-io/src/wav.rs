//! WAV file reading and writing.

use crate::{Error, Result, StereoSamples};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// 32-bit files are written as IEEE float, smaller depths as PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels in the source file.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file as stereo samples along with its spec.
///
/// Mono files are duplicated to both channels. Files with more than two
/// channels keep only the first two. Integer samples are scaled to
/// `[-1.0, 1.0)`.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);

    if spec.channels == 0 {
        return Err(Error::UnsupportedFormat("zero channels".into()));
    }

    let all_samples: Vec<f32> = match hound_spec.sample_format {
        SampleFormat::Float if spec.bits_per_sample == 32 => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int if (8..=32).contains(&spec.bits_per_sample) => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "{}-bit {other:?}",
                spec.bits_per_sample
            )));
        }
    };

    let stereo = StereoSamples::from_frames(&all_samples, usize::from(spec.channels));
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        frames = stereo.len(),
        "read wav"
    );
    Ok((stereo, spec))
}

/// Write stereo samples to a WAV file.
///
/// The output always has two channels; `spec.channels` is ignored.
/// Integer output is clipped to the representable range.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    samples: &StereoSamples,
    spec: WavSpec,
) -> Result<()> {
    if samples.left.len() != samples.right.len() {
        return Err(Error::ChannelMismatch {
            left: samples.left.len(),
            right: samples.right.len(),
        });
    }
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit output",
            spec.bits_per_sample
        )));
    }

    let path = path.as_ref();
    let stereo_spec = WavSpec {
        channels: 2,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(stereo_spec))?;

    if spec.bits_per_sample == 32 {
        for (l, r) in samples.left.iter().zip(samples.right.iter()) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for (l, r) in samples.left.iter().zip(samples.right.iter()) {
            let int_l = (*l * max_val).clamp(-max_val, max_val - 1.0) as i32;
            let int_r = (*r * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_l)?;
            writer.write_sample(int_r)?;
        }
    }

    writer.finalize()?;
    tracing::debug!(path = %path.display(), frames = samples.len(), "wrote wav");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(len: usize, f: fn(f32) -> f32) -> Vec<f32> {
        (0..len).map(|i| f(i as f32 / len as f32)).collect()
    }

    #[test]
    fn stereo_roundtrip_f32() {
        let left = ramp(1000, f32::sin);
        let right = ramp(1000, f32::cos);
        let samples = StereoSamples::new(left.clone(), right.clone()).unwrap();

        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, WavSpec::default()).unwrap();

        let (loaded, loaded_spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 48000);
        assert_eq!(loaded_spec.channels, 2);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn stereo_roundtrip_i16() {
        let left: Vec<f32> = ramp(1000, f32::sin).iter().map(|s| s * 0.9).collect();
        let samples = StereoSamples::from_mono(left.clone());
        let spec = WavSpec {
            sample_rate: 44100,
            bits_per_sample: 16,
            ..WavSpec::default()
        };

        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, spec).unwrap();

        let (loaded, loaded_spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 44100);
        assert_eq!(loaded_spec.bits_per_sample, 16);
        // 16-bit has less precision
        for (a, b) in left.iter().zip(loaded.left.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn reads_mono_as_stereo() {
        let mono = ramp(100, |x| x);
        let file = NamedTempFile::new().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for &s in &mono {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let (stereo, read_spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(read_spec.channels, 1);
        assert_eq!(stereo.left, mono);
        assert_eq!(stereo.right, mono);
    }

    #[test]
    fn info_reads_header_only() {
        let samples = StereoSamples::from_mono(vec![0.0; 4800]);
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, WavSpec::default()).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 4800);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
        assert_eq!(info.format, WavFormat::IeeeFloat);
    }

    #[test]
    fn rejects_unsupported_output_depth() {
        let samples = StereoSamples::from_mono(vec![0.0; 4]);
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            bits_per_sample: 12,
            ..WavSpec::default()
        };
        let err = write_wav_stereo(file.path(), &samples, spec).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_mismatched_channels_on_write() {
        let samples = StereoSamples {
            left: vec![0.0; 4],
            right: vec![0.0; 3],
        };
        let file = NamedTempFile::new().unwrap();
        let err = write_wav_stereo(file.path(), &samples, WavSpec::default()).unwrap_err();
        assert!(matches!(err, Error::ChannelMismatch { left: 4, right: 3 }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_wav_stereo("/nonexistent/allhaas/input.wav").unwrap_err();
        assert!(matches!(err, Error::Wav(_)));
    }
}
