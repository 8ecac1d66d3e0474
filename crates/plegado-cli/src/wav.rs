//! WAV file I/O for the offline renderer.
//!
//! Reads 16/24/32-bit integer and 32-bit float WAV into stereo `f32`
//! buffers (mono files are duplicated to both channels) and writes
//! 32-bit float output.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    /// Underlying WAV read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Channel layouts beyond mono/stereo are not supported.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u16),

    /// Integer bit depths other than 16/24/32 are not supported.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),
}

/// Decoded stereo audio plus its sample rate.
pub struct StereoWav {
    /// Left channel samples in [-1, 1].
    pub left: Vec<f32>,
    /// Right channel samples in [-1, 1].
    pub right: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Read a WAV file into stereo float buffers.
pub fn read_stereo(path: &Path) -> Result<StereoWav, WavError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.channels > 2 {
        return Err(WavError::UnsupportedChannels(spec.channels));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = match spec.bits_per_sample {
                16 => 1.0 / f32::from(i16::MAX),
                24 => 1.0 / 8_388_607.0,
                32 => 1.0 / i32::MAX as f32,
                bits => return Err(WavError::UnsupportedBitDepth(bits)),
            };
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let (left, right) = if spec.channels == 1 {
        (interleaved.clone(), interleaved)
    } else {
        let frames = interleaved.len() / 2;
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in interleaved.chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        (left, right)
    };

    Ok(StereoWav {
        left,
        right,
        sample_rate: spec.sample_rate,
    })
}

/// Write stereo float buffers as a 32-bit float WAV file.
pub fn write_stereo(
    path: &Path,
    left: &[f32],
    right: &[f32],
    sample_rate: u32,
) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for (&l, &r) in left.iter().zip(right.iter()) {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;
    Ok(())
}
