//! Audio stream parameters and their inference

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sample encoding of the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoding {
    /// Big-endian linear PCM (`L16`, `L20`, `L24`)
    #[default]
    #[serde(rename = "L")]
    LinearPcm,
}

/// Sampling of a PCM audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioParameters {
    pub sample_rate: u32,
    /// Bits per sample: 16, 20 or 24
    pub bit_depth: u8,
    pub channels: usize,
    #[serde(default)]
    pub encoding: AudioEncoding,
}

impl Default for AudioParameters {
    /// 48 kHz, 24-bit stereo
    fn default() -> Self {
        Self::new(48_000, 24, 2)
    }
}

impl AudioParameters {
    pub fn new(sample_rate: u32, bit_depth: u8, channels: usize) -> Self {
        Self { sample_rate, bit_depth, channels, encoding: AudioEncoding::LinearPcm }
    }

    /// `ceil(bit_depth / 8)`: 20-bit samples occupy three bytes
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bit_depth).div_ceil(8)
    }

    /// Bytes of one sample for every channel
    pub fn frame_size(&self) -> usize {
        self.channels * self.bytes_per_sample()
    }
}

/// Sample rates in search order
pub const COMMON_SAMPLE_RATES: [u32; 4] = [48_000, 96_000, 44_100, 88_200];

// 24 precedes 20 so that equal 3-byte sizes resolve to 24-bit
const CANDIDATE_BIT_DEPTHS: [u8; 3] = [16, 24, 20];

const CANDIDATE_CHANNELS: [usize; 5] = [1, 2, 4, 8, 16];

const MAX_RELATIVE_RESIDUAL: f64 = 0.1;

/// Infer parameters from the total payload size and the RTP timestamp span.
///
/// The media clock is assumed to run at the sample rate, so the span is the
/// expected per-channel sample count. With a non-positive span, or a best
/// candidate more than 10% off the observed size, falls back to
/// 48 kHz 24-bit stereo.
pub fn infer_audio_params(
    total_payload_bytes: usize,
    first_timestamp: u32,
    last_timestamp: u32,
) -> AudioParameters {
    let expected_samples = i64::from(last_timestamp) - i64::from(first_timestamp);
    let observed = total_payload_bytes as i64;

    let mut best: Option<(i64, AudioParameters)> = None;
    if expected_samples > 0 {
        for sample_rate in COMMON_SAMPLE_RATES {
            for bit_depth in CANDIDATE_BIT_DEPTHS {
                for channels in CANDIDATE_CHANNELS {
                    let candidate = AudioParameters::new(sample_rate, bit_depth, channels);
                    let expected_bytes = expected_samples * candidate.frame_size() as i64;
                    let residual = (expected_bytes - observed).abs();
                    if best.as_ref().is_none_or(|(best_residual, _)| residual < *best_residual) {
                        best = Some((residual, candidate));
                    }
                }
            }
        }
    }

    match best {
        Some((residual, params)) if residual as f64 <= observed as f64 * MAX_RELATIVE_RESIDUAL => {
            debug!(
                sample_rate = params.sample_rate,
                bit_depth = params.bit_depth,
                channels = params.channels,
                residual,
                "Inferred audio parameters"
            );
            params
        }
        _ => {
            warn!(
                total_payload_bytes,
                expected_samples,
                "No audio layout matches the payload size, assuming 48 kHz 24-bit stereo"
            );
            AudioParameters::default()
        }
    }
}
