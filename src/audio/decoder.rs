//! ST 2110-30/31 PCM audio decoding

use serde::Serialize;
use tracing::debug;

use super::params::{AudioParameters, infer_audio_params};
use super::pcm::deinterleave;
use crate::decoder::EssenceDecoder;
use crate::types::{RtpPacket, StreamInfo, StreamType, concat_payloads};
use crate::{MediaError, Result};

/// Decoded samples, one vector per channel, values in `[-1.0, 1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self { channels, sample_rate }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn sample_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count() as f64 / f64::from(self.sample_rate)
    }

    /// Re-interleave into frame-major order.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.sample_count() * self.channel_count());
        for i in 0..self.sample_count() {
            out.extend(self.channels.iter().filter_map(|channel| channel.get(i)));
        }
        out
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_duration(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let secs = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Shape and length of a decoded stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioSummary {
    pub sample_rate: u32,
    pub bit_depth: u8,
    pub channels: usize,
    /// Samples per channel
    pub sample_count: usize,
    pub duration_seconds: f64,
    pub duration_formatted: String,
}

/// Result of one audio decode.
#[derive(Debug, Clone)]
pub struct AudioDecodeOutput {
    pub buffer: AudioBuffer,
    pub params: AudioParameters,
    pub params_inferred: bool,
}

impl AudioDecodeOutput {
    pub fn summary(&self) -> AudioSummary {
        let duration_seconds = self.buffer.duration_seconds();
        AudioSummary {
            sample_rate: self.params.sample_rate,
            bit_depth: self.params.bit_depth,
            channels: self.params.channels,
            sample_count: self.buffer.sample_count(),
            duration_seconds,
            duration_formatted: format_duration(duration_seconds),
        }
    }
}

/// Decoder for ST 2110-30/31 linear PCM audio.
#[derive(Debug, Clone, Default)]
pub struct AudioDecoder {
    params: Option<AudioParameters>,
}

impl AudioDecoder {
    /// Decoder that infers parameters from each stream it decodes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: AudioParameters) -> Self {
        Self { params: Some(params) }
    }

    pub fn params(&self) -> Option<&AudioParameters> {
        self.params.as_ref()
    }
}

impl EssenceDecoder for AudioDecoder {
    type Output = AudioDecodeOutput;

    fn stream_type(&self) -> StreamType {
        StreamType::Audio
    }

    fn decode(&self, packets: &[RtpPacket], info: &StreamInfo) -> Result<AudioDecodeOutput> {
        let data = concat_payloads(packets);

        let (params, params_inferred) = match &self.params {
            Some(params) => (params.clone(), false),
            None => (infer_audio_params(data.len(), info.first_timestamp, info.last_timestamp), true),
        };

        let channels = deinterleave(&data, params.bit_depth, params.channels).map_err(|e| match e {
            MediaError::UnsupportedConfiguration { details } => MediaError::UnsupportedConfiguration {
                details: format!("SSRC {:#010x}: {}", info.ssrc, details),
            },
            other => other,
        })?;
        let buffer = AudioBuffer::new(channels, params.sample_rate);

        debug!(
            ssrc = info.ssrc,
            sample_rate = params.sample_rate,
            bit_depth = params.bit_depth,
            channels = params.channels,
            samples = buffer.sample_count(),
            params_inferred,
            "Decoded audio stream"
        );

        Ok(AudioDecodeOutput { buffer, params, params_inferred })
    }
}
