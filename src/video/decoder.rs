//! ST 2110-20 frame reassembly and decoding

use serde::Serialize;
use tracing::{debug, warn};

use super::params::{PixelFormat, VideoParameters, infer_frame_rate, infer_geometry};
use super::unpack::unpack_frame;
use crate::decoder::EssenceDecoder;
use crate::Result;
use crate::types::{RtpPacket, StreamInfo, StreamType, concat_payloads};

/// Split packets into frames at marker bits.
///
/// A marked packet closes its frame. Unmarked packets left at the end form
/// one last, possibly incomplete, frame.
pub fn group_into_frames(packets: &[RtpPacket]) -> Vec<&[RtpPacket]> {
    packets.split_inclusive(|p| p.marker()).collect()
}

/// One decoded picture.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Position among the decoded frames
    pub index: usize,
    /// RTP timestamp of the first packet
    pub rtp_timestamp: u32,
    /// Arrival time of the first packet in seconds
    pub arrival_time: f64,
    pub packet_count: usize,
    /// Closed by a marker bit rather than the end of the capture
    pub complete: bool,
    pub width: usize,
    pub height: usize,
    /// `height * width * 3` interleaved 8-bit components, row-major
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// Components of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 3;
        let px = self.pixels.get(offset..offset + 3)?;
        Some([px[0], px[1], px[2]])
    }
}

/// Shape and timing of a decoded stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub width: usize,
    pub height: usize,
    pub resolution: String,
    pub pixel_format: PixelFormat,
    pub bit_depth: u8,
    pub frame_rate: f64,
    pub interlaced: bool,
    pub frame_count: usize,
    pub duration_seconds: f64,
}

/// Result of one video decode.
#[derive(Debug, Clone)]
pub struct VideoDecodeOutput {
    pub frames: Vec<VideoFrame>,
    /// Parameters the frames were unpacked with
    pub params: VideoParameters,
    /// Parameters came from inference rather than configuration
    pub params_inferred: bool,
    /// Frames skipped because their layout has no unpacking path
    pub dropped_frames: usize,
}

impl VideoDecodeOutput {
    pub fn summary(&self) -> VideoSummary {
        let frame_count = self.frames.len();
        let duration_seconds = if self.params.frame_rate > 0.0 {
            frame_count as f64 / self.params.frame_rate
        } else {
            0.0
        };

        VideoSummary {
            width: self.params.width,
            height: self.params.height,
            resolution: self.params.resolution(),
            pixel_format: self.params.pixel_format,
            bit_depth: self.params.bit_depth,
            frame_rate: self.params.frame_rate,
            interlaced: self.params.interlaced,
            frame_count,
            duration_seconds,
        }
    }
}

/// Decoder for ST 2110-20 uncompressed video.
#[derive(Debug, Clone, Default)]
pub struct VideoDecoder {
    params: Option<VideoParameters>,
}

impl VideoDecoder {
    /// Decoder that infers parameters from each stream it decodes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: VideoParameters) -> Self {
        Self { params: Some(params) }
    }

    pub fn params(&self) -> Option<&VideoParameters> {
        self.params.as_ref()
    }

    /// Infer parameters from frame sizes and arrival times.
    pub fn infer_params(packets: &[RtpPacket]) -> VideoParameters {
        let frames = group_into_frames(packets);
        let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
            debug!("No video frames to infer from, using 1080p defaults");
            return VideoParameters::default();
        };

        let total_bytes: usize = packets.iter().map(|p| p.payload().len()).sum();
        let average_frame_bytes = total_bytes as f64 / frames.len() as f64;

        let span = match (first.first(), last.last()) {
            (Some(start), Some(end)) => end.arrival_time() - start.arrival_time(),
            _ => 0.0,
        };
        let frame_rate = infer_frame_rate(frames.len(), span);

        infer_geometry(average_frame_bytes, frame_rate)
    }
}

impl EssenceDecoder for VideoDecoder {
    type Output = VideoDecodeOutput;

    fn stream_type(&self) -> StreamType {
        StreamType::Video
    }

    fn decode(&self, packets: &[RtpPacket], info: &StreamInfo) -> Result<VideoDecodeOutput> {
        let (params, params_inferred) = match &self.params {
            Some(params) => (params.clone(), false),
            None => (Self::infer_params(packets), true),
        };

        let mut frames = Vec::new();
        let mut dropped_frames = 0;

        for frame_packets in group_into_frames(packets) {
            let Some(first) = frame_packets.first() else {
                continue;
            };
            let data = concat_payloads(frame_packets);

            match unpack_frame(&data, &params) {
                Ok(pixels) => frames.push(VideoFrame {
                    index: frames.len(),
                    rtp_timestamp: first.timestamp(),
                    arrival_time: first.arrival_time(),
                    packet_count: frame_packets.len(),
                    complete: frame_packets.last().is_some_and(RtpPacket::marker),
                    width: params.width,
                    height: params.height,
                    pixels,
                }),
                Err(e) => {
                    debug!(ssrc = info.ssrc, rtp_timestamp = first.timestamp(), error = %e, "Dropping video frame");
                    dropped_frames += 1;
                }
            }
        }

        if dropped_frames > 0 {
            warn!(ssrc = info.ssrc, dropped_frames, "Video frames could not be unpacked");
        }

        debug!(
            ssrc = info.ssrc,
            frames = frames.len(),
            resolution = %params.resolution(),
            pixel_format = %params.pixel_format,
            bit_depth = params.bit_depth,
            params_inferred,
            "Decoded video stream"
        );

        Ok(VideoDecodeOutput { frames, params, params_inferred, dropped_frames })
    }
}
