//! Video stream parameters and their inference from observed traffic

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Pixel sampling structure of an ST 2110-20 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "YCbCr-4:2:2")]
    YCbCr422,
    #[serde(rename = "YCbCr-4:4:4")]
    YCbCr444,
    #[serde(rename = "RGB")]
    Rgb,
}

impl PixelFormat {
    /// Components per pixel, averaged over a 4:2:2 pixel pair
    pub const fn components_per_pixel(&self) -> usize {
        match self {
            PixelFormat::YCbCr422 => 2,
            PixelFormat::YCbCr444 | PixelFormat::Rgb => 3,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::YCbCr422 => "YCbCr-4:2:2",
            PixelFormat::YCbCr444 => "YCbCr-4:4:4",
            PixelFormat::Rgb => "RGB",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sample packing mode signalled in SDP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackingMode {
    #[default]
    General,
    Block,
}

/// Geometry and sampling of a video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoParameters {
    pub width: usize,
    pub height: usize,
    pub pixel_format: PixelFormat,
    /// Bits per component
    pub bit_depth: u8,
    pub frame_rate: f64,
    #[serde(default)]
    pub interlaced: bool,
    #[serde(default)]
    pub packing_mode: PackingMode,
}

impl Default for VideoParameters {
    /// 1080p 4:2:2 10-bit at 25 fps
    fn default() -> Self {
        Self::progressive(1920, 1080, PixelFormat::YCbCr422, 10, DEFAULT_FRAME_RATE)
    }
}

impl VideoParameters {
    /// Progressive, general-packing parameters.
    pub fn progressive(
        width: usize,
        height: usize,
        pixel_format: PixelFormat,
        bit_depth: u8,
        frame_rate: f64,
    ) -> Self {
        Self {
            width,
            height,
            pixel_format,
            bit_depth,
            frame_rate,
            interlaced: false,
            packing_mode: PackingMode::General,
        }
    }

    /// Bytes per component: `ceil(bit_depth / 8)`
    pub fn bytes_per_component(&self) -> usize {
        usize::from(self.bit_depth).div_ceil(8)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_format.components_per_pixel() * self.bytes_per_component()
    }

    /// Expected size of one frame's payload in bytes
    pub fn frame_size_bytes(&self) -> usize {
        self.width * self.height * self.bytes_per_pixel()
    }

    /// `"WIDTHxHEIGHT"`
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Frame rate used when it cannot be measured
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// Frame rates measured rates are snapped to
pub const COMMON_FRAME_RATES: [f64; 8] = [23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

/// Candidate resolutions in search order
pub const COMMON_RESOLUTIONS: [(usize, usize); 5] =
    [(1920, 1080), (1280, 720), (3840, 2160), (4096, 2160), (7680, 4320)];

const CANDIDATE_BIT_DEPTHS: [u8; 3] = [8, 10, 12];

const CANDIDATE_FORMATS: [PixelFormat; 3] =
    [PixelFormat::YCbCr422, PixelFormat::YCbCr444, PixelFormat::Rgb];

/// Best match must be within this fraction of the observed frame size
const MAX_RELATIVE_RESIDUAL: f64 = 0.2;

/// Snap a measured rate to the nearest common frame rate.
pub fn snap_frame_rate(measured: f64) -> f64 {
    let mut best = COMMON_FRAME_RATES[0];
    for candidate in COMMON_FRAME_RATES {
        if (candidate - measured).abs() < (best - measured).abs() {
            best = candidate;
        }
    }
    best
}

/// Frame rate from frame count and the arrival-time span they cover.
///
/// Falls back to [`DEFAULT_FRAME_RATE`] for a single frame or a
/// non-positive span.
pub fn infer_frame_rate(frame_count: usize, time_span: f64) -> f64 {
    if frame_count < 2 || time_span <= 0.0 {
        return DEFAULT_FRAME_RATE;
    }
    snap_frame_rate((frame_count - 1) as f64 / time_span)
}

/// Search resolution, bit depth and pixel format for the candidate whose
/// frame size is closest to `average_frame_bytes`.
///
/// Candidates are tried resolution-major, then bit depth, then format; the
/// first strictly better candidate wins ties. A best residual above 20% of
/// the observed size falls back to 1080p 4:2:2 10-bit at `frame_rate`.
pub fn infer_geometry(average_frame_bytes: f64, frame_rate: f64) -> VideoParameters {
    let mut best: Option<(f64, VideoParameters)> = None;

    for (width, height) in COMMON_RESOLUTIONS {
        for bit_depth in CANDIDATE_BIT_DEPTHS {
            for pixel_format in CANDIDATE_FORMATS {
                let candidate =
                    VideoParameters::progressive(width, height, pixel_format, bit_depth, frame_rate);
                let residual = (candidate.frame_size_bytes() as f64 - average_frame_bytes).abs();
                if best.as_ref().is_none_or(|(best_residual, _)| residual < *best_residual) {
                    best = Some((residual, candidate));
                }
            }
        }
    }

    match best {
        Some((residual, params)) if residual <= average_frame_bytes * MAX_RELATIVE_RESIDUAL => {
            debug!(
                resolution = %params.resolution(),
                pixel_format = %params.pixel_format,
                bit_depth = params.bit_depth,
                frame_rate,
                residual,
                "Inferred video parameters"
            );
            params
        }
        _ => {
            warn!(
                average_frame_bytes,
                "No standard video format matches the observed frame size, assuming 1080p 4:2:2 10-bit"
            );
            VideoParameters { frame_rate, ..VideoParameters::default() }
        }
    }
}
