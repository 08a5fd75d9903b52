//! Analyzer configuration
//!
//! Configuration is plain YAML. Every field is optional:
//!
//! ```yaml
//! use_ptp: true
//! stream_types:
//!   ssrc:
//!     "0x1234ABCD": video   # hex with 0x prefix, or decimal
//!     "305419896": audio
//!   payload_type:
//!     99: meta
//! video:
//!   width: 1920
//!   height: 1080
//!   pixel_format: YCbCr-4:2:2
//!   bit_depth: 10
//!   frame_rate: 59.94
//! audio:
//!   sample_rate: 48000
//!   bit_depth: 24
//!   channels: 8
//! ```
//!
//! Parameter blocks that are absent leave the matching decoder to infer its
//! parameters from the traffic.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::AudioParameters;
use crate::rtp::StreamTypeOverrides;
use crate::types::StreamType;
use crate::video::{PixelFormat, VideoParameters};
use crate::{MediaError, Result};

/// Stream classification overrides as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTypeConfig {
    /// SSRC (decimal or `0x` hex) to stream type
    pub ssrc: BTreeMap<String, StreamType>,
    /// Payload type to stream type
    pub payload_type: BTreeMap<u8, StreamType>,
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Keep external (PTP) timestamps delivered by the packet source
    pub use_ptp: bool,
    pub stream_types: StreamTypeConfig,
    /// Fixed video parameters; inferred per stream when absent
    pub video: Option<VideoParameters>,
    /// Fixed audio parameters; inferred per stream when absent
    pub audio: Option<AudioParameters>,
}

impl AnalyzerConfig {
    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_yaml_ng::from_str(yaml).map_err(|e| MediaError::Parse {
            context: "Analyzer configuration".to_string(),
            details: format!("YAML parsing failed: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml =
            std::fs::read_to_string(path).map_err(|e| MediaError::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), "Loaded analyzer configuration");
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| MediaError::Parse {
            context: "Analyzer configuration".to_string(),
            details: format!("YAML serialization failed: {}", e),
        })
    }

    /// Check configured values are decodable.
    pub fn validate(&self) -> Result<()> {
        self.stream_type_overrides()?;

        for payload_type in self.stream_types.payload_type.keys() {
            if *payload_type > 0x7F {
                return Err(MediaError::config(format!(
                    "payload type {} does not fit in 7 bits",
                    payload_type
                )));
            }
        }

        if let Some(video) = &self.video {
            validate_video(video)?;
        }
        if let Some(audio) = &self.audio {
            validate_audio(audio)?;
        }
        Ok(())
    }

    /// Resolve the configured overrides into lookup tables.
    pub fn stream_type_overrides(&self) -> Result<StreamTypeOverrides> {
        let mut overrides = StreamTypeOverrides::new();
        for (ssrc, kind) in &self.stream_types.ssrc {
            overrides = overrides.with_ssrc(parse_ssrc(ssrc)?, *kind);
        }
        for (payload_type, kind) in &self.stream_types.payload_type {
            overrides = overrides.with_payload_type(*payload_type, *kind);
        }
        Ok(overrides)
    }
}

/// Parse an SSRC written in decimal or as `0x`-prefixed hex.
pub fn parse_ssrc(value: &str) -> Result<u32> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|e| MediaError::Parse {
        context: "SSRC".to_string(),
        details: format!("'{}' is not a 32-bit decimal or 0x hex value: {}", value, e),
    })
}

fn validate_video(video: &VideoParameters) -> Result<()> {
    if video.width == 0 || video.height == 0 {
        return Err(MediaError::config(format!(
            "video dimensions must be non-zero, got {}",
            video.resolution()
        )));
    }
    if !video.frame_rate.is_finite() || video.frame_rate <= 0.0 {
        return Err(MediaError::config(format!(
            "video frame rate must be positive, got {}",
            video.frame_rate
        )));
    }
    let supported = match video.pixel_format {
        PixelFormat::YCbCr422 => matches!(video.bit_depth, 8 | 10),
        PixelFormat::YCbCr444 | PixelFormat::Rgb => matches!(video.bit_depth, 8 | 10 | 12 | 16),
    };
    if !supported {
        return Err(MediaError::config(format!(
            "{}-bit {} video cannot be unpacked",
            video.bit_depth, video.pixel_format
        )));
    }
    if video.pixel_format == PixelFormat::YCbCr422 && video.bit_depth == 8 && video.width % 2 != 0 {
        return Err(MediaError::config(format!(
            "8-bit 4:2:2 video needs an even width, got {}",
            video.width
        )));
    }
    Ok(())
}

fn validate_audio(audio: &AudioParameters) -> Result<()> {
    if audio.sample_rate == 0 {
        return Err(MediaError::config("audio sample rate must be non-zero"));
    }
    if audio.channels == 0 {
        return Err(MediaError::config("audio channel count must be non-zero"));
    }
    if !matches!(audio.bit_depth, 16 | 20 | 24) {
        return Err(MediaError::config(format!(
            "audio bit depth must be 16, 20 or 24, got {}",
            audio.bit_depth
        )));
    }
    Ok(())
}
