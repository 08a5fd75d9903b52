//! Essence classification for RTP streams

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MediaError;

/// Kind of essence carried by an RTP stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// ST 2110-20 uncompressed video (or another video payload)
    Video,
    /// ST 2110-30/31 PCM audio (or another audio payload)
    Audio,
    /// ST 2110-40 ancillary data
    #[serde(alias = "anc", alias = "ancillary")]
    Meta,
    /// No override and no payload-type table entry
    Unknown,
}

impl StreamType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StreamType::Video => "video",
            StreamType::Audio => "audio",
            StreamType::Meta => "meta",
            StreamType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(StreamType::Video),
            "audio" => Ok(StreamType::Audio),
            "meta" | "anc" | "ancillary" => Ok(StreamType::Meta),
            "unknown" => Ok(StreamType::Unknown),
            other => Err(MediaError::Parse {
                context: "Stream type".to_string(),
                details: format!("'{}' is not one of video, audio, meta, unknown", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively_with_aliases() {
        assert_eq!("Video".parse::<StreamType>().unwrap(), StreamType::Video);
        assert_eq!(" audio ".parse::<StreamType>().unwrap(), StreamType::Audio);
        assert_eq!("ANC".parse::<StreamType>().unwrap(), StreamType::Meta);
        assert!("subtitles".parse::<StreamType>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for kind in [StreamType::Video, StreamType::Audio, StreamType::Meta, StreamType::Unknown] {
            assert_eq!(kind.to_string().parse::<StreamType>().unwrap(), kind);
        }
    }
}
