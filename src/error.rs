//! Error types for RTP analysis and essence decoding.
//!
//! All errors implement the `std::error::Error` trait and carry enough context
//! to tell a caller whether processing can continue past them.
//!
//! ## Error Categories
//!
//! - **Malformed packets**: RTP headers that are too short, carry the wrong
//!   version, or have truncated CSRC/extension regions. These are rejected and
//!   processing continues with the next datagram.
//! - **Unsupported configurations**: pixel format, bit depth or channel layouts
//!   with no unpacking path. Video drops the affected frame, audio aborts.
//! - **Empty streams**: statistics requested over zero packets.
//! - **Lookup errors**: an SSRC that is not part of the capture, or a capture
//!   with no streams at all.
//! - **Configuration errors**: invalid YAML or out-of-range configured values.
//!
//! ## Recovery
//!
//! ```rust
//! use st2110::MediaError;
//!
//! let error = MediaError::malformed_packet("RTP header shorter than 12 bytes");
//! if error.is_recoverable() {
//!     // skip the datagram and keep going
//! }
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media operations.
pub type Result<T, E = MediaError> = std::result::Result<T, E>;

/// Main error type for RTP analysis and decoding.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MediaError {
    #[error("Malformed RTP packet: {reason}")]
    MalformedPacket { reason: String },

    #[error("Unsupported configuration: {details}")]
    UnsupportedConfiguration { details: String },

    #[error("Cannot analyze empty stream (SSRC {ssrc:#010x})")]
    EmptyStream { ssrc: u32 },

    #[error("No stream found with SSRC {ssrc:#010x}")]
    StreamNotFound { ssrc: u32 },

    #[error("Capture contains no RTP streams")]
    NoStreams,

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Packet source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MediaError {
    /// Returns whether processing can continue after this error.
    ///
    /// A malformed datagram only costs that one packet; everything else
    /// aborts the operation that raised it.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::MalformedPacket { .. } => true,
            MediaError::UnsupportedConfiguration { .. } => false,
            MediaError::EmptyStream { .. } => false,
            MediaError::StreamNotFound { .. } => false,
            MediaError::NoStreams => false,
            MediaError::Parse { .. } => false,
            MediaError::Config { .. } => false,
            MediaError::File { .. } => false,
            MediaError::Source { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MediaError::MalformedPacket { .. } => vec![
                "Check that the capture filter only selects RTP traffic",
                "Verify the UDP payload is not truncated by the capture snaplen",
            ],
            MediaError::UnsupportedConfiguration { .. } => vec![
                "Supply explicit stream parameters instead of relying on inference",
                "Check the SDP for the actual sampling and bit depth",
            ],
            MediaError::EmptyStream { .. } => vec![
                "Verify the capture contains packets for this stream",
                "Check the stream type overrides select the intended SSRC",
            ],
            MediaError::StreamNotFound { .. } => vec![
                "List the streams in the capture and pick an existing SSRC",
                "Check the SSRC was given in the expected radix (0x prefix for hex)",
            ],
            MediaError::NoStreams => vec![
                "Check the capture filter matches the media traffic",
                "Look at the rejected datagram count for non-RTP input",
            ],
            MediaError::Parse { .. } => vec![
                "Check the YAML syntax of the configuration",
                "Verify field names and value types",
            ],
            MediaError::Config { .. } => vec![
                "Use a supported bit depth, pixel format and channel count",
                "Remove the parameter block to let the decoder infer it",
            ],
            MediaError::File { .. } => vec![
                "Check the file exists and is readable",
                "Check file permissions",
            ],
            MediaError::Source { .. } => vec![
                "Verify the capture reader is still valid",
                "Re-open the capture and retry",
            ],
        }
    }

    /// Helper constructor for rejected RTP datagrams.
    pub fn malformed_packet(reason: impl Into<String>) -> Self {
        MediaError::MalformedPacket { reason: reason.into() }
    }

    /// Helper constructor for unsupported format combinations.
    pub fn unsupported(details: impl Into<String>) -> Self {
        MediaError::UnsupportedConfiguration { details: details.into() }
    }

    /// Helper constructor for configuration validation errors.
    pub fn config(reason: impl Into<String>) -> Self {
        MediaError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        MediaError::File { path, source }
    }

    /// Helper constructor for packet source failures with an underlying cause.
    pub fn source_failed(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        MediaError::Source { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            reason in ".*",
            details in ".*",
            ssrc in any::<u32>(),
        ) {
            let malformed = MediaError::malformed_packet(reason.clone());
            prop_assert!(malformed.to_string().contains(&reason));

            let unsupported = MediaError::unsupported(details.clone());
            prop_assert!(unsupported.to_string().contains(&details));

            let empty = MediaError::EmptyStream { ssrc };
            let ssrc_hex = format!("{:#010x}", ssrc);
            prop_assert!(empty.to_string().contains(&ssrc_hex));

            let missing = MediaError::StreamNotFound { ssrc };
            prop_assert!(missing.to_string().contains(&ssrc_hex));
        }
    }

    #[test]
    fn only_malformed_packets_are_recoverable() {
        assert!(MediaError::malformed_packet("short").is_recoverable());
        assert!(!MediaError::unsupported("12-bit 4:2:2").is_recoverable());
        assert!(!MediaError::EmptyStream { ssrc: 1 }.is_recoverable());
        assert!(!MediaError::StreamNotFound { ssrc: 1 }.is_recoverable());
        assert!(!MediaError::config("bad").is_recoverable());
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = vec![
            MediaError::malformed_packet("x"),
            MediaError::unsupported("x"),
            MediaError::EmptyStream { ssrc: 0 },
            MediaError::StreamNotFound { ssrc: 0 },
            MediaError::NoStreams,
            MediaError::Parse { context: "c".into(), details: "d".into() },
            MediaError::config("x"),
            MediaError::file_error(PathBuf::from("/cfg.yaml"), std::io::Error::other("io")),
            MediaError::source_failed("x", Box::new(std::io::Error::other("io"))),
        ];

        for error in errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} has no suggestions");
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<MediaError>();
    }

    #[test]
    fn source_chain_is_preserved() {
        let error = MediaError::source_failed("reader closed", Box::new(std::io::Error::other("eof")));
        let source = std::error::Error::source(&error).expect("source should be chained");
        assert_eq!(source.to_string(), "eof");
    }

    #[test]
    fn io_errors_convert_to_file_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing config");
        match MediaError::from(io_err) {
            MediaError::File { source, .. } => assert_eq!(source.to_string(), "missing config"),
            other => panic!("Expected File error variant, got {other:?}"),
        }
    }
}
