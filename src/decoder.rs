//! Common interface of the essence decoders

use crate::Result;
use crate::types::{RtpPacket, StreamInfo, StreamType};

/// Decodes one demultiplexed stream into essence.
///
/// Decoders hold only their configured parameters. Every call works on the
/// packet list it is given and returns a fresh output, so one instance can
/// decode any number of streams.
pub trait EssenceDecoder {
    type Output;

    /// Essence kind this decoder expects
    fn stream_type(&self) -> StreamType;

    /// Decode a stream's sequence-sorted packets.
    fn decode(&self, packets: &[RtpPacket], info: &StreamInfo) -> Result<Self::Output>;
}
