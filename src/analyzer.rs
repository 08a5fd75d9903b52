//! Single entry point from captured traffic to decoded essence

use tracing::info;

use crate::anc::{AncDecodeOutput, AncDecoder};
use crate::audio::{AudioDecodeOutput, AudioDecoder};
use crate::config::AnalyzerConfig;
use crate::decoder::EssenceDecoder;
use crate::rtp::{DemuxedStreams, PacketSource, StreamDemuxer};
use crate::video::{VideoDecodeOutput, VideoDecoder};
use crate::Result;

/// Demultiplexes a capture and runs the essence decoders on its streams.
///
/// # Example
///
/// ```rust
/// use st2110::rtp::{Datagram, MemorySource, RtpHeader};
/// use st2110::{Analyzer, AnalyzerConfig};
///
/// let config = AnalyzerConfig::from_yaml_str("audio:\n  sample_rate: 48000\n  bit_depth: 16\n  channels: 2\n")?;
/// let analyzer = Analyzer::new(config)?;
///
/// let mut source = MemorySource::new();
/// for seq in 0..10u16 {
///     let datagram = RtpHeader::new(97, seq, u32::from(seq) * 48, 0xA0D10).encode(&[0u8; 192]);
///     source.push(Datagram::new(datagram, f64::from(seq) * 0.001));
/// }
///
/// let streams = analyzer.demux(&mut source)?;
/// let audio = analyzer.decode_audio(&streams, None)?;
/// assert_eq!(audio.buffer.sample_count(), 480);
/// # Ok::<(), st2110::MediaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    demuxer: StreamDemuxer,
    video: VideoDecoder,
    audio: AudioDecoder,
    anc: AncDecoder,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            demuxer: StreamDemuxer::default(),
            video: VideoDecoder::new(),
            audio: AudioDecoder::new(),
            anc: AncDecoder::new(),
        }
    }
}

impl Analyzer {
    /// Build an analyzer from validated configuration.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let demuxer = StreamDemuxer::from_config(&config)?;
        let video = config.video.map_or_else(VideoDecoder::new, VideoDecoder::with_params);
        let audio = config.audio.map_or_else(AudioDecoder::new, AudioDecoder::with_params);

        Ok(Self { demuxer, video, audio, anc: AncDecoder::new() })
    }

    pub fn demuxer(&self) -> &StreamDemuxer {
        &self.demuxer
    }

    /// Drain a packet source into per-stream packet lists and statistics.
    pub fn demux<S>(&self, source: &mut S) -> Result<DemuxedStreams>
    where
        S: PacketSource + ?Sized,
    {
        self.demuxer.demux(source)
    }

    /// Decode the chosen video stream, or the first stream classified as
    /// video.
    pub fn decode_video(&self, streams: &DemuxedStreams, ssrc: Option<u32>) -> Result<VideoDecodeOutput> {
        run(&self.video, streams, ssrc)
    }

    /// Decode the chosen audio stream, or the first stream classified as
    /// audio.
    pub fn decode_audio(&self, streams: &DemuxedStreams, ssrc: Option<u32>) -> Result<AudioDecodeOutput> {
        run(&self.audio, streams, ssrc)
    }

    /// Decode the chosen ancillary stream, or the first stream classified as
    /// meta.
    pub fn decode_ancillary(&self, streams: &DemuxedStreams, ssrc: Option<u32>) -> Result<AncDecodeOutput> {
        run(&self.anc, streams, ssrc)
    }
}

fn run<D: EssenceDecoder>(decoder: &D, streams: &DemuxedStreams, ssrc: Option<u32>) -> Result<D::Output> {
    let ssrc = streams.select_stream(decoder.stream_type(), ssrc)?;
    let (packets, info) = streams.stream(ssrc)?;
    info!(ssrc, kind = %decoder.stream_type(), packets = packets.len(), "Decoding stream");
    decoder.decode(packets, info)
}
