//! Synthetic ST 2110 traffic for tests and benchmarks
//!
//! Builders produce sequence-numbered [`RtpPacket`]s with plausible RTP
//! timestamps and arrival times, or whole datagrams for driving the header
//! parser through a [`MemorySource`].

#![cfg(any(test, feature = "benchmark"))]

use bytes::Bytes;

use crate::rtp::{Datagram, MemorySource, RtpHeader};
use crate::types::RtpPacket;

/// RTP clock of ST 2110-20 and -40 streams
pub const VIDEO_CLOCK_RATE: f64 = 90_000.0;

/// Video packets with the marker bit on the last packet of each frame.
///
/// Every packet carries `chunk`, so a frame is `packets_per_frame * chunk.len()`
/// bytes.
pub fn video_packets(
    ssrc: u32,
    frame_count: u16,
    packets_per_frame: u16,
    frame_rate: f64,
    chunk: &[u8],
) -> Vec<RtpPacket> {
    let chunk = Bytes::copy_from_slice(chunk);
    let ticks_per_frame = VIDEO_CLOCK_RATE / frame_rate;
    let mut packets = Vec::with_capacity(usize::from(frame_count) * usize::from(packets_per_frame));

    for frame in 0..frame_count {
        let rtp_timestamp = (f64::from(frame) * ticks_per_frame) as u32;
        let frame_start = f64::from(frame) / frame_rate;
        for index in 0..packets_per_frame {
            let seq = frame.wrapping_mul(packets_per_frame).wrapping_add(index);
            packets.push(RtpPacket::new(
                seq,
                rtp_timestamp,
                ssrc,
                96,
                index + 1 == packets_per_frame,
                chunk.clone(),
                frame_start + f64::from(index) * 1e-5,
            ));
        }
    }
    packets
}

/// Big-endian PCM of a 1 kHz tone, one frame per sample period.
///
/// Channel `n` is scaled by `1 / (n + 1)` so channels stay distinguishable.
pub fn pcm_payload(first_sample: u32, samples: u32, channels: usize, bit_depth: u8) -> Vec<u8> {
    let bytes_per_sample = usize::from(bit_depth).div_ceil(8);
    let mut payload = Vec::with_capacity(samples as usize * channels * bytes_per_sample);

    for n in first_sample..first_sample + samples {
        let phase = f64::from(n) * 1_000.0 / 48_000.0 * std::f64::consts::TAU;
        for channel in 0..channels {
            let amplitude = phase.sin() * 0.5 / (channel as f64 + 1.0);
            match bit_depth {
                16 => payload.extend_from_slice(&((amplitude * 32_767.0) as i16).to_be_bytes()),
                // 20-bit samples sit in the top of three bytes
                20 => {
                    let value = ((amplitude * 524_287.0) as i32) << 4;
                    payload.extend_from_slice(&value.to_be_bytes()[1..]);
                }
                _ => {
                    let value = (amplitude * 8_388_607.0) as i32;
                    payload.extend_from_slice(&value.to_be_bytes()[1..]);
                }
            }
        }
    }
    payload
}

/// Audio packets of `samples_per_packet` frames each, one per millisecond.
pub fn audio_packets(
    ssrc: u32,
    packet_count: u16,
    samples_per_packet: u32,
    channels: usize,
    bit_depth: u8,
) -> Vec<RtpPacket> {
    (0..packet_count)
        .map(|seq| {
            let first_sample = u32::from(seq) * samples_per_packet;
            RtpPacket::new(
                seq,
                first_sample,
                ssrc,
                97,
                false,
                pcm_payload(first_sample, samples_per_packet, channels, bit_depth),
                f64::from(seq) * 0.001,
            )
        })
        .collect()
}

/// One framed ancillary packet: header, user data, checksum and two pad bytes.
pub fn anc_packet_bytes(did: u8, sdid: u8, user_data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(user_data.len() + 6);
    bytes.extend_from_slice(&[did, sdid, user_data.len() as u8]);
    bytes.extend_from_slice(user_data);
    let checksum = bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte));
    bytes.extend_from_slice(&[checksum, 0x00, 0x00]);
    bytes
}

/// SMPTE 12M timecode packet payload.
pub fn anc_timecode_payload(frames: u8, seconds: u8, minutes: u8, hours: u8, drop_frame: bool) -> Vec<u8> {
    let frames = if drop_frame { frames | 0x40 } else { frames };
    anc_packet_bytes(0x60, 0x60, &[frames, seconds, minutes, hours])
}

/// CEA-608 packet payload carrying `text` as byte pairs with odd parity.
pub fn anc_cea608_payload(text: &str) -> Vec<u8> {
    let mut user_data: Vec<u8> = text.bytes().map(with_odd_parity).collect();
    if user_data.len() % 2 != 0 {
        user_data.push(0x80);
    }
    anc_packet_bytes(0x61, 0x02, &user_data)
}

fn with_odd_parity(byte: u8) -> u8 {
    let byte = byte & 0x7F;
    if byte.count_ones() % 2 == 0 { byte | 0x80 } else { byte }
}

/// Encode packets back into datagrams.
pub fn to_datagrams(packets: &[RtpPacket]) -> Vec<Datagram> {
    packets
        .iter()
        .map(|packet| {
            let mut header =
                RtpHeader::new(packet.payload_type(), packet.sequence(), packet.timestamp(), packet.ssrc());
            header.marker = packet.marker();
            Datagram::new(header.encode(packet.payload()), packet.arrival_time())
        })
        .collect()
}

/// Interleaved capture of one video, one audio and one ancillary stream,
/// plus two malformed datagrams.
///
/// Video is SSRC `0x1000_0001` (2x2 RGB 8-bit, 25 fps, two packets per
/// frame), audio `0x2000_0002` (48 kHz 24-bit stereo, 48 samples per packet)
/// and ancillary `0x3000_0003` (one timecode per frame).
pub fn mixed_capture(frame_count: u16) -> MemorySource {
    let video = video_packets(0x1000_0001, frame_count, 2, 25.0, &[0x40; 6]);
    let audio = audio_packets(0x2000_0002, frame_count * 40, 48, 2, 24);
    let anc: Vec<RtpPacket> = (0..frame_count)
        .map(|frame| {
            RtpPacket::new(
                frame,
                u32::from(frame) * 3600,
                0x3000_0003,
                98,
                true,
                anc_timecode_payload((frame % 25) as u8, (frame / 25 % 60) as u8, 0, 10, false),
                f64::from(frame) / 25.0,
            )
        })
        .collect();

    let mut packets: Vec<RtpPacket> = video.into_iter().chain(audio).chain(anc).collect();
    packets.sort_by(|a, b| a.arrival_time().total_cmp(&b.arrival_time()));

    let mut datagrams = to_datagrams(&packets);
    datagrams.push(Datagram::new(vec![0x80, 0x60, 0x00], 0.0));
    datagrams.push(Datagram::new(vec![0x40; 16], 0.0));
    MemorySource::from_datagrams(datagrams)
}
