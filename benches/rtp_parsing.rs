//! Benchmarks for RTP header parsing and stream demultiplexing
//!
//! Measures:
//! - Fixed header parsing on a 1400-byte ST 2110-20 sized datagram
//! - Parsing with CSRCs, an extension and padding
//! - Demultiplexing a mixed video/audio/ancillary capture end to end

use bytes::Bytes;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use st2110::rtp::{HeaderExtension, MemorySource, RtpHeader, StreamDemuxer, parse_header};
use st2110::test_utils::{mixed_capture, to_datagrams, video_packets};
use std::hint::black_box;

fn bench_parse_header(c: &mut Criterion) {
    let plain = RtpHeader::new(96, 1, 90_000, 0x1234_5678).encode(&[0x80; 1400]);

    let mut header = RtpHeader::new(96, 1, 90_000, 0x1234_5678);
    header.marker = true;
    header.csrcs = vec![1, 2, 3];
    header.extension = Some(HeaderExtension { profile: 0xBEDE, data: Bytes::from_static(&[0; 8]) });
    header.padding_len = 4;
    let extended = header.encode(&[0x80; 1400]);

    let mut group = c.benchmark_group("parse_header");
    group.throughput(Throughput::Bytes(plain.len() as u64));

    group.bench_function("fixed_header", |b| {
        b.iter(|| black_box(parse_header(black_box(&plain))))
    });

    group.bench_function("csrc_extension_padding", |b| {
        b.iter(|| black_box(parse_header(black_box(&extended))))
    });

    group.finish();
}

fn bench_demux(c: &mut Criterion) {
    let demuxer = StreamDemuxer::default();

    let mut group = c.benchmark_group("demux");

    let capture_packets = mixed_capture(250).remaining() as u64;
    group.throughput(Throughput::Elements(capture_packets));
    group.bench_function("mixed_capture_10s", |b| {
        b.iter_batched(
            || mixed_capture(250),
            |mut source| black_box(demuxer.demux(&mut source)),
            BatchSize::LargeInput,
        )
    });

    // Two video streams interleaved, sorted and analyzed without parsing
    let mut packets = video_packets(0xA, 500, 8, 50.0, &[0; 1200]);
    packets.extend(video_packets(0xB, 500, 8, 50.0, &[0; 1200]));
    group.throughput(Throughput::Elements(packets.len() as u64));
    group.bench_function("group_and_analyze_8000", |b| {
        b.iter_batched(
            || packets.clone(),
            |packets| black_box(demuxer.group_and_analyze(packets)),
            BatchSize::LargeInput,
        )
    });

    let datagrams = to_datagrams(&packets);
    group.bench_function("parse_and_demux_8000", |b| {
        b.iter_batched(
            || MemorySource::from_datagrams(datagrams.clone()),
            |mut source| black_box(demuxer.demux(&mut source)),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_parse_header, bench_demux);
criterion_main!(benches);
