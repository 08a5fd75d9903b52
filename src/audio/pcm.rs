//! Big-endian linear PCM sample conversion

use crate::{MediaError, Result};

const SCALE_16: f32 = 32_768.0;
const SCALE_20: f32 = 524_288.0;
const SCALE_24: f32 = 8_388_608.0;

/// 16-bit two's complement
pub fn sample_16(bytes: [u8; 2]) -> f32 {
    f32::from(i16::from_be_bytes(bytes)) / SCALE_16
}

/// 20-bit two's complement in three bytes, low nibble of the last byte unused
pub fn sample_20(bytes: [u8; 3]) -> f32 {
    let raw = (u32::from(bytes[0]) << 12) | (u32::from(bytes[1]) << 4) | (u32::from(bytes[2]) >> 4);
    let value = if raw & 0x8_0000 != 0 { raw as i32 - 0x10_0000 } else { raw as i32 };
    value as f32 / SCALE_20
}

/// 24-bit two's complement
pub fn sample_24(bytes: [u8; 3]) -> f32 {
    let raw = (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);
    let value = if raw & 0x80_0000 != 0 { raw as i32 - 0x100_0000 } else { raw as i32 };
    value as f32 / SCALE_24
}

/// Convert interleaved PCM into one sample vector per channel.
///
/// Trailing bytes that do not fill a whole frame (one sample for every
/// channel) are ignored. Zero channels or a depth other than 16, 20 or 24
/// fails with [`MediaError::UnsupportedConfiguration`].
pub fn deinterleave(data: &[u8], bit_depth: u8, channels: usize) -> Result<Vec<Vec<f32>>> {
    if channels == 0 {
        return Err(MediaError::unsupported("audio stream with zero channels"));
    }

    let convert: fn(&[u8]) -> f32 = match bit_depth {
        16 => read_16,
        20 => read_20,
        24 => read_24,
        other => return Err(MediaError::unsupported(format!("{}-bit PCM", other))),
    };

    let bytes_per_sample = usize::from(bit_depth).div_ceil(8);
    let frame_size = channels * bytes_per_sample;
    let frame_count = data.len() / frame_size;

    let mut output = vec![Vec::with_capacity(frame_count); channels];
    for frame in data.chunks_exact(frame_size) {
        for (channel, sample) in output.iter_mut().zip(frame.chunks_exact(bytes_per_sample)) {
            channel.push(convert(sample));
        }
    }

    Ok(output)
}

// Chunks handed to these are exactly one sample wide
fn read_16(b: &[u8]) -> f32 {
    sample_16([b[0], b[1]])
}

fn read_20(b: &[u8]) -> f32 {
    sample_20([b[0], b[1], b[2]])
}

fn read_24(b: &[u8]) -> f32 {
    sample_24([b[0], b[1], b[2]])
}
