//! Pixel unpacking into 8-bit, 3-channel interleaved frames
//!
//! Every layout produces `height * width * 3` bytes. Wider-than-8-bit
//! components are reduced to their top 8 bits. 10-bit 4:2:2 is read as one
//! big-endian 16-bit word per component rather than the pgroup packing of
//! ST 2110-20, so it only approximates the picture.

use super::params::{PixelFormat, VideoParameters};
use crate::{MediaError, Result};

/// Unpack one frame's concatenated payload.
///
/// Short payload is zero-padded and long payload truncated to the frame
/// size. Layouts without an unpacking path return
/// [`MediaError::UnsupportedConfiguration`].
pub fn unpack_frame(data: &[u8], params: &VideoParameters) -> Result<Vec<u8>> {
    check_supported(params)?;

    let pixels = params.width * params.height;
    let frame_size = params.frame_size_bytes();
    let mut out = vec![0u8; pixels * 3];

    if data.len() >= frame_size {
        unpack_into(&data[..frame_size], params, &mut out);
    } else {
        let mut padded = data.to_vec();
        padded.resize(frame_size, 0);
        unpack_into(&padded, params, &mut out);
    }

    Ok(out)
}

fn check_supported(params: &VideoParameters) -> Result<()> {
    match (params.pixel_format, params.bit_depth) {
        (PixelFormat::YCbCr422, 8) if params.width % 2 != 0 => Err(MediaError::unsupported(
            format!("8-bit 4:2:2 needs an even width, got {}", params.width),
        )),
        (PixelFormat::YCbCr422, 8 | 10) => Ok(()),
        (PixelFormat::YCbCr444 | PixelFormat::Rgb, 8 | 10 | 12 | 16) => Ok(()),
        (format, depth) => {
            Err(MediaError::unsupported(format!("no unpacking path for {}-bit {}", depth, format)))
        }
    }
}

// `data` is exactly `frame_size_bytes()` long
fn unpack_into(data: &[u8], params: &VideoParameters, out: &mut [u8]) {
    match (params.pixel_format, params.bit_depth) {
        (PixelFormat::YCbCr422, 8) => unpack_uyvy(data, out),
        (PixelFormat::YCbCr422, _) => unpack_422_words(data, out),
        (_, 8) => out.copy_from_slice(data),
        (_, depth) => unpack_words(data, depth - 8, out),
    }
}

/// U Y0 V Y1 covers two pixels which share the chroma pair.
fn unpack_uyvy(data: &[u8], out: &mut [u8]) {
    for (group, pixels) in data.chunks_exact(4).zip(out.chunks_exact_mut(6)) {
        let (u, y0, v, y1) = (group[0], group[1], group[2], group[3]);
        pixels.copy_from_slice(&[y0, u, v, y1, u, v]);
    }
}

/// One (Y, C) word pair per pixel, chroma repeated into both channels.
fn unpack_422_words(data: &[u8], out: &mut [u8]) {
    for (pair, pixel) in data.chunks_exact(4).zip(out.chunks_exact_mut(3)) {
        let y = (u16::from_be_bytes([pair[0], pair[1]]) >> 6) as u8;
        let c = (u16::from_be_bytes([pair[2], pair[3]]) >> 6) as u8;
        pixel.copy_from_slice(&[y, c, c]);
    }
}

fn unpack_words(data: &[u8], shift: u8, out: &mut [u8]) {
    for (word, component) in data.chunks_exact(2).zip(out.iter_mut()) {
        *component = (u16::from_be_bytes([word[0], word[1]]) >> shift) as u8;
    }
}
