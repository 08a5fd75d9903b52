//! SMPTE 12M timecode carried in ancillary packets

use std::fmt;

use serde::Serialize;

use super::packet::AncPacket;

const DROP_FRAME_FLAG: u8 = 0x40;

/// One timecode value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub drop_frame: bool,
    /// Arrival time of the carrying RTP packet in seconds
    pub timestamp: f64,
}

impl fmt::Display for Timecode {
    /// `HH:MM:SS:FF`, or `HH:MM:SS;FF` for drop-frame
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.drop_frame { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours, self.minutes, self.seconds, separator, self.frames
        )
    }
}

/// Decode the first four user data bytes as frames, seconds, minutes, hours.
pub fn decode_timecode(packet: &AncPacket) -> Option<Timecode> {
    let [frames, seconds, minutes, hours] = *packet.user_data.first_chunk::<4>()?;
    Some(Timecode {
        hours: hours & 0x3F,
        minutes: minutes & 0x7F,
        seconds: seconds & 0x7F,
        frames: frames & 0x3F,
        drop_frame: frames & DROP_FRAME_FLAG != 0,
        timestamp: packet.timestamp,
    })
}
