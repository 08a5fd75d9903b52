//! ST 2110-40 ancillary data: SMPTE 291M packets, timecode and captions

mod caption;
mod decoder;
mod packet;
mod timecode;
mod types;

pub use caption::{Caption, CaptionStandard, decode_cea608, decode_cea708};
pub use decoder::{AncDecodeOutput, AncDecoder, AncSummary};
pub use packet::{AncPacket, parse_anc_packet, scan_payload};
pub use timecode::{Timecode, decode_timecode};
pub use types::{ANC_TYPES, AncPayloadKind, anc_type_name};
