//! Known SMPTE 291M DID/SDID assignments

/// `(DID, SDID, name)` for ancillary packet types seen on broadcast plants.
pub static ANC_TYPES: &[(u8, u8, &str)] = &[
    (0x60, 0x60, "SMPTE 12M Timecode"),
    (0x61, 0x01, "CEA-708 Closed Captions"),
    (0x61, 0x02, "CEA-608 Closed Captions"),
    (0x41, 0x05, "AFD/Bar Data"),
    (0x41, 0x07, "SCTE-104 Messages"),
    (0x43, 0x02, "OP-47 Teletext (VITC)"),
    (0x43, 0x03, "OP-47 Teletext (WSS)"),
    (0x51, 0x51, "MPEG Recoding Data"),
    (0x64, 0x64, "LTC (Linear Timecode)"),
    (0x64, 0x7F, "VITC (Vertical Interval Timecode)"),
];

/// Name of a known DID/SDID pair.
pub fn anc_type_name(did: u8, sdid: u8) -> Option<&'static str> {
    ANC_TYPES.iter().find(|(d, s, _)| *d == did && *s == sdid).map(|(_, _, name)| *name)
}

/// Payloads the decoder extracts further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncPayloadKind {
    Timecode,
    Cea608,
    Cea708,
    Other,
}

impl AncPayloadKind {
    pub fn of(did: u8, sdid: u8) -> Self {
        match (did, sdid) {
            (0x60, 0x60) => AncPayloadKind::Timecode,
            (0x61, 0x02) => AncPayloadKind::Cea608,
            (0x61, 0x01) => AncPayloadKind::Cea708,
            _ => AncPayloadKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_pairs() {
        assert_eq!(anc_type_name(0x60, 0x60), Some("SMPTE 12M Timecode"));
        assert_eq!(anc_type_name(0x64, 0x7F), Some("VITC (Vertical Interval Timecode)"));
        assert_eq!(anc_type_name(0x61, 0x03), None);
        assert_eq!(ANC_TYPES.len(), 10);
    }

    #[test]
    fn dispatches_extracted_payloads() {
        assert_eq!(AncPayloadKind::of(0x60, 0x60), AncPayloadKind::Timecode);
        assert_eq!(AncPayloadKind::of(0x61, 0x02), AncPayloadKind::Cea608);
        assert_eq!(AncPayloadKind::of(0x61, 0x01), AncPayloadKind::Cea708);
        assert_eq!(AncPayloadKind::of(0x41, 0x05), AncPayloadKind::Other);
    }
}
