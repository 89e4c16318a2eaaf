use crate::position::PositionReport;
use crate::{ADDRESS_LEN, CALLSIGN_LEN, CONTROL_UI, PID_NO_LAYER3};

/// CRC-16 frame check sequence (X.25 flavour)
///
/// Reflected polynomial 0x8408, register seeded with 0xFFFF, bits taken
/// least-significant first, result complemented.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            if (crc ^ byte as u16) & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0x8408;
            } else {
                crc >>= 1;
            }
            byte >>= 1;
        }
    }
    crc ^ 0xFFFF
}

/// One 7-byte AX.25 address field, already in on-wire (shifted) form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    bytes: [u8; ADDRESS_LEN],
}

impl Address {
    /// Pad (with spaces) or truncate the callsign to six characters, append
    /// the SSID byte and shift all seven bytes left by one bit.
    ///
    /// `last` marks the final address of the address list.
    pub fn new(callsign: &str, ssid: u8, last: bool) -> Self {
        let mut bytes = [b' '; ADDRESS_LEN];
        for (slot, &c) in bytes.iter_mut().zip(callsign.as_bytes().iter().take(CALLSIGN_LEN)) {
            *slot = c;
        }
        bytes[CALLSIGN_LEN] = ssid & 0x0F;

        for byte in bytes.iter_mut() {
            *byte <<= 1;
        }
        if last {
            bytes[CALLSIGN_LEN] |= 0x01;
        }

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.bytes
    }

    /// Callsign with the padding removed
    pub fn callsign(&self) -> String {
        self.bytes[..CALLSIGN_LEN]
            .iter()
            .map(|&b| (b >> 1) as char)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    pub fn ssid(&self) -> u8 {
        (self.bytes[CALLSIGN_LEN] >> 1) & 0x0F
    }

    /// Whether the end-of-address-list bit is set
    pub fn is_last(&self) -> bool {
        self.bytes[CALLSIGN_LEN] & 0x01 == 1
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ssid() {
            0 => write!(f, "{}", self.callsign()),
            ssid => write!(f, "{}-{}", self.callsign(), ssid),
        }
    }
}

/// A complete AX.25 UI frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    destination: Address,
    source: Address,
    control: u8,
    protocol_id: u8,
    info: Vec<u8>,
    fcs: u16,
}

impl Frame {
    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    pub fn protocol_id(&self) -> u8 {
        self.protocol_id
    }

    pub fn info(&self) -> &[u8] {
        &self.info
    }

    pub fn fcs(&self) -> u16 {
        self.fcs
    }

    /// Total on-wire length including the FCS
    pub fn len(&self) -> usize {
        2 * ADDRESS_LEN + 2 + self.info.len() + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every byte covered by the FCS
    fn body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.len());
        body.extend_from_slice(self.destination.as_bytes());
        body.extend_from_slice(self.source.as_bytes());
        body.push(self.control);
        body.push(self.protocol_id);
        body.extend_from_slice(&self.info);
        body
    }

    /// Flat byte sequence for transmission, FCS low byte first
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.body();
        bytes.extend_from_slice(&self.fcs.to_le_bytes());
        bytes
    }

    /// TNC2 monitor format, e.g. `W1AW>APZ001:!4142.88N/...`
    pub fn to_tnc2(&self) -> String {
        format!(
            "{}>{}:{}",
            self.source,
            self.destination,
            String::from_utf8_lossy(&self.info)
        )
    }
}

pub struct FrameEncoder;

impl FrameEncoder {
    /// Build a UI frame with one destination and one source address
    pub fn assemble(
        source: &str,
        source_ssid: u8,
        destination: &str,
        destination_ssid: u8,
        info: &[u8],
    ) -> Frame {
        let mut frame = Frame {
            destination: Address::new(destination, destination_ssid, false),
            source: Address::new(source, source_ssid, true),
            control: CONTROL_UI,
            protocol_id: PID_NO_LAYER3,
            info: info.to_vec(),
            fcs: 0,
        };
        frame.fcs = crc16(&frame.body());

        log::debug!("Assembled frame {} ({} bytes)", frame.to_tnc2(), frame.len());
        frame
    }

    /// Render the report's information field and frame it
    pub fn build(report: &PositionReport) -> crate::Result<Frame> {
        let info = report.information_field()?;
        Ok(Self::assemble(
            report.callsign(),
            report.ssid(),
            report.destination(),
            report.destination_ssid(),
            &info,
        ))
    }
}
