//! APRS position reports as AFSK1200 audio
//!
//! Frames a position report as an AX.25 UI frame, NRZI line-codes it with
//! HDLC bit-stuffing, modulates it as Bell 202 tones and wraps the PCM in a
//! WAV container.

pub mod error;
pub mod position;
pub mod framing;
pub mod nrzi;
pub mod afsk;
pub mod wav;
pub mod encoder;

pub use afsk::{synthesize, AfskModulator, AudioParams};
pub use encoder::{build_frame, encode_frame, Encoder};
pub use error::{AprsWaveError, Result};
pub use framing::{crc16, Address, Frame, FrameEncoder};
pub use nrzi::{LineEncoder, Symbol, SymbolStream};
pub use position::{base91_encode, PositionFormat, PositionReport};
pub use wav::{serialize, write_wav, WavHeader, WAV_HEADER_SIZE};

// Modem configuration
pub const SYMBOL_RATE: u32 = 1200; // baud
pub const MARK_FREQ: f64 = 1200.0; // Hz
pub const SPACE_FREQ: f64 = 2200.0; // Hz
pub const DEFAULT_VOLUME: f64 = 0.75;

// Line coding
pub const FLAG: u8 = 0x7E;
pub const CLOCK_PADDING_BYTES: usize = 5;
pub const FLAG_PADDING_BYTES: usize = 3;
pub const STUFF_AFTER_ONES: usize = 5;

// AX.25 framing
pub const CALLSIGN_LEN: usize = 6;
pub const ADDRESS_LEN: usize = CALLSIGN_LEN + 1;
pub const CONTROL_UI: u8 = 0x03; // Unnumbered Information
pub const PID_NO_LAYER3: u8 = 0xF0;

/// Destination callsign identifying this software
pub const DEFAULT_DESTINATION: &str = "APZ001";
