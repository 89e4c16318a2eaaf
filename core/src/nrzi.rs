use crate::framing::Frame;
use crate::{CLOCK_PADDING_BYTES, FLAG, FLAG_PADDING_BYTES, MARK_FREQ, SPACE_FREQ, STUFF_AFTER_ONES};

/// Tone frequency per symbol, indexed by `Symbol as usize`
const SYMBOL_FREQUENCIES: [f64; 2] = [MARK_FREQ, SPACE_FREQ];

/// One AFSK line symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Mark = 0,
    Space = 1,
}

impl Symbol {
    pub fn toggled(self) -> Self {
        match self {
            Symbol::Mark => Symbol::Space,
            Symbol::Space => Symbol::Mark,
        }
    }

    /// Tone frequency in Hz
    pub fn frequency(self) -> f64 {
        SYMBOL_FREQUENCIES[self as usize]
    }
}

/// Line-coded symbols ready for modulation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolStream {
    symbols: Vec<Symbol>,
}

impl SymbolStream {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }
}

impl From<Vec<Symbol>> for SymbolStream {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl FromIterator<Symbol> for SymbolStream {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SymbolStream {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// NRZI line coder with HDLC bit-stuffing
///
/// A `1` bit holds the current symbol, a `0` bit toggles it. While stuffing
/// is enabled an extra `0` is sent after every run of five `1` bits so the
/// payload can never imitate a flag.
pub struct LineEncoder {
    current: Symbol,
    consecutive_ones: usize,
    symbols: Vec<Symbol>,
}

impl LineEncoder {
    pub fn new() -> Self {
        Self {
            current: Symbol::Mark,
            consecutive_ones: 0,
            symbols: Vec::new(),
        }
    }

    fn push_bit(&mut self, bit: bool) {
        if !bit {
            self.current = self.current.toggled();
        }
        self.symbols.push(self.current);
    }

    /// Send one byte least-significant bit first
    pub fn write_byte(&mut self, byte: u8, bit_stuff: bool) {
        for i in 0..8 {
            let bit = (byte >> i) & 0x01 == 1;
            self.push_bit(bit);

            if bit {
                self.consecutive_ones += 1;
            } else {
                self.consecutive_ones = 0;
            }

            if bit_stuff && self.consecutive_ones == STUFF_AFTER_ONES {
                self.push_bit(false);
                self.consecutive_ones = 0;
            }
        }
    }

    pub fn finish(self) -> SymbolStream {
        SymbolStream::from(self.symbols)
    }

    /// Line-code a whole frame: clock padding, opening flags, the stuffed
    /// frame bytes, closing flags
    pub fn encode(frame: &Frame) -> SymbolStream {
        let mut encoder = Self::new();

        for _ in 0..CLOCK_PADDING_BYTES {
            encoder.write_byte(0x00, false);
        }
        for _ in 0..FLAG_PADDING_BYTES {
            encoder.write_byte(FLAG, false);
        }
        for byte in frame.to_bytes() {
            encoder.write_byte(byte, true);
        }
        for _ in 0..FLAG_PADDING_BYTES {
            encoder.write_byte(FLAG, false);
        }

        let stream = encoder.finish();
        log::debug!(
            "Line-coded {} frame bytes into {} symbols",
            frame.len(),
            stream.len()
        );
        stream
    }
}

impl Default for LineEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::FrameEncoder;

    /// Recover bits from symbol transitions, starting from Mark
    fn nrzi_decode(symbols: &[Symbol]) -> Vec<bool> {
        let mut previous = Symbol::Mark;
        symbols
            .iter()
            .map(|&s| {
                let bit = s == previous;
                previous = s;
                bit
            })
            .collect()
    }

    #[test]
    fn test_symbol_frequencies() {
        assert_eq!(Symbol::Mark.frequency(), 1200.0);
        assert_eq!(Symbol::Space.frequency(), 2200.0);
        assert_eq!(Symbol::Mark.toggled(), Symbol::Space);
        assert_eq!(Symbol::Space.toggled(), Symbol::Mark);
    }

    #[test]
    fn test_zero_byte_toggles_every_bit() {
        let mut encoder = LineEncoder::new();
        encoder.write_byte(0x00, false);
        let stream = encoder.finish();
        use Symbol::*;
        assert_eq!(
            stream.symbols(),
            &[Space, Mark, Space, Mark, Space, Mark, Space, Mark]
        );
    }

    #[test]
    fn test_flag_byte_lsb_first() {
        let mut encoder = LineEncoder::new();
        encoder.write_byte(FLAG, false);
        let stream = encoder.finish();
        // 0x7E LSB first: 0 1 1 1 1 1 1 0
        use Symbol::*;
        assert_eq!(
            stream.symbols(),
            &[Space, Space, Space, Space, Space, Space, Space, Mark]
        );
    }

    #[test]
    fn test_flag_not_stuffed() {
        let mut encoder = LineEncoder::new();
        encoder.write_byte(FLAG, false);
        assert_eq!(encoder.finish().len(), 8);
    }

    #[test]
    fn test_stuffing_all_ones() {
        let mut encoder = LineEncoder::new();
        encoder.write_byte(0xFF, true);
        let stream = encoder.finish();
        // five ones, stuffed zero, three ones
        assert_eq!(stream.len(), 9);
        let bits = nrzi_decode(stream.symbols());
        assert_eq!(
            bits,
            vec![true, true, true, true, true, false, true, true, true]
        );
    }

    #[test]
    fn test_stuffing_carries_across_bytes() {
        let mut encoder = LineEncoder::new();
        encoder.write_byte(0xF0, true); // 0000 1111 on the wire
        encoder.write_byte(0x01, true); // fifth one, then stuffed zero
        let stream = encoder.finish();
        assert_eq!(stream.len(), 17);
        let bits = nrzi_decode(stream.symbols());
        assert!(!bits[9]);
    }

    #[test]
    fn test_frame_stream_layout() {
        let frame = FrameEncoder::assemble("W1AW", 0, "APZ001", 0, b"!4142.88N/07243.63W-Test");
        let stream = LineEncoder::encode(&frame);
        let padding = 8 * (CLOCK_PADDING_BYTES + 2 * FLAG_PADDING_BYTES);
        assert!(stream.len() >= padding + 8 * frame.len());

        let bits = nrzi_decode(stream.symbols());

        // clock preamble is all zeros
        assert!(bits[..8 * CLOCK_PADDING_BYTES].iter().all(|&b| !b));

        // opening and closing flags are intact
        let flag_bits: Vec<bool> = (0..8).map(|i| (FLAG >> i) & 1 == 1).collect();
        for n in 0..FLAG_PADDING_BYTES {
            let start = 8 * (CLOCK_PADDING_BYTES + n);
            assert_eq!(&bits[start..start + 8], &flag_bits[..]);
            let end = bits.len() - 8 * (FLAG_PADDING_BYTES - n);
            assert_eq!(&bits[end..end + 8], &flag_bits[..]);
        }
    }

    #[test]
    fn test_frame_region_never_has_six_ones() {
        let frame = FrameEncoder::assemble("W1AW", 15, "APZ001", 0, &[0xFF; 40]);
        let stream = LineEncoder::encode(&frame);
        let bits = nrzi_decode(stream.symbols());

        let start = 8 * (CLOCK_PADDING_BYTES + FLAG_PADDING_BYTES);
        let end = bits.len() - 8 * FLAG_PADDING_BYTES;
        let mut run = 0;
        for &bit in &bits[start..end] {
            if bit {
                run += 1;
                assert!(run <= STUFF_AFTER_ONES);
            } else {
                run = 0;
            }
        }
        // 40 bytes of 0xFF alone need 64 stuffed bits
        assert!(end - start >= 8 * frame.len() + 64);
    }
}
