use crate::error::{AprsWaveError, Result};
use crate::nrzi::{Symbol, SymbolStream};
use crate::{DEFAULT_VOLUME, SYMBOL_RATE};
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Output audio format
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioParams {
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
    volume: f64,
}

impl AudioParams {
    /// Validate a sample rate / bit depth / channel count combination.
    ///
    /// The bit depth must be a whole number of bytes, at most 32 bits.
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Result<Self> {
        if bits_per_sample == 0 || bits_per_sample % 8 != 0 || bits_per_sample > 32 {
            return Err(AprsWaveError::InvalidConfig(format!(
                "unsupported bit depth {} (8, 16, 24 or 32)",
                bits_per_sample
            )));
        }
        if channels == 0 {
            return Err(AprsWaveError::InvalidConfig(
                "channel count must be at least 1".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(AprsWaveError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }

        Ok(Self {
            sample_rate,
            bits_per_sample,
            channels,
            volume: DEFAULT_VOLUME,
        })
    }

    /// Set the output level as a fraction of full scale, clamped to 0..=1
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = if volume.is_nan() {
            DEFAULT_VOLUME
        } else {
            volume.clamp(0.0, 1.0)
        };
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes per sample tick across all channels
    pub fn block_align(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            bits_per_sample: 16,
            channels: 1,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Phase-continuous Bell 202 AFSK modulator producing packed PCM
///
/// The phase accumulator runs across every symbol so tone switches never
/// introduce a discontinuity. Sample rates that are not a multiple of the
/// symbol rate get one extra sample on the first `skew_samples` symbols of
/// every second, which keeps the average symbol timing exact.
pub struct AfskModulator {
    params: AudioParams,
    samples_per_symbol: usize,
    skew_samples: u32,
    volume_level: i64,
    phase: f64,
    symbol_count: u32,
    data: Vec<u8>,
}

impl AfskModulator {
    pub fn new(params: AudioParams) -> Self {
        let volume_level =
            (params.volume * f64::from(1u32 << (params.bits_per_sample - 1))) as i64;
        Self {
            params,
            samples_per_symbol: (params.sample_rate / SYMBOL_RATE) as usize,
            skew_samples: params.sample_rate % SYMBOL_RATE,
            volume_level,
            phase: 0.0,
            symbol_count: 0,
            data: Vec::new(),
        }
    }

    pub fn params(&self) -> &AudioParams {
        &self.params
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    pub fn skew_samples(&self) -> u32 {
        self.skew_samples
    }

    /// Peak amplitude in integer sample units
    pub fn volume_level(&self) -> i64 {
        self.volume_level
    }

    /// Current oscillator phase in radians, always within `[0, 2π)`
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// PCM bytes produced so far
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Append the samples for one symbol
    pub fn write_symbol(&mut self, symbol: Symbol) {
        let mut count = self.samples_per_symbol;
        if self.symbol_count < self.skew_samples {
            count += 1;
        }

        let step = TWO_PI * symbol.frequency() / f64::from(self.params.sample_rate);
        for _ in 0..count {
            self.phase = (self.phase + step).rem_euclid(TWO_PI);
            let sample = (self.volume_level as f64 * self.phase.sin()) as i64;
            self.write_sample(sample);
        }

        self.symbol_count = (self.symbol_count + 1) % SYMBOL_RATE;
    }

    /// Pack one sample into every channel
    fn write_sample(&mut self, sample: i64) {
        let width = self.params.bytes_per_sample();
        let value = if width == 1 { sample + 128 } else { sample };
        let bytes = value.to_le_bytes();
        for _ in 0..self.params.channels {
            self.data.extend_from_slice(&bytes[..width]);
        }
    }

    /// Modulate a whole stream
    pub fn modulate(&mut self, stream: &SymbolStream) {
        let samples_hint = stream.len() * (self.samples_per_symbol + 1);
        self.data.reserve(samples_hint * self.params.block_align());
        for &symbol in stream {
            self.write_symbol(symbol);
        }
    }
}

/// Render a symbol stream as interleaved little-endian PCM
pub fn synthesize(stream: &SymbolStream, params: &AudioParams) -> Vec<u8> {
    let mut modulator = AfskModulator::new(*params);
    modulator.modulate(stream);
    log::debug!(
        "Synthesized {} symbols into {} PCM bytes at {} Hz",
        stream.len(),
        modulator.data().len(),
        params.sample_rate
    );
    modulator.into_data()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_second(symbol: Symbol, params: AudioParams) -> Vec<u8> {
        let mut modulator = AfskModulator::new(params);
        for _ in 0..SYMBOL_RATE {
            modulator.write_symbol(symbol);
        }
        modulator.into_data()
    }

    #[test]
    fn test_modulator_48k_8bit() {
        let modulator = AfskModulator::new(AudioParams::new(48_000, 8, 1).unwrap());
        assert_eq!(modulator.samples_per_symbol(), 40);
        assert_eq!(modulator.skew_samples(), 0);
        assert_eq!(modulator.volume_level(), 96);
    }

    #[test]
    fn test_modulator_44k1_16bit() {
        let modulator = AfskModulator::new(AudioParams::new(44_100, 16, 1).unwrap());
        assert_eq!(modulator.samples_per_symbol(), 36);
        assert_eq!(modulator.skew_samples(), 900);
        assert_eq!(modulator.volume_level(), 24576);
    }

    #[test]
    fn test_unsupported_bit_depths() {
        for bits in [0, 4, 12, 40, 64] {
            match AudioParams::new(44_100, bits, 1) {
                Err(AprsWaveError::InvalidConfig(_)) => {}
                other => panic!("Expected InvalidConfig for {} bits, got {:?}", bits, other),
            }
        }
        assert!(AudioParams::new(44_100, 16, 0).is_err());
        assert!(AudioParams::new(0, 16, 1).is_err());
    }

    #[test]
    fn test_volume_clamped() {
        let params = AudioParams::default();
        assert_eq!(params.volume(), 0.75);
        assert_eq!(params.with_volume(1.5).volume(), 1.0);
        assert_eq!(params.with_volume(-0.2).volume(), 0.0);
        assert_eq!(params.with_volume(0.5).volume(), 0.5);
    }

    #[test]
    fn test_one_second_of_marks_8bit() {
        let data = one_second(Symbol::Mark, AudioParams::new(48_000, 8, 1).unwrap());
        assert_eq!(data.len(), 48_000);
    }

    #[test]
    fn test_one_second_of_spaces_with_skew() {
        let data = one_second(Symbol::Space, AudioParams::new(44_100, 16, 1).unwrap());
        assert_eq!(data.len(), 44_100 * 2);
    }

    #[test]
    fn test_one_second_stereo() {
        let data = one_second(Symbol::Mark, AudioParams::new(48_000, 16, 2).unwrap());
        assert_eq!(data.len(), 48_000 * 2 * 2);
        for frame in data.chunks(4) {
            assert_eq!(frame[..2], frame[2..]);
        }
    }

    #[test]
    fn test_skew_applied_to_leading_symbols() {
        let params = AudioParams::new(1_300, 8, 1).unwrap();
        let mut modulator = AfskModulator::new(params);
        assert_eq!(modulator.samples_per_symbol(), 1);
        assert_eq!(modulator.skew_samples(), 100);

        for _ in 0..100 {
            modulator.write_symbol(Symbol::Mark);
        }
        assert_eq!(modulator.data().len(), 200);
        modulator.write_symbol(Symbol::Mark);
        assert_eq!(modulator.data().len(), 201);
    }

    #[test]
    fn test_phase_wraps_when_step_exceeds_full_cycle() {
        // a 2200 Hz tone at 1300 Hz advances more than 2π per sample
        let params = AudioParams::new(1_300, 16, 1).unwrap();
        let mut modulator = AfskModulator::new(params);
        for _ in 0..SYMBOL_RATE {
            modulator.write_symbol(Symbol::Space);
            assert!((0.0..TWO_PI).contains(&modulator.phase()));
        }
        assert_eq!(modulator.data().len(), 1_300 * 2);
    }

    #[test]
    fn test_8bit_is_offset_unsigned() {
        let data = one_second(Symbol::Mark, AudioParams::new(48_000, 8, 1).unwrap());
        let min = *data.iter().min().unwrap();
        let max = *data.iter().max().unwrap();
        assert!(min >= 128 - 96 && max <= 128 + 96);
        assert!(max > 200 && min < 60);
    }

    #[test]
    fn test_16bit_signed_samples() {
        let data = one_second(Symbol::Space, AudioParams::new(48_000, 16, 1).unwrap());
        let samples: Vec<i16> = data
            .chunks(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        // first sample is taken after one phase step
        let expected = (24576.0 * (TWO_PI * 2200.0 / 48_000.0).sin()) as i16;
        assert_eq!(samples[0], expected);
        assert!(samples.iter().all(|s| s.abs() <= 24576));
        assert!(samples.iter().any(|&s| s < -24000));
    }

    #[test]
    fn test_24bit_and_32bit_widths() {
        let data = one_second(Symbol::Mark, AudioParams::new(8_400, 24, 1).unwrap());
        assert_eq!(data.len(), 8_400 * 3);
        let data = one_second(Symbol::Mark, AudioParams::new(8_400, 32, 1).unwrap());
        assert_eq!(data.len(), 8_400 * 4);
        let peak = data
            .chunks(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .max()
            .unwrap();
        assert!(peak <= 1_610_612_736);
        assert!(peak > 1_500_000_000);
    }

    #[test]
    fn test_phase_continuous_across_symbols() {
        let params = AudioParams::new(48_000, 16, 1).unwrap();
        let mut modulator = AfskModulator::new(params);
        let stream: SymbolStream = [Symbol::Mark, Symbol::Space, Symbol::Mark, Symbol::Space]
            .into_iter()
            .collect();
        modulator.modulate(&stream);

        let samples: Vec<f64> = modulator
            .data()
            .chunks(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f64)
            .collect();
        // max step between neighbours is bounded by the space tone's slope
        let max_step = 24576.0 * TWO_PI * 2200.0 / 48_000.0 + 2.0;
        for pair in samples.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= max_step);
        }
    }

    #[test]
    fn test_silent_volume() {
        let params = AudioParams::new(48_000, 16, 1).unwrap().with_volume(0.0);
        let data = one_second(Symbol::Mark, params);
        assert!(data.iter().all(|&b| b == 0));
    }
}
