use crate::afsk::{synthesize, AudioParams};
use crate::error::Result;
use crate::framing::{Frame, FrameEncoder};
use crate::nrzi::{LineEncoder, SymbolStream};
use crate::position::PositionReport;
use crate::wav::{serialize, write_wav};
use std::path::Path;

/// Position report to WAV encoder
///
/// Runs report -> frame -> symbols -> PCM -> WAV bytes. Each call owns its
/// own modulator state, so one encoder can be reused for many reports.
pub struct Encoder {
    params: AudioParams,
}

impl Encoder {
    pub fn new(params: AudioParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AudioParams {
        &self.params
    }

    /// Encode one report into a complete WAV file image
    pub fn encode(&self, report: &PositionReport) -> Result<Vec<u8>> {
        let frame = build_frame(report)?;
        let stream = encode_frame(&frame);
        let pcm = synthesize(&stream, &self.params);
        Ok(serialize(pcm, &self.params))
    }

    /// Encode one report and write it to `path`, returning the file size
    pub fn encode_to_file(&self, report: &PositionReport, path: impl AsRef<Path>) -> Result<usize> {
        let frame = build_frame(report)?;
        self.write_frame(&frame, path)
    }

    /// Modulate an already assembled frame and write it to `path`
    pub fn write_frame(&self, frame: &Frame, path: impl AsRef<Path>) -> Result<usize> {
        let pcm = synthesize(&encode_frame(frame), &self.params);
        write_wav(path, pcm, &self.params)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(AudioParams::default())
    }
}

/// Frame a position report
pub fn build_frame(report: &PositionReport) -> Result<Frame> {
    FrameEncoder::build(report)
}

/// Line-code a frame with clock padding and flags
pub fn encode_frame(frame: &Frame) -> SymbolStream {
    LineEncoder::encode(frame)
}
