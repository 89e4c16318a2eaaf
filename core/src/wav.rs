use crate::afsk::AudioParams;
use crate::error::Result;
use std::path::Path;

/// Size of the canonical PCM RIFF/WAVE header
pub const WAV_HEADER_SIZE: usize = 44;

/// `fmt ` sub-chunk payload size for plain PCM
const FMT_CHUNK_SIZE: u32 = 16;

/// WAVE_FORMAT_PCM
const FORMAT_PCM: u16 = 1;

/// Header fields of a PCM WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    pub fn new(params: &AudioParams, data_size: u32) -> Self {
        let block_align = params.block_align() as u16;
        Self {
            channels: params.channels(),
            sample_rate: params.sample_rate(),
            byte_rate: params.sample_rate() * u32::from(block_align),
            block_align,
            bits_per_sample: params.bits_per_sample(),
            data_size,
        }
    }

    /// RIFF chunk size: everything after the first eight bytes
    pub fn riff_size(&self) -> u32 {
        36 + self.data_size
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let mut header = [0u8; WAV_HEADER_SIZE];
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&self.riff_size().to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        header[22..24].copy_from_slice(&self.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        header[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        header
    }
}

/// Wrap PCM bytes in a WAV container
///
/// Odd-length data gets a zero pad byte, counted in the data size.
pub fn serialize(mut pcm: Vec<u8>, params: &AudioParams) -> Vec<u8> {
    if pcm.len() % 2 == 1 {
        pcm.push(0);
    }

    let header = WavHeader::new(params, pcm.len() as u32);
    let mut file = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    file.extend_from_slice(&header.to_bytes());
    file.extend_from_slice(&pcm);
    file
}

/// Serialize and write a WAV file, returning the number of bytes written
pub fn write_wav(path: impl AsRef<Path>, pcm: Vec<u8>, params: &AudioParams) -> Result<usize> {
    let bytes = serialize(pcm, params);
    std::fs::write(path.as_ref(), &bytes)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.as_ref().display());
    Ok(bytes.len())
}
