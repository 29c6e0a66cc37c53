use anyhow::{anyhow, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub format: AudioFormat,
    pub size: usize,
    pub duration: Option<Duration>,
}

impl AudioInfo {
    /// Sniffs the payload returned by the generation server.
    pub fn detect(bytes: &[u8]) -> Self {
        let (format, duration) = if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WAVE".as_slice()) {
            let duration = match scan_wav(bytes) {
                Ok(wav) => wav.duration(),
                Err(e) => {
                    log::warn!("WAV header could not be read: {:#}", e);
                    None
                }
            };
            (AudioFormat::Wav, duration)
        } else if bytes.starts_with(b"ID3") || is_mp3_frame_sync(bytes) {
            (AudioFormat::Mp3, None)
        } else {
            (AudioFormat::Unknown, None)
        };

        Self {
            format,
            size: bytes.len(),
            duration,
        }
    }

    /// Unknown payloads are still served as WAV; the server only emits audio/wav.
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav | AudioFormat::Unknown => "audio/wav",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav | AudioFormat::Unknown => "wav",
        }
    }
}

fn is_mp3_frame_sync(bytes: &[u8]) -> bool {
    matches!(bytes, [0xFF, second, ..] if second & 0xE0 == 0xE0)
}

struct WavInfo {
    byte_rate: u32,
    data_size: u32,
}

impl WavInfo {
    fn duration(&self) -> Option<Duration> {
        if self.byte_rate == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.data_size as f64 / self.byte_rate as f64,
        ))
    }
}

fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let raw = bytes.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn scan_wav(bytes: &[u8]) -> Result<WavInfo> {
    // RIFF, size, WAVE
    let mut pos = 12;

    let mut byte_rate: Option<u32> = None;
    let mut data_size: Option<u32> = None;

    while pos < bytes.len() {
        let chunk_id = bytes
            .get(pos..pos + 4)
            .ok_or_else(|| anyhow!("Unexpected EOF reading chunk ID"))?;
        let chunk_size = read_u32(bytes, pos + 4)
            .ok_or_else(|| anyhow!("Unexpected EOF reading chunk size"))?;
        let body = pos + 8;

        if chunk_id == b"fmt " {
            let fmt = body
                .checked_add(chunk_size as usize)
                .and_then(|end| bytes.get(body..end))
                .ok_or_else(|| anyhow!("fmt chunk declares {} bytes past the end", chunk_size))?;
            // AudioFormat(2) Channels(2) SampleRate(4) ByteRate(4) ...
            byte_rate = Some(read_u32(fmt, 8).ok_or_else(|| anyhow!("fmt chunk too short"))?);
        } else if chunk_id == b"data" {
            data_size = Some(chunk_size);
            break;
        }

        // Chunks are word-aligned.
        pos = body
            .checked_add(chunk_size as usize)
            .and_then(|end| end.checked_add(chunk_size as usize & 1))
            .ok_or_else(|| anyhow!("Chunk size overflows"))?;
    }

    Ok(WavInfo {
        byte_rate: byte_rate.ok_or_else(|| anyhow!("Missing fmt chunk"))?,
        data_size: data_size.ok_or_else(|| anyhow!("Missing data chunk"))?,
    })
}

#[cfg(test)]
pub(crate) fn dummy_wav(data_size: u32, sample_rate: u32) -> Vec<u8> {
    use std::io::Write;

    let mut buf = Vec::new();
    buf.write_all(b"RIFF").unwrap();
    buf.write_all(&(36 + data_size).to_le_bytes()).unwrap();
    buf.write_all(b"WAVE").unwrap();

    buf.write_all(b"fmt ").unwrap();
    buf.write_all(&16u32.to_le_bytes()).unwrap();
    // PCM (1), Mono (1), SampleRate, ByteRate, BlockAlign (2), Bits (16)
    buf.write_all(&1u16.to_le_bytes()).unwrap();
    buf.write_all(&1u16.to_le_bytes()).unwrap();
    buf.write_all(&sample_rate.to_le_bytes()).unwrap();
    buf.write_all(&(sample_rate * 2).to_le_bytes()).unwrap();
    buf.write_all(&2u16.to_le_bytes()).unwrap();
    buf.write_all(&16u16.to_le_bytes()).unwrap();

    buf.write_all(b"data").unwrap();
    buf.write_all(&data_size.to_le_bytes()).unwrap();
    buf.write_all(&vec![0u8; data_size as usize]).unwrap();
    buf
}
