//! Joining per-line speech segments into one file.

use super::AudioFormat;
use crate::error::{PdfcastError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Concatenate audio segments, in order, into `output`.
///
/// WAV segments must share one sample spec. MP3 and raw PCM are joined at the
/// byte level; other containers cannot be joined without re-encoding.
#[instrument(skip(segments), fields(count = segments.len(), format = %format))]
pub fn concatenate(segments: &[PathBuf], format: AudioFormat, output: &Path) -> Result<PathBuf> {
    if segments.is_empty() {
        return Err(PdfcastError::Audio(
            "No audio segments to concatenate".to_string(),
        ));
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        AudioFormat::Wav => concatenate_wav(segments, output)?,
        AudioFormat::Mp3 | AudioFormat::Pcm => concatenate_bytes(segments, format, output)?,
        other => {
            return Err(PdfcastError::Audio(format!(
                "Cannot join {} segments; configure wav or mp3 output",
                other
            )))
        }
    }

    info!("Wrote {} segments to {}", segments.len(), output.display());
    Ok(output.to_path_buf())
}

fn concatenate_wav(segments: &[PathBuf], output: &Path) -> Result<()> {
    let spec = WavReader::open(&segments[0])?.spec();
    let mut writer = WavWriter::create(output, spec)?;

    for path in segments {
        let bytes = std::fs::read(path)?;
        let reader = WavReader::new(Cursor::new(&bytes[..]))?;
        if reader.spec() != spec {
            return Err(PdfcastError::Audio(format!(
                "{} has {:?}, expected {:?}",
                path.display(),
                reader.spec(),
                spec
            )));
        }

        let declared = u64::from(reader.len());
        let limit = match data_bytes_present(&bytes) {
            Some(present) => declared.min(present / u64::from(spec.bits_per_sample.div_ceil(8))),
            None => declared,
        };
        if limit < declared {
            debug!("{} declares {} samples, holds {}", path.display(), declared, limit);
        }

        let copied = match spec.sample_format {
            SampleFormat::Int => copy_samples::<i32, _>(reader, limit, &mut writer)?,
            SampleFormat::Float => copy_samples::<f32, _>(reader, limit, &mut writer)?,
        };
        debug!("Copied {} samples from {}", copied, path.display());
    }

    writer.finalize()?;
    Ok(())
}

/// Copy at most `limit` samples.
///
/// Streamed WAV responses declare a data length longer than the body, so
/// the caller bounds the copy by the bytes actually present.
fn copy_samples<S, R>(
    reader: WavReader<R>,
    limit: u64,
    writer: &mut WavWriter<BufWriter<File>>,
) -> Result<u64>
where
    S: hound::Sample,
    R: Read,
{
    let mut copied = 0;
    for sample in reader.into_samples::<S>().take(limit as usize) {
        writer.write_sample(sample?)?;
        copied += 1;
    }
    Ok(copied)
}

/// Bytes following the `data` chunk header, whatever the header claims.
fn data_bytes_present(bytes: &[u8]) -> Option<u64> {
    let mut pos = 12usize;
    while pos.checked_add(8)? <= bytes.len() {
        let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().ok()?) as usize;
        if &bytes[pos..pos + 4] == b"data" {
            return Some((bytes.len() - pos - 8) as u64);
        }
        // Chunks are padded to an even length.
        pos = pos.checked_add(8)?.checked_add(size)?.checked_add(size & 1)?;
    }
    None
}

fn concatenate_bytes(segments: &[PathBuf], format: AudioFormat, output: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(output)?);

    for (index, path) in segments.iter().enumerate() {
        let mut data = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut data)?;

        let body = if format == AudioFormat::Mp3 && index > 0 {
            strip_id3v2(&data)
        } else {
            &data[..]
        };
        out.write_all(body)?;
    }

    out.flush()?;
    Ok(())
}

/// Skip a leading ID3v2 tag so only the first segment carries metadata.
fn strip_id3v2(data: &[u8]) -> &[u8] {
    if data.len() < 10 || &data[..3] != b"ID3" {
        return data;
    }

    // Tag size is a 28-bit syncsafe integer.
    let size = data[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b as usize & 0x7F));
    let footer = if data[5] & 0x10 != 0 { 10 } else { 0 };
    let end = (10 + size + footer).min(data.len());
    &data[end..]
}

/// Wrap raw 16-bit little-endian PCM in a WAV container.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for frame in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([frame[0], frame[1]]))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn mono(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_concatenate_wav_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a, mono(24_000), &[1, 2, 3]);
        write_wav(&b, mono(24_000), &[4, 5]);

        let out = dir.path().join("out").join("podcast.wav");
        concatenate(&[a, b], AudioFormat::Wav, &out).unwrap();

        let reader = WavReader::open(&out).unwrap();
        assert_eq!(reader.spec(), mono(24_000));
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mismatched_wav_specs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a, mono(24_000), &[1]);
        write_wav(&b, mono(44_100), &[2]);

        let result = concatenate(&[a, b], AudioFormat::Wav, &dir.path().join("out.wav"));
        assert!(matches!(result, Err(PdfcastError::Audio(_))));
    }

    #[test]
    fn test_streamed_wav_with_unknown_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streamed.wav");
        write_wav(&path, mono(24_000), &[10, 20, 30]);

        // Declare a data chunk far longer than the file, as streamed responses do.
        let mut bytes = std::fs::read(&path).unwrap();
        let data_pos = bytes.windows(4).position(|w| w == b"data").unwrap();
        bytes[data_pos + 4..data_pos + 8].copy_from_slice(&0x7FFF_FFF0u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let next = dir.path().join("next.wav");
        write_wav(&next, mono(24_000), &[40]);

        let out = dir.path().join("out.wav");
        concatenate(&[path, next], AudioFormat::Wav, &out).unwrap();

        let samples: Vec<i16> = WavReader::open(&out)
            .unwrap()
            .into_samples()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_data_bytes_skip_padded_chunks() {
        let bytes = [
            &b"RIFF\0\0\0\0WAVE"[..],
            b"LIST",
            &3u32.to_le_bytes(),
            b"abc\0",
            b"data",
            &u32::MAX.to_le_bytes(),
            &[1, 2, 3, 4],
        ]
        .concat();
        assert_eq!(data_bytes_present(&bytes), Some(4));
        assert_eq!(data_bytes_present(b"RIFF\0\0\0\0WAVE"), None);
    }

    #[test]
    fn test_concatenate_mp3_strips_later_tags() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        let b = dir.path().join("b.mp3");
        let tag = [b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 2, 0xAA, 0xBB];
        let frame = [0xFF, 0xFB, 0x90, 0x00];

        std::fs::write(&a, [&tag[..], &frame[..]].concat()).unwrap();
        std::fs::write(&b, [&tag[..], &frame[..]].concat()).unwrap();

        let out = dir.path().join("out.mp3");
        concatenate(&[a, b], AudioFormat::Mp3, &out).unwrap();

        let expected = [&tag[..], &frame[..], &frame[..]].concat();
        assert_eq!(std::fs::read(&out).unwrap(), expected);
    }

    #[test]
    fn test_rejects_unjoinable_formats() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.flac");
        std::fs::write(&a, b"fLaC").unwrap();
        let result = concatenate(&[a], AudioFormat::Flac, &dir.path().join("out.flac"));
        assert!(matches!(result, Err(PdfcastError::Audio(_))));
        assert!(concatenate(&[], AudioFormat::Wav, &dir.path().join("x.wav")).is_err());
    }

    #[test]
    fn test_pcm_to_wav() {
        let pcm: Vec<u8> = [100i16, -100, 7].iter().flat_map(|s| s.to_le_bytes()).collect();
        let wav = pcm_to_wav(&pcm, 24_000, 1).unwrap();

        let reader = WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![100, -100, 7]);
    }
}
