pub mod levels;
pub mod wav;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::VoiceError;

/// Decoded mono audio at its native sample rate.
///
/// Lives only for one pipeline run; nothing here is cached between clips.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Clip length in whole milliseconds, rounded.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as f64 * 1000.0 / self.sample_rate as f64).round() as u64
    }

    /// Sample index for a millisecond offset, clamped to the clip.
    pub fn sample_index(&self, ms: u64) -> usize {
        let idx = (ms as u128 * self.sample_rate as u128 / 1000) as usize;
        idx.min(self.samples.len())
    }

    /// Samples between two millisecond offsets.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> &[f32] {
        let start = self.sample_index(start_ms);
        let end = self.sample_index(end_ms).max(start);
        &self.samples[start..end]
    }
}

/// Decode an audio file into a mono [`AudioClip`].
///
/// WAV goes through hound; everything else (MP3, FLAC) through symphonia. Multi-channel audio is averaged down to mono.
pub fn load_clip(path: &Path) -> Result<AudioClip, VoiceError> {
    let is_wav = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    let (interleaved, channels, sample_rate) = if is_wav {
        let (samples, spec) =
            wav::load_samples(path).map_err(|e| VoiceError::decode(path, e))?;
        (samples, spec.channels, spec.sample_rate)
    } else {
        decode_compressed(path)?
    };

    if sample_rate == 0 || channels == 0 {
        return Err(VoiceError::decode(path, "stream reports no sample rate or channels"));
    }

    let samples = downmix(&interleaved, channels as usize);
    if samples.is_empty() {
        return Err(VoiceError::decode(path, "no audio samples"));
    }

    let clip = AudioClip::new(samples, sample_rate);
    log::info!(
        "loaded {}: {:.2}s at {} Hz ({} channel(s))",
        path.display(),
        clip.duration_secs(),
        sample_rate,
        channels
    );
    Ok(clip)
}

fn decode_compressed(path: &Path) -> Result<(Vec<f32>, u16, u32), VoiceError> {
    let file = File::open(path).map_err(|e| VoiceError::decode(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| VoiceError::decode(path, e))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| VoiceError::decode(path, "no audio track"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| VoiceError::decode(path, e))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(VoiceError::decode(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            // A corrupt frame is skipped, as players do
            Err(SymphoniaError::DecodeError(reason)) => {
                log::debug!("{}: skipping bad packet: {reason}", path.display());
            }
            Err(e) => return Err(VoiceError::decode(path, e)),
        }
    }

    Ok((samples, channels, sample_rate))
}

/// Average interleaved frames down to one channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
