use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// WAV spec used for clips we hand to external services: mono 16-bit PCM.
pub fn clip_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Load all samples from a WAV file as f32 in [-1.0, 1.0].
/// Samples stay interleaved; the spec tells the caller how many channels there are.
pub fn load_samples(path: &Path) -> hound::Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<hound::Result<Vec<_>>>()?
        }
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<Vec<_>>>()?,
    };

    Ok((samples, spec))
}

/// Write mono f32 samples as 16-bit PCM. Out-of-range samples are clipped.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> hound::Result<()> {
    let mut writer = WavWriter::create(path, clip_spec(sample_rate))?;
    for &sample in samples {
        let s16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s16)?;
    }
    writer.finalize()
}
