use rustfft::{num_complex::Complex, FftPlanner};

use super::windowing;

/// Configuration for octave-band spectral contrast.
#[derive(Debug, Clone)]
pub struct ContrastConfig {
    /// FFT length in samples.
    pub n_fft: usize,
    /// Hop between STFT frames in samples.
    pub hop_length: usize,
    /// Upper edge of the lowest band; each following band is one octave.
    pub fmin_hz: f32,
    /// Number of octave bands above `fmin_hz`. The sub-`fmin_hz` band is
    /// always added, so a frame has `n_bands + 1` contrast values.
    pub n_bands: usize,
    /// Fraction of each band's bins averaged for the peak and the valley.
    pub quantile: f32,
    /// Peak and valley levels are clipped this many dB below their maximum.
    pub top_db: f32,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            fmin_hz: 200.0,
            n_bands: 6,
            quantile: 0.02,
            top_db: 80.0,
        }
    }
}

const AMIN: f32 = 1e-10;

/// Spectral contrast per band and frame, indexed `[band][frame]`, in dB.
///
/// Per STFT frame and octave band, the magnitudes are sorted; the mean of
/// the top `quantile` is the peak and the mean of the bottom `quantile` the
/// valley. Contrast is the difference of their dB levels. Strongly
/// harmonic, "clear" voices produce deep valleys between partials and so a
/// high contrast; breathy voices fill the valleys with noise.
pub fn spectral_contrast(samples: &[f32], sample_rate: u32, config: &ContrastConfig) -> Vec<Vec<f32>> {
    let magnitudes = stft_magnitude(samples, config.n_fft, config.hop_length);
    let n_frames = magnitudes.len();
    let bands = band_rows(sample_rate, config);

    let mut peak = Vec::with_capacity(bands.len());
    let mut valley = Vec::with_capacity(bands.len());

    for band in &bands {
        let mut band_peak = Vec::with_capacity(n_frames);
        let mut band_valley = Vec::with_capacity(n_frames);
        let mut sorted = Vec::with_capacity(band.rows.len());

        for frame in &magnitudes {
            sorted.clear();
            sorted.extend(band.rows.iter().map(|&r| frame[r]));
            sorted.sort_by(|a, b| a.total_cmp(b));

            let take = band.take.min(sorted.len());
            let low = &sorted[..take];
            let high = &sorted[sorted.len() - take..];
            band_valley.push(low.iter().sum::<f32>() / take as f32);
            band_peak.push(high.iter().sum::<f32>() / take as f32);
        }

        peak.push(band_peak);
        valley.push(band_valley);
    }

    to_db(&mut peak, config.top_db);
    to_db(&mut valley, config.top_db);

    peak.iter()
        .zip(valley.iter())
        .map(|(p, v)| p.iter().zip(v.iter()).map(|(p, v)| p - v).collect())
        .collect()
}

/// Mean contrast over every band and every frame. 0.0 for empty input.
pub fn mean_spectral_contrast(samples: &[f32], sample_rate: u32, config: &ContrastConfig) -> f32 {
    let contrast = spectral_contrast(samples, sample_rate, config);
    let count: usize = contrast.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = contrast.iter().flatten().map(|&c| c as f64).sum();
    (total / count as f64) as f32
}

/// Spectrum rows belonging to one band, and how many of them make up
/// the peak/valley average.
struct Band {
    rows: Vec<usize>,
    take: usize,
}

/// Resolve the frequency bins of each octave band.
///
/// Band k spans [edge_k, edge_k+1]. Every band above the first borrows
/// the bin just below its lower edge, every band but the last drops its
/// topmost bin, and the last band extends to Nyquist. Bands whose lower
/// edge is at or above Nyquist are dropped.
fn band_rows(sample_rate: u32, config: &ContrastConfig) -> Vec<Band> {
    let n_bins = config.n_fft / 2 + 1;
    let nyquist = sample_rate as f32 / 2.0;
    let bin_hz = sample_rate as f32 / config.n_fft as f32;

    let mut n_bands = config.n_bands;
    while n_bands > 0 && config.fmin_hz * 2f32.powi(n_bands as i32 - 1) >= nyquist {
        n_bands -= 1;
    }
    if n_bands < config.n_bands {
        log::debug!(
            "spectral contrast: {} Hz sample rate supports {n_bands} of {} octave bands",
            sample_rate,
            config.n_bands
        );
    }

    let mut edges = vec![0.0_f32];
    edges.extend((0..=n_bands).map(|i| config.fmin_hz * 2f32.powi(i as i32)));

    let mut bands = Vec::with_capacity(n_bands + 1);
    for k in 0..=n_bands {
        let (f_low, f_high) = (edges[k], edges[k + 1]);
        let mut selected: Vec<bool> = (0..n_bins)
            .map(|bin| {
                let f = bin as f32 * bin_hz;
                f >= f_low && f <= f_high
            })
            .collect();

        let (Some(first), Some(last)) = (
            selected.iter().position(|&s| s),
            selected.iter().rposition(|&s| s),
        ) else {
            continue;
        };

        if k > 0 && first > 0 {
            selected[first - 1] = true;
        }
        if k == n_bands {
            selected[last + 1..].iter_mut().for_each(|s| *s = true);
        }

        let selected_count = selected.iter().filter(|&&s| s).count();
        let mut rows: Vec<usize> = (0..n_bins).filter(|&bin| selected[bin]).collect();
        if k < n_bands {
            rows.pop();
        }
        if rows.is_empty() {
            continue;
        }

        let take = ((config.quantile * selected_count as f32).round_ties_even() as usize).max(1);
        bands.push(Band { rows, take });
    }

    bands
}

/// Magnitude spectrogram, one `n_fft / 2 + 1` row per frame.
///
/// Frames are centred: the signal is zero-padded by `n_fft / 2` on both
/// sides, so frame i is centred on sample `i * hop`.
fn stft_magnitude(samples: &[f32], n_fft: usize, hop: usize) -> Vec<Vec<f32>> {
    let hop = hop.max(1);
    let pad = n_fft / 2;
    let mut padded = vec![0.0_f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    if padded.len() < n_fft || n_fft == 0 {
        return Vec::new();
    }

    let window = windowing::hann_periodic(n_fft);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let n_frames = 1 + (padded.len() - n_fft) / hop;
    let mut frames = Vec::with_capacity(n_frames);
    let mut buf = vec![Complex::new(0.0_f32, 0.0); n_fft];

    for i in 0..n_frames {
        let frame = &padded[i * hop..i * hop + n_fft];
        for ((slot, &s), &w) in buf.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut buf);
        frames.push(buf[..n_fft / 2 + 1].iter().map(|c| c.norm()).collect());
    }

    frames
}

/// In-place 10 * log10 with an amplitude floor, then clip everything to
/// `top_db` below the matrix maximum.
fn to_db(matrix: &mut [Vec<f32>], top_db: f32) {
    let mut max_db = f32::NEG_INFINITY;
    for value in matrix.iter_mut().flatten() {
        *value = 10.0 * value.max(AMIN).log10();
        max_db = max_db.max(*value);
    }
    let floor = max_db - top_db;
    for value in matrix.iter_mut().flatten() {
        *value = value.max(floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_wave(freq_hz: f32, sample_rate: u32, duration_secs: f32) -> Vec<f32> {
        let num_samples = (sample_rate as f32 * duration_secs) as usize;
        (0..num_samples)
            .map(|i| 0.5 * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn white_noise(n: usize) -> Vec<f32> {
        let mut state: u32 = 42;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                0.5 * ((state as f32 / u32::MAX as f32) * 2.0 - 1.0)
            })
            .collect()
    }

    #[test]
    fn seven_bands_at_cd_rate() {
        let samples = white_noise(22050);
        let contrast = spectral_contrast(&samples, 22050, &ContrastConfig::default());
        assert_eq!(contrast.len(), 7);
        // Centred frames: 1 + len / hop
        assert_eq!(contrast[0].len(), 1 + 22050 / 512);
    }

    #[test]
    fn low_sample_rate_drops_bands_above_nyquist() {
        // Nyquist 4 kHz: lower edges 0, 200, 400, 800, 1600, 3200 survive
        let samples = white_noise(8000);
        let contrast = spectral_contrast(&samples, 8000, &ContrastConfig::default());
        assert_eq!(contrast.len(), 6);
    }

    #[test]
    fn silence_has_zero_contrast() {
        let samples = vec![0.0; 16000];
        let mean = mean_spectral_contrast(&samples, 16000, &ContrastConfig::default());
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn empty_input_is_zero() {
        let mean = mean_spectral_contrast(&[], 16000, &ContrastConfig::default());
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn noise_contrast_is_positive_and_finite() {
        let samples = white_noise(44100);
        let mean = mean_spectral_contrast(&samples, 44100, &ContrastConfig::default());
        assert!(mean.is_finite());
        assert!(mean > 0.0, "Noise still has peaks above valleys, got {mean:.2}");
    }

    #[test]
    fn contrast_never_negative() {
        let samples = sine_wave(180.0, 22050, 1.0);
        let contrast = spectral_contrast(&samples, 22050, &ContrastConfig::default());
        for band in &contrast {
            assert!(band.iter().all(|&c| c >= 0.0));
        }
    }

    #[test]
    fn deterministic() {
        let samples = sine_wave(180.0, 22050, 0.5);
        let a = mean_spectral_contrast(&samples, 22050, &ContrastConfig::default());
        let b = mean_spectral_contrast(&samples, 22050, &ContrastConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn top_db_clips_to_matrix_maximum() {
        let mut m = vec![vec![1.0, 1e-9], vec![0.0, 0.1]];
        to_db(&mut m, 80.0);
        assert_eq!(m[0][0], 0.0);
        assert!((m[1][1] + 10.0).abs() < 1e-4);
        // 1e-9 -> -90 dB and 0 -> -100 dB are both clipped to -80
        assert_eq!(m[0][1], -80.0);
        assert_eq!(m[1][0], -80.0);
    }
}
