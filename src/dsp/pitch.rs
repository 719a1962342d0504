use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

use super::windowing;

/// Configuration for pitch extraction.
#[derive(Debug, Clone)]
pub struct PitchConfig {
    /// Lowest accepted frequency in Hz. Also sizes the detector buffer.
    pub pitch_floor_hz: f32,

    /// Highest accepted frequency in Hz.
    pub pitch_ceiling_hz: f32,

    /// Minimum analysis window in milliseconds. The detector buffer is
    /// grown past this when the floor needs a longer window.
    pub frame_size_ms: f32,

    /// How far to advance between frames, in milliseconds.
    pub hop_size_ms: f32,

    /// McLeod power threshold: frames with less energy are unvoiced.
    pub power_threshold: f64,

    /// McLeod clarity threshold (0.0-1.0): how periodic a frame must be
    /// before its pitch is trusted.
    pub clarity_threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            // Human speaking voice band
            pitch_floor_hz: 80.0,
            pitch_ceiling_hz: 400.0,
            frame_size_ms: 30.0,
            hop_size_ms: 10.0,
            power_threshold: 0.2,
            clarity_threshold: 0.6,
        }
    }
}

/// One analysis frame: its start time and the pitch found there, if any.
/// `None` marks a frame with no reliable pitch.
#[derive(Debug, Clone)]
pub struct PitchFrame {
    /// Seconds from the start of the clip.
    pub time: f32,
    pub frequency: Option<f32>,
}

/// Slide a window across the clip and run the McLeod pitch detector on
/// each frame.
///
/// Estimates outside `[pitch_floor_hz, pitch_ceiling_hz]` are discarded, so
/// every `Some` frequency in the result lies inside the voice band.
pub fn extract_pitch_contour(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Vec<PitchFrame> {
    let sr = sample_rate as f32;
    let frame_size = (config.frame_size_ms / 1000.0 * sr) as usize;
    let hop_size = ((config.hop_size_ms / 1000.0 * sr) as usize).max(1);

    // Two full periods of the floor frequency, rounded up to a power of two.
    // At 80 Hz and 44.1 kHz that is 1103 samples -> 2048.
    let min_buffer = (2.0 * sr / config.pitch_floor_hz).ceil() as usize;
    let detector_size = min_buffer.next_power_of_two().max(frame_size);
    let padding = detector_size / 2;

    let mut detector = McLeodDetector::new(detector_size, padding);
    let mut contour = Vec::new();
    let mut pos = 0;

    while pos + detector_size <= samples.len() {
        let time = pos as f32 / sr;

        let windowed = windowing::hanning(&samples[pos..pos + detector_size]);
        let frame: Vec<f64> = windowed.iter().map(|&s| s as f64).collect();

        let frequency = detector
            .get_pitch(
                &frame,
                sample_rate as usize,
                config.power_threshold,
                config.clarity_threshold,
            )
            .map(|p| p.frequency as f32)
            .filter(|&f| f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz);

        contour.push(PitchFrame { time, frequency });
        pos += hop_size;
    }

    contour
}

/// Frequencies of the frames where a pitch was found.
pub fn voiced_frequencies(contour: &[PitchFrame]) -> Vec<f32> {
    contour.iter().filter_map(|frame| frame.frequency).collect()
}

/// Fraction of frames with a pitch. 0.0 for an empty contour.
pub fn voiced_fraction(contour: &[PitchFrame]) -> f32 {
    if contour.is_empty() {
        return 0.0;
    }
    let voiced = contour.iter().filter(|f| f.frequency.is_some()).count();
    voiced as f32 / contour.len() as f32
}

/// Arithmetic mean over voiced frames, or exactly 0.0 when there are none.
///
/// The zero is load-bearing: the pitch categorizer maps it to the lowest
/// category, and the thresholds were calibrated with that behaviour.
pub fn mean_pitch(contour: &[PitchFrame]) -> f32 {
    let frequencies = voiced_frequencies(contour);
    if frequencies.is_empty() {
        return 0.0;
    }
    frequencies.iter().sum::<f32>() / frequencies.len() as f32
}
