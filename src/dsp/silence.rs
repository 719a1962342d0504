use serde::Serialize;

use crate::error::VoiceError;

/// Configuration for locating speech inside a clip.
#[derive(Debug, Clone)]
pub struct SilenceConfig {
    /// First silence threshold tried, in dBFS.
    pub threshold_db: f32,
    /// How far the threshold drops after an attempt that found no speech.
    pub relax_step_db: f32,
    /// Lowest threshold tried before giving up.
    pub floor_db: f32,
    /// A window this long (ms) at or below the threshold counts as silence.
    pub min_silence_ms: u64,
    /// Step between silence windows in milliseconds.
    pub seek_step_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            relax_step_db: 10.0,
            // 16-bit PCM bottoms out around -96 dBFS
            floor_db: -100.0,
            min_silence_ms: 100,
            seek_step_ms: 1,
        }
    }
}

impl SilenceConfig {
    /// The thresholds tried, loudest first, ending at or above `floor_db`.
    /// A non-positive step yields only the starting threshold.
    pub fn thresholds(&self) -> Vec<f32> {
        let mut out = Vec::new();
        let mut thresh = self.threshold_db;
        while thresh >= self.floor_db {
            out.push(thresh);
            if self.relax_step_db <= 0.0 {
                break;
            }
            thresh -= self.relax_step_db;
        }
        out
    }
}

/// Boundaries of detected speech, in milliseconds from the clip start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceSpan {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl VoiceSpan {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

/// Find the span from the first to the last non-silent segment.
///
/// Starts at `threshold_db` and relaxes by `relax_step_db` each time no
/// segment is found. A quiet recording whose speech sits below -40 dBFS is
/// still trimmed correctly; a clip that is silent all the way down to
/// `floor_db` is an error.
pub fn find_voice_span(
    samples: &[f32],
    sample_rate: u32,
    config: &SilenceConfig,
) -> Result<VoiceSpan, VoiceError> {
    let energy = EnergyIndex::new(samples, sample_rate);

    for thresh in config.thresholds() {
        let segments =
            energy.nonsilent_ranges(config.min_silence_ms, thresh, config.seek_step_ms);

        if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
            let span = VoiceSpan {
                start_ms: first.0,
                end_ms: last.1,
            };
            log::debug!(
                "voice span {}..{} ms at {thresh:.0} dBFS ({} segment(s))",
                span.start_ms,
                span.end_ms,
                segments.len()
            );
            return Ok(span);
        }

        log::debug!("no speech above {thresh:.0} dBFS, relaxing threshold");
    }

    Err(VoiceError::SilenceDetectionExhausted {
        floor_db: config.floor_db,
    })
}

/// Non-silent `(start_ms, end_ms)` ranges at a single threshold.
pub fn detect_nonsilent(
    samples: &[f32],
    sample_rate: u32,
    min_silence_ms: u64,
    threshold_db: f32,
    seek_step_ms: u64,
) -> Vec<(u64, u64)> {
    EnergyIndex::new(samples, sample_rate).nonsilent_ranges(min_silence_ms, threshold_db, seek_step_ms)
}

/// Prefix sums of squared samples, for O(1) RMS over any millisecond window.
struct EnergyIndex {
    prefix: Vec<f64>,
    sample_rate: u32,
    len_ms: u64,
}

impl EnergyIndex {
    fn new(samples: &[f32], sample_rate: u32) -> Self {
        let mut prefix = Vec::with_capacity(samples.len() + 1);
        let mut acc = 0.0_f64;
        prefix.push(acc);
        for &s in samples {
            acc += (s as f64) * (s as f64);
            prefix.push(acc);
        }

        let len_ms = if sample_rate == 0 {
            0
        } else {
            (samples.len() as f64 * 1000.0 / sample_rate as f64).round() as u64
        };

        Self {
            prefix,
            sample_rate,
            len_ms,
        }
    }

    fn index(&self, ms: u64) -> usize {
        let idx = (ms as u128 * self.sample_rate as u128 / 1000) as usize;
        idx.min(self.prefix.len() - 1)
    }

    /// RMS of the samples in [start_ms, end_ms). Empty windows are 0.
    fn rms(&self, start_ms: u64, end_ms: u64) -> f64 {
        let (a, b) = (self.index(start_ms), self.index(end_ms));
        if b <= a {
            return 0.0;
        }
        ((self.prefix[b] - self.prefix[a]) / (b - a) as f64).sqrt()
    }

    /// Silent `[start_ms, end_ms]` ranges: runs of windows whose RMS is at
    /// or below the threshold.
    fn silent_ranges(&self, min_silence_ms: u64, threshold_db: f32, seek_step_ms: u64) -> Vec<(u64, u64)> {
        if self.len_ms < min_silence_ms {
            return Vec::new();
        }

        let seek = seek_step_ms.max(1);
        let thresh = 10f64.powf(threshold_db as f64 / 20.0);
        let last_start = self.len_ms - min_silence_ms;

        let mut starts: Vec<u64> = (0..=last_start).step_by(seek as usize).collect();
        if last_start % seek != 0 {
            starts.push(last_start);
        }

        let mut silent_starts = starts
            .into_iter()
            .filter(|&i| self.rms(i, i + min_silence_ms) <= thresh);

        let Some(first) = silent_starts.next() else {
            return Vec::new();
        };

        // Merge window starts into ranges. A new range begins only when the
        // next silent window neither follows on directly nor overlaps the
        // previous one.
        let mut ranges = Vec::new();
        let mut range_start = first;
        let mut prev = first;
        for i in silent_starts {
            let continuous = i == prev + seek;
            let has_gap = i > prev + min_silence_ms;
            if !continuous && has_gap {
                ranges.push((range_start, prev + min_silence_ms));
                range_start = i;
            }
            prev = i;
        }
        ranges.push((range_start, prev + min_silence_ms));

        ranges
    }

    fn nonsilent_ranges(&self, min_silence_ms: u64, threshold_db: f32, seek_step_ms: u64) -> Vec<(u64, u64)> {
        let silent = self.silent_ranges(min_silence_ms, threshold_db, seek_step_ms);

        if silent.is_empty() {
            return vec![(0, self.len_ms)];
        }
        if silent[0] == (0, self.len_ms) {
            return Vec::new();
        }

        let mut ranges = Vec::new();
        let mut prev_end = 0;
        for &(start, end) in &silent {
            ranges.push((prev_end, start));
            prev_end = end;
        }
        if prev_end != self.len_ms {
            ranges.push((prev_end, self.len_ms));
        }
        if ranges.first() == Some(&(0, 0)) {
            ranges.remove(0);
        }

        ranges
    }
}
