/// Overall signal levels of a clip, in dBFS.
#[derive(Debug, Clone, Copy)]
pub struct ClipLevels {
    pub peak_db: f32,
    pub rms_db: f32,
}

/// Peaks below this are almost certainly a muted or disconnected mic.
const NEAR_SILENT_PEAK_DB: f32 = -60.0;

impl ClipLevels {
    /// Measure peak and RMS. Both are -infinity for an all-zero or empty clip.
    pub fn measure(samples: &[f32]) -> Self {
        let peak = samples.iter().fold(0.0_f32, |max, &s| max.max(s.abs()));

        let rms = if samples.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / samples.len() as f64).sqrt() as f32
        };

        Self {
            peak_db: to_dbfs(peak),
            rms_db: to_dbfs(rms),
        }
    }

    pub fn is_near_silent(&self) -> bool {
        self.peak_db < NEAR_SILENT_PEAK_DB
    }
}

fn to_dbfs(amplitude: f32) -> f32 {
    if amplitude == 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * amplitude.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_peak_is_zero_db() {
        let levels = ClipLevels::measure(&[0.0, 0.5, 1.0, -0.5]);
        assert!(levels.peak_db.abs() < 0.01);
        assert!(!levels.is_near_silent());
    }

    #[test]
    fn half_scale_dc_rms() {
        // Constant 0.5 -> -6.02 dBFS
        let levels = ClipLevels::measure(&[0.5, 0.5, 0.5, 0.5]);
        assert!((levels.rms_db - (-6.02)).abs() < 0.1);
        assert!((levels.peak_db - (-6.02)).abs() < 0.1);
    }

    #[test]
    fn silence_is_negative_infinity() {
        let levels = ClipLevels::measure(&[0.0, 0.0, 0.0]);
        assert!(levels.peak_db.is_infinite() && levels.peak_db.is_sign_negative());
        assert!(levels.rms_db.is_infinite() && levels.rms_db.is_sign_negative());
        assert!(levels.is_near_silent());
    }

    #[test]
    fn empty_clip() {
        let levels = ClipLevels::measure(&[]);
        assert!(levels.rms_db.is_infinite());
    }

    #[test]
    fn quiet_clip_is_near_silent() {
        // 0.0005 peak ~ -66 dBFS
        let levels = ClipLevels::measure(&[0.0005, -0.0005]);
        assert!(levels.is_near_silent());
    }
}
