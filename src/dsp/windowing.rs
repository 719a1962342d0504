use std::f32::consts::PI;

/// Symmetric Hann window applied to one frame: w(n) = 0.5 * (1 - cos(2πn / (N - 1))).
///
/// Both edges go to zero. Used on single pitch-detection frames.
pub fn hanning(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n <= 1 {
        return samples.to_vec();
    }

    let scale = 2.0 * PI / (n - 1) as f32;

    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 * (1.0 - (scale * i as f32).cos());
            s * w
        })
        .collect()
}

/// Periodic Hann window coefficients of length `n`.
///
/// The periodic form divides by N instead of N - 1, so consecutive
/// overlapping frames sum to a constant. This is the window used for
/// STFT analysis; `hanning` above is the symmetric form used on
/// single pitch-detection frames.
pub fn hann_periodic(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 2.0 * PI / n as f32;
    (0..n)
        .map(|i| 0.5 * (1.0 - (scale * i as f32).cos()))
        .collect()
}
