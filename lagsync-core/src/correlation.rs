//! Cross-correlation engine (C1): given two fixed-length signals, compute the
//! integer-sample lag and Pearson confidence that best align them.

use rustfft::num_complex::Complex;

use crate::error::LagSyncError;
use crate::fft::FftWorker;

/// Lag, in audio frames, and the Pearson correlation coefficient at that
/// alignment. `confidence` is in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationResult {
    pub lag_frames: i64,
    pub confidence: f64,
}

/// Compute the lag that best aligns `sample` inside `source`.
///
/// `source.len()` must equal `2 * sample.len()`; the sample is zero-padded to
/// the source's length internally. Positive lag means `sample` is shifted
/// right relative to `source`; negative means it is shifted left.
pub fn cross_correlation(source: &[f64], sample: &[f64]) -> Result<CorrelationResult, LagSyncError> {
    let sample_len = sample.len();
    if sample_len == 0 {
        return Err(LagSyncError::Degenerate);
    }
    debug_assert_eq!(
        source.len(),
        2 * sample_len,
        "source must be pre-sized to twice the sample length"
    );

    let n = source.len();
    let worker = FftWorker::new(n)?;

    let mut source_spectrum: Vec<Complex<f64>> = source.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut sample_spectrum: Vec<Complex<f64>> = Vec::with_capacity(n);
    sample_spectrum.extend(sample.iter().map(|&x| Complex::new(x, 0.0)));
    sample_spectrum.resize(n, Complex::new(0.0, 0.0));

    std::thread::scope(|scope| {
        let source_fft = &worker;
        let sample_fft = &worker;
        let source_handle = scope.spawn(|| source_fft.forward(&mut source_spectrum));
        let sample_handle = scope.spawn(|| sample_fft.forward(&mut sample_spectrum));
        source_handle.join().expect("fft worker thread panicked");
        sample_handle.join().expect("fft worker thread panicked");
    });

    for (s, t) in source_spectrum.iter_mut().zip(sample_spectrum.iter()) {
        *s *= t.conj();
    }

    worker.inverse(&mut source_spectrum);

    let (k, _) = source_spectrum
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.re.abs().partial_cmp(&b.re.abs()).unwrap())
        .ok_or(LagSyncError::Degenerate)?;

    let (lag, src_window, smp_window): (i64, &[f64], &[f64]) = if k < sample_len {
        (k as i64, &source[k..k + sample_len], &sample[0..sample_len])
    } else {
        let neg_lag = (k % sample_len) as i64 - sample_len as i64;
        let window_len = (neg_lag + sample_len as i64) as usize;
        if window_len == 0 {
            return Err(LagSyncError::Degenerate);
        }
        (neg_lag, &source[0..window_len], &sample[(-neg_lag) as usize..sample_len])
    };

    let confidence = pearson(src_window, smp_window);
    if confidence.is_nan() {
        return Err(LagSyncError::Degenerate);
    }

    Ok(CorrelationResult {
        lag_frames: lag,
        confidence,
    })
}

/// Pearson correlation coefficient of two equal-length windows.
///
/// Returns `NaN` if either window has zero variance; callers map that to
/// `LagSyncError::Degenerate`.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if x.is_empty() {
        return f64::NAN;
    }

    let m = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / m;
    let mean_y = y.iter().sum::<f64>() / m;

    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }

    let den = (den_x * den_y).sqrt();
    if den == 0.0 {
        f64::NAN
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(s: &[f64]) -> Vec<f64> {
        let mut v = s.to_vec();
        v.resize(s.len() * 2, 0.0);
        v
    }

    #[test]
    fn identical_signal_has_zero_lag_and_full_confidence() {
        let sample = vec![1.1, 2.2, 3.3, 4.4, 5.5];
        let source = pad(&sample);
        let result = cross_correlation(&source, &sample).unwrap();
        assert_eq!(result.lag_frames, 0);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_sample_is_degenerate() {
        let source: Vec<f64> = (1..=14).map(|v| v as f64).collect();
        let sample = vec![0.0; 7];
        assert!(matches!(
            cross_correlation(&source, &sample),
            Err(LagSyncError::Degenerate)
        ));
    }

    #[test]
    fn positive_shift_is_detected() {
        let source = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0, 0.0];
        let sample = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = cross_correlation(&source, &sample).unwrap();
        assert_eq!(result.lag_frames, 3);
        assert!(result.confidence >= crate::MIN_CONFIDENCE);
    }

    #[test]
    fn negative_shift_is_detected() {
        let source = vec![1.0, 2.0, 3.0, 0.4, 1.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let sample = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let result = cross_correlation(&source, &sample).unwrap();
        assert_eq!(result.lag_frames, -3);
        assert!(result.confidence >= crate::MIN_CONFIDENCE);
    }

    #[test]
    fn identical_sine_waves_align_at_zero() {
        let sample: Vec<f64> = (0..1000).map(|i| (i as f64).sin()).collect();
        let source: Vec<f64> = (0..2000).map(|i| (i as f64).sin()).collect();
        let result = cross_correlation(&source, &sample).unwrap();
        assert_eq!(result.lag_frames, 0);
        assert!(result.confidence >= crate::MIN_CONFIDENCE);
    }

    #[test]
    fn phase_shifted_sine_waves_anti_correlate() {
        let sample: Vec<f64> = (0..1000).map(|i| (i as f64).sin()).collect();
        let mut source: Vec<f64> = (0..1000)
            .map(|i| (i as f64 + std::f64::consts::PI).sin())
            .collect();
        source.resize(2000, 0.0);
        let result = cross_correlation(&source, &sample).unwrap();
        assert!(result.confidence <= -crate::MIN_CONFIDENCE);
    }

    #[test]
    fn pearson_identical_windows_is_one() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((pearson(&x, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_reversed_linear_is_negative_one() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_constant_window_is_nan() {
        let x = vec![3.0, 3.0, 3.0];
        let y = vec![1.0, 2.0, 3.0];
        assert!(pearson(&x, &y).is_nan());
    }
}
