//! Hann 窗平滑.

use log::debug;

use super::{Property, PropertySeries};

/// 长度为 `len` 的对称 Hann 窗, `w[n] = 0.5 - 0.5 cos(2 pi n / (len - 1))`.
pub fn hann_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / denom).cos())
                .collect()
        }
    }
}

/// 平滑窗口长度: `smoothing_factor_mm / mean_spacing` 四舍五入 (0.5 向上),
/// 并限制在 `[1, series_len]` 内.
pub fn window_length(smoothing_factor_mm: f64, mean_spacing: f64, series_len: usize) -> usize {
    let upper = series_len.max(1);
    let raw = smoothing_factor_mm / mean_spacing;
    if raw.is_nan() || raw <= 0.0 {
        return 1;
    }
    if raw.is_infinite() {
        return upper;
    }
    ((raw + 0.5).floor() as usize).clamp(1, upper)
}

/// 以 "same" 模式卷积并除以窗口权重之和.
///
/// 输出第 `i` 项为完全卷积的第 `i + (M - 1) / 2` 项, `M` 为窗口长度.
/// 序列两端之外视为 0. 窗口权重之和为 0 时原样返回.
pub fn convolve_same(data: &[f64], window: &[f64]) -> Vec<f64> {
    let sum: f64 = window.iter().sum();
    if window.is_empty() || sum == 0.0 {
        return data.to_vec();
    }
    let m = window.len();
    let shift = (m - 1) / 2;
    (0..data.len())
        .map(|i| {
            let k = i + shift;
            let lo = k.saturating_sub(m - 1);
            let hi = k.min(data.len() - 1);
            let acc: f64 = (lo..=hi).map(|j| data[j] * window[k - j]).sum();
            acc / sum
        })
        .collect()
}

/// 以 Hann 窗平滑序列中的全部形态学量. 平滑因子为 0 或序列为空时不做任何事.
pub fn smooth_series(series: &mut PropertySeries, smoothing_factor_mm: f64, mean_spacing: f64) {
    if smoothing_factor_mm == 0.0 || series.is_empty() {
        return;
    }
    let len = window_length(smoothing_factor_mm, mean_spacing, series.len());
    debug!("smoothing {} points with a hann window of length {len}", series.len());
    let window = hann_window(len);
    for p in Property::ALL {
        let smoothed = convolve_same(series.values(p), &window);
        *series.values_mut(p) = smoothed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_eq(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_hann() {
        assert_eq!(hann_window(1), vec![1.0]);
        assert!(float_eq(&hann_window(5), &[0.0, 0.5, 1.0, 0.5, 0.0]));
        assert!(float_eq(&hann_window(2), &[0.0, 0.0]));
        assert!(float_eq(&hann_window(4), &[0.0, 0.75, 0.75, 0.0]));
    }

    #[test]
    fn test_window_length() {
        assert_eq!(window_length(5.0, 2.0, 100), 3);
        assert_eq!(window_length(5.0, 1.0, 100), 5);
        assert_eq!(window_length(4.9, 1.0, 100), 5);
        assert_eq!(window_length(4.4, 1.0, 100), 4);
        assert_eq!(window_length(5.0, 0.1, 10), 10);
        assert_eq!(window_length(0.1, 1.0, 10), 1);
        assert_eq!(window_length(5.0, 0.0, 7), 7);
        assert_eq!(window_length(5.0, 1.0, 0), 1);
    }

    #[test]
    fn test_convolve_identity() {
        let data = [1.0, 4.0, 2.0];
        assert!(float_eq(&convolve_same(&data, &[1.0]), &data));
        // 全零窗口退化为恒等变换.
        assert!(float_eq(&convolve_same(&data, &hann_window(2)), &data));
    }

    #[test]
    fn test_convolve_centered() {
        let data = [0.0, 0.0, 4.0, 0.0, 0.0];
        let out = convolve_same(&data, &[1.0, 2.0, 1.0]);
        assert!(float_eq(&out, &[0.0, 1.0, 2.0, 1.0, 0.0]));

        // 偶数长度窗口: `(M - 1) / 2 == 0`, 输出即完全卷积的前 N 项.
        let out = convolve_same(&data, &[1.0, 3.0]);
        assert!(float_eq(&out, &[0.0, 0.0, 1.0, 3.0, 0.0]));
    }

    #[test]
    fn test_constant_interior() {
        let data = vec![2.0; 20];
        let out = convolve_same(&data, &hann_window(5));
        assert!(out[2..18].iter().all(|v| (v - 2.0).abs() < 1e-12));
        // 两端外视为 0.
        assert!(out[0] < 2.0);
    }
}
