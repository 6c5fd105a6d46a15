//! 在连续体素坐标上对 [`SegVolume`] 取值.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NiftiHeaderAttr, SegVolume};

/// 插值方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// 最近邻. 二值分割默认使用该方式.
    #[default]
    Nearest,

    /// 三线性插值.
    Linear,
}

/// 采样点落在体数据范围外时的取值策略.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Border {
    /// 使用固定填充值.
    Constant(f64),

    /// 使用最近的边界体素值.
    Nearest,
}

impl Default for Border {
    #[inline]
    fn default() -> Self {
        Self::Constant(crate::consts::gray::BACKGROUND)
    }
}

impl SegVolume {
    /// 在连续体素坐标 `[i, j, k]` 处取值.
    pub fn sample(&self, ijk: [f64; 3], interpolation: Interpolation, border: Border) -> f64 {
        let (z, h, w) = self.shape();
        let dims = [w, h, z];
        if dims.contains(&0) {
            return match border {
                Border::Constant(v) => v,
                Border::Nearest => crate::consts::gray::BACKGROUND,
            };
        }
        let upper = dims.map(|d| (d - 1) as f64);
        let inside = (0..3).all(|a| ijk[a] >= -0.5 && ijk[a] <= upper[a] + 0.5);

        let coord = match border {
            Border::Constant(v) if !inside => return v,
            Border::Constant(_) => ijk,
            Border::Nearest => std::array::from_fn(|a| ijk[a].clamp(0.0, upper[a])),
        };

        match interpolation {
            Interpolation::Nearest => {
                let [i, j, k] = std::array::from_fn(|a| {
                    (coord[a] + 0.5).floor().clamp(0.0, upper[a]) as usize
                });
                self[(k, j, i)] as f64
            }
            Interpolation::Linear => self.trilinear(coord, upper),
        }
    }

    /// 三线性插值. 坐标会被限制在数据范围内.
    fn trilinear(&self, coord: [f64; 3], upper: [f64; 3]) -> f64 {
        let c: [f64; 3] = std::array::from_fn(|a| coord[a].clamp(0.0, upper[a]));
        let lo: [usize; 3] = c.map(|v| v.floor() as usize);
        let hi: [usize; 3] = std::array::from_fn(|a| (lo[a] + 1).min(upper[a] as usize));
        let frac: [f64; 3] = std::array::from_fn(|a| c[a] - lo[a] as f64);

        let mut acc = 0.0;
        for corner in 0..8usize {
            let mut weight = 1.0;
            let mut idx = [0usize; 3];
            for a in 0..3 {
                if corner >> a & 1 == 1 {
                    weight *= frac[a];
                    idx[a] = hi[a];
                } else {
                    weight *= 1.0 - frac[a];
                    idx[a] = lo[a];
                }
            }
            if weight != 0.0 {
                acc += weight * self[(idx[2], idx[1], idx[0])] as f64;
            }
        }
        acc
    }
}
