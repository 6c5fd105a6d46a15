//! 图像矩.

use std::f64::consts::{FRAC_PI_2, PI};

use super::Region;
use crate::Idx2dF;

/// 至三阶的矩, `m[p][q] = sum(r^p * c^q)`, 其中 `r` 为行坐标, `c` 为列坐标.
pub type Moments = [[f64; 4]; 4];

/// 以包围盒左上角为原点的原始矩.
pub(super) fn raw(region: &Region) -> Moments {
    moments_about(region, (0.0, 0.0))
}

/// 以 `centroid` (局部坐标) 为原点的中心矩.
#[inline]
pub(super) fn central(region: &Region, centroid: Idx2dF) -> Moments {
    moments_about(region, centroid)
}

fn moments_about(region: &Region, (r0, c0): Idx2dF) -> Moments {
    let mut m = [[0.0; 4]; 4];
    for (r, c) in region.local_pixels() {
        let (dr, dc) = (r - r0, c - c0);
        let mut rp = 1.0;
        for row in m.iter_mut() {
            let mut cq = 1.0;
            for v in row.iter_mut() {
                *v += rp * cq;
                cq *= dc;
            }
            rp *= dr;
        }
    }
    m
}

/// 由中心矩归一化得到的二阶量 (协方差).
#[derive(Copy, Clone, Debug)]
pub(super) struct SecondOrder {
    /// 行方向方差, `mu20 / mu00`.
    a: f64,
    /// 协方差, `mu11 / mu00`.
    b: f64,
    /// 列方向方差, `mu02 / mu00`.
    c: f64,
}

impl SecondOrder {
    #[inline]
    pub(super) fn from_central(mu: &Moments) -> Self {
        let m00 = mu[0][0];
        Self {
            a: mu[2][0] / m00,
            b: mu[1][1] / m00,
            c: mu[0][2] / m00,
        }
    }

    /// 协方差矩阵的两个特征值, 降序, 非负.
    pub(super) fn eigvals(&self) -> [f64; 2] {
        let mean = (self.a + self.c) / 2.0;
        let half_diff = (self.a - self.c) / 2.0;
        let root = (half_diff * half_diff + self.b * self.b).sqrt();
        [(mean + root).max(0.0), (mean - root).max(0.0)]
    }

    /// 惯性张量 `[[mu02, -mu11], [-mu11, mu20]] / mu00`.
    #[inline]
    pub(super) fn inertia_tensor(&self) -> [[f64; 2]; 2] {
        [[self.c, -self.b], [-self.b, self.a]]
    }

    /// 行轴 (轴 0) 与长轴之间的夹角, 弧度, 位于 `(-pi/2, pi/2]`.
    pub(super) fn orientation(&self) -> f64 {
        let theta = 0.5 * (2.0 * self.b).atan2(self.a - self.c);
        if theta <= -FRAC_PI_2 {
            theta + PI
        } else {
            theta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(pixels: &[(usize, usize)]) -> Region {
        Region::new(pixels.to_vec())
    }

    #[test]
    fn test_raw_moments() {
        let r = region(&[(3, 4), (3, 5), (4, 4)]);
        let m = raw(&r);
        assert_eq!(m[0][0], 3.0);
        // 局部坐标: (0, 0), (0, 1), (1, 0).
        assert_eq!(m[1][0], 1.0);
        assert_eq!(m[0][1], 1.0);
        assert_eq!(m[1][1], 0.0);
        assert_eq!(m[0][3], 1.0);
    }

    #[test]
    fn test_diagonal_orientation() {
        // 沿主对角线排列的像素, 长轴与轴 0 成 45 度.
        let r = region(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let m = raw(&r);
        let mu = central(&r, (m[1][0] / m[0][0], m[0][1] / m[0][0]));
        let s = SecondOrder::from_central(&mu);
        assert!((s.orientation().to_degrees() - 45.0).abs() < 1e-9);
        let [l1, l2] = s.eigvals();
        assert!(l2.abs() < 1e-12);
        assert!(l1 > 0.0);

        // 反对角线.
        let r = region(&[(0, 3), (1, 2), (2, 1), (3, 0)]);
        let m = raw(&r);
        let mu = central(&r, (m[1][0] / m[0][0], m[0][1] / m[0][0]));
        let s = SecondOrder::from_central(&mu);
        assert!((s.orientation().to_degrees() + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_range() {
        let s = SecondOrder {
            a: 1.0,
            b: -0.0,
            c: 3.0,
        };
        assert_eq!(s.orientation(), FRAC_PI_2);
    }
}
