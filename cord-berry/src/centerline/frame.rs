//! 垂直于中心线的局部平面坐标系与切片重采样.

use nalgebra::Vector3;

use crate::data::{Border, Interpolation, Patch, SegVolume};

const EPS: f64 = 1e-9;

/// 垂直于切向量的平面上的一组单位正交基.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneBasis {
    /// 第一个平面方向: 世界 x 轴在平面上的投影. 与切向量近乎平行时改用世界 y 轴.
    pub u: Vector3<f64>,

    /// 第二个平面方向, `t x u`.
    pub v: Vector3<f64>,
}

impl PlaneBasis {
    /// 由切向量构造. 切向量为零时视为世界 z 轴.
    pub fn new(tangent: Vector3<f64>) -> Self {
        let t = tangent.try_normalize(EPS).unwrap_or_else(Vector3::z);
        let project = |axis: Vector3<f64>| (axis - t * axis.dot(&t)).try_normalize(EPS);
        // 两个世界坐标轴不可能同时与 t 平行.
        let u = project(Vector3::x())
            .or_else(|| project(Vector3::y()))
            .unwrap_or_else(Vector3::x);
        let v = t.cross(&u);
        Self { u, v }
    }

    /// 平面坐标 `(a, b)` 对应的相对于原点的物理位移.
    #[inline]
    pub fn offset(&self, a: f64, b: f64) -> Vector3<f64> {
        self.u * a + self.v * b
    }
}

/// `[-half_size, half_size)` 以 `resolution` 为步长的网格点数.
#[inline]
pub(crate) fn grid_len(half_size: f64, resolution: f64) -> usize {
    ((2.0 * half_size / resolution) - EPS).ceil().max(0.0) as usize
}

/// 在 `center` 处提取垂直于 `tangent` 的方形切片.
pub(crate) fn perpendicular_square(
    volume: &SegVolume,
    center: [f64; 3],
    tangent: [f64; 3],
    half_size: f64,
    resolution: f64,
    interpolation: Interpolation,
    border: Border,
) -> Patch {
    let basis = PlaneBasis::new(Vector3::from(tangent));
    let center = Vector3::from(center);
    let n = grid_len(half_size, resolution);
    Patch::from_shape_fn((n, n), |(a, b)| {
        let da = -half_size + a as f64 * resolution;
        let db = -half_size + b as f64 * resolution;
        let world: [f64; 3] = (center + basis.offset(da, db)).into();
        volume.sample(volume.phys2pix(world), interpolation, border)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Affine;
    use crate::NiftiHeaderAttr;
    use ndarray::Array3;

    fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).amax() < 1e-12
    }

    #[test]
    fn test_basis_axial() {
        let b = PlaneBasis::new(Vector3::new(0.0, 0.0, 2.0));
        assert!(close(b.u, Vector3::x()));
        assert!(close(b.v, Vector3::y()));
        assert!(close(b.offset(2.0, -1.0), Vector3::new(2.0, -1.0, 0.0)));
    }

    #[test]
    fn test_basis_orthonormal() {
        for t in [[0.3, -0.2, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]] {
            let t = Vector3::from(t);
            let b = PlaneBasis::new(t);
            assert!((b.u.norm() - 1.0).abs() < 1e-12);
            assert!((b.v.norm() - 1.0).abs() < 1e-12);
            assert!(b.u.dot(&b.v).abs() < 1e-12);
            if let Some(t) = t.try_normalize(EPS) {
                assert!(b.u.dot(&t).abs() < 1e-12);
                assert!(b.v.dot(&t).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_grid_len() {
        assert_eq!(grid_len(20.0, 0.5), 80);
        assert_eq!(grid_len(1.0, 0.3), 7);
        assert_eq!(grid_len(0.0, 0.5), 0);
    }

    /// 轴向切片应与体数据的水平切片一致.
    #[test]
    fn test_axial_square() {
        let mut data = Array3::<f32>::zeros((9, 9, 3));
        for k in 0..3 {
            data[(4, 4, k)] = 1.0;
            data[(5, 4, k)] = 1.0;
        }
        let v = SegVolume::fake(data, Affine::diagonal([-1.0, 1.0, 1.0])).unwrap();
        assert_eq!(v.len_z(), 3);
        let center = v.pix2phys([4.0, 4.0, 1.0]);
        let p = perpendicular_square(
            &v,
            center,
            [0.0, 0.0, 1.0],
            2.0,
            1.0,
            Interpolation::Nearest,
            Border::Constant(0.0),
        );
        assert_eq!(p.shape(), (4, 4));
        // 平面轴 0 为世界 +x, 即体素 -i 方向; 中心位于 (2, 2).
        assert_eq!(p[(2, 2)], 1.0);
        assert_eq!(p[(1, 2)], 1.0);
        assert_eq!(p.indexed_iter().filter(|&(_, &x)| x != 0.0).count(), 2);
    }
}
